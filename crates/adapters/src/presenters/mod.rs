use color_probe_domain::{AnalysisOutcome, ColorSample, GatewayMetrics, ServiceHealth};

pub fn present_outcome(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::None => "no analysis yet".to_string(),
        AnalysisOutcome::Pending => "analyzing...".to_string(),
        AnalysisOutcome::Success(prediction) => format!(
            "prediction={} confidence={:.1}% rgb=({}, {}, {})",
            prediction.prediction,
            prediction.confidence * 100.0,
            prediction.rgb_values[0],
            prediction.rgb_values[1],
            prediction.rgb_values[2]
        ),
        AnalysisOutcome::Failure(message) => format!("analysis failed: {message}"),
    }
}

pub fn present_sample(sample: &ColorSample) -> String {
    format!(
        "sampled rgb=({}, {}, {}) at ({:.1}, {:.1})",
        sample.red, sample.green, sample.blue, sample.display_x, sample.display_y
    )
}

pub fn present_health(health: &ServiceHealth) -> String {
    format!("service status: {}", health.status)
}

pub fn present_metrics(metrics: &GatewayMetrics) -> String {
    let last_text = metrics
        .last_round_trip_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string());
    let p95_text = metrics
        .p95_round_trip_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "jobs s/c/f={}/{}/{} last={}ms p95={}ms",
        metrics.submitted_jobs, metrics.completed_jobs, metrics.failed_jobs, last_text, p95_text
    )
}
