use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use color_probe_application::{ApplicationError, PredictionGateway};
use color_probe_domain::{
    AnalysisOutcome, AnalysisReport, AnalysisRequest, GatewayMetrics, Prediction, ServiceHealth,
};
use serde::Deserialize;

const METRIC_WINDOW_SIZE: usize = 64;
const REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze the image";
pub const HEALTH_FAILURE_MESSAGE: &str = "Server is not responding";

#[derive(Default)]
struct MetricsState {
    submitted_jobs: u64,
    completed_jobs: u64,
    failed_jobs: u64,
    last_round_trip_ms: Option<u64>,
    round_trip_samples_ms: Vec<u64>,
}

impl MetricsState {
    fn snapshot(&self) -> GatewayMetrics {
        GatewayMetrics {
            submitted_jobs: self.submitted_jobs,
            completed_jobs: self.completed_jobs,
            failed_jobs: self.failed_jobs,
            last_round_trip_ms: self.last_round_trip_ms,
            p95_round_trip_ms: percentile_95(&self.round_trip_samples_ms),
        }
    }

    fn push_round_trip_sample(&mut self, sample_ms: u64) {
        self.last_round_trip_ms = Some(sample_ms);
        self.round_trip_samples_ms.push(sample_ms);
        if self.round_trip_samples_ms.len() > METRIC_WINDOW_SIZE {
            let drain_count = self.round_trip_samples_ms.len() - METRIC_WINDOW_SIZE;
            self.round_trip_samples_ms.drain(0..drain_count);
        }
    }
}

fn percentile_95(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let index = (((sorted.len() - 1) as f64) * 0.95).round() as usize;
    sorted.get(index).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Network(String),
    Rejected(String),
    Malformed(String),
}

impl TransportFailure {
    /// Every failure path collapses into the outcome vocabulary: a
    /// structured remote rejection keeps its detail text verbatim,
    /// everything else gets the generic message.
    fn into_failure_message(self) -> String {
        match self {
            Self::Rejected(detail) => detail,
            Self::Timeout | Self::Network(_) | Self::Malformed(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

pub trait PredictionTransport: Send + Sync {
    fn predict(&self, request: &AnalysisRequest) -> Result<Prediction, TransportFailure>;

    fn health(&self) -> Result<ServiceHealth, TransportFailure>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApplicationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .map_err(|error| ApplicationError::Gateway(error.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

fn extract_error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|error_body| error_body.detail)
}

fn classify_send_error(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Network(error.to_string())
    }
}

impl PredictionTransport for HttpTransport {
    fn predict(&self, request: &AnalysisRequest) -> Result<Prediction, TransportFailure> {
        let part = reqwest::blocking::multipart::Part::bytes(request.image_bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.media_type)
            .map_err(|error| TransportFailure::Malformed(error.to_string()))?;
        // Field names are the contract with the remote service.
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("r", request.red.to_string())
            .text("g", request.green.to_string())
            .text("b", request.blue.to_string());

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response.text().map_err(classify_send_error)?;
        if status.is_success() {
            serde_json::from_str::<Prediction>(&body)
                .map_err(|error| TransportFailure::Malformed(error.to_string()))
        } else {
            match extract_error_detail(&body) {
                Some(detail) => Err(TransportFailure::Rejected(detail)),
                None => Err(TransportFailure::Network(format!("http status {status}"))),
            }
        }
    }

    fn health(&self) -> Result<ServiceHealth, TransportFailure> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .map_err(classify_send_error)?;
        if !response.status().is_success() {
            return Err(TransportFailure::Network(format!(
                "http status {}",
                response.status()
            )));
        }
        response
            .json::<ServiceHealth>()
            .map_err(|error| TransportFailure::Malformed(error.to_string()))
    }
}

pub struct HttpPredictionGateway {
    submit_tx: mpsc::Sender<AnalysisRequest>,
    result_rx: Mutex<mpsc::Receiver<AnalysisReport>>,
    metrics: Arc<Mutex<MetricsState>>,
    transport: Arc<dyn PredictionTransport>,
}

impl HttpPredictionGateway {
    pub fn new(base_url: &str) -> Result<Self, ApplicationError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(
            base_url,
        )?)))
    }

    pub fn with_transport(transport: Arc<dyn PredictionTransport>) -> Self {
        let (submit_tx, submit_rx) = mpsc::channel::<AnalysisRequest>();
        let (result_tx, result_rx) = mpsc::channel::<AnalysisReport>();
        let metrics = Arc::new(Mutex::new(MetricsState::default()));

        spawn_worker(
            submit_rx,
            result_tx,
            Arc::clone(&metrics),
            Arc::clone(&transport),
        );

        Self {
            submit_tx,
            result_rx: Mutex::new(result_rx),
            metrics,
            transport,
        }
    }
}

impl PredictionGateway for HttpPredictionGateway {
    fn submit(&self, request: AnalysisRequest) -> Result<(), ApplicationError> {
        {
            let mut metrics = self
                .metrics
                .lock()
                .map_err(|_| ApplicationError::Gateway("metrics lock poisoned".to_string()))?;
            metrics.submitted_jobs += 1;
        }
        self.submit_tx.send(request).map_err(|error| {
            ApplicationError::Gateway(format!("failed to enqueue analysis job: {error}"))
        })
    }

    fn try_receive(&self) -> Result<Option<AnalysisReport>, ApplicationError> {
        let receiver = self
            .result_rx
            .lock()
            .map_err(|_| ApplicationError::Gateway("result lock poisoned".to_string()))?;
        match receiver.try_recv() {
            Ok(report) => Ok(Some(report)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ApplicationError::Gateway(
                "analysis result channel disconnected".to_string(),
            )),
        }
    }

    fn metrics(&self) -> Result<GatewayMetrics, ApplicationError> {
        let metrics = self
            .metrics
            .lock()
            .map_err(|_| ApplicationError::Gateway("metrics lock poisoned".to_string()))?;
        Ok(metrics.snapshot())
    }

    fn check_health(&self) -> Result<ServiceHealth, ApplicationError> {
        self.transport.health().map_err(|failure| {
            log::warn!("health probe failed: {failure:?}");
            ApplicationError::Gateway(HEALTH_FAILURE_MESSAGE.to_string())
        })
    }
}

fn spawn_worker(
    submit_rx: mpsc::Receiver<AnalysisRequest>,
    result_tx: mpsc::Sender<AnalysisReport>,
    metrics: Arc<Mutex<MetricsState>>,
    transport: Arc<dyn PredictionTransport>,
) {
    thread::spawn(move || {
        while let Ok(request) = submit_rx.recv() {
            let ticket = request.ticket;
            let started = Instant::now();
            let outcome = match transport.predict(&request) {
                Ok(prediction) => AnalysisOutcome::Success(prediction),
                Err(failure) => {
                    log::warn!("analysis request {} failed: {failure:?}", ticket.get());
                    AnalysisOutcome::Failure(failure.into_failure_message())
                }
            };
            let elapsed = started.elapsed().as_millis() as u64;
            let failed = matches!(outcome, AnalysisOutcome::Failure(_));

            let report = AnalysisReport {
                ticket,
                outcome,
                round_trip_ms: elapsed,
            };
            if result_tx.send(report).is_err() {
                return;
            }

            if let Ok(mut m) = metrics.lock() {
                if failed {
                    m.failed_jobs += 1;
                } else {
                    m.completed_jobs += 1;
                }
                m.push_round_trip_sample(elapsed);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use color_probe_domain::RequestTicket;

    use super::*;

    struct ScriptedTransport {
        responses: Mutex<Vec<Result<Prediction, TransportFailure>>>,
    }

    impl ScriptedTransport {
        fn new(mut responses: Vec<Result<Prediction, TransportFailure>>) -> Self {
            // Popped from the back; keep caller order.
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl PredictionTransport for ScriptedTransport {
        fn predict(&self, _request: &AnalysisRequest) -> Result<Prediction, TransportFailure> {
            self.responses
                .lock()
                .expect("responses lock")
                .pop()
                .unwrap_or(Err(TransportFailure::Network("script empty".to_string())))
        }

        fn health(&self) -> Result<ServiceHealth, TransportFailure> {
            Ok(ServiceHealth {
                status: "healthy".to_string(),
            })
        }
    }

    fn request(ticket: u64) -> AnalysisRequest {
        AnalysisRequest {
            ticket: RequestTicket::new(ticket),
            file_name: "quad.png".to_string(),
            media_type: "image/png".to_string(),
            image_bytes: vec![1, 2, 3],
            red: 255,
            green: 0,
            blue: 0,
        }
    }

    fn prediction() -> Prediction {
        Prediction {
            prediction: "high".to_string(),
            confidence: 0.87,
            rgb_values: [255, 0, 0],
        }
    }

    fn wait_for_report(gateway: &HttpPredictionGateway) -> AnalysisReport {
        let deadline = Instant::now() + Duration::from_millis(600);
        loop {
            if let Some(report) = gateway.try_receive().expect("poll") {
                return report;
            }
            assert!(Instant::now() < deadline, "timed out waiting for report");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn successful_round_trip_reports_the_prediction() {
        let gateway = HttpPredictionGateway::with_transport(Arc::new(ScriptedTransport::new(
            vec![Ok(prediction())],
        )));
        gateway.submit(request(1)).expect("submit");

        let report = wait_for_report(&gateway);
        assert_eq!(report.ticket, RequestTicket::new(1));
        assert_eq!(report.outcome, AnalysisOutcome::Success(prediction()));

        let metrics = gateway.metrics().expect("metrics");
        assert_eq!(metrics.submitted_jobs, 1);
        assert_eq!(metrics.completed_jobs, 1);
        assert_eq!(metrics.failed_jobs, 0);
        assert!(metrics.last_round_trip_ms.is_some());
    }

    #[test]
    fn timeout_normalizes_to_the_generic_message() {
        let gateway = HttpPredictionGateway::with_transport(Arc::new(ScriptedTransport::new(
            vec![Err(TransportFailure::Timeout)],
        )));
        gateway.submit(request(7)).expect("submit");

        let report = wait_for_report(&gateway);
        assert_eq!(
            report.outcome,
            AnalysisOutcome::Failure(GENERIC_FAILURE_MESSAGE.to_string())
        );

        let metrics = gateway.metrics().expect("metrics");
        assert_eq!(metrics.failed_jobs, 1);
        assert_eq!(metrics.completed_jobs, 0);
    }

    #[test]
    fn remote_rejection_detail_surfaces_verbatim() {
        let detail = "image too blurry for analysis".to_string();
        let gateway = HttpPredictionGateway::with_transport(Arc::new(ScriptedTransport::new(
            vec![Err(TransportFailure::Rejected(detail.clone()))],
        )));
        gateway.submit(request(2)).expect("submit");

        let report = wait_for_report(&gateway);
        assert_eq!(report.outcome, AnalysisOutcome::Failure(detail));
    }

    #[test]
    fn reports_come_back_in_submission_order() {
        let gateway = HttpPredictionGateway::with_transport(Arc::new(ScriptedTransport::new(
            vec![Ok(prediction()), Err(TransportFailure::Timeout)],
        )));
        gateway.submit(request(1)).expect("submit");
        gateway.submit(request(2)).expect("submit");

        let first = wait_for_report(&gateway);
        let second = wait_for_report(&gateway);
        assert_eq!(first.ticket, RequestTicket::new(1));
        assert!(matches!(first.outcome, AnalysisOutcome::Success(_)));
        assert_eq!(second.ticket, RequestTicket::new(2));
        assert!(matches!(second.outcome, AnalysisOutcome::Failure(_)));
    }

    #[test]
    fn error_detail_extraction_requires_the_structured_shape() {
        assert_eq!(
            extract_error_detail(r#"{"detail": "unsupported color space"}"#),
            Some("unsupported color space".to_string())
        );
        assert_eq!(extract_error_detail("<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_error_detail(""), None);
    }

    #[test]
    fn failure_messages_follow_the_taxonomy() {
        assert_eq!(
            TransportFailure::Timeout.into_failure_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            TransportFailure::Network("connection refused".to_string()).into_failure_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            TransportFailure::Malformed("bad json".to_string()).into_failure_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            TransportFailure::Rejected("detail text".to_string()).into_failure_message(),
            "detail text"
        );
    }

    #[test]
    fn percentile_95_tracks_the_sample_window() {
        assert_eq!(percentile_95(&[]), None);
        assert_eq!(percentile_95(&[10]), Some(10));
        let samples: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile_95(&samples), Some(95));
    }
}
