#[derive(Debug, Clone)]
pub struct LoadImageCommand {
    pub path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PickColorCommand {
    pub rendered_width: f32,
    pub rendered_height: f32,
    pub click_x: f32,
    pub click_y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StartAnalysisCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct PollOutcomeCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResetSessionCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayMetricsQuery;

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthQuery;
