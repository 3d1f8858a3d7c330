use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f32,
    pub rgb_values: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisOutcome {
    #[default]
    None,
    Pending,
    Success(Prediction),
    Failure(String),
}

impl AnalysisOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }
}
