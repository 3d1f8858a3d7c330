use serde::Deserialize;

use crate::AnalysisOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticket: RequestTicket,
    pub file_name: String,
    pub media_type: String,
    pub image_bytes: Vec<u8>,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub ticket: RequestTicket,
    pub outcome: AnalysisOutcome,
    pub round_trip_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayMetrics {
    pub submitted_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub last_round_trip_ms: Option<u64>,
    pub p95_round_trip_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
}
