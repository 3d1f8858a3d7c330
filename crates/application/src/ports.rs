use std::path::{Path, PathBuf};

use color_probe_domain::{AnalysisReport, AnalysisRequest, GatewayMetrics, ServiceHealth};

use crate::ApplicationError;

#[derive(Debug, Clone)]
pub struct UploadProbe {
    pub canonical_path: PathBuf,
    pub media_type: Option<String>,
    pub byte_size: u64,
}

pub trait FileStore {
    fn probe(&self, path: &Path) -> Result<UploadProbe, ApplicationError>;

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct DecodedPixels {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPixels, ApplicationError>;
}

pub trait PredictionGateway {
    fn submit(&self, request: AnalysisRequest) -> Result<(), ApplicationError>;

    fn try_receive(&self) -> Result<Option<AnalysisReport>, ApplicationError>;

    fn metrics(&self) -> Result<GatewayMetrics, ApplicationError>;

    fn check_health(&self) -> Result<ServiceHealth, ApplicationError>;
}
