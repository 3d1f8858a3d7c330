mod error;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use ports::{DecodedPixels, FileStore, ImageDecoder, PredictionGateway, UploadProbe};
pub use service::{AnalysisService, MAX_UPLOAD_BYTES};
pub use use_cases::{
    GatewayMetricsQuery, HealthQuery, LoadImageCommand, PickColorCommand, PollOutcomeCommand,
    ResetSessionCommand, StartAnalysisCommand,
};
