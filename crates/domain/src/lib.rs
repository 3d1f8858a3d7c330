mod analysis;
mod asset;
mod error;
mod outcome;
mod sample;
mod session;

pub use analysis::{AnalysisReport, AnalysisRequest, GatewayMetrics, RequestTicket, ServiceHealth};
pub use asset::{
    is_accepted_media_type, media_type_for_path, pack_rgb, unpack_rgb, ImageAsset,
    ACCEPTED_MEDIA_TYPES,
};
pub use error::DomainError;
pub use outcome::{AnalysisOutcome, Prediction};
pub use sample::{sample_color, ColorSample};
pub use session::{AnalysisSession, SessionEvent, SessionPhase};
