use std::path::Path;

use color_probe_domain::{
    is_accepted_media_type, sample_color, AnalysisOutcome, AnalysisRequest, AnalysisSession,
    ColorSample, DomainError, GatewayMetrics, ImageAsset, RequestTicket, ServiceHealth,
    SessionEvent,
};

use crate::{
    ApplicationError, FileStore, GatewayMetricsQuery, HealthQuery, ImageDecoder, LoadImageCommand,
    PickColorCommand, PollOutcomeCommand, PredictionGateway, ResetSessionCommand,
    StartAnalysisCommand,
};

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub struct AnalysisService {
    session: AnalysisSession,
    files: Box<dyn FileStore>,
    decoder: Box<dyn ImageDecoder>,
    gateway: Box<dyn PredictionGateway>,
}

impl AnalysisService {
    pub fn new(
        files: Box<dyn FileStore>,
        decoder: Box<dyn ImageDecoder>,
        gateway: Box<dyn PredictionGateway>,
    ) -> Self {
        Self {
            session: AnalysisSession::new(),
            files,
            decoder,
            gateway,
        }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    /// Single validation path for every delivery mechanism. Probing
    /// happens before any bytes are read, so an oversized or mistyped
    /// file never reaches the decoder and never touches the session.
    pub fn load_image(&mut self, command: LoadImageCommand) -> Result<SessionEvent, ApplicationError> {
        let path = Path::new(&command.path);
        let probe = self.files.probe(path)?;
        let media_type = match probe.media_type {
            Some(media_type) if is_accepted_media_type(&media_type) => media_type,
            Some(media_type) => return Err(ApplicationError::InvalidType(media_type)),
            None => return Err(ApplicationError::InvalidType("unknown".to_string())),
        };
        if probe.byte_size > MAX_UPLOAD_BYTES {
            return Err(ApplicationError::TooLarge {
                size: probe.byte_size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let bytes = self.files.read_bytes(path)?;
        let decoded = self.decoder.decode(&bytes)?;
        let asset = ImageAsset::new(
            probe.canonical_path.to_string_lossy().to_string(),
            media_type,
            bytes,
            decoded.width,
            decoded.height,
            decoded.pixels,
        )?;
        Ok(self.session.install_image(asset))
    }

    pub fn pick_color(&mut self, command: PickColorCommand) -> Result<ColorSample, ApplicationError> {
        let asset = self.session.asset().ok_or(DomainError::NoImageLoaded)?;
        let sample = sample_color(
            asset,
            command.rendered_width,
            command.rendered_height,
            command.click_x,
            command.click_y,
        )?;
        self.session.place_sample(sample)?;
        Ok(sample)
    }

    pub fn start_analysis(
        &mut self,
        _command: StartAnalysisCommand,
    ) -> Result<RequestTicket, ApplicationError> {
        let (file_name, media_type, image_bytes, rgb) =
            match (self.session.asset(), self.session.sample()) {
                (Some(asset), Some(sample)) => (
                    asset.file_name(),
                    asset.media_type().to_string(),
                    asset.bytes().to_vec(),
                    sample.rgb(),
                ),
                _ => return Err(ApplicationError::Domain(DomainError::PreconditionNotMet)),
            };

        let ticket = self.session.begin_analysis()?;
        let request = AnalysisRequest {
            ticket,
            file_name,
            media_type,
            image_bytes,
            red: rgb[0],
            green: rgb[1],
            blue: rgb[2],
        };
        if let Err(error) = self.gateway.submit(request) {
            // A request that never left must not leave the session analyzing.
            self.session
                .finish_analysis(ticket, AnalysisOutcome::Failure(error.to_string()));
            return Err(error);
        }
        Ok(ticket)
    }

    pub fn poll_outcome(
        &mut self,
        _command: PollOutcomeCommand,
    ) -> Result<Option<SessionEvent>, ApplicationError> {
        let Some(report) = self.gateway.try_receive()? else {
            return Ok(None);
        };
        Ok(Some(
            self.session.finish_analysis(report.ticket, report.outcome),
        ))
    }

    pub fn reset(&mut self, _command: ResetSessionCommand) -> SessionEvent {
        self.session.reset()
    }

    pub fn gateway_metrics(
        &self,
        _query: GatewayMetricsQuery,
    ) -> Result<GatewayMetrics, ApplicationError> {
        self.gateway.metrics()
    }

    pub fn check_health(&self, _query: HealthQuery) -> Result<ServiceHealth, ApplicationError> {
        self.gateway.check_health()
    }
}
