use crate::{AnalysisOutcome, ColorSample, DomainError, ImageAsset, RequestTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    ImageLoaded,
    SampleReady,
    Analyzing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ImageReplaced,
    SamplePlaced,
    AnalysisFinished(RequestTicket),
    StrayReportIgnored(RequestTicket),
    SessionReset,
}

/// Single-instance session state: the image, the picked sample, the
/// current outcome, and the ticket of the one request allowed in
/// flight. A sample never outlives the asset it was taken from.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    asset: Option<ImageAsset>,
    sample: Option<ColorSample>,
    outcome: AnalysisOutcome,
    in_flight: Option<RequestTicket>,
    next_ticket: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.asset.is_none() {
            SessionPhase::Idle
        } else if self.in_flight.is_some() {
            SessionPhase::Analyzing
        } else if self.sample.is_some() {
            SessionPhase::SampleReady
        } else {
            SessionPhase::ImageLoaded
        }
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn sample(&self) -> Option<&ColorSample> {
        self.sample.as_ref()
    }

    pub fn outcome(&self) -> &AnalysisOutcome {
        &self.outcome
    }

    pub fn install_image(&mut self, asset: ImageAsset) -> SessionEvent {
        self.asset = Some(asset);
        self.sample = None;
        self.outcome = AnalysisOutcome::None;
        self.in_flight = None;
        SessionEvent::ImageReplaced
    }

    pub fn place_sample(&mut self, sample: ColorSample) -> Result<SessionEvent, DomainError> {
        if self.asset.is_none() {
            return Err(DomainError::NoImageLoaded);
        }
        // Picking while a request is in flight abandons that request;
        // its report will no longer match the in-flight ticket.
        self.in_flight = None;
        self.sample = Some(sample);
        self.outcome = AnalysisOutcome::None;
        Ok(SessionEvent::SamplePlaced)
    }

    pub fn begin_analysis(&mut self) -> Result<RequestTicket, DomainError> {
        if self.phase() != SessionPhase::SampleReady {
            return Err(DomainError::PreconditionNotMet);
        }
        self.next_ticket += 1;
        let ticket = RequestTicket::new(self.next_ticket);
        self.in_flight = Some(ticket);
        self.outcome = AnalysisOutcome::Pending;
        Ok(ticket)
    }

    pub fn finish_analysis(
        &mut self,
        ticket: RequestTicket,
        outcome: AnalysisOutcome,
    ) -> SessionEvent {
        if self.in_flight != Some(ticket) {
            return SessionEvent::StrayReportIgnored(ticket);
        }
        self.in_flight = None;
        self.outcome = outcome;
        SessionEvent::AnalysisFinished(ticket)
    }

    pub fn reset(&mut self) -> SessionEvent {
        self.asset = None;
        self.sample = None;
        self.outcome = AnalysisOutcome::None;
        self.in_flight = None;
        SessionEvent::SessionReset
    }
}
