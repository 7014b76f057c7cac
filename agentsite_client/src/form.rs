use agentsite_models::{
    contact::{ContactField, ContactSubmission},
    validation::ClientValidationError,
};

use crate::{
    api::{ContactApiError, ContactRequest},
    status::{SubmissionEvent, SubmissionStatus},
};

/// Shown when the relay endpoint fails without telling us why.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Shown after a successful submission when the endpoint sends no text.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Message Sent! We'll get back to you within 24 hours.";

/// Identifies the status a reset was scheduled for. Any later transition makes
/// the ticket stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// A submission is already in flight.
    Ignored,
    /// The submission failed validation. Nothing is sent.
    Rejected(ClientValidationError),
    /// The honeypot was filled in. Pretend the submission succeeded.
    Silent(ResetTicket),
    /// Send this request, then call [`ContactForm::complete`].
    Send(ContactRequest),
}

/// State of the contact form. Pure bookkeeping, no I/O.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    submission: ContactSubmission,
    status: SubmissionStatus,
    error: Option<String>,
    generation: u64,
}

impl ContactForm {
    pub fn submission(&self) -> &ContactSubmission {
        &self.submission
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn on_field_change(&mut self, field: ContactField, value: impl Into<String>) {
        self.submission.set(field, value);
        self.error = None;
    }

    pub fn begin_submit(&mut self) -> SubmitAction {
        if self.status.is_busy() {
            return SubmitAction::Ignored;
        }

        if !self.submission.honeypot.is_empty() {
            self.apply(SubmissionEvent::BotDetected);
            self.submission = ContactSubmission::default();
            self.error = None;
            return SubmitAction::Silent(self.ticket());
        }

        if let Err(err) = self.submission.validate() {
            self.error = Some(err.to_string());
            return SubmitAction::Rejected(err);
        }

        self.apply(SubmissionEvent::Send);
        self.error = None;
        SubmitAction::Send(ContactRequest::from(&self.submission))
    }

    /// Records the result of the request returned by [`Self::begin_submit`] and
    /// returns the ticket for the reset that has to be scheduled.
    ///
    /// On success the fields are cleared. On failure the server text is kept
    /// as the error message, falling back to [`GENERIC_ERROR_MESSAGE`].
    pub fn complete(&mut self, result: &Result<String, ContactApiError>) -> Option<ResetTicket> {
        match result {
            Ok(_) => {
                self.apply(SubmissionEvent::Delivered).then_some(())?;
                self.submission = ContactSubmission::default();
                self.error = None;
            }
            Err(err) => {
                self.apply(SubmissionEvent::Failed).then_some(())?;
                self.error = Some(error_message(err).into());
            }
        }

        Some(self.ticket())
    }

    /// Returns to `Idle` unless something happened since the ticket was issued.
    pub fn reset(&mut self, ticket: ResetTicket) -> bool {
        ticket == self.ticket() && self.back_to_idle(SubmissionEvent::ResetElapsed)
    }

    /// "Send another message": leaves a success or error state right away.
    pub fn dismiss(&mut self) -> bool {
        self.back_to_idle(SubmissionEvent::Dismiss)
    }

    fn back_to_idle(&mut self, event: SubmissionEvent) -> bool {
        let applied = self.apply(event);
        if applied {
            self.error = None;
        }
        applied
    }

    fn apply(&mut self, event: SubmissionEvent) -> bool {
        match self.status.transition(event) {
            Some(status) => {
                self.status = status;
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    fn ticket(&self) -> ResetTicket {
        ResetTicket(self.generation)
    }
}

pub fn error_message(err: &ContactApiError) -> &str {
    match err {
        ContactApiError::Rejected {
            message: Some(message),
            ..
        } => message,
        _ => GENERIC_ERROR_MESSAGE,
    }
}
