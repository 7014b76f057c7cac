//! Client side of the contact form.
//!
//! [`SubmissionClient`] owns the form state and is the only caller of the relay
//! endpoint. It keeps at most one request in flight and returns the form to
//! idle after a success or an error.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use agentsite_models::{
    contact::{ContactField, ContactSubmission},
    validation::ClientValidationError,
};
use tracing::{debug, warn};

pub use crate::{
    api::{ContactApi, ContactApiError, ContactRequest, HttpContactApi},
    form::{ContactForm, ResetTicket, SubmitAction, DEFAULT_SUCCESS_MESSAGE, GENERIC_ERROR_MESSAGE},
    scheduler::{ManualResetScheduler, Reset, ResetScheduler, TokioResetScheduler},
    status::{SubmissionEvent, SubmissionStatus},
};

#[cfg(any(test, feature = "mock"))]
pub use crate::api::MockContactApi;

mod api;
mod form;
mod scheduler;
mod status;

#[derive(Debug)]
pub struct SubmissionClient<Api, Scheduler> {
    api: Api,
    scheduler: Scheduler,
    config: SubmissionClientConfig,
    form: Arc<Mutex<ContactForm>>,
}

#[derive(Debug, Clone, Copy)]
pub struct SubmissionClientConfig {
    /// How long the confirmation stays visible.
    pub success_reset: Duration,
    /// How long the error message stays visible.
    pub error_reset: Duration,
}

impl Default for SubmissionClientConfig {
    fn default() -> Self {
        Self {
            success_reset: Duration::from_secs(6),
            error_reset: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission is still in flight.
    Ignored,
    Invalid(ClientValidationError),
    /// The honeypot was filled in. Nothing was sent but the form shows success.
    BotSuspected,
    Delivered {
        message: String,
    },
    Failed {
        message: String,
    },
}

impl<Api, Scheduler> SubmissionClient<Api, Scheduler>
where
    Api: ContactApi,
    Scheduler: ResetScheduler,
{
    pub fn new(api: Api, scheduler: Scheduler, config: SubmissionClientConfig) -> Self {
        Self {
            api,
            scheduler,
            config,
            form: Default::default(),
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.lock().status()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(Into::into)
    }

    pub fn submission(&self) -> ContactSubmission {
        self.lock().submission().clone()
    }

    pub fn on_field_change(&self, field: ContactField, value: impl Into<String>) {
        self.lock().on_field_change(field, value);
    }

    /// Leaves a success or error state without waiting for the reset.
    pub fn dismiss(&self) {
        self.lock().dismiss();
    }

    #[tracing::instrument(skip(self))]
    pub async fn on_submit(&self) -> SubmitOutcome {
        let action = self.lock().begin_submit();

        let request = match action {
            SubmitAction::Ignored => {
                debug!("submission already in flight");
                return SubmitOutcome::Ignored;
            }
            SubmitAction::Rejected(err) => {
                debug!(%err, "submission rejected");
                return SubmitOutcome::Invalid(err);
            }
            SubmitAction::Silent(ticket) => {
                debug!("honeypot filled, skipping submission");
                self.schedule_reset(ticket, self.config.success_reset);
                return SubmitOutcome::BotSuspected;
            }
            SubmitAction::Send(request) => request,
        };

        let result = self.api.submit(&request).await;
        if let Err(err) = &result {
            warn!("failed to submit inquiry: {err:#}");
        }

        let ticket = self.lock().complete(&result);
        let delay = match result {
            Ok(_) => self.config.success_reset,
            Err(_) => self.config.error_reset,
        };
        if let Some(ticket) = ticket {
            self.schedule_reset(ticket, delay);
        }

        match result {
            Ok(message) if message.trim().is_empty() => SubmitOutcome::Delivered {
                message: DEFAULT_SUCCESS_MESSAGE.into(),
            },
            Ok(message) => SubmitOutcome::Delivered { message },
            Err(err) => SubmitOutcome::Failed {
                message: form::error_message(&err).into(),
            },
        }
    }

    fn schedule_reset(&self, ticket: ResetTicket, delay: Duration) {
        let form = Arc::clone(&self.form);
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                form.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .reset(ticket);
            }),
        );
    }

    fn lock(&self) -> MutexGuard<'_, ContactForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
