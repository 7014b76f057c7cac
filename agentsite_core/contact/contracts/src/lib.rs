use std::future::Future;

use agentsite_models::contact::ContactMessage;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Forward a validated contact message to the site owner.
    fn send_message(
        &self,
        message: ContactMessage,
    ) -> impl Future<Output = Result<ContactSendMessageOutcome, ContactSendMessageError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSendMessageOutcome {
    /// The delivery provider accepted the notification.
    Delivered,
    /// Delivery is not configured, the message was only written to the log.
    Logged,
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error("Failed to send message.")]
    Delivery {
        /// Diagnostic text returned by the delivery provider, if any.
        detail: Option<String>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        message: ContactMessage,
        result: Result<ContactSendMessageOutcome, ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(message))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
