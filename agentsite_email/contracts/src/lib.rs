use std::future::Future;

use agentsite_models::email_address::EmailAddressWithName;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Hand the email to the delivery provider.
    ///
    /// No retries are attempted. A rejected email is reported as
    /// [`EmailSendError::Rejected`] together with the provider's explanation.
    fn send(&self, email: Email) -> impl Future<Output = Result<(), EmailSendError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("Email provider rejected the message with status {status}.")]
    Rejected {
        status: u16,
        /// Diagnostic text returned by the provider, if any.
        detail: Option<String>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<(), EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
