use std::{future::Future, sync::Arc};

use agentsite_models::contact::{ContactSubmission, InquirySubject};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Transport to the relay endpoint.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ContactApi: Send + Sync + 'static {
    /// Send the request and return the confirmation text of a successful
    /// response.
    fn submit(
        &self,
        request: &ContactRequest,
    ) -> impl Future<Output = Result<String, ContactApiError>> + Send;
}

/// The JSON body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: InquirySubject,
    pub message: String,
}

impl From<&ContactSubmission> for ContactRequest {
    /// Trims every field and drops the honeypot.
    fn from(submission: &ContactSubmission) -> Self {
        fn optional(value: &str) -> Option<String> {
            Some(value.trim()).filter(|x| !x.is_empty()).map(Into::into)
        }

        Self {
            name: submission.name.trim().into(),
            email: submission.email.trim().into(),
            phone: optional(&submission.phone),
            company: optional(&submission.company),
            subject: submission.subject,
            message: submission.message.trim().into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactApiError {
    /// The endpoint answered with a non-2xx status.
    #[error("Relay endpoint responded with status {status}.")]
    Rejected {
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// [`ContactApi`] implementation talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContactApi {
    endpoint: Arc<Url>,
    client: reqwest::Client,
}

impl HttpContactApi {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ContactApi for HttpContactApi {
    async fn submit(&self, request: &ContactRequest) -> Result<String, ContactApiError> {
        let response = self
            .client
            .post((*self.endpoint).clone())
            .json(request)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        let status = response.status();
        let body = response
            .json::<RelayResponse>()
            .await
            .inspect_err(|err| debug!("failed to parse relay response: {err}"))
            .ok();

        if status.is_success() {
            return Ok(body.and_then(|x| x.message).unwrap_or_default());
        }

        Err(ContactApiError::Rejected {
            status: status.as_u16(),
            message: body.and_then(|x| x.error).filter(|x| !x.trim().is_empty()),
        })
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockContactApi {
    pub fn with_submit(
        mut self,
        request: ContactRequest,
        result: Result<String, ContactApiError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
