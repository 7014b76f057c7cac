use std::sync::Arc;

use agentsite_email_contracts::{ContentType, Email, EmailSendError, EmailService};
use agentsite_models::{email_address::EmailAddressWithName, Sensitive};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::http::HttpClient;

pub mod http;

/// Default endpoint of the delivery provider's REST API.
pub const DEFAULT_ENDPOINT: &str = "https://api.resend.com/";

/// Delivers emails through the provider's `POST /emails` endpoint.
#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    config: Arc<EmailServiceConfig>,
    client: HttpClient,
}

#[derive(Debug, Clone)]
pub struct EmailServiceConfig {
    /// Base url of the provider API, must end with a `/`.
    pub endpoint: Url,
    /// Bearer token. Without it every send fails.
    pub api_key: Option<Sensitive<String>>,
    pub from: EmailAddressWithName,
}

impl EmailServiceImpl {
    pub fn new(config: EmailServiceConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config: config.into(),
            client: HttpClient::new().context("Failed to build http client")?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

impl EmailService for EmailServiceImpl {
    #[tracing::instrument(skip_all, fields(recipient = %email.recipient, subject = %email.subject))]
    async fn send(&self, email: Email) -> Result<(), EmailSendError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Email delivery is not configured"))?;

        let from = self.config.from.to_string();
        let to = [email.recipient.to_string()];
        let reply_to = email.reply_to.as_ref().map(ToString::to_string);
        let (html, text) = match email.content_type {
            ContentType::Html => (Some(email.body.as_str()), None),
            ContentType::Text => (None, Some(email.body.as_str())),
        };

        let request = SendEmailRequest {
            from: &from,
            to: &to,
            reply_to: reply_to.as_deref(),
            subject: &email.subject,
            html,
            text,
        };

        let url = self
            .config
            .endpoint
            .join("emails")
            .context("Failed to build email endpoint url")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach email provider")?;

        let status = response.status();
        if status.is_success() {
            let id = response
                .json::<SendEmailResponse>()
                .await
                .ok()
                .and_then(|x| x.id);
            debug!(?id, "email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let detail = provider_error_detail(&body);
        warn!(%status, ?detail, "email rejected by provider");

        Err(EmailSendError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Extracts the human readable part of an error response, falling back to the
/// raw body when it is not the provider's JSON error shape.
fn provider_error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorResponse>(body)
        .ok()
        .and_then(|x| x.message)
        .or_else(|| Some(body.trim().to_owned()))
        .filter(|x| !x.is_empty())
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorResponse {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail() {
        for (body, expected) in [
            (
                r#"{"statusCode":422,"message":"Invalid `to` field.","name":"validation_error"}"#,
                Some("Invalid `to` field."),
            ),
            ("upstream timeout\n", Some("upstream timeout")),
            ("", None),
            ("   ", None),
        ] {
            assert_eq!(provider_error_detail(body).as_deref(), expected);
        }
    }

    #[test]
    fn not_configured() {
        let sut = EmailServiceImpl::new(EmailServiceConfig {
            endpoint: DEFAULT_ENDPOINT.parse().unwrap(),
            api_key: None,
            from: "noreply@example.com".parse().unwrap(),
        })
        .unwrap();

        assert!(!sut.is_configured());
    }

    #[test]
    fn debug_hides_api_key() {
        let sut = EmailServiceImpl::new(EmailServiceConfig {
            endpoint: DEFAULT_ENDPOINT.parse().unwrap(),
            api_key: Some("re_secret_key".to_owned().into()),
            from: "noreply@example.com".parse().unwrap(),
        })
        .unwrap();

        let debug = format!("{sut:?}");

        assert!(sut.is_configured());
        assert!(!debug.contains("re_secret_key"), "{debug}");
        assert!(debug.contains("[sensitive]"), "{debug}");
    }
}
