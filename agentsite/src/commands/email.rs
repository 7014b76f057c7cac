use agentsite_config::Config;
use agentsite_email_contracts::{ContentType, Email, EmailSendError, EmailService};
use agentsite_models::email_address::EmailAddressWithName;
use anyhow::{bail, ensure};
use clap::Subcommand;

use crate::environment;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = environment::email_service(&config.email)?;
    ensure!(
        email_service.is_configured(),
        "email.api_key is not set, nothing can be sent"
    );

    let result = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: "Email deliverability seems to be working!".into(),
            content_type: ContentType::Text,
            reply_to: None,
        })
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(EmailSendError::Rejected { status, detail }) => bail!(
            "Email provider rejected the email with status {status}: {}",
            detail.as_deref().unwrap_or("no details")
        ),
        Err(EmailSendError::Other(err)) => Err(err.context("Failed to send email")),
    }
}
