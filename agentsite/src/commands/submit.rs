use std::time::Duration;

use agentsite_client::{SubmissionStatus, SubmitOutcome};
use agentsite_config::Config;
use agentsite_models::contact::{ContactField, InquirySubject};
use anyhow::bail;
use clap::Args;
use tracing::info;

use crate::environment;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    /// One of "Sales Inquiry", "Voice Agents Demo", "Partnership" or
    /// "Technical Support"
    #[arg(long, default_value_t)]
    subject: InquirySubject,
    #[arg(long)]
    message: String,
    /// Wait until the form returns to idle after the submission
    #[arg(long)]
    wait: bool,
}

impl SubmitArgs {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let client = environment::submission_client(&config.client);

        let fields = [
            (ContactField::Name, Some(self.name)),
            (ContactField::Email, Some(self.email)),
            (ContactField::Phone, self.phone),
            (ContactField::Company, self.company),
            (ContactField::Subject, Some(self.subject.to_string())),
            (ContactField::Message, Some(self.message)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                client.on_field_change(field, value);
            }
        }

        let outcome = client.on_submit().await;
        info!(status = ?client.status(), "submission finished");

        let result = match outcome {
            SubmitOutcome::Delivered { message } => {
                println!("{message}");
                Ok(())
            }
            SubmitOutcome::Invalid(err) => Err(anyhow::anyhow!(err)),
            SubmitOutcome::Failed { message } => Err(anyhow::anyhow!(message)),
            SubmitOutcome::BotSuspected | SubmitOutcome::Ignored => {
                bail!("Submission was not sent")
            }
        };

        if self.wait {
            let delay = match client.status() {
                SubmissionStatus::Success => *config.client.success_reset,
                _ => *config.client.error_reset,
            };
            tokio::time::sleep(delay + Duration::from_millis(100)).await;
            info!(status = ?client.status(), "form reset");
        }

        result
    }
}
