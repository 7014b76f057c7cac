use std::sync::Arc;

use agentsite_core_contact_contracts::{
    ContactFeatureService, ContactSendMessageError, ContactSendMessageOutcome,
};
use agentsite_email_contracts::{ContentType, Email, EmailSendError, EmailService};
use agentsite_models::{contact::ContactMessage, email_address::EmailAddressWithName};
use agentsite_templates_contracts::{ContactNotificationTemplate, TemplateService};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<Email, Template> {
    email: Email,
    template: Template,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub delivery: DeliveryMode,
    /// Where notifications are sent. Without an owner address they are sent
    /// back to the submitter, which is only useful for testing a deployment.
    pub recipient: Option<Arc<EmailAddressWithName>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Notifications are sent through the email service.
    Enabled,
    /// No delivery credential is configured. Submissions are logged and
    /// acknowledged as if they had been delivered.
    Demo,
}

impl<Email, Template> ContactFeatureServiceImpl<Email, Template> {
    pub fn new(email: Email, template: Template, config: ContactFeatureConfig) -> Self {
        Self {
            email,
            template,
            config,
        }
    }
}

impl<EmailS, Template> ContactFeatureService for ContactFeatureServiceImpl<EmailS, Template>
where
    EmailS: EmailService,
    Template: TemplateService,
{
    #[tracing::instrument(skip_all, fields(subject = message.subject.as_str()))]
    async fn send_message(
        &self,
        message: ContactMessage,
    ) -> Result<ContactSendMessageOutcome, ContactSendMessageError> {
        let ContactMessage {
            author,
            subject,
            content,
        } = message;

        if self.config.delivery == DeliveryMode::Demo {
            info!(
                name = author.name.as_str(),
                email = author.email.as_str(),
                phone = author.phone.as_deref().map(String::as_str),
                company = author.company.as_deref().map(String::as_str),
                subject = subject.as_str(),
                message = content.as_str(),
                "email delivery is not configured, inquiry logged for manual follow-up"
            );
            return Ok(ContactSendMessageOutcome::Logged);
        }

        let body = self.template.render(&ContactNotificationTemplate {
            name: author.name.to_string(),
            email: author.email.to_string(),
            phone: author.phone.as_ref().map(|x| x.to_string()),
            company: author.company.as_ref().map(|x| x.to_string()),
            subject: subject.to_string(),
            message: content.to_string(),
        })?;

        let recipient = match &self.config.recipient {
            Some(recipient) => (**recipient).clone(),
            None => {
                warn!("no owner address configured, sending the inquiry to its submitter");
                author.email.clone().into()
            }
        };

        let email = Email {
            recipient,
            subject: format!("[Contact Form] {} from {}", subject.as_str(), author.name.as_str()),
            body,
            content_type: ContentType::Html,
            reply_to: Some(author.email.into()),
        };

        match self.email.send(email).await {
            Ok(()) => {
                info!("inquiry delivered");
                Ok(ContactSendMessageOutcome::Delivered)
            }
            Err(EmailSendError::Rejected { status, detail }) => {
                error!(status, ?detail, "failed to deliver inquiry");
                Err(ContactSendMessageError::Delivery { detail })
            }
            Err(EmailSendError::Other(err)) => Err(err.into()),
        }
    }
}
