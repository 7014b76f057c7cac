//! Wiring of the concrete service implementations.

use std::sync::Arc;

use agentsite_client::{HttpContactApi, SubmissionClientConfig, TokioResetScheduler};
use agentsite_config::{ClientConfig, Config, EmailConfig};
use agentsite_core_contact_impl::{ContactFeatureConfig, DeliveryMode};
use agentsite_email_impl::{EmailServiceConfig, EmailServiceImpl};
use agentsite_templates_impl::TemplateServiceImpl;
use anyhow::Context;
use tracing::warn;

pub type EmailService = EmailServiceImpl;
pub type TemplateService = TemplateServiceImpl;
pub type ContactFeatureService =
    agentsite_core_contact_impl::ContactFeatureServiceImpl<EmailService, TemplateService>;
pub type RestServer = agentsite_api_rest::RestServer<ContactFeatureService>;
pub type SubmissionClient =
    agentsite_client::SubmissionClient<HttpContactApi, TokioResetScheduler>;

pub fn email_service(config: &EmailConfig) -> anyhow::Result<EmailService> {
    EmailServiceImpl::new(EmailServiceConfig {
        endpoint: config.endpoint.clone(),
        api_key: config.api_key().map(|x| x.to_owned().into()),
        from: config.from.clone(),
    })
    .context("Failed to create email service")
}

pub fn contact_feature_config(config: &Config) -> ContactFeatureConfig {
    let delivery = if config.email.api_key().is_some() {
        DeliveryMode::Enabled
    } else {
        warn!("email.api_key is not set, contact form submissions will only be logged");
        DeliveryMode::Demo
    };

    if delivery == DeliveryMode::Enabled && config.contact.owner.is_none() {
        warn!(
            "contact.owner is not set, contact form notifications will be sent to the \
             submitters instead of the site owner"
        );
    }

    ContactFeatureConfig {
        delivery,
        recipient: config.contact.owner.clone().map(Arc::new),
    }
}

pub fn rest_server(config: &Config) -> anyhow::Result<RestServer> {
    let email = email_service(&config.email)?;
    let template = TemplateServiceImpl::new()?;
    let contact = ContactFeatureService::new(email, template, contact_feature_config(config));

    Ok(RestServer::new(contact))
}

pub fn submission_client(config: &ClientConfig) -> SubmissionClient {
    SubmissionClient::new(
        HttpContactApi::new(config.endpoint.clone()),
        TokioResetScheduler,
        SubmissionClientConfig {
            success_reset: *config.success_reset,
            error_reset: *config.error_reset,
        },
    )
}
