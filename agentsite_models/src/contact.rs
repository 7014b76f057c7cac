use nutype::nutype;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use thiserror::Error;

use crate::{email_address::EmailAddress, validation::is_valid_email};

/// The category of an inquiry, as offered by the "I'm interested in..." select.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    VariantArray,
)]
pub enum InquirySubject {
    #[default]
    #[serde(rename = "Sales Inquiry")]
    #[strum(serialize = "Sales Inquiry")]
    SalesInquiry,
    #[serde(rename = "Voice Agents Demo")]
    #[strum(serialize = "Voice Agents Demo")]
    VoiceAgentsDemo,
    #[serde(rename = "Partnership")]
    #[strum(serialize = "Partnership")]
    Partnership,
    #[serde(rename = "Technical Support")]
    #[strum(serialize = "Technical Support")]
    TechnicalSupport,
}

/// The contact form as edited by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: InquirySubject,
    pub message: String,
    /// Hidden field. Humans never see it, so anything in here came from a bot.
    pub honeypot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Company,
    Subject,
    Message,
    Honeypot,
}

impl ContactSubmission {
    /// Updates a single field. Unknown subjects leave the current selection in
    /// place.
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Company => self.company = value,
            ContactField::Subject => {
                if let Ok(subject) = value.parse() {
                    self.subject = subject;
                }
            }
            ContactField::Message => self.message = value,
            ContactField::Honeypot => self.honeypot = value,
        }
    }
}

/// A contact message that passed server side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: EmailAddress,
    pub phone: Option<ContactMessageAuthorPhone>,
    pub company: Option<ContactMessageAuthorCompany>,
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 64),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorPhone(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorCompany(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageSubject(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 8192),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

/// The untrusted fields of a contact request, exactly as they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessageDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactMessageError {
    #[error("Required fields are missing.")]
    MissingFields,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Field exceeds maximum length.")]
    FieldTooLong,
}

impl TryFrom<ContactMessageDraft> for ContactMessage {
    type Error = ContactMessageError;

    fn try_from(draft: ContactMessageDraft) -> Result<Self, Self::Error> {
        fn required(value: Option<String>) -> Result<String, ContactMessageError> {
            value
                .filter(|x| !x.trim().is_empty())
                .ok_or(ContactMessageError::MissingFields)
        }

        fn optional<T, E>(
            value: Option<String>,
            parse: impl FnOnce(String) -> Result<T, E>,
        ) -> Result<Option<T>, ContactMessageError> {
            value
                .filter(|x| !x.trim().is_empty())
                .map(parse)
                .transpose()
                .map_err(|_| ContactMessageError::FieldTooLong)
        }

        let name = required(draft.name)?;
        let email = required(draft.email)?;
        let message = required(draft.message)?;

        let email = email.trim();
        if !is_valid_email(email) {
            return Err(ContactMessageError::InvalidEmail);
        }
        let email = email
            .parse::<EmailAddress>()
            .map_err(|_| ContactMessageError::InvalidEmail)?;

        let subject = draft
            .subject
            .filter(|x| !x.trim().is_empty())
            .unwrap_or_else(|| InquirySubject::default().to_string());

        Ok(Self {
            author: ContactMessageAuthor {
                name: name
                    .try_into()
                    .map_err(|_| ContactMessageError::FieldTooLong)?,
                email,
                phone: optional(draft.phone, |x| ContactMessageAuthorPhone::try_new(x))?,
                company: optional(draft.company, |x| {
                    ContactMessageAuthorCompany::try_new(x)
                })?,
            },
            subject: subject
                .try_into()
                .map_err(|_| ContactMessageError::FieldTooLong)?,
            content: message
                .try_into()
                .map_err(|_| ContactMessageError::FieldTooLong)?,
        })
    }
}
