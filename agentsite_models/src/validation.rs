//! Field checks that run before any network I/O.
//!
//! The same rules back the form state in the client and the shape check in the
//! relay endpoint, so both sides agree on what a deliverable submission is.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::contact::ContactSubmission;

/// Minimum number of characters of a message after trimming.
pub const MESSAGE_MIN_LEN: usize = 10;

pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Returns whether `email` has the basic shape of an email address: exactly one
/// `@`, no whitespace and a dot in the domain part. No DNS or mailbox checks.
///
/// The address must also be accepted by the mailbox parser the relay uses for
/// the `reply_to` header.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.parse::<lettre::Address>().is_ok()
}

/// Returns whether `submission` may be sent to the relay endpoint.
pub fn is_submittable(submission: &ContactSubmission) -> bool {
    submission.honeypot.is_empty() && submission.validate().is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClientValidationError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please tell us a little more about your needs (at least 10 characters).")]
    MessageTooShort,
    #[error("Please fill in all required fields.")]
    MissingRequiredField,
}

impl ContactSubmission {
    /// Checks the user-editable fields. The honeypot is not considered here.
    ///
    /// The email is checked first, then the message, then the name, so each
    /// field produces the same error regardless of the state of later fields.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if !is_valid_email(self.email.trim()) {
            return Err(ClientValidationError::InvalidEmail);
        }

        if self.message.trim().chars().count() < MESSAGE_MIN_LEN {
            return Err(ClientValidationError::MessageTooShort);
        }

        if self.name.trim().is_empty() {
            return Err(ClientValidationError::MissingRequiredField);
        }

        Ok(())
    }
}
