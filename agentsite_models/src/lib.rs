use std::ops::Deref;

use serde::{Deserialize, Serialize};

pub mod contact;
pub mod email_address;
pub mod validation;

/// Wrapper for secrets that must not end up in logs.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive<T>(pub T);

impl<T> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[sensitive]")
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Sensitive<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_debug_is_redacted() {
        let secret = Sensitive::from("re_123".to_owned());
        assert_eq!(format!("{secret:?}"), "[sensitive]");
        assert_eq!(secret.as_str(), "re_123");
    }
}
