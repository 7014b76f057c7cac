use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use agentsite_models::{email_address::EmailAddressWithName, Sensitive};
use anyhow::Context;
use config::{Environment, File, FileFormat};
pub use duration::Duration;
use serde::Deserialize;
use url::Url;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files, later files override earlier ones.
pub const CONFIG_PATHS_ENV: &str = "AGENTSITE_CONFIG";

/// Prefix of environment variables overriding single values, e.g.
/// `AGENTSITE__EMAIL__API_KEY`.
pub const ENV_PREFIX: &str = "AGENTSITE";

/// Load the config from the files in `AGENTSITE_CONFIG` (or the bundled
/// default config) and apply environment overrides.
pub fn load() -> anyhow::Result<Config> {
    let paths = match std::env::var(CONFIG_PATHS_ENV) {
        Ok(paths) => paths
            .split(':')
            .filter(|x| !x.is_empty())
            .map(PathBuf::from)
            .collect(),
        Err(_) => vec![PathBuf::from(DEFAULT_CONFIG_PATH)],
    };

    build(&paths, &[], true)
}

/// Load the config from `paths` without looking at the environment, then
/// apply the given TOML snippets on top.
pub fn load_with_override(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    build(paths, overrides, false)
}

pub fn load_dev_config() -> anyhow::Result<Config> {
    load_with_override(&[Path::new(DEFAULT_CONFIG_PATH)], &[])
}

fn build(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
    environment: bool,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = overrides.iter().fold(builder, |builder, &snippet| {
        builder.add_source(File::from_str(snippet, FileFormat::Toml))
    });

    let builder = if environment {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
    } else {
        builder
    };

    builder
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub client: ClientConfig,
    pub sentry: Option<SentryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    /// Base url of the delivery provider API.
    pub endpoint: Url,
    /// Without an api key the relay runs in demo mode.
    pub api_key: Option<Sensitive<String>>,
    pub from: EmailAddressWithName,
}

impl EmailConfig {
    /// Returns the api key, treating an empty value like a missing one.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Recipient of contact notifications.
    pub owner: Option<EmailAddressWithName>,
}

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Url of the relay endpoint as seen by the submission client.
    pub endpoint: Url,
    pub success_reset: Duration,
    pub error_reset: Duration,
}

#[derive(Debug, Deserialize)]
pub struct SentryConfig {
    pub dsn: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let config = load_dev_config().unwrap();
        assert_eq!(config.http.port, 8000);
        assert_eq!(*config.client.success_reset, std::time::Duration::from_secs(6));
        assert_eq!(*config.client.error_reset, std::time::Duration::from_secs(5));
        assert!(config.sentry.is_none());
    }

    #[test]
    fn override_values() {
        let config = load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &[
                "email.api_key = \"re_test\"",
                "contact.owner = \"Owner <owner@example.com>\"",
            ],
        )
        .unwrap();

        assert_eq!(config.email.api_key(), Some("re_test"));
        assert_eq!(
            config.contact.owner.unwrap().to_string(),
            "Owner <owner@example.com>"
        );
    }

    #[test]
    fn blank_api_key_is_missing() {
        let config = load_with_override(
            &[Path::new(DEFAULT_CONFIG_PATH)],
            &["email.api_key = \"  \""],
        )
        .unwrap();

        assert_eq!(config.email.api_key(), None);
    }

    #[test]
    fn missing_file() {
        let result = load_with_override(&[Path::new("/does/not/exist.toml")], &[]);
        assert!(result.is_err());
    }
}
