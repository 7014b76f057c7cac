use std::{ops::Deref, sync::LazyLock};

use agentsite_utils::agentsite_version;

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    let homepage = env!("CARGO_PKG_HOMEPAGE");
    let repository = env!("CARGO_PKG_REPOSITORY");
    let version = agentsite_version();

    format!("Agentsite Contact Relay ({homepage}, {repository}, Version {version})")
});

const _: () = {
    assert!(!env!("CARGO_PKG_HOMEPAGE").is_empty());
    assert!(!env!("CARGO_PKG_REPOSITORY").is_empty());
};

#[derive(Debug, Clone)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        reqwest::Client::builder()
            .user_agent(&*USER_AGENT)
            .build()
            .map(Self)
            .map_err(Into::into)
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
