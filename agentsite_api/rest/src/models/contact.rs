use agentsite_models::contact::ContactMessageDraft;
use serde::Deserialize;

/// Body of `POST /api/contact`. Every field is optional here so that missing
/// fields produce the same error as blank ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContactMessage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ApiContactMessage> for ContactMessageDraft {
    fn from(value: ApiContactMessage) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            company: value.company,
            subject: value.subject,
            message: value.message,
        }
    }
}
