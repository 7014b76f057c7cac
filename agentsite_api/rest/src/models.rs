use serde::Serialize;

pub mod contact;

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Serialize)]
pub struct ApiSuccess {
    pub success: bool,
    pub message: &'static str,
}
