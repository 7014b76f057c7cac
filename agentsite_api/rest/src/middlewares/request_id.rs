//! Assign each request a unique ID

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use base64::{display::Base64Display, engine::general_purpose::STANDARD_NO_PAD};
use uuid::Uuid;

pub fn add<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    router.layer(from_fn(middleware))
}

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

async fn middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Base64Display::new(self.0.as_bytes(), &STANDARD_NO_PAD).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let id = RequestId(Uuid::from_u128(0x0192_d3a4_5b6c_7d8e_9fa0_b1c2_d3e4_f506));

        let encoded = id.to_string();

        assert_eq!(encoded.len(), 22);
        assert!(!encoded.contains('='));
        assert_ne!(encoded, RequestId::new().to_string());
    }
}
