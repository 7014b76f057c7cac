use std::sync::Arc;

use agentsite_core_contact_contracts::{
    ContactFeatureService, ContactSendMessageError, ContactSendMessageOutcome,
};
use agentsite_models::contact::{ContactMessage, ContactMessageDraft, ContactMessageError};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use tracing::debug;

use crate::{
    errors::{error, internal_server_error},
    models::{contact::ApiContactMessage, ApiSuccess},
};

pub const DELIVERED_MESSAGE: &str = "Thank you! Your inquiry has been sent.";
pub const DEMO_MESSAGE: &str = "Inquiry received (demo mode: email delivery is not configured).";
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email.";

/// Upper bound for request bodies, well above the largest valid message.
pub const BODY_LIMIT: usize = 64 * 1024;

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactFeatureService>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(err) => {
            debug!("failed to read contact request: {err}");
            return bad_request(ContactMessageError::MissingFields);
        }
    };

    // The content type is not enforced, anything that parses as a JSON object
    // is accepted.
    let draft = match serde_json::from_slice::<ApiContactMessage>(&body) {
        Ok(message) => ContactMessageDraft::from(message),
        Err(err) => {
            debug!("failed to parse contact request: {err}");
            return bad_request(ContactMessageError::MissingFields);
        }
    };

    let message = match ContactMessage::try_from(draft) {
        Ok(message) => message,
        Err(err) => {
            debug!(%err, "rejected contact request");
            return bad_request(err);
        }
    };

    match service.send_message(message).await {
        Ok(ContactSendMessageOutcome::Delivered) => success(DELIVERED_MESSAGE),
        Ok(ContactSendMessageOutcome::Logged) => success(DEMO_MESSAGE),
        Err(ContactSendMessageError::Delivery { detail }) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            detail.unwrap_or_else(|| DELIVERY_FAILED_MESSAGE.into()),
        ),
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}

fn bad_request(err: ContactMessageError) -> Response {
    error(StatusCode::BAD_REQUEST, err.to_string())
}

fn success(message: &'static str) -> Response {
    Json(ApiSuccess {
        success: true,
        message,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use agentsite_core_contact_contracts::MockContactFeatureService;
    use agentsite_models::contact::ContactMessageAuthor;
    use axum::{body::Body, http::Request};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::RestServer;

    async fn post(service: MockContactFeatureService, body: impl Into<Body>) -> (StatusCode, Value) {
        let router = RestServer::new(service).router();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn request() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@co.com",
            "phone": "",
            "subject": "Voice Agents Demo",
            "message": "We need an AI voice agent for support.",
        })
    }

    fn message() -> ContactMessage {
        ContactMessage {
            author: ContactMessageAuthor {
                name: "Jane Doe".try_into().unwrap(),
                email: "jane@co.com".parse().unwrap(),
                phone: None,
                company: None,
            },
            subject: "Voice Agents Demo".try_into().unwrap(),
            content: "We need an AI voice agent for support.".try_into().unwrap(),
        }
    }

    #[tokio::test]
    async fn delivered() {
        // Arrange
        let service = MockContactFeatureService::new()
            .with_send_message(message(), Ok(ContactSendMessageOutcome::Delivered));

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": true, "message": "Thank you! Your inquiry has been sent." })
        );
    }

    #[tokio::test]
    async fn demo_mode() {
        // Arrange
        let service = MockContactFeatureService::new()
            .with_send_message(message(), Ok(ContactSendMessageOutcome::Logged));

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["message"],
            "Inquiry received (demo mode: email delivery is not configured)."
        );
    }

    #[tokio::test]
    async fn missing_fields() {
        for request in [
            json!({ "email": "jane@co.com", "message": "We need an AI voice agent." }),
            json!({ "name": "Jane", "email": "  ", "message": "We need an AI voice agent." }),
            json!({ "name": "Jane", "email": "jane@co.com", "message": null }),
            json!({}),
        ] {
            // Act
            let (status, body) = post(MockContactFeatureService::new(), request.to_string()).await;

            // Assert
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Required fields are missing." }));
        }
    }

    #[tokio::test]
    async fn malformed_body() {
        for body in ["", "not json", "[1, 2, 3]", r#"{"name": 42}"#] {
            // Act
            let (status, body) = post(MockContactFeatureService::new(), body).await;

            // Assert
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "Required fields are missing." }));
        }
    }

    #[tokio::test]
    async fn body_too_large() {
        // Arrange
        let mut request = request();
        request["message"] = "x".repeat(BODY_LIMIT).into();

        // Act
        let (status, body) = post(MockContactFeatureService::new(), request.to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Required fields are missing." }));
    }

    #[tokio::test]
    async fn invalid_email() {
        // Arrange
        let mut request = request();
        request["email"] = "jane@co".into();

        // Act
        let (status, body) = post(MockContactFeatureService::new(), request.to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid email address." }));
    }

    #[tokio::test]
    async fn field_too_long() {
        // Arrange
        let mut request = request();
        request["name"] = "x".repeat(257).into();

        // Act
        let (status, body) = post(MockContactFeatureService::new(), request.to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Field exceeds maximum length." }));
    }

    #[tokio::test]
    async fn delivery_failed() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            message(),
            Err(ContactSendMessageError::Delivery {
                detail: Some("The gmail.com domain is not verified.".into()),
            }),
        );

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "The gmail.com domain is not verified." }));
    }

    #[tokio::test]
    async fn delivery_failed_without_detail() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            message(),
            Err(ContactSendMessageError::Delivery { detail: None }),
        );

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to send email." }));
    }

    #[tokio::test]
    async fn unexpected_error() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            message(),
            Err(ContactSendMessageError::Other(anyhow::anyhow!(
                "template rendering failed"
            ))),
        );

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error." }));
    }

    #[tokio::test]
    async fn handler_panics() {
        // Arrange
        let mut service = MockContactFeatureService::new();
        service
            .expect_send_message()
            .once()
            .returning(|_| {
                Box::pin(futures::future::lazy(
                    |_| -> Result<ContactSendMessageOutcome, ContactSendMessageError> {
                        panic!("boom")
                    },
                ))
            });

        // Act
        let (status, body) = post(service, request().to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error." }));
    }
}
