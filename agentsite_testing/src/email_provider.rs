use std::{net::IpAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

const EMAILS_ROUTE: &str = "/emails";

pub async fn start_server(
    host: IpAddr,
    port: u16,
    api_key: String,
    fail_with: Option<u16>,
) -> anyhow::Result<()> {
    let fail_with = fail_with
        .map(StatusCode::from_u16)
        .transpose()
        .context("Invalid status code")?;

    info!("Starting email provider testing server on {host}:{port}");
    info!("Email endpoint: http://{host}:{port}/");
    info!("API key: {api_key:?}");
    if let Some(status) = fail_with {
        info!("Every email will be rejected with status {status}");
    }
    info!("Received emails can be listed with GET http://{host}:{port}{EMAILS_ROUTE}");

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router(api_key, fail_with))
        .await
        .context("Failed to start HTTP server")
}

pub fn router(api_key: String, fail_with: Option<StatusCode>) -> Router<()> {
    Router::new()
        .route(EMAILS_ROUTE, routing::post(send_email).get(list_emails))
        .with_state(Arc::new(StateInner {
            api_key,
            fail_with,
            emails: Default::default(),
        }))
}

type ProviderState = State<Arc<StateInner>>;
struct StateInner {
    api_key: String,
    fail_with: Option<StatusCode>,
    emails: RwLock<Vec<ReceivedEmail>>,
}

#[derive(Debug, Clone, Deserialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    #[serde(default)]
    reply_to: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ReceivedEmail {
    id: Uuid,
    from: String,
    to: Vec<String>,
    reply_to: Option<String>,
    subject: String,
    html: Option<String>,
    text: Option<String>,
}

async fn send_email(
    state: ProviderState,
    headers: HeaderMap,
    Json(request): Json<SendEmailRequest>,
) -> Response {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|x| x.to_str().ok())
        .and_then(|x| x.strip_prefix("Bearer "))
        .is_some_and(|x| x == state.api_key);
    if !authorized {
        return provider_error(StatusCode::UNAUTHORIZED, "API key is invalid");
    }

    if let Some(status) = state.fail_with {
        return provider_error(status, "Email rejected by the testing server");
    }

    if request.to.is_empty() {
        return provider_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The `to` field must contain at least one recipient.",
        );
    }
    if request.html.is_none() && request.text.is_none() {
        return provider_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Either `html` or `text` must be provided.",
        );
    }

    let email = ReceivedEmail {
        id: Uuid::now_v7(),
        from: request.from,
        to: request.to,
        reply_to: request.reply_to,
        subject: request.subject,
        html: request.html,
        text: request.text,
    };
    info!(
        id = %email.id,
        from = email.from.as_str(),
        to = ?email.to,
        reply_to = email.reply_to.as_deref(),
        subject = email.subject.as_str(),
        "received email"
    );

    let id = email.id;
    state.emails.write().await.push(email);

    Json(json!({ "id": id })).into_response()
}

async fn list_emails(state: ProviderState) -> Json<Vec<ReceivedEmail>> {
    Json(state.emails.read().await.clone())
}

fn provider_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "name": "validation_error",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    async fn call(router: Router<()>, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn send(api_key: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/emails")
            .header("authorization", format!("Bearer {api_key}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "from": "Website <noreply@example.com>",
                    "to": ["owner@example.com"],
                    "reply_to": "jane@co.com",
                    "subject": "[Contact Form] Sales Inquiry from Jane Doe",
                    "html": "<p>Hello</p>",
                })
                .to_string(),
            ))
            .unwrap()
    }

    fn list() -> Request<Body> {
        Request::builder()
            .uri("/emails")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_and_lists_emails() {
        let router = router("re_test_key".into(), None);

        let (status, body) = call(router.clone(), send("re_test_key")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].is_string());

        let (status, body) = call(router, list()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["reply_to"], "jane@co.com");
        assert_eq!(body[0]["subject"], "[Contact Form] Sales Inquiry from Jane Doe");
    }

    #[tokio::test]
    async fn rejects_wrong_api_key() {
        let router = router("re_test_key".into(), None);

        let (status, body) = call(router.clone(), send("re_other")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "API key is invalid");

        let (_, body) = call(router, list()).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn fails_on_request() {
        let router = router("re_test_key".into(), Some(StatusCode::FORBIDDEN));

        let (status, body) = call(router, send("re_test_key")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["statusCode"], 403);
    }
}
