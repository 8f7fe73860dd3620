use std::{error::Error, fmt, net::SocketAddr};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    consent_event::ConsentEvent, db_service, discord, request_metadata::RequestMetadata,
    AppState,
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConsentResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl ConsentResponse {
    fn ok() -> Self {
        ConsentResponse {
            ok: true,
            error: None,
        }
    }

    fn error(message: &'static str) -> Self {
        ConsentResponse {
            ok: false,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub enum ConsentError {
    MethodNotAllowed,
    ConsentNotProvided,
    Internal(anyhow::Error),
}

impl fmt::Display for ConsentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConsentError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            ConsentError::ConsentNotProvided => write!(f, "consent not provided"),
            ConsentError::Internal(e) => write!(f, "{e:#}"),
        }
    }
}

impl Error for ConsentError {}

impl From<anyhow::Error> for ConsentError {
    fn from(err: anyhow::Error) -> ConsentError {
        ConsentError::Internal(err)
    }
}

impl IntoResponse for ConsentError {
    fn into_response(self) -> Response {
        match self {
            ConsentError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, HeaderValue::from_static("POST"))],
                Json(ConsentResponse::error("Method Not Allowed")),
            )
                .into_response(),
            ConsentError::ConsentNotProvided => (
                StatusCode::BAD_REQUEST,
                Json(ConsentResponse::error("consent not provided")),
            )
                .into_response(),
            ConsentError::Internal(e) => {
                error!("Unexpected error in /api/consent: {:#}", e);
                server_error_response()
            }
        }
    }
}

pub(crate) fn server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ConsentResponse::error("server error")),
    )
        .into_response()
}

/// Validated inbound body.
#[derive(Debug, PartialEq, Eq)]
pub struct ConsentPayload {
    pub consent: bool,
}

enum BodyFormat {
    Json,
    Form,
    Opaque,
}

impl ConsentPayload {
    pub fn parse(headers: &HeaderMap, body: &[u8]) -> anyhow::Result<Self> {
        let consent = match body_format(headers) {
            BodyFormat::Json => {
                if body.iter().all(u8::is_ascii_whitespace) {
                    false
                } else {
                    let value: Value =
                        serde_json::from_slice(body).context("failed to parse JSON body")?;
                    value.get("consent").map(is_truthy).unwrap_or(false)
                }
            }
            BodyFormat::Form => url::form_urlencoded::parse(body)
                .find(|(key, _)| key == "consent")
                .map(|(_, value)| !value.is_empty())
                .unwrap_or(false),
            BodyFormat::Opaque => false,
        };

        Ok(ConsentPayload { consent })
    }
}

fn body_format(headers: &HeaderMap) -> BodyFormat {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" || essence.ends_with("+json") {
        BodyFormat::Json
    } else if essence == "application/x-www-form-urlencoded" {
        BodyFormat::Form
    } else {
        BodyFormat::Opaque
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub async fn handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Bytes,
) -> Response {
    let peer_addr = connect_info.map(|ConnectInfo(addr)| addr);
    match record_consent(&state, &method, &headers, peer_addr, &body).await {
        Ok(()) => (StatusCode::OK, Json(ConsentResponse::ok())).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn record_consent(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    peer_addr: Option<SocketAddr>,
    body: &[u8],
) -> Result<(), ConsentError> {
    if *method != Method::POST {
        return Err(ConsentError::MethodNotAllowed);
    }

    let payload = ConsentPayload::parse(headers, body)?;
    if !payload.consent {
        return Err(ConsentError::ConsentNotProvided);
    }

    let metadata = RequestMetadata::from_parts(headers, peer_addr);
    let event = ConsentEvent::new(metadata, &state.config);
    debug!("Recording consent: {:?}", event);

    let record = event.record();
    tokio::join!(
        db_service::record_consent(
            &state.http_client,
            state.config.supabase.as_ref(),
            &record
        ),
        discord::send_consent_webhook(state.config.discord_webhook_url.as_deref(), &event),
    );

    Ok(())
}
