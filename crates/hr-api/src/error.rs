use axum::{Json, http::StatusCode, response::IntoResponse};
use hr_common::RetrievalError;
use hr_common::embedding::EmbeddingError;
use hr_common::store::StoreError;
use serde::Serialize;
use std::{borrow::Cow, future::Future};
use thiserror::Error;
use tracing::error;

tokio::task_local! {
    static REQUEST_ID: String;
}

fn sanitize_message(message: &str) -> String {
    const MAX_LEN: usize = 240;

    let mut cleaned = message
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();

    cleaned = cleaned
        .split_whitespace()
        .map(|token| {
            if token.contains("://") {
                "[redacted-url]".to_string()
            } else if token.starts_with('/') || token.contains('\\') {
                "[redacted-path]".to_string()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.len() > MAX_LEN {
        let cut = (0..=MAX_LEN)
            .rev()
            .find(|idx| cleaned.is_char_boundary(*idx))
            .unwrap_or(0);
        cleaned.truncate(cut);
        cleaned.push('…');
    }

    if cleaned.trim().is_empty() {
        "unexpected error".to_string()
    } else {
        cleaned
    }
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    if let Some(request_id) = request_id {
        REQUEST_ID.scope(request_id, fut).await
    } else {
        fut.await
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unprocessable directory: {0}")]
    UnprocessableEntity(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("upstream model failed: {0}")]
    BadGateway(String),
    #[error("upstream model timed out: {0}")]
    GatewayTimeout(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.classify();
        let request_id = current_request_id();

        error!(
            code,
            status = %status,
            request_id = request_id.as_deref().unwrap_or(""),
            error = %self,
            "api_error"
        );

        let body = ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        };
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    /// HTTP status and stable machine-readable code.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::UnprocessableEntity(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_directory"),
            Self::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "too_many_requests"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            Self::BadGateway(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
            Self::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            Self::TooManyRequests(_) => Cow::Borrowed("too many requests"),
            Self::Internal(_) => Cow::Borrowed("internal server error"),
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::UnprocessableEntity(msg)
            | Self::ServiceUnavailable(msg)
            | Self::BadGateway(msg)
            | Self::GatewayTimeout(msg) => Cow::Owned(sanitize_message(msg)),
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(value: RetrievalError) -> Self {
        match value {
            RetrievalError::InvalidQuery(msg) => ApiError::BadRequest(msg),
            RetrievalError::RecordStoreUninitialized => {
                ApiError::ServiceUnavailable(value.code().into())
            }
            RetrievalError::EmbeddingUnavailable(_) | RetrievalError::GenerationUnavailable(_) => {
                ApiError::BadGateway(value.to_string())
            }
            RetrievalError::EmbeddingTimeout(_) | RetrievalError::GenerationTimeout(_) => {
                ApiError::GatewayTimeout(value.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Embedding(err @ EmbeddingError::Timeout(_)) => {
                ApiError::GatewayTimeout(err.to_string())
            }
            StoreError::Embedding(err) => ApiError::BadGateway(err.to_string()),
            StoreError::Worker(msg) => ApiError::Internal(msg),
            other => ApiError::UnprocessableEntity(other.to_string()),
        }
    }
}
