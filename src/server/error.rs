//! Erros dos endpoints e seu mapeamento para respostas HTTP.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::types::errors::FetchError;

/// Erro de um endpoint, já com o status HTTP decidido.
#[derive(Debug)]
pub struct ResponseError {
    status: StatusCode,
    kind: ErrorBody,
}

#[derive(Debug)]
enum ErrorBody {
    /// `{"detail": ...}`
    Detail(String),
    /// Corpo do serviço de score, repassado como veio.
    Passthrough(String),
}

impl ResponseError {
    /// Erro com corpo `{"detail": msg}`.
    pub fn detail(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind: ErrorBody::Detail(msg.into()),
        }
    }

    /// Status HTTP da resposta.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<FetchError> for ResponseError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Overloaded => Self::detail(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            FetchError::DeadlineExceeded => {
                Self::detail(StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            FetchError::RemoteHttp { status, body } => match StatusCode::from_u16(status) {
                Ok(status) => Self {
                    status,
                    kind: ErrorBody::Passthrough(body),
                },
                Err(_) => Self::detail(
                    StatusCode::BAD_GATEWAY,
                    format!("serviço de score respondeu status inválido {}", status),
                ),
            },
            FetchError::Internal(msg) => Self::detail(StatusCode::INTERNAL_SERVER_ERROR, msg),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "Responding with server error");
        }

        match self.kind {
            ErrorBody::Detail(detail) => {
                let mut response = Json(ApiErrorResponse { detail }).into_response();
                *response.status_mut() = self.status;
                response
            }
            ErrorBody::Passthrough(body) => {
                let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                    "application/json"
                } else {
                    "text/plain; charset=utf-8"
                };
                let mut response = (self.status, body).into_response();
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                response
            }
        }
    }
}

/// Corpo de erro da API.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub detail: String,
}
