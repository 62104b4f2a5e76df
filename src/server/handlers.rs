//! Handlers dos endpoints HTTP.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::Instrument;

use super::ResponseError;
use crate::engine::{ProxyStats, ScoreProxy};
use crate::types::score::{fingerprint, ScorePayload, ScoreQuery};

/// `GET /proxy_scores?cpf=...`
pub async fn proxy_scores(
    State(proxy): State<ScoreProxy>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScorePayload>, ResponseError> {
    if query.cpf.trim().is_empty() {
        return Err(ResponseError::detail(
            StatusCode::BAD_REQUEST,
            "parâmetro cpf ausente ou vazio",
        ));
    }
    let cpf = query.cpf.as_str();

    let span = tracing::info_span!(
        "proxy_scores",
        request_id = %uuid::Uuid::new_v4(),
        key = %fingerprint(cpf),
    );

    async move {
        match proxy.fetch(cpf).await {
            Ok(payload) => Ok(Json(payload)),
            Err(e) => {
                tracing::info!(error = %e, "Score request failed");
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}

/// `GET /stats`
pub async fn stats(State(proxy): State<ScoreProxy>) -> Json<ProxyStats> {
    Json(proxy.stats())
}

/// `GET /healthcheck`
pub async fn healthcheck() -> &'static str {
    "ok"
}
