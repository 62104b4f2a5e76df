//! Fonte de score sobre HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};

use super::source::ScoreSource;
use crate::types::config::UpstreamConfig;
use crate::types::errors::{FetchError, FetchResult};
use crate::types::score::{fingerprint, ScorePayload};
use crate::ProxyResult;

/// Cabeçalho que identifica o cliente junto ao serviço de score.
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Cliente do serviço de score (`GET {base_url}/score?cpf=...`).
#[derive(Debug, Clone)]
pub struct HttpScoreSource {
    client: Client,
    score_url: String,
    client_id: String,
}

impl HttpScoreSource {
    /// Cria uma fonte a partir da configuração do upstream.
    pub fn from_config(config: &UpstreamConfig) -> ProxyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_client(client, &config.base_url, &config.client_id))
    }

    /// Cria uma fonte usando um cliente já construído.
    pub fn with_client(client: Client, base_url: &str, client_id: &str) -> Self {
        Self {
            client,
            score_url: format!("{}/score", base_url.trim_end_matches('/')),
            client_id: client_id.to_string(),
        }
    }

    /// URL completa do endpoint de score.
    pub fn score_url(&self) -> &str {
        &self.score_url
    }

    async fn read_payload(response: Response) -> FetchResult<ScorePayload> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::internal(format!("falha ao ler resposta: {}", e)))?;

        if !status.is_success() {
            return Err(FetchError::RemoteHttp {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::internal(format!("resposta não é JSON válido: {}", e)))
    }
}

#[async_trait]
impl ScoreSource for HttpScoreSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_score(&self, cpf: &str) -> FetchResult<ScorePayload> {
        tracing::debug!(url = %self.score_url, key = %fingerprint(cpf), "Calling score API");

        let response = self
            .client
            .get(&self.score_url)
            .query(&[("cpf", cpf)])
            .header(header::ACCEPT, "application/json")
            .header(CLIENT_ID_HEADER, self.client_id.as_str())
            .send()
            .await
            .map_err(|e| FetchError::internal(format!("falha de transporte: {}", e)))?;

        Self::read_payload(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_url_trims_trailing_slash() {
        let source = HttpScoreSource::with_client(Client::new(), "http://localhost/api/", "julio");
        assert_eq!(source.score_url(), "http://localhost/api/score");

        let source = HttpScoreSource::with_client(Client::new(), "http://localhost/api", "julio");
        assert_eq!(source.score_url(), "http://localhost/api/score");
    }

    #[test]
    fn test_from_config() {
        let config = UpstreamConfig {
            base_url: "https://score.example/api".to_string(),
            client_id: "julio".to_string(),
            timeout_secs: 5,
        };

        let source = HttpScoreSource::from_config(&config).unwrap();
        assert_eq!(source.score_url(), "https://score.example/api/score");
        assert_eq!(source.name(), "http");
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal() {
        // porta 9 (discard) em localhost: conexão recusada
        let source = HttpScoreSource::with_client(Client::new(), "http://127.0.0.1:9", "julio");

        let err = source.get_score("12345678900").await.unwrap_err();
        assert!(matches!(err, FetchError::Internal(_)));
    }
}
