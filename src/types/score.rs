//! Tipos de requisição e resposta de score.

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Corpo devolvido pelo serviço de score, repassado sem alterações.
pub type ScorePayload = serde_json::Value;

/// Query string de `GET /proxy_scores`.
///
/// `cpf` ausente vira string vazia, recusada pelo handler com 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreQuery {
    /// CPF consultado, repassado sem normalização.
    #[serde(default)]
    pub cpf: String,
}

/// Impressão digital curta de um CPF, para logs.
///
/// CPFs não aparecem em claro nos logs; os 12 primeiros dígitos hex do
/// SHA256 bastam para correlacionar requisições da mesma chave.
pub fn fingerprint(cpf: &str) -> String {
    let digest = Sha256::digest(cpf.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(12);
    encoded
}
