//! Trait base para fontes de score.

use async_trait::async_trait;

use crate::types::errors::FetchResult;
use crate::types::score::ScorePayload;

/// Serviço externo que devolve o score de um CPF.
///
/// O motor chama a fonte no máximo uma vez por intervalo e nunca em
/// paralelo; implementações não precisam se proteger contra rajadas.
#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// Nome da fonte, usado nos logs.
    fn name(&self) -> &str;

    /// Busca o score de um CPF.
    ///
    /// Respostas não-2xx devem virar [`FetchError::RemoteHttp`] com o status
    /// e o corpo originais; qualquer outra falha vira
    /// [`FetchError::Internal`].
    ///
    /// [`FetchError::RemoteHttp`]: crate::types::errors::FetchError::RemoteHttp
    /// [`FetchError::Internal`]: crate::types::errors::FetchError::Internal
    async fn get_score(&self, cpf: &str) -> FetchResult<ScorePayload>;
}
