//! Tipos de erro do score-proxy.

use thiserror::Error;

/// Tipo de resultado padrão da aplicação.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Erros da aplicação (configuração, IO, inicialização).
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro ao criar cliente HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ProxyError {
    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Resultado de uma busca de score.
pub type FetchResult<T> = Result<T, FetchError>;

/// Falhas entregues a quem pediu um score.
///
/// É `Clone` porque o mesmo resultado é entregue a todos os chamadores
/// agrupados na mesma busca.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Fila de admissão cheia.
    #[error("Serviço sobrecarregado: fila de requisições cheia")]
    Overloaded,

    /// O tempo de espera do chamador acabou.
    #[error("Tempo limite excedido aguardando o score")]
    DeadlineExceeded,

    /// O serviço de score respondeu com status diferente de 2xx.
    #[error("Serviço de score respondeu {status}: {body}")]
    RemoteHttp { status: u16, body: String },

    /// Qualquer outra falha (transporte, decodificação, pânico no worker).
    #[error("Erro interno: {0}")]
    Internal(String),
}

impl FetchError {
    /// Cria um erro interno.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_converts_into_proxy_error() {
        let err: ProxyError = FetchError::Overloaded.into();
        assert!(matches!(err, ProxyError::Fetch(FetchError::Overloaded)));
        // transparent: a mensagem é a do erro interno
        assert_eq!(err.to_string(), FetchError::Overloaded.to_string());
    }

    #[test]
    fn test_remote_http_message_carries_status() {
        let err = FetchError::RemoteHttp {
            status: 404,
            body: "not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("not found"));
    }
}
