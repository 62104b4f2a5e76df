//! # score-proxy
//!
//! Proxy com cache e limite de taxa para a API de score por CPF.
//!
//! Absorve rajadas de clientes na frente de um serviço que só pode ser
//! chamado uma vez por segundo, sem repetir chamadas para CPFs vistos
//! recentemente.
//!
//! ## Módulos
//!
//! - [`engine`] - Fila de admissão, worker com limite de taxa e coordenador
//! - [`cache`] - Cache de scores com TTL
//! - [`upstream`] - Cliente do serviço de score
//! - [`server`] - Servidor HTTP (axum)
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod server;
pub mod types;
pub mod upstream;

pub use engine::{EngineSettings, ScoreProxy};
pub use types::config::Config;
pub use types::errors::{FetchError, ProxyError, ProxyResult};
