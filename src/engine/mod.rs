//! Motor de admissão e limitação de taxa.
//!
//! Fluxo de uma requisição:
//!
//! 1. [`ScoreCache`]: score válido em cache responde na hora;
//! 2. [`PendingTable`]: se o CPF já está em voo, o chamador entra na busca;
//! 3. [`AdmissionQueue`]: senão um job é enfileirado (ou recusado, com a
//!    fila cheia);
//! 4. [`RateLimitedWorker`]: consome a fila, espera o intervalo, chama a
//!    fonte, grava o cache e entrega o resultado a todos os chamadores.
//!
//! Cache e tabela de buscas ficam sob um único mutex, e o enfileiramento
//! acontece com ele travado: duas requisições simultâneas para o mesmo CPF
//! nunca geram dois jobs.
//!
//! ## Exemplo
//!
//! ```rust,ignore
//! use score_proxy::engine::{EngineSettings, ScoreProxy};
//!
//! let (proxy, worker) = ScoreProxy::start(EngineSettings::from_config(&config), source);
//! let score = proxy.fetch("12345678900").await?;
//! ```

mod coordinator;
mod pending;
mod queue;
mod worker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::cache::ScoreCache;
use crate::types::config::Config;

pub use coordinator::{ProxyStats, ScoreProxy};
pub use pending::{FetchOutcome, PendingTable, Waiter, WaiterSet};
pub use queue::{
    admission_queue, AdmissionQueue, EnqueueError, Job, JobReceiver, MAX_QUEUE_CAPACITY,
};
pub use worker::RateLimitedWorker;

/// Parâmetros do motor, fixos desde a inicialização.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Capacidade da fila de admissão.
    pub queue_capacity: usize,

    /// Espera antes de cada chamada à fonte.
    pub interval: Duration,

    /// Espera máxima de um chamador.
    pub request_timeout: Duration,

    /// Capacidade do cache.
    pub cache_capacity: usize,

    /// Tempo de vida das entradas do cache.
    pub cache_ttl: Duration,
}

impl EngineSettings {
    /// Extrai os parâmetros do motor da configuração.
    pub fn from_config(config: &Config) -> Self {
        Self {
            queue_capacity: config.queue.capacity,
            interval: config.interval(),
            request_timeout: config.request_timeout(),
            cache_capacity: config.cache.capacity,
            cache_ttl: config.cache_ttl(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Estado mutável compartilhado entre coordenadores e worker.
struct EngineState {
    cache: ScoreCache,
    pending: PendingTable,
}

type SharedState = Arc<Mutex<EngineState>>;

/// Trava o estado. Nenhuma seção crítica deixa o estado pela metade, então
/// um mutex envenenado ainda é usável.
fn lock_state(state: &SharedState) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
