//! Coordenador de requisições de score.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use super::pending::{PendingTable, Waiter};
use super::queue::{admission_queue, AdmissionQueue, EnqueueError, Job};
use super::worker::RateLimitedWorker;
use super::{lock_state, EngineSettings, EngineState, SharedState};
use crate::cache::{CacheStats, ScoreCache};
use crate::types::errors::{FetchError, FetchResult};
use crate::types::score::{fingerprint, ScorePayload};
use crate::upstream::ScoreSource;

/// Estado observável do motor.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyStats {
    /// Estatísticas do cache.
    pub cache: CacheStats,

    /// Taxa de acerto do cache.
    pub hit_rate: f64,

    /// CPFs com busca em voo.
    pub in_flight: usize,

    /// Jobs aguardando o worker.
    pub queued: usize,

    /// Capacidade da fila de admissão.
    pub queue_capacity: usize,
}

/// Ponto de entrada do motor: "score do CPF K".
///
/// Clonar é barato; todos os clones compartilham cache, tabela de buscas e
/// fila. O worker termina quando o último clone é descartado.
#[derive(Clone)]
pub struct ScoreProxy {
    state: SharedState,
    queue: AdmissionQueue,
    request_timeout: Duration,
}

impl ScoreProxy {
    /// Monta o motor e devolve o worker ainda parado.
    pub fn new(
        settings: EngineSettings,
        source: Arc<dyn ScoreSource>,
    ) -> (Self, RateLimitedWorker) {
        let state = Arc::new(Mutex::new(EngineState {
            cache: ScoreCache::new(settings.cache_capacity, settings.cache_ttl),
            pending: PendingTable::new(),
        }));
        let (queue, jobs) = admission_queue(settings.queue_capacity);

        let worker = RateLimitedWorker::new(Arc::clone(&state), jobs, source, settings.interval);
        let proxy = Self {
            state,
            queue,
            request_timeout: settings.request_timeout,
        };

        (proxy, worker)
    }

    /// Monta o motor e inicia o worker no runtime atual.
    pub fn start(settings: EngineSettings, source: Arc<dyn ScoreSource>) -> (Self, JoinHandle<()>) {
        let (proxy, worker) = Self::new(settings, source);
        let handle = tokio::spawn(worker.run());
        (proxy, handle)
    }

    /// Busca o score de um CPF.
    ///
    /// Cache válido responde na hora. Senão o chamador entra na busca já em
    /// voo para o CPF, ou cria uma nova; com a fila cheia falha na hora com
    /// [`FetchError::Overloaded`]. A espera total é limitada pelo timeout da
    /// requisição; desistir não cancela a busca.
    pub async fn fetch(&self, cpf: &str) -> FetchResult<ScorePayload> {
        let waiter = match self.admit(cpf)? {
            Admission::Cached(payload) => {
                tracing::debug!(key = %fingerprint(cpf), "Cache hit");
                return Ok(payload);
            }
            Admission::Joined(waiter) => {
                tracing::debug!(key = %fingerprint(cpf), "Joined in-flight fetch");
                waiter
            }
            Admission::Enqueued(waiter) => {
                tracing::debug!(key = %fingerprint(cpf), "Fetch enqueued");
                waiter
            }
        };

        match tokio::time::timeout(self.request_timeout, waiter).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(FetchError::internal("busca descartada sem resultado")),
            Err(_) => {
                tracing::warn!(
                    key = %fingerprint(cpf),
                    timeout_secs = self.request_timeout.as_secs_f64(),
                    "Deadline exceeded waiting for score"
                );
                Err(FetchError::DeadlineExceeded)
            }
        }
    }

    /// Cache, junção e enfileiramento numa única seção crítica.
    fn admit(&self, cpf: &str) -> FetchResult<Admission> {
        let mut state = lock_state(&self.state);

        if let Some(payload) = state.cache.get(cpf) {
            return Ok(Admission::Cached(payload.clone()));
        }

        if let Some(waiter) = state.pending.join(cpf) {
            return Ok(Admission::Joined(waiter));
        }

        let waiter = state.pending.start(cpf);
        match self.queue.try_enqueue(Job::new(cpf)) {
            Ok(()) => Ok(Admission::Enqueued(waiter)),
            Err(e) => {
                state.pending.abandon(cpf);
                match e {
                    EnqueueError::Full => {
                        tracing::warn!(
                            key = %fingerprint(cpf),
                            capacity = self.queue.capacity(),
                            "Admission queue full"
                        );
                        Err(FetchError::Overloaded)
                    }
                    EnqueueError::Closed => {
                        tracing::error!("Score worker is not running");
                        Err(FetchError::internal(e.to_string()))
                    }
                }
            }
        }
    }

    /// Estado atual do cache, das buscas e da fila.
    pub fn stats(&self) -> ProxyStats {
        let (cache, in_flight) = {
            let state = lock_state(&self.state);
            (state.cache.stats(), state.pending.len())
        };

        ProxyStats {
            hit_rate: cache.hit_rate(),
            cache,
            in_flight,
            queued: self.queue.len(),
            queue_capacity: self.queue.capacity(),
        }
    }
}

enum Admission {
    Cached(ScorePayload),
    Joined(Waiter),
    Enqueued(Waiter),
}
