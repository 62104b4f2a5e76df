//! Worker com limite de taxa.
//!
//! Um único worker consome a fila de admissão e chama a fonte de score
//! em série, esperando o intervalo mínimo antes de cada chamada.

use std::sync::Arc;
use std::time::Duration;

use super::pending::FetchOutcome;
use super::queue::{Job, JobReceiver};
use super::{lock_state, SharedState};
use crate::types::errors::FetchError;
use crate::types::score::fingerprint;
use crate::upstream::ScoreSource;

/// Consumidor único da fila de admissão.
pub struct RateLimitedWorker {
    state: SharedState,
    jobs: JobReceiver,
    source: Arc<dyn ScoreSource>,
    interval: Duration,
}

impl RateLimitedWorker {
    pub(super) fn new(
        state: SharedState,
        jobs: JobReceiver,
        source: Arc<dyn ScoreSource>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            jobs,
            source,
            interval,
        }
    }

    /// Loop principal.
    ///
    /// Termina quando todos os [`ScoreProxy`](super::ScoreProxy) foram
    /// descartados e os jobs já aceitos foram processados.
    pub async fn run(mut self) {
        tracing::info!(
            source = self.source.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Score worker started"
        );

        while let Some(job) = self.jobs.dequeue().await {
            // O intervalo é pago antes de toda chamada, independente da
            // duração da chamada anterior.
            tokio::time::sleep(self.interval).await;

            let outcome = self.call_source(&job).await;
            self.settle(&job, outcome);
        }

        tracing::info!("Score worker stopped");
    }

    /// Chama a fonte numa task separada para que um pânico vire erro.
    async fn call_source(&self, job: &Job) -> FetchOutcome {
        let source = Arc::clone(&self.source);
        let cpf = job.cpf.clone();

        tracing::debug!(
            key = %fingerprint(&job.cpf),
            queued_ms = job.enqueued_at.elapsed().as_millis() as u64,
            "Fetching score"
        );

        match tokio::spawn(async move { source.get_score(&cpf).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    key = %fingerprint(&job.cpf),
                    error = %e,
                    "Score fetch task failed"
                );
                Err(FetchError::internal(format!("falha ao processar busca: {}", e)))
            }
        }
    }

    /// Atualiza o cache, encerra o voo e entrega o resultado.
    fn settle(&self, job: &Job, outcome: FetchOutcome) {
        let waiters = {
            let mut state = lock_state(&self.state);
            let waiters = state.pending.complete(&job.cpf);
            if let Ok(payload) = &outcome {
                state.cache.put(job.cpf.as_str(), payload.clone());
            }
            waiters
        };

        match &outcome {
            Ok(_) => tracing::info!(key = %fingerprint(&job.cpf), "Score fetched"),
            Err(e) => {
                tracing::warn!(key = %fingerprint(&job.cpf), error = %e, "Score fetch failed")
            }
        }

        match waiters {
            Some(set) => {
                let registered = set.len();
                let delivered = set.resolve(&outcome);
                tracing::debug!(
                    key = %fingerprint(&job.cpf),
                    registered,
                    delivered,
                    "Waiters resolved"
                );
            }
            None => tracing::warn!(
                key = %fingerprint(&job.cpf),
                "No waiters registered for finished job"
            ),
        }
    }
}
