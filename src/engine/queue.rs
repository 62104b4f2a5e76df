//! Fila de admissão limitada.
//!
//! `try_enqueue` nunca bloqueia: com a fila cheia a requisição é recusada na
//! hora. É o único mecanismo de descarte de carga do proxy.

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;

/// Busca pendente de um CPF.
#[derive(Debug, Clone)]
pub struct Job {
    /// CPF a consultar.
    pub cpf: String,

    /// Momento em que entrou na fila.
    pub enqueued_at: Instant,
}

impl Job {
    /// Cria um job carimbado com o instante atual.
    pub fn new(cpf: impl Into<String>) -> Self {
        Self {
            cpf: cpf.into(),
            enqueued_at: Instant::now(),
        }
    }
}

/// Motivo da recusa de um job.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("fila de admissão cheia")]
    Full,

    #[error("worker encerrado; fila fechada")]
    Closed,
}

/// Lado produtor da fila, compartilhado pelos coordenadores.
#[derive(Debug, Clone)]
pub struct AdmissionQueue {
    tx: mpsc::Sender<Job>,
}

/// Lado consumidor da fila, exclusivo do worker.
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::Receiver<Job>,
}

/// Maior capacidade aceita pelo canal do tokio.
pub const MAX_QUEUE_CAPACITY: usize = usize::MAX >> 3;

/// Cria uma fila FIFO com a capacidade dada, limitada a
/// `1..=MAX_QUEUE_CAPACITY`.
pub fn admission_queue(capacity: usize) -> (AdmissionQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_CAPACITY));
    (AdmissionQueue { tx }, JobReceiver { rx })
}

impl AdmissionQueue {
    /// Tenta enfileirar sem esperar.
    pub fn try_enqueue(&self, job: Job) -> Result<(), EnqueueError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EnqueueError::Full),
            Err(TrySendError::Closed(_)) => Err(EnqueueError::Closed),
        }
    }

    /// Jobs aguardando o worker.
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Capacidade máxima.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl JobReceiver {
    /// Retira o próximo job, suspendendo enquanto a fila estiver vazia.
    ///
    /// Retorna `None` quando todos os produtores foram descartados e a fila
    /// já foi esvaziada.
    pub async fn dequeue(&mut self) -> Option<Job> {
        self.rx.recv().await
    }
}
