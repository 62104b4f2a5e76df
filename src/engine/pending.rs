//! Tabela de buscas em andamento.
//!
//! Cada CPF em voo tem um [`WaiterSet`]: um `oneshot::Sender` por chamador
//! aguardando. O worker drena o conjunto e entrega o mesmo resultado a todos.

use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::types::errors::FetchResult;
use crate::types::score::ScorePayload;

/// Resultado de uma busca, entregue a cada chamador.
pub type FetchOutcome = FetchResult<ScorePayload>;

/// Handle de quem aguarda o resultado de uma busca.
pub type Waiter = oneshot::Receiver<FetchOutcome>;

/// Chamadores aguardando a mesma busca, em ordem de chegada.
#[derive(Debug, Default)]
pub struct WaiterSet {
    waiters: Vec<oneshot::Sender<FetchOutcome>>,
}

impl WaiterSet {
    /// Adiciona um chamador e devolve o handle dele.
    fn attach(&mut self) -> Waiter {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        rx
    }

    /// Remove chamadores que desistiram (timeout).
    fn prune_abandoned(&mut self) {
        self.waiters.retain(|tx| !tx.is_closed());
    }

    /// Número de chamadores registrados.
    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Entrega o resultado a todos e retorna quantos ainda estavam ouvindo.
    pub fn resolve(self, outcome: &FetchOutcome) -> usize {
        self.waiters
            .into_iter()
            .map(|tx| tx.send(outcome.clone()))
            .filter(Result::is_ok)
            .count()
    }
}

/// CPF -> chamadores aguardando a busca em voo.
#[derive(Debug, Default)]
pub struct PendingTable {
    flights: HashMap<String, WaiterSet>,
}

impl PendingTable {
    /// Cria uma tabela vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entra numa busca já em voo, se houver.
    pub fn join(&mut self, cpf: &str) -> Option<Waiter> {
        let set = self.flights.get_mut(cpf)?;
        set.prune_abandoned();
        Some(set.attach())
    }

    /// Marca o CPF como em voo, com o chamador atual como primeiro da fila.
    ///
    /// Só deve ser chamado depois de [`PendingTable::join`] retornar `None`.
    pub fn start(&mut self, cpf: &str) -> Waiter {
        debug_assert!(!self.flights.contains_key(cpf));
        self.flights.entry(cpf.to_string()).or_default().attach()
    }

    /// Desfaz um [`PendingTable::start`] cujo job foi recusado pela fila.
    pub fn abandon(&mut self, cpf: &str) -> Option<WaiterSet> {
        self.flights.remove(cpf)
    }

    /// Encerra a busca e devolve os chamadores para entrega do resultado.
    pub fn complete(&mut self, cpf: &str) -> Option<WaiterSet> {
        self.flights.remove(cpf)
    }

    /// Número de CPFs em voo.
    pub(crate) fn len(&self) -> usize {
        self.flights.len()
    }
}
