//! Cache de scores com TTL e limite LRU.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use serde::Serialize;
use tokio::time::Instant;

use crate::types::score::ScorePayload;

/// Score em cache.
#[derive(Debug, Clone)]
pub struct CachedScore {
    /// Corpo devolvido pelo serviço de score.
    pub payload: ScorePayload,

    /// Momento em que foi cacheado.
    pub inserted_at: Instant,
}

impl CachedScore {
    /// Cria uma entrada carimbada com o instante atual.
    pub fn new(payload: ScorePayload) -> Self {
        Self {
            payload,
            inserted_at: Instant::now(),
        }
    }

    /// Verifica se a entrada expirou.
    ///
    /// A entrada vale enquanto `agora - inserted_at < ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Número atual de entradas (inclui expiradas ainda não lidas).
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses), contando entradas expiradas.
    pub misses: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache de scores por CPF.
///
/// A expiração é verificada de forma preguiçosa em [`ScoreCache::get`]; não
/// existe tarefa de limpeza em segundo plano. A capacidade LRU só limita a
/// memória quando há muitas chaves distintas.
pub struct ScoreCache {
    cache: LruCache<String, CachedScore>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl ScoreCache {
    /// Cria um novo cache.
    ///
    /// # Argumentos
    /// - `capacity`: Número máximo de entradas
    /// - `ttl`: Tempo de vida das entradas
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cap),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Busca no cache.
    ///
    /// Retorna `None` se não encontrado ou se expirado; uma entrada expirada
    /// é removida na mesma chamada.
    pub fn get(&mut self, cpf: &str) -> Option<&ScorePayload> {
        // peek não altera a ordem LRU
        let is_expired = self.cache.peek(cpf).map(|c| c.is_expired(self.ttl));

        match is_expired {
            Some(true) => {
                self.cache.pop(cpf);
                self.misses += 1;
                None
            }
            Some(false) => {
                self.hits += 1;
                self.cache.get(cpf).map(|c| &c.payload)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insere ou substitui a entrada, carimbada com o instante atual.
    pub fn put(&mut self, cpf: impl Into<String>, payload: ScorePayload) {
        self.cache.put(cpf.into(), CachedScore::new(payload));
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
