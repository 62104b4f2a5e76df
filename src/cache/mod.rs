//! Cache de scores.
//!
//! Guarda o último score de cada CPF por um tempo de vida fixo, evitando
//! chamadas repetidas ao serviço de score para chaves vistas recentemente.

mod ttl;

pub use ttl::{CacheStats, CachedScore, ScoreCache};
