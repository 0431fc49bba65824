//! Cache de respostas com evicção LRU ou LFU.
//!
//! Este módulo implementa um cache chave→valor de capacidade fixa,
//! usado para evitar consultas repetidas ao LLM para a mesma pergunta.
//! A política de evicção é escolhida na construção:
//!
//! - [`EvictionPolicy::Lru`]: remove a entrada tocada há mais tempo
//! - [`EvictionPolicy::Lfu`]: remove a entrada com menor contagem de acessos,
//!   desempatando pelo toque mais antigo

mod bounded;
mod lfu;
mod lru;
mod policy;

pub use bounded::{BoundedCache, CacheMetrics, CacheStats, SharedCache};
pub use lfu::LfuStore;
pub use lru::LruStore;
pub use policy::{create_store, EvictionPolicy, PolicyStore};
