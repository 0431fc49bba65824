//! Políticas de evicção do cache.
//!
//! Define o contrato comum das duas políticas disponíveis:
//! - LRU: remove a entrada acessada há mais tempo
//! - LFU: remove a entrada com menor frequência de acesso

use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lfu::LfuStore;
use super::lru::LruStore;

/// Política de evicção, fixa na construção do cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Least Recently Used.
    Lru,
    /// Least Frequently Used.
    Lfu,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Lru => write!(f, "lru"),
            EvictionPolicy::Lfu => write!(f, "lfu"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            other => Err(format!("política desconhecida: '{}' (use lru ou lfu)", other)),
        }
    }
}

/// Armazenamento residente de uma política de evicção.
///
/// Cada implementação mantém os pares chave→valor e o estado auxiliar
/// da política (ordem de recência ou contagem de frequência). O
/// [`BoundedCache`](super::BoundedCache) cuida das métricas; o store
/// cuida apenas de quem fica e quem sai.
pub trait PolicyStore<K, V>: Send {
    /// Nome da política.
    fn name(&self) -> &str;

    /// Busca uma chave aplicando o efeito de "toque" da política.
    fn lookup(&mut self, key: &K) -> Option<&V>;

    /// Busca uma chave sem alterar recência nem frequência.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Verifica se a chave está residente.
    fn contains(&self, key: &K) -> bool;

    /// Insere ou sobrescreve uma entrada.
    ///
    /// Retorna a chave evictada quando a inserção de uma chave nova
    /// encontra o store cheio.
    fn store(&mut self, key: K, value: V) -> Option<K>;

    /// Número de entradas residentes.
    fn len(&self) -> usize;

    /// Capacidade máxima.
    fn capacity(&self) -> usize;

    /// Contagem de acessos da chave (apenas políticas baseadas em frequência).
    fn frequency(&self, _key: &K) -> Option<u64> {
        None
    }

    /// Chaves residentes da próxima a ser evictada até a última.
    fn keys_by_priority(&self) -> Vec<K>;
}

/// Cria o store correspondente à política.
pub fn create_store<K, V>(
    policy: EvictionPolicy,
    capacity: NonZeroUsize,
) -> Box<dyn PolicyStore<K, V>>
where
    K: Hash + Eq + Clone + Debug + Send + 'static,
    V: Send + 'static,
{
    match policy {
        EvictionPolicy::Lru => Box::new(LruStore::new(capacity)),
        EvictionPolicy::Lfu => Box::new(LfuStore::new(capacity)),
    }
}
