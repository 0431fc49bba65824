//! Cache de capacidade limitada com métricas de hit/miss.

use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::policy::{create_store, EvictionPolicy, PolicyStore};
use crate::types::config::CacheConfig;
use crate::{QaCacheError, QaCacheResult};

/// Contadores acumulados durante a vida do cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,

    /// Número de entradas removidas por evicção.
    pub evictions: u64,
}

impl CacheMetrics {
    /// Total de chamadas a `get`.
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    /// Política de evicção.
    pub policy: EvictionPolicy,

    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,

    /// Número de evicções.
    pub evictions: u64,
}

impl CacheStats {
    /// Total de requisições ao cache.
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache chave→valor com capacidade fixa e política de evicção fixa.
///
/// `get` conta hits e misses; `set` nunca falha e, com o cache cheio,
/// remove exatamente uma entrada escolhida pela política antes de
/// inserir a nova. Entradas só saem por evicção.
pub struct BoundedCache<K, V> {
    store: Box<dyn PolicyStore<K, V>>,
    policy: EvictionPolicy,
    metrics: CacheMetrics,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + 'static,
    V: Send + 'static,
{
    /// Cria um novo cache.
    ///
    /// # Argumentos
    /// - `policy`: Política de evicção
    /// - `capacity`: Número máximo de entradas (>= 1)
    pub fn new(policy: EvictionPolicy, capacity: usize) -> QaCacheResult<Self> {
        let cap = NonZeroUsize::new(capacity)
            .ok_or_else(|| QaCacheError::config("capacidade do cache deve ser >= 1"))?;

        Ok(Self {
            store: create_store(policy, cap),
            policy,
            metrics: CacheMetrics::default(),
        })
    }

    /// Cria o cache a partir da configuração do TOML.
    pub fn from_config(config: &CacheConfig) -> QaCacheResult<Self> {
        Self::new(config.policy, config.capacity)
    }

    /// Busca no cache.
    ///
    /// Retorna `None` em caso de miss; a ausência não é erro, é o sinal
    /// para o chamador calcular o valor.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.store.lookup(key) {
            Some(value) => {
                self.metrics.hits += 1;
                Some(value)
            }
            None => {
                self.metrics.misses += 1;
                None
            }
        }
    }

    /// Insere ou sobrescreve uma entrada.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(evicted) = self.store.store(key, value) {
            self.metrics.evictions += 1;
            tracing::debug!(policy = %self.policy, key = ?evicted, "Entrada evictada do cache");
        }
    }

    /// Lê uma entrada sem contar hit/miss nem tocar a política.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.store.peek(key)
    }

    /// Verifica se a chave está residente.
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    /// Contagem de acessos da chave (apenas LFU).
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.store.frequency(key)
    }

    /// Chaves residentes, da próxima a ser evictada até a última.
    pub fn eviction_order(&self) -> Vec<K> {
        self.store.keys_by_priority()
    }

    /// Número atual de entradas.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Verifica se o cache está vazio.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Capacidade máxima.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Política de evicção.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Contadores acumulados.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            policy: self.policy,
            size: self.store.len(),
            capacity: self.store.capacity(),
            hits: self.metrics.hits,
            misses: self.metrics.misses,
            evictions: self.metrics.evictions,
        }
    }
}

/// Cache compartilhável entre tasks.
///
/// Cada operação segura o lock do cache inteiro, então uma evicção e a
/// inserção que a causou são vistas como um único passo.
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<BoundedCache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Envolve um cache já construído.
    pub fn new(cache: BoundedCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Busca no cache, devolvendo uma cópia do valor.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        cache.get(key).cloned()
    }

    /// Insere ou sobrescreve uma entrada.
    pub async fn set(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        cache.set(key, value);
    }

    /// Retorna estatísticas do cache.
    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }
}
