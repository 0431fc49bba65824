//! Store LRU (Least Recently Used).

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

use super::policy::PolicyStore;

/// Store LRU baseado em [`LruCache`].
///
/// Todo hit e todo `store` movem a chave para a posição mais recente;
/// a evicção remove a entrada tocada há mais tempo.
pub struct LruStore<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
}

impl<K: Hash + Eq, V> LruStore<K, V> {
    /// Cria um store vazio com a capacidade dada.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }
}

impl<K, V> PolicyStore<K, V> for LruStore<K, V>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
{
    fn name(&self) -> &str {
        "lru"
    }

    fn lookup(&mut self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    fn store(&mut self, key: K, value: V) -> Option<K> {
        // Sobrescrita: atualiza o valor e promove para mais recente
        if self.entries.contains(&key) {
            self.entries.put(key, value);
            return None;
        }

        let evicted = if self.entries.len() >= self.entries.cap().get() {
            self.entries.pop_lru().map(|(k, _)| k)
        } else {
            None
        };

        self.entries.put(key, value);
        evicted
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    fn keys_by_priority(&self) -> Vec<K> {
        // iter() vai do mais recente ao menos recente
        self.entries.iter().rev().map(|(k, _)| k.clone()).collect()
    }
}
