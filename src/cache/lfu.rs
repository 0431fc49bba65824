//! Store LFU (Least Frequently Used).
//!
//! Cada entrada guarda um contador de acessos que começa em 1 na
//! inserção e sobe a cada hit ou sobrescrita. Um índice ordenado por
//! `(frequência, último toque)` mantém o candidato à evicção sempre na
//! primeira posição:
//!
//! ```text
//!   set(a) set(b)        índice: (1,t1)=a (1,t2)=b
//!   get(a)               índice: (1,t2)=b (2,t3)=a
//!   set(c)  [cheio]      evicta b, índice: (1,t4)=c (2,t3)=a
//! ```
//!
//! Empates na menor frequência são resolvidos pelo toque mais antigo
//! (ordem LRU dentro do grupo de menor frequência).

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::num::NonZeroUsize;

use super::policy::PolicyStore;

struct LfuEntry<V> {
    value: V,
    frequency: u64,
    last_touch: u64,
}

/// Store LFU com evicção determinística.
pub struct LfuStore<K, V> {
    capacity: usize,
    entries: HashMap<K, LfuEntry<V>>,
    order: BTreeMap<(u64, u64), K>,
    tick: u64,
}

impl<K: Hash + Eq + Clone, V> LfuStore<K, V> {
    /// Cria um store vazio com a capacidade dada.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            entries: HashMap::with_capacity(capacity.get()),
            order: BTreeMap::new(),
            tick: 0,
        }
    }

    fn evict(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

impl<K, V> PolicyStore<K, V> for LfuStore<K, V>
where
    K: Hash + Eq + Clone + Send,
    V: Send,
{
    fn name(&self) -> &str {
        "lfu"
    }

    fn lookup(&mut self, key: &K) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;

        self.order.remove(&(entry.frequency, entry.last_touch));
        self.tick += 1;
        entry.frequency += 1;
        entry.last_touch = self.tick;
        self.order
            .insert((entry.frequency, entry.last_touch), key.clone());

        Some(&entry.value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn store(&mut self, key: K, value: V) -> Option<K> {
        // Sobrescrita também conta como acesso
        if let Some(entry) = self.entries.get_mut(&key) {
            self.order.remove(&(entry.frequency, entry.last_touch));
            self.tick += 1;
            entry.value = value;
            entry.frequency += 1;
            entry.last_touch = self.tick;
            self.order.insert((entry.frequency, entry.last_touch), key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        self.tick += 1;
        self.order.insert((1, self.tick), key.clone());
        self.entries.insert(
            key,
            LfuEntry {
                value,
                frequency: 1,
                last_touch: self.tick,
            },
        );

        debug_assert_eq!(self.order.len(), self.entries.len());
        evicted
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|e| e.frequency)
    }

    fn keys_by_priority(&self) -> Vec<K> {
        self.order.values().cloned().collect()
    }
}
