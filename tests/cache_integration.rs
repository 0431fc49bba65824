//! Testes de integração para o cache limitado.

use std::collections::HashMap;

use qacache::cache::{BoundedCache, EvictionPolicy, SharedCache};
use qacache::QaCacheError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Modelo de referência das duas políticas, sem estruturas auxiliares.
struct Model {
    policy: EvictionPolicy,
    capacity: usize,
    // chave -> (valor, frequência, último toque)
    entries: HashMap<u32, (u32, u64, u64)>,
    tick: u64,
}

impl Model {
    fn new(policy: EvictionPolicy, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            entries: HashMap::new(),
            tick: 0,
        }
    }

    fn touch(&mut self, key: u32) {
        self.tick += 1;
        let tick = self.tick;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.1 += 1;
            entry.2 = tick;
        }
    }

    fn get(&mut self, key: u32) -> Option<u32> {
        let value = self.entries.get(&key).map(|e| e.0)?;
        self.touch(key);
        Some(value)
    }

    fn set(&mut self, key: u32, value: u32) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.0 = value;
            self.touch(key);
            return;
        }

        if self.entries.len() == self.capacity {
            let victim = match self.policy {
                EvictionPolicy::Lru => self.entries.iter().min_by_key(|(_, e)| e.2),
                EvictionPolicy::Lfu => self.entries.iter().min_by_key(|(_, e)| (e.1, e.2)),
            }
            .map(|(k, _)| *k);
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }

        self.tick += 1;
        self.entries.insert(key, (value, 1, self.tick));
    }
}

fn check_against_model(policy: EvictionPolicy, capacity: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cache: BoundedCache<u32, u32> = BoundedCache::new(policy, capacity).unwrap();
    let mut model = Model::new(policy, capacity);
    let mut gets = 0u64;

    for step in 0..2_000 {
        let key = rng.gen_range(0..(capacity as u32 * 3));
        if rng.gen_bool(0.5) {
            gets += 1;
            assert_eq!(
                cache.get(&key).copied(),
                model.get(key),
                "get({}) divergiu no passo {} ({})",
                key,
                step,
                policy
            );
        } else {
            let value = rng.gen();
            cache.set(key, value);
            model.set(key, value);
        }

        assert!(cache.len() <= capacity);
        assert_eq!(cache.len(), model.entries.len());
    }

    for key in model.entries.keys() {
        assert!(cache.contains(key), "{} deveria estar residente ({})", key, policy);
    }

    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, gets);
}

#[test]
fn test_lru_matches_reference_model() {
    for (capacity, seed) in [(1, 1), (2, 2), (5, 3), (16, 4)] {
        check_against_model(EvictionPolicy::Lru, capacity, seed);
    }
}

#[test]
fn test_lfu_matches_reference_model() {
    for (capacity, seed) in [(1, 5), (2, 6), (5, 7), (16, 8)] {
        check_against_model(EvictionPolicy::Lfu, capacity, seed);
    }
}

#[test]
fn test_keys_within_capacity_are_all_retained() {
    for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
        let mut cache = BoundedCache::new(policy, 10).unwrap();
        for i in 0..10u32 {
            cache.set(i, i * 10);
        }
        for i in 0..10u32 {
            cache.set(i, i * 100);
        }

        for i in 0..10u32 {
            assert_eq!(cache.get(&i), Some(&(i * 100)));
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 10);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
    }
}

#[test]
fn test_full_cache_evicts_exactly_one() {
    for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
        let mut cache = BoundedCache::new(policy, 3).unwrap();
        for i in 0..3u32 {
            cache.set(i, i);
        }

        cache.set(99, 99);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.metrics().evictions, 1);
        assert_eq!((0..3u32).filter(|k| cache.contains(k)).count(), 2);
        assert!(cache.contains(&99));
    }
}

#[test]
fn test_lru_scenario() {
    let mut cache = BoundedCache::new(EvictionPolicy::Lru, 2).unwrap();
    cache.set("a", 1);
    cache.set("b", 2);
    assert_eq!(cache.get(&"a"), Some(&1));
    cache.set("c", 3);

    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"a"), Some(&1));
    assert_eq!(cache.get(&"c"), Some(&3));

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 0.75).abs() < 1e-9);
}

#[test]
fn test_lfu_scenario() {
    let mut cache = BoundedCache::new(EvictionPolicy::Lfu, 2).unwrap();
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("a", 9);
    assert_eq!(cache.frequency(&"a"), Some(2));

    cache.set("c", 3);

    assert_eq!(cache.get(&"b"), None);
    assert_eq!(cache.get(&"a"), Some(&9));
}

#[test]
fn test_idempotent_set_does_not_evict() {
    for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
        let mut cache = BoundedCache::new(policy, 2).unwrap();
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("b", 2);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&"a"));
        assert_eq!(cache.metrics().evictions, 0);
    }
}

#[test]
fn test_hit_rate_zero_without_requests() {
    let cache: BoundedCache<u32, u32> = BoundedCache::new(EvictionPolicy::Lfu, 4).unwrap();
    let stats = cache.stats();
    assert_eq!(stats.total(), 0);
    assert_eq!(stats.hit_rate(), 0.0);
}

#[test]
fn test_zero_capacity_rejected() {
    for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
        let result: Result<BoundedCache<u32, u32>, _> = BoundedCache::new(policy, 0);
        assert!(matches!(result, Err(QaCacheError::Config(_))));
    }
}

#[tokio::test]
async fn test_shared_cache_across_tasks() {
    let cache = SharedCache::new(BoundedCache::new(EvictionPolicy::Lru, 8).unwrap());

    let mut handles = Vec::new();
    for task in 0..4u32 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50u32 {
                let key = (task * 50 + i) % 20;
                if cache.get(&key).await.is_none() {
                    cache.set(key, key * 2).await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = cache.stats().await;
    assert_eq!(stats.hits + stats.misses, 200);
    assert!(stats.size <= 8);
    assert_eq!(stats.size, 8);
}
