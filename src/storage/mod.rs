//! Persistência em SQLite das consultas e das métricas de cache.

mod store;

pub use store::{MetricsRecord, ResponseRecord, ResultStore};
