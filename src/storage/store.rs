//! Registro persistente de consultas e métricas de cache.
//!
//! Três tabelas append-only:
//! - `questions`: pergunta e resposta de referência por consulta
//! - `llm_responses`: resposta usada e score de qualidade por consulta
//! - `cache_metrics`: snapshots agregados de hits/misses

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, EvictionPolicy};
use crate::QaCacheResult;

/// Registro persistente do pipeline.
pub struct ResultStore {
    pub(crate) conn: Connection,
}

/// Snapshot de métricas gravado no banco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub id: i64,
    pub policy: String,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_requests: u64,
    pub hit_rate: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Uma resposta registrada, junto com a pergunta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question_id: String,
    pub question_text: String,
    pub llm_response: String,
    pub quality_score: f64,
    pub cache_hit: bool,
    pub created_at: DateTime<Utc>,
}

impl ResultStore {
    /// Cria ou abre o banco.
    pub fn open(db_path: &Path) -> QaCacheResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Cria um banco em memória.
    pub fn open_in_memory() -> QaCacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> QaCacheResult<()> {
        // Cria as tabelas se não existirem
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                question_id TEXT PRIMARY KEY,
                question_text TEXT NOT NULL,
                best_answer_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS llm_responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_id TEXT NOT NULL REFERENCES questions(question_id),
                llm_response TEXT NOT NULL,
                quality_score REAL NOT NULL,
                cache_hit BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cache_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                policy TEXT NOT NULL,
                cache_hits INTEGER NOT NULL,
                cache_misses INTEGER NOT NULL,
                total_requests INTEGER NOT NULL,
                hit_rate REAL NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_responses_question ON llm_responses(question_id);
        "#,
        )?;
        Ok(())
    }

    /// Registra a pergunta de uma consulta.
    pub fn record_question(
        &self,
        query_id: &str,
        question: &str,
        reference_answer: &str,
    ) -> QaCacheResult<()> {
        self.conn.execute(
            "INSERT INTO questions (question_id, question_text, best_answer_text, created_at)
             VALUES (?, ?, ?, ?)",
            params![query_id, question, reference_answer, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Registra a resposta usada em uma consulta.
    pub fn record_response(
        &self,
        query_id: &str,
        response: &str,
        overall_score: f64,
        cache_hit: bool,
    ) -> QaCacheResult<()> {
        self.conn.execute(
            "INSERT INTO llm_responses (question_id, llm_response, quality_score, cache_hit, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                query_id,
                response,
                overall_score,
                cache_hit,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Registra pergunta e resposta em uma única transação.
    pub fn record_query(
        &mut self,
        query_id: &str,
        question: &str,
        reference_answer: &str,
        response: &str,
        overall_score: f64,
        cache_hit: bool,
    ) -> QaCacheResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO questions (question_id, question_text, best_answer_text, created_at)
             VALUES (?, ?, ?, ?)",
            params![query_id, question, reference_answer, &now],
        )?;
        tx.execute(
            "INSERT INTO llm_responses (question_id, llm_response, quality_score, cache_hit, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![query_id, response, overall_score, cache_hit, &now],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Grava um snapshot agregado das métricas do cache.
    pub fn record_cache_metrics(&self, stats: &CacheStats) -> QaCacheResult<()> {
        self.conn.execute(
            "INSERT INTO cache_metrics (policy, cache_hits, cache_misses, total_requests,
                                        hit_rate, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                stats.policy.to_string(),
                stats.hits as i64,
                stats.misses as i64,
                stats.total() as i64,
                stats.hit_rate(),
                Utc::now().to_rfc3339()
            ],
        )?;

        tracing::debug!(
            "Métricas gravadas: hits={}, misses={}",
            stats.hits,
            stats.misses
        );
        Ok(())
    }

    /// Último snapshot de métricas, opcionalmente filtrado por política.
    pub fn latest_cache_metrics(
        &self,
        policy: Option<EvictionPolicy>,
    ) -> QaCacheResult<Option<MetricsRecord>> {
        let policy = policy.map(|p| p.to_string());

        let record = self
            .conn
            .query_row(
                "SELECT id, policy, cache_hits, cache_misses, total_requests, hit_rate, recorded_at
                 FROM cache_metrics
                 WHERE ?1 IS NULL OR policy = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                params![policy],
                |row| {
                    Ok(MetricsRecord {
                        id: row.get(0)?,
                        policy: row.get(1)?,
                        cache_hits: row.get::<_, i64>(2)? as u64,
                        cache_misses: row.get::<_, i64>(3)? as u64,
                        total_requests: row.get::<_, i64>(4)? as u64,
                        hit_rate: row.get(5)?,
                        recorded_at: row
                            .get::<_, String>(6)?
                            .parse()
                            .unwrap_or_else(|_| Utc::now()),
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Conta o número de consultas registradas.
    pub fn count_queries(&self) -> QaCacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM llm_responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Score médio de qualidade (None se não houver respostas).
    pub fn average_quality(&self) -> QaCacheResult<Option<f64>> {
        let avg: Option<f64> = self.conn.query_row(
            "SELECT AVG(quality_score) FROM llm_responses",
            [],
            |row| row.get(0),
        )?;
        Ok(avg)
    }

    /// Respostas mais recentes.
    pub fn recent_responses(&self, limit: usize) -> QaCacheResult<Vec<ResponseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.question_id, q.question_text, r.llm_response, r.quality_score,
                    r.cache_hit, r.created_at
             FROM llm_responses r
             JOIN questions q ON q.question_id = r.question_id
             ORDER BY r.id DESC
             LIMIT ?",
        )?;

        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ResponseRecord {
                    question_id: row.get(0)?,
                    question_text: row.get(1)?,
                    llm_response: row.get(2)?,
                    quality_score: row.get(3)?,
                    cache_hit: row.get(4)?,
                    created_at: row
                        .get::<_, String>(5)?
                        .parse()
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stats(policy: EvictionPolicy, hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            policy,
            size: 1,
            capacity: 10,
            hits,
            misses,
            evictions: 0,
        }
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let store = ResultStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.count_queries().unwrap(), 0);
        assert_eq!(store.average_quality().unwrap(), None);
    }

    #[test]
    fn test_record_query() {
        let mut store = ResultStore::open_in_memory().unwrap();

        store
            .record_query("q-1", "What is Rust?", "A language", "A systems language", 0.7, false)
            .unwrap();
        store
            .record_query("q-2", "What is Rust?", "A language", "A systems language", 0.7, true)
            .unwrap();

        assert_eq!(store.count_queries().unwrap(), 2);
        assert!((store.average_quality().unwrap().unwrap() - 0.7).abs() < 1e-9);

        let recent = store.recent_responses(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question_id, "q-2");
        assert!(recent[0].cache_hit);
        assert!(!recent[1].cache_hit);
    }

    #[test]
    fn test_record_question_and_response_separately() {
        let store = ResultStore::open_in_memory().unwrap();

        store.record_question("q-1", "Pergunta?", "Resposta").unwrap();
        store.record_response("q-1", "Outra resposta", 0.25, false).unwrap();

        let recent = store.recent_responses(1).unwrap();
        assert_eq!(recent[0].question_text, "Pergunta?");
        assert_eq!(recent[0].llm_response, "Outra resposta");
    }

    #[test]
    fn test_duplicate_query_id_rolls_back() {
        let mut store = ResultStore::open_in_memory().unwrap();

        store.record_query("q-1", "a", "b", "c", 0.1, false).unwrap();
        assert!(store.record_query("q-1", "a", "b", "c", 0.1, false).is_err());

        // A resposta da segunda tentativa não foi gravada
        assert_eq!(store.count_queries().unwrap(), 1);
    }

    #[test]
    fn test_cache_metrics_snapshots() {
        let store = ResultStore::open_in_memory().unwrap();
        assert!(store.latest_cache_metrics(None).unwrap().is_none());

        store
            .record_cache_metrics(&stats(EvictionPolicy::Lru, 3, 1))
            .unwrap();
        store
            .record_cache_metrics(&stats(EvictionPolicy::Lfu, 1, 1))
            .unwrap();

        let latest = store.latest_cache_metrics(None).unwrap().unwrap();
        assert_eq!(latest.policy, "lfu");
        assert_eq!(latest.total_requests, 2);

        let lru = store
            .latest_cache_metrics(Some(EvictionPolicy::Lru))
            .unwrap()
            .unwrap();
        assert_eq!(lru.cache_hits, 3);
        assert_eq!(lru.cache_misses, 1);
        assert_eq!(lru.total_requests, 4);
        assert!((lru.hit_rate - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_zero_requests_snapshot_has_zero_hit_rate() {
        let store = ResultStore::open_in_memory().unwrap();
        store
            .record_cache_metrics(&stats(EvictionPolicy::Lru, 0, 0))
            .unwrap();

        let latest = store.latest_cache_metrics(None).unwrap().unwrap();
        assert_eq!(latest.hit_rate, 0.0);
    }
}
