//! Pipeline pergunta → cache → LLM → score → persistência.

use crate::cache::{BoundedCache, CacheStats};
use crate::dataset::QuestionSource;
use crate::executors::{LlmBackend, LlmReply};
use crate::scoring::ResponseScorer;
use crate::storage::ResultStore;
use crate::types::config::Config;
use crate::types::responses::{QueryOutcome, TrafficReport};
use crate::QaCacheResult;

/// Pipeline de consultas com memoização.
///
/// O cache é construído por quem monta o pipeline e injetado aqui; não
/// existe instância global. Responsável por:
/// - Consultar o cache antes do LLM
/// - Registrar no cache o que o LLM devolver (inclusive falhas, se configurado)
/// - Pontuar a resposta contra a referência
/// - Persistir consultas e snapshots de métricas
pub struct QueryPipeline<S, L> {
    cache: BoundedCache<String, LlmReply>,
    source: S,
    backend: L,
    scorer: ResponseScorer,
    store: Option<ResultStore>,
    cache_errors: bool,
    fail_fast: bool,
}

impl<S: QuestionSource, L: LlmBackend> QueryPipeline<S, L> {
    /// Cria um pipeline sem persistência.
    pub fn new(cache: BoundedCache<String, LlmReply>, source: S, backend: L) -> Self {
        Self {
            cache,
            source,
            backend,
            scorer: ResponseScorer::new(),
            store: None,
            cache_errors: true,
            fail_fast: false,
        }
    }

    /// Monta o pipeline a partir da configuração do TOML.
    ///
    /// Abre (e cria, se preciso) o banco quando `storage.enabled`.
    pub fn from_config(config: &Config, source: S, backend: L) -> QaCacheResult<Self> {
        let cache = BoundedCache::from_config(&config.cache)?;
        let mut pipeline = Self::new(cache, source, backend)
            .with_cache_errors(config.cache.cache_errors)
            .with_fail_fast(config.storage.fail_fast);

        if config.storage.enabled {
            let db_path = &config.storage.db_path;
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            pipeline = pipeline.with_store(ResultStore::open(db_path)?);
        }

        Ok(pipeline)
    }

    /// Define o banco de persistência.
    #[must_use]
    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Define se falhas do LLM são cacheadas.
    #[must_use]
    pub fn with_cache_errors(mut self, cache_errors: bool) -> Self {
        self.cache_errors = cache_errors;
        self
    }

    /// Define se erros de persistência abortam o processamento.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Cache usado pelo pipeline.
    pub fn cache(&self) -> &BoundedCache<String, LlmReply> {
        &self.cache
    }

    /// Banco de persistência, se houver.
    pub fn store(&self) -> Option<&ResultStore> {
        self.store.as_ref()
    }

    /// Backend LLM.
    pub fn backend(&self) -> &L {
        &self.backend
    }

    /// Estatísticas atuais do cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolve uma pergunta pelo cache ou pelo LLM.
    ///
    /// Retorna `(resposta, veio_do_cache, é_falha_do_llm)`.
    pub async fn answer(&mut self, question: &str) -> (String, bool, bool) {
        let key = question.to_string();

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Cache hit");
            return (cached.text().to_string(), true, cached.is_failure());
        }

        let reply = LlmReply::from_result(self.backend.ask(question).await);
        let failed = reply.is_failure();

        if failed {
            tracing::warn!("{} falhou: {}", self.backend.name(), reply.text());
        }

        if !failed || self.cache_errors {
            self.cache.set(key, reply.clone());
        }

        (reply.into_text(), false, failed)
    }

    /// Processa uma pergunta sorteada do dataset.
    pub async fn process_question(&mut self) -> QaCacheResult<QueryOutcome> {
        let query_id = uuid::Uuid::new_v4().to_string();
        let question = self.source.next_question();

        let (response, cache_hit, llm_failed) = self.answer(&question.text).await;
        let scores = self.scorer.score(&response, &question.best_answer);

        let persisted = self.persist(
            &query_id,
            &question.text,
            &question.best_answer,
            &response,
            scores.overall,
            cache_hit,
        )?;

        Ok(QueryOutcome {
            query_id,
            question: question.text,
            reference_answer: question.best_answer,
            response,
            cache_hit,
            llm_failed,
            scores,
            persisted,
        })
    }

    fn persist(
        &mut self,
        query_id: &str,
        question: &str,
        reference_answer: &str,
        response: &str,
        overall_score: f64,
        cache_hit: bool,
    ) -> QaCacheResult<bool> {
        let Some(store) = self.store.as_mut() else {
            return Ok(false);
        };

        match store.record_query(
            query_id,
            question,
            reference_answer,
            response,
            overall_score,
            cache_hit,
        ) {
            Ok(()) => Ok(true),
            Err(e) if !self.fail_fast => {
                tracing::warn!("Erro ao persistir consulta {}: {}", query_id, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Grava um snapshot das métricas do cache.
    ///
    /// Retorna `false` se não há banco ou se a gravação falhou sem `fail_fast`.
    pub fn save_cache_metrics(&self) -> QaCacheResult<bool> {
        let Some(store) = self.store.as_ref() else {
            return Ok(false);
        };

        let stats = self.cache.stats();
        match store.record_cache_metrics(&stats) {
            Ok(()) => {
                tracing::info!(
                    "Métricas guardadas: hits={}, misses={}",
                    stats.hits,
                    stats.misses
                );
                Ok(true)
            }
            Err(e) if !self.fail_fast => {
                tracing::warn!("Erro ao gravar métricas do cache: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Processa `num_questions` perguntas em sequência.
    ///
    /// Grava métricas a cada `metrics_interval` perguntas (0 desativa) e
    /// sempre uma vez ao final. `on_progress` recebe o índice (a partir
    /// de 1) e o resultado de cada pergunta.
    pub async fn run_traffic<F>(
        &mut self,
        num_questions: usize,
        metrics_interval: usize,
        mut on_progress: F,
    ) -> QaCacheResult<TrafficReport>
    where
        F: FnMut(usize, &QueryOutcome),
    {
        let mut llm_failures = 0;
        let mut persistence_failures = 0;
        let mut metrics_snapshots = 0;
        let mut quality_sum = 0.0;

        for i in 1..=num_questions {
            let outcome = self.process_question().await?;

            if outcome.llm_failed {
                llm_failures += 1;
            }
            if self.store.is_some() && !outcome.persisted {
                persistence_failures += 1;
            }
            quality_sum += outcome.scores.overall;

            on_progress(i, &outcome);

            if metrics_interval > 0 && i % metrics_interval == 0 && i != num_questions {
                if self.save_cache_metrics()? {
                    metrics_snapshots += 1;
                }
            }
        }

        if self.save_cache_metrics()? {
            metrics_snapshots += 1;
        }

        let average_quality = if num_questions == 0 {
            0.0
        } else {
            quality_sum / num_questions as f64
        };

        Ok(TrafficReport {
            processed: num_questions,
            llm_failures,
            persistence_failures,
            metrics_snapshots,
            average_quality,
            cache: self.cache.stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionPolicy;
    use crate::dataset::{CsvQuestionSource, Question};
    use crate::QaCacheError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl LlmBackend for CountingBackend {
        fn name(&self) -> &str {
            "Counting"
        }

        fn command(&self) -> &str {
            "counting"
        }

        async fn ask(&self, prompt: &str) -> QaCacheResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(QaCacheError::ExecutorTimeout("Counting".to_string()))
            } else {
                Ok(format!("answer to {}", prompt))
            }
        }
    }

    fn pipeline(
        questions: Vec<Question>,
        fail: bool,
    ) -> (QueryPipeline<CsvQuestionSource, CountingBackend>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            calls: Arc::clone(&calls),
            fail,
        };
        let source = CsvQuestionSource::from_questions(questions)
            .unwrap()
            .with_seed(7);
        let cache = BoundedCache::new(EvictionPolicy::Lru, 10).unwrap();
        (QueryPipeline::new(cache, source, backend), calls)
    }

    fn single_question() -> Vec<Question> {
        vec![Question::new("1", "What is Rust?", "answer to What is Rust?")]
    }

    #[tokio::test]
    async fn test_second_query_hits_cache() {
        let (mut p, calls) = pipeline(single_question(), false);

        let first = p.process_question().await.unwrap();
        let second = p.process_question().await.unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.response, second.response);
        assert_ne!(first.query_id, second.query_id);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = p.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((first.scores.overall - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failures_are_cached_by_default() {
        let (mut p, calls) = pipeline(single_question(), true);

        let first = p.process_question().await.unwrap();
        assert!(first.llm_failed);
        assert!(first.response.starts_with(LlmReply::ERROR_PREFIX));

        let second = p.process_question().await.unwrap();
        assert!(second.cache_hit);
        assert!(second.llm_failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Backend cuja resposta legítima começa com o prefixo de erro.
    struct ErrorLookingBackend;

    #[async_trait]
    impl LlmBackend for ErrorLookingBackend {
        fn name(&self) -> &str {
            "ErrorLooking"
        }

        fn command(&self) -> &str {
            "error-looking"
        }

        async fn ask(&self, _prompt: &str) -> QaCacheResult<String> {
            Ok(format!("{} is how the log line starts", LlmReply::ERROR_PREFIX))
        }
    }

    #[tokio::test]
    async fn test_cached_answer_keeps_success_status() {
        let source = CsvQuestionSource::from_questions(single_question()).unwrap();
        let cache = BoundedCache::new(EvictionPolicy::Lfu, 10).unwrap();
        let mut p = QueryPipeline::new(cache, source, ErrorLookingBackend);

        let first = p.process_question().await.unwrap();
        let second = p.process_question().await.unwrap();

        assert!(first.response.starts_with(LlmReply::ERROR_PREFIX));
        assert!(!first.llm_failed);
        assert!(second.cache_hit);
        assert!(!second.llm_failed);
        assert_eq!(first.response, second.response);
    }

    #[tokio::test]
    async fn test_failures_not_cached_when_disabled() {
        let (p, calls) = pipeline(single_question(), true);
        let mut p = p.with_cache_errors(false);

        p.process_question().await.unwrap();
        let second = p.process_question().await.unwrap();

        assert!(!second.cache_hit);
        assert!(p.cache().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persists_queries_and_metrics() {
        let (p, _) = pipeline(single_question(), false);
        let mut p = p.with_store(ResultStore::open_in_memory().unwrap());

        let report = p.run_traffic(5, 2, |_, _| {}).await.unwrap();

        assert_eq!(report.processed, 5);
        assert_eq!(report.persistence_failures, 0);
        // Snapshots em 2 e 4, mais o final
        assert_eq!(report.metrics_snapshots, 3);
        assert_eq!(report.cache.hits, 4);
        assert_eq!(report.cache.misses, 1);

        let store = p.store().unwrap();
        assert_eq!(store.count_queries().unwrap(), 5);
        let latest = store.latest_cache_metrics(None).unwrap().unwrap();
        assert_eq!(latest.total_requests, 5);
    }

    #[tokio::test]
    async fn test_no_duplicate_final_snapshot() {
        let (p, _) = pipeline(single_question(), false);
        let mut p = p.with_store(ResultStore::open_in_memory().unwrap());

        let report = p.run_traffic(4, 2, |_, _| {}).await.unwrap();
        assert_eq!(report.metrics_snapshots, 2);
    }

    #[tokio::test]
    async fn test_run_traffic_without_store() {
        let (mut p, _) = pipeline(single_question(), false);
        let mut seen = Vec::new();

        let report = p
            .run_traffic(3, 0, |i, outcome| seen.push((i, outcome.cache_hit)))
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, false), (2, true), (3, true)]);
        assert_eq!(report.metrics_snapshots, 0);
        assert_eq!(report.persistence_failures, 0);
    }

    #[tokio::test]
    async fn test_zero_questions() {
        let (mut p, calls) = pipeline(single_question(), false);
        let report = p.run_traffic(0, 10, |_, _| {}).await.unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(report.average_quality, 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
