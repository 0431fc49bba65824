//! Tipos de resposta do pipeline.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::scoring::QualityScores;

/// Resultado do processamento de uma pergunta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// ID único desta consulta.
    pub query_id: String,

    /// Texto da pergunta.
    pub question: String,

    /// Resposta de referência do dataset.
    pub reference_answer: String,

    /// Resposta usada (do cache ou do LLM).
    pub response: String,

    /// Se a resposta veio do cache.
    pub cache_hit: bool,

    /// Se a resposta é o texto sentinela de uma falha do LLM.
    pub llm_failed: bool,

    /// Scores de qualidade.
    pub scores: QualityScores,

    /// Se a consulta foi persistida.
    pub persisted: bool,
}

/// Resumo de uma rodada de tráfego.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficReport {
    /// Perguntas processadas.
    pub processed: usize,

    /// Consultas em que o LLM falhou.
    pub llm_failures: usize,

    /// Consultas que não puderam ser persistidas.
    pub persistence_failures: usize,

    /// Snapshots de métricas gravados.
    pub metrics_snapshots: usize,

    /// Score médio de qualidade.
    pub average_quality: f64,

    /// Estado final do cache.
    pub cache: CacheStats,
}

impl std::fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} perguntas | política {} | hits={} misses={} ({:.1}%) | score médio {:.3}",
            self.processed,
            self.cache.policy,
            self.cache.hits,
            self.cache.misses,
            self.cache.hit_rate() * 100.0,
            self.average_quality
        )
    }
}
