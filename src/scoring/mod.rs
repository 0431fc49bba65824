//! Pontuação de qualidade das respostas do LLM.
//!
//! Compara a resposta gerada com a melhor resposta do dataset usando
//! três métricas combinadas em um score único:
//!
//! - cosseno TF-IDF (50%)
//! - Jaccard sobre tokens (30%)
//! - razão de comprimento (20%)

mod scorer;
mod stop_words;
mod tfidf;

pub use scorer::{QualityScores, ResponseScorer, COSINE_WEIGHT, JACCARD_WEIGHT, LENGTH_WEIGHT};
pub use tfidf::{TfidfCosine, DEFAULT_MAX_FEATURES};
