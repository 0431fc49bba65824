//! Orquestração das consultas: amostragem, cache, LLM, score e persistência.

mod engine;

pub use engine::QueryPipeline;
