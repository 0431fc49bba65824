//! # qacache
//!
//! Cache de respostas de LLM com evicção LRU ou LFU.
//!
//! Perguntas sorteadas de um dataset de perguntas e respostas passam por
//! um cache de capacidade fixa antes de chegar ao LLM. Cada resposta é
//! pontuada contra a resposta de referência, e consultas e métricas do
//! cache são gravadas em SQLite para comparar as políticas.
//!
//! ## Módulos
//!
//! - [`cache`] - Cache limitado com políticas LRU e LFU
//! - [`dataset`] - Corpus de perguntas carregado de CSV
//! - [`executors`] - Backends LLM (Gemini CLI)
//! - [`scoring`] - Score de qualidade (TF-IDF, Jaccard, comprimento)
//! - [`storage`] - Persistência de consultas e métricas
//! - [`pipeline`] - Orquestração de consultas e tráfego simulado
//! - `cli` - Interface de linha de comando
//! - [`types`] - Configuração, erros e tipos de resposta

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod dataset;
pub mod executors;
pub mod pipeline;
pub mod scoring;
pub mod storage;
pub mod types;

pub use types::config::Config;
pub use types::errors::{QaCacheError, QaCacheResult};
