//! Backends LLM do qacache.
//!
//! Este módulo contém o contrato texto-entra/texto-sai consumido pelo
//! pipeline e o wrapper para a Gemini CLI.

mod base;
mod gemini;

pub use base::{LlmBackend, LlmReply};
pub use gemini::GeminiExecutor;
