//! Tipos compartilhados do qacache.

pub mod config;
pub mod errors;
pub mod responses;
