//! Tipos de erro do qacache.

use thiserror::Error;

/// Tipo de resultado padrão do qacache.
pub type QaCacheResult<T> = Result<T, QaCacheError>;

/// Erros possíveis no qacache.
#[derive(Error, Debug)]
pub enum QaCacheError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de banco de dados: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Erro ao ler dataset: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Dataset vazio: {0}")]
    EmptyDataset(String),

    #[error("Executor '{0}' não encontrado ou não disponível")]
    ExecutorNotFound(String),

    #[error("Executor '{0}' falhou: {1}")]
    ExecutorFailed(String, String),

    #[error("Timeout ao executar '{0}'")]
    ExecutorTimeout(String),

    #[error("Configuração não encontrada em: {0}")]
    ConfigNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl QaCacheError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
