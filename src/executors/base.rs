//! Trait base para backends LLM.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::QaCacheResult;

/// Trait para backends LLM de pergunta → resposta.
///
/// Cada backend encapsula um modelo externo e expõe uma interface
/// texto-entra/texto-sai. Falhas voltam como `Err`; quem decide o que
/// fazer com elas é o pipeline (ver [`LlmReply`]).
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Retorna o nome do backend.
    fn name(&self) -> &str;

    /// Retorna o comando CLI.
    fn command(&self) -> &str;

    /// Verifica se a CLI está disponível no sistema.
    async fn is_available(&self) -> bool {
        tokio::process::Command::new(self.command())
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Retorna a versão da CLI.
    async fn version(&self) -> QaCacheResult<String> {
        let output = tokio::process::Command::new(self.command())
            .arg("--version")
            .output()
            .await?;

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(version)
    }

    /// Envia o prompt e retorna a resposta em texto.
    async fn ask(&self, prompt: &str) -> QaCacheResult<String>;
}

/// Resposta do LLM vista pelo pipeline.
///
/// O cache não distingue os dois casos: ele guarda o texto de
/// [`LlmReply::text`], seja uma resposta ou a mensagem de erro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum LlmReply {
    /// Resposta do modelo.
    Answer(String),
    /// Falha do backend, já formatada como texto sentinela.
    Failed(String),
}

impl LlmReply {
    /// Prefixo do texto sentinela de falha.
    pub const ERROR_PREFIX: &'static str = "[LLM error]";

    /// Converte o resultado do backend.
    pub fn from_result(result: QaCacheResult<String>) -> Self {
        match result {
            Ok(text) => LlmReply::Answer(text),
            Err(e) => LlmReply::Failed(format!("{} {}", Self::ERROR_PREFIX, e)),
        }
    }

    /// Texto a ser cacheado e pontuado.
    pub fn text(&self) -> &str {
        match self {
            LlmReply::Answer(text) | LlmReply::Failed(text) => text,
        }
    }

    /// Consome a resposta retornando o texto.
    pub fn into_text(self) -> String {
        match self {
            LlmReply::Answer(text) | LlmReply::Failed(text) => text,
        }
    }

    /// Verifica se é uma falha do backend.
    pub fn is_failure(&self) -> bool {
        matches!(self, LlmReply::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QaCacheError;

    struct MockBackend;

    #[async_trait]
    impl LlmBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        fn command(&self) -> &str {
            "definitely-not-installed-qacache-mock"
        }

        async fn ask(&self, prompt: &str) -> QaCacheResult<String> {
            Ok(format!("eco: {}", prompt))
        }
    }

    #[tokio::test]
    async fn test_mock_backend_ask() {
        let backend = MockBackend;
        assert_eq!(backend.ask("oi").await.unwrap(), "eco: oi");
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let backend = MockBackend;
        assert!(!backend.is_available().await);
        assert!(backend.version().await.is_err());
    }

    #[test]
    fn test_reply_from_ok() {
        let reply = LlmReply::from_result(Ok("42".to_string()));
        assert_eq!(reply, LlmReply::Answer("42".to_string()));
        assert_eq!(reply.text(), "42");
        assert!(!reply.is_failure());
    }

    #[test]
    fn test_reply_from_err_becomes_sentinel() {
        let reply = LlmReply::from_result(Err(QaCacheError::ExecutorTimeout("Gemini".into())));

        assert!(reply.is_failure());
        assert!(reply.text().starts_with(LlmReply::ERROR_PREFIX));
        assert!(reply.text().contains("Timeout"));
        assert_eq!(reply.clone().into_text(), reply.text());
    }
}
