//! Executor para Gemini CLI.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;

use super::base::LlmBackend;
use crate::types::config::LlmConfig;
use crate::{QaCacheError, QaCacheResult};

/// Executor para Gemini CLI (Google).
pub struct GeminiExecutor {
    command_name: String,
    model: String,
    args: Vec<String>,
    timeout: Duration,
}

impl GeminiExecutor {
    /// Cria um novo executor Gemini com valores padrão.
    pub fn new() -> Self {
        Self::from_config(&LlmConfig::default())
    }

    /// Cria executor a partir da configuração do TOML.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            command_name: config.command.clone(),
            model: config.model.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Define o comando.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command_name = command.into();
        self
    }

    /// Define o modelo (vazio = padrão da CLI).
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Define os argumentos extras.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Define o timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.command_name);
        cmd.args(&self.args);
        if !self.model.is_empty() {
            cmd.arg("-m").arg(&self.model);
        }
        // Prompt é posicional
        cmd.arg(prompt);
        cmd.kill_on_drop(true);
        cmd
    }
}

impl Default for GeminiExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for GeminiExecutor {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn command(&self) -> &str {
        &self.command_name
    }

    async fn ask(&self, prompt: &str) -> QaCacheResult<String> {
        let mut cmd = self.build_command(prompt);

        tracing::debug!(command = %self.command_name, model = %self.model, "Consultando LLM");

        // Executa a CLI com timeout
        let result = tokio::time::timeout(self.timeout, cmd.output()).await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if text.is_empty() {
                        Err(QaCacheError::ExecutorFailed(
                            self.name().to_string(),
                            "resposta vazia".to_string(),
                        ))
                    } else {
                        Ok(text)
                    }
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(QaCacheError::ExecutorFailed(
                        self.name().to_string(),
                        stderr.trim().to_string(),
                    ))
                }
            }
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(QaCacheError::ExecutorNotFound(self.command_name.clone()))
                } else {
                    Err(QaCacheError::ExecutorFailed(
                        self.name().to_string(),
                        e.to_string(),
                    ))
                }
            }
            Err(_) => Err(QaCacheError::ExecutorTimeout(self.name().to_string())),
        }
    }
}
