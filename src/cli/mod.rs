//! Interface de linha de comando do qacache.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cache::EvictionPolicy;

/// qacache - Cache LRU/LFU na frente de um LLM, com score de qualidade.
#[derive(Parser, Debug)]
#[command(name = "qacache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "qacache.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Simula tráfego: processa N perguntas sorteadas do dataset.
    Run {
        /// Número de perguntas (padrão: traffic.num_questions).
        #[arg(short = 'n', long)]
        questions: Option<usize>,

        /// Política de evicção (lru ou lfu).
        #[arg(short, long)]
        policy: Option<EvictionPolicy>,

        /// Capacidade do cache.
        #[arg(long)]
        capacity: Option<usize>,

        /// Semente da amostragem.
        #[arg(long)]
        seed: Option<u64>,

        /// Imprime o relatório final em JSON.
        #[arg(long)]
        json: bool,
    },

    /// Processa uma única pergunta sorteada e mostra o resultado.
    Ask,

    /// Mostra as últimas métricas e respostas registradas.
    Stats {
        /// Número de respostas recentes.
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Mostra status da CLI do LLM.
    Status,

    /// Configura opções interativamente.
    Config,

    /// Mostra versão.
    Version,
}
