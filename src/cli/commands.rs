//! Implementação dos comandos CLI do qacache.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::EvictionPolicy;
use crate::dataset::CsvQuestionSource;
use crate::executors::{GeminiExecutor, LlmBackend};
use crate::pipeline::QueryPipeline;
use crate::storage::ResultStore;
use crate::types::config::Config;
use crate::{QaCacheError, QaCacheResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> QaCacheResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("qacache.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'qacache config' to modify.");
        return Ok(());
    }

    // Diretório do banco de resultados
    let data_dir = target_dir.join(".qacache");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".qacache/ directory created");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("qacache initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: .qacache/");
    println!();
    println!("Next steps:");
    println!(
        "  1. Put the dataset at {} (or edit dataset.path)",
        config.dataset.path.display()
    );
    println!("  2. Check the LLM CLI: qacache status");
    println!("  3. Run traffic: qacache run --questions 1000 --policy lfu");

    Ok(())
}

/// Updates or creates .gitignore to include .qacache/
fn update_gitignore(target_dir: &Path) -> QaCacheResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".qacache/";
    let comment = "# qacache - local results database";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == ".qacache")
        {
            tracing::debug!(".gitignore already contains .qacache/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .qacache/");
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with .qacache/");
    }

    Ok(())
}

/// Monta o pipeline padrão: dataset CSV + Gemini CLI.
async fn build_pipeline(
    config: &Config,
) -> QaCacheResult<QueryPipeline<CsvQuestionSource, GeminiExecutor>> {
    let source = CsvQuestionSource::from_config(&config.dataset)?;
    let backend = GeminiExecutor::from_config(&config.llm);

    if !backend.is_available().await {
        tracing::warn!(
            "'{}' não encontrado; as consultas ao LLM vão falhar",
            backend.command()
        );
    }

    QueryPipeline::from_config(config, source, backend)
}

/// Flags do comando `run` que sobrescrevem o TOML.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub questions: Option<usize>,
    pub policy: Option<EvictionPolicy>,
    pub capacity: Option<usize>,
    pub seed: Option<u64>,
    pub json: bool,
}

/// Simula tráfego contra o cache.
pub async fn run(overrides: RunOverrides, config: &Config) -> QaCacheResult<()> {
    let mut config = config.clone();
    if let Some(policy) = overrides.policy {
        config.cache.policy = policy;
    }
    if let Some(capacity) = overrides.capacity {
        config.cache.capacity = capacity;
    }
    if overrides.seed.is_some() {
        config.dataset.seed = overrides.seed;
    }
    config.validate()?;

    let num_questions = overrides
        .questions
        .unwrap_or(config.traffic.num_questions);
    let progress_interval = config.traffic.progress_interval;

    let mut pipeline = build_pipeline(&config).await?;

    if !overrides.json {
        println!(
            "Executando {} perguntas (política {}, capacidade {})...\n",
            num_questions, config.cache.policy, config.cache.capacity
        );
    }

    let bar = ProgressBar::new(num_questions as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}) {msg}",
        )
        .map_err(|e| QaCacheError::other(e.to_string()))?,
    );

    let mut hits = 0usize;
    let report = pipeline
        .run_traffic(num_questions, config.traffic.metrics_interval, |i, outcome| {
            if outcome.cache_hit {
                hits += 1;
            }
            bar.inc(1);
            bar.set_message(format!("hits {}", hits));

            if progress_interval > 0 && i % progress_interval == 0 {
                tracing::info!("{} perguntas processadas", i);
            }
        })
        .await?;

    bar.finish_and_clear();

    if overrides.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report);
    println!("Falhas do LLM: {}", report.llm_failures);
    println!("Evicções: {}", report.cache.evictions);
    if config.storage.enabled {
        println!(
            "Snapshots de métricas: {} (banco: {})",
            report.metrics_snapshots,
            config.storage.db_path.display()
        );
        if report.persistence_failures > 0 {
            println!(
                "Aviso: {} consultas não foram persistidas",
                report.persistence_failures
            );
        }
    }

    Ok(())
}

/// Processa uma única pergunta e mostra o resultado.
pub async fn ask(config: &Config) -> QaCacheResult<()> {
    let mut pipeline = build_pipeline(config).await?;
    let outcome = pipeline.process_question().await?;

    println!("Pergunta:\n  {}\n", outcome.question);
    println!("Resposta do dataset:\n  {}\n", outcome.reference_answer);
    println!("Resposta do LLM:\n  {}\n", outcome.response);
    println!(
        "Score: {:.3} (cosseno {:.3}, jaccard {:.3}, comprimento {:.3})",
        outcome.scores.overall,
        outcome.scores.cosine,
        outcome.scores.jaccard,
        outcome.scores.length_ratio
    );

    if outcome.llm_failed {
        println!("\nO LLM falhou; verifique com 'qacache status'.");
    }

    Ok(())
}

/// Mostra as métricas e respostas registradas no banco.
pub async fn stats(limit: usize, config: &Config) -> QaCacheResult<()> {
    if !config.storage.enabled {
        println!("Persistência está desabilitada na configuração.");
        return Ok(());
    }

    let db_path = &config.storage.db_path;

    if !db_path.exists() {
        println!("Banco de resultados ainda não foi criado.");
        println!("Execute 'qacache run' para começar a coletar dados.");
        return Ok(());
    }

    let store = ResultStore::open(db_path)?;

    println!("qacache - Resultados registrados\n");

    match store.latest_cache_metrics(None)? {
        Some(metrics) => {
            println!(
                "Últimas métricas ({}, {}):",
                metrics.policy,
                metrics.recorded_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Hits: {}", metrics.cache_hits);
            println!("  Misses: {}", metrics.cache_misses);
            println!("  Total: {}", metrics.total_requests);
            println!("  Hit rate: {:.1}%", metrics.hit_rate * 100.0);
        }
        None => println!("Nenhum snapshot de métricas registrado."),
    }

    println!();
    println!("Consultas registradas: {}", store.count_queries()?);
    if let Some(avg) = store.average_quality()? {
        println!("Score médio de qualidade: {:.3}", avg);
    }

    let recent = store.recent_responses(limit)?;
    if !recent.is_empty() {
        println!("\nRespostas recentes:");
        for (i, record) in recent.iter().enumerate() {
            println!(
                "  {}. [{}] {:.3} - {}",
                i + 1,
                if record.cache_hit { "hit" } else { "miss" },
                record.quality_score,
                truncate(&record.question_text, 60)
            );
        }
    }

    Ok(())
}

/// Mostra status da CLI do LLM, do dataset e do banco.
pub async fn status(config: &Config) -> QaCacheResult<()> {
    println!("Verificando status...\n");

    let backend = GeminiExecutor::from_config(&config.llm);
    let name = backend.name();

    if backend.is_available().await {
        println!("  ✓ {} - disponível (comando: {})", name, backend.command());
        if let Ok(version) = backend.version().await {
            println!("      versão: {}", version);
        }
    } else {
        println!(
            "  ✗ {} - não encontrado (comando esperado: {})",
            name,
            backend.command()
        );
    }

    let dataset = &config.dataset.path;
    if dataset.exists() {
        println!("  ✓ Dataset - {}", dataset.display());
    } else {
        println!("  ✗ Dataset - {} não encontrado", dataset.display());
    }

    if !config.storage.enabled {
        println!("  ○ Banco - desabilitado");
    } else if config.storage.db_path.exists() {
        println!("  ✓ Banco - {}", config.storage.db_path.display());
    } else {
        println!(
            "  ○ Banco - {} (será criado no primeiro run)",
            config.storage.db_path.display()
        );
    }

    println!();
    println!(
        "Cache: {} com capacidade {}",
        config.cache.policy, config.cache.capacity
    );

    Ok(())
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> QaCacheResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Mostra versão.
pub fn version() {
    println!("qacache {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cache LRU/LFU para respostas de LLM, com score de qualidade");
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
