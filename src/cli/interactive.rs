//! Configuração interativa do qacache.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cache::EvictionPolicy;
use crate::types::config::Config;
use crate::QaCacheResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> QaCacheResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do qacache\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    loop {
        let options = [
            "Configurações Gerais",
            "Cache",
            "Dataset",
            "LLM",
            "Persistência",
            "Tráfego",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_cache(&theme, &mut config)?,
            2 => configure_dataset(&theme, &mut config)?,
            3 => configure_llm(&theme, &mut config)?,
            4 => configure_storage(&theme, &mut config)?,
            5 => configure_traffic(&theme, &mut config)?,
            6 => {
                config.validate()?;
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            7 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n📋 Configurações Gerais\n");

    let log_levels = ["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = ["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

fn configure_cache(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n💾 Configuração do Cache\n");

    let policies = [
        "LRU (remove o menos recentemente usado)",
        "LFU (remove o menos frequentemente usado)",
    ];
    let current_idx = match config.cache.policy {
        EvictionPolicy::Lru => 0,
        EvictionPolicy::Lfu => 1,
    };

    let policy_idx = Select::with_theme(theme)
        .with_prompt("Política de evicção")
        .items(&policies)
        .default(current_idx)
        .interact()?;

    config.cache.policy = match policy_idx {
        0 => EvictionPolicy::Lru,
        _ => EvictionPolicy::Lfu,
    };

    let capacity: usize = Input::with_theme(theme)
        .with_prompt("Capacidade máxima (número de entradas)")
        .default(config.cache.capacity)
        .validate_with(|value: &usize| {
            if *value >= 1 {
                Ok(())
            } else {
                Err("a capacidade deve ser >= 1")
            }
        })
        .interact_text()?;

    config.cache.capacity = capacity;

    config.cache.cache_errors = Confirm::with_theme(theme)
        .with_prompt("Cachear falhas do LLM?")
        .default(config.cache.cache_errors)
        .interact()?;

    println!("\n✓ Cache configurado.\n");
    Ok(())
}

fn configure_dataset(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n📚 Configuração do Dataset\n");

    let path: String = Input::with_theme(theme)
        .with_prompt("Caminho do CSV")
        .default(config.dataset.path.display().to_string())
        .interact_text()?;

    config.dataset.path = PathBuf::from(path);

    let seed: String = Input::with_theme(theme)
        .with_prompt("Semente da amostragem (vazio = aleatória)")
        .default(
            config
                .dataset
                .seed
                .map(|s| s.to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    config.dataset.seed = seed.trim().parse().ok();

    println!("\n✓ Dataset configurado.\n");
    Ok(())
}

fn configure_llm(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n🤖 Configuração do LLM\n");

    let command: String = Input::with_theme(theme)
        .with_prompt("Comando")
        .default(config.llm.command.clone())
        .interact_text()?;

    config.llm.command = command;

    let model: String = Input::with_theme(theme)
        .with_prompt("Modelo")
        .default(config.llm.model.clone())
        .allow_empty(true)
        .interact_text()?;

    config.llm.model = model;

    let args_str: String = Input::with_theme(theme)
        .with_prompt("Argumentos extras (separados por espaço)")
        .default(config.llm.args.join(" "))
        .allow_empty(true)
        .interact_text()?;

    config.llm.args = args_str.split_whitespace().map(String::from).collect();

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt("Timeout (segundos)")
        .default(config.llm.timeout_secs)
        .interact_text()?;

    config.llm.timeout_secs = timeout;

    println!("\n✓ LLM configurado.\n");
    Ok(())
}

fn configure_storage(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n🗄️  Configuração da Persistência\n");

    config.storage.enabled = Confirm::with_theme(theme)
        .with_prompt("Persistir consultas e métricas?")
        .default(config.storage.enabled)
        .interact()?;

    if !config.storage.enabled {
        println!("Persistência desabilitada.\n");
        return Ok(());
    }

    let db_path: String = Input::with_theme(theme)
        .with_prompt("Caminho do banco de dados")
        .default(config.storage.db_path.display().to_string())
        .interact_text()?;

    config.storage.db_path = PathBuf::from(db_path);

    config.storage.fail_fast = Confirm::with_theme(theme)
        .with_prompt("Abortar o run em erro de persistência?")
        .default(config.storage.fail_fast)
        .interact()?;

    println!("\n✓ Persistência configurada.\n");
    Ok(())
}

fn configure_traffic(theme: &ColorfulTheme, config: &mut Config) -> QaCacheResult<()> {
    println!("\n🚦 Configuração do Tráfego\n");

    let num_questions: usize = Input::with_theme(theme)
        .with_prompt("Perguntas por run")
        .default(config.traffic.num_questions)
        .interact_text()?;

    config.traffic.num_questions = num_questions;

    let progress_interval: usize = Input::with_theme(theme)
        .with_prompt("Log de progresso a cada N perguntas (0 = nunca)")
        .default(config.traffic.progress_interval)
        .interact_text()?;

    config.traffic.progress_interval = progress_interval;

    let metrics_interval: usize = Input::with_theme(theme)
        .with_prompt("Snapshot de métricas a cada N perguntas (0 = só no fim)")
        .default(config.traffic.metrics_interval)
        .interact_text()?;

    config.traffic.metrics_interval = metrics_interval;

    println!("\n✓ Tráfego configurado.\n");
    Ok(())
}

/// Mostra resumo da configuração.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ Geral                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Cache                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Política: {:<29} │", config.cache.policy.to_string());
    println!("│ Capacidade: {:<27} │", config.cache.capacity);
    println!(
        "│ Cachear falhas: {:<23} │",
        if config.cache.cache_errors {
            "Sim"
        } else {
            "Não"
        }
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ Dataset / LLM                           │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ CSV: {:<34} │",
        config.dataset.path.display().to_string()
    );
    println!("│ Comando: {:<30} │", config.llm.command);
    println!("│ Modelo: {:<31} │", config.llm.model);
    println!("│ Timeout: {:<29}s │", config.llm.timeout_secs);
    println!("├─────────────────────────────────────────┤");
    println!("│ Persistência                            │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Habilitada: {:<27} │",
        if config.storage.enabled { "Sim" } else { "Não" }
    );
    if config.storage.enabled {
        println!(
            "│ Banco: {:<32} │",
            config.storage.db_path.display().to_string()
        );
    }
    println!(
        "│ Métricas: a cada {:<21} │",
        format!("{} perguntas", config.traffic.metrics_interval)
    );
    println!("└─────────────────────────────────────────┘");
    println!();
}
