use clap::Parser;
use qacache::cli::{Cli, Commands};
use qacache::types::config::Config;
use qacache::QaCacheResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> QaCacheResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|e| {
            eprintln!("Aviso: {} ({}); usando padrões", e, cli.config.display());
            Config::default_config()
        })
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("qacache={}", log_level)
            .parse()
            .unwrap_or_else(|_| "qacache=info".parse().expect("fallback directive is valid")),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.general.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            qacache::cli::commands::init(path).await?;
        }
        Commands::Run {
            questions,
            policy,
            capacity,
            seed,
            json,
        } => {
            let overrides = qacache::cli::commands::RunOverrides {
                questions,
                policy,
                capacity,
                seed,
                json,
            };
            qacache::cli::commands::run(overrides, &config).await?;
        }
        Commands::Ask => {
            qacache::cli::commands::ask(&config).await?;
        }
        Commands::Stats { limit } => {
            qacache::cli::commands::stats(limit, &config).await?;
        }
        Commands::Status => {
            qacache::cli::commands::status(&config).await?;
        }
        Commands::Config => {
            qacache::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Version => {
            qacache::cli::commands::version();
        }
    }

    Ok(())
}
