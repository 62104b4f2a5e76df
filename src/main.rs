use clap::Parser;
use score_proxy::cli::{Cli, Commands};
use score_proxy::types::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
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

    init_logging(&log_level, &config.general.log_format);

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            score_proxy::cli::commands::init(path).await?;
        }
        Commands::Serve { bind, client_id } => {
            score_proxy::cli::commands::serve(bind, client_id, &config).await?;
        }
        Commands::Score { cpf } => {
            score_proxy::cli::commands::score(&cpf, &config).await?;
        }
        Commands::Config => {
            score_proxy::cli::commands::show_config(&config)?;
        }
        Commands::Version => {
            score_proxy::cli::commands::version();
        }
    }

    Ok(())
}

fn init_logging(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("score_proxy={}", log_level)))
        .unwrap_or_else(|_| EnvFilter::new("score_proxy=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
