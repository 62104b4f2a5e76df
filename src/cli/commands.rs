//! Implementação dos comandos CLI do score-proxy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::engine::{EngineSettings, ScoreProxy};
use crate::server;
use crate::types::config::Config;
use crate::upstream::HttpScoreSource;
use crate::ProxyResult;

/// Nome do arquivo de configuração criado por `init`.
pub const CONFIG_FILE: &str = "score-proxy.toml";

/// Writes a default configuration file in the specified directory.
pub async fn init(path: Option<PathBuf>) -> ProxyResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config().save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set upstream.client_id in {}", CONFIG_FILE);
    println!("  2. Start the proxy: score-proxy serve");

    Ok(())
}

/// Inicia o proxy HTTP e espera Ctrl-C.
pub async fn serve(
    bind: Option<String>,
    client_id: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(client_id) = client_id {
        config.upstream.client_id = client_id;
    }
    config.validate(true)?;

    tracing::debug!(
        "Configuração carregada: fila={}, intervalo={}ms, ttl={}s, timeout={}s",
        config.queue.capacity,
        config.queue.interval_ms,
        config.cache.ttl_secs,
        config.queue.request_timeout_secs
    );

    let source = Arc::new(HttpScoreSource::from_config(&config.upstream)?);
    let (proxy, worker) = ScoreProxy::start(EngineSettings::from_config(&config), source);

    let listener = server::bind(&config.server.bind).await?;
    server::run(listener, proxy, server::shutdown_signal()).await?;

    // Jobs já aceitos ainda são processados; espera no máximo um timeout
    // de requisição.
    let drain = config.request_timeout() + config.interval();
    if tokio::time::timeout(drain, worker).await.is_err() {
        tracing::warn!("Score worker did not drain within {:?}", drain);
    }

    Ok(())
}

/// Busca um único score pelo motor.
pub async fn score(cpf: &str, config: &Config) -> anyhow::Result<()> {
    config.validate(true)?;

    let source = Arc::new(HttpScoreSource::from_config(&config.upstream)?);
    let (proxy, _worker) = ScoreProxy::start(EngineSettings::from_config(config), source);

    let payload = proxy
        .fetch(cpf)
        .await
        .context("failed to fetch score")?;

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Mostra a configuração efetiva em TOML.
pub fn show_config(config: &Config) -> ProxyResult<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Mostra a versão.
pub fn version() {
    println!("score-proxy {}", env!("CARGO_PKG_VERSION"));
}
