//! Interface de linha de comando do score-proxy.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// score-proxy - Proxy com cache e limite de taxa para a API de score.
#[derive(Parser, Debug)]
#[command(name = "score-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "score-proxy.toml")]
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
    /// Cria um arquivo de configuração padrão.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Inicia o proxy HTTP.
    Serve {
        /// Endereço de escuta (sobrescreve server.bind).
        #[arg(short, long)]
        bind: Option<String>,

        /// Identificador do cliente (sobrescreve upstream.client_id).
        #[arg(long)]
        client_id: Option<String>,
    },

    /// Busca o score de um CPF pelo motor e imprime o JSON.
    Score {
        /// CPF a consultar.
        cpf: String,
    },

    /// Mostra a configuração efetiva.
    Config,

    /// Mostra versão.
    Version,
}
