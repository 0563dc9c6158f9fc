pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo CLI - Command-line client for the Smart Todo API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "TODO_API_URL",
        default_value = "http://localhost:8000",
        help = "Base URL of the API server"
    )]
    pub url: String,

    #[arg(long, global = true, env = "TODO_API_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Folder management")]
    Folders {
        #[command(subcommand)]
        cmd: commands::folders::FolderCommands,
    },

    #[command(about = "Todo list management")]
    Lists {
        #[command(subcommand)]
        cmd: commands::lists::ListCommands,
    },

    #[command(about = "Todo management")]
    Todos {
        #[command(subcommand)]
        cmd: commands::todos::TodoCommands,
    },

    #[command(about = "Mint a development token from SUPABASE_JWT_SECRET")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let client = || ApiClient::new(&cli.url, cli.token.clone());

    match cli.command {
        Commands::Folders { cmd } => commands::folders::handle(cmd, &client()?, output_format).await,
        Commands::Lists { cmd } => commands::lists::handle(cmd, &client()?, output_format).await,
        Commands::Todos { cmd } => commands::todos::handle(cmd, &client()?, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}
