// Agentdesk CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Auth state is resolved once per invocation and each
// command's gate is checked before it runs.

mod api;
mod auth;
mod client;
mod commands;
mod config;
mod editor;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::Gate;
use crate::config::{CliConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(name = "agentdesk")]
#[command(about = "Agentdesk CLI - Manage document-grounded agents and chat with them")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "AGENTDESK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Value for the X-Requested-With header the backend checks
    #[arg(long, env = "AGENTDESK_REQUEST_TOKEN", hide_env_values = true)]
    pub request_token: Option<String>,

    /// Admin password used to log in; the env var keeps it out of shell history
    #[arg(long, env = "AGENTDESK_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Admin password and session
    Auth {
        #[command(subcommand)]
        command: commands::auth::AuthCommand,
    },

    /// Manage agents
    Agents {
        #[command(subcommand)]
        command: commands::agents::AgentsCommand,
    },

    /// Chat with an agent
    Chat(commands::chat::ChatArgs),
}

impl Commands {
    fn gate(&self) -> Gate {
        match self {
            Commands::Auth { command } => command.gate(),
            Commands::Agents { command } => command.gate(),
            Commands::Chat(args) => args.gate(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentdesk=warn,agentdesk_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output_format = output::OutputFormat::from_str(&cli.output);
    let config = CliConfig::new(&cli.api_url)
        .with_request_token(cli.request_token)
        .with_password(cli.password)
        .with_timeout_secs(cli.timeout)
        .with_output(output_format, cli.quiet);

    let client = client::Client::new(&config).context("Failed to create API client")?;

    let gate = cli.command.gate();
    let context = auth::bootstrap(&client, gate, config.password.as_deref()).await?;
    context.check(gate)?;

    match cli.command {
        Commands::Auth { command } => commands::auth::run(command, &client, &config, &context).await,
        Commands::Agents { command } => commands::agents::run(command, &client, &config).await,
        Commands::Chat(args) => commands::chat::run(args, &client, &config).await,
    }
}
