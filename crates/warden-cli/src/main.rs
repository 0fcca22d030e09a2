//! CLI entry point for the Warden agent runtime demo.
//!
//! Provides the `warden` command with subcommands to run one agent
//! activation, print the resolved configuration, or print the generated
//! system prompt -- all against an in-memory scripted transport, since this
//! binary exists to exercise the executor loop, not to call a real model.

mod cli;
mod demo;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_agent::AgentServer;
use warden_core::LlmTransport;

use crate::cli::{Cli, Commands};
use crate::demo::{EmptyCatalog, ScriptedTransport, demo_agent};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { task } => cmd_run(task).await,
        Commands::Config => cmd_config(),
        Commands::Prompt => cmd_prompt(),
    }
}

async fn cmd_run(task: String) -> Result<()> {
    warden_config::load_dotenv();
    let config = warden_config::resolve(&warden_config::process_defaults_from_env(), &Default::default(), &Default::default());

    let agent = demo_agent();
    let transport: Arc<dyn LlmTransport> = Arc::new(ScriptedTransport::new());
    let server = AgentServer::spawn(agent, config, transport, Arc::new(EmptyCatalog));

    info!(%task, "starting activation");
    let outcome = server.start(task).await?;
    println!("{outcome:?}");
    Ok(())
}

fn cmd_config() -> Result<()> {
    warden_config::load_dotenv();
    let config = warden_config::resolve(&warden_config::process_defaults_from_env(), &Default::default(), &Default::default());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_prompt() -> Result<()> {
    let agent = demo_agent();
    let prompt = warden_prompt::build_prompt(&agent, &EmptyCatalog);
    println!("{prompt}");
    Ok(())
}
