//! CLI argument definitions for the Warden demo binary.

use clap::{Parser, Subcommand};

/// Warden -- a sandboxed, allowlist-governed scripting runtime for agentic AI.
#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Sandboxed agent runtime demo",
    long_about = "Runs one activation of a demo agent against a scripted mock LLM transport, \
                  so the request/evaluate/feedback loop can be inspected end to end without a \
                  live model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one agent activation to completion or cancellation.
    Run {
        /// The task given to the agent.
        task: String,
    },

    /// Print the resolved configuration and exit.
    Config,

    /// Print the generated system prompt and exit.
    Prompt,
}
