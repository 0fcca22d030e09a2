//! The agent server actor (C7) and the tool option vault it owns (C8).

pub mod error;
pub mod server;
pub mod vault;

pub use error::{AgentError, Result};
pub use server::{ActivationOutcome, AgentServer, ServerStatus};
pub use vault::Vault;
