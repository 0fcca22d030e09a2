//! Shared data model and external-collaborator traits for the Warden agent
//! runtime.
//!
//! This crate owns the types every other `warden-*` crate passes around:
//! conversation messages, the fully-resolved per-activation config, the
//! structured action an LLM produces, and the descriptors an agent/tool
//! author supplies. It also defines the two traits that keep the LLM
//! transport and tool catalog pluggable ([`LlmTransport`], [`ToolCatalog`]).

pub mod action;
pub mod config;
pub mod descriptor;
pub mod message;
pub mod transport;
pub mod vault;

pub use action::{ActionKind, ActionReply};
pub use config::{Config, SandboxConfig};
pub use descriptor::{AgentDescriptor, ConfigOverrides, FieldType, FunctionSignature, OutputField, OutputSchema, ToolDescriptor};
pub use message::{Conversation, Message, Role};
pub use transport::{LlmTransport, ToolCatalog, TransportError};
pub use vault::VaultWriter;
