//! Agent and tool descriptors: the data an agent author supplies, and the
//! data a tool author supplies, to configure one executor activation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use warden_allowlist::{AllowlistSpec, ModuleRegistry};

/// The primitive types an output field may take. `List` nests recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    String,
    Float,
    Integer,
    Boolean,
    List(Box<FieldType>),
}

/// A single field of an agent's `output_schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputField {
    pub ty: FieldType,
    pub required: bool,
}

/// An ordered field -> definition map. A plain `Vec` preserves declaration
/// order without pulling in an ordered-map dependency the rest of the
/// workspace has no other use for.
pub type OutputSchema = Vec<(String, OutputField)>;

/// One function a tool exposes to sandboxed code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub arity: u32,
    pub doc: String,
    pub params: Vec<String>,
}

/// A tool module offered to an agent.
///
/// `allowlist_contribution` is merged into the agent's combined allowlist
/// spec at setup time; it is the tool author's declaration of which of its
/// own functions sandboxed code may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub moduledoc: String,
    pub functions: Vec<FunctionSignature>,
    pub allowlist_contribution: HashMap<String, warden_allowlist::Permission>,
    /// Overrides the tool's description in the generated prompt, if set.
    #[serde(default)]
    pub description_override: Option<String>,
}

impl ToolDescriptor {
    /// The description shown in the generated prompt: the override if
    /// present, else the moduledoc.
    pub fn effective_description(&self) -> &str {
        self.description_override.as_deref().unwrap_or(&self.moduledoc)
    }
}

/// Partial overrides applied at one layer of config resolution (C5). Every
/// field is optional; `None` means "inherit from the next layer down".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_iterations: Option<u32>,
    pub max_retries: Option<u32>,
    pub sandbox_timeout_ms: Option<u64>,
    pub sandbox_max_heap_size_units: Option<u64>,
}

/// Everything needed to run one agent activation, supplied by the caller.
pub struct AgentDescriptor {
    pub moduledoc: String,
    pub tools: Vec<ToolDescriptor>,
    pub output_schema: OutputSchema,
    pub system_prompt_extra: Option<String>,
    pub static_config: ConfigOverrides,
    pub sandbox_options: ConfigOverrides,
    pub allowlist: AllowlistSpec,
    /// The combined "public surface" catalog the analyzer authorizes calls
    /// against: the Default Allowlist's registry plus every tool's
    /// `allowlist_contribution` exported surface.
    pub module_registry: ModuleRegistry,
    /// Per-tool dynamic options, computed once at setup and written into
    /// the tool option vault; keyed by tool name.
    tool_options: HashMap<String, Value>,
}

impl AgentDescriptor {
    pub fn new(
        moduledoc: impl Into<String>,
        tools: Vec<ToolDescriptor>,
        allowlist: AllowlistSpec,
        module_registry: ModuleRegistry,
    ) -> Self {
        Self {
            moduledoc: moduledoc.into(),
            tools,
            output_schema: OutputSchema::new(),
            system_prompt_extra: None,
            static_config: ConfigOverrides::default(),
            sandbox_options: ConfigOverrides::default(),
            allowlist,
            module_registry,
            tool_options: HashMap::new(),
        }
    }

    /// Declare the per-tool options computed for this activation.
    pub fn set_tool_options(&mut self, tool: impl Into<String>, options: Value) {
        self.tool_options.insert(tool.into(), options);
    }

    /// Look up a tool's declared options by name.
    pub fn tool_options(&self, tool: &str) -> Value {
        self.tool_options.get(tool).cloned().unwrap_or(Value::Object(Default::default()))
    }
}
