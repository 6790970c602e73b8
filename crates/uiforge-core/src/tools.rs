//! Tool registry — the callable tools offered to the model.
//!
//! Each tool pairs a declared [`ToolDefinition`] (what the model sees) with a
//! [`ToolExecutor`] (what the engine runs). The registry is built once at
//! startup and injected into the engine; tests build registries from mock
//! executors.
//!
//! The catalog registry carries three tools, meant to be used in order:
//!
//! 1. `get_all_components_metadata` — titles and descriptions of every component
//! 2. `select_components` — an explicit, logged selection step
//! 3. `get_components_docs_batch` — full documentation for the selection

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use crate::BoxFuture;
use crate::catalog::Catalog;
use crate::llm::types::ToolDefinition;

pub const GET_ALL_COMPONENTS_METADATA: &str = "get_all_components_metadata";
pub const SELECT_COMPONENTS: &str = "select_components";
pub const GET_COMPONENTS_DOCS_BATCH: &str = "get_components_docs_batch";

/// Errors from tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input for {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },

    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// The executable side of a tool.
pub trait ToolExecutor: Send + Sync {
    /// Run the tool with the model-supplied input, returning its text output.
    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>>;
}

/// A registered tool: declaration plus executor.
#[derive(Clone)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub executor: Arc<dyn ToolExecutor>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

/// Registry of the tools offered to the model, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry with the three catalog tools bound to `catalog`.
    pub fn for_catalog(catalog: Catalog) -> Self {
        let mut registry = Self::new();
        registry.register(RegisteredTool {
            definition: metadata_definition(),
            executor: Arc::new(MetadataTool {
                catalog: catalog.clone(),
            }),
        });
        registry.register(RegisteredTool {
            definition: select_definition(),
            executor: Arc::new(SelectComponentsTool),
        });
        registry.register(RegisteredTool {
            definition: docs_batch_definition(),
            executor: Arc::new(DocsBatchTool { catalog }),
        });
        registry
    }

    /// Register a tool, replacing any tool with the same name in place.
    pub fn register(&mut self, tool: RegisteredTool) {
        match self
            .tools
            .iter_mut()
            .find(|t| t.definition.name == tool.definition.name)
        {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.definition.name == name)
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.definition.name.as_str())
            .collect()
    }

    /// All tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ── Definitions ─────────────────────────────────────────────────────────

fn metadata_definition() -> ToolDefinition {
    ToolDefinition {
        name: GET_ALL_COMPONENTS_METADATA.to_string(),
        description: "Gets metadata (title and description) for all components. Use this FIRST to decide which components are relevant.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
    }
}

fn select_definition() -> ToolDefinition {
    ToolDefinition {
        name: SELECT_COMPONENTS.to_string(),
        description: "After reading component metadata, use this to select which components you need for the task. This helps track which components to read fully.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "selectedComponents": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Array of component names that are relevant for the task"
                }
            },
            "required": ["selectedComponents"]
        }),
    }
}

fn docs_batch_definition() -> ToolDefinition {
    ToolDefinition {
        name: GET_COMPONENTS_DOCS_BATCH.to_string(),
        description: "Gets full documentation for multiple components at once. PREFERRED way to get docs for the components you selected.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "componentNames": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Array of component names to retrieve documentation for"
                }
            },
            "required": ["componentNames"]
        }),
    }
}

// ── Executors ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectInput {
    selected_components: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocsBatchInput {
    component_names: Vec<String>,
}

fn parse_input<T: DeserializeOwned>(tool: &str, input: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::Execution(e.to_string()))
}

/// `get_all_components_metadata`: every component's title and description.
struct MetadataTool {
    catalog: Catalog,
}

impl ToolExecutor for MetadataTool {
    fn execute(&self, _input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let metadata = self.catalog.all_metadata().await;
            to_pretty_json(&metadata)
        })
    }
}

/// `select_components`: acknowledges the selection and points at the batch fetch.
struct SelectComponentsTool;

impl ToolExecutor for SelectComponentsTool {
    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let input: SelectInput = parse_input(SELECT_COMPONENTS, input)?;
            let selected = input.selected_components.join(", ");
            info!(components = %selected, "Selected components");
            Ok(format!(
                "You have selected: {selected}. Now proceed to get full documentation for ALL these components at once using {GET_COMPONENTS_DOCS_BATCH}."
            ))
        })
    }
}

/// `get_components_docs_batch`: full documentation keyed by component name.
struct DocsBatchTool {
    catalog: Catalog,
}

impl ToolExecutor for DocsBatchTool {
    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<String, ToolError>> {
        Box::pin(async move {
            let input: DocsBatchInput = parse_input(GET_COMPONENTS_DOCS_BATCH, input)?;
            let docs: BTreeMap<String, String> =
                self.catalog.read_docs_batch(&input.component_names).await;
            to_pretty_json(&docs)
        })
    }
}
