//! Function tools and toolset assembly.
//!
//! Two kinds of capability live here:
//!
//! - **Local function tools**: implementations of [`FunctionTool`] registered
//!   in a [`ToolRegistry`]. The service decides when to call one, by name with
//!   service-supplied JSON arguments; the registry dispatches and returns the
//!   string result into the running response.
//! - **Grounding-tool descriptors**: [`Toolset::assemble`] builds the list of
//!   [`ToolDefinition`]s the agent is created with - web-search grounding
//!   bound to a project connection, document search bound to a vector store,
//!   and one function descriptor per registered tool.
//!
//! Assembly degrades instead of failing: an unresolvable web-search connection
//! or an absent/empty documents folder just leaves that capability out.

pub mod builtin;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::ProjectClient;
use crate::config::AgentChatConfig;
use crate::types::{ConnectionRecord, FunctionDefinition, ToolDefinition, VectorStoreRecord};
use crate::vector_store;

pub use builtin::{MissionSummaryTool, RocketLaunchTool};

/// A locally-defined callable the model may request by name.
#[async_trait::async_trait]
pub trait FunctionTool: Send + Sync + std::fmt::Debug {
    /// Name the service dispatches on
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON schema for the arguments
    fn parameters_schema(&self) -> Value;

    /// Execute with parsed arguments, returning the string fed back to the run
    async fn execute(&self, arguments: Value) -> std::result::Result<String, ToolError>;

    /// Wire descriptor for agent creation
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::Function {
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

/// Errors from local tool registration and dispatch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Duplicate tool name: {name}")]
    DuplicateTool { name: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },
}

/// Name → tool map for local function dispatch.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn FunctionTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the two Mars-mission function tools.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(RocketLaunchTool))
            .expect("builtin tool names are unique");
        registry
            .register(Arc::new(MissionSummaryTool))
            .expect("builtin tool names are unique");
        registry
    }

    /// Register a tool. Names must be unique.
    pub fn register(
        &mut self,
        tool: Arc<dyn FunctionTool>,
    ) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }
        tracing::debug!(tool = %name, "registered function tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Wire descriptors for every registered tool, in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| self.tools[name].definition())
            .collect()
    }

    /// Dispatch a service-requested call: look the tool up by name, parse the
    /// raw JSON arguments, and execute. An empty argument string means `{}`.
    pub async fn dispatch(
        &self,
        name: &str,
        raw_arguments: &str,
    ) -> std::result::Result<String, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::ToolNotFound {
            name: name.to_string(),
        })?;

        let arguments: Value = if raw_arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(raw_arguments).map_err(|e| ToolError::InvalidParameters {
                message: format!("arguments for '{}' are not valid JSON: {}", name, e),
            })?
        };

        tracing::info!(tool = %name, "executing function tool");
        tool.execute(arguments).await
    }
}

/// The assembled capabilities of the agent for this session.
#[derive(Debug)]
pub struct Toolset {
    /// Descriptors the agent record is created or updated with
    pub definitions: Vec<ToolDefinition>,
    /// The vector store backing document search, when one exists
    pub vector_store: Option<VectorStoreRecord>,
}

impl Toolset {
    /// Assemble the toolset for agent creation.
    ///
    /// Web-search grounding is attempted only when a connection name is
    /// configured, and a resolution failure is logged and skipped rather than
    /// propagated. Document search is included only when
    /// [`vector_store::ensure_vector_store`] yields a store.
    pub async fn assemble(
        client: &ProjectClient,
        config: &AgentChatConfig,
        registry: &ToolRegistry,
    ) -> crate::Result<Self> {
        let web_search = match &config.web_search_connection {
            Some(connection_name) => match client.resolve_connection(connection_name).await {
                Ok(connection) => Some(connection),
                Err(e) => {
                    tracing::warn!(
                        connection = %connection_name,
                        "web-search connection unavailable, continuing without it: {}",
                        e
                    );
                    None
                }
            },
            None => None,
        };

        let vector_store = vector_store::ensure_vector_store(
            client,
            &config.vector_store_name,
            &config.docs_dir,
        )
        .await?;
        if vector_store.is_none() {
            tracing::info!(
                dir = %config.docs_dir.display(),
                "no documents to index, continuing without document search"
            );
        }

        let definitions =
            assemble_definitions(web_search.as_ref(), vector_store.as_ref(), registry);

        tracing::info!(tools = definitions.len(), "assembled toolset");
        Ok(Self {
            definitions,
            vector_store,
        })
    }
}

/// Build the descriptor list from whatever capabilities resolved: web-search
/// grounding when its connection exists, document search when a store exists,
/// and always the registered function tools.
pub fn assemble_definitions(
    web_search: Option<&ConnectionRecord>,
    vector_store: Option<&VectorStoreRecord>,
    registry: &ToolRegistry,
) -> Vec<ToolDefinition> {
    let mut definitions = Vec::new();
    if let Some(connection) = web_search {
        definitions.push(ToolDefinition::WebSearch {
            connection_id: connection.id.clone(),
        });
    }
    if let Some(store) = vector_store {
        definitions.push(ToolDefinition::FileSearch {
            vector_store_ids: vec![store.id.clone()],
        });
    }
    definitions.extend(registry.definitions());
    definitions
}
