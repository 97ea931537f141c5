//! # colloquy-tools
//!
//! Local function tools the model can call during a conversation.
//!
//! ## Core Components
//!
//! - [`ToolImplementation`]: Trait for defining tools with execution logic
//! - [`ToolRegistry`]: Thread-safe name → tool map
//! - [`ToolExecutor`]: Registry plus argument parsing and dispatch
//! - [`FunctionTool`]: Adapter turning an async closure into a tool
//!
//! ## Example
//!
//! ```rust
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use colloquy_common::FunctionDefinition;
//! use colloquy_common::tools::ToolCall;
//! use colloquy_tools::{ToolExecutor, ToolImplementation};
//! use serde_json::{Value, json};
//!
//! struct GreetingTool;
//!
//! #[async_trait]
//! impl ToolImplementation for GreetingTool {
//!     fn definition(&self) -> FunctionDefinition {
//!         FunctionDefinition {
//!             name: "greet".to_string(),
//!             description: "Greet a person by name".to_string(),
//!             parameters: json!({
//!                 "type": "object",
//!                 "properties": {"name": {"type": "string"}},
//!                 "required": ["name"]
//!             }),
//!             strict: None,
//!         }
//!     }
//!
//!     async fn execute(&self, args: &Value) -> Result<String> {
//!         let name = args["name"].as_str().unwrap_or("stranger");
//!         Ok(format!("Hello, {name}!"))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let mut executor = ToolExecutor::new();
//! executor.add_tool(GreetingTool);
//!
//! let call = ToolCall {
//!     call_id: "call_1".to_string(),
//!     name: "greet".to_string(),
//!     arguments: r#"{"name":"Ada"}"#.to_string(),
//! };
//! assert_eq!(executor.execute_tool(&call).await?, "Hello, Ada!");
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! The [`ToolRegistry`] uses `DashMap` for concurrent access, so several tool
//! calls of one turn can look up and run their tools at the same time.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use serde_json::Value;

use colloquy_common::{FunctionDefinition, ToolCall};

mod function;

pub use function::FunctionTool;

/// A locally executed function the model can call.
#[async_trait]
pub trait ToolImplementation: Send + Sync {
    /// The definition advertised to the model. Its `name` is the registry key.
    fn definition(&self) -> FunctionDefinition;

    /// Runs the tool with parsed arguments and returns its textual output.
    ///
    /// # Errors
    ///
    /// Any error is reported to the model as a failed tool call.
    async fn execute(&self, args: &Value) -> Result<String>;
}

/// Thread-safe map from function name to implementation.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn ToolImplementation>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// Registers a tool under its definition's name, replacing any previous one.
    pub fn register(&self, tool: Arc<dyn ToolImplementation>) {
        let name = tool.definition().name;
        debug!("Registering tool '{name}'");
        self.tools.insert(name, tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.tools.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Definitions of every registered tool, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        let mut definitions: Vec<_> = self.tools.iter().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.tools.remove(name).map(|(_, tool)| tool)
    }

    pub fn clear(&self) {
        self.tools.clear();
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.key().clone()).collect()
    }
}

/// Registry plus dispatch of [`ToolCall`]s.
#[derive(Clone, Default)]
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor over an existing registry.
    #[must_use]
    pub const fn with_registry(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn add_tool<T: ToolImplementation + 'static>(&mut self, tool: T) {
        self.registry.register(Arc::new(tool));
    }

    pub fn add_tool_arc(&mut self, tool: Arc<dyn ToolImplementation>) {
        self.registry.register(tool);
    }

    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    #[must_use]
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.registry.definitions()
    }

    pub fn remove_tool(&mut self, name: &str) -> Option<Arc<dyn ToolImplementation>> {
        self.registry.remove(name)
    }

    pub fn reset_tools(&mut self) {
        self.registry.clear();
    }

    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool call.
    ///
    /// # Errors
    /// Returns an error if the tool is not found or if execution fails.
    pub async fn execute_tool(&self, tool_call: &ToolCall) -> Result<String> {
        let tool = self
            .registry
            .get(&tool_call.name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: '{}'", tool_call.name))?;

        let args = Self::parse_arguments(tool_call);
        debug!("Executing tool '{}' ({})", tool_call.name, tool_call.call_id);

        tool.execute(&args).await
    }

    /// Parses the argument string; text that is not JSON is passed as a string.
    fn parse_arguments(tool_call: &ToolCall) -> Value {
        let json = tool_call.arguments_json();
        if json == "{}" {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(json).unwrap_or_else(|_| Value::String(json.to_string()))
        }
    }
}
