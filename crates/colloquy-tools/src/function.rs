use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use colloquy_common::FunctionDefinition;

use crate::ToolImplementation;

/// A tool backed by an async closure.
///
/// ```rust
/// use colloquy_common::{FunctionDefinition, Parameters};
/// use colloquy_tools::FunctionTool;
///
/// let definition = FunctionDefinition::new("now", "Current UTC time", &Parameters::empty()).unwrap();
/// let tool = FunctionTool::new(definition, |_args| async {
///     anyhow::Ok("2025-01-01T00:00:00Z".to_string())
/// });
/// ```
pub struct FunctionTool<F> {
    definition: FunctionDefinition,
    handler: F,
}

impl<F, Fut> FunctionTool<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    pub const fn new(definition: FunctionDefinition, handler: F) -> Self {
        Self {
            definition,
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> ToolImplementation for FunctionTool<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    fn definition(&self) -> FunctionDefinition {
        self.definition.clone()
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        (self.handler)(args.clone()).await
    }
}
