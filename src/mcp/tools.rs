//! MCP tool dispatch
//!
//! Routes each tool call through lookup, validation, prompt building, and the
//! model backend, and folds every outcome into an [`InvocationResult`].

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::bedrock::client::BackendAdapter;
use crate::catalog::prompts::build_prompt;
use crate::catalog::registry::{OperationSpec, Registry};
use crate::catalog::validator;
use crate::error::DispatchError;
use crate::mcp::types::{CallToolResult, InvocationRequest, InvocationResult, Tool};

/// Tool dispatcher
pub struct Dispatcher {
    registry: Arc<Registry>,
    backend: BackendAdapter,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(registry: Arc<Registry>, backend: BackendAdapter) -> Self {
        Self { registry, backend }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list().iter().map(tool_def).collect()
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        self.invoke(InvocationRequest::new(name, args)).await.into()
    }

    /// Run one invocation. Never fails: every error becomes a failed result.
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let name = request.operation_name.clone();

        match self.try_invoke(request).await {
            Ok((spec, text)) => {
                tracing::info!(operation = %name, "Tool call succeeded");
                InvocationResult::success(spec.operation.label(), &text)
            }
            Err(e) => {
                tracing::warn!(operation = %name, error = %e, "Tool call error");
                InvocationResult::failure(&e)
            }
        }
    }

    async fn try_invoke(&self, request: InvocationRequest) -> Result<(&OperationSpec, String), DispatchError> {
        let spec = self.registry.get(&request.operation_name)?;
        tracing::debug!(operation = %spec.name, stage = "received");

        // a call without arguments is treated as an empty argument object
        let arguments = match request.arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        validator::check(&spec.input_schema, &arguments)?;
        tracing::debug!(operation = %spec.name, stage = "validated");

        let empty = Map::new();
        let prompt = build_prompt(spec.operation, arguments.as_object().unwrap_or(&empty));
        tracing::debug!(operation = %spec.name, stage = "prompt_built", prompt_len = prompt.len());

        let text = self.backend.generate(spec.family, &prompt).await?;
        tracing::debug!(operation = %spec.name, stage = "backend_called", family = %spec.family);

        Ok((spec, text))
    }
}

fn tool_def(spec: &OperationSpec) -> Tool {
    Tool {
        name: spec.name.clone(),
        description: Some(spec.description.clone()),
        input_schema: spec.input_schema.to_json(),
    }
}
