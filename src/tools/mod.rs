pub mod arithmetic;
pub mod traits;

pub use arithmetic::{ArithmeticTool, ParamKind, ParamSpec, ToolError};
pub use traits::{Tool, ToolDefinition};

use crate::types::ToolCall;
use std::collections::HashSet;
use tracing::debug;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The set of tools the model is allowed to request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRegistry {
    tools: Vec<ArithmeticTool>,
}

impl ToolRegistry {
    /// Registry with add, subtract, multiply and divide.
    pub fn arithmetic() -> Self {
        Self {
            tools: ArithmeticTool::ALL.to_vec(),
        }
    }

    /// Build from an explicit list. Names must be unique.
    pub fn with_tools(tools: Vec<ArithmeticTool>) -> Result<Self, ToolError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.tool_name()) {
                return Err(ToolError::DuplicateTool(tool.tool_name().into()));
            }
        }
        Ok(Self { tools })
    }

    /// Registry restricted to the given tool names, in the given order.
    pub fn subset<S: AsRef<str>>(names: &[S]) -> Result<Self, ToolError> {
        let tools = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                ArithmeticTool::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_tools(tools)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.tool_name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<ArithmeticTool> {
        self.tools.iter().copied().find(|t| t.tool_name() == name)
    }

    /// Build the list of tool definitions exposed to the inference model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Check a model-emitted call against the registered schema.
    pub fn validate(&self, call: &ToolCall) -> Result<(f64, f64), ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        tool.validate(&call.arguments)
    }

    /// Validate and run a call locally.
    pub fn execute(&self, call: &ToolCall) -> Result<f64, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        debug!("Executing tool {}({})", call.name, call.arguments);
        tool.call(&call.arguments)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::arithmetic()
    }
}
