//! The four arithmetic tools advertised to the model.

use super::traits::Tool;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors raised while checking or evaluating a tool call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{0}' is registered more than once")]
    DuplicateTool(String),

    #[error("Missing '{argument}' argument for tool '{tool}'")]
    MissingArgument { tool: String, argument: String },

    #[error("Argument '{argument}' for tool '{tool}' must be a number, got {value}")]
    InvalidArgument {
        tool: String,
        argument: String,
        value: String,
    },

    #[error("Arguments for tool '{0}' must be an object")]
    ArgumentsNotObject(String),
}

/// Parameter types a tool schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::Number => "number",
        }
    }
}

/// One required parameter in a tool's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

const BINARY_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "a",
        kind: ParamKind::Number,
    },
    ParamSpec {
        name: "b",
        kind: ParamKind::Number,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticTool {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticTool {
    pub const ALL: [ArithmeticTool; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.tool_name() == name)
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Add => "Add two numbers",
            Self::Subtract => "Subtract second number from first number",
            Self::Multiply => "Multiply two numbers",
            Self::Divide => "Divide two numbers",
        }
    }

    /// Ordered, all-required parameter list.
    pub fn params(self) -> &'static [ParamSpec] {
        BINARY_PARAMS
    }

    /// Evaluate on already-validated operands.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide => {
                if b == 0.0 {
                    return Err(ToolError::DivisionByZero);
                }
                Ok(a / b)
            }
        }
    }

    /// Check `args` against the parameter list and pull out the operands.
    pub fn validate(self, args: &Value) -> Result<(f64, f64), ToolError> {
        let object = args
            .as_object()
            .ok_or_else(|| ToolError::ArgumentsNotObject(self.tool_name().into()))?;

        let a = self.number_arg(object, self.params()[0])?;
        let b = self.number_arg(object, self.params()[1])?;
        Ok((a, b))
    }

    fn number_arg(self, object: &Map<String, Value>, spec: ParamSpec) -> Result<f64, ToolError> {
        let value = object
            .get(spec.name)
            .ok_or_else(|| ToolError::MissingArgument {
                tool: self.tool_name().into(),
                argument: spec.name.into(),
            })?;

        match spec.kind {
            ParamKind::Number => value.as_f64().ok_or_else(|| ToolError::InvalidArgument {
                tool: self.tool_name().into(),
                argument: spec.name.into(),
                value: value.to_string(),
            }),
        }
    }

    /// Validate then evaluate.
    pub fn call(self, args: &Value) -> Result<f64, ToolError> {
        let (a, b) = self.validate(args)?;
        self.apply(a, b)
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        self.tool_name()
    }

    fn description(&self) -> &str {
        self.summary()
    }

    fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params()
            .iter()
            .map(|p| (p.name.to_string(), json!({ "type": p.kind.json_type() })))
            .collect();
        let required: Vec<&str> = self.params().iter().map(|p| p.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let result = self.call(&args)?;
        Ok(result.to_string())
    }
}
