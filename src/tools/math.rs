use crate::tools::expression::{self, ExpressionError};
use crate::tools::registry::{Tool, ToolError, ToolOutcome};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Evaluates arithmetic expressions with a fixed set of math functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathTool;

impl MathTool {
    /// Registered tool name.
    pub const NAME: &'static str = "MathTool";

    /// The calculator tool. It holds no state.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `expression` and format the value.
    pub fn calculate(&self, expression: &str) -> ToolOutcome {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(ToolError::InvalidInput("Expression is empty".to_string()));
        }

        match expression::evaluate(expression) {
            Ok(value) => Ok(format!("Result: {}", value)),
            Err(ExpressionError::Unsafe(token)) => {
                tracing::warn!(token = %token, "Rejected expression with disallowed token");
                Err(ToolError::InvalidInput(
                    "Expression contains unsafe operations".to_string(),
                ))
            }
            Err(ExpressionError::Eval(message)) => {
                Err(ToolError::execution("evaluating expression", message))
            }
        }
    }
}

#[async_trait]
impl Tool for MathTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Perform mathematical calculations and evaluate expressions. Supports + - * / // ** \
         and parentheses, plus sqrt, sin, cos, tan, log, exp, abs and the constants pi and e."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Mathematical expression to evaluate, e.g. '2 + 2' or 'sqrt(16)'"
                }
            },
            "required": ["expression"]
        })
    }

    fn validate(&self, args: &Value) -> bool {
        args.get("expression")
            .and_then(|e| e.as_str())
            .map(|e| !e.trim().is_empty())
            .unwrap_or(false)
    }

    async fn run(&self, args: Value) -> ToolOutcome {
        let expression = args["expression"].as_str().ok_or_else(|| {
            ToolError::InvalidInput("expression must be a string".to_string())
        })?;
        self.calculate(expression)
    }
}
