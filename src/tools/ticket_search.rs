use crate::db::vectorstore::{ConnectionGuard, StoredObject, VectorStoreConnector};
use crate::db::weaviate::WeaviateConnector;
use crate::tools::registry::{required_arguments_present, Tool, ToolError, ToolOutcome};
use crate::types::{AppError, SearchMatch};
use crate::utils::toml_config::{is_identifier, VectorStoreConfig};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Finds the past support ticket closest to a new issue.
pub struct TicketSearchTool {
    config: VectorStoreConfig,
    connector: Arc<dyn VectorStoreConnector>,
}

impl TicketSearchTool {
    /// Registered tool name.
    pub const NAME: &'static str = "TicketSearchTool";

    /// Use the Weaviate connector.
    pub fn new(config: &VectorStoreConfig) -> Self {
        Self::with_connector(config, Arc::new(WeaviateConnector::new()))
    }

    /// Uses `connector` instead of Weaviate.
    pub fn with_connector(config: &VectorStoreConfig, connector: Arc<dyn VectorStoreConnector>) -> Self {
        Self {
            config: config.clone(),
            connector,
        }
    }

    /// Look up the `k` nearest tickets and describe the best one.
    pub async fn search_similar_tickets(&self, query: &str, k: usize) -> String {
        match self.find(query, k).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        }
    }

    async fn find(&self, query: &str, k: usize) -> ToolOutcome {
        if self.config.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ToolError::Config(
                "vector store URL not configured (set WEAVIATE_URL)".to_string(),
            ));
        }

        let fields = [
            self.config.issue_field.as_str(),
            self.config.solution_field.as_str(),
        ];
        if let Some(bad) = std::iter::once(self.config.class_name.as_str())
            .chain(fields)
            .find(|name| !is_identifier(name))
        {
            return Err(ToolError::Config(format!(
                "'{}' is not a valid collection or field name",
                bad
            )));
        }

        let connection = self
            .connector
            .connect(&self.config)
            .await
            .map_err(search_error)?;
        let guard = ConnectionGuard::new(connection);

        let result = guard
            .connection()
            .near_text(&self.config.class_name, query, k.max(1), &fields)
            .await;
        guard.release();

        let objects = result.map_err(search_error)?;
        tracing::debug!(query = %query, matches = objects.len(), "Ticket search finished");

        Ok(match objects.first() {
            Some(object) => self.to_match(object).to_string(),
            None => format!("No similar tickets found for query: '{}'", query),
        })
    }

    fn to_match(&self, object: &StoredObject) -> SearchMatch {
        let field = |name: &str, fallback: &str| {
            object
                .get(name)
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| fallback.to_string())
        };

        SearchMatch {
            original_message: field(&self.config.issue_field, "No original message found"),
            solution_text: field(&self.config.solution_field, "No solution found"),
        }
    }
}

fn search_error(e: AppError) -> ToolError {
    tracing::warn!(error = %e, "Vector store lookup failed");
    ToolError::transport("searching vector store", e.detail())
}

#[async_trait]
impl Tool for TicketSearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search past tech support tickets for the issue most similar to the user's problem and return its solution."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Description of the user's problem"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of candidate tickets to retrieve (default: 1)",
                    "default": 1
                }
            },
            "required": ["query"]
        })
    }

    fn validate(&self, args: &Value) -> bool {
        required_arguments_present(&self.parameters_schema(), args)
            && args["query"].is_string()
            && match args.get("k") {
                None | Some(Value::Null) => true,
                Some(k) => k.as_u64().is_some_and(|k| k >= 1),
            }
    }

    async fn run(&self, args: Value) -> ToolOutcome {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidInput("query must be a string".to_string()))?;
        let k = args["k"].as_u64().unwrap_or(1) as usize;
        self.find(query, k).await
    }
}
