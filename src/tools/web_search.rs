use crate::tools::registry::{required_arguments_present, Tool, ToolError, ToolOutcome};
use crate::utils::toml_config::WebSearchConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// The subset of the DuckDuckGo instant-answer payload we read.
#[derive(Debug, Default, Deserialize)]
pub struct InstantAnswer {
    /// `Abstract` text, empty when DuckDuckGo has no summary.
    #[serde(rename = "Abstract", default)]
    pub abstract_text: Option<String>,
    /// `RelatedTopics`; entries with a `Text` field are results.
    #[serde(rename = "RelatedTopics", default)]
    pub related_topics: Vec<Value>,
}

impl InstantAnswer {
    /// Render the answer as the tool's reply, or `None` when there is nothing to show.
    ///
    /// Topic groups and entries without `Text` are skipped; at most
    /// `max_results` snippets are kept.
    pub fn render(&self, max_results: usize) -> Option<String> {
        let mut parts = Vec::new();

        if let Some(text) = self.abstract_text.as_deref().filter(|t| !t.is_empty()) {
            parts.push(format!("Instant Answer: {}", text));
        }

        parts.extend(
            self.related_topics
                .iter()
                .filter_map(|topic| topic.get("Text").and_then(|t| t.as_str()))
                .filter(|text| !text.is_empty())
                .take(max_results)
                .map(|text| format!("• {}", text)),
        );

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Looks things up through an instant-answer search endpoint.
pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    default_max_results: u64,
}

impl WebSearchTool {
    /// Registered tool name.
    pub const NAME: &'static str = "WebSearchTool";

    /// Client for `config.endpoint`.
    pub fn new(config: &WebSearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            default_max_results: config.default_max_results,
        }
    }

    /// Issue one query and format whatever comes back.
    pub async fn search(&self, query: &str, max_results: usize) -> ToolOutcome {
        tracing::debug!(query = %query, max_results, endpoint = %self.endpoint, "Web search");

        let answer = self
            .fetch(query)
            .await
            .map_err(|e| ToolError::transport("performing web search", e))?;

        Ok(answer.render(max_results).unwrap_or_else(|| {
            format!(
                "No results found for '{}'. Try rephrasing your search.",
                query
            )
        }))
    }

    async fn fetch(&self, query: &str) -> Result<InstantAnswer, reqwest::Error> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<InstantAnswer>()
            .await
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the web for information using DuckDuckGo. Useful for finding current information, news, or facts."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up on the web"
                },
                "max_results": {
                    "type": "integer",
                    "description": format!(
                        "Maximum number of results to return (default: {})",
                        self.default_max_results
                    ),
                    "default": self.default_max_results
                }
            },
            "required": ["query"]
        })
    }

    fn validate(&self, args: &Value) -> bool {
        if !required_arguments_present(&self.parameters_schema(), args) || !args["query"].is_string() {
            return false;
        }
        match args.get("max_results") {
            None | Some(Value::Null) => true,
            Some(n) => n.as_u64().is_some(),
        }
    }

    async fn run(&self, args: Value) -> ToolOutcome {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidInput("query must be a string".to_string()))?;
        let max_results = args["max_results"]
            .as_u64()
            .unwrap_or(self.default_max_results);

        self.search(query, max_results as usize).await
    }
}
