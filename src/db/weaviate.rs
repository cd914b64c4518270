//! Weaviate connector speaking the REST and GraphQL API.
//!
//! - readiness: `GET /v1/.well-known/ready`
//! - search: `POST /v1/graphql` with a `Get { Class(nearText: ...) }` query
//! - schema: `GET /v1/schema/{Class}`
//!
//! An API key, when configured, is sent as a bearer token.

use crate::db::vectorstore::{
    CollectionInfo, PropertyInfo, StoredObject, VectorStoreConnection, VectorStoreConnector,
};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{is_identifier, VectorStoreConfig};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Connects to a Weaviate instance.
#[derive(Clone, Default)]
pub struct WeaviateConnector {
    client: reqwest::Client,
}

impl WeaviateConnector {
    /// Connector with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Accept bare hosts (as cloud consoles display them) and strip trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[async_trait]
impl VectorStoreConnector for WeaviateConnector {
    async fn connect(&self, config: &VectorStoreConfig) -> Result<Box<dyn VectorStoreConnection>> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::Config("vector store URL not configured".to_string()))?;

        let connection = WeaviateConnection {
            client: self.client.clone(),
            base_url: normalize_base_url(url),
            api_key: config.api_key(),
            timeout: Duration::from_secs(config.timeout_secs),
            closed: false,
        };

        let response = connection
            .request(connection.client.get(connection.endpoint("/v1/.well-known/ready")))
            .send()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to reach Weaviate: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::VectorStore(format!(
                "Weaviate at {} is not ready (HTTP {})",
                connection.base_url,
                response.status()
            )));
        }

        tracing::debug!(url = %connection.base_url, "Connected to Weaviate");
        Ok(Box::new(connection))
    }
}

/// An open Weaviate session.
pub struct WeaviateConnection {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ClassSchema {
    class: String,
    #[serde(default)]
    vectorizer: Option<String>,
    #[serde(default)]
    properties: Vec<PropertySchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertySchema {
    name: String,
    #[serde(default)]
    data_type: Vec<String>,
}

impl WeaviateConnection {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.timeout(self.timeout);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(AppError::VectorStore("connection is closed".to_string()));
        }
        Ok(())
    }
}

/// Build the GraphQL `Get` query for a nearText search.
pub fn near_text_query(collection: &str, query: &str, limit: usize, fields: &[&str]) -> Result<String> {
    if !is_identifier(collection) {
        return Err(AppError::InvalidInput(format!(
            "Invalid collection name '{}'",
            collection
        )));
    }
    if fields.is_empty() {
        return Err(AppError::InvalidInput("No fields requested".to_string()));
    }
    if let Some(bad) = fields.iter().find(|f| !is_identifier(f)) {
        return Err(AppError::InvalidInput(format!("Invalid field name '{}'", bad)));
    }

    // A JSON string literal is a valid GraphQL string literal
    let concept = Value::String(query.to_string()).to_string();

    Ok(format!(
        "{{ Get {{ {}(nearText: {{concepts: [{}]}}, limit: {}) {{ {} }} }} }}",
        collection,
        concept,
        limit,
        fields.join(" ")
    ))
}

#[async_trait]
impl VectorStoreConnection for WeaviateConnection {
    async fn near_text(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        fields: &[&str],
    ) -> Result<Vec<StoredObject>> {
        self.ensure_open()?;
        let graphql = near_text_query(collection, query, limit, fields)?;

        let response = self
            .request(self.client.post(self.endpoint("/v1/graphql")))
            .json(&json!({ "query": graphql }))
            .send()
            .await
            .map_err(|e| AppError::VectorStore(format!("GraphQL request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorStore(format!(
                "GraphQL request returned HTTP {}: {}",
                status, body
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| AppError::VectorStore(format!("Invalid GraphQL response: {}", e)))?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::VectorStore(messages.join("; ")));
        }

        let objects = body
            .data
            .as_ref()
            .and_then(|d| d.get("Get"))
            .and_then(|g| g.get(collection))
            .and_then(|c| c.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(objects)
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo> {
        self.ensure_open()?;
        if !is_identifier(collection) {
            return Err(AppError::InvalidInput(format!(
                "Invalid collection name '{}'",
                collection
            )));
        }

        let response = self
            .request(
                self.client
                    .get(self.endpoint(&format!("/v1/schema/{}", collection))),
            )
            .send()
            .await
            .map_err(|e| AppError::VectorStore(format!("Schema request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::NotFound(format!(
                    "Collection '{}' not found",
                    collection
                )))
            }
            status if !status.is_success() => {
                return Err(AppError::VectorStore(format!(
                    "Schema request returned HTTP {}",
                    status
                )))
            }
            _ => {}
        }

        let schema: ClassSchema = response
            .json()
            .await
            .map_err(|e| AppError::VectorStore(format!("Invalid schema response: {}", e)))?;

        Ok(CollectionInfo {
            name: schema.class,
            vectorizer: schema.vectorizer,
            properties: schema
                .properties
                .into_iter()
                .map(|p| PropertyInfo {
                    name: p.name,
                    data_type: p.data_type,
                })
                .collect(),
        })
    }

    fn close(&mut self) {
        // REST sessions hold no server-side state
        self.closed = true;
        tracing::debug!(url = %self.base_url, "Closed Weaviate connection");
    }
}
