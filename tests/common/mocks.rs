//! Mock implementations for testing.
//!
//! Hand-written stand-ins for the two external boundaries: the LLM and the
//! vector store. Both record what they were asked so tests can assert on it.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use techsupport::db::vectorstore::{
    CollectionInfo, PropertyInfo, StoredObject, VectorStoreConnection, VectorStoreConnector,
};
use techsupport::llm::{LLMClient, LLMResponse};
use techsupport::types::{AppError, ChatMessage, Result, ToolDefinition};
use techsupport::utils::toml_config::VectorStoreConfig;

// ============= LLM =============

/// Mock LLM client that plays back a script of responses.
///
/// Once the script runs out it repeats `fallback`, or fails when there is
/// none. Every request's messages are recorded.
pub struct MockLLMClient {
    script: Mutex<VecDeque<LLMResponse>>,
    fallback: Option<LLMResponse>,
    should_fail: bool,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
}

impl MockLLMClient {
    /// Play `responses` in order.
    pub fn scripted(responses: Vec<LLMResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            fallback: None,
            should_fail: false,
            requests: Mutex::new(vec![]),
            offered_tools: Mutex::new(vec![]),
        }
    }

    /// Return the same response forever.
    pub fn repeating(response: LLMResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::scripted(vec![])
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::scripted(vec![])
        }
    }

    /// Messages sent on each call so far.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Tool names offered on each call so far.
    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.offered_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());

        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return Ok(next);
        }
        self.fallback
            .clone()
            .ok_or_else(|| AppError::LLM("Mock script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Vector Store =============

/// How the mock connection answers `near_text`.
#[derive(Clone)]
pub enum QueryBehavior {
    Objects(Vec<StoredObject>),
    Fail(String),
    Panic,
}

/// The last `near_text` call: collection, query, limit, fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub collection: String,
    pub query: String,
    pub limit: usize,
    pub fields: Vec<String>,
}

/// Connector that counts connects and closes.
pub struct CountingConnector {
    behavior: QueryBehavior,
    refuse_connect: bool,
    pub connects: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub last_query: Arc<Mutex<Option<RecordedQuery>>>,
}

impl CountingConnector {
    pub fn new(behavior: QueryBehavior) -> Self {
        Self {
            behavior,
            refuse_connect: false,
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    /// A connector whose `connect` always fails.
    pub fn refusing() -> Self {
        Self {
            refuse_connect: true,
            ..Self::new(QueryBehavior::Objects(vec![]))
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<RecordedQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStoreConnector for CountingConnector {
    async fn connect(&self, _config: &VectorStoreConfig) -> Result<Box<dyn VectorStoreConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect {
            return Err(AppError::VectorStore("connection refused".to_string()));
        }
        Ok(Box::new(MockConnection {
            behavior: self.behavior.clone(),
            closes: self.closes.clone(),
            last_query: self.last_query.clone(),
        }))
    }
}

struct MockConnection {
    behavior: QueryBehavior,
    closes: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<RecordedQuery>>>,
}

#[async_trait]
impl VectorStoreConnection for MockConnection {
    async fn near_text(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        fields: &[&str],
    ) -> Result<Vec<StoredObject>> {
        *self.last_query.lock().unwrap() = Some(RecordedQuery {
            collection: collection.to_string(),
            query: query.to_string(),
            limit,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });

        match &self.behavior {
            QueryBehavior::Objects(objects) => Ok(objects.clone()),
            QueryBehavior::Fail(message) => Err(AppError::VectorStore(message.clone())),
            QueryBehavior::Panic => panic!("mock vector store panicked"),
        }
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo> {
        Ok(CollectionInfo {
            name: collection.to_string(),
            vectorizer: None,
            properties: vec![PropertyInfo {
                name: "text".to_string(),
                data_type: vec!["text".to_string()],
            }],
        })
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build a stored object from `(property, value)` pairs.
pub fn stored(pairs: &[(&str, &str)]) -> StoredObject {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect::<Map<String, Value>>()
}
