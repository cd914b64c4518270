//! Vector store boundary used by the similar-ticket lookup.
//!
//! A [`VectorStoreConnector`] opens a [`VectorStoreConnection`] for one
//! lookup. The connection is held in a [`ConnectionGuard`], which closes it
//! exactly once whether the lookup succeeds, finds nothing, fails or unwinds.
//!
//! ```text
//!   TicketSearchTool ──connect──▶ VectorStoreConnector
//!          │                            │
//!          │◀──── ConnectionGuard ◀─────┘
//!          │          │
//!          └─near_text┘──▶ close() on release / drop
//! ```

use crate::types::Result;
use crate::utils::toml_config::VectorStoreConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One object returned by a query: property name to value.
pub type StoredObject = Map<String, Value>;

/// Opens connections to a vector database.
#[async_trait]
pub trait VectorStoreConnector: Send + Sync {
    /// Establish a connection using the endpoint and credentials in `config`.
    async fn connect(&self, config: &VectorStoreConfig) -> Result<Box<dyn VectorStoreConnection>>;
}

/// A live connection to a vector database.
#[async_trait]
pub trait VectorStoreConnection: Send + Sync {
    /// Semantic search over `collection`, returning at most `limit` objects
    /// with only the requested `fields`, most similar first.
    async fn near_text(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        fields: &[&str],
    ) -> Result<Vec<StoredObject>>;

    /// Describe a collection's schema.
    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo>;

    /// Release the connection. Called once by [`ConnectionGuard`].
    fn close(&mut self);
}

/// Schema summary for a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection (class) name.
    pub name: String,
    /// Vectorizer module, when the schema names one.
    pub vectorizer: Option<String>,
    /// Properties in schema order.
    pub properties: Vec<PropertyInfo>,
}

/// A single property in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Property name.
    pub name: String,
    /// Weaviate data types, e.g. `["text"]`.
    pub data_type: Vec<String>,
}

impl CollectionInfo {
    /// Whether `name` is one of the properties.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    /// Property names in schema order.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Owns a connection and closes it exactly once.
pub struct ConnectionGuard {
    connection: Box<dyn VectorStoreConnection>,
    closed: bool,
}

impl ConnectionGuard {
    /// Takes ownership of an open connection.
    pub fn new(connection: Box<dyn VectorStoreConnection>) -> Self {
        Self {
            connection,
            closed: false,
        }
    }

    /// The open connection, for queries.
    pub fn connection(&self) -> &dyn VectorStoreConnection {
        self.connection.as_ref()
    }

    /// Close now instead of waiting for drop.
    pub fn release(mut self) {
        self.close_once();
    }

    fn close_once(&mut self) {
        if !self.closed {
            self.closed = true;
            self.connection.close();
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.close_once();
    }
}
