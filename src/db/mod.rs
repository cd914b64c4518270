//! Vector database access for the similar-ticket lookup.
//!
//! - [`vectorstore`]: connector/connection traits and the closing guard
//! - [`weaviate`]: the Weaviate REST/GraphQL implementation

/// Connector traits and the connection guard.
pub mod vectorstore;
/// Weaviate over its REST and GraphQL API.
pub mod weaviate;

pub use vectorstore::{
    CollectionInfo, ConnectionGuard, PropertyInfo, StoredObject, VectorStoreConnection,
    VectorStoreConnector,
};
pub use weaviate::WeaviateConnector;
