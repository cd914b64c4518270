//! Similar-ticket lookup against a mocked connector and a mocked Weaviate server.

mod common;

use common::mocks::{stored, CountingConnector, QueryBehavior};
use serde_json::json;
use std::sync::Arc;
use techsupport::db::vectorstore::{ConnectionGuard, VectorStoreConnector};
use techsupport::db::weaviate::WeaviateConnector;
use techsupport::tools::registry::{ErrorKind, Tool};
use techsupport::tools::ticket_search::TicketSearchTool;
use techsupport::types::AppError;
use techsupport::utils::toml_config::VectorStoreConfig;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configured() -> VectorStoreConfig {
    VectorStoreConfig::with_url("http://weaviate.test")
}

fn tool_with(connector: &Arc<CountingConnector>) -> TicketSearchTool {
    TicketSearchTool::with_connector(&configured(), connector.clone())
}

// ============= Mock Connector =============

#[tokio::test]
async fn test_one_match_formats_issue_then_solution() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![stored(&[
        ("originalMessage", "Outlook keeps asking for my password"),
        ("repliesAggregated", "Clear the cached credentials in Credential Manager"),
    ])])));

    let out = tool_with(&connector)
        .search_similar_tickets("outlook password prompt", 1)
        .await;

    assert_eq!(
        out,
        "📋 Original Issue:\nOutlook keeps asking for my password\n\n💡 Solution:\nClear the cached credentials in Credential Manager"
    );
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_only_first_of_several_matches_is_used() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![
        stored(&[("originalMessage", "first"), ("repliesAggregated", "fix one")]),
        stored(&[("originalMessage", "second"), ("repliesAggregated", "fix two")]),
    ])));

    let out = tool_with(&connector).search_similar_tickets("q", 2).await;
    assert!(out.contains("first"));
    assert!(!out.contains("second"));
}

#[tokio::test]
async fn test_query_uses_configured_collection_and_fields() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![])));
    let mut config = configured();
    config.class_name = "SlackMessages".to_string();
    config.issue_field = "question".to_string();
    config.solution_field = "answer".to_string();

    TicketSearchTool::with_connector(&config, connector.clone())
        .search_similar_tickets("vpn", 3)
        .await;

    let recorded = connector.last_query().unwrap();
    assert_eq!(recorded.collection, "SlackMessages");
    assert_eq!(recorded.query, "vpn");
    assert_eq!(recorded.limit, 3);
    assert_eq!(recorded.fields, vec!["question", "answer"]);
}

#[tokio::test]
async fn test_missing_fields_use_placeholders() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![stored(&[])])));
    let out = tool_with(&connector).search_similar_tickets("q", 1).await;
    assert_eq!(
        out,
        "📋 Original Issue:\nNo original message found\n\n💡 Solution:\nNo solution found"
    );
}

#[tokio::test]
async fn test_zero_matches() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![])));
    let out = tool_with(&connector).search_similar_tickets("printer on fire", 1).await;
    assert_eq!(out, "No similar tickets found for query: 'printer on fire'");
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_query_failure_still_closes() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Fail(
        "class not found".to_string(),
    )));
    let out = tool_with(&connector).search_similar_tickets("q", 1).await;
    assert_eq!(out, "Error searching vector store: class not found");
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_panic_during_query_still_closes() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Panic));
    let tool = tool_with(&connector);

    let handle = tokio::spawn(async move { tool.search_similar_tickets("q", 1).await });
    assert!(handle.await.is_err());
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_connect_failure_reports_error() {
    let connector = Arc::new(CountingConnector::refusing());
    let err = tool_with(&connector)
        .run(json!({"query": "q"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Error searching vector store: connection refused");
    assert_eq!(connector.close_count(), 0);
}

#[tokio::test]
async fn test_unconfigured_url_never_connects() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![])));
    let tool = TicketSearchTool::with_connector(&VectorStoreConfig::default(), connector.clone());

    let err = tool.run(json!({"query": "q"})).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(
        err.to_string(),
        "Error: vector store URL not configured (set WEAVIATE_URL)"
    );
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_invalid_field_name_never_connects() {
    let connector = Arc::new(CountingConnector::new(QueryBehavior::Objects(vec![])));
    let mut config = configured();
    config.solution_field = "replies } evil {".to_string();

    let out = TicketSearchTool::with_connector(&config, connector.clone())
        .search_similar_tickets("q", 1)
        .await;
    assert!(out.starts_with("Error: "));
    assert_eq!(connector.connect_count(), 0);
}

// ============= Weaviate over HTTP =============

async fn ready_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/.well-known/ready"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_weaviate_near_text_round_trip() {
    let server = ready_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("nearText"))
        .and(body_string_contains("TechSupport"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "Get": {
                    "TechSupport": [{
                        "originalMessage": "Laptop will not charge",
                        "repliesAggregated": "Replace the power adapter"
                    }]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = TicketSearchTool::new(&VectorStoreConfig::with_url(server.uri()));
    let out = tool.search_similar_tickets("laptop charging", 1).await;

    assert_eq!(
        out,
        "📋 Original Issue:\nLaptop will not charge\n\n💡 Solution:\nReplace the power adapter"
    );
}

#[tokio::test]
async fn test_weaviate_empty_result() {
    let server = ready_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"Get": {"TechSupport": []}}})),
        )
        .mount(&server)
        .await;

    let tool = TicketSearchTool::new(&VectorStoreConfig::with_url(server.uri()));
    let out = tool.search_similar_tickets("nothing like this", 1).await;
    assert_eq!(out, "No similar tickets found for query: 'nothing like this'");
}

#[tokio::test]
async fn test_weaviate_graphql_errors_surface() {
    let server = ready_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Cannot query field \"TechSupport\" on type \"GetObjectsObj\"."}]
        })))
        .mount(&server)
        .await;

    let tool = TicketSearchTool::new(&VectorStoreConfig::with_url(server.uri()));
    let out = tool.search_similar_tickets("q", 1).await;
    assert!(out.starts_with("Error searching vector store:"));
    assert!(out.contains("Cannot query field"));
}

#[tokio::test]
async fn test_weaviate_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/.well-known/ready"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = WeaviateConnector::new()
        .connect(&VectorStoreConfig::with_url(server.uri()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::VectorStore(_)));
}

#[tokio::test]
async fn test_weaviate_sends_bearer_token() {
    std::env::set_var("TICKET_TESTS_WEAVIATE_KEY", "secret-key");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/.well-known/ready"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = VectorStoreConfig::with_url(server.uri());
    config.api_key_env = "TICKET_TESTS_WEAVIATE_KEY".to_string();

    assert!(WeaviateConnector::new().connect(&config).await.is_ok());
}

#[tokio::test]
async fn test_weaviate_collection_info() {
    let server = ready_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/TechSupport"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "class": "TechSupport",
            "vectorizer": "text2vec-openai",
            "properties": [
                {"name": "text", "dataType": ["text"]},
                {"name": "originalMessage", "dataType": ["text"]}
            ]
        })))
        .mount(&server)
        .await;

    let connection = WeaviateConnector::new()
        .connect(&VectorStoreConfig::with_url(server.uri()))
        .await
        .ok()
        .unwrap();
    let guard = ConnectionGuard::new(connection);
    let info = guard.connection().collection_info("TechSupport").await.unwrap();
    guard.release();

    assert_eq!(info.name, "TechSupport");
    assert_eq!(info.vectorizer.as_deref(), Some("text2vec-openai"));
    assert!(info.has_property("text"));
    assert!(info.has_property("originalMessage"));
}

#[tokio::test]
async fn test_weaviate_missing_collection() {
    let server = ready_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/Nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let connection = WeaviateConnector::new()
        .connect(&VectorStoreConfig::with_url(server.uri()))
        .await
        .ok()
        .unwrap();
    let err = connection.collection_info("Nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
