use httpmock::prelude::*;
use mcp_admin::{ApiClient, ClientConfig, EnvVarStore, McpError, MemoryNotifier, MemoryTokenStorage};
use serde_json::json;
use std::sync::Arc;

async fn store_for(server: &MockServer) -> (EnvVarStore, MemoryNotifier) {
    let mut config = ClientConfig::default();
    config.api.base_url = server.base_url();
    let notifier = MemoryNotifier::new();
    let client = ApiClient::new(
        &config,
        Arc::new(MemoryTokenStorage::with_token("t")),
        Arc::new(notifier.clone()),
    )
    .await
    .unwrap();
    (EnvVarStore::new(Arc::new(client)), notifier)
}

fn mock_list(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/variables");
        then.status(200).json_body(json!({
            "variables": [
                {"id": "v1", "name": "API_KEY", "value": "sk-1", "type": "SECRET"},
                {"id": "v2", "name": "REGION", "value": "eu", "type": "ENV"}
            ]
        }));
    });
}

/// 測試後端 type 轉為 is_secret
#[tokio::test]
async fn test_fetch_maps_type_to_secret_flag() {
    let server = MockServer::start();
    mock_list(&server);
    let (mut store, _notifier) = store_for(&server).await;

    store.fetch().await.unwrap();

    assert_eq!(store.variables().len(), 2);
    assert!(store.get_by_name("API_KEY").unwrap().is_secret);
    assert!(!store.get_by_name("REGION").unwrap().is_secret);
    assert_eq!(
        store.missing(&["REGION".to_string(), "DB_URL".to_string()]),
        vec!["DB_URL".to_string()]
    );
}

/// 名稱重複時不會送出請求
#[tokio::test]
async fn test_duplicate_name_rejected_locally() {
    let server = MockServer::start();
    mock_list(&server);
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/variables");
        then.status(200).json_body(json!({"variable": {"id": "v3"}}));
    });
    let (mut store, notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let result = store.add("API_KEY", "other", true).await;

    match result {
        Err(McpError::DuplicateNameError { name }) => assert_eq!(name, "API_KEY"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(create_mock.hits(), 0);
    assert_eq!(
        notifier.last().unwrap().message,
        "Variable name \"API_KEY\" already exists."
    );
    assert_eq!(store.variables().len(), 2);
}

/// 前後空白不影響重複名稱檢查
#[tokio::test]
async fn test_padded_duplicate_name_rejected() {
    let server = MockServer::start();
    mock_list(&server);
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/variables");
        then.status(200).json_body(json!({"variable": {"id": "v3", "name": "API_KEY"}}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let result = store.add(" API_KEY ", "y", false).await;

    assert!(matches!(result, Err(McpError::DuplicateNameError { ref name }) if name == "API_KEY"));
    assert_eq!(create_mock.hits(), 0);
    let names: Vec<_> = store.variables().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["API_KEY", "REGION"]);
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/variables");
        then.status(200).json_body(json!({"variable": {"id": "v3"}}));
    });
    let (mut store, _notifier) = store_for(&server).await;

    let result = store.add("   ", "y", false).await;

    assert!(matches!(result, Err(McpError::ValidationError { .. })));
    assert_eq!(create_mock.hits(), 0);
}

#[tokio::test]
async fn test_add_trims_and_sends_type() {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/variables")
            .json_body(json!({"variable": {"name": "DB_URL", "value": "postgres://db", "type": "SECRET"}}));
        then.status(200).json_body(json!({
            "variable": {"id": "v9", "name": "DB_URL", "value": "postgres://db", "type": "SECRET"}
        }));
    });
    let (mut store, notifier) = store_for(&server).await;

    let created = store.add(" DB_URL ", " postgres://db ", true).await.unwrap();
    assert_eq!(created.id, "v9");
    assert!(created.is_secret);

    create_mock.assert();
    assert_eq!(
        notifier.last().unwrap().message,
        "Environment Variable \"DB_URL\" created successfully!"
    );
}

#[tokio::test]
async fn test_update_value_patches_only_value() {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH")
            .path("/api/v1/variables/v2")
            .json_body(json!({"variable": {"value": "us"}}));
        then.status(200).json_body(json!({"variable": {"id": "v2"}}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let updated = store.update_value("v2", "us ").await.unwrap();
    assert_eq!(updated.value, "us");
    assert_eq!(updated.name, "REGION");
    patch_mock.assert();
}

/// 刪除失敗時回傳 false 且保留本地資料
#[tokio::test]
async fn test_delete_reports_result() {
    let server = MockServer::start();
    mock_list(&server);
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/variables/v1");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/variables/v2");
        then.status(500).json_body(json!({"message": "in use"}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    assert!(store.delete("v1").await);
    assert!(store.get_by_name("API_KEY").is_none());

    assert!(!store.delete("v2").await);
    assert!(store.get_by_name("REGION").is_some());
}
