use httpmock::prelude::*;
use mcp_admin::domain::model::{ApiType, Provider, ToolHeader, VisibilityType};
use mcp_admin::{
    ApiClient, ClientConfig, McpError, MemoryNotifier, MemoryTokenStorage, ProviderStore,
    ToolDraft,
};
use serde_json::json;
use std::sync::Arc;

async fn store_for(server: &MockServer) -> (ProviderStore, MemoryNotifier) {
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
    (ProviderStore::new(Arc::new(client)), notifier)
}

fn mock_list(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/providers");
        then.status(200).json_body(json!({
            "providers": [{
                "id": "p1",
                "name": "JSONPlaceholder",
                "apiType": "REST",
                "visibilityType": "PUBLIC",
                "baseURL": "https://jsonplaceholder.typicode.com",
                "secretPrefix": "JSONPLACEHOLDER_TYPICODE_COM",
                "version": 3,
                "tools": [{"id": "t-old", "method": "GET", "path": "/users"}]
            }]
        }));
    });
}

/// 測試缺少不可變欄位時不送出請求
#[tokio::test]
async fn test_add_requires_immutable_fields() {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/providers");
        then.status(200).json_body(json!({"provider": {"id": "p2"}}));
    });
    let (mut store, _notifier) = store_for(&server).await;

    let missing_type = Provider {
        name: Some("Stripe".to_string()),
        visibility_type: Some(VisibilityType::Internal),
        ..Default::default()
    };
    match store.add(missing_type).await {
        Err(McpError::ValidationError { message, .. }) => {
            assert_eq!(message, "Provider type is required and immutable.")
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let missing_visibility = Provider {
        name: Some("Stripe".to_string()),
        api_type: Some(ApiType::Rest),
        ..Default::default()
    };
    match store.add(missing_visibility).await {
        Err(McpError::ValidationError { message, .. }) => {
            assert_eq!(message, "Visibility type is required and immutable.")
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert_eq!(create_mock.hits(), 0);
}

#[tokio::test]
async fn test_add_provider() {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/providers").json_body(json!({
            "provider": {
                "name": "Stripe",
                "apiType": "REST",
                "visibilityType": "INTERNAL",
                "baseURL": "https://api.stripe.com",
                "secretPrefix": "API_STRIPE_COM"
            }
        }));
        then.status(200).json_body(json!({"provider": {"id": "p2", "name": "Stripe"}}));
    });
    let (mut store, notifier) = store_for(&server).await;

    let id = store
        .add(Provider {
            name: Some("Stripe".to_string()),
            api_type: Some(ApiType::Rest),
            visibility_type: Some(VisibilityType::Internal),
            base_url: Some("https://api.stripe.com".to_string()),
            secret_prefix: Some("API_STRIPE_COM".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(id, "p2");
    assert!(store.cached("p2").is_some());
    assert_eq!(notifier.last().unwrap().message, "Provider \"Stripe\" created.");
    create_mock.assert();
}

/// PATCH body 不包含不可變欄位與 tools
#[tokio::test]
async fn test_update_omits_immutable_fields() {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH")
            .path("/api/v1/providers/p1")
            .json_body(json!({"provider": {"name": "Placeholder", "version": 3}}));
        then.status(200).json_body(json!({"provider": {"id": "p1", "name": "Placeholder", "version": 4}}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let mut provider = store.cached("p1").unwrap().clone();
    provider.name = Some("Placeholder".to_string());
    provider.base_url = Some("https://changed.example.com".to_string());
    store.update(&provider).await.unwrap();

    patch_mock.assert();
    let cached = store.cached("p1").unwrap();
    assert_eq!(cached.name.as_deref(), Some("Placeholder"));
    assert_eq!(cached.version, Some(4));
}

/// 新工具放在最前面並更新 provider 版本
#[tokio::test]
async fn test_create_tool_from_sample_body() {
    let server = MockServer::start();
    mock_list(&server);
    let tool_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/providers/p1/tools").json_body(json!({
            "tool": {
                "method": "POST",
                "path": "/posts/{userId}",
                "name": "createPost",
                "headers": [{"key": "Authorization", "value": "Bearer ${API_KEY}"}],
                "reqBodyJSONSchema": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "title": "createPost",
                    "description": "",
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": ""}
                    },
                    "required": ["title"]
                },
                "pathArgsJSONSchema": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "type": "object",
                    "properties": {
                        "userId": {"type": "string", "description": "user id"}
                    },
                    "required": ["userId"]
                }
            }
        }));
        then.status(200).json_body(json!({
            "tool": {"id": "t-new", "method": "POST", "path": "/posts/{userId}", "providerVersion": 4}
        }));
    });
    let (mut store, notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let tool = ToolDraft {
        method: "post".to_string(),
        path: "/posts/{userId}".to_string(),
        name: Some("createPost".to_string()),
        headers: vec![ToolHeader {
            name: "Authorization".to_string(),
            value: "Bearer ${API_KEY}".to_string(),
        }],
        raw_body: Some(r#"{"title": "hello"}"#.to_string()),
        ..Default::default()
    }
    .into_tool()
    .unwrap();

    let created = store.create_tool("p1", tool).await.unwrap();

    tool_mock.assert();
    assert_eq!(created.id.as_deref(), Some("t-new"));
    let provider = store.cached("p1").unwrap();
    assert_eq!(provider.tools[0].id.as_deref(), Some("t-new"));
    assert_eq!(provider.tools.len(), 2);
    assert_eq!(provider.version, Some(4));
    assert_eq!(notifier.last().unwrap().message, "Tool saved for JSONPlaceholder.");
}

/// 後端直接回傳工具（沒有 envelope）時也能處理
#[tokio::test]
async fn test_update_tool_accepts_bare_response() {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH")
            .path("/api/v1/providers/p1/tools/t-old")
            .json_body(json!({"tool": {"method": "GET", "path": "/users", "name": "listUsers"}}));
        then.status(200)
            .json_body(json!({"method": "GET", "path": "/users", "name": "listUsers"}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let mut tool = store.cached("p1").unwrap().tools[0].clone();
    tool.name = Some("listUsers".to_string());
    let updated = store.update_tool("p1", tool).await.unwrap();

    patch_mock.assert();
    assert_eq!(updated.id.as_deref(), Some("t-old"));
    assert_eq!(
        store.cached("p1").unwrap().tools[0].name.as_deref(),
        Some("listUsers")
    );
}

#[tokio::test]
async fn test_tool_operations_need_cached_provider() {
    let server = MockServer::start();
    let (mut store, _notifier) = store_for(&server).await;

    let result = store.delete_tool("missing", "t1").await;
    assert!(matches!(result, Err(McpError::NotFoundError { .. })));
}

#[tokio::test]
async fn test_delete_tool() {
    let server = MockServer::start();
    mock_list(&server);
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/providers/p1/tools/t-old");
        then.status(204);
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    store.delete_tool("p1", "t-old").await.unwrap();

    delete_mock.assert();
    assert!(store.cached("p1").unwrap().tools.is_empty());
}

#[tokio::test]
async fn test_update_with_no_content_keeps_local_changes() {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH").path("/api/v1/providers/p1");
        then.status(204);
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await.unwrap();

    let mut provider = store.cached("p1").unwrap().clone();
    provider.description = Some("Fake REST API".to_string());
    store.update(&provider).await.unwrap();

    patch_mock.assert();
    assert_eq!(
        store.cached("p1").unwrap().description.as_deref(),
        Some("Fake REST API")
    );
}
