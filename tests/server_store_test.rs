use anyhow::Result;
use httpmock::prelude::*;
use mcp_admin::domain::model::{Server, ServerProvider, ToolRef};
use mcp_admin::{
    ApiClient, ClientConfig, McpError, MemoryNotifier, MemoryTokenStorage, ServerStore,
};
use serde_json::json;
use std::sync::Arc;

async fn store_for(server: &MockServer) -> (ServerStore, MemoryNotifier) {
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
    (ServerStore::new(Arc::new(client)), notifier)
}

fn mock_list(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/servers");
        then.status(200).json_body(json!({
            "servers": [
                {
                    "id": "s1",
                    "name": "Billing",
                    "instructions": "charge carefully",
                    "providers": [{"id": "p1", "tools": [{"id": "t1"}, {"id": "t2"}]}],
                    "requestHeadersProxyEnabled": true
                },
                {"id": "s2", "name": "Support"}
            ]
        }));
    });
}

/// 測試 provider 的 tools 轉為 enabled_tools，缺少的欄位補預設值
#[tokio::test]
async fn test_fetch_transforms_servers() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let (mut store, _notifier) = store_for(&server).await;

    store.fetch().await?;

    let billing = store.get_by_id("s1").unwrap();
    assert_eq!(billing.providers[0].enabled_tools.len(), 2);
    assert!(billing.request_headers_proxy_enabled);

    let support = store.get_by_id("s2").unwrap();
    assert!(support.providers.is_empty());
    assert_eq!(support.instructions, "");
    assert!(!support.request_headers_proxy_enabled);

    Ok(())
}

#[tokio::test]
async fn test_has_name_ignores_case_and_self() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await?;

    assert!(store.has_name("billing", None));
    assert!(!store.has_name("BILLING", Some("s1")));
    assert!(store.has_name("support", Some("s1")));
    assert!(!store.has_name("marketing", None));

    Ok(())
}

/// 新增時沒有啟用工具的 provider 不會送出，新 server 放在最前面
#[tokio::test]
async fn test_save_creates_server() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/servers").json_body(json!({
            "server": {
                "name": "Ops",
                "instructions": "",
                "providers": [{"id": "p1", "tools": [{"id": "t1"}]}],
                "requestHeadersProxyEnabled": false
            }
        }));
        then.status(200).json_body(json!({
            "server": {"id": "s3", "name": "Ops", "providers": [{"id": "p1", "tools": [{"id": "t1"}]}]}
        }));
    });
    let (mut store, notifier) = store_for(&server).await;
    store.fetch().await?;

    let draft = Server {
        name: "Ops".to_string(),
        providers: vec![
            ServerProvider {
                id: "p1".to_string(),
                name: None,
                enabled_tools: vec![ToolRef { id: "t1".to_string() }],
            },
            ServerProvider {
                id: "p2".to_string(),
                name: None,
                enabled_tools: vec![],
            },
        ],
        ..Default::default()
    };
    let id = store.save(&draft).await?;

    create_mock.assert();
    assert_eq!(id, "s3");
    assert_eq!(store.servers()[0].id.as_deref(), Some("s3"));
    assert_eq!(store.servers().len(), 3);
    assert_eq!(notifier.last().unwrap().message, "MCP Server \"Ops\" created.");

    Ok(())
}

#[tokio::test]
async fn test_save_updates_existing_server() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH").path("/api/v1/servers/s2");
        then.status(200)
            .json_body(json!({"server": {"id": "s2", "name": "Customer Support", "version": 2}}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await?;

    let mut support = store.get_by_id("s2").unwrap();
    support.name = "Customer Support".to_string();
    let id = store.save(&support).await?;

    patch_mock.assert();
    assert_eq!(id, "s2");
    let stored = store.get_by_id("s2").unwrap();
    assert_eq!(stored.name, "Customer Support");
    assert_eq!(stored.version, Some(2));

    Ok(())
}

/// 已快取的 server 不會再次請求；未快取的會 upsert
#[tokio::test]
async fn test_load_by_id_uses_cache() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let cached_mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/servers/s1");
        then.status(200).json_body(json!({"server": {"id": "s1", "name": "Billing"}}));
    });
    let fresh_mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/servers/s9");
        then.status(200).json_body(json!({"server": {"id": "s9", "name": "Fresh"}}));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await?;

    assert_eq!(store.load_by_id("s1").await?.name, "Billing");
    assert_eq!(cached_mock.hits(), 0);

    assert_eq!(store.load_by_id("s9").await?.name, "Fresh");
    fresh_mock.assert();
    assert_eq!(store.servers().len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_delete_and_list_tokens() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    server.mock(|when, then| {
        when.method(DELETE).path("/api/v1/servers/s2");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/servers/s1/tokens");
        then.status(200).json_body(json!({
            "tokens": [{"id": "tok-1", "name": "ci", "expiresAt": "2027-01-01T00:00:00Z"}]
        }));
    });
    let (mut store, _notifier) = store_for(&server).await;
    store.fetch().await?;

    assert!(store.delete("s2").await);
    assert!(store.get_by_id("s2").is_none());

    let tokens = store.list_tokens("s1").await?;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].expires_at.as_deref(), Some("2027-01-01T00:00:00Z"));

    Ok(())
}


/// 更新時後端回 204 仍視為成功，新增時沒有內容則無法取得 id
#[tokio::test]
async fn test_save_handles_no_content() -> Result<()> {
    let server = MockServer::start();
    mock_list(&server);
    let patch_mock = server.mock(|when, then| {
        when.method("PATCH").path("/api/v1/servers/s1");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/v1/servers");
        then.status(204);
    });
    let (mut store, notifier) = store_for(&server).await;
    store.fetch().await?;

    let mut billing = store.get_by_id("s1").unwrap();
    billing.instructions = "refunds need approval".to_string();
    let id = store.save(&billing).await?;

    patch_mock.assert();
    assert_eq!(id, "s1");
    assert_eq!(store.get_by_id("s1").unwrap().instructions, "refunds need approval");

    let draft = Server {
        name: "Ops".to_string(),
        ..Default::default()
    };
    let result = store.save(&draft).await;
    assert!(matches!(result, Err(McpError::EmptyResponseError { .. })));
    assert_eq!(store.servers().len(), 2);
    assert_eq!(
        notifier.last().unwrap().message,
        "Backend returned no content for /servers"
    );

    Ok(())
}
