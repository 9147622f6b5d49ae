use crate::adapters::http::ApiClient;
use crate::app::stores::providers::ProviderStore;
use crate::app::stores::variables::EnvVarStore;
use crate::core::env_deps::{extract_required_env_vars, hydrate_enabled_tools};
use crate::domain::model::{ApiServer, Server, ServerPayload, Toast, Token, TokenCreation};
use crate::utils::error::{McpError, Result};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ServerList {
    #[serde(default)]
    servers: Option<Vec<ApiServer>>,
}

#[derive(Debug, Deserialize)]
struct ServerResponse {
    server: ApiServer,
}

#[derive(Debug, Serialize)]
struct ServerRequest {
    server: ServerPayload,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenEnvelope {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct TokenList {
    #[serde(default)]
    tokens: Option<Vec<Token>>,
}

/// MCP server store
pub struct ServerStore {
    client: Arc<ApiClient>,
    servers: Vec<Server>,
}

impl ServerStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            servers: Vec::new(),
        }
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.servers.iter().position(|s| s.id.as_deref() == Some(id))
    }

    pub async fn fetch(&mut self) -> Result<()> {
        let data: ServerList = self.client.get("/servers").await?;
        self.servers = data
            .servers
            .unwrap_or_default()
            .into_iter()
            .map(Server::from)
            .collect();
        tracing::info!("📥 Loaded {} servers", self.servers.len());
        Ok(())
    }

    /// 已在 store 中就直接回傳，否則向後端取得並 upsert
    pub async fn load_by_id(&mut self, id: &str) -> Result<&Server> {
        if let Some(index) = self.position(id) {
            return Ok(&self.servers[index]);
        }

        let data: ServerResponse = self.client.get(&format!("/servers/{}", id)).await?;
        let server = Server::from(data.server);

        // 用回應中的 id 再找一次
        let server_id = server.id.clone().unwrap_or_else(|| id.to_string());
        let index = match self.position(&server_id) {
            Some(index) => {
                self.servers[index] = server;
                index
            }
            None => {
                self.servers.push(server);
                self.servers.len() - 1
            }
        };
        Ok(&self.servers[index])
    }

    /// 回傳複本，呼叫端可任意修改
    pub fn get_by_id(&self, id: &str) -> Option<Server> {
        self.position(id).map(|index| self.servers[index].clone())
    }

    /// 名稱比對不分大小寫，`exclude_id` 用於編輯時排除自己
    pub fn has_name(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let name = name.to_lowercase();
        self.servers.iter().any(|s| {
            s.name.to_lowercase() == name && (exclude_id.is_none() || s.id.as_deref() != exclude_id)
        })
    }

    /// 有 id 時更新，否則新增；回傳 server id
    pub async fn save(&mut self, server: &Server) -> Result<String> {
        let request = ServerRequest {
            server: ServerPayload::from(server),
        };

        if let Some(id) = server.id.as_deref() {
            // 後端沒有回傳內容時沿用送出的資料
            let response: Option<ServerResponse> = self
                .client
                .patch(&format!("/servers/{}", id), &request)
                .await?;
            let updated = match response {
                Some(response) => Server::from(response.server),
                None => server.clone(),
            };
            let updated_id = updated.id.clone().unwrap_or_else(|| id.to_string());
            self.client.notifier().notify(Toast::info(format!(
                "MCP Server \"{}\" updated.",
                updated.name
            )));
            if let Some(index) = self.position(&updated_id) {
                self.servers[index] = updated;
            }
            return Ok(updated_id);
        }

        let response: ServerResponse = self.client.post("/servers", &request).await?;
        let created = Server::from(response.server);
        let created_id = created.id.clone().unwrap_or_default();
        self.client.notifier().notify(Toast::info(format!(
            "MCP Server \"{}\" created.",
            created.name
        )));
        self.servers.insert(0, created);
        Ok(created_id)
    }

    /// API 失敗時回傳 false
    pub async fn delete(&mut self, id: &str) -> bool {
        if self.client.delete(&format!("/servers/{}", id)).await.is_err() {
            return false;
        }
        let initial_len = self.servers.len();
        self.servers.retain(|s| s.id.as_deref() != Some(id));
        self.client.notifier().notify(Toast::info("MCP Server deleted."));
        initial_len != self.servers.len()
    }

    /// 檢查 server 啟用工具所需的環境變數，回傳尚未定義的名稱
    ///
    /// 所有 provider 並行取得，任何一個失敗整個操作就失敗。
    pub async fn missing_env_vars(
        &self,
        server_id: &str,
        providers: &ProviderStore,
        variables: &EnvVarStore,
    ) -> Result<Vec<String>> {
        let server = self
            .position(server_id)
            .map(|index| &self.servers[index])
            .ok_or_else(|| McpError::NotFoundError {
                entity: "Mcpserver".to_string(),
                id: server_id.to_string(),
            })?;

        let fetches = server
            .providers
            .iter()
            .map(|p| providers.get_by_id(&p.id));
        let full_providers: Vec<_> = try_join_all(fetches).await?.into_iter().map(Some).collect();

        let hydrated = hydrate_enabled_tools(server, &full_providers);
        let required = extract_required_env_vars(&hydrated);
        tracing::debug!(
            "Server {} requires variables: {:?}",
            server_id,
            required
        );
        Ok(variables.missing(&required))
    }

    /// 所有引用的環境變數都存在時才會建立 token
    pub async fn create_token(
        &mut self,
        server_id: &str,
        token: Token,
        providers: &ProviderStore,
        variables: &EnvVarStore,
    ) -> Result<TokenCreation> {
        let missing = self.missing_env_vars(server_id, providers, variables).await?;
        if !missing.is_empty() {
            tracing::warn!(
                "⚠️ Token creation blocked, missing variables: {}",
                missing.join(", ")
            );
            return Ok(TokenCreation::MissingVariables(missing));
        }

        let payload = TokenEnvelope { token };
        let response: TokenEnvelope = self
            .client
            .post(&format!("/servers/{}/tokens", server_id), &payload)
            .await?;
        let new_token = response.token;

        if let Some(index) = self.position(server_id) {
            self.servers[index].tokens.insert(0, new_token.clone());
        }
        self.client.notifier().notify(Toast::info("Token created."));
        Ok(TokenCreation::Created(new_token))
    }

    pub async fn list_tokens(&self, server_id: &str) -> Result<Vec<Token>> {
        let data: TokenList = self
            .client
            .get(&format!("/servers/{}/tokens", server_id))
            .await?;
        Ok(data.tokens.unwrap_or_default())
    }
}
