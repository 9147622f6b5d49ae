use crate::domain::model::Toast;
use crate::domain::ports::{ConfigProvider, Notifier, TokenStorage};
use crate::utils::error::{McpError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const API_PREFIX: &str = "/api/v1";

/// 後端 REST API 的集中式 client：附加 bearer token、移除 null 欄位、處理 401
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    storage: Arc<dyn TokenStorage>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub async fn new<C: ConfigProvider + ?Sized>(
        config: &C,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        // 設定檔中的 token 優先於已儲存的 token
        let token = match config.static_token() {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => storage.load().await?,
        };

        let base_url = format!("{}{}", config.api_root_url().trim_end_matches('/'), API_PREFIX);
        tracing::debug!("API base URL: {}", base_url);

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(token),
            storage,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub async fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        self.storage.save(token).await
    }

    pub async fn clear_token(&self) -> Result<()> {
        *self.token.write().await = None;
        self.storage.clear().await?;
        self.notifier.notify(Toast::info("Authentication token cleared."));
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None).await?;
        self.decode(path, value)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let value = self
            .request(Method::POST, path, Some(serde_json::to_value(body)?))
            .await?;
        self.decode(path, value)
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let value = self
            .request(Method::PATCH, path, Some(serde_json::to_value(body)?))
            .await?;
        self.decode(path, value)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// 發送請求；失敗時發出 alert toast 並把錯誤回傳給呼叫端。204 回傳 `None`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        match self.send(method, path, body).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!("❌ API Client Error: {}", e);
                self.notifier
                    .notify(Toast::alert(e.user_friendly_message(), 4000));
                Err(e)
            }
        }
    }

    /// 沒有內容時只有 `Option<T>` 這類可接受 null 的型別能成功，其餘回傳 `EmptyResponseError`
    fn decode<T: DeserializeOwned>(&self, path: &str, value: Option<Value>) -> Result<T> {
        let decoded = match value {
            Some(value) => serde_json::from_value(value).map_err(McpError::from),
            None => serde_json::from_value(Value::Null).map_err(|_| McpError::EmptyResponseError {
                path: path.to_string(),
            }),
        };
        if let Err(e) = &decoded {
            tracing::error!("❌ API Client Error: {}", e);
            self.notifier
                .notify(Toast::alert(e.user_friendly_message(), 4000));
        }
        decoded
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.token().await.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.body(serde_json::to_vec(&strip_nulls(body))?);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                if let Err(e) = self.clear_token().await {
                    tracing::warn!("Failed to clear stored token: {}", e);
                }
            }
            let text = response.text().await.unwrap_or_default();
            return Err(McpError::ApiError {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}


/// 錯誤訊息優先取 body 的 `message`；body 不是 JSON 時用 HTTP 狀態文字
fn error_message(status: StatusCode, body: &str) -> String {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(v) => v
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        Err(_) => status.canonical_reason().map(str::to_string),
    };
    message.unwrap_or_else(|| format!("API request failed with status {}", status.as_u16()))
}

/// 移除物件中值為 null 的鍵；陣列元素保持不變
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| if v.is_null() { v } else { strip_nulls(v) })
                .collect(),
        ),
        other => other,
    }
}
