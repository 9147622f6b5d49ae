use crate::adapters::http::ApiClient;
use crate::core::schema::{generate_path_args_schema, infer_schema_or_return_original};
use crate::domain::model::{ApiType, Provider, ProviderUpdate, Toast, Tool, ToolHeader, VisibilityType};
use crate::utils::error::{McpError, Result};
use crate::utils::validation::validate_required;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];
pub const METHODS_WITH_BODY: [&str; 3] = ["POST", "PUT", "PATCH"];
pub const PROVIDER_TYPES: [ApiType; 1] = [ApiType::Rest];
pub const PROVIDER_VISIBILITY: [VisibilityType; 2] = [VisibilityType::Internal, VisibilityType::Public];

/// 由網址主機名稱產生 secret prefix
///
/// `https://api.stripe.com/v1` → `API_STRIPE_COM`，`www.example.com` → `EXAMPLE_COM`。
/// 無法解析的網址回傳空字串。
pub fn generate_secret_prefix(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let full_url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    let Ok(parsed) = Url::parse(&full_url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    host.replace('.', "_").to_uppercase()
}

#[derive(Debug, Deserialize)]
struct ProviderList {
    #[serde(default)]
    providers: Option<Vec<Provider>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProviderEnvelope<T> {
    provider: T,
}

#[derive(Debug, Deserialize)]
struct ToolList {
    #[serde(default)]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct ToolEnvelope<'a> {
    tool: &'a Tool,
}

/// 後端有時回傳 `{tool: {...}}`，有時直接回傳工具本身
fn unwrap_tool(value: Option<Value>) -> Result<Tool> {
    let value = value.unwrap_or(Value::Null);
    let inner = match value {
        Value::Object(mut obj) if obj.contains_key("tool") => {
            obj.remove("tool").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(inner)?)
}

/// 使用者輸入的工具草稿；request body 可以是範例資料或 schema
#[derive(Debug, Clone, Default)]
pub struct ToolDraft {
    pub id: Option<String>,
    pub method: String,
    pub path: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub headers: Vec<ToolHeader>,
    pub raw_body: Option<String>,
}

impl ToolDraft {
    /// 推斷 request body schema 並由 path 產生參數 schema
    pub fn into_tool(self) -> Result<Tool> {
        let method = self.method.to_uppercase();
        if !HTTP_METHODS.contains(&method.as_str()) {
            return Err(McpError::ValidationError {
                field: "method".to_string(),
                message: format!("Unsupported HTTP method: {}", self.method),
            });
        }

        let request_body_schema = if METHODS_WITH_BODY.contains(&method.as_str()) {
            match infer_schema_or_return_original(
                self.raw_body.as_deref(),
                Some(&method),
                Some(&self.path),
            ) {
                Some(schema) => Some(serde_json::from_str::<Value>(&schema).map_err(|e| {
                    McpError::ValidationError {
                        field: "requestBodySchema".to_string(),
                        message: format!("Request body must be valid JSON: {}", e),
                    }
                })?),
                None => None,
            }
        } else {
            None
        };

        Ok(Tool {
            id: self.id,
            path_args_schema: generate_path_args_schema(&self.path),
            method: Some(method),
            path: Some(self.path),
            name: self.name,
            description: self.description,
            headers: self.headers,
            request_body_schema,
            ..Default::default()
        })
    }
}

/// Provider store
pub struct ProviderStore {
    client: Arc<ApiClient>,
    providers: Vec<Provider>,
}

impl ProviderStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            providers: Vec::new(),
        }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn cached(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id.as_deref() == Some(id))
    }

    fn cached_mut(&mut self, id: &str) -> Result<&mut Provider> {
        self.providers
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| McpError::NotFoundError {
                entity: "Provider".to_string(),
                id: id.to_string(),
            })
    }

    pub async fn fetch(&mut self) -> Result<()> {
        let data: ProviderList = self.client.get("/providers").await?;
        self.providers = data.providers.unwrap_or_default();
        tracing::info!("📥 Loaded {} providers", self.providers.len());
        Ok(())
    }

    /// 一律向後端取得完整資料（包含工具與 header）
    pub async fn get_by_id(&self, id: &str) -> Result<Provider> {
        let data: ProviderEnvelope<Provider> =
            self.client.get(&format!("/providers/{}", id)).await?;
        Ok(data.provider)
    }

    pub async fn add(&mut self, provider: Provider) -> Result<String> {
        validate_required(
            "apiType",
            &provider.api_type,
            "Provider type is required and immutable.",
        )?;
        validate_required(
            "visibilityType",
            &provider.visibility_type,
            "Visibility type is required and immutable.",
        )?;

        let payload = ProviderEnvelope { provider };
        let created: ProviderEnvelope<Provider> = self.client.post("/providers", &payload).await?;
        let created = created.provider;

        self.client.notifier().notify(Toast::info(format!(
            "Provider \"{}\" created.",
            created.name.as_deref().unwrap_or_default()
        )));

        let id = created.id.clone().unwrap_or_default();
        self.providers.push(created);
        Ok(id)
    }

    /// 不可變欄位（apiType、visibilityType、baseURL、secretPrefix）與 tools 不會送出
    pub async fn update(&mut self, provider: &Provider) -> Result<()> {
        let id = provider.id.as_deref().ok_or_else(|| McpError::ValidationError {
            field: "id".to_string(),
            message: "Provider id is required for updates.".to_string(),
        })?;

        let payload = ProviderEnvelope {
            provider: ProviderUpdate::from(provider),
        };
        let updated: Option<ProviderEnvelope<Provider>> = self
            .client
            .patch(&format!("/providers/{}", id), &payload)
            .await?;
        let updated = match updated {
            Some(envelope) => envelope.provider,
            None => provider.clone(),
        };

        self.client.notifier().notify(Toast::info(format!(
            "Provider \"{}\" updated.",
            updated.name.as_deref().unwrap_or_default()
        )));

        if let Some(existing) = self
            .providers
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
        {
            *existing = updated;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.client.delete(&format!("/providers/{}", id)).await?;
        self.providers.retain(|p| p.id.as_deref() != Some(id));
        self.client.notifier().notify(Toast::info("Provider deleted."));
        Ok(())
    }

    pub async fn list_tools(&self, provider_id: &str) -> Result<Vec<Tool>> {
        let data: ToolList = self
            .client
            .get(&format!("/providers/{}/tools", provider_id))
            .await?;
        Ok(data.tools.unwrap_or_default())
    }

    /// 新工具放在最前面，並採用回應中的 provider 版本
    pub async fn create_tool(&mut self, provider_id: &str, tool: Tool) -> Result<Tool> {
        self.cached_mut(provider_id)?;

        let body = serde_json::to_value(ToolEnvelope { tool: &tool })?;
        let response = self
            .client
            .request(
                reqwest::Method::POST,
                &format!("/providers/{}/tools", provider_id),
                Some(body),
            )
            .await?;
        let created = unwrap_tool(response)?;

        let provider = self.cached_mut(provider_id)?;
        provider.tools.insert(0, created.clone());
        if created.provider_version.is_some() {
            provider.version = created.provider_version;
        }
        let message = format!(
            "Tool saved for {}.",
            provider.name.as_deref().unwrap_or(provider_id)
        );
        self.client.notifier().notify(Toast::info(message));
        Ok(created)
    }

    /// id 放在路徑中，不放在 body
    pub async fn update_tool(&mut self, provider_id: &str, mut tool: Tool) -> Result<Tool> {
        self.cached_mut(provider_id)?;
        let tool_id = tool.id.take().ok_or_else(|| McpError::ValidationError {
            field: "id".to_string(),
            message: "Tool id is required for updates.".to_string(),
        })?;

        let body = serde_json::to_value(ToolEnvelope { tool: &tool })?;
        let response = self
            .client
            .request(
                reqwest::Method::PATCH,
                &format!("/providers/{}/tools/{}", provider_id, tool_id),
                Some(body),
            )
            .await?;
        let mut updated = unwrap_tool(response)?;
        if updated.id.is_none() {
            updated.id = Some(tool_id.clone());
        }

        let provider = self.cached_mut(provider_id)?;
        if let Some(existing) = provider
            .tools
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(tool_id.as_str()))
        {
            *existing = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_tool(&mut self, provider_id: &str, tool_id: &str) -> Result<()> {
        self.cached_mut(provider_id)?;
        self.client
            .delete(&format!("/providers/{}/tools/{}", provider_id, tool_id))
            .await?;

        let provider = self.cached_mut(provider_id)?;
        provider.tools.retain(|t| t.id.as_deref() != Some(tool_id));
        let message = format!(
            "Tool deleted from {}.",
            provider.name.as_deref().unwrap_or(provider_id)
        );
        self.client.notifier().notify(Toast::info(message));
        Ok(())
    }
}
