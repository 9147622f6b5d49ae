use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 變數在後端的類型 (0: INVALID, 1: ENV, 2: SECRET)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariableType {
    Env,
    Secret,
}

/// 後端回傳的變數格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<VariableType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Store 內使用的環境變數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVariable {
    pub id: String,
    pub name: String,
    pub value: String,
    pub is_secret: bool,
}

impl From<ApiVariable> for EnvVariable {
    fn from(api: ApiVariable) -> Self {
        Self {
            id: api.id.unwrap_or_default(),
            name: api.name.unwrap_or_default(),
            value: api.value.unwrap_or_default(),
            is_secret: api.kind == Some(VariableType::Secret),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiType {
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisibilityType {
    Internal,
    Public,
}

impl std::str::FromStr for ApiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "REST" => Ok(ApiType::Rest),
            other => Err(format!("Unsupported provider type: {}", other)),
        }
    }
}

impl std::str::FromStr for VisibilityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INTERNAL" => Ok(VisibilityType::Internal),
            "PUBLIC" => Ok(VisibilityType::Public),
            other => Err(format!("Unsupported visibility type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHeader {
    #[serde(default, rename = "key", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<ToolHeader>,
    #[serde(
        default,
        rename = "reqBodyJSONSchema",
        alias = "requestBodySchema",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body_schema: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "pathArgsJSONSchema",
        skip_serializing_if = "Option::is_none"
    )]
    pub path_args_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_version: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_type: Option<VisibilityType>,
    #[serde(default, rename = "baseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, rename = "documentURL", skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// PATCH 時只允許送出的欄位；apiType、visibilityType、baseURL、secretPrefix 與 tools 不可變更
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "documentURL", skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

impl From<&Provider> for ProviderUpdate {
    fn from(p: &Provider) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            document_url: p.document_url.clone(),
            icon_url: p.icon_url.clone(),
            version: p.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    pub id: String,
}

/// 後端回傳的 server provider：啟用的工具放在 `tools`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServerProvider {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<ToolRef>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub providers: Option<Vec<ApiServerProvider>>,
    #[serde(default)]
    pub request_headers_proxy_enabled: Option<bool>,
    #[serde(default)]
    pub tokens: Option<Vec<Token>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Store 內的 server provider：`tools` 已改名為 `enabled_tools`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProvider {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled_tools: Vec<ToolRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub providers: Vec<ServerProvider>,
    #[serde(default)]
    pub request_headers_proxy_enabled: bool,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl From<ApiServer> for Server {
    fn from(api: ApiServer) -> Self {
        let providers = api
            .providers
            .unwrap_or_default()
            .into_iter()
            .map(|p| ServerProvider {
                id: p.id,
                name: p.name,
                enabled_tools: p.tools.unwrap_or_default(),
            })
            .collect();

        Self {
            id: api.id,
            name: api.name.unwrap_or_default(),
            version: api.version,
            instructions: api.instructions.unwrap_or_default(),
            providers,
            request_headers_proxy_enabled: api.request_headers_proxy_enabled.unwrap_or(false),
            tokens: api.tokens.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProviderPayload {
    pub id: String,
    pub tools: Vec<ToolRef>,
}

/// 建立或更新 server 時送出的內容
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPayload {
    pub name: String,
    pub version: Option<i32>,
    pub instructions: String,
    pub providers: Vec<ServerProviderPayload>,
    pub request_headers_proxy_enabled: bool,
}

impl From<&Server> for ServerPayload {
    fn from(server: &Server) -> Self {
        let providers = server
            .providers
            .iter()
            .map(|p| ServerProviderPayload {
                id: p.id.clone(),
                tools: p
                    .enabled_tools
                    .iter()
                    .map(|t| ToolRef { id: t.id.clone() })
                    .collect(),
            })
            .filter(|p| !p.tools.is_empty())
            .collect();

        Self {
            name: server.name.clone(),
            version: server.version,
            instructions: server.instructions.clone(),
            providers,
            request_headers_proxy_enabled: server.request_headers_proxy_enabled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "serverID", skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl Token {
    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.created_at
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub duration: Duration,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Info,
            duration: Duration::from_millis(3000),
        }
    }

    pub fn alert(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Alert,
            duration: Duration::from_millis(duration_ms),
        }
    }
}

/// 建立 token 的結果；缺少的環境變數屬於本地驗證失敗，不會送出請求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCreation {
    Created(Token),
    MissingVariables(Vec<String>),
}

impl TokenCreation {
    pub fn is_created(&self) -> bool {
        matches!(self, TokenCreation::Created(_))
    }

    pub fn missing_vars(&self) -> &[String] {
        match self {
            TokenCreation::MissingVariables(vars) => vars,
            TokenCreation::Created(_) => &[],
        }
    }
}
