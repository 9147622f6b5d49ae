//! 環境變數依賴解析
//!
//! Server 只記錄啟用工具的 id；發 token 前要先用完整的 provider 資料把工具補齊（hydrate），
//! 再掃描 header 值裡的 `${NAME}` 佔位符，確認每個變數都已定義。

use crate::domain::model::{Provider, Server, Tool};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ENV_VAR_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z0-9_]+)\}").expect("env var placeholder pattern"));

/// 補齊後的 provider：只保留啟用且能在完整 provider 中找到的工具
#[derive(Debug, Clone, Default)]
pub struct HydratedProvider {
    pub id: String,
    pub enabled_tools: Vec<Tool>,
}

/// `full_providers` 與 `server.providers` 依索引對應；`None` 表示該 provider 沒有資料
pub fn hydrate_enabled_tools(
    server: &Server,
    full_providers: &[Option<Provider>],
) -> Vec<HydratedProvider> {
    server
        .providers
        .iter()
        .enumerate()
        .map(|(index, min_provider)| {
            let Some(full) = full_providers.get(index).and_then(Option::as_ref) else {
                return HydratedProvider {
                    id: min_provider.id.clone(),
                    enabled_tools: Vec::new(),
                };
            };

            let enabled_tools = min_provider
                .enabled_tools
                .iter()
                .filter_map(|tool_ref| {
                    full.tools
                        .iter()
                        .find(|t| t.id.as_deref() == Some(tool_ref.id.as_str()))
                        .cloned()
                })
                .collect();

            HydratedProvider {
                id: min_provider.id.clone(),
                enabled_tools,
            }
        })
        .collect()
}

/// 單一字串中引用的變數名稱
pub fn placeholders_in(value: &str) -> impl Iterator<Item = &str> {
    ENV_VAR_PLACEHOLDER
        .captures_iter(value)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// 所有啟用工具 header 中引用的變數名稱，依第一次出現的順序、不重複
pub fn extract_required_env_vars(providers: &[HydratedProvider]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut required = Vec::new();

    let header_values = providers
        .iter()
        .flat_map(|p| p.enabled_tools.iter())
        .flat_map(|t| t.headers.iter())
        .map(|h| h.value.as_str())
        .filter(|v| !v.is_empty());

    for value in header_values {
        for name in placeholders_in(value) {
            if seen.insert(name.to_string()) {
                required.push(name.to_string());
            }
        }
    }

    required
}

/// 回傳 `required` 中未定義的變數，保留輸入順序
pub fn find_missing_env_vars<'a, I>(required: &[String], defined: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let defined: HashSet<&str> = defined.into_iter().collect();
    required
        .iter()
        .filter(|name| !defined.contains(name.as_str()))
        .cloned()
        .collect()
}
