//! JSON Schema 推斷
//!
//! 使用者貼上的 request body 可能是現成的 JSON Schema，也可能只是範例 payload。
//! 前者原樣（美化後）回傳，後者推斷出 draft-07 schema，並依 HTTP method 與 path 產生標題。

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const JSON_SCHEMA_DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
pub const DEFAULT_SCHEMA_TITLE: &str = "Generated Request Body Schema";

static COLON_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[A-Za-z0-9_]+").expect("colon param pattern"));
static BRACE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("brace param pattern"));

const PRIMITIVE_TYPES: [&str; 5] = ["string", "number", "integer", "boolean", "null"];

/// 依常見的頂層關鍵字判斷是否已經是 JSON Schema
pub fn is_json_schema(value: &Value) -> bool {
    let Value::Object(obj) = value else {
        return false;
    };

    if obj.contains_key("$schema") || obj.contains_key("$ref") {
        return true;
    }

    match obj.get("type").and_then(Value::as_str) {
        Some("object") => obj.contains_key("properties"),
        Some("array") => obj.contains_key("items"),
        Some(t) => PRIMITIVE_TYPES.contains(&t),
        None => false,
    }
}

/// 從範例資料遞迴推斷 schema，每個 property 都會帶一個空的 `description`
pub fn infer_basic_schema(sample: &Value) -> Map<String, Value> {
    let mut result = Map::new();
    match sample {
        Value::Array(items) => {
            result.insert("type".into(), Value::from("array"));
            // 只看第一個元素
            let item_schema = items.first().map(infer_basic_schema).unwrap_or_default();
            result.insert("items".into(), Value::Object(item_schema));
        }
        Value::Object(obj) => {
            result.insert("type".into(), Value::from("object"));

            let mut properties = Map::new();
            for (key, value) in obj {
                let mut property_schema = infer_basic_schema(value);
                property_schema.insert("description".into(), Value::from(""));
                properties.insert(key.clone(), Value::Object(property_schema));
            }
            result.insert("properties".into(), Value::Object(properties));

            let required = obj.keys().cloned().map(Value::String).collect();
            result.insert("required".into(), Value::Array(required));
        }
        Value::String(_) => {
            result.insert("type".into(), Value::from("string"));
        }
        Value::Number(n) => {
            let kind = if is_integral(n) { "integer" } else { "number" };
            result.insert("type".into(), Value::from(kind));
        }
        Value::Bool(_) => {
            result.insert("type".into(), Value::from("boolean"));
        }
        Value::Null => {
            result.insert("type".into(), Value::from("null"));
        }
    }
    result
}

fn is_integral(n: &serde_json::Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn strip_path_params(path: &str) -> String {
    let without_colon = COLON_PARAM.replace_all(path, "");
    BRACE_PARAM.replace_all(&without_colon, "").into_owned()
}

fn path_segments(path: &str) -> Vec<String> {
    strip_path_params(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_path_param(path: &str) -> bool {
    path.contains(':') || path.contains('{')
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn singularize(s: &str) -> &str {
    s.strip_suffix('s').unwrap_or(s)
}

/// 去掉路徑參數後把每段轉成 PascalCase；路徑含參數時第一段視為單數
pub fn to_pascal_case_resource_name(path: &str) -> String {
    let mut segments = path_segments(path);
    if segments.is_empty() {
        return String::new();
    }

    if has_path_param(path) {
        let singular = singularize(&segments[0]).to_string();
        segments[0] = singular;
    }

    segments.iter().map(|s| capitalize(s)).collect()
}

fn action_prefix(method: &str) -> &'static str {
    match method {
        "post" => "create",
        "put" => "update",
        "patch" => "patch",
        "delete" => "delete",
        // GET, HEAD, OPTIONS
        _ => "get",
    }
}

/// 例：`POST /posts` → `createPost`，`GET /posts` → `getPosts`，`GET /posts/:id` → `getPost`
pub fn generate_schema_title(method: Option<&str>, path: Option<&str>) -> String {
    let (method, path) = match (method, path) {
        (Some(m), Some(p)) if !m.is_empty() && !p.is_empty() => (m.to_lowercase(), p),
        _ => return DEFAULT_SCHEMA_TITLE.to_string(),
    };

    let pascal_name = to_pascal_case_resource_name(path);
    let segments = path_segments(path);

    if segments.len() == 1 && segments[0].ends_with('s') && !has_path_param(path) {
        match method.as_str() {
            "get" => return format!("get{}", pascal_name),
            "post" => return format!("create{}", capitalize(singularize(&segments[0]))),
            _ => {}
        }
    }

    format!("{}{}", action_prefix(&method), pascal_name)
}

/// 判斷輸入是 schema 還是範例資料，範例資料會轉成 schema。
///
/// 空字串回傳 `None`；JSON 解析失敗時原樣回傳輸入，不會報錯。
pub fn infer_schema_or_return_original(
    input: Option<&str>,
    method: Option<&str>,
    path: Option<&str>,
) -> Option<String> {
    let raw = input?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Input is not valid JSON, returning it unchanged: {}", e);
            return Some(raw.to_string());
        }
    };

    if is_json_schema(&parsed) {
        return Some(pretty(&parsed, raw));
    }

    let mut root = Map::new();
    root.insert("$schema".into(), Value::from(JSON_SCHEMA_DRAFT_07));
    root.insert("title".into(), Value::from(generate_schema_title(method, path)));
    root.insert("description".into(), Value::from(""));
    root.extend(infer_basic_schema(&parsed));

    Some(pretty(&Value::Object(root), raw))
}

fn pretty(value: &Value, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

/// `organizationId` → `organization id`，`domain_id` → `domain id`
pub fn description_from_name(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match c {
            '_' => spaced.push(' '),
            c if c.is_ascii_uppercase() => {
                spaced.push(' ');
                spaced.push(c);
            }
            c => spaced.push(c),
        }
    }
    spaced.to_lowercase().trim().to_string()
}

/// 從 `{name}` 佔位符產生 path 參數 schema；沒有參數時回傳 `None`
pub fn generate_path_args_schema(path: &str) -> Option<Value> {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for caps in BRACE_PARAM.captures_iter(path) {
        let name = &caps[1];
        if properties.contains_key(name) {
            continue;
        }
        let mut property = Map::new();
        property.insert("type".into(), Value::from("string"));
        property.insert("description".into(), Value::from(description_from_name(name)));
        properties.insert(name.to_string(), Value::Object(property));
        required.push(Value::from(name));
    }

    if required.is_empty() {
        return None;
    }

    let mut schema = Map::new();
    schema.insert("$schema".into(), Value::from(JSON_SCHEMA_DRAFT_07));
    schema.insert("type".into(), Value::from("object"));
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("required".into(), Value::Array(required));
    Some(Value::Object(schema))
}
