use crate::adapters::http::ApiClient;
use crate::core::env_deps::find_missing_env_vars;
use crate::domain::model::{ApiVariable, EnvVariable, Toast, VariableType};
use crate::utils::error::{McpError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct VariableList {
    #[serde(default)]
    variables: Option<Vec<ApiVariable>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VariableEnvelope {
    variable: ApiVariable,
}

/// 環境變數 store
pub struct EnvVarStore {
    client: Arc<ApiClient>,
    variables: Vec<EnvVariable>,
}

impl EnvVarStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            variables: Vec::new(),
        }
    }

    pub fn variables(&self) -> &[EnvVariable] {
        &self.variables
    }

    pub fn name_set(&self) -> HashSet<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&EnvVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// 回傳尚未定義的變數名稱
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        find_missing_env_vars(required, self.variables.iter().map(|v| v.name.as_str()))
    }

    pub async fn fetch(&mut self) -> Result<()> {
        let data: VariableList = self.client.get("/variables").await?;
        self.variables = data
            .variables
            .unwrap_or_default()
            .into_iter()
            .map(EnvVariable::from)
            .collect();
        tracing::info!("📥 Loaded {} variables", self.variables.len());
        Ok(())
    }

    /// 名稱重複時不送出請求，直接回傳驗證錯誤；名稱會先 trim 再比對
    pub async fn add(&mut self, name: &str, value: &str, is_secret: bool) -> Result<&EnvVariable> {
        let name = name.trim();
        validate_non_empty_string("name", name)?;
        if self.get_by_name(name).is_some() {
            let err = McpError::DuplicateNameError {
                name: name.to_string(),
            };
            self.client.notifier().notify(Toast::alert(err.to_string(), 3000));
            return Err(err);
        }

        let payload = VariableEnvelope {
            variable: ApiVariable {
                name: Some(name.to_string()),
                value: Some(value.trim().to_string()),
                kind: Some(if is_secret {
                    VariableType::Secret
                } else {
                    VariableType::Env
                }),
                ..Default::default()
            },
        };

        let created: VariableEnvelope = self.client.post("/variables", &payload).await?;
        let variable = EnvVariable::from(created.variable);
        self.client.notifier().notify(Toast::info(format!(
            "Environment Variable \"{}\" created successfully!",
            variable.name
        )));

        self.variables.push(variable);
        Ok(&self.variables[self.variables.len() - 1])
    }

    pub async fn update_value(&mut self, id: &str, new_value: &str) -> Result<&EnvVariable> {
        let value = new_value.trim().to_string();
        let payload = VariableEnvelope {
            variable: ApiVariable {
                value: Some(value.clone()),
                ..Default::default()
            },
        };

        self.client
            .request(
                reqwest::Method::PATCH,
                &format!("/variables/{}", id),
                Some(serde_json::to_value(&payload)?),
            )
            .await?;

        let variable = self
            .variables
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| McpError::NotFoundError {
                entity: "Variable".to_string(),
                id: id.to_string(),
            })?;
        variable.value = value;

        self.client.notifier().notify(Toast::info(format!(
            "Environment Variable \"{}\" updated successfully!",
            variable.name
        )));
        Ok(&*variable)
    }

    /// API 失敗時回傳 false
    pub async fn delete(&mut self, id: &str) -> bool {
        if self
            .client
            .delete(&format!("/variables/{}", id))
            .await
            .is_err()
        {
            return false;
        }

        let initial_len = self.variables.len();
        self.variables.retain(|v| v.id != id);
        self.client
            .notifier()
            .notify(Toast::info("Environment variable deleted."));
        initial_len != self.variables.len()
    }
}
