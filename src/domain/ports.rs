use crate::domain::model::Toast;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Session token 的持久化位置
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

pub trait ConfigProvider: Send + Sync {
    /// 後端根網址，不含 `/api/v1`
    fn api_root_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn static_token(&self) -> Option<&str>;
}
