pub mod env_deps;
pub mod schema;

pub use crate::domain::model::{Provider, Server, Tool};
pub use crate::domain::ports::{ConfigProvider, Notifier, TokenStorage};
pub use crate::utils::error::Result;
