pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::http::ApiClient;
pub use adapters::notify::{LogNotifier, MemoryNotifier};
pub use adapters::storage::{FileTokenStorage, MemoryTokenStorage};
pub use app::stores::{EnvVarStore, ProviderStore, ServerStore, ToolDraft};
pub use config::toml_config::ClientConfig;
pub use domain::model::TokenCreation;
pub use utils::error::{McpError, Result};
