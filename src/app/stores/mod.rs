pub mod providers;
pub mod servers;
pub mod variables;

pub use providers::{ProviderStore, ToolDraft};
pub use servers::ServerStore;
pub use variables::EnvVarStore;
