use crate::config::toml_config::ClientConfig;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mcp-admin")]
#[command(about = "Manage MCP servers, API providers and environment variables")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "mcp-admin.toml")]
    pub config: String,

    /// Override api.base_url from config
    #[arg(long)]
    pub api_url: Option<String>,

    /// Use this API token instead of the stored one
    #[arg(long)]
    pub token: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print raw JSON instead of tables
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
            tracing::info!("🔧 API URL overridden to: {}", url);
        }
        if let Some(token) = &self.token {
            config.auth.token = Some(token.clone());
        }
        if self.verbose {
            config.logging.verbose = Some(true);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the stored API token
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Infer JSON Schemas locally
    #[command(subcommand)]
    Schema(SchemaCommand),
    /// Manage environment variables
    #[command(subcommand)]
    Vars(VarsCommand),
    /// Manage API providers and their tools
    #[command(subcommand)]
    Providers(ProvidersCommand),
    /// Manage MCP servers and tokens
    #[command(subcommand)]
    Servers(ServersCommand),
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    SetToken { token: String },
    Clear,
    Status,
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// Turn a sample payload into a JSON Schema (schemas pass through)
    Infer {
        /// Read input from this file instead of stdin
        #[arg(short, long)]
        file: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Build a schema for `{param}` placeholders in a path
    PathArgs { path: String },
}

#[derive(Debug, Subcommand)]
pub enum VarsCommand {
    List,
    Add {
        name: String,
        value: String,
        #[arg(long)]
        secret: bool,
    },
    Set { id: String, value: String },
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct NewProviderArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "REST")]
    pub api_type: String,
    #[arg(long)]
    pub visibility: String,
    #[arg(long)]
    pub base_url: String,
    /// Defaults to a prefix derived from the base URL host
    #[arg(long)]
    pub secret_prefix: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct NewToolArgs {
    pub provider_id: String,
    #[arg(long)]
    pub method: String,
    #[arg(long)]
    pub path: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Header in NAME=VALUE form, repeatable
    #[arg(long = "header")]
    pub headers: Vec<String>,
    /// File containing a sample body or a JSON Schema
    #[arg(long)]
    pub body_file: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ProvidersCommand {
    List,
    Show { id: String },
    Add(NewProviderArgs),
    Delete { id: String },
    Tools { id: String },
    AddTool(NewToolArgs),
    DeleteTool { provider_id: String, tool_id: String },
    /// Print the secret prefix derived from a URL
    SecretPrefix { url: String },
}

#[derive(Debug, Subcommand)]
pub enum ServersCommand {
    List,
    Show { id: String },
    Delete { id: String },
    /// List environment variables the server needs but are not defined
    CheckDeps { id: String },
    CreateToken {
        id: String,
        #[arg(long)]
        name: Option<String>,
    },
    Tokens { id: String },
}
