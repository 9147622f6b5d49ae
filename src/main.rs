use clap::Parser;
use mcp_admin::app::stores::providers::generate_secret_prefix;
use mcp_admin::config::cli::{
    AuthCommand, Command, NewProviderArgs, NewToolArgs, ProvidersCommand, SchemaCommand,
    ServersCommand, VarsCommand,
};
use mcp_admin::core::schema::{generate_path_args_schema, infer_schema_or_return_original};
use mcp_admin::domain::model::{ApiType, Provider, Token, ToolHeader, VisibilityType};
use mcp_admin::domain::ports::TokenStorage;
use mcp_admin::utils::error::ErrorSeverity;
use mcp_admin::utils::{logger, validation::Validate};
use mcp_admin::{
    ApiClient, CliConfig, ClientConfig, EnvVarStore, FileTokenStorage, LogNotifier, McpError,
    ProviderStore, Result, ServerStore, TokenCreation, ToolDraft,
};
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let mut config = match ClientConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose());
    }
    tracing::debug!("CLI args: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig, config: ClientConfig) -> Result<()> {
    let json = cli.json;

    match cli.command {
        // 純本地的指令不需要 client
        Command::Schema(cmd) => run_schema(&cmd),
        Command::Auth(cmd) => {
            let (client, storage) = connect(&config).await?;
            run_auth(cmd, &client, storage.as_ref()).await
        }
        Command::Vars(cmd) => run_vars(cmd, connect(&config).await?.0, json).await,
        Command::Providers(cmd) => run_providers(cmd, connect(&config).await?.0, json).await,
        Command::Servers(cmd) => run_servers(cmd, connect(&config).await?.0, json).await,
    }
}

async fn connect(config: &ClientConfig) -> Result<(Arc<ApiClient>, Arc<FileTokenStorage>)> {
    let storage = Arc::new(FileTokenStorage::new(config.token_file()));
    let client = ApiClient::new(config, storage.clone(), Arc::new(LogNotifier)).await?;
    Ok((Arc::new(client), storage))
}

fn run_schema(cmd: &SchemaCommand) -> Result<()> {
    match cmd {
        SchemaCommand::Infer { file, method, path } => {
            let input = match file {
                Some(file) => std::fs::read_to_string(file)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            match infer_schema_or_return_original(Some(&input), method.as_deref(), path.as_deref())
            {
                Some(schema) => println!("{}", schema),
                None => tracing::warn!("⚠️ Empty input, nothing to infer"),
            }
        }
        SchemaCommand::PathArgs { path } => match generate_path_args_schema(path) {
            Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
            None => tracing::warn!("⚠️ No {{param}} placeholders in {}", path),
        },
    }
    Ok(())
}

async fn run_auth(cmd: AuthCommand, client: &ApiClient, storage: &FileTokenStorage) -> Result<()> {
    match cmd {
        AuthCommand::SetToken { token } => {
            client.set_token(token.trim()).await?;
            println!("✅ Token saved to {}", storage.path().display());
        }
        AuthCommand::Clear => {
            client.clear_token().await?;
            println!("✅ Token cleared");
        }
        AuthCommand::Status => {
            let stored = storage.load().await?.is_some();
            println!("API: {}", client.base_url());
            println!("Authenticated: {}", client.is_authenticated().await);
            println!("Stored token: {}", if stored { "yes" } else { "no" });
        }
    }
    Ok(())
}

async fn run_vars(cmd: VarsCommand, client: Arc<ApiClient>, json: bool) -> Result<()> {
    let mut store = EnvVarStore::new(client);
    store.fetch().await?;

    match cmd {
        VarsCommand::List => {
            if json {
                return print_json(store.variables());
            }
            for var in store.variables() {
                let value = if var.is_secret { "********" } else { var.value.as_str() };
                let kind = if var.is_secret { "SECRET" } else { "ENV" };
                println!("{:<24} {:<8} {:<40} {}", var.id, kind, var.name, value);
            }
        }
        VarsCommand::Add {
            name,
            value,
            secret,
        } => {
            let created = store.add(&name, &value, secret).await?;
            println!("✅ Created {} ({})", created.name, created.id);
        }
        VarsCommand::Set { id, value } => {
            let updated = store.update_value(&id, &value).await?;
            println!("✅ Updated {}", updated.name);
        }
        VarsCommand::Delete { id } => {
            if !store.delete(&id).await {
                return Err(McpError::NotFoundError {
                    entity: "Variable".to_string(),
                    id,
                });
            }
            println!("✅ Deleted {}", id);
        }
    }
    Ok(())
}

async fn run_providers(cmd: ProvidersCommand, client: Arc<ApiClient>, json: bool) -> Result<()> {
    // 只有需要本地快取的指令才先取得列表
    let mut store = ProviderStore::new(client);

    match cmd {
        ProvidersCommand::List => {
            store.fetch().await?;
            if json {
                return print_json(store.providers());
            }
            for p in store.providers() {
                println!(
                    "{:<24} {:<32} {}",
                    p.id.as_deref().unwrap_or("-"),
                    p.name.as_deref().unwrap_or("-"),
                    p.base_url.as_deref().unwrap_or("-")
                );
            }
        }
        ProvidersCommand::Show { id } => {
            let provider = store.get_by_id(&id).await?;
            print_json(&provider)?;
        }
        ProvidersCommand::Add(args) => {
            let provider = provider_from_args(args)?;
            let id = store.add(provider).await?;
            println!("✅ Created provider {}", id);
        }
        ProvidersCommand::Delete { id } => {
            store.delete(&id).await?;
            println!("✅ Deleted provider {}", id);
        }
        ProvidersCommand::Tools { id } => {
            let tools = store.list_tools(&id).await?;
            if json {
                return print_json(&tools);
            }
            for t in tools {
                println!(
                    "{:<24} {:<8} {}",
                    t.id.as_deref().unwrap_or("-"),
                    t.method.as_deref().unwrap_or("-"),
                    t.path.as_deref().unwrap_or("-")
                );
            }
        }
        ProvidersCommand::AddTool(args) => {
            let provider_id = args.provider_id.clone();
            let tool = tool_draft_from_args(args)?.into_tool()?;
            store.fetch().await?;
            let created = store.create_tool(&provider_id, tool).await?;
            println!(
                "✅ Created tool {}",
                created.id.as_deref().unwrap_or("(no id)")
            );
        }
        ProvidersCommand::DeleteTool {
            provider_id,
            tool_id,
        } => {
            store.fetch().await?;
            store.delete_tool(&provider_id, &tool_id).await?;
            println!("✅ Deleted tool {}", tool_id);
        }
        ProvidersCommand::SecretPrefix { url } => println!("{}", generate_secret_prefix(&url)),
    }
    Ok(())
}

async fn run_servers(cmd: ServersCommand, client: Arc<ApiClient>, json: bool) -> Result<()> {
    let mut servers = ServerStore::new(client.clone());
    servers.fetch().await?;

    match cmd {
        ServersCommand::List => {
            if json {
                return print_json(servers.servers());
            }
            for s in servers.servers() {
                let tools: usize = s.providers.iter().map(|p| p.enabled_tools.len()).sum();
                println!(
                    "{:<24} {:<32} providers={} tools={}",
                    s.id.as_deref().unwrap_or("-"),
                    s.name,
                    s.providers.len(),
                    tools
                );
            }
        }
        ServersCommand::Show { id } => {
            let server = servers.load_by_id(&id).await?;
            print_json(server)?;
        }
        ServersCommand::Delete { id } => {
            if !servers.delete(&id).await {
                return Err(McpError::NotFoundError {
                    entity: "Mcpserver".to_string(),
                    id,
                });
            }
            println!("✅ Deleted server {}", id);
        }
        ServersCommand::CheckDeps { id } => {
            servers.load_by_id(&id).await?;
            let (providers, variables) = load_dependencies(&client).await?;
            let missing = servers.missing_env_vars(&id, &providers, &variables).await?;
            if missing.is_empty() {
                println!("✅ All referenced environment variables are defined");
            } else {
                println!("⚠️ Missing environment variables: {}", missing.join(", "));
            }
        }
        ServersCommand::CreateToken { id, name } => {
            servers.load_by_id(&id).await?;
            let (providers, variables) = load_dependencies(&client).await?;
            let token = Token {
                name,
                ..Default::default()
            };
            match servers.create_token(&id, token, &providers, &variables).await? {
                TokenCreation::Created(token) => {
                    println!("✅ Token created");
                    println!("{}", token.value.as_deref().unwrap_or_default());
                }
                TokenCreation::MissingVariables(missing) => {
                    return Err(McpError::ValidationError {
                        field: "variables".to_string(),
                        message: format!(
                            "Missing environment variables: {}",
                            missing.join(", ")
                        ),
                    });
                }
            }
        }
        ServersCommand::Tokens { id } => {
            let tokens = servers.list_tokens(&id).await?;
            if json {
                return print_json(&tokens);
            }
            for t in tokens {
                let created = t
                    .created_at_utc()
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<24} {:<24} {}",
                    t.id.as_deref().unwrap_or("-"),
                    t.name.as_deref().unwrap_or("-"),
                    created
                );
            }
        }
    }
    Ok(())
}

async fn load_dependencies(client: &Arc<ApiClient>) -> Result<(ProviderStore, EnvVarStore)> {
    let providers = ProviderStore::new(client.clone());
    let mut variables = EnvVarStore::new(client.clone());
    variables.fetch().await?;
    Ok((providers, variables))
}

fn provider_from_args(args: NewProviderArgs) -> Result<Provider> {
    let api_type = args.api_type.parse::<ApiType>().map_err(|message| McpError::ValidationError {
        field: "apiType".to_string(),
        message,
    })?;
    let visibility_type = args
        .visibility
        .parse::<VisibilityType>()
        .map_err(|message| McpError::ValidationError {
            field: "visibilityType".to_string(),
            message,
        })?;
    let secret_prefix = args
        .secret_prefix
        .unwrap_or_else(|| generate_secret_prefix(&args.base_url));

    Ok(Provider {
        name: Some(args.name),
        description: args.description,
        api_type: Some(api_type),
        visibility_type: Some(visibility_type),
        base_url: Some(args.base_url),
        secret_prefix: Some(secret_prefix),
        ..Default::default()
    })
}

fn tool_draft_from_args(args: NewToolArgs) -> Result<ToolDraft> {
    let headers = args
        .headers
        .iter()
        .map(|h| match h.split_once('=') {
            Some((name, value)) => Ok(ToolHeader {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            }),
            None => Err(McpError::ValidationError {
                field: "header".to_string(),
                message: format!("Header must be NAME=VALUE: {}", h),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let raw_body = match &args.body_file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    Ok(ToolDraft {
        id: None,
        method: args.method,
        path: args.path,
        name: args.name,
        description: args.description,
        headers,
        raw_body,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
