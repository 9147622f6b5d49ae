use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API request failed ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Backend returned no content for {path}")]
    EmptyResponseError { path: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Variable name \"{name}\" already exists.")]
    DuplicateNameError { name: String },

    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFoundError { entity: String, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Configuration,
    Validation,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl McpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            McpError::HttpError(_) => ErrorCategory::Network,
            McpError::ApiError { .. } | McpError::EmptyResponseError { .. } => ErrorCategory::Api,
            McpError::IoError(_) => ErrorCategory::System,
            McpError::SerializationError(_) => ErrorCategory::Data,
            McpError::ConfigError { .. }
            | McpError::MissingConfigError { .. }
            | McpError::InvalidConfigValueError { .. }
            | McpError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            McpError::DuplicateNameError { .. }
            | McpError::ValidationError { .. }
            | McpError::NotFoundError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            McpError::HttpError(_) => ErrorSeverity::Medium,
            McpError::ApiError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            McpError::ApiError { .. } | McpError::EmptyResponseError { .. } => ErrorSeverity::High,
            McpError::IoError(_) => ErrorSeverity::Critical,
            McpError::SerializationError(_) => ErrorSeverity::High,
            McpError::ConfigError { .. }
            | McpError::MissingConfigError { .. }
            | McpError::InvalidConfigValueError { .. }
            | McpError::ConfigValidationError { .. } => ErrorSeverity::Critical,
            McpError::DuplicateNameError { .. }
            | McpError::ValidationError { .. }
            | McpError::NotFoundError { .. } => ErrorSeverity::High,
        }
    }

    /// 是否為 401 未授權錯誤
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, McpError::ApiError { status: 401, .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            McpError::HttpError(e) if e.is_timeout() => {
                "The backend did not answer in time.".to_string()
            }
            McpError::HttpError(e) if e.is_connect() => {
                "Could not connect to the backend.".to_string()
            }
            McpError::HttpError(_) => "The request to the backend failed.".to_string(),
            McpError::ApiError { message, .. } => message.clone(),
            McpError::SerializationError(_) => {
                "The backend returned data that could not be read.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            McpError::HttpError(_) => "Check that the backend is running and api.base_url is correct",
            McpError::ApiError { status: 401, .. } => {
                "Set a valid API token with `mcp-admin auth set-token <TOKEN>`"
            }
            McpError::ApiError { status: 404, .. } => "Check the id you passed",
            McpError::ApiError { .. } | McpError::EmptyResponseError { .. } => {
                "Inspect the backend logs for details"
            }
            McpError::IoError(_) => "Check file permissions and available disk space",
            McpError::SerializationError(_) => "Make sure the input is valid JSON",
            McpError::ConfigError { .. }
            | McpError::MissingConfigError { .. }
            | McpError::InvalidConfigValueError { .. }
            | McpError::ConfigValidationError { .. } => "Review the configuration file",
            McpError::DuplicateNameError { .. } => "Pick another name or update the existing entry",
            McpError::ValidationError { .. } => "Fill in the required fields and try again",
            McpError::NotFoundError { .. } => "Refresh the list and check the id",
        }
    }
}

pub type Result<T> = std::result::Result<T, McpError>;
