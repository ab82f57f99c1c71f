use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlopsError {
    #[error("invalid repository name '{0}': use letters, digits, '.', '_' or '-'")]
    InvalidRepoName(String),

    #[error("invalid data binding: {0}")]
    InvalidDataBinding(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("'{0}' is not installed or not on PATH")]
    ToolNotInstalled(String),

    #[error("failed to parse config {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MlopsError>;
