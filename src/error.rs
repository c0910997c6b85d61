use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigError = Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Credentials exhausted: {0}")]
    CredentialsExhausted(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::HttpError(_) | Error::RateLimited(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidUrl(_) | Error::InvalidQuery(_) | Error::Config(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::HttpError(_) => "HTTP_ERROR",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::CredentialsExhausted(_) => "CREDENTIALS_EXHAUSTED",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidQuery(_) => "INVALID_QUERY",
            Error::Timeout(_) => "TIMEOUT",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Config(_) => "CONFIG",
            Error::Storage(_) => "STORAGE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Invalid(_) => "INVALID",
        }
    }
}
