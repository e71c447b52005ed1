use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

/// The `status` object every CoinMarketCap response carries, successful or not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub credit_count: Option<u32>,
}

impl ApiStatus {
    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }

    pub fn message(&self) -> &str {
        self.error_message.as_deref().unwrap_or("")
    }
}

impl Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_message {
            Some(message) => write!(f, "{}: {}", self.error_code, message),
            None => write!(f, "{}", self.error_code),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub status: ApiStatus,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] DataError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
}

impl ClientError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    /// Classify a non-zero `status.error_code`.
    ///
    /// 1001-1007 are key and plan failures, 1008-1011 are the per-minute,
    /// daily, monthly and IP rate limits.
    pub(crate) fn from_api_status(status: &ApiStatus) -> Self {
        let message = status.to_string();
        match status.error_code {
            1001..=1007 => Self::Auth(message),
            1008..=1011 => Self::RateLimit(message),
            code => Self::Api {
                code,
                message: status.message().to_string(),
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Failed to parse {entity}: {reason}")]
    ParseError {
        entity: &'static str,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }

    pub fn parse_error(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::ParseError {
            entity,
            reason: reason.into(),
        }
    }
}
