use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Failures of the surrounding system. The extraction engine itself never
/// produces one of these: malformed markup degrades output, it does not fail.
#[derive(Debug)]
pub enum AppError {
    /// The source answered with an anti-bot interstitial instead of the problem page.
    BlockedSource(String),
    /// Response bytes could not be decoded as UTF-8 text.
    InvalidEncoding(String),
    Http(reqwest::Error),
    NotFound(String),
    BadRequest(String),
    Config(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Internal(String),
}

impl AppError {
    /// Whether trying the same request again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::BlockedSource(_) => true,
            AppError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BlockedSource(marker) => {
                write!(f, "Source is blocked, try again later (detected: {})", marker)
            }
            AppError::InvalidEncoding(msg) => write!(f, "Invalid encoding: {}", msg),
            AppError::Http(e) => write!(f, "HTTP error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(e) => write!(f, "IO error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Http(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BlockedSource(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidEncoding(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "error": self.to_string(),
            "retryable": self.is_retryable(),
        });
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

pub type AppResult<T> = Result<T, AppError>;
