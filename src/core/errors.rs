use spin_sdk::http::Response;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::InvalidOperation(_) => 400,
            ApiError::Unauthenticated => 401,
            ApiError::Unauthorized(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// Message shown to the client. Internal details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::InvalidOperation(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Unauthenticated => "Unauthenticated".to_string(),
            ApiError::Internal(_) => "Server error".to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(format!("Malformed JSON body: {}", err))
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        if let ApiError::Internal(inner) = &err {
            log::error!("internal error: {:#}", inner);
        }
        let body = serde_json::json!({ "message": err.message() }).to_string();
        Response::builder()
            .status(err.status())
            .header("Content-Type", "application/json")
            .body(body.into_bytes())
            .build()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
