use thiserror::Error;

/// Failures talking to the task service.
///
/// `Network` means no usable response was obtained; `Request` means the
/// server answered with a non-2xx status (the message comes from the error
/// body when it has one); `InvalidResponse` means a 2xx answer that violated
/// the `{success, data, ...}` envelope.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("config error: {0}")]
    Config(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
