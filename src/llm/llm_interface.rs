use async_trait::async_trait;
use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum ModelInvocationError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("model request timed out")]
    Timeout,
    #[error("model service returned HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("invalid response from model service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ModelInvocationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelInvocationError::Timeout
        } else {
            ModelInvocationError::Network(err)
        }
    }
}

/// Interface for a completion model
/// One prompt in, the raw reply text out; no conversation state is kept
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelInvocationError>;
}
