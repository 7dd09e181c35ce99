use crate::provider::ProviderTag;
use thiserror::Error;

/// Reply sent back when the provider call failed.
pub const RESPONSE_FAILED: &str = "Get response failed.";

/// Reply sent back when the provider answered with nothing.
pub const RESPONSE_EMPTY: &str = "Get response empty.";

/// Render the user-facing daily limit message.
pub fn limit_message(limit: u32) -> String {
    format!(
        "You've reached the daily limit ({}/day). Your quota will be restored tomorrow.",
        limit
    )
}

/// Errors raised by a backend chat provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Upstream API answered with an error
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    /// Upstream did not answer in time
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Streaming response broke mid-flight
    #[error("Stream error: {0}")]
    Stream(String),
    /// Anything else the provider wants to surface
    #[error("Provider error: {0}")]
    Other(String),
}

/// Errors returned by `ChatService`
#[derive(Debug, Error)]
pub enum ChatError {
    /// The user used up today's quota
    #[error("you've reached the daily limit ({limit}/day). Your quota will be restored tomorrow")]
    QuotaExceeded { limit: u32 },
    /// The selected provider failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The provider tag is not one we know about
    #[error("Invalid provider: {0}")]
    InvalidProvider(String),
    /// The provider tag is valid but no client is registered for it
    #[error("Provider not registered: {0}")]
    ProviderUnavailable(ProviderTag),
    /// The request context was cancelled while the provider was working
    #[error("Request cancelled")]
    Cancelled,
}

impl ChatError {
    /// Fixed text to show the end user in place of a completion.
    pub fn reply(&self) -> String {
        match self {
            Self::QuotaExceeded { limit } => limit_message(*limit),
            _ => RESPONSE_FAILED.to_string(),
        }
    }

    /// Short, stable name used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Provider(_) => "provider_error",
            Self::InvalidProvider(_) => "invalid_provider",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::Cancelled => "cancelled",
        }
    }
}
