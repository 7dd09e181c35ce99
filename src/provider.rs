use crate::{context::RequestContext, error::ChatError, error::ProviderError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Backend chat providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    #[serde(rename = "wenxin")]
    Wenxin,
}

impl ProviderTag {
    pub const ALL: [ProviderTag; 2] = [ProviderTag::ChatGpt, ProviderTag::Wenxin];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::ChatGpt => "chatgpt",
            ProviderTag::Wenxin => "wenxin",
        }
    }
}

impl std::str::FromStr for ProviderTag {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chatgpt" => Ok(ProviderTag::ChatGpt),
            "wenxin" => Ok(ProviderTag::Wenxin),
            _ => Err(ChatError::InvalidProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lazy sequence of content chunks produced by a streaming completion
pub type CompletionStream = BoxStream<'static, Result<String, ProviderError>>;

/// Interface every backend chat client implements.
///
/// Implementations own their transport and any per-user conversation
/// history. The service only decides *which* client handles a request
/// and whether the user is still within quota.
#[async_trait]
pub trait ChatProvider: Send + Sync + 'static {
    /// Send one message and wait for the whole answer.
    async fn send_completion(
        &self,
        ctx: &RequestContext,
        user: &str,
        content: &str,
    ) -> Result<String, ProviderError>;

    /// Send one message and get the answer back chunk by chunk.
    async fn send_completion_stream(
        &self,
        ctx: &RequestContext,
        user: &str,
        content: &str,
    ) -> Result<CompletionStream, ProviderError>;

    /// Drop any per-user context/history held by the client.
    ///
    /// Called on day rollover while the quota lock is held, so it must not block.
    fn reset(&self);
}
