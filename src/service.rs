//! Chat request routing with per-user daily quota.

use crate::{
    config::ChatConfig,
    context::RequestContext,
    error::{ChatError, RESPONSE_EMPTY},
    metrics,
    provider::{ChatProvider, CompletionStream, ProviderTag},
    quota::QuotaTracker,
    registry::ProviderRegistry,
    scheduler::{self, DayRollover, SchedulerState},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Metrics label for tags that do not name a known provider
const INVALID_PROVIDER_LABEL: &str = "invalid";

/// State shared between request paths and the rollover task
struct ServiceInner {
    config: ChatConfig,
    registry: ProviderRegistry,
    quota: QuotaTracker,
}

impl ServiceInner {
    async fn reset_if_new_day_at(&self, now: DateTime<Utc>) -> bool {
        let rolled_over = self
            .quota
            .reset_if_new_day_at(now, || self.registry.reset_all())
            .await;
        if rolled_over {
            metrics::record_quota_reset();
        }
        rolled_over
    }
}

/// Routes chat completions to backend providers and enforces the daily limit.
///
/// Owns the quota counters and a background task that clears them when the
/// UTC day changes. Must be constructed inside a tokio runtime.
pub struct ChatService {
    inner: Arc<ServiceInner>,
    rollover: DayRollover,
}

impl ChatService {
    pub fn new(config: ChatConfig, registry: ProviderRegistry) -> Self {
        Self::with_rollover_schedule(
            config,
            registry,
            scheduler::delay_until_next_hour(Utc::now()),
            scheduler::CHECK_PERIOD,
        )
    }

    /// Like [`new`](Self::new), with the first rollover check after
    /// `initial_delay` and later checks every `period`.
    pub fn with_rollover_schedule(
        config: ChatConfig,
        registry: ProviderRegistry,
        initial_delay: Duration,
        period: Duration,
    ) -> Self {
        metrics::init_metric_descriptions();

        let inner = Arc::new(ServiceInner {
            config,
            registry,
            quota: QuotaTracker::new(),
        });

        let task_inner = inner.clone();
        let rollover = DayRollover::spawn_with(initial_delay, period, move || {
            let inner = task_inner.clone();
            async move {
                inner.reset_if_new_day_at(Utc::now()).await;
            }
        });

        tracing::info!(
            default_provider = %inner.config.default_provider,
            everyday_limit = inner.config.everyday_limit,
            providers = ?inner.registry.tags(),
            "Chat service started"
        );

        Self { inner, rollover }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    /// Completions charged to `user` today.
    pub async fn usage(&self, user: &str) -> u32 {
        self.inner.quota.get(user).await
    }

    pub fn rollover_state(&self) -> SchedulerState {
        self.rollover.state()
    }

    /// Clear quota and provider state if the UTC day has changed.
    pub async fn reset_if_new_day(&self) -> bool {
        self.inner.reset_if_new_day_at(Utc::now()).await
    }

    /// Same as [`reset_if_new_day`](Self::reset_if_new_day) against a fixed instant.
    pub async fn reset_if_new_day_at(&self, now: DateTime<Utc>) -> bool {
        self.inner.reset_if_new_day_at(now).await
    }

    /// Send `content` on behalf of `user` and wait for the full answer.
    ///
    /// An empty `chat_type` selects the configured default provider. Only
    /// non-empty answers are charged against the user's daily quota; an
    /// empty answer comes back as [`RESPONSE_EMPTY`]. On error,
    /// [`ChatError::reply`] gives the text to show the user.
    pub async fn chat_completion(
        &self,
        ctx: &RequestContext,
        chat_type: &str,
        user: &str,
        content: &str,
    ) -> Result<String, ChatError> {
        let chat_type = self.resolve_chat_type(chat_type);
        let label = provider_label(chat_type);
        self.check_quota(chat_type, label, user).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            chat = chat_type,
            user = user,
            "receive content: {}",
            content
        );

        let provider = match self.select_provider(chat_type) {
            Ok(provider) => provider,
            Err(e) => {
                metrics::record_request(label, "sync", e.kind());
                return Err(e);
            }
        };

        let result = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(ChatError::Cancelled),
            resp = provider.send_completion(ctx, user, content) => resp.map_err(ChatError::from),
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    chat = chat_type,
                    user = user,
                    error = %e,
                    "Chat completion failed"
                );
                metrics::record_request(label, "sync", e.kind());
                return Err(e);
            }
        };

        if resp.is_empty() {
            metrics::record_request(label, "sync", "empty");
            return Ok(RESPONSE_EMPTY.to_string());
        }

        self.inner.quota.increment(user).await;
        metrics::record_request(label, "sync", "success");
        Ok(resp)
    }

    /// Send `content` on behalf of `user` and get the answer as a chunk stream.
    ///
    /// Quota is charged as soon as the provider hands back a stream, before
    /// any chunk is read, and is not refunded if the stream later fails.
    pub async fn chat_completion_stream(
        &self,
        ctx: &RequestContext,
        chat_type: &str,
        user: &str,
        content: &str,
    ) -> Result<CompletionStream, ChatError> {
        let chat_type = self.resolve_chat_type(chat_type);
        let label = provider_label(chat_type);
        self.check_quota(chat_type, label, user).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            chat = chat_type,
            user = user,
            stream = true,
            "receive content: {}",
            content
        );

        let provider = self.select_provider(chat_type).inspect_err(|e| {
            metrics::record_request(label, "stream", e.kind());
        })?;

        let result = tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(ChatError::Cancelled),
            stream = provider.send_completion_stream(ctx, user, content) => stream.map_err(ChatError::from),
        };

        let stream = result.inspect_err(|e| {
            tracing::warn!(
                request_id = %ctx.request_id,
                chat = chat_type,
                user = user,
                error = %e,
                "Streaming chat completion failed"
            );
            metrics::record_request(label, "stream", e.kind());
        })?;

        self.inner.quota.increment(user).await;
        metrics::record_request(label, "stream", "success");
        Ok(stream)
    }

    /// Stop the rollover task. In-flight requests are not affected.
    pub fn close(&self) {
        self.rollover.stop();
        tracing::info!("Chat service closed");
    }

    /// Stop the rollover task and wait for it to exit.
    pub async fn shutdown(self) {
        self.rollover.shutdown().await;
        tracing::info!("Chat service shut down");
    }

    fn resolve_chat_type<'a>(&'a self, chat_type: &'a str) -> &'a str {
        if chat_type.is_empty() {
            self.inner.config.default_provider.as_str()
        } else {
            chat_type
        }
    }

    async fn check_quota(&self, chat_type: &str, label: &str, user: &str) -> Result<(), ChatError> {
        let used = self.inner.quota.get(user).await;
        let limit = self.inner.config.everyday_limit;
        if used >= limit {
            tracing::info!(chat = chat_type, user = user, used, limit, "Daily limit reached");
            metrics::record_quota_rejection(label);
            return Err(ChatError::QuotaExceeded { limit });
        }
        Ok(())
    }

    fn select_provider(&self, chat_type: &str) -> Result<&Arc<dyn ChatProvider>, ChatError> {
        let tag: ProviderTag = chat_type.parse()?;
        self.inner
            .registry
            .get(tag)
            .ok_or(ChatError::ProviderUnavailable(tag))
    }
}

/// Bounded metrics label for a caller-supplied tag
fn provider_label(chat_type: &str) -> &'static str {
    chat_type
        .parse::<ProviderTag>()
        .map(|tag| tag.as_str())
        .unwrap_or(INVALID_PROVIDER_LABEL)
}
