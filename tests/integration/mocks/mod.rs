// Scripted chat providers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chat_gateway::{ChatProvider, CompletionStream, ProviderError, RequestContext};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// What the mock answers with
#[derive(Clone)]
pub enum Behavior {
    /// Answer with this text (may be empty)
    Reply(String),
    /// Fail with this error
    Fail(ProviderError),
    /// Never answer; the call only ends when the caller drops it
    Hang,
    /// Streaming only: yield these chunks
    Chunks(Vec<Result<String, ProviderError>>),
}

pub struct MockProvider {
    behavior: Mutex<Behavior>,
    barrier: Option<Arc<Barrier>>,
    calls: AtomicUsize,
    stream_calls: AtomicUsize,
    resets: AtomicUsize,
    last_user: Mutex<Option<String>>,
    abandoned: Arc<AtomicBool>,
}

/// Flags the provider call as abandoned if the future is dropped mid-flight
struct AbandonGuard(Arc<AtomicBool>);

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl MockProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self::build(behavior, None))
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(text.to_string()))
    }

    /// Every call waits on `barrier` before answering
    pub fn gated(behavior: Behavior, barrier: Arc<Barrier>) -> Arc<Self> {
        Arc::new(Self::build(behavior, Some(barrier)))
    }

    fn build(behavior: Behavior, barrier: Option<Arc<Barrier>>) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            barrier,
            calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            last_user: Mutex::new(None),
            abandoned: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn last_user(&self) -> Option<String> {
        self.last_user.lock().unwrap().clone()
    }

    pub fn was_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    async fn begin(&self, user: &str) -> Behavior {
        *self.last_user.lock().unwrap() = Some(user.to_string());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        self.behavior.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn send_completion(
        &self,
        _ctx: &RequestContext,
        user: &str,
        _content: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.begin(user).await {
            Behavior::Reply(text) => Ok(text),
            Behavior::Fail(e) => Err(e),
            Behavior::Hang => {
                let guard = AbandonGuard(self.abandoned.clone());
                futures::future::pending::<()>().await;
                drop(guard);
                unreachable!("pending future resolved")
            }
            Behavior::Chunks(chunks) => {
                let text: Vec<String> = chunks.into_iter().filter_map(Result::ok).collect();
                Ok(text.concat())
            }
        }
    }

    async fn send_completion_stream(
        &self,
        _ctx: &RequestContext,
        user: &str,
        _content: &str,
    ) -> Result<CompletionStream, ProviderError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        match self.begin(user).await {
            Behavior::Reply(text) => Ok(Box::pin(futures::stream::iter(vec![Ok(text)]))),
            Behavior::Fail(e) => Err(e),
            Behavior::Hang => {
                let guard = AbandonGuard(self.abandoned.clone());
                futures::future::pending::<()>().await;
                drop(guard);
                unreachable!("pending future resolved")
            }
            Behavior::Chunks(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
        }
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
