// Request metrics keep a bounded label set whatever tags callers send

#[path = "integration/mocks/mod.rs"]
mod mocks;

use chat_gateway::config::ChatConfig;
use chat_gateway::{ChatService, ProviderRegistry, ProviderTag, RequestContext};
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use mocks::MockProvider;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Remembers every counter key it is asked to register
#[derive(Default)]
struct KeyRecorder {
    counters: Mutex<HashSet<Key>>,
}

impl KeyRecorder {
    fn counter_keys(&self) -> HashSet<Key> {
        self.counters.lock().unwrap().clone()
    }
}

impl Recorder for KeyRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        self.counters.lock().unwrap().insert(key.clone());
        Counter::noop()
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

fn provider_labels(keys: &HashSet<Key>) -> HashSet<String> {
    keys.iter()
        .flat_map(|key| key.labels())
        .filter(|label| label.key() == "provider")
        .map(|label| label.value().to_string())
        .collect()
}

#[test]
fn test_unknown_tags_share_one_metrics_label() {
    let recorder = KeyRecorder::default();

    metrics::with_local_recorder(&recorder, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let registry = ProviderRegistry::new()
                .with(ProviderTag::ChatGpt, MockProvider::replying("hello"))
                .with(ProviderTag::Wenxin, MockProvider::replying("你好"));
            let config = ChatConfig {
                everyday_limit: 1,
                ..ChatConfig::default()
            };
            let day = Duration::from_secs(24 * 3600);
            let service = ChatService::with_rollover_schedule(config, registry, day, day);
            let ctx = RequestContext::new();

            // "spent" is at the limit, so its bogus tags are rejected by the quota check
            service.chat_completion(&ctx, "", "spent", "hi").await.unwrap();

            for i in 0..100 {
                let tag = format!("tag-{}", i);
                assert!(service.chat_completion(&ctx, &tag, "fresh", "hi").await.is_err());
                assert!(service.chat_completion(&ctx, &tag, "spent", "hi").await.is_err());
                assert!(service
                    .chat_completion_stream(&ctx, &tag, "fresh", "hi")
                    .await
                    .is_err());
            }

            service.shutdown().await;
        });
    });

    let keys = recorder.counter_keys();
    let labels = provider_labels(&keys);
    assert!(labels.contains("invalid"));
    assert!(labels.contains("chatgpt"));
    assert!(labels.iter().all(|label| ["chatgpt", "wenxin", "invalid"].contains(&label.as_str())));

    // success, quota rejection, sync and stream invalid-provider outcomes
    assert!(keys.len() <= 4, "counter series grew to {}", keys.len());
}
