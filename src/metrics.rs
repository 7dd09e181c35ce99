use metrics::{counter, describe_counter};

/// Register metric descriptions (safe to call more than once).
///
/// The library never installs a recorder itself; the embedding process
/// picks the exporter.
pub fn init_metric_descriptions() {
    describe_counter!(
        "chat_requests_total",
        "Total number of chat completion requests by provider and outcome"
    );
    describe_counter!(
        "chat_quota_rejections_total",
        "Requests rejected because the user reached the daily limit"
    );
    describe_counter!(
        "chat_quota_resets_total",
        "Number of daily quota resets"
    );
}

/// Record a finished request
pub fn record_request(provider: &str, mode: &str, outcome: &str) {
    counter!(
        "chat_requests_total",
        "provider" => provider.to_string(),
        "mode" => mode.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record a quota rejection
pub fn record_quota_rejection(provider: &str) {
    counter!(
        "chat_quota_rejections_total",
        "provider" => provider.to_string(),
    )
    .increment(1);
}

/// Record a daily reset
pub fn record_quota_reset() {
    counter!("chat_quota_resets_total").increment(1);
}
