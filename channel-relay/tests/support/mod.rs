use channel_relay::{BatchRelay, BrokerClient, Channel, PolicyStore, RelaySettings, RoutingPolicy};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[allow(dead_code)]
pub(crate) const BOOTSTRAP_SERVERS: &str = "broker-1:9092,broker-2:9092";

#[allow(dead_code)]
pub(crate) fn settings() -> RelaySettings {
    RelaySettings::builder()
        .bootstrap_servers(BOOTSTRAP_SERVERS)
        .disabled_pause(Duration::from_millis(5))
        .build()
        .expect("test settings should build")
}

#[allow(dead_code)]
pub(crate) fn policy(topics: &[&str], batch_size: i64) -> RoutingPolicy {
    RoutingPolicy::new(true, topics.iter().copied(), batch_size)
        .expect("test policy should be valid")
}

#[allow(dead_code)]
pub(crate) fn make_relay(
    settings: RelaySettings,
    channel: Arc<dyn Channel>,
    broker: Arc<dyn BrokerClient>,
    policy: RoutingPolicy,
) -> (BatchRelay, PolicyStore) {
    let store = PolicyStore::new(policy);
    let relay = BatchRelay::new(settings, channel, broker, store.clone());
    (relay, store)
}

/// Overwrites `path` and pins its modification time, so revisions are ordered
/// regardless of filesystem timestamp granularity.
#[allow(dead_code)]
pub(crate) fn write_policy(path: &Path, contents: &str, revision: u64) {
    std::fs::write(path, contents).expect("policy file should be writable");
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| {
            file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + revision))
        })
        .expect("policy file mtime should be settable");
}
