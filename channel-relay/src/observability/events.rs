//! Canonical structured event names used across `channel-relay`.

// Batch relay events.
pub const RELAY_CREATED: &str = "relay_created";
pub const RELAY_GATE_CLOSED: &str = "relay_gate_closed";
pub const RELAY_BATCH_EMPTY: &str = "relay_batch_empty";
pub const RELAY_BATCH_UNDERFLOW: &str = "relay_batch_underflow";
pub const RELAY_EVENT_SKIPPED: &str = "relay_event_skipped";
pub const RELAY_SEND_SUBMITTED: &str = "relay_send_submitted";
pub const RELAY_SEND_ACKED: &str = "relay_send_acked";
pub const RELAY_BATCH_COMMITTED: &str = "relay_batch_committed";
pub const RELAY_BATCH_FAILED: &str = "relay_batch_failed";
pub const RELAY_ROLLBACK_OK: &str = "relay_rollback_ok";
pub const RELAY_ROLLBACK_FAILED: &str = "relay_rollback_failed";
pub const RELAY_BROKER_CLOSED: &str = "relay_broker_closed";
pub const RELAY_BROKER_CLOSE_FAILED: &str = "relay_broker_close_failed";

// Policy control-plane events.
pub const POLICY_INITIAL_LOAD: &str = "policy_initial_load";
pub const POLICY_PUBLISHED: &str = "policy_published";
pub const POLICY_UNCHANGED: &str = "policy_unchanged";
pub const POLICY_DECODE_FAILED: &str = "policy_decode_failed";
pub const POLICY_SOURCE_UNAVAILABLE: &str = "policy_source_unavailable";
pub const WATCHER_STARTED: &str = "watcher_started";
pub const WATCHER_STOPPED: &str = "watcher_stopped";
pub const WATCHER_CHECK_PANICKED: &str = "watcher_check_panicked";
pub const WATCHER_INTERVAL_INVALID: &str = "watcher_interval_invalid";

// Startup configuration events.
pub const CONFIG_DEPRECATED_KEY: &str = "config_deprecated_key";

// Runner events.
pub const RUNNER_STARTED: &str = "runner_started";
pub const RUNNER_BACKOFF: &str = "runner_backoff";
pub const RUNNER_DELIVERY_FAILED: &str = "runner_delivery_failed";
pub const RUNNER_FATAL: &str = "runner_fatal";
pub const RUNNER_SHUTDOWN_DEADLINE: &str = "runner_shutdown_deadline";
pub const RUNNER_STOPPED: &str = "runner_stopped";
