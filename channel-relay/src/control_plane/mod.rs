//! Control-plane layer.
//!
//! Owns the routing policy lifecycle: decoding policy revisions, holding the current
//! snapshot behind an atomic swap, and the background watcher that publishes new
//! revisions while relay invocations keep running.
//!
//! ```
//! use channel_relay::{PolicyStore, RoutingPolicy};
//!
//! let store = PolicyStore::new(RoutingPolicy::disabled());
//! let snapshot = store.current();
//!
//! store.publish(RoutingPolicy::decode(br#"{"enabled": true, "topics": ["orders"]}"#).unwrap());
//!
//! // Snapshots already handed out keep their values; new reads see the update.
//! assert!(!snapshot.enabled());
//! assert!(store.current().allows("orders"));
//! ```

pub(crate) mod config_watcher;
pub(crate) mod policy_store;
pub(crate) mod routing_policy;
