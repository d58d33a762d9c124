/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Process-wide holder of the current routing policy.

use crate::observability::events;
use crate::RoutingPolicy;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

const COMPONENT: &str = "policy_store";

/// Atomically swappable [`RoutingPolicy`] snapshot.
///
/// Readers never block and always observe a fully formed policy. Clones share the same
/// underlying snapshot, so the relay and the watcher each hold one.
#[derive(Clone)]
pub struct PolicyStore {
    snapshot: Arc<ArcSwap<RoutingPolicy>>,
    version: Arc<AtomicU64>,
}

impl PolicyStore {
    pub fn new(initial: RoutingPolicy) -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(initial)),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the latest published policy.
    pub fn current(&self) -> Arc<RoutingPolicy> {
        self.snapshot.load_full()
    }

    /// Replaces the current policy for every subsequent `current()` call.
    pub fn publish(&self, policy: RoutingPolicy) {
        let enabled = policy.enabled();
        let batch_size = policy.batch_size();
        let topic_count = policy.topics().len();

        self.snapshot.store(Arc::new(policy));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            event = events::POLICY_PUBLISHED,
            component = COMPONENT,
            version,
            enabled,
            batch_size,
            topic_count,
            "routing policy published"
        );
    }

    /// Number of publishes since construction.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::PolicyStore;
    use crate::RoutingPolicy;
    use std::sync::Arc;

    #[test]
    fn publish_replaces_snapshot_and_advances_version() {
        let store = PolicyStore::new(RoutingPolicy::disabled());
        assert_eq!(store.version(), 0);
        assert!(!store.current().enabled());

        store.publish(RoutingPolicy::new(true, ["orders"], 10).unwrap());

        assert_eq!(store.version(), 1);
        assert!(store.current().enabled());
        assert!(store.current().allows("orders"));
    }

    #[test]
    fn snapshot_taken_before_publish_is_unaffected() {
        let store = PolicyStore::new(RoutingPolicy::new(true, ["orders"], 2).unwrap());
        let before = store.current();

        store.publish(RoutingPolicy::new(false, ["other"], 9).unwrap());

        assert!(before.enabled());
        assert_eq!(before.batch_size(), 2);
        assert!(!store.current().enabled());
    }

    #[test]
    fn clones_share_the_same_snapshot() {
        let store = PolicyStore::new(RoutingPolicy::disabled());
        let reader = store.clone();

        store.publish(RoutingPolicy::new(true, ["orders"], 5).unwrap());

        assert_eq!(reader.version(), 1);
        assert_eq!(reader.current().batch_size(), 5);
    }

    #[test]
    fn concurrent_publishers_leave_one_complete_policy() {
        let store = PolicyStore::new(RoutingPolicy::disabled());

        let writers: Vec<_> = (1..=8)
            .map(|batch_size| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let topic = format!("topic-{batch_size}");
                    store.publish(RoutingPolicy::new(true, [topic], batch_size).unwrap());
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread should finish");
        }

        let current: Arc<RoutingPolicy> = store.current();
        assert_eq!(store.version(), 8);
        assert!(current.enabled());
        assert!(current.allows(&format!("topic-{}", current.batch_size())));
    }
}
