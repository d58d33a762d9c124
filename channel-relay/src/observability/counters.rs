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

//! Relay batch counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonic counters updated by one [`BatchRelay`](crate::BatchRelay).
#[derive(Debug, Default)]
pub struct RelayCounters {
    batch_empty: AtomicU64,
    batch_underflow: AtomicU64,
    batch_complete: AtomicU64,
    event_drain_attempt: AtomicU64,
    event_drain_success: AtomicU64,
    events_skipped: AtomicU64,
    rollback: AtomicU64,
    send_time_ms: AtomicU64,
}

/// Point-in-time copy of [`RelayCounters`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CounterSnapshot {
    /// Invocations whose first take found the channel empty.
    pub batch_empty: u64,
    /// Invocations that ran out of events before reaching the batch size.
    pub batch_underflow: u64,
    /// Invocations that pulled a full batch.
    pub batch_complete: u64,
    /// Records submitted to the broker client.
    pub event_drain_attempt: u64,
    /// Records acknowledged by the broker.
    pub event_drain_success: u64,
    /// Events pulled but not routed.
    pub events_skipped: u64,
    pub rollback: u64,
    /// Accumulated time from batch start to the last acknowledgment.
    pub send_time_ms: u64,
}

impl RelayCounters {
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            batch_empty: self.batch_empty.load(Ordering::Relaxed),
            batch_underflow: self.batch_underflow.load(Ordering::Relaxed),
            batch_complete: self.batch_complete.load(Ordering::Relaxed),
            event_drain_attempt: self.event_drain_attempt.load(Ordering::Relaxed),
            event_drain_success: self.event_drain_success.load(Ordering::Relaxed),
            events_skipped: self.events_skipped.load(Ordering::Relaxed),
            rollback: self.rollback.load(Ordering::Relaxed),
            send_time_ms: self.send_time_ms.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn increment_batch_empty(&self) {
        self.batch_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_batch_underflow(&self) {
        self.batch_underflow.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_batch_complete(&self) {
        self.batch_complete.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_event_drain_attempt(&self) {
        self.event_drain_attempt.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_event_drain_success(&self, count: u64) {
        self.event_drain_success.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn increment_events_skipped(&self) {
        self.events_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_rollback(&self) {
        self.rollback.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_send_time(&self, elapsed: Duration) {
        self.send_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }
}
