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

//! Background watcher that refreshes the [`PolicyStore`] from a [`PolicySource`].

use crate::observability::{events, fields};
use crate::{ConfigError, PolicyError, PolicyStore, RoutingPolicy};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "config_watcher";

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// External origin of routing policy revisions.
#[async_trait]
pub trait PolicySource: Send + Sync {
    /// Human readable location used in logs.
    fn location(&self) -> String;

    /// Last-modification marker of the current revision.
    async fn modified(&self) -> Result<SystemTime, PolicyError>;

    /// Raw bytes of the current revision.
    async fn read(&self) -> Result<Vec<u8>, PolicyError>;
}

/// Watcher schedule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WatcherConfig {
    /// Delay before the first check.
    pub initial_delay: Duration,
    /// Delay between subsequent checks.
    pub interval: Duration,
}

impl WatcherConfig {
    /// Rejects schedules the watcher cannot run, such as a zero check interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroCheckInterval);
        }
        Ok(())
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

/// Result of one watcher tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyCheck {
    /// The source marker did not move since the last fetch.
    Unchanged,
    /// A new policy was decoded and published.
    Published,
    /// The new revision could not be decoded; the previous policy stays in force.
    Rejected,
    /// The source could not be reached; the check is retried on the next tick.
    Unavailable,
}

/// Polls a [`PolicySource`] on a fixed schedule and publishes changed policies.
pub struct ConfigWatcher {
    source: Arc<dyn PolicySource>,
    store: PolicyStore,
    config: WatcherConfig,
    last_marker: Option<SystemTime>,
}

impl ConfigWatcher {
    /// Creates a watcher over an existing store. The first check always fetches.
    pub fn new(source: Arc<dyn PolicySource>, store: PolicyStore, config: WatcherConfig) -> Self {
        Self {
            source,
            store,
            config,
            last_marker: None,
        }
    }

    /// Loads the initial policy and returns the watcher together with the store it feeds.
    ///
    /// Any failure here is a startup configuration error.
    pub async fn load_initial(
        source: Arc<dyn PolicySource>,
        config: WatcherConfig,
    ) -> Result<(Self, PolicyStore), ConfigError> {
        config.validate()?;

        let marker = source
            .modified()
            .await
            .map_err(ConfigError::InitialPolicy)?;
        let bytes = source.read().await.map_err(ConfigError::InitialPolicy)?;
        let policy = RoutingPolicy::decode(&bytes).map_err(ConfigError::InitialPolicy)?;

        info!(
            event = events::POLICY_INITIAL_LOAD,
            component = COMPONENT,
            source = source.location().as_str(),
            enabled = policy.enabled(),
            batch_size = policy.batch_size(),
            topic_count = policy.topics().len(),
            "initial routing policy loaded"
        );

        let store = PolicyStore::new(policy);
        let watcher = Self {
            source,
            store: store.clone(),
            config,
            last_marker: Some(marker),
        };

        Ok((watcher, store))
    }

    /// Runs one check against the source.
    pub async fn check_update(&mut self) -> PolicyCheck {
        let location = self.source.location();

        let marker = match self.source.modified().await {
            Ok(marker) => marker,
            Err(err) => {
                warn!(
                    event = events::POLICY_SOURCE_UNAVAILABLE,
                    component = COMPONENT,
                    source = location.as_str(),
                    err = %err,
                    "unable to read policy source marker"
                );
                return PolicyCheck::Unavailable;
            }
        };

        if matches!(self.last_marker, Some(last) if marker <= last) {
            debug!(
                event = events::POLICY_UNCHANGED,
                component = COMPONENT,
                source = location.as_str(),
                "policy source unchanged"
            );
            return PolicyCheck::Unchanged;
        }

        let bytes = match self.source.read().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    event = events::POLICY_SOURCE_UNAVAILABLE,
                    component = COMPONENT,
                    source = location.as_str(),
                    err = %err,
                    "unable to read policy source"
                );
                return PolicyCheck::Unavailable;
            }
        };
        // A malformed revision is reported once, not on every tick until it changes.
        self.last_marker = Some(marker);

        match RoutingPolicy::decode(&bytes) {
            Ok(policy) => {
                self.store.publish(policy);
                PolicyCheck::Published
            }
            Err(err) => {
                error!(
                    event = events::POLICY_DECODE_FAILED,
                    component = COMPONENT,
                    source = location.as_str(),
                    reason = fields::REASON_KEEP_PREVIOUS_POLICY,
                    err = %err,
                    "rejected policy update"
                );
                PolicyCheck::Rejected
            }
        }
    }

    /// Checks the source after `initial_delay`, then every `interval`, until cancelled.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            event = events::WATCHER_STARTED,
            component = COMPONENT,
            source = self.source.location().as_str(),
            initial_delay_ms = self.config.initial_delay.as_millis() as u64,
            interval_ms = self.config.interval.as_millis() as u64,
            "policy watcher started"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.config.initial_delay) => {}
            _ = cancel.cancelled() => {
                info!(event = events::WATCHER_STOPPED, component = COMPONENT, "policy watcher stopped");
                return;
            }
        }

        let period = if self.config.interval.is_zero() {
            warn!(
                event = events::WATCHER_INTERVAL_INVALID,
                component = COMPONENT,
                fallback_ms = DEFAULT_CHECK_INTERVAL.as_millis() as u64,
                "zero check interval; using default"
            );
            DEFAULT_CHECK_INTERVAL
        } else {
            self.config.interval
        };
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if AssertUnwindSafe(self.check_update()).catch_unwind().await.is_err() {
                        error!(
                            event = events::WATCHER_CHECK_PANICKED,
                            component = COMPONENT,
                            "policy check panicked; watcher keeps running"
                        );
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }

        info!(
            event = events::WATCHER_STOPPED,
            component = COMPONENT,
            "policy watcher stopped"
        );
    }

    /// Spawns [`run`](Self::run) on the current Tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
