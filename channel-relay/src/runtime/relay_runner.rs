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

//! Polling loop that repeatedly invokes a [`BatchRelay`].

use crate::observability::events;
use crate::{BatchOutcome, BatchRelay, RelayError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "relay_runner";

const DEFAULT_BACKOFF_INCREMENT: Duration = Duration::from_secs(1);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5);
const DEFAULT_SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

/// Polling schedule of a [`RelayRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunnerConfig {
    /// Added to the pause after every consecutive backoff.
    pub backoff_increment: Duration,
    /// Upper bound of the pause between invocations.
    pub max_backoff: Duration,
    /// How long a stop request waits for the in-flight invocation.
    pub shutdown_deadline: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            backoff_increment: DEFAULT_BACKOFF_INCREMENT,
            max_backoff: DEFAULT_MAX_BACKOFF,
            shutdown_deadline: DEFAULT_SHUTDOWN_DEADLINE,
        }
    }
}

impl RunnerConfig {
    /// Pause after `consecutive` backoffs in a row.
    pub fn backoff_delay(&self, consecutive: u32) -> Duration {
        self.backoff_increment
            .saturating_mul(consecutive)
            .min(self.max_backoff)
    }
}

/// Owns a [`BatchRelay`] and invokes it until cancelled or a fatal error occurs.
pub struct RelayRunner {
    relay: BatchRelay,
    config: RunnerConfig,
}

impl RelayRunner {
    pub fn new(relay: BatchRelay, config: RunnerConfig) -> Self {
        Self { relay, config }
    }

    pub fn relay(&self) -> &BatchRelay {
        &self.relay
    }

    /// Runs invocations back to back, pausing after backoffs and failed batches.
    ///
    /// Returns `Ok(())` once `cancel` fires, or the fatal error that stopped the loop.
    /// The broker client is closed in both cases; a close failure after a clean stop is
    /// returned as [`RelayError::Close`].
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), RelayError> {
        info!(
            event = events::RUNNER_STARTED,
            component = COMPONENT,
            relay_id = self.relay.relay_id(),
            backoff_increment_ms = self.config.backoff_increment.as_millis() as u64,
            max_backoff_ms = self.config.max_backoff.as_millis() as u64,
            "relay runner started"
        );

        let mut consecutive_backoffs: u32 = 0;
        let result = loop {
            if cancel.is_cancelled() {
                break Ok(());
            }

            let Some(invocation) = self.invoke(&cancel).await else {
                break Ok(());
            };

            match invocation {
                Ok(BatchOutcome::Ready) => {
                    consecutive_backoffs = 0;
                    continue;
                }
                Ok(BatchOutcome::Backoff) => {}
                Err(err) if err.is_fatal() => {
                    error!(
                        event = events::RUNNER_FATAL,
                        component = COMPONENT,
                        relay_id = self.relay.relay_id(),
                        err = %err,
                        "fatal relay error; stopping runner"
                    );
                    break Err(err);
                }
                Err(err) => {
                    if let RelayError::Delivery {
                        events: pulled,
                        elapsed,
                        ..
                    } = &err
                    {
                        warn!(
                            event = events::RUNNER_DELIVERY_FAILED,
                            component = COMPONENT,
                            relay_id = self.relay.relay_id(),
                            events = *pulled,
                            elapsed_ms = elapsed.as_millis() as u64,
                            err = %err,
                            "batch failed; backing off"
                        );
                    }
                }
            }

            consecutive_backoffs = consecutive_backoffs.saturating_add(1);
            let delay = self.config.backoff_delay(consecutive_backoffs);
            debug!(
                event = events::RUNNER_BACKOFF,
                component = COMPONENT,
                relay_id = self.relay.relay_id(),
                consecutive_backoffs,
                delay_ms = delay.as_millis() as u64,
                "backing off"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => break Ok(()),
            }
        };

        let closed = self.relay.close().await;
        match &closed {
            Ok(()) => info!(
                event = events::RUNNER_STOPPED,
                component = COMPONENT,
                relay_id = self.relay.relay_id(),
                broker_closed = true,
                counters = ?self.relay.counters().snapshot(),
                "relay runner stopped"
            ),
            Err(err) => warn!(
                event = events::RUNNER_STOPPED,
                component = COMPONENT,
                relay_id = self.relay.relay_id(),
                broker_closed = false,
                err = %err,
                counters = ?self.relay.counters().snapshot(),
                "relay runner stopped; broker client close failed"
            ),
        }

        // A fatal relay error outranks the close failure.
        match (result, closed) {
            (Ok(()), Err(err)) => Err(RelayError::Close(err)),
            (result, _) => result,
        }
    }

    /// Spawns [`run`](Self::run) on the current Tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<(), RelayError>> {
        tokio::spawn(self.run(cancel))
    }

    // `None` when a stop request outlived the shutdown deadline.
    async fn invoke(
        &mut self,
        cancel: &CancellationToken,
    ) -> Option<Result<BatchOutcome, RelayError>> {
        let deadline = self.config.shutdown_deadline;
        let invocation = self.relay.process();
        tokio::pin!(invocation);

        tokio::select! {
            result = &mut invocation => Some(result),
            _ = cancel.cancelled() => match tokio::time::timeout(deadline, &mut invocation).await {
                Ok(result) => Some(result),
                Err(_) => {
                    warn!(
                        event = events::RUNNER_SHUTDOWN_DEADLINE,
                        component = COMPONENT,
                        deadline_ms = deadline.as_millis() as u64,
                        "in-flight invocation abandoned at shutdown deadline"
                    );
                    None
                }
            },
        }
    }
}
