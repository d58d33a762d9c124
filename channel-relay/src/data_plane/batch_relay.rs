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

//! Transactional batch relay from a [`Channel`] to a [`BrokerClient`].

use crate::data_plane::serializer::{Serializer, SerializerMode};
use crate::observability::counters::RelayCounters;
use crate::observability::events;
use crate::observability::fields::{self, RelayContext};
use crate::{
    BrokerClient, BrokerError, Channel, ChannelError, DeliveryCause, DeliveryFuture, Event,
    OutboundRecord, PartitionResolver, PolicyStore, RelayError, RelaySettings, RoutingPolicy,
    TopicResolver, Transaction, KEY_HEADER,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn, Level};

const COMPONENT: &str = "batch_relay";

/// What the caller should do before the next invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatchOutcome {
    /// The batch was handled; poll again promptly.
    Ready,
    /// Nothing to do, or the batch failed; wait before polling again.
    Backoff,
}

/// Phase of the invocation currently running, `Idle` between invocations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RelayState {
    #[default]
    Idle,
    TransactionOpen,
    Draining,
    Flushing,
    Committing,
    RollingBack,
}

struct PendingSend {
    topic: String,
    submitted_at: Instant,
    delivery: DeliveryFuture,
}

/// Phase cell shared with [`IdleOnDrop`].
#[derive(Clone, Default)]
struct Phase(Arc<Mutex<RelayState>>);

impl Phase {
    fn get(&self) -> RelayState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: RelayState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Puts the relay back to `Idle` when an invocation finishes or is dropped mid-flight.
struct IdleOnDrop(Phase);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.set(RelayState::Idle);
    }
}

/// Ends the wrapped transaction exactly once, when dropped.
struct OpenTransaction {
    inner: Option<Box<dyn Transaction>>,
}

impl OpenTransaction {
    fn new(transaction: Box<dyn Transaction>) -> Self {
        Self {
            inner: Some(transaction),
        }
    }

    fn get(&mut self) -> Result<&mut (dyn Transaction + 'static), ChannelError> {
        self.inner
            .as_deref_mut()
            .ok_or(ChannelError::TransactionClosed)
    }
}

impl Drop for OpenTransaction {
    fn drop(&mut self) {
        if let Some(transaction) = self.inner.take() {
            transaction.end();
        }
    }
}

/// Moves events from a channel to a broker one transactional batch at a time.
///
/// Each [`process`](Self::process) call reads the current [`RoutingPolicy`] once,
/// pulls up to `batch_size` events under a single channel transaction, publishes the
/// routable ones and commits only after every publish was acknowledged. Any failure
/// rolls the whole batch back, so every event is delivered at least once.
pub struct BatchRelay {
    settings: RelaySettings,
    channel: Arc<dyn Channel>,
    broker: Arc<dyn BrokerClient>,
    store: PolicyStore,
    topic_resolver: TopicResolver,
    partition_resolver: PartitionResolver,
    serializer: Serializer,
    pending: Vec<PendingSend>,
    counters: Arc<RelayCounters>,
    context: RelayContext,
    phase: Phase,
}

impl BatchRelay {
    pub fn new(
        settings: RelaySettings,
        channel: Arc<dyn Channel>,
        broker: Arc<dyn BrokerClient>,
        store: PolicyStore,
    ) -> Self {
        let topic_resolver = TopicResolver::new(settings.topic_header());
        let partition_resolver = PartitionResolver::new(
            settings.static_partition(),
            settings.partition_header().map(str::to_string),
        );
        let mode = if settings.envelope() {
            SerializerMode::Envelope
        } else {
            SerializerMode::Raw
        };
        let context = RelayContext::generate();

        info!(
            event = events::RELAY_CREATED,
            component = COMPONENT,
            relay_id = context.relay_id.as_str(),
            bootstrap_servers = settings.bootstrap_servers().join(",").as_str(),
            topic_header = settings.topic_header(),
            static_partition = fields::format_partition(settings.static_partition()).as_str(),
            envelope = settings.envelope(),
            "batch relay created"
        );

        Self {
            settings,
            channel,
            broker,
            store,
            topic_resolver,
            partition_resolver,
            serializer: Serializer::new(mode),
            pending: Vec::new(),
            counters: Arc::new(RelayCounters::default()),
            context,
            phase: Phase::default(),
        }
    }

    pub fn relay_id(&self) -> &str {
        &self.context.relay_id
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn counters(&self) -> Arc<RelayCounters> {
        self.counters.clone()
    }

    pub fn state(&self) -> RelayState {
        self.phase.get()
    }

    /// Runs one relay invocation.
    ///
    /// Returns [`BatchOutcome::Backoff`] when the channel had nothing to relay. On
    /// [`RelayError::Delivery`] the batch has been rolled back and the caller should back
    /// off; [`RelayError::RollbackFailed`] leaves the channel in an unknown state.
    pub async fn process(&mut self) -> Result<BatchOutcome, RelayError> {
        let policy = self.store.current();

        if !policy.enabled() {
            debug!(
                event = events::RELAY_GATE_CLOSED,
                component = COMPONENT,
                relay_id = self.context.relay_id.as_str(),
                pause_ms = self.settings.disabled_pause().as_millis() as u64,
                "relay disabled by policy; pausing"
            );
            tokio::time::sleep(self.settings.disabled_pause()).await;
            return Ok(BatchOutcome::Ready);
        }

        let started = Instant::now();
        self.pending.clear();
        let _idle = IdleOnDrop(self.phase.clone());

        let mut transaction = match self.channel.begin_transaction().await {
            Ok(transaction) => OpenTransaction::new(transaction),
            Err(err) => {
                return Err(self.delivery_failed(0, started.elapsed(), err.into()));
            }
        };
        self.phase.set(RelayState::TransactionOpen);

        let mut pulled = 0;
        let result = self
            .relay_batch(&mut transaction, &policy, started, &mut pulled)
            .await;

        match result {
            Ok(outcome) => {
                drop(transaction);
                self.phase.set(RelayState::Idle);
                Ok(outcome)
            }
            Err(cause) => {
                self.pending.clear();
                self.phase.set(RelayState::RollingBack);

                let rolled_back = match transaction.get() {
                    Ok(open) => open.rollback().await,
                    Err(err) => Err(err),
                };
                drop(transaction);
                self.phase.set(RelayState::Idle);

                if let Err(err) = rolled_back {
                    error!(
                        event = events::RELAY_ROLLBACK_FAILED,
                        component = COMPONENT,
                        relay_id = self.context.relay_id.as_str(),
                        events = pulled,
                        err = %err,
                        "transaction rollback failed"
                    );
                    return Err(RelayError::RollbackFailed(err));
                }

                self.counters.increment_rollback();
                debug!(
                    event = events::RELAY_ROLLBACK_OK,
                    component = COMPONENT,
                    relay_id = self.context.relay_id.as_str(),
                    events = pulled,
                    "transaction rolled back"
                );

                Err(self.delivery_failed(pulled, started.elapsed(), cause))
            }
        }
    }

    async fn relay_batch(
        &mut self,
        transaction: &mut OpenTransaction,
        policy: &RoutingPolicy,
        started: Instant,
        pulled: &mut usize,
    ) -> Result<BatchOutcome, DeliveryCause> {
        self.phase.set(RelayState::Draining);

        let batch_size = policy.batch_size();
        let mut outcome = BatchOutcome::Ready;

        while *pulled < batch_size {
            let Some(event) = transaction.get()?.take().await? else {
                if *pulled == 0 {
                    self.counters.increment_batch_empty();
                    outcome = BatchOutcome::Backoff;
                    trace!(
                        event = events::RELAY_BATCH_EMPTY,
                        component = COMPONENT,
                        relay_id = self.context.relay_id.as_str(),
                        "channel empty"
                    );
                } else {
                    self.counters.increment_batch_underflow();
                    debug!(
                        event = events::RELAY_BATCH_UNDERFLOW,
                        component = COMPONENT,
                        relay_id = self.context.relay_id.as_str(),
                        events = *pulled,
                        batch_size,
                        "channel drained before batch size"
                    );
                }
                break;
            };

            *pulled += 1;
            self.submit(&event, policy)?;
        }

        if *pulled == batch_size {
            self.counters.increment_batch_complete();
        }

        self.phase.set(RelayState::Flushing);
        // Acks below would otherwise wait on client-side linger.
        self.broker.flush().await?;

        if *pulled > 0 {
            let submitted = self.pending.len();
            self.await_acknowledgments().await?;
            self.counters.add_send_time(started.elapsed());
            self.counters.add_event_drain_success(submitted as u64);
        }

        self.phase.set(RelayState::Committing);
        transaction.get()?.commit().await?;

        debug!(
            event = events::RELAY_BATCH_COMMITTED,
            component = COMPONENT,
            relay_id = self.context.relay_id.as_str(),
            events = *pulled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch committed"
        );

        Ok(outcome)
    }

    fn submit(&mut self, event: &Event, policy: &RoutingPolicy) -> Result<(), DeliveryCause> {
        let topic = match self.topic_resolver.resolve(event) {
            Some(topic) if policy.allows(&topic) => topic,
            resolved => {
                self.counters.increment_events_skipped();
                let reason = if resolved.is_some() {
                    fields::REASON_TOPIC_NOT_ALLOWED
                } else {
                    fields::REASON_NO_TOPIC
                };
                trace!(
                    event = events::RELAY_EVENT_SKIPPED,
                    component = COMPONENT,
                    relay_id = self.context.relay_id.as_str(),
                    topic = resolved.as_deref().unwrap_or(fields::NONE),
                    reason,
                    "event skipped"
                );
                return Ok(());
            }
        };

        let partition = self.partition_resolver.resolve(event)?;
        let key = event.header(KEY_HEADER).map(str::to_string);
        let payload = self.serializer.serialize(event)?;

        if tracing::enabled!(Level::TRACE) {
            let body = if self.settings.log_raw_data() {
                fields::format_body_preview(event.body())
            } else {
                fields::NONE.to_string()
            };
            trace!(
                event = events::RELAY_SEND_SUBMITTED,
                component = COMPONENT,
                relay_id = self.context.relay_id.as_str(),
                topic = topic.as_str(),
                partition = fields::format_partition(partition).as_str(),
                key = fields::format_key(key.as_deref()).as_str(),
                body = body.as_str(),
                "submitting record"
            );
        }

        let delivery = self.broker.send(OutboundRecord {
            topic: topic.clone(),
            partition,
            key,
            payload,
        })?;
        self.counters.increment_event_drain_attempt();

        self.pending.push(PendingSend {
            topic,
            submitted_at: Instant::now(),
            delivery,
        });

        Ok(())
    }

    async fn await_acknowledgments(&mut self) -> Result<(), BrokerError> {
        let mut in_flight: FuturesUnordered<_> = self
            .pending
            .drain(..)
            .map(|pending| async move {
                let result = pending.delivery.await;
                (pending.topic, pending.submitted_at, result)
            })
            .collect();

        while let Some((topic, submitted_at, result)) = in_flight.next().await {
            let ack = result?;
            trace!(
                event = events::RELAY_SEND_ACKED,
                component = COMPONENT,
                relay_id = self.context.relay_id.as_str(),
                topic = topic.as_str(),
                partition = ack.partition,
                offset = ack.offset,
                latency_ms = submitted_at.elapsed().as_millis() as u64,
                "record acknowledged"
            );
        }

        Ok(())
    }

    fn delivery_failed(&self, pulled: usize, elapsed: Duration, cause: DeliveryCause) -> RelayError {
        warn!(
            event = events::RELAY_BATCH_FAILED,
            component = COMPONENT,
            relay_id = self.context.relay_id.as_str(),
            events = pulled,
            elapsed_ms = elapsed.as_millis() as u64,
            err = %cause,
            "failed to publish events"
        );

        RelayError::Delivery {
            events: pulled,
            elapsed,
            cause,
        }
    }

    /// Releases the broker client. The relay must not be invoked afterwards.
    pub async fn close(&mut self) -> Result<(), BrokerError> {
        let result = self.broker.close().await;
        match &result {
            Ok(()) => info!(
                event = events::RELAY_BROKER_CLOSED,
                component = COMPONENT,
                relay_id = self.context.relay_id.as_str(),
                counters = ?self.counters.snapshot(),
                "broker client closed"
            ),
            Err(err) => warn!(
                event = events::RELAY_BROKER_CLOSE_FAILED,
                component = COMPONENT,
                relay_id = self.context.relay_id.as_str(),
                err = %err,
                "broker client close failed"
            ),
        }
        result
    }
}
