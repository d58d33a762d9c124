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

//! # channel-relay
//!
//! `channel-relay` moves events out of a transactional local [`Channel`] into a
//! publish-subscribe broker through a [`BrokerClient`], batch by batch, with
//! at-least-once delivery. The routing policy (on/off switch, topic allow-list and
//! batch size) lives in a [`PolicyStore`] and can be swapped at runtime by a
//! [`ConfigWatcher`] without restarting the relay.
//!
//! ## Relaying one batch
//!
//! ```
//! use std::sync::Arc;
//! use channel_relay::{
//!     BatchOutcome, BatchRelay, BrokerClient, BrokerError, DeliveryAck, DeliveryFuture,
//!     Event, MemoryChannel, OutboundRecord, PolicyStore, RelaySettings, RoutingPolicy,
//! };
//!
//! # struct AckingBroker;
//! #
//! # #[async_trait::async_trait]
//! # impl BrokerClient for AckingBroker {
//! #     fn send(&self, record: OutboundRecord) -> Result<DeliveryFuture, BrokerError> {
//! #         let ack = DeliveryAck { topic: record.topic, partition: record.partition.unwrap_or(0), offset: 0 };
//! #         Ok(Box::pin(async move { Ok(ack) }))
//! #     }
//! #     async fn flush(&self) -> Result<(), BrokerError> { Ok(()) }
//! #     async fn close(&self) -> Result<(), BrokerError> { Ok(()) }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let channel = Arc::new(MemoryChannel::new(16));
//! channel
//!     .put(Event::new("1.3|1000|orders|1512716506169|".as_bytes().to_vec()))
//!     .await
//!     .unwrap();
//!
//! let store = PolicyStore::new(RoutingPolicy::new(true, ["orders"], 100).unwrap());
//! let settings = RelaySettings::builder()
//!     .bootstrap_servers("broker-1:9092")
//!     .build()
//!     .unwrap();
//! let mut relay = BatchRelay::new(settings, channel.clone(), Arc::new(AckingBroker), store);
//!
//! assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
//! assert_eq!(relay.process().await.unwrap(), BatchOutcome::Backoff);
//! assert_eq!(relay.counters().snapshot().event_drain_success, 1);
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Control plane: routing policy snapshots, the atomic policy store and the watcher
//!   that refreshes it from a [`PolicySource`]
//! - Routing: topic and partition resolution per event
//! - Data plane: envelope serializer, the transactional batch relay and the in-memory
//!   channel
//! - Runtime: the polling runner that drives relay invocations with backoff
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod broker;
pub use broker::{BrokerClient, DeliveryAck, DeliveryFuture, OutboundRecord};

mod channel;
pub use channel::{Channel, Transaction};

mod control_plane;
pub use control_plane::config_watcher::{ConfigWatcher, PolicyCheck, PolicySource, WatcherConfig};
pub use control_plane::policy_store::PolicyStore;
pub use control_plane::routing_policy::{RoutingPolicy, DEFAULT_BATCH_SIZE};

mod data_plane;
pub use data_plane::batch_relay::{BatchOutcome, BatchRelay, RelayState};
pub use data_plane::memory_channel::MemoryChannel;
pub use data_plane::serializer::{decode_envelope, Serializer, SerializerMode};

mod error;
pub use error::{
    BrokerError, ChannelError, ConfigError, DeliveryCause, EnvelopeError, PolicyError,
    RelayError, RoutingError,
};

mod event;
pub use event::Event;

#[doc(hidden)]
pub mod observability;
pub use observability::counters::{CounterSnapshot, RelayCounters};

mod relay_settings;
pub use relay_settings::{RelaySettings, RelaySettingsBuilder, DEFAULT_TOPIC_HEADER, KEY_HEADER};

mod routing;
pub use routing::partition_resolution::PartitionResolver;
pub use routing::topic_resolution::TopicResolver;

mod runtime;
pub use runtime::relay_runner::{RelayRunner, RunnerConfig};
