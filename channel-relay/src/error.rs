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

//! Error taxonomy shared by the relay, its collaborators and the policy watcher.

use crate::BatchOutcome;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`Channel`](crate::Channel) or one of its transactions.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("transaction is no longer open")]
    TransactionClosed,

    #[error("channel operation failed: {0}")]
    Other(String),
}

/// Failures reported by a [`BrokerClient`](crate::BrokerClient) on submission, flush or
/// acknowledgment.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BrokerError {
    #[error("broker rejected record for topic '{topic}': {reason}")]
    Rejected { topic: String, reason: String },

    #[error("delivery to topic '{topic}' was not acknowledged: {reason}")]
    NotAcknowledged { topic: String, reason: String },

    #[error("flush failed: {0}")]
    Flush(String),

    #[error("broker client is closed")]
    Closed,
}

/// Per-event routing failures. Any of these aborts the whole batch.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("non integer partition id '{value}' in header '{header}'")]
    InvalidPartition {
        header: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Envelope encoding and decoding failures.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope codec failure: {0}")]
    Codec(#[from] protobuf::Error),

    #[error("unexpected envelope field {field} with wire type {wire_type}")]
    UnexpectedField { field: u32, wire_type: u32 },
}

/// Failures while fetching or decoding a routing policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("malformed policy document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("batch size must be positive, got {0}")]
    InvalidBatchSize(i64),

    #[error("policy source unavailable: {0}")]
    Source(String),
}

/// Startup configuration failures. These are fatal: the relay refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bootstrap servers must be specified")]
    MissingBootstrapServers,

    #[error("initial routing policy could not be loaded: {0}")]
    InitialPolicy(#[source] PolicyError),

    #[error("policy check interval must be positive")]
    ZeroCheckInterval,
}

/// The reason a batch was aborted and rolled back.
#[derive(Debug, Error)]
pub enum DeliveryCause {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Error surfaced by one relay invocation.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The batch was rolled back; the caller should back off and invoke again.
    #[error("failed to publish events ({events} pulled in {elapsed:?})")]
    Delivery {
        events: usize,
        elapsed: Duration,
        #[source]
        cause: DeliveryCause,
    },

    /// The channel could not be rolled back and is in an unknown state.
    #[error("transaction rollback failed")]
    RollbackFailed(#[source] ChannelError),

    /// The runner stopped cleanly but could not release the broker client.
    #[error("broker client close failed")]
    Close(#[source] BrokerError),
}

impl RelayError {
    /// Outcome the caller should act on after this error.
    pub fn outcome(&self) -> BatchOutcome {
        BatchOutcome::Backoff
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RelayError::RollbackFailed(_))
    }
}
