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

//! Publish-side contract consumed by the relay.

use crate::BrokerError;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// One routed, serialized event ready for submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutboundRecord {
    pub topic: String,
    /// `None` leaves partition selection to the broker client.
    pub partition: Option<i32>,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

/// Broker acknowledgment for one delivered record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveryAck {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Handle resolved by the broker client once a submitted record is acknowledged or fails.
pub type DeliveryFuture = BoxFuture<'static, Result<DeliveryAck, BrokerError>>;

/// Client of the external publish-subscribe broker.
///
/// Implementations own connection management, retries and the wire protocol. `send` must
/// not wait for the acknowledgment: it hands the record to the client and returns a
/// [`DeliveryFuture`] the relay awaits later, so that every record of a batch can be in
/// flight at the same time.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Submits one record. An `Err` means the record was not accepted at all.
    fn send(&self, record: OutboundRecord) -> Result<DeliveryFuture, BrokerError>;

    /// Forces any client-side buffering to be transmitted immediately.
    async fn flush(&self) -> Result<(), BrokerError>;

    /// Releases client resources. No `send` is issued after `close`.
    async fn close(&self) -> Result<(), BrokerError>;
}
