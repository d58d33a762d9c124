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

//! Transactional queue contract consumed by the relay.

use crate::{ChannelError, Event};
use async_trait::async_trait;

/// A transactional, at-least-once local queue.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Opens a new transaction. At most one transaction per relay is live at a time.
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, ChannelError>;
}

/// A unit of work against a [`Channel`].
///
/// Events taken under a transaction are not consumed until `commit` succeeds; `rollback`
/// makes every taken event available for redelivery. `end` consumes the transaction and
/// therefore runs exactly once, after the commit or rollback.
#[async_trait]
pub trait Transaction: Send {
    /// Takes the next event, or `None` when the channel currently holds nothing.
    async fn take(&mut self) -> Result<Option<Event>, ChannelError>;

    async fn commit(&mut self) -> Result<(), ChannelError>;

    async fn rollback(&mut self) -> Result<(), ChannelError>;

    /// Releases the transaction.
    fn end(self: Box<Self>);
}
