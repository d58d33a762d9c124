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

use async_trait::async_trait;
use channel_relay::{Channel, ChannelError, Event, MemoryChannel, Transaction};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Failure a [`TrackedChannel`] injects into its transactions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelFault {
    Begin,
    /// Fails the take after `n` successful takes.
    TakeAfter(usize),
    Commit,
    Rollback,
}

/// Totals of transaction calls made against a [`TrackedChannel`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransactionStats {
    pub begun: usize,
    pub taken: usize,
    pub committed: usize,
    pub rolled_back: usize,
    pub ended: usize,
}

#[derive(Default)]
struct Counters {
    begun: AtomicUsize,
    taken: AtomicUsize,
    committed: AtomicUsize,
    rolled_back: AtomicUsize,
    ended: AtomicUsize,
}

/// [`MemoryChannel`] wrapper that counts transaction calls and can inject faults.
#[derive(Clone)]
pub struct TrackedChannel {
    inner: MemoryChannel,
    counters: Arc<Counters>,
    fault: Arc<Mutex<Option<ChannelFault>>>,
}

impl TrackedChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: MemoryChannel::new(capacity),
            counters: Arc::default(),
            fault: Arc::default(),
        }
    }

    pub fn inner(&self) -> &MemoryChannel {
        &self.inner
    }

    pub async fn put_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.inner
                .put(event)
                .await
                .expect("tracked channel capacity exceeded");
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    /// Injects `fault` into transactions begun from now on; `None` clears it.
    pub fn set_fault(&self, fault: Option<ChannelFault>) {
        *self.fault.lock().unwrap() = fault;
    }

    pub fn stats(&self) -> TransactionStats {
        TransactionStats {
            begun: self.counters.begun.load(Ordering::SeqCst),
            taken: self.counters.taken.load(Ordering::SeqCst),
            committed: self.counters.committed.load(Ordering::SeqCst),
            rolled_back: self.counters.rolled_back.load(Ordering::SeqCst),
            ended: self.counters.ended.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl Channel for TrackedChannel {
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, ChannelError> {
        let fault = *self.fault.lock().unwrap();
        if fault == Some(ChannelFault::Begin) {
            return Err(ChannelError::Other("injected begin failure".to_string()));
        }

        let inner = self.inner.begin_transaction().await?;
        self.counters.begun.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(TrackedTransaction {
            inner,
            counters: self.counters.clone(),
            fault,
            takes: 0,
        }))
    }
}

struct TrackedTransaction {
    inner: Box<dyn Transaction>,
    counters: Arc<Counters>,
    fault: Option<ChannelFault>,
    takes: usize,
}

#[async_trait]
impl Transaction for TrackedTransaction {
    async fn take(&mut self) -> Result<Option<Event>, ChannelError> {
        if matches!(self.fault, Some(ChannelFault::TakeAfter(limit)) if self.takes >= limit) {
            return Err(ChannelError::Other("injected take failure".to_string()));
        }

        let event = self.inner.take().await?;
        if event.is_some() {
            self.takes += 1;
            self.counters.taken.fetch_add(1, Ordering::SeqCst);
        }
        Ok(event)
    }

    async fn commit(&mut self) -> Result<(), ChannelError> {
        if self.fault == Some(ChannelFault::Commit) {
            return Err(ChannelError::Other("injected commit failure".to_string()));
        }
        self.inner.commit().await?;
        self.counters.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ChannelError> {
        if self.fault == Some(ChannelFault::Rollback) {
            return Err(ChannelError::Other("injected rollback failure".to_string()));
        }
        self.inner.rollback().await?;
        self.counters.rolled_back.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn end(self: Box<Self>) {
        let this = *self;
        this.counters.ended.fetch_add(1, Ordering::SeqCst);
        this.inner.end();
    }
}
