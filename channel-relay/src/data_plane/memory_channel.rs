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

//! Bounded in-memory [`Channel`] with take/commit/rollback transactions.

use crate::{Channel, ChannelError, Event, Transaction};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ChannelState {
    queue: VecDeque<Event>,
    // Taken by an open transaction; still counted against capacity until commit.
    in_flight: usize,
}

fn lock(state: &Mutex<ChannelState>) -> MutexGuard<'_, ChannelState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A bounded FIFO channel held in process memory.
///
/// Events taken by a transaction keep occupying capacity until the transaction
/// commits. Rolling back, or ending without a commit, puts them back at the head of
/// the queue in their original order.
#[derive(Clone, Debug)]
pub struct MemoryChannel {
    capacity: usize,
    state: Arc<Mutex<ChannelState>>,
}

impl MemoryChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Arc::new(Mutex::new(ChannelState::default())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an event to the tail of the channel.
    pub async fn put(&self, event: Event) -> Result<(), ChannelError> {
        let mut state = lock(&self.state);
        if state.queue.len() + state.in_flight >= self.capacity {
            return Err(ChannelError::Full {
                capacity: self.capacity,
            });
        }
        state.queue.push_back(event);
        Ok(())
    }

    /// Number of events waiting to be taken.
    pub async fn len(&self) -> usize {
        lock(&self.state).queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        lock(&self.state).queue.is_empty()
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, ChannelError> {
        Ok(Box::new(MemoryTransaction {
            state: self.state.clone(),
            taken: Vec::new(),
            open: true,
        }))
    }
}

struct MemoryTransaction {
    state: Arc<Mutex<ChannelState>>,
    taken: Vec<Event>,
    open: bool,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> Result<(), ChannelError> {
        if self.open {
            Ok(())
        } else {
            Err(ChannelError::TransactionClosed)
        }
    }

    fn restore_taken(&mut self) {
        let mut state = lock(&self.state);
        state.in_flight -= self.taken.len();
        for event in self.taken.drain(..).rev() {
            state.queue.push_front(event);
        }
        self.open = false;
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn take(&mut self) -> Result<Option<Event>, ChannelError> {
        self.ensure_open()?;

        let mut state = lock(&self.state);
        let Some(event) = state.queue.pop_front() else {
            return Ok(None);
        };
        state.in_flight += 1;
        drop(state);

        self.taken.push(event.clone());
        Ok(Some(event))
    }

    async fn commit(&mut self) -> Result<(), ChannelError> {
        self.ensure_open()?;

        lock(&self.state).in_flight -= self.taken.len();
        self.taken.clear();
        self.open = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ChannelError> {
        self.ensure_open()?;
        self.restore_taken();
        Ok(())
    }

    fn end(mut self: Box<Self>) {
        if self.open {
            self.restore_taken();
        }
    }
}
