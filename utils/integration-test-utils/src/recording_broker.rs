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
use channel_relay::{BrokerClient, BrokerError, DeliveryAck, DeliveryFuture, OutboundRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// How the broker answers a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeliveryBehavior {
    /// Acknowledge immediately.
    Ack,
    /// Acknowledge after a delay.
    Delayed(Duration),
    /// Accept the record, then fail its delivery.
    Nack(String),
    /// Refuse the record at submission.
    Reject(String),
}

/// In-memory [`BrokerClient`] that records every submitted record.
pub struct RecordingBroker {
    default_behavior: DeliveryBehavior,
    topic_behavior: HashMap<String, DeliveryBehavior>,
    fail_flush: bool,
    records: Mutex<Vec<OutboundRecord>>,
    next_offset: AtomicI64,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    flushes: AtomicUsize,
    closed: AtomicBool,
}

impl Default for RecordingBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBroker {
    /// A broker that acknowledges everything.
    pub fn new() -> Self {
        Self::with_default(DeliveryBehavior::Ack)
    }

    pub fn with_default(behavior: DeliveryBehavior) -> Self {
        Self {
            default_behavior: behavior,
            topic_behavior: HashMap::new(),
            fail_flush: false,
            records: Mutex::new(Vec::new()),
            next_offset: AtomicI64::new(0),
            in_flight: Default::default(),
            max_in_flight: Default::default(),
            flushes: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Overrides the behavior for one topic.
    pub fn on_topic(mut self, topic: &str, behavior: DeliveryBehavior) -> Self {
        self.topic_behavior.insert(topic.to_string(), behavior);
        self
    }

    pub fn failing_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    pub fn records(&self) -> Vec<OutboundRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|record| record.topic.clone())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Highest number of deliveries that were pending at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, topic: &str) -> DeliveryBehavior {
        self.topic_behavior
            .get(topic)
            .unwrap_or(&self.default_behavior)
            .clone()
    }
}

#[async_trait]
impl BrokerClient for RecordingBroker {
    fn send(&self, record: OutboundRecord) -> Result<DeliveryFuture, BrokerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrokerError::Closed);
        }

        let behavior = self.behavior_for(&record.topic);
        if let DeliveryBehavior::Reject(reason) = behavior {
            return Err(BrokerError::Rejected {
                topic: record.topic,
                reason,
            });
        }

        let topic = record.topic.clone();
        let partition = record.partition.unwrap_or(0);
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        debug!("recording record #{offset} for topic {topic}");
        self.records.lock().unwrap().push(record);

        let in_flight = self.in_flight.clone();
        let max_in_flight = self.max_in_flight.clone();
        let pending = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(pending, Ordering::SeqCst);

        Ok(Box::pin(async move {
            let result = match behavior {
                DeliveryBehavior::Ack => Ok(()),
                DeliveryBehavior::Delayed(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
                DeliveryBehavior::Nack(reason) => Err(reason),
                DeliveryBehavior::Reject(_) => unreachable!("rejected at submission"),
            };
            in_flight.fetch_sub(1, Ordering::SeqCst);

            match result {
                Ok(()) => Ok(DeliveryAck {
                    topic,
                    partition,
                    offset,
                }),
                Err(reason) => Err(BrokerError::NotAcknowledged { topic, reason }),
            }
        }))
    }

    async fn flush(&self) -> Result<(), BrokerError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush {
            return Err(BrokerError::Flush("broker connection reset".to_string()));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
