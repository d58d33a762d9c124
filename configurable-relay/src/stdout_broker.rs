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
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Broker stand-in that prints every record to stdout and acknowledges it at once.
///
/// Offsets are assigned per topic and partition.
#[derive(Default)]
pub struct StdoutBroker {
    offsets: Mutex<HashMap<(String, i32), i64>>,
    closed: AtomicBool,
}

impl StdoutBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_offset(&self, topic: &str, partition: i32) -> i64 {
        let mut offsets = self
            .offsets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let offset = offsets.entry((topic.to_string(), partition)).or_insert(0);
        let assigned = *offset;
        *offset += 1;
        assigned
    }
}

pub(crate) fn render_record(record: &OutboundRecord, offset: i64) -> String {
    format!(
        "{}[{}]@{} key={} {}",
        record.topic,
        record
            .partition
            .map(|partition| partition.to_string())
            .unwrap_or_else(|| "-".to_string()),
        offset,
        record.key.as_deref().unwrap_or("-"),
        String::from_utf8_lossy(&record.payload)
    )
}

#[async_trait]
impl BrokerClient for StdoutBroker {
    fn send(&self, record: OutboundRecord) -> Result<DeliveryFuture, BrokerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BrokerError::Closed);
        }

        let partition = record.partition.unwrap_or(0);
        let offset = self.next_offset(&record.topic, partition);
        let line = render_record(&record, offset);

        let written = writeln!(std::io::stdout().lock(), "{line}");
        let topic = record.topic;
        Ok(Box::pin(async move {
            written.map_err(|err| BrokerError::NotAcknowledged {
                topic: topic.clone(),
                reason: err.to_string(),
            })?;
            Ok(DeliveryAck {
                topic,
                partition,
                offset,
            })
        }))
    }

    async fn flush(&self) -> Result<(), BrokerError> {
        std::io::stdout()
            .flush()
            .map_err(|err| BrokerError::Flush(err.to_string()))
    }

    async fn close(&self) -> Result<(), BrokerError> {
        debug!("closing stdout broker");
        self.closed.store(true, Ordering::SeqCst);
        self.flush().await
    }
}
