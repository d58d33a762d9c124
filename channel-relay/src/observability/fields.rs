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

//! Canonical structured field keys and value-format helpers.

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const RELAY_ID: &str = "relay_id";
pub const TOPIC: &str = "topic";
pub const PARTITION: &str = "partition";
pub const KEY: &str = "key";
pub const EVENTS: &str = "events";
pub const ELAPSED_MS: &str = "elapsed_ms";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_NO_TOPIC: &str = "no_topic";
pub const REASON_TOPIC_NOT_ALLOWED: &str = "topic_not_allowed";
pub const REASON_KEEP_PREVIOUS_POLICY: &str = "keep_previous_policy";

const BODY_PREVIEW_MAX_BYTES: usize = 256;

/// Correlation identity attached to every log line of one relay instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayContext {
    pub relay_id: String,
}

impl RelayContext {
    pub fn new(relay_id: impl Into<String>) -> Self {
        Self {
            relay_id: relay_id.into(),
        }
    }

    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().hyphenated().to_string())
    }
}

pub fn format_partition(partition: Option<i32>) -> String {
    partition
        .map(|partition| partition.to_string())
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_key(key: Option<&str>) -> String {
    key.unwrap_or(NONE).to_string()
}

/// Lossy, length-capped rendering of an event body for trace logs.
pub fn format_body_preview(body: &[u8]) -> String {
    let end = body.len().min(BODY_PREVIEW_MAX_BYTES);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
