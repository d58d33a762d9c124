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

use channel_relay::Event;

/// Pipe-delimited line whose third field is `topic`, e.g. `1.3|1000|orders|...`.
pub fn body_line(topic: &str, sequence: u64) -> String {
    format!("1.3|1000|{topic}|{}|windows|0|12000103|{sequence}", 1_512_716_506_169u64 + sequence)
}

/// Event routed by its body only.
pub fn topic_event(topic: &str, sequence: u64) -> Event {
    Event::new(body_line(topic, sequence).into_bytes())
}

/// Event routed by the `topic` header; the body does not match the line pattern.
pub fn header_routed_event(topic: &str, body: &str) -> Event {
    Event::new(body.as_bytes().to_vec()).with_header("topic", topic)
}

/// Body-routed event carrying a message key.
pub fn keyed_event(topic: &str, key: &str, sequence: u64) -> Event {
    topic_event(topic, sequence).with_header("key", key)
}
