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

use std::collections::HashMap;

///
/// [`Event`] is the unit carried from the channel to the broker: a header map and an
/// opaque body. Events are never mutated once handed to a channel.
///
/// # Examples
///
/// ```
/// use channel_relay::Event;
///
/// let event = Event::new("1.3|1000|orders|1512716506169".as_bytes().to_vec())
///     .with_header("key", "customer-42");
///
/// assert_eq!(event.header("key"), Some("customer-42"));
/// assert!(event.header("topic").is_none());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Event {
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Event {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn from_parts(headers: HashMap<String, String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Builder-style header insertion, used while an event is being assembled.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
