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

//! Outbound payload encoding.
//!
//! The envelope is protobuf wire-compatible with
//!
//! ```text
//! message RelayEnvelope {
//!   map<string, string> headers = 1;
//!   bytes body = 2;
//! }
//! ```
//!
//! so downstream consumers can decode it with any protobuf runtime.

use crate::{EnvelopeError, Event};
use protobuf::{CodedInputStream, CodedOutputStream};
use std::collections::HashMap;

const HEADERS_FIELD: u32 = 1;
const BODY_FIELD: u32 = 2;
const ENTRY_KEY_FIELD: u32 = 1;
const ENTRY_VALUE_FIELD: u32 = 2;
const WIRE_TYPE_LENGTH_DELIMITED: u32 = 2;

/// How events are turned into broker payloads.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SerializerMode {
    /// The event body, unchanged.
    #[default]
    Raw,
    /// Headers and body in a `RelayEnvelope` message.
    Envelope,
}

/// Encodes events for publication, reusing one scratch buffer across calls.
#[derive(Debug, Default)]
pub struct Serializer {
    mode: SerializerMode,
    scratch: Vec<u8>,
}

impl Serializer {
    pub fn new(mode: SerializerMode) -> Self {
        Self {
            mode,
            scratch: Vec::new(),
        }
    }

    pub fn mode(&self) -> SerializerMode {
        self.mode
    }

    pub fn serialize(&mut self, event: &Event) -> Result<Vec<u8>, EnvelopeError> {
        match self.mode {
            SerializerMode::Raw => Ok(event.body().to_vec()),
            SerializerMode::Envelope => {
                self.scratch.clear();
                write_envelope(&mut self.scratch, event)?;
                Ok(self.scratch.clone())
            }
        }
    }
}

fn tag(field: u32) -> u32 {
    (field << 3) | WIRE_TYPE_LENGTH_DELIMITED
}

fn varint_len(mut value: u64) -> u64 {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

fn length_delimited_field_len(payload_len: usize) -> u64 {
    // Single-byte tag: field numbers used here are all below 16.
    1 + varint_len(payload_len as u64) + payload_len as u64
}

fn write_envelope(buffer: &mut Vec<u8>, event: &Event) -> Result<(), EnvelopeError> {
    // Sorted so identical events always produce identical bytes.
    let mut headers: Vec<(&String, &String)> = event.headers().iter().collect();
    headers.sort_unstable();

    let mut os = CodedOutputStream::vec(buffer);
    for (name, value) in headers {
        let entry_len = length_delimited_field_len(name.len())
            + length_delimited_field_len(value.len());

        os.write_raw_varint32(tag(HEADERS_FIELD))?;
        os.write_raw_varint64(entry_len)?;
        os.write_string(ENTRY_KEY_FIELD, name)?;
        os.write_string(ENTRY_VALUE_FIELD, value)?;
    }
    os.write_bytes(BODY_FIELD, event.body())?;
    os.flush()?;

    Ok(())
}

fn read_header_entry(entry: &[u8]) -> Result<(String, String), EnvelopeError> {
    let mut is = CodedInputStream::from_bytes(entry);
    let mut name = String::new();
    let mut value = String::new();

    while let Some(raw_tag) = is.read_raw_tag_or_eof()? {
        match (raw_tag >> 3, raw_tag & 0x7) {
            (ENTRY_KEY_FIELD, WIRE_TYPE_LENGTH_DELIMITED) => name = is.read_string()?,
            (ENTRY_VALUE_FIELD, WIRE_TYPE_LENGTH_DELIMITED) => value = is.read_string()?,
            (field, wire_type) => {
                return Err(EnvelopeError::UnexpectedField { field, wire_type });
            }
        }
    }

    Ok((name, value))
}

/// Reconstructs the event carried by an envelope payload.
pub fn decode_envelope(bytes: &[u8]) -> Result<Event, EnvelopeError> {
    let mut is = CodedInputStream::from_bytes(bytes);
    let mut headers = HashMap::new();
    let mut body = Vec::new();

    while let Some(raw_tag) = is.read_raw_tag_or_eof()? {
        match (raw_tag >> 3, raw_tag & 0x7) {
            (HEADERS_FIELD, WIRE_TYPE_LENGTH_DELIMITED) => {
                let entry = is.read_bytes()?;
                let (name, value) = read_header_entry(&entry)?;
                headers.insert(name, value);
            }
            (BODY_FIELD, WIRE_TYPE_LENGTH_DELIMITED) => body = is.read_bytes()?,
            (field, wire_type) => {
                return Err(EnvelopeError::UnexpectedField { field, wire_type });
            }
        }
    }

    Ok(Event::from_parts(headers, body))
}

#[cfg(test)]
mod tests {
    use super::{decode_envelope, varint_len, Serializer, SerializerMode};
    use crate::{EnvelopeError, Event};

    fn login_event() -> Event {
        Event::new(b"1.3|1000|log_login|1512716506169|".to_vec())
            .with_header("topic", "log_login")
            .with_header("key", "device-17")
    }

    #[test]
    fn raw_mode_passes_body_through() {
        let mut serializer = Serializer::new(SerializerMode::Raw);
        let event = login_event();

        assert_eq!(serializer.serialize(&event).unwrap(), event.body());
    }

    #[test]
    fn envelope_preserves_headers_and_body() {
        let mut serializer = Serializer::new(SerializerMode::Envelope);
        let event = login_event();

        let payload = serializer.serialize(&event).unwrap();

        assert_eq!(decode_envelope(&payload).unwrap(), event);
    }

    #[test]
    fn envelope_does_not_leak_previous_event() {
        let mut serializer = Serializer::new(SerializerMode::Envelope);
        let large = Event::new(vec![b'x'; 4096])
            .with_header("trace", "a".repeat(512))
            .with_header("topic", "bulk");
        let small = Event::new(b"tiny".to_vec());

        let _ = serializer.serialize(&large).unwrap();
        let payload = serializer.serialize(&small).unwrap();

        let decoded = decode_envelope(&payload).unwrap();
        assert_eq!(decoded, small);
        assert!(decoded.headers().is_empty());
        assert_eq!(payload, Serializer::new(SerializerMode::Envelope).serialize(&small).unwrap());
    }

    #[test]
    fn envelope_bytes_are_stable_for_equal_events() {
        let mut serializer = Serializer::new(SerializerMode::Envelope);
        let first = Event::new(b"body".to_vec())
            .with_header("b", "2")
            .with_header("a", "1");
        let second = Event::new(b"body".to_vec())
            .with_header("a", "1")
            .with_header("b", "2");

        assert_eq!(
            serializer.serialize(&first).unwrap(),
            serializer.serialize(&second).unwrap()
        );
    }

    #[test]
    fn envelope_matches_protobuf_layout() {
        let mut serializer = Serializer::new(SerializerMode::Envelope);
        let event = Event::new(b"hi".to_vec()).with_header("k", "v");

        let payload = serializer.serialize(&event).unwrap();

        assert_eq!(
            payload,
            vec![0x0A, 0x06, 0x0A, 0x01, b'k', 0x12, 0x01, b'v', 0x12, 0x02, b'h', b'i']
        );
    }

    #[test]
    fn decode_rejects_unknown_fields() {
        // field 3, varint wire type
        let err = decode_envelope(&[0x18, 0x01]).expect_err("field 3 is not part of the envelope");

        assert!(matches!(
            err,
            EnvelopeError::UnexpectedField {
                field: 3,
                wire_type: 0
            }
        ));
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        assert!(decode_envelope(&[0x12, 0x05, b'a']).is_err());
    }

    #[test]
    fn varint_len_matches_encoding_width() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(16_383), 2);
        assert_eq!(varint_len(16_384), 3);
    }
}
