//! Destination topic derivation per event.

use crate::{Event, DEFAULT_TOPIC_HEADER};
use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    /// `<major>.<minor>|<numeric id>|<topic>|...`, e.g. `1.3|1000|log_login|1512716506169|...`.
    static ref BODY_TOPIC_PATTERN: Regex = Regex::new(r"^\d+.\d+\|\d+\|([a-zA-Z0-9_-]*)\|")
        .expect("Invalid body topic pattern");
}

/// Resolves the topic of an event from its topic header or, failing that, its body.
#[derive(Clone, Debug)]
pub struct TopicResolver {
    topic_header: String,
}

impl Default for TopicResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_HEADER)
    }
}

impl TopicResolver {
    pub fn new(topic_header: impl Into<String>) -> Self {
        Self {
            topic_header: topic_header.into(),
        }
    }

    /// Returns the header value verbatim when the header is present (even if empty),
    /// otherwise the topic field of a pipe-delimited body, otherwise `None`.
    pub fn resolve(&self, event: &Event) -> Option<String> {
        if let Some(topic) = event.header(&self.topic_header) {
            return Some(topic.to_string());
        }

        BODY_TOPIC_PATTERN
            .captures(event.body())
            .and_then(|captures| captures.get(1))
            .map(|topic| String::from_utf8_lossy(topic.as_bytes()).into_owned())
    }
}
