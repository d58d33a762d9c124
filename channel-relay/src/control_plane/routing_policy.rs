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

//! Immutable routing policy snapshot and its JSON decoding.

use crate::PolicyError;
use serde::Deserialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;

pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Routing and throttling policy in force for relay invocations.
///
/// A policy is never modified after construction. A new revision is published as a new
/// value through the [`PolicyStore`](crate::PolicyStore).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingPolicy {
    enabled: bool,
    topics: HashSet<String>,
    batch_size: NonZeroUsize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDocument {
    #[serde(alias = "switchOn")]
    enabled: bool,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default = "default_batch_size")]
    batch_size: i64,
}

fn default_batch_size() -> i64 {
    DEFAULT_BATCH_SIZE
}

impl RoutingPolicy {
    /// Builds a policy. Empty topic names are dropped; a non-positive batch size is rejected.
    pub fn new<I, S>(enabled: bool, topics: I, batch_size: i64) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch_size = usize::try_from(batch_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(PolicyError::InvalidBatchSize(batch_size))?;

        let topics = topics
            .into_iter()
            .map(Into::into)
            .filter(|topic: &String| !topic.is_empty())
            .collect();

        Ok(Self {
            enabled,
            topics,
            batch_size,
        })
    }

    /// Decodes a policy document such as
    /// `{"enabled": true, "topics": ["orders"], "batchSize": 100}`.
    ///
    /// The legacy key `switchOn` is accepted in place of `enabled`, and `batchSize`
    /// defaults to [`DEFAULT_BATCH_SIZE`].
    pub fn decode(bytes: &[u8]) -> Result<Self, PolicyError> {
        let document: PolicyDocument = serde_json::from_slice(bytes)?;
        Self::new(document.enabled, document.topics, document.batch_size)
    }

    /// A policy that keeps the relay quiesced.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            topics: HashSet::new(),
            batch_size: NonZeroUsize::MIN,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    pub fn topics(&self) -> &HashSet<String> {
        &self.topics
    }

    /// Returns `true` when `topic` is on the allow-list.
    pub fn allows(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}
