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

use crate::observability::events;
use crate::ConfigError;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TOPIC_HEADER: &str = "topic";
pub const KEY_HEADER: &str = "key";

const BOOTSTRAP_SERVERS_PROPERTY: &str = "bootstrap.servers";
const ACKS_PROPERTY: &str = "acks";
const DEFAULT_ACKS: &str = "1";
const DEFAULT_DISABLED_PAUSE: Duration = Duration::from_secs(1);

const COMPONENT: &str = "relay_settings";

///
/// [`RelaySettings`] is the startup configuration of a [`BatchRelay`](crate::BatchRelay).
/// Unlike the [`RoutingPolicy`](crate::RoutingPolicy) it is fixed for the lifetime of
/// the relay.
///
/// # Examples
///
/// ```
/// use channel_relay::RelaySettings;
///
/// let settings = RelaySettings::builder()
///     .bootstrap_servers("broker-1:9092, broker-2:9092")
///     .static_partition(3)
///     .partition_header("partition")
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.bootstrap_servers().len(), 2);
/// assert_eq!(settings.producer_properties()["acks"], "1");
///
/// assert!(RelaySettings::builder().build().is_err());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelaySettings {
    bootstrap_servers: Vec<String>,
    static_partition: Option<i32>,
    partition_header: Option<String>,
    envelope: bool,
    topic_header: String,
    producer_properties: BTreeMap<String, String>,
    disabled_pause: Duration,
    log_raw_data: bool,
}

impl RelaySettings {
    pub fn builder() -> RelaySettingsBuilder {
        RelaySettingsBuilder::default()
    }

    pub fn bootstrap_servers(&self) -> &[String] {
        &self.bootstrap_servers
    }

    pub fn static_partition(&self) -> Option<i32> {
        self.static_partition
    }

    pub fn partition_header(&self) -> Option<&str> {
        self.partition_header.as_deref()
    }

    /// Whether events are wrapped in the header-preserving envelope.
    pub fn envelope(&self) -> bool {
        self.envelope
    }

    pub fn topic_header(&self) -> &str {
        &self.topic_header
    }

    /// Properties handed to the broker client, including `bootstrap.servers` and `acks`.
    pub fn producer_properties(&self) -> &BTreeMap<String, String> {
        &self.producer_properties
    }

    /// Pause taken by an invocation while the policy is disabled.
    pub fn disabled_pause(&self) -> Duration {
        self.disabled_pause
    }

    /// Whether event bodies may appear in trace logs.
    pub fn log_raw_data(&self) -> bool {
        self.log_raw_data
    }
}

#[derive(Clone, Debug, Default)]
pub struct RelaySettingsBuilder {
    bootstrap_servers: Option<String>,
    broker_list: Option<String>,
    static_partition: Option<i32>,
    partition_header: Option<String>,
    envelope: bool,
    topic_header: Option<String>,
    required_acks: Option<String>,
    producer_properties: BTreeMap<String, String>,
    disabled_pause: Option<Duration>,
    log_raw_data: bool,
}

impl RelaySettingsBuilder {
    /// Comma separated `host:port` list.
    pub fn bootstrap_servers(mut self, servers: impl Into<String>) -> Self {
        self.bootstrap_servers = Some(servers.into());
        self
    }

    /// Deprecated spelling of `bootstrap_servers`, used only when the latter is unset.
    pub fn broker_list(mut self, servers: impl Into<String>) -> Self {
        self.broker_list = Some(servers.into());
        self
    }

    pub fn static_partition(mut self, partition: i32) -> Self {
        self.static_partition = Some(partition);
        self
    }

    pub fn partition_header(mut self, header: impl Into<String>) -> Self {
        self.partition_header = Some(header.into());
        self
    }

    pub fn envelope(mut self, envelope: bool) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn topic_header(mut self, header: impl Into<String>) -> Self {
        self.topic_header = Some(header.into());
        self
    }

    /// Deprecated shortcut for the `acks` producer property.
    pub fn required_acks(mut self, acks: impl Into<String>) -> Self {
        self.required_acks = Some(acks.into());
        self
    }

    pub fn producer_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.producer_properties.insert(name.into(), value.into());
        self
    }

    pub fn disabled_pause(mut self, pause: Duration) -> Self {
        self.disabled_pause = Some(pause);
        self
    }

    pub fn log_raw_data(mut self, allow: bool) -> Self {
        self.log_raw_data = allow;
        self
    }

    pub fn build(self) -> Result<RelaySettings, ConfigError> {
        let servers = match (self.bootstrap_servers, self.broker_list) {
            (Some(servers), _) => servers,
            (None, Some(broker_list)) => {
                warn!(
                    event = events::CONFIG_DEPRECATED_KEY,
                    component = COMPONENT,
                    deprecated = "broker_list",
                    replacement = "bootstrap_servers",
                    "deprecated configuration key in use"
                );
                broker_list
            }
            (None, None) => return Err(ConfigError::MissingBootstrapServers),
        };

        let bootstrap_servers: Vec<String> = servers
            .split(',')
            .map(str::trim)
            .filter(|server| !server.is_empty())
            .map(str::to_string)
            .collect();
        if bootstrap_servers.is_empty() {
            return Err(ConfigError::MissingBootstrapServers);
        }

        let mut producer_properties = self.producer_properties;
        if !producer_properties.contains_key(ACKS_PROPERTY) {
            let acks = match self.required_acks.filter(|acks| !acks.is_empty()) {
                Some(acks) => {
                    warn!(
                        event = events::CONFIG_DEPRECATED_KEY,
                        component = COMPONENT,
                        deprecated = "required_acks",
                        replacement = "producer_properties.acks",
                        "deprecated configuration key in use"
                    );
                    acks
                }
                None => DEFAULT_ACKS.to_string(),
            };
            producer_properties.insert(ACKS_PROPERTY.to_string(), acks);
        }
        producer_properties.insert(
            BOOTSTRAP_SERVERS_PROPERTY.to_string(),
            bootstrap_servers.join(","),
        );

        Ok(RelaySettings {
            bootstrap_servers,
            static_partition: self.static_partition,
            partition_header: self.partition_header,
            envelope: self.envelope,
            topic_header: self
                .topic_header
                .unwrap_or_else(|| DEFAULT_TOPIC_HEADER.to_string()),
            producer_properties,
            disabled_pause: self.disabled_pause.unwrap_or(DEFAULT_DISABLED_PAUSE),
            log_raw_data: self.log_raw_data,
        })
    }
}
