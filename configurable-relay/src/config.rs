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

use channel_relay::{ConfigError, RelaySettings, RunnerConfig, WatcherConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) relay: RelayConfig,
    pub(crate) policy: PolicyConfig,
    pub(crate) channel: ChannelConfig,
    #[serde(default)]
    pub(crate) runner: RunnerSection,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default)]
    pub(crate) bootstrap_servers: Option<String>,
    #[serde(default)]
    pub(crate) broker_list: Option<String>,
    #[serde(default)]
    pub(crate) static_partition: Option<i32>,
    #[serde(default)]
    pub(crate) partition_header: Option<String>,
    #[serde(default)]
    pub(crate) envelope: bool,
    #[serde(default)]
    pub(crate) topic_header: Option<String>,
    #[serde(default)]
    pub(crate) required_acks: Option<String>,
    #[serde(default)]
    pub(crate) producer_properties: BTreeMap<String, String>,
    #[serde(default = "default_disabled_pause_ms")]
    pub(crate) disabled_pause_ms: u64,
    #[serde(default)]
    pub(crate) log_raw_data: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub(crate) file_path: String,
    #[serde(default = "default_initial_delay_secs")]
    pub(crate) initial_delay_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub(crate) interval_secs: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub(crate) input_file: String,
    #[serde(default = "default_capacity")]
    pub(crate) capacity: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunnerSection {
    #[serde(default = "default_backoff_increment_ms")]
    pub(crate) backoff_increment_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub(crate) max_backoff_ms: u64,
    #[serde(default = "default_shutdown_deadline_ms")]
    pub(crate) shutdown_deadline_ms: u64,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            backoff_increment_ms: default_backoff_increment_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            shutdown_deadline_ms: default_shutdown_deadline_ms(),
        }
    }
}

fn default_disabled_pause_ms() -> u64 {
    1_000
}

fn default_initial_delay_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    30
}

fn default_capacity() -> usize {
    10_000
}

fn default_backoff_increment_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

fn default_shutdown_deadline_ms() -> u64 {
    10_000
}

impl RelayConfig {
    pub(crate) fn to_settings(&self) -> Result<RelaySettings, ConfigError> {
        let mut builder = RelaySettings::builder()
            .envelope(self.envelope)
            .disabled_pause(Duration::from_millis(self.disabled_pause_ms))
            .log_raw_data(self.log_raw_data);

        if let Some(servers) = &self.bootstrap_servers {
            builder = builder.bootstrap_servers(servers.as_str());
        }
        if let Some(servers) = &self.broker_list {
            builder = builder.broker_list(servers.as_str());
        }
        if let Some(partition) = self.static_partition {
            builder = builder.static_partition(partition);
        }
        if let Some(header) = &self.partition_header {
            builder = builder.partition_header(header.as_str());
        }
        if let Some(header) = &self.topic_header {
            builder = builder.topic_header(header.as_str());
        }
        if let Some(acks) = &self.required_acks {
            builder = builder.required_acks(acks.as_str());
        }
        for (name, value) in &self.producer_properties {
            builder = builder.producer_property(name.as_str(), value.as_str());
        }

        builder.build()
    }
}

impl PolicyConfig {
    pub(crate) fn watcher_config(&self) -> Result<WatcherConfig, ConfigError> {
        let config = WatcherConfig {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            interval: Duration::from_secs(self.interval_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

impl RunnerSection {
    pub(crate) fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            backoff_increment: Duration::from_millis(self.backoff_increment_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            shutdown_deadline: Duration::from_millis(self.shutdown_deadline_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use channel_relay::ConfigError;
    use std::time::Duration;

    const MINIMAL: &str = r#"{
        relay: { bootstrap_servers: "broker-1:9092, broker-2:9092" },
        policy: { file_path: "relay-policy.json" },
        channel: { input_file: "input.log" },
    }"#;

    #[test]
    fn default_config_file_parses() {
        let contents = include_str!("../DEFAULT_CONFIG.json5");

        let config: Config = json5::from_str(contents).unwrap();
        let settings = config.relay.to_settings().unwrap();

        assert_eq!(settings.bootstrap_servers(), ["localhost:9092"]);
        assert_eq!(settings.producer_properties()["acks"], "all");
        assert_eq!(config.channel.capacity, 10_000);
    }

    #[test]
    fn omitted_sections_take_defaults() {
        let config: Config = json5::from_str(MINIMAL).unwrap();

        let settings = config.relay.to_settings().unwrap();
        assert_eq!(settings.bootstrap_servers(), ["broker-1:9092", "broker-2:9092"]);
        assert_eq!(settings.topic_header(), "topic");
        assert_eq!(settings.disabled_pause(), Duration::from_secs(1));

        let watcher = config.policy.watcher_config().unwrap();
        assert_eq!(watcher.initial_delay, Duration::from_secs(10));
        assert_eq!(watcher.interval, Duration::from_secs(30));

        let runner = config.runner.runner_config();
        assert_eq!(runner.max_backoff, Duration::from_secs(5));
    }

    #[test]
    fn missing_bootstrap_servers_is_rejected() {
        let config: Config = json5::from_str(
            r#"{ relay: {}, policy: { file_path: "p.json" }, channel: { input_file: "in.log" } }"#,
        )
        .unwrap();

        assert!(matches!(
            config.relay.to_settings(),
            Err(ConfigError::MissingBootstrapServers)
        ));
    }

    #[test]
    fn zero_check_interval_is_rejected() {
        let config: Config = json5::from_str(
            r#"{ relay: { bootstrap_servers: "b:9092" }, policy: { file_path: "p.json", interval_secs: 0 }, channel: { input_file: "in.log" } }"#,
        )
        .unwrap();

        assert!(matches!(
            config.policy.watcher_config(),
            Err(ConfigError::ZeroCheckInterval)
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = json5::from_str(
            r#"{ relay: { bootstrap_servers: "b:9092", batch_size: 5 }, policy: { file_path: "p.json" }, channel: { input_file: "in.log" } }"#,
        );

        assert!(result.is_err());
    }
}
