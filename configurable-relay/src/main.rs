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

mod config;
mod line_feeder;
mod stdout_broker;

use crate::config::Config;
use crate::stdout_broker::StdoutBroker;
use channel_relay::{
    BatchRelay, ConfigError, ConfigWatcher, MemoryChannel, PolicySource, RelayError, RelayRunner,
};
use clap::Parser;
use policy_static_file::PolicyStaticFile;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command()]
struct RelayArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config file: {0}")]
    Parse(#[from] json5::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("relay task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    info!("Started configurable-relay");

    let args = RelayArgs::parse();
    let contents = tokio::fs::read_to_string(&args.config).await?;
    let config: Config = json5::from_str(&contents)?;

    let settings = config.relay.to_settings()?;
    let source: Arc<dyn PolicySource> =
        Arc::new(PolicyStaticFile::new(config.policy.file_path.as_str()));
    let (watcher, store) =
        ConfigWatcher::load_initial(source, config.policy.watcher_config()?).await?;

    let cancel = CancellationToken::new();
    let watcher_handle = watcher.spawn(cancel.child_token());

    let channel = MemoryChannel::new(config.channel.capacity);
    let input = PathBuf::from(&config.channel.input_file);
    let feeder_channel = channel.clone();
    let feeder_cancel = cancel.child_token();
    let feeder_handle = tokio::spawn(async move {
        match line_feeder::feed_lines(&input, &feeder_channel, &feeder_cancel).await {
            Ok(fed) => info!("input exhausted after {fed} events"),
            Err(err) => error!("unable to feed {}: {err}", input.display()),
        }
    });

    let relay = BatchRelay::new(
        settings,
        Arc::new(channel),
        Arc::new(StdoutBroker::new()),
        store,
    );
    let counters = relay.counters();
    let runner = RelayRunner::new(relay, config.runner.runner_config());
    let mut runner_handle = runner.spawn(cancel.clone());

    let result = tokio::select! {
        joined = &mut runner_handle => joined,
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!("unable to listen for shutdown signal: {err}");
            }
            info!("shutdown requested");
            cancel.cancel();
            runner_handle.await
        }
    };

    cancel.cancel();
    feeder_handle.await?;
    watcher_handle.await?;

    info!("relay stopped: {:?}", counters.snapshot());
    result??;

    Ok(())
}
