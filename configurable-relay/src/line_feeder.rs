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

//! Feeds the lines of an input file into a [`MemoryChannel`], one event per line.

use channel_relay::{ChannelError, Event, MemoryChannel};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const FULL_CHANNEL_RETRY: Duration = Duration::from_millis(50);

/// Puts every non-empty line of `path` into `channel`, waiting while the channel is full.
///
/// Returns the number of events fed, stopping early when `cancel` fires.
pub async fn feed_lines(
    path: &Path,
    channel: &MemoryChannel,
    cancel: &CancellationToken,
) -> std::io::Result<usize> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut fed = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event = Event::new(line.into_bytes());
        loop {
            match channel.put(event.clone()).await {
                Ok(()) => break,
                Err(ChannelError::Full { .. }) => {
                    debug!("channel full after {fed} events; waiting");
                    tokio::select! {
                        _ = tokio::time::sleep(FULL_CHANNEL_RETRY) => {}
                        _ = cancel.cancelled() => return Ok(fed),
                    }
                }
                Err(err) => return Err(std::io::Error::other(err)),
            }
        }
        fed += 1;
    }

    info!("fed {fed} events from {}", path.display());
    Ok(fed)
}
