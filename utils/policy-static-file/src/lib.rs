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

//! [`PolicySource`] backed by a JSON file on disk.
//!
//! The file's modification time is the revision marker: editing the file in place
//! (or atomically replacing it) makes the next watcher check fetch it again.

use async_trait::async_trait;
use channel_relay::{PolicyError, PolicySource};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub struct PolicyStaticFile {
    path: PathBuf,
}

impl PolicyStaticFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PolicyStaticFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, err: std::io::Error) -> PolicyError {
        PolicyError::Source(format!("{}: {err}", self.path.display()))
    }
}

#[async_trait]
impl PolicySource for PolicyStaticFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn modified(&self) -> Result<SystemTime, PolicyError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|err| self.source_error(err))?;
        let modified = metadata.modified().map_err(|err| self.source_error(err))?;

        debug!("policy file {:?} modified at {modified:?}", self.path);
        Ok(modified)
    }

    async fn read(&self) -> Result<Vec<u8>, PolicyError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|err| self.source_error(err))
    }
}
