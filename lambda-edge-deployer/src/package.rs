/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::DeployError;
use anyhow::{Context, Result};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Zips every file under `dir`, with entry names relative to `dir`.
///
/// Entries are written in file name order with a fixed timestamp, so packaging
/// the same tree twice produces the same bytes.
pub fn archive_directory(dir: &Path) -> Result<Vec<u8>> {
    if !dir.is_dir() {
        return Err(DeployError::EmptySource(dir.display().to_string()).into());
    }

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut file_count = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context(here!("walk source directory"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .context(here!("entry outside source directory"))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        debug!(entry = %name, "adding to archive");

        zip.start_file(name, options).context(here!())?;
        zip.write_all(&fs::read(entry.path()).context(here!("read source file"))?)
            .context(here!())?;
        file_count += 1;
    }
    if file_count == 0 {
        return Err(DeployError::EmptySource(dir.display().to_string()).into());
    }

    let bytes = zip.finish().context(here!())?.into_inner();
    info!(
        "Packaged {} file(s) from {} ({} bytes)",
        file_count,
        dir.display(),
        bytes.len()
    );
    Ok(bytes)
}
