// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-scoped temporary files
//!
//! A `ScopedTempFile` owns one path under the work directory and removes it
//! when dropped, so every exit path of a request releases its files. Names
//! are derived from the client filename; identical names in concurrent
//! requests share a path.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name used when the client sends no usable filename
pub const FALLBACK_FILENAME: &str = "upload";

/// Reduce a client-supplied filename to a single safe path component
pub fn sanitize_filename(raw: &str) -> String {
    let last = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if last.is_empty() || last == "." || last == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        last.to_string()
    }
}

#[derive(Debug)]
pub struct ScopedTempFile {
    path: PathBuf,
}

impl ScopedTempFile {
    /// Path `{work_dir}/{prefix}_{filename}`; nothing is created yet
    pub fn reserve(work_dir: &Path, prefix: &str, filename: &str) -> Self {
        Self {
            path: work_dir.join(format!("{}_{}", prefix, sanitize_filename(filename))),
        }
    }

    /// Write `bytes` and return the guard owning the file
    pub async fn create(
        work_dir: &Path,
        prefix: &str,
        filename: &str,
        bytes: &[u8],
    ) -> io::Result<Self> {
        let file = Self::reserve(work_dir, prefix, filename);
        tokio::fs::write(&file.path, bytes).await?;
        debug!("Wrote temporary file {} ({} bytes)", file.path.display(), bytes.len());
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedTempFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
