//! Concat-demuxer manifest: rendering and the scoped temp file holding it.
//!
//! ffmpeg fails on very long argument lists, so segment addresses are handed
//! over through a list file instead. The file gets a unique name per run and
//! is removed when the `Manifest` is dropped unless `keep` is called.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MANIFEST_PREFIX: &str = "segmerge-";
const MANIFEST_SUFFIX: &str = ".txt";

/// Quotes an address for a `file '...'` directive. A literal `'` becomes
/// `'\''` (close, escaped quote, reopen).
pub fn quote_address(address: &str) -> String {
    format!("'{}'", address.replace('\'', r"'\''"))
}

/// Renders one `file '<address>'` line per address, newline-joined.
pub fn render_manifest<S: AsRef<str>>(addresses: &[S]) -> String {
    addresses
        .iter()
        .map(|a| format!("file {}", quote_address(a.as_ref())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Manifest written to disk. Deleted on drop.
#[derive(Debug)]
pub struct Manifest {
    file: NamedTempFile,
    lines: usize,
}

impl Manifest {
    /// Writes the manifest for `addresses` to a fresh file in `dir`.
    pub fn write<S: AsRef<str>>(dir: &Path, addresses: &[S]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(MANIFEST_PREFIX)
            .suffix(MANIFEST_SUFFIX)
            .tempfile_in(dir)
            .with_context(|| format!("failed to create manifest in {}", dir.display()))?;
        file.write_all(render_manifest(addresses).as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| format!("failed to write manifest {}", file.path().display()))?;
        tracing::debug!(path = %file.path().display(), lines = addresses.len(), "manifest written");
        Ok(Manifest {
            file,
            lines: addresses.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of `file` lines in the manifest.
    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Removes the file now, surfacing any delete error.
    pub fn remove(self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .with_context(|| format!("failed to remove manifest {}", path.display()))
    }

    /// Leaves the file on disk and returns its path.
    pub fn keep(self) -> Result<PathBuf> {
        self.file
            .into_temp_path()
            .keep()
            .context("failed to keep manifest")
    }
}
