//! Output file naming and the default download directory.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use std::path::{Path, PathBuf};

/// Offset used for output timestamps unless configured otherwise (UTC+9).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

const OUTPUT_PREFIX: &str = "output_";
const OUTPUT_EXT: &str = "mp4";

/// Builds a fixed offset from whole hours. Fails outside -23..=23.
pub fn fixed_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("invalid UTC offset: {hours} hours"))
}

/// Current time at the given offset.
pub fn now_in_offset(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// Formats `now` as `YYYYMMDD_HHMMSS`.
pub fn timestamp(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn output_file_name(ts: &str) -> String {
    format!("{OUTPUT_PREFIX}{ts}.{OUTPUT_EXT}")
}

/// `$HOME/Downloads`.
pub fn default_download_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join("Downloads"))
}

/// `dir/output_<ts>.mp4`, or `dir/output_<ts>_<n>.mp4` with the smallest
/// n >= 1 that is free, so runs within the same second do not collide.
pub fn unique_output_path(dir: &Path, ts: &str) -> PathBuf {
    let first = dir.join(output_file_name(ts));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(output_file_name(&format!("{ts}_{n}"))))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
