//! `segmerge merge` – run the full pipeline.

use anyhow::Result;
use segmerge_core::config::{self, SegmergeConfig};
use segmerge_core::{merge_validated, MergeOutcome, MergeRequest, MergeSettings};
use std::path::PathBuf;

/// Command-line values that take precedence over config.toml.
#[derive(Debug, Default)]
pub struct MergeOverrides {
    pub output_dir: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub manifest_dir: Option<PathBuf>,
    pub delete_manifest_on_failure: bool,
}

impl MergeOverrides {
    pub fn apply(self, mut cfg: SegmergeConfig) -> SegmergeConfig {
        if let Some(dir) = self.output_dir {
            cfg.download_dir = Some(dir);
        }
        if let Some(ffmpeg) = self.ffmpeg {
            cfg.ffmpeg_path = ffmpeg;
        }
        if let Some(dir) = self.manifest_dir {
            cfg.manifest_dir = Some(dir);
        }
        if self.delete_manifest_on_failure {
            cfg.keep_manifest_on_failure = false;
        }
        cfg
    }
}

pub fn run_merge(req: &MergeRequest, overrides: MergeOverrides) -> Result<()> {
    run_merge_with(req, overrides, config::load_or_init)
}

/// Validates before `load_config` runs, so a rejected request never creates
/// the config file and config errors never mask the field error.
pub fn run_merge_with<F>(
    req: &MergeRequest,
    overrides: MergeOverrides,
    load_config: F,
) -> Result<()>
where
    F: FnOnce() -> Result<SegmergeConfig>,
{
    let valid = match req.validate() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(field = e.field(), "{}", e);
            anyhow::bail!("invalid request: {}", e);
        }
    };

    let cfg = overrides.apply(load_config()?);
    tracing::debug!("effective config: {:?}", cfg);
    let settings = MergeSettings::from_config(&cfg)?;

    match merge_validated(&valid, &settings) {
        MergeOutcome::Completed { output } => {
            println!("{}", output.display());
            Ok(())
        }
        MergeOutcome::Rejected(e) => anyhow::bail!("invalid request: {}", e),
        MergeOutcome::NoSegments => anyhow::bail!("no segments to merge"),
        MergeOutcome::ToolFailed { error, manifest } => match manifest {
            Some(path) => anyhow::bail!("{} (manifest kept at {})", error, path.display()),
            None => anyhow::bail!("{}", error),
        },
        MergeOutcome::Io(e) => Err(e),
    }
}
