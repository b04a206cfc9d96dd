//! The merge pipeline: validate, build addresses, write manifest, run ffmpeg,
//! clean up.
//!
//! `merge_segments` never returns an error or panics on a defined failure.
//! Every failure is logged and handed back as a [`MergeOutcome`].

use anyhow::{Context, Result};
use chrono::FixedOffset;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SegmergeConfig;
use crate::ffmpeg::{ConcatCommand, ToolError};
use crate::manifest::Manifest;
use crate::output::{self, fixed_offset, now_in_offset, unique_output_path};
use crate::request::{MergeRequest, RequestError, ValidRequest};
use crate::segments::build_addresses;

/// Effective settings for one merge, resolved from config and CLI overrides.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub ffmpeg_path: PathBuf,
    pub download_dir: PathBuf,
    pub manifest_dir: PathBuf,
    pub offset: FixedOffset,
    pub protocols: Vec<String>,
    pub keep_manifest_on_failure: bool,
}

impl MergeSettings {
    /// Resolves defaults: `$HOME/Downloads`, current directory for the
    /// manifest, and the configured UTC offset.
    pub fn from_config(cfg: &SegmergeConfig) -> Result<Self> {
        let download_dir = match &cfg.download_dir {
            Some(dir) => dir.clone(),
            None => output::default_download_dir()?,
        };
        let manifest_dir = match &cfg.manifest_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        Ok(Self {
            ffmpeg_path: cfg.ffmpeg_path.clone(),
            download_dir,
            manifest_dir,
            offset: fixed_offset(cfg.utc_offset_hours)?,
            protocols: cfg.protocol_whitelist.clone(),
            keep_manifest_on_failure: cfg.keep_manifest_on_failure,
        })
    }
}

/// How a merge ended.
#[derive(Debug)]
pub enum MergeOutcome {
    /// ffmpeg succeeded; the manifest has been removed.
    Completed { output: PathBuf },
    /// Input failed validation; nothing was written or run.
    Rejected(RequestError),
    /// No segment addresses to merge; ffmpeg was not run.
    NoSegments,
    /// ffmpeg failed. `manifest` is the retained list file, if kept.
    ToolFailed {
        error: ToolError,
        manifest: Option<PathBuf>,
    },
    /// Writing the manifest or preparing the download directory failed.
    Io(anyhow::Error),
}

impl MergeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MergeOutcome::Completed { .. })
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            MergeOutcome::Completed { output } => Some(output),
            _ => None,
        }
    }
}

/// Makes `dir` absolute against the current directory. ffmpeg runs inside
/// the manifest directory, so relative paths would resolve twice.
pub fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(dir))
}

/// Runs one merge to completion. Blocks while ffmpeg runs.
pub fn merge_segments(req: &MergeRequest, settings: &MergeSettings) -> MergeOutcome {
    match req.validate() {
        Ok(valid) => merge_validated(&valid, settings),
        Err(e) => {
            tracing::error!(field = e.field(), base = %req.base, "{}", e);
            MergeOutcome::Rejected(e)
        }
    }
}

/// Same as [`merge_segments`] for a request the caller already validated.
pub fn merge_validated(valid: &ValidRequest, settings: &MergeSettings) -> MergeOutcome {
    let span = tracing::info_span!("merge", base = %valid.base, pattern = %valid.pattern);
    let _enter = span.enter();
    let ts = output::timestamp(&now_in_offset(settings.offset));

    let dirs = absolute_dir(&settings.manifest_dir)
        .and_then(|m| Ok((m, absolute_dir(&settings.download_dir)?)));
    let (manifest_dir, download_dir) = match dirs {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("{:#}", e);
            return MergeOutcome::Io(e);
        }
    };
    tracing::info!("download directory: {}", download_dir.display());

    let addresses = build_addresses(valid);
    for address in &addresses {
        tracing::info!("URL: {}", address);
    }
    if addresses.is_empty() {
        tracing::error!("no segments to merge; skipping ffmpeg");
        return MergeOutcome::NoSegments;
    }

    let manifest = match Manifest::write(&manifest_dir, &addresses) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("{:#}", e);
            return MergeOutcome::Io(e);
        }
    };

    if let Err(e) = fs::create_dir_all(&download_dir).with_context(|| {
        format!(
            "failed to create download directory {}",
            download_dir.display()
        )
    }) {
        tracing::error!("{:#}", e);
        return MergeOutcome::Io(e);
    }

    let output = unique_output_path(&download_dir, &ts);
    let cmd = ConcatCommand::new(&settings.ffmpeg_path, manifest.path(), &output)
        .protocols(settings.protocols.iter().cloned())
        .working_dir(&manifest_dir);
    tracing::info!(
        segments = manifest.len(),
        "concatenating into {}",
        output.display()
    );

    match cmd.run() {
        Ok(out) => {
            tracing::trace!(stderr = %out.stderr, "ffmpeg finished");
            if let Err(e) = manifest.remove() {
                tracing::warn!("{:#}", e);
            }
            tracing::info!("merge completed: {}", output.display());
            MergeOutcome::Completed { output }
        }
        Err(error) => {
            let kept = if settings.keep_manifest_on_failure {
                match manifest.keep() {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("{:#}", e);
                        None
                    }
                }
            } else {
                drop(manifest);
                None
            };
            tracing::error!("ffmpeg failed: {}", error);
            if let Some(path) = &kept {
                tracing::info!("manifest kept at {}", path.display());
            }
            MergeOutcome::ToolFailed {
                error,
                manifest: kept,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings(root: &Path) -> MergeSettings {
        MergeSettings {
            ffmpeg_path: PathBuf::from("/nonexistent/segmerge-ffmpeg"),
            download_dir: root.join("downloads"),
            manifest_dir: root.join("work"),
            offset: fixed_offset(9).unwrap(),
            protocols: vec!["file".to_string()],
            keep_manifest_on_failure: true,
        }
    }

    #[test]
    fn rejected_request_touches_nothing() {
        let root = tempdir().unwrap();
        let s = settings(root.path());
        let req = MergeRequest::new("https://sample.com", "ts_{0}.ts", 5, 1, 5);
        match merge_segments(&req, &s) {
            MergeOutcome::Rejected(RequestError::Range { start, end }) => {
                assert_eq!((start, end), (5, 1));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert!(!s.download_dir.exists());
        assert!(!s.manifest_dir.exists());
    }

    #[test]
    fn unwritable_manifest_dir_is_io_outcome() {
        let root = tempdir().unwrap();
        let s = settings(root.path());
        let req = MergeRequest::new("https://sample.com", "ts_{0}.ts", 1, 2, 1);
        let outcome = merge_segments(&req, &s);
        assert!(matches!(outcome, MergeOutcome::Io(_)));
        assert!(!outcome.is_success());
        assert!(!s.download_dir.exists());
    }

    #[test]
    fn spawn_failure_keeps_manifest() {
        let root = tempdir().unwrap();
        let s = settings(root.path());
        fs::create_dir_all(&s.manifest_dir).unwrap();
        let req = MergeRequest::new("https://sample.com", "ts_{0}.ts", 1, 3, 2);
        match merge_segments(&req, &s) {
            MergeOutcome::ToolFailed {
                error: ToolError::Spawn { .. },
                manifest: Some(path),
            } => {
                let text = fs::read_to_string(&path).unwrap();
                assert_eq!(text.lines().count(), 3);
                assert!(text.starts_with("file 'https://sample.com/ts_01.ts'"));
            }
            other => panic!("expected ToolFailed with manifest, got {:?}", other),
        }
    }

    #[test]
    fn spawn_failure_can_discard_manifest() {
        let root = tempdir().unwrap();
        let mut s = settings(root.path());
        s.keep_manifest_on_failure = false;
        fs::create_dir_all(&s.manifest_dir).unwrap();
        let req = MergeRequest::new("https://sample.com", "ts_{0}.ts", 1, 3, 2);
        assert!(matches!(
            merge_segments(&req, &s),
            MergeOutcome::ToolFailed { manifest: None, .. }
        ));
        assert_eq!(fs::read_dir(&s.manifest_dir).unwrap().count(), 0);
    }

    #[test]
    fn absolute_dir_resolves_relative_paths() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_dir(Path::new("work")).unwrap(), cwd.join("work"));
        let abs = cwd.join("already");
        assert_eq!(absolute_dir(&abs).unwrap(), abs);
    }

    #[test]
    fn settings_from_config_overrides() {
        let cfg = SegmergeConfig {
            download_dir: Some(PathBuf::from("/srv/out")),
            manifest_dir: Some(PathBuf::from("/srv/tmp")),
            utc_offset_hours: 0,
            ..SegmergeConfig::default()
        };
        let s = MergeSettings::from_config(&cfg).unwrap();
        assert_eq!(s.download_dir, PathBuf::from("/srv/out"));
        assert_eq!(s.manifest_dir, PathBuf::from("/srv/tmp"));
        assert_eq!(s.offset.local_minus_utc(), 0);
        assert!(s.keep_manifest_on_failure);
    }

    #[test]
    fn settings_reject_bad_offset() {
        let cfg = SegmergeConfig {
            download_dir: Some(PathBuf::from("/srv/out")),
            manifest_dir: Some(PathBuf::from("/srv/tmp")),
            utc_offset_hours: 30,
            ..SegmergeConfig::default()
        };
        assert!(MergeSettings::from_config(&cfg).is_err());
    }
}
