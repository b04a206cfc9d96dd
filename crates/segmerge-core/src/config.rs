use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ffmpeg::{DEFAULT_FFMPEG, DEFAULT_PROTOCOLS};
use crate::output::DEFAULT_UTC_OFFSET_HOURS;

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from(DEFAULT_FFMPEG)
}

fn default_protocols() -> Vec<String> {
    DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect()
}

fn default_utc_offset_hours() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}

fn default_keep_manifest() -> bool {
    true
}

/// Global configuration loaded from `~/.config/segmerge/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmergeConfig {
    /// ffmpeg executable; a bare name is looked up on `PATH`.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Where merged files go. None = `$HOME/Downloads`.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Where the temporary manifest is written. None = current directory.
    #[serde(default)]
    pub manifest_dir: Option<PathBuf>,
    /// Offset in hours for the timestamp in output file names.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Protocols ffmpeg may use when reading segments.
    #[serde(default = "default_protocols")]
    pub protocol_whitelist: Vec<String>,
    /// Leave the manifest on disk when ffmpeg fails, for inspection.
    #[serde(default = "default_keep_manifest")]
    pub keep_manifest_on_failure: bool,
}

impl Default for SegmergeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            download_dir: None,
            manifest_dir: None,
            utc_offset_hours: default_utc_offset_hours(),
            protocol_whitelist: default_protocols(),
            keep_manifest_on_failure: default_keep_manifest(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segmerge")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SegmergeConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<SegmergeConfig> {
    if !path.exists() {
        let default_cfg = SegmergeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: SegmergeConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = SegmergeConfig::default();
        assert_eq!(cfg.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.utc_offset_hours, 9);
        assert_eq!(
            cfg.protocol_whitelist,
            vec!["file", "http", "https", "tls", "tcp"]
        );
        assert!(cfg.keep_manifest_on_failure);
        assert!(cfg.download_dir.is_none());
        assert!(cfg.manifest_dir.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SegmergeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SegmergeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            download_dir = "/srv/videos"
            keep_manifest_on_failure = false
        "#;
        let cfg: SegmergeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_dir, Some(PathBuf::from("/srv/videos")));
        assert!(!cfg.keep_manifest_on_failure);
        assert_eq!(cfg.utc_offset_hours, 9);
        assert_eq!(cfg.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            utc_offset_hours = -5
            protocol_whitelist = ["file", "https", "tls", "tcp"]
        "#;
        let cfg: SegmergeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(cfg.utc_offset_hours, -5);
        assert_eq!(cfg.protocol_whitelist.len(), 4);
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "utc_offset_hours = \"nine\"").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }
}
