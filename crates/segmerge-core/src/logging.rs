//! Logging init: stderr for the console, plus a file under the XDG state dir
//! when it is writable. If the file cannot be opened, console logging still
//! comes up and the reason is printed once.
//!
//! The caller picks the verbosity; `RUST_LOG` overrides it when set.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// How much the console and log file receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    /// Adds the ffmpeg command line and manifest details.
    Verbose,
    Trace,
}

impl Verbosity {
    /// Maps `-q` and repeated `-v` flags to a level. `-q` wins.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }

    /// Default `EnvFilter` directive for this level.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "info,segmerge=debug,segmerge_core=debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Logging context built by the caller before running a merge.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbosity: Verbosity,
    /// Also append to `~/.local/state/segmerge/segmerge.log`.
    pub log_file: bool,
}

fn open_log_file() -> Result<(std::fs::File, PathBuf)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segmerge")?;
    let log_file_path = xdg_dirs.place_state_file("segmerge.log")?;
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;
    Ok((file, log_file_path))
}

/// Initialize the global subscriber. Returns the log file path when file
/// logging was requested and the file could be opened.
pub fn init_logging(opts: &LogOptions) -> Result<Option<PathBuf>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(opts.verbosity.directive()));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let (file_layer, log_file_path) = if opts.log_file {
        match open_log_file() {
            Ok((file, path)) => {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false);
                (Some(layer), Some(path))
            }
            Err(e) => {
                eprintln!("segmerge: file logging disabled: {e:#}");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    if let Some(path) = &log_file_path {
        tracing::debug!("segmerge logging to {}", path.display());
    }
    Ok(log_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(3, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
    }

    #[test]
    fn default_options_log_to_console_only() {
        let opts = LogOptions::default();
        assert_eq!(opts.verbosity, Verbosity::Normal);
        assert!(!opts.log_file);
    }

    #[test]
    fn directives_parse() {
        for v in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(v.directive()).is_ok(), "{:?}", v);
        }
    }
}
