//! CLI for segmerge.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use segmerge_core::logging::{LogOptions, Verbosity};
use segmerge_core::MergeRequest;
use std::path::PathBuf;

use commands::{run_completions, run_config, run_man, run_merge, run_plan, MergeOverrides};

/// Top-level CLI for segmerge.
#[derive(Debug, Parser)]
#[command(name = "segmerge")]
#[command(about = "segmerge: join numbered stream segments into one file via ffmpeg", long_about = None)]
pub struct Cli {
    /// More output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also append logs to ~/.local/state/segmerge/segmerge.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Which segments to merge.
#[derive(Debug, Clone, Args)]
pub struct SegmentArgs {
    /// Base location of the segments (URL or directory).
    pub base: String,

    /// Segment filename with one {0} placeholder, e.g. "ts_{0}.ts".
    pub pattern: String,

    /// First segment number (inclusive).
    #[arg(allow_negative_numbers = true)]
    pub start: i64,

    /// Last segment number (inclusive).
    #[arg(allow_negative_numbers = true)]
    pub end: i64,

    /// Zero-pad segment numbers to this many digits.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub padding: i64,
}

impl SegmentArgs {
    pub fn to_request(&self) -> MergeRequest {
        MergeRequest::new(
            self.base.clone(),
            self.pattern.clone(),
            self.start,
            self.end,
            self.padding,
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Merge segments START..=END into output_<timestamp>.mp4.
    Merge {
        #[command(flatten)]
        segments: SegmentArgs,

        /// Directory for the merged file (default: ~/Downloads).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// ffmpeg executable to run.
        #[arg(long, value_name = "PATH")]
        ffmpeg: Option<PathBuf>,

        /// Directory for the temporary manifest (default: current directory).
        #[arg(long, value_name = "DIR")]
        manifest_dir: Option<PathBuf>,

        /// Delete the manifest even when ffmpeg fails.
        #[arg(long)]
        delete_manifest_on_failure: bool,
    },

    /// Print the manifest a merge would use, without running ffmpeg.
    Plan {
        #[command(flatten)]
        segments: SegmentArgs,
    },

    /// Show the config file location and effective settings.
    Config,

    /// Generate shell completions on stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Render the man page (roff) on stdout.
    Man,
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            verbosity: Verbosity::from_flags(self.verbose, self.quiet),
            log_file: self.log_file,
        }
    }

    pub fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Merge {
                segments,
                output_dir,
                ffmpeg,
                manifest_dir,
                delete_manifest_on_failure,
            } => {
                let overrides = MergeOverrides {
                    output_dir,
                    ffmpeg,
                    manifest_dir,
                    delete_manifest_on_failure,
                };
                run_merge(&segments.to_request(), overrides)?;
            }
            CliCommand::Plan { segments } => run_plan(&segments.to_request())?,
            CliCommand::Config => run_config()?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
