//! ffmpeg concat-demuxer invocation.
//!
//! The tool itself is opaque: this module owns the argument list, working
//! directory, captured output, and how the exit status is read.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Protocols ffmpeg may use to read segments listed in the manifest.
pub const DEFAULT_PROTOCOLS: [&str; 5] = ["file", "http", "https", "tls", "tcp"];

/// Default program name, resolved through `PATH`.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Captured result of a finished ffmpeg process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// ffmpeg could not be started or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

/// One stream-copy concatenation of `manifest` into `output`.
#[derive(Debug, Clone)]
pub struct ConcatCommand {
    program: PathBuf,
    manifest: PathBuf,
    output: PathBuf,
    protocols: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ConcatCommand {
    pub fn new(program: impl Into<PathBuf>, manifest: &Path, output: &Path) -> Self {
        Self {
            program: program.into(),
            manifest: manifest.to_path_buf(),
            output: output.to_path_buf(),
            protocols: DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
            working_dir: None,
        }
    }

    pub fn protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list, excluding the program itself.
    ///
    /// `-safe 0` lets manifest entries point outside the manifest's own
    /// directory (remote URLs, absolute paths). `-n` never overwrites.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-n",
            "-f",
            "concat",
            "-safe",
            "0",
            "-protocol_whitelist",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(self.protocols.join(",").into());
        args.push("-i".into());
        args.push(self.manifest.clone().into_os_string());
        args.push("-c".into());
        args.push("copy".into());
        args.push(self.output.clone().into_os_string());
        args
    }

    /// Runs ffmpeg to completion, blocking the caller. No timeout.
    pub fn run(&self) -> Result<ToolOutput, ToolError> {
        let program = self.program.display().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        tracing::debug!(program = %program, args = ?self.args(), "spawning ffmpeg");

        let out = cmd.output().map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;
        let output = ToolOutput {
            status: out.status,
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        };
        if !output.status.success() {
            return Err(ToolError::Exit {
                program,
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}
