//! Merge request and input validation.
//!
//! A `MergeRequest` is what the caller hands in; `validate` turns it into a
//! `ValidRequest` or reports the first field that is out of bounds. Nothing
//! in here touches the filesystem.

use thiserror::Error;

/// Placeholder forms accepted in a filename pattern.
pub const PLACEHOLDERS: [&str; 2] = ["{0}", "{}"];

/// Raw request as supplied by the caller (CLI or library user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Base location, usually an HTTP(S) URL acting as a directory prefix.
    pub base: String,
    /// Segment filename with one placeholder, e.g. `ts_{0}.ts`.
    pub pattern: String,
    /// First segment index (inclusive).
    pub start: i64,
    /// Last segment index (inclusive).
    pub end: i64,
    /// Zero-padding width for the index.
    pub padding: i64,
}

/// Request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    pub base: String,
    pub pattern: String,
    pub start: i64,
    pub end: i64,
    pub padding: usize,
}

impl ValidRequest {
    /// Number of segments the request covers.
    pub fn segment_count(&self) -> u64 {
        self.end.abs_diff(self.start).saturating_add(1)
    }
}

/// Why a request was rejected. Each variant carries the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid base location: {base:?}")]
    EmptyBase { base: String },
    #[error("invalid filename pattern: {pattern:?}")]
    EmptyPattern { pattern: String },
    #[error("filename pattern {pattern:?} must contain exactly one {{0}} or {{}} placeholder (found {found})")]
    Placeholder { pattern: String, found: usize },
    #[error("invalid start and end numbers: start: {start}, end: {end}")]
    Range { start: i64, end: i64 },
    #[error("invalid zero-padding width: {padding}")]
    Padding { padding: i64 },
}

impl RequestError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            RequestError::EmptyBase { .. } => "base",
            RequestError::EmptyPattern { .. } => "pattern",
            RequestError::Placeholder { .. } => "pattern",
            RequestError::Range { .. } => "start/end",
            RequestError::Padding { .. } => "padding",
        }
    }
}

/// Counts placeholder occurrences in a pattern.
pub fn count_placeholders(pattern: &str) -> usize {
    PLACEHOLDERS.iter().map(|p| pattern.matches(p).count()).sum()
}

impl MergeRequest {
    pub fn new(
        base: impl Into<String>,
        pattern: impl Into<String>,
        start: i64,
        end: i64,
        padding: i64,
    ) -> Self {
        Self {
            base: base.into(),
            pattern: pattern.into(),
            start,
            end,
            padding,
        }
    }

    /// Checks fields in order (base, pattern, range, padding) and returns
    /// the first violation.
    pub fn validate(&self) -> Result<ValidRequest, RequestError> {
        if self.base.trim().is_empty() {
            return Err(RequestError::EmptyBase {
                base: self.base.clone(),
            });
        }
        if self.pattern.trim().is_empty() {
            return Err(RequestError::EmptyPattern {
                pattern: self.pattern.clone(),
            });
        }
        let found = count_placeholders(&self.pattern);
        if found != 1 {
            return Err(RequestError::Placeholder {
                pattern: self.pattern.clone(),
                found,
            });
        }
        if self.start > self.end {
            return Err(RequestError::Range {
                start: self.start,
                end: self.end,
            });
        }
        let padding = usize::try_from(self.padding).map_err(|_| RequestError::Padding {
            padding: self.padding,
        })?;

        if let Ok(parsed) = url::Url::parse(&self.base) {
            if !crate::ffmpeg::DEFAULT_PROTOCOLS.contains(&parsed.scheme()) {
                tracing::warn!(
                    scheme = parsed.scheme(),
                    "base location scheme is not in the default protocol whitelist"
                );
            }
        }

        Ok(ValidRequest {
            base: self.base.clone(),
            pattern: self.pattern.clone(),
            start: self.start,
            end: self.end,
            padding,
        })
    }
}
