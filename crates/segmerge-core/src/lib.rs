pub mod config;
pub mod logging;

pub mod ffmpeg;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod request;
pub mod segments;

pub use merge::{merge_segments, merge_validated, MergeOutcome, MergeSettings};
pub use request::{MergeRequest, RequestError, ValidRequest};
