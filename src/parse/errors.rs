//! Error types for InkML reading
//!
//! Every failure aborts the whole document: a trace with missing or
//! misaligned channels would be silently wrong data.

use std::fmt;
use thiserror::Error;

/// Identity of a trace in error reports: its id, or its position when it has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceRef {
    Id(String),
    /// 0-based position among the traces of the document
    Position(usize),
}

impl TraceRef {
    pub fn new(id: Option<&str>, position: usize) -> Self {
        match id {
            Some(id) => TraceRef::Id(id.to_string()),
            None => TraceRef::Position(position),
        }
    }
}

impl fmt::Display for TraceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceRef::Id(id) => write!(f, "'#{}'", id),
            TraceRef::Position(pos) => write!(f, "at position {}", pos),
        }
    }
}

/// Top-level reader error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InkError {
    /// Text is not well-formed markup, or not an `<ink>` document
    #[error("malformed document at {line}:{column}: {message}")]
    MalformedDocument { line: u32, column: u32, message: String },

    /// The channel schema of a trace cannot be determined
    #[error("unresolved trace format for trace {trace}: {reason}")]
    UnresolvedTraceFormat { trace: TraceRef, reason: String },

    /// Field count of a sample does not fit the trace format
    #[error("malformed sample {sample} in trace {trace}: {reason}")]
    MalformedSample { trace: TraceRef, sample: usize, reason: String },

    /// A field cannot be read as its channel's declared type
    #[error("invalid value '{value}' for channel '{channel}' in trace {trace}, sample {sample}")]
    InvalidChannelValue { trace: TraceRef, sample: usize, channel: String, value: String },
}

/// Decoder failure, before it is attributed to a trace
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("sample {sample}: {reason}")]
    Malformed { sample: usize, reason: String },

    #[error("sample {sample}: invalid value '{value}' for channel '{channel}'")]
    InvalidValue { sample: usize, channel: String, value: String },
}

impl SampleError {
    pub fn into_ink_error(self, trace: TraceRef) -> InkError {
        match self {
            SampleError::Malformed { sample, reason } => InkError::MalformedSample { trace, sample, reason },
            SampleError::InvalidValue { sample, channel, value } => InkError::InvalidChannelValue {
                trace,
                sample,
                channel,
                value,
            },
        }
    }
}

pub type InkResult<T> = Result<T, InkError>;
