//! Command handlers grouped by category
//!
//! Each handler is one self-contained call-and-format operation: it receives
//! its bound parameters (plus `&Settings` where needed) and returns either a
//! renderable [`Report`] or a [`HandlerError`] carrying an exit-code class.

pub mod filelab;
pub mod network;
pub mod system;
pub mod utils;

use thiserror::Error;

use crate::cli::report::Report;
use crate::exitcode;

pub type HandlerResult = Result<Report, HandlerError>;

/// Failure descriptor for one command invocation. The message is surfaced
/// verbatim; the variant picks the process exit code.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Input path or resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Arguments passed CLI parsing but are semantically invalid
    #[error("{0}")]
    InvalidInput(String),

    /// Remote service or host unreachable
    #[error("{0}")]
    Network(String),

    /// Filesystem operation failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl HandlerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        HandlerError::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            HandlerError::NotFound(_) => exitcode::NOINPUT,
            HandlerError::InvalidInput(_) => exitcode::DATAERR,
            HandlerError::Network(_) => exitcode::UNAVAILABLE,
            HandlerError::Io { .. } => exitcode::IOERR,
        }
    }
}

/// Human-readable byte size, 1024-based.
pub fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < MIB {
        format!("{:.1} KB", b / KIB)
    } else if b < GIB {
        format!("{:.1} MB", b / MIB)
    } else {
        format!("{:.2} GB", b / GIB)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0 B")]
    #[case(512, "512 B")]
    #[case(1024, "1.0 KB")]
    #[case(1536, "1.5 KB")]
    #[case(5 * 1024 * 1024, "5.0 MB")]
    #[case(3 * 1024 * 1024 * 1024, "3.00 GB")]
    fn given_byte_count_when_formatted_then_human_readable(
        #[case] bytes: u64,
        #[case] expected: &str,
    ) {
        assert_eq!(human_size(bytes), expected);
    }

    #[test]
    fn given_error_variants_when_mapped_then_exit_codes_are_stable() {
        assert_eq!(
            HandlerError::NotFound("x".into()).exit_code(),
            exitcode::NOINPUT
        );
        assert_eq!(
            HandlerError::InvalidInput("x".into()).exit_code(),
            exitcode::DATAERR
        );
        assert_eq!(
            HandlerError::Network("x".into()).exit_code(),
            exitcode::UNAVAILABLE
        );
        assert_eq!(
            HandlerError::io("read", std::io::Error::other("boom")).exit_code(),
            exitcode::IOERR
        );
    }
}
