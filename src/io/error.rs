use super::Format;
use thiserror::Error;

/// Errors raised while reading or writing structure files.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed record; `line` is 1-based and approximate for multi-line blocks.
    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("structures cannot be written as {0}")]
    UnsupportedWriteFormat(Format),

    /// Index of the first atom lacking a position.
    #[error("atom {0} has no coordinates to write")]
    MissingCoordinates(usize),

    #[error("cannot infer a structure format from '{0}'")]
    UnknownFormat(String),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
