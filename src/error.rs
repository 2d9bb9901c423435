use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceMapError>;

/// Everything that can go wrong while mapping instructions back to source.
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("failed to read source file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid compiler command template `{0}`")]
    Template(String),

    #[error("failed to start compiler `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("compiler command `{command}` exited with {status}: {stderr}")]
    Compiler {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("compiler produced no output")]
    EmptyOutput,

    #[error("contract `{contract}` not found in compiler output for `{}`", path.display())]
    UnknownContract { contract: String, path: PathBuf },

    #[error("position index {index} out of range ({len} positions)")]
    PositionIndexOutOfRange { index: usize, len: usize },

    #[error("no position registered for pc {0}")]
    UnregisteredPc(usize),

    #[error("span {begin}..={end} lies outside the source ({len} characters)")]
    SpanOutOfBounds { begin: i64, end: i64, len: usize },
}
