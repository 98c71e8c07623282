//! Input-layer error types.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from reading and parsing input files.
#[derive(Debug)]
pub enum InputError {
    /// An input file path was empty.
    EmptyPath,
    /// The input file could not be opened or read.
    Io {
        /// Path of the file involved.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The file's contents do not follow the expected format.
    Malformed {
        /// 1-based line number where the problem was found.
        line: usize,
        /// Description of the problem.
        reason: String,
    },
    /// A child domain names a parent that was not declared earlier.
    UnknownParent {
        /// Id of the child domain.
        domain: String,
        /// The parent id it referenced.
        parent: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "input file path is empty"),
            Self::Io { path, source } => write!(f, "cannot read {path}: {source}"),
            Self::Malformed { line, reason } => {
                write!(f, "malformed input at line {line}: {reason}")
            }
            Self::UnknownParent { domain, parent } => {
                write!(
                    f,
                    "parent domain {parent} of child {domain} is not declared; \
                     declare {parent} before {domain}"
                )
            }
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
