//! Errors surfaced by model hooks and phase registration.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from model hooks and phase registration.
#[derive(Debug)]
pub enum ModelError {
    /// The registered phase count disagrees with the domain's control
    /// point.
    PhaseCountMismatch {
        /// Number of phases in the schedule.
        registered: usize,
        /// Phase count reported by the control point.
        control: u32,
    },
    /// A model input was missing or malformed.
    Input {
        /// Description of the problem.
        reason: String,
    },
    /// Model setup failed outside of input handling.
    Setup {
        /// Description of the problem.
        reason: String,
    },
    /// An I/O operation on a model file failed.
    Io {
        /// Path of the file involved.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseCountMismatch {
                registered,
                control,
            } => {
                write!(
                    f,
                    "{registered} phases registered but the control point counts {control}"
                )
            }
            Self::Input { reason } => write!(f, "model input: {reason}"),
            Self::Setup { reason } => write!(f, "model setup: {reason}"),
            Self::Io { path, source } => write!(f, "i/o on {path}: {source}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
