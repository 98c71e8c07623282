//! Line-oriented input reading helpers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::InputError;

/// Split a line into whitespace-separated tokens.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Directory component of a path, as a string.
///
/// Returns the empty string for a bare file name.
pub fn parent_dir(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Buffered line reader that tracks line numbers for error reporting.
pub struct LineReader<R> {
    reader: R,
    line: usize,
}

impl LineReader<BufReader<File>> {
    /// Open a file for line-oriented reading.
    pub fn open(path: &str) -> Result<Self, InputError> {
        if path.is_empty() {
            return Err(InputError::EmptyPath);
        }
        let file = File::open(path).map_err(|source| InputError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineReader<R> {
    /// Wrap an existing buffered reader.
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next line, trimmed of the trailing newline.
    ///
    /// Reaching end of file is a format error here: callers of this
    /// reader always know how many lines they still expect.
    pub fn next_line(&mut self) -> Result<String, InputError> {
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| InputError::Io {
                path: String::from("<reader>"),
                source,
            })?;
        self.line += 1;
        if n == 0 {
            return Err(InputError::Malformed {
                line: self.line,
                reason: String::from("unexpected end of file"),
            });
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(buf)
    }

    /// Read the next line and return its first whitespace token.
    pub fn next_token(&mut self) -> Result<String, InputError> {
        let line = self.next_line()?;
        match split_line(&line).first() {
            Some(token) => Ok((*token).to_string()),
            None => Err(InputError::Malformed {
                line: self.line,
                reason: String::from("expected a token on this line"),
            }),
        }
    }

    /// Read the next line and parse its first token.
    pub fn next_parsed<T: std::str::FromStr>(&mut self) -> Result<T, InputError> {
        let token = self.next_token()?;
        token.parse().map_err(|_| InputError::Malformed {
            line: self.line,
            reason: format!("cannot parse {token:?}"),
        })
    }
}
