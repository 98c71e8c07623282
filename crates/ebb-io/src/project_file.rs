//! The project input file: the list of domains a project simulates.

use std::io::BufRead;

use log::debug;

use crate::error::InputError;
use crate::input::{split_line, LineReader};

/// One domain row of the project file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainEntry {
    /// Domain id, unique within the project.
    pub id: String,
    /// Path of the domain's own input files.
    pub path: String,
    /// Directory the domain writes its outputs to, unique within the
    /// project.
    pub output_dir: String,
    /// Id of the parent domain; `None` for a parent (top-level) domain.
    pub parent: Option<String>,
}

/// Parsed contents of a project input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectFile {
    /// First line of the file, stored but not interpreted.
    pub header: String,
    /// The project id.
    pub project_id: String,
    /// Domain rows, in declaration order.
    pub entries: Vec<DomainEntry>,
}

impl ProjectFile {
    /// Read and parse a project file from disk.
    pub fn read(path: &str) -> Result<Self, InputError> {
        debug!("reading project file {path}");
        let reader = LineReader::open(path)?;
        Self::parse(reader)
    }

    /// Parse a project file from any buffered reader.
    pub fn parse<R: BufRead>(mut reader: LineReader<R>) -> Result<Self, InputError> {
        let header = reader.next_line()?;
        let project_id = reader.next_token()?;
        let nd: usize = reader.next_parsed()?;

        let mut entries: Vec<DomainEntry> = Vec::with_capacity(nd);
        for _ in 0..nd {
            let line = reader.next_line()?;
            let tokens = split_line(&line);
            let entry = match tokens.as_slice() {
                [id, path, output_dir] => DomainEntry {
                    id: (*id).to_string(),
                    path: (*path).to_string(),
                    output_dir: (*output_dir).to_string(),
                    parent: None,
                },
                [id, path, output_dir, parent] => DomainEntry {
                    id: (*id).to_string(),
                    path: (*path).to_string(),
                    output_dir: (*output_dir).to_string(),
                    parent: Some((*parent).to_string()),
                },
                _ => {
                    return Err(InputError::Malformed {
                        line: reader.line(),
                        reason: format!(
                            "expected 3 or 4 tokens in a domain row, found {}",
                            tokens.len()
                        ),
                    })
                }
            };

            // A child's parent must be declared on an earlier row.
            if let Some(parent) = &entry.parent {
                if !entries.iter().any(|e| &e.id == parent) {
                    return Err(InputError::UnknownParent {
                        domain: entry.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            entries.push(entry);
        }

        Ok(Self {
            header,
            project_id,
            entries,
        })
    }

    /// Number of domains declared in the file.
    pub fn n_domains(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<ProjectFile, InputError> {
        ProjectFile::parse(LineReader::new(Cursor::new(text.to_string())))
    }

    #[test]
    fn parses_parent_and_child_rows() {
        let file = parse("header\nproj\n2\nA /a /oA\nB /b /oB A\n").unwrap();
        assert_eq!(file.project_id, "proj");
        assert_eq!(file.header, "header");
        assert_eq!(file.n_domains(), 2);
        assert_eq!(file.entries[0].parent, None);
        assert_eq!(file.entries[1].parent.as_deref(), Some("A"));
        assert_eq!(file.entries[1].output_dir, "/oB");
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = parse("header\nproj\n2\nA /a /oA\nB /b /oB X\n").unwrap_err();
        match err {
            InputError::UnknownParent { domain, parent } => {
                assert_eq!(domain, "B");
                assert_eq!(parent, "X");
            }
            other => panic!("expected UnknownParent, got {other:?}"),
        }
    }

    #[test]
    fn parent_declared_after_child_is_rejected() {
        // Declaration order matters, not mere presence.
        let err = parse("h\np\n2\nB /b /oB A\nA /a /oA\n").unwrap_err();
        assert!(matches!(err, InputError::UnknownParent { .. }));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = parse("h\np\n1\nA /a\n").unwrap_err();
        match err {
            InputError::Malformed { line, reason } => {
                assert_eq!(line, 4);
                assert!(reason.contains("found 2"), "{reason}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn truncated_domain_list_is_rejected() {
        let err = parse("h\np\n3\nA /a /oA\n").unwrap_err();
        assert!(matches!(err, InputError::Malformed { line: 5, .. }));
    }

    #[test]
    fn unparseable_count_is_rejected() {
        let err = parse("h\np\nmany\n").unwrap_err();
        assert!(matches!(err, InputError::Malformed { line: 3, .. }));
    }
}
