//! External interfaces of the Ebb simulation framework: the project
//! input file, the per-domain output contract, and logging setup.
//!
//! The project file is a line-oriented, whitespace-separated text format:
//!
//! ```text
//! <header line, stored but not interpreted>
//! <project id>
//! <nd>
//! <domainID> <domainPath> <outputDir> [parentID]     (nd rows)
//! ```
//!
//! Three tokens declare a parent domain, four declare a child whose
//! parent must appear earlier in the file. Anything else is a fatal
//! input error.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod input;
mod output;
mod project_file;
pub mod report;

pub use error::InputError;
pub use input::{parent_dir, split_line, LineReader};
pub use output::{FileOutput, Output};
pub use project_file::{DomainEntry, ProjectFile};
pub use report::init_logging;
