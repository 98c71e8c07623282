//! Core identifiers shared across the Ebb simulation framework.
//!
//! This crate is deliberately small: it holds the typed identifiers and
//! aliases that the mesh, model, and engine crates all speak, and nothing
//! else. Framework behavior lives in the crates that build on it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod id;

pub use id::{PatchId, Timestep, UnitId};
