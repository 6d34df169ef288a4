//! Store interfaces and `SurrealDB` implementation.
//!
//! The store layer persists module metadata and sidebar entries.

pub mod surreal;

pub use surreal::{ModuleReplacement, StoreError, StoreResult, SurrealSidebarStore};
