//! Data model and storage records for sidebar-index.
//!
//! This crate defines the sidebar index shared by parsers, renderers, the
//! control plane, and storage backends.

pub mod models;
pub mod schema;

pub use models::*;
