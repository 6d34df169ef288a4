//! Core services for sidebar-index.
//!
//! This crate parses sidebar scripts and rustdoc JSON into sidebar indexes,
//! validates and renders them, and persists them through a `SurrealDB`
//! backed store behind a control plane.

pub mod control;
pub mod output;
pub mod parsers;
pub mod render;
pub mod store;
pub mod summary;
pub mod validate;
