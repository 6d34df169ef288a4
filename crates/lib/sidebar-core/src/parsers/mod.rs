//! Parsers for sidebar inputs.
//!
//! Each parser produces [`sidebar_store::SidebarIndex`] values: either read
//! back from a generated sidebar script or derived from rustdoc JSON.

pub mod rustdoc_json;
pub mod sidebar_js;

pub use rustdoc_json::{
    ModuleSidebar,
    RustdocJsonParser,
    RustdocParseError,
    RustdocParseOptions,
    RustdocParseOutput,
};
pub use sidebar_js::{
    SidebarJsParseOutput,
    SidebarJsParser,
    SidebarParseError,
};
