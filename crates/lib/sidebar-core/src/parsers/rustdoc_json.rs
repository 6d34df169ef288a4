//! Rustdoc JSON parser.
//!
//! Derives one sidebar index per module reachable from the crate root, the
//! way the documentation build lays out `sidebar-items.js` files.

use std::collections::{HashMap, HashSet};
use std::{error::Error, fmt, path::Path};

use serde::Deserialize;
use serde_json::Value;
use sidebar_store::models::{ItemKind, SidebarIndex};
use tracing::debug;

use crate::summary::short_summary;

/// Options for deriving sidebars from rustdoc JSON.
#[derive(Debug, Clone, Default)]
pub struct RustdocParseOptions {
    pub include_private: bool,
    pub include_hidden: bool,
}

impl RustdocParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_private(mut self, include_private: bool) -> Self {
        self.include_private = include_private;
        self
    }

    #[must_use]
    pub const fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }
}

/// Sidebar index for one module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSidebar {
    pub module_path: String,
    pub index: SidebarIndex,
}

/// Output from parsing rustdoc JSON.
#[derive(Debug, Clone)]
pub struct RustdocParseOutput {
    pub crate_name: Option<String>,
    pub modules: Vec<ModuleSidebar>,
}

impl RustdocParseOutput {
    #[must_use]
    pub fn module(&self, module_path: &str) -> Option<&ModuleSidebar> {
        self.modules
            .iter()
            .find(|module| module.module_path == module_path)
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.modules.iter().map(|module| module.index.len()).sum()
    }
}

/// Error type for rustdoc JSON parse failures.
#[derive(Debug)]
pub struct RustdocParseError {
    message: String,
}

impl RustdocParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RustdocParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rustdoc JSON parse error: {}", self.message)
    }
}

impl Error for RustdocParseError {}

impl From<serde_json::Error> for RustdocParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for RustdocParseError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RustdocParseError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(err.to_string())
    }
}

/// Parser for rustdoc JSON output.
pub struct RustdocJsonParser;

impl RustdocJsonParser {
    /// Parses rustdoc JSON into per-module sidebar indexes.
    ///
    /// # Errors
    /// Returns `RustdocParseError` if the JSON is invalid or has no root item.
    pub fn parse(
        json: &str,
        options: &RustdocParseOptions,
    ) -> Result<RustdocParseOutput, RustdocParseError> {
        let crate_doc: RustdocCrate = serde_json::from_str(json)?;
        let root_id = crate_doc.root;
        let root_item = crate_doc
            .index
            .get(&root_id.to_string())
            .ok_or_else(|| RustdocParseError::new("missing root item"))?;
        if !is_inner_kind(root_item, "module") {
            return Err(RustdocParseError::new("root item is not a module"));
        }

        let crate_name = root_item.name.clone();
        let mut state = ParserState {
            crate_doc: &crate_doc,
            options,
            root_crate_id: root_item.crate_id,
            modules: Vec::new(),
            seen: HashSet::new(),
        };

        let mut module_path = Vec::new();
        if let Some(name) = crate_name.clone() {
            module_path.push(name);
        }
        state.visit_module(root_id, &module_path);

        debug!(
            crate_name = crate_name.as_deref().unwrap_or_default(),
            modules = state.modules.len(),
            "derived sidebars from rustdoc JSON"
        );
        Ok(RustdocParseOutput {
            crate_name,
            modules: state.modules,
        })
    }

    /// Parses rustdoc JSON asynchronously using a blocking task.
    ///
    /// # Errors
    /// Returns `RustdocParseError` if parsing fails or the task panics.
    pub async fn parse_async(
        json: String,
        options: RustdocParseOptions,
    ) -> Result<RustdocParseOutput, RustdocParseError> {
        tokio::task::spawn_blocking(move || Self::parse(&json, &options)).await?
    }

    /// Parses rustdoc JSON from a file path asynchronously.
    ///
    /// # Errors
    /// Returns `RustdocParseError` if the file cannot be read or the JSON cannot be parsed.
    pub async fn parse_file(
        path: impl AsRef<Path>,
        options: RustdocParseOptions,
    ) -> Result<RustdocParseOutput, RustdocParseError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse_async(json, options).await
    }
}

#[derive(Debug, Deserialize)]
struct RustdocCrate {
    root: u64,
    index: HashMap<String, RustdocItem>,
}

#[derive(Debug, Deserialize)]
struct RustdocItem {
    crate_id: u64,
    name: Option<String>,
    #[serde(default)]
    visibility: Option<Value>,
    docs: Option<String>,
    #[serde(default)]
    attrs: Vec<Value>,
    inner: HashMap<String, Value>,
}

struct ParserState<'a> {
    crate_doc: &'a RustdocCrate,
    options: &'a RustdocParseOptions,
    root_crate_id: u64,
    modules: Vec<ModuleSidebar>,
    seen: HashSet<u64>,
}

impl<'a> ParserState<'a> {
    fn visit_module(&mut self, module_id: u64, module_path: &[String]) {
        if !self.seen.insert(module_id) {
            return;
        }
        let Some(item) = self.get_item(module_id) else {
            return;
        };
        if item.crate_id != self.root_crate_id {
            return;
        }

        let mut index = SidebarIndex::new();
        let mut submodules = Vec::new();
        for child_id in module_items(item) {
            let Some(child) = self.get_item(child_id) else {
                continue;
            };
            if child.crate_id != self.root_crate_id || !self.is_listed(child) {
                continue;
            }
            if is_inner_kind(child, "use") {
                self.push_reexport(&mut index, child);
                continue;
            }
            let Some(kind) = sidebar_kind(child) else {
                continue;
            };
            let Some(name) = child.name.as_deref().filter(|name| !name.is_empty()) else {
                continue;
            };
            index.push(kind, name, item_summary(child));
            if kind == ItemKind::Module {
                submodules.push((child_id, name.to_string()));
            }
        }
        index.sort();

        self.modules.push(ModuleSidebar {
            module_path: module_path.join("::"),
            index,
        });

        for (child_id, name) in submodules {
            let mut child_path = module_path.to_vec();
            child_path.push(name);
            self.visit_module(child_id, &child_path);
        }
    }

    /// Inlines a `use` of a same-crate item under the target's kind. A glob
    /// of a module lists that module's children instead.
    fn push_reexport(&self, index: &mut SidebarIndex, item: &RustdocItem) {
        let Some(inner) = item.inner.get("use") else {
            return;
        };
        let Some(target) = inner
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|target_id| self.get_item(target_id))
        else {
            return;
        };
        if target.crate_id != self.root_crate_id {
            return;
        }
        if is_glob_use(item) {
            self.push_glob(index, target);
            return;
        }
        let Some(kind) = sidebar_kind(target) else {
            return;
        };
        let Some(name) = inner
            .get("name")
            .and_then(Value::as_str)
            .or(target.name.as_deref())
            .filter(|name| !name.is_empty())
        else {
            return;
        };
        let summary = match item_summary(item) {
            summary if summary.is_empty() => item_summary(target),
            summary => summary,
        };
        index.push(kind, name, summary);
    }

    /// Lists the children of a glob-imported module as if declared in place.
    /// Globs nested inside the imported module are not followed.
    fn push_glob(&self, index: &mut SidebarIndex, module: &RustdocItem) {
        if !is_inner_kind(module, "module") {
            return;
        }
        for child_id in module_items(module) {
            let Some(child) = self.get_item(child_id) else {
                continue;
            };
            if child.crate_id != self.root_crate_id || !self.is_listed(child) {
                continue;
            }
            if is_inner_kind(child, "use") {
                if !is_glob_use(child) {
                    self.push_reexport(index, child);
                }
                continue;
            }
            let Some(kind) = sidebar_kind(child) else {
                continue;
            };
            if let Some(name) = child.name.as_deref().filter(|name| !name.is_empty()) {
                index.push(kind, name, item_summary(child));
            }
        }
    }

    fn is_listed(&self, item: &RustdocItem) -> bool {
        (self.options.include_private || is_public(item))
            && (self.options.include_hidden || !is_doc_hidden(item))
    }

    fn get_item(&self, item_id: u64) -> Option<&'a RustdocItem> {
        self.crate_doc.index.get(&item_id.to_string())
    }
}

fn sidebar_kind(item: &RustdocItem) -> Option<ItemKind> {
    let kind = match inner_kind(item)? {
        "module" => ItemKind::Module,
        "struct" => ItemKind::Struct,
        "enum" => ItemKind::Enum,
        "union" => ItemKind::Union,
        "function" => ItemKind::Function,
        "trait" => ItemKind::Trait,
        "trait_alias" => ItemKind::TraitAlias,
        "type_alias" | "typedef" => ItemKind::TypeAlias,
        "constant" => ItemKind::Constant,
        "static" => ItemKind::Static,
        "macro" => ItemKind::Macro,
        "proc_macro" => proc_macro_kind(item),
        "primitive" => ItemKind::Primitive,
        "extern_type" | "foreign_type" => ItemKind::ForeignType,
        _ => return None,
    };
    Some(kind)
}

fn proc_macro_kind(item: &RustdocItem) -> ItemKind {
    match item
        .inner
        .get("proc_macro")
        .and_then(|value| value.get("kind"))
        .and_then(Value::as_str)
    {
        Some("attr") => ItemKind::Attribute,
        Some("derive") => ItemKind::Derive,
        _ => ItemKind::Macro,
    }
}

fn item_summary(item: &RustdocItem) -> String {
    item.docs.as_deref().map(short_summary).unwrap_or_default()
}

fn is_public(item: &RustdocItem) -> bool {
    item.visibility
        .as_ref()
        .is_none_or(|visibility| visibility.as_str() == Some("public"))
}

fn is_doc_hidden(item: &RustdocItem) -> bool {
    item.attrs.iter().any(|attr| {
        let text = attr
            .as_str()
            .map_or_else(|| attr.to_string(), str::to_string);
        text.replace(' ', "").contains("doc(hidden)")
    })
}

fn is_glob_use(item: &RustdocItem) -> bool {
    item.inner
        .get("use")
        .and_then(|inner| inner.get("is_glob"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn inner_kind(item: &RustdocItem) -> Option<&str> {
    item.inner.keys().next().map(String::as_str)
}

fn is_inner_kind(item: &RustdocItem, kind: &str) -> bool {
    matches!(inner_kind(item), Some(found) if found == kind)
}

fn module_items(item: &RustdocItem) -> Vec<u64> {
    item.inner
        .get("module")
        .and_then(|value| value.get("items"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default()
}
