//! Sidebar script output layout.

use std::path::{Path, PathBuf};

use sidebar_store::schema::SIDEBAR_FILE_NAME;
use tracing::debug;

use crate::parsers::ModuleSidebar;
use crate::render::{SidebarScriptStyle, render_sidebar_js};

/// Maps `a::b::c` to `out_dir/a/b/c/sidebar-items.js`.
#[must_use]
pub fn sidebar_path(out_dir: &Path, module_path: &str) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    for segment in module_path.split("::").filter(|segment| !segment.is_empty()) {
        path.push(segment);
    }
    path.push(SIDEBAR_FILE_NAME);
    path
}

/// Writes one sidebar script per module and returns the written paths.
///
/// # Errors
/// Returns `std::io::Error` if a directory or file cannot be written.
pub async fn write_sidebar_files(
    out_dir: &Path,
    modules: &[ModuleSidebar],
    style: SidebarScriptStyle,
) -> std::io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(modules.len());
    for module in modules {
        let path = sidebar_path(out_dir, &module.module_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let script = render_sidebar_js(&module.index, style)?;
        tokio::fs::write(&path, script).await?;
        debug!(path = %path.display(), entries = module.index.len(), "wrote sidebar script");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use sidebar_store::models::{ItemKind, SidebarIndex};

    use super::*;
    use crate::parsers::SidebarJsParser;

    #[test]
    fn maps_module_path_to_directories() {
        let path = sidebar_path(Path::new("doc"), "twilight_http::request::guild");
        assert_eq!(
            path,
            Path::new("doc/twilight_http/request/guild/sidebar-items.js")
        );
    }

    #[tokio::test]
    async fn writes_parseable_scripts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut index = SidebarIndex::new();
        index.push(ItemKind::Struct, "GetGuild", "Get information about a guild.");
        let modules = vec![ModuleSidebar {
            module_path: "twilight_http::request::guild".to_string(),
            index: index.clone(),
        }];

        let written = write_sidebar_files(dir.path(), &modules, SidebarScriptStyle::Legacy)
            .await
            .expect("write should succeed");

        assert_eq!(written.len(), 1);
        let parsed = SidebarJsParser::parse_file(&written[0])
            .await
            .expect("written script should parse");
        assert_eq!(parsed.index, index);
    }
}
