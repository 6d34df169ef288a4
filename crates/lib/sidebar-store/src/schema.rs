pub const TABLE_SIDEBAR_MODULE: &str = "sidebar_module";
pub const TABLE_SIDEBAR_ENTRY: &str = "sidebar_entry";

pub const SOURCE_KIND_SIDEBAR_JS: &str = "sidebar_js";
pub const SOURCE_KIND_RUSTDOC_JSON: &str = "rustdoc_json";

/// Sidebar script file name written next to each module's pages.
pub const SIDEBAR_FILE_NAME: &str = "sidebar-items.js";

/// Record key for a module. The project id is length-prefixed, so no
/// `(project_id, module_path)` pair can collide with another whatever
/// separators either part contains.
pub fn make_module_key(project_id: &str, module_path: &str) -> String {
    format!("{}|{project_id}|{module_path}", project_id.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_keys_do_not_collide_on_separators() {
        assert_ne!(make_module_key("a|b", "c"), make_module_key("a", "b|c"));
        assert_ne!(make_module_key("1|a", "b"), make_module_key("1", "a|b"));
        assert_eq!(
            make_module_key("twilight", "twilight_http::request::guild"),
            "8|twilight|twilight_http::request::guild"
        );
    }
}
