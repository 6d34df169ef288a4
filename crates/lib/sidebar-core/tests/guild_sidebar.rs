use std::collections::HashSet;
use std::path::PathBuf;

use sidebar_core::parsers::{RustdocJsonParser, RustdocParseOptions, SidebarJsParser};
use sidebar_core::render::{SidebarScriptStyle, render_sidebar_js};
use sidebar_core::validate::{ValidateOptions, validate_index};
use sidebar_store::models::{ItemKind, SidebarIndex};

const GUILD_MODULE: &str = "twilight_http::request::guild";

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| {
        let path_display = path.display();
        panic!("failed to read fixture at {path_display}: {err}")
    })
}

fn guild_index() -> SidebarIndex {
    SidebarJsParser::parse(&load_fixture("guild_sidebar_items.js"))
        .unwrap_or_else(|err| panic!("failed to parse guild sidebar: {err}"))
        .index
}

#[test]
fn guild_sidebar_has_exactly_mod_and_struct() {
    let index = guild_index();
    let kinds: HashSet<&str> = index.kinds().map(ItemKind::as_str).collect();
    assert_eq!(kinds, HashSet::from(["mod", "struct"]));
}

#[test]
fn guild_sidebar_counts_and_entries() {
    let index = guild_index();

    let mods = index.entries(ItemKind::Module);
    assert_eq!(mods.len(), 11);
    assert!(index.find(ItemKind::Module, "ban").is_some());
    assert!(index.find(ItemKind::Module, "update_guild").is_some());

    assert_eq!(index.entries(ItemKind::Struct).len(), 14);
    assert_eq!(
        index
            .find(ItemKind::Struct, "GetGuild")
            .map(|entry| entry.summary.as_str()),
        Some("Get information about a guild.")
    );
    assert_eq!(
        index
            .find(ItemKind::Struct, "DeleteGuild")
            .map(|entry| entry.summary.as_str()),
        Some("Delete a guild permanently. The user must be the owner.")
    );
}

#[test]
fn guild_sidebar_satisfies_invariants() {
    let index = guild_index();
    let options = ValidateOptions::default()
        .with_expected_kinds([ItemKind::Module, ItemKind::Struct])
        .with_expected_count(ItemKind::Module, 11)
        .with_expected_count(ItemKind::Struct, 14);

    validate_index(&index, &options).unwrap_or_else(|err| panic!("invalid guild sidebar: {err}"));
}

#[test]
fn guild_sidebar_renders_back_to_the_same_script() {
    let source = load_fixture("guild_sidebar_items.js");
    let index = guild_index();

    let rendered = render_sidebar_js(&index, SidebarScriptStyle::Legacy).expect("render");
    assert_eq!(rendered, source.trim());

    let window = render_sidebar_js(&index, SidebarScriptStyle::Window).expect("render");
    let reparsed = SidebarJsParser::parse(&window).expect("window script should parse");
    assert_eq!(reparsed.index, index);
}

#[test]
fn rustdoc_json_derives_the_guild_sidebar() {
    let json = load_fixture("twilight_http.json");
    let output = RustdocJsonParser::parse(&json, &RustdocParseOptions::new())
        .unwrap_or_else(|err| panic!("failed to parse rustdoc fixture: {err}"));

    assert_eq!(output.crate_name.as_deref(), Some("twilight_http"));
    assert_eq!(output.modules.len(), 14);

    let guild = output
        .module(GUILD_MODULE)
        .expect("guild module should be derived");
    assert_eq!(guild.index, guild_index());

    let request = output
        .module("twilight_http::request")
        .expect("request module should be derived");
    assert_eq!(
        request
            .index
            .find(ItemKind::Module, "guild")
            .map(|entry| entry.summary.as_str()),
        Some("Requests for guild resources.")
    );
}

#[test]
fn rustdoc_json_private_items_are_opt_in() {
    let json = load_fixture("twilight_http.json");
    let options = RustdocParseOptions::new().with_private(true);
    let output = RustdocJsonParser::parse(&json, &options).expect("fixture should parse");
    let guild = output.module(GUILD_MODULE).expect("guild module");

    assert!(guild.index.find(ItemKind::Struct, "GuildPath").is_some());
    assert!(guild.index.find(ItemKind::Module, "get_guild_widget").is_some());
    assert!(guild.index.find(ItemKind::Struct, "GuildRequestBuilder").is_none());
    assert!(guild.index.find(ItemKind::Struct, "Client").is_none());
}
