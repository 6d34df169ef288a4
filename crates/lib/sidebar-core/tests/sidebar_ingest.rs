use std::path::PathBuf;

use sidebar_core::control::{
    ControlError,
    RustdocIngestRequest,
    SidebarControlPlane,
    SidebarIngestRequest,
};
use sidebar_core::parsers::SidebarJsParser;
use sidebar_core::render::SidebarScriptStyle;
use sidebar_core::store::ModuleReplacement;
use sidebar_store::models::{ItemKind, SidebarEntryRecord, SidebarModule};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

const PROJECT_ID: &str = "twilight";
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

async fn build_control_plane(db_name: &str) -> SidebarControlPlane<Db> {
    let db = Surreal::new::<Mem>(())
        .await
        .expect("failed to create in-memory surrealdb instance");
    db.use_ns("sidebar")
        .use_db(db_name)
        .await
        .expect("failed to select surrealdb namespace/db");
    SidebarControlPlane::new(db)
}

fn guild_request(script: String) -> SidebarIngestRequest {
    SidebarIngestRequest {
        project_id: PROJECT_ID.to_string(),
        module_path: GUILD_MODULE.to_string(),
        script,
        ingest_id: Some("fixture".to_string()),
        crate_name: Some("twilight_http".to_string()),
        strict: true,
    }
}

#[tokio::test]
async fn ingest_sidebar_script_roundtrip() {
    let script = load_fixture("guild_sidebar_items.js");
    let expected = SidebarJsParser::parse(&script).expect("fixture should parse").index;
    let control = build_control_plane("script").await;

    let report = control
        .ingest_sidebar_js(guild_request(script.clone()))
        .await
        .expect("ingest should succeed");
    assert_eq!(report.style, SidebarScriptStyle::Legacy);
    assert_eq!(report.entry_count, 25);
    assert_eq!(report.kinds, vec!["mod".to_string(), "struct".to_string()]);
    assert!(report.issues.is_empty());
    assert_eq!(report.ingest_id, "fixture");

    let stored = control
        .get_sidebar(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("sidebar lookup should succeed")
        .expect("sidebar should be stored");
    assert_eq!(stored, expected);

    let rendered = control
        .render_sidebar(PROJECT_ID, GUILD_MODULE, SidebarScriptStyle::Legacy)
        .await
        .expect("render should succeed")
        .expect("sidebar should be stored");
    assert_eq!(rendered, script.trim());

    let kinds = control
        .list_kinds(PROJECT_ID)
        .await
        .expect("kind listing should succeed");
    assert_eq!(kinds, vec!["mod".to_string(), "struct".to_string()]);

    let module = control
        .get_module(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("module lookup should succeed")
        .expect("module should be stored");
    assert_eq!(module.entry_count, 25);
    assert_eq!(module.crate_name.as_deref(), Some("twilight_http"));
    assert!(module.generated_at.is_some());
}

#[tokio::test]
async fn reingest_replaces_previous_entries() {
    let control = build_control_plane("replace").await;
    control
        .ingest_sidebar_js(guild_request(load_fixture("guild_sidebar_items.js")))
        .await
        .expect("first ingest should succeed");

    let replacement = r#"initSidebarItems({"struct":[["GetGuild","Get information about a guild."]]});"#;
    control
        .ingest_sidebar_js(guild_request(replacement.to_string()))
        .await
        .expect("second ingest should succeed");

    let stored = control
        .get_sidebar(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("sidebar lookup should succeed")
        .expect("sidebar should be stored");
    assert_eq!(stored.len(), 1);
    assert!(stored.group(ItemKind::Module).is_none());

    let hits = control
        .search_entries(PROJECT_ID, "getguild", 10)
        .await
        .expect("search should succeed");
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn strict_ingest_rejects_duplicates() {
    let control = build_control_plane("strict").await;
    let script = r#"initSidebarItems({"struct":[["GetGuild",""],["GetGuild",""]]});"#;

    let err = control
        .ingest_sidebar_js(guild_request(script.to_string()))
        .await
        .expect_err("duplicate names should be rejected");
    assert!(matches!(err, ControlError::Validation(_)));

    let mut lenient = guild_request(script.to_string());
    lenient.strict = false;
    let report = control
        .ingest_sidebar_js(lenient)
        .await
        .expect("lenient ingest should succeed");
    assert_eq!(report.issues.len(), 1);
}

#[tokio::test]
async fn ingest_rejects_missing_project() {
    let control = build_control_plane("invalid").await;
    let mut request = guild_request(load_fixture("guild_sidebar_items.js"));
    request.project_id = "  ".to_string();

    let err = control
        .ingest_sidebar_js(request)
        .await
        .expect_err("blank project id should be rejected");
    assert!(err.to_string().contains("project_id is required"));
}

#[tokio::test]
async fn ingest_rustdoc_json_stores_every_module() {
    let control = build_control_plane("rustdoc").await;
    let report = control
        .ingest_rustdoc_json(RustdocIngestRequest {
            project_id: PROJECT_ID.to_string(),
            json: None,
            json_path: Some(fixture_path("twilight_http.json").display().to_string()),
            ingest_id: None,
            include_private: false,
            include_hidden: false,
            strict: true,
        })
        .await
        .expect("rustdoc ingest should succeed");

    assert_eq!(report.crate_name.as_deref(), Some("twilight_http"));
    assert_eq!(report.module_count, 14);
    assert_eq!(report.issue_count, 0);
    assert!(!report.ingest_id.is_empty());

    let modules = control
        .list_modules(PROJECT_ID, 100)
        .await
        .expect("module listing should succeed");
    assert_eq!(modules.len(), 14);

    let guild = control
        .get_sidebar(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("sidebar lookup should succeed")
        .expect("guild sidebar should be stored");
    let expected = SidebarJsParser::parse(&load_fixture("guild_sidebar_items.js"))
        .expect("fixture should parse")
        .index;
    assert_eq!(guild, expected);

    let hits = control
        .search_entries(PROJECT_ID, "widget", 10)
        .await
        .expect("search should succeed");
    let names: Vec<&str> = hits.iter().map(|hit| hit.name.as_str()).collect();
    assert_eq!(names, vec!["GetGuildWidget", "UpdateGuildWidget"]);

    assert!(
        control
            .delete_sidebar(PROJECT_ID, GUILD_MODULE)
            .await
            .expect("delete should succeed")
    );
    assert!(
        control
            .get_sidebar(PROJECT_ID, GUILD_MODULE)
            .await
            .expect("sidebar lookup should succeed")
            .is_none()
    );
}

fn module_record(project_id: &str, module_path: &str, kinds: &[&str], count: u32) -> SidebarModule {
    SidebarModule {
        project_id: project_id.to_string(),
        module_path: module_path.to_string(),
        crate_name: None,
        ingest_id: None,
        source_kind: None,
        style: None,
        entry_count: count,
        kinds: kinds.iter().map(ToString::to_string).collect(),
        generated_at: None,
    }
}

fn entry_record(
    module: &SidebarModule,
    kind: &str,
    name: &str,
    position: u32,
) -> SidebarEntryRecord {
    SidebarEntryRecord {
        project_id: module.project_id.clone(),
        module_path: module.module_path.clone(),
        kind: kind.to_string(),
        name: name.to_string(),
        summary: String::new(),
        position,
        ingest_id: None,
    }
}

#[tokio::test]
async fn separators_in_ids_keep_modules_apart() {
    let control = build_control_plane("separators").await;
    let mut first = guild_request(r#"initSidebarItems({"mod":[["one",""]]});"#.to_string());
    first.project_id = "a|b".to_string();
    first.module_path = "c".to_string();
    control
        .ingest_sidebar_js(first)
        .await
        .expect("first ingest should succeed");

    let mut second = guild_request(r#"initSidebarItems({"struct":[["Two",""]]});"#.to_string());
    second.project_id = "a".to_string();
    second.module_path = "b|c".to_string();
    control
        .ingest_sidebar_js(second)
        .await
        .expect("second ingest should succeed");

    let module = control
        .get_module("a|b", "c")
        .await
        .expect("module lookup should succeed")
        .expect("first module should be stored");
    assert_eq!(module.project_id, "a|b");
    assert_eq!(module.kinds, vec!["mod".to_string()]);

    let first_index = control
        .get_sidebar("a|b", "c")
        .await
        .expect("sidebar lookup should succeed")
        .expect("first sidebar should be stored");
    let kinds: Vec<ItemKind> = first_index.kinds().collect();
    assert_eq!(kinds, vec![ItemKind::Module]);
    assert!(first_index.find(ItemKind::Module, "one").is_some());

    let second_index = control
        .get_sidebar("a", "b|c")
        .await
        .expect("sidebar lookup should succeed")
        .expect("second sidebar should be stored");
    assert!(second_index.find(ItemKind::Struct, "Two").is_some());
    assert!(second_index.group(ItemKind::Module).is_none());
}

#[tokio::test]
async fn failed_batch_replace_leaves_store_unchanged() {
    let control = build_control_plane("atomic").await;
    let store = control.store();
    store
        .db()
        .query(
            "DEFINE INDEX entry_slot ON sidebar_entry FIELDS project_id, module_path, position UNIQUE;",
        )
        .await
        .expect("index definition should run")
        .check()
        .expect("index definition should succeed");

    let guild = module_record(PROJECT_ID, GUILD_MODULE, &["struct"], 1);
    let old_entry = entry_record(&guild, "struct", "GetGuild", 0);
    store
        .replace_module(guild, vec![old_entry])
        .await
        .expect("initial replace should succeed");

    let updated = module_record(PROJECT_ID, GUILD_MODULE, &["struct"], 2);
    let updated_entries = vec![
        entry_record(&updated, "struct", "DeleteGuild", 0),
        entry_record(&updated, "struct", "GetGuild", 1),
    ];
    let broken = module_record(PROJECT_ID, "twilight_http::request::channel", &["struct"], 2);
    let broken_entries = vec![
        entry_record(&broken, "struct", "GetChannel", 0),
        entry_record(&broken, "struct", "DeleteChannel", 0),
    ];

    store
        .replace_modules(vec![
            ModuleReplacement {
                module: updated,
                entries: updated_entries,
            },
            ModuleReplacement {
                module: broken,
                entries: broken_entries,
            },
        ])
        .await
        .expect_err("colliding positions should fail the batch");

    let stored = control
        .get_module(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("module lookup should succeed")
        .expect("module should still be stored");
    assert_eq!(stored.entry_count, 1);
    let index = control
        .get_sidebar(PROJECT_ID, GUILD_MODULE)
        .await
        .expect("sidebar lookup should succeed")
        .expect("sidebar should still be stored");
    assert_eq!(index.len(), 1);
    assert!(index.find(ItemKind::Struct, "DeleteGuild").is_none());
    assert!(
        control
            .get_module(PROJECT_ID, "twilight_http::request::channel")
            .await
            .expect("module lookup should succeed")
            .is_none()
    );
}
