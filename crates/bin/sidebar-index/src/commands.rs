use std::error::Error;

use sidebar_core::control::{SidebarControlPlane, SidebarIngestRequest};
use sidebar_core::output::write_sidebar_files;
use sidebar_core::parsers::{RustdocJsonParser, RustdocParseOptions, SidebarJsParser};
use sidebar_core::render::render_sidebar_js;
use sidebar_core::validate::{ValidationError, index_issues};
use sidebar_ingest::{IngestServer, IngestServerConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tracing::info;

use crate::config::{CheckConfig, ConvertConfig, RenderConfig, ServeConfig};

type CommandResult = Result<(), Box<dyn Error + Send + Sync>>;

pub async fn render(config: RenderConfig) -> CommandResult {
    let options = RustdocParseOptions::new()
        .with_private(config.include_private)
        .with_hidden(config.include_hidden);
    let parsed = RustdocJsonParser::parse_file(&config.input, options).await?;
    let written = write_sidebar_files(&config.out_dir, &parsed.modules, config.style).await?;

    info!(
        crate_name = parsed.crate_name.as_deref().unwrap_or_default(),
        files = written.len(),
        out_dir = %config.out_dir.display(),
        "rendered sidebar scripts"
    );
    Ok(())
}

/// Prints every issue found in the script and fails if there are any.
pub async fn check(config: CheckConfig) -> CommandResult {
    let parsed = SidebarJsParser::parse_file(&config.file).await?;
    let issues = index_issues(&parsed.index, &config.options);
    for issue in &issues {
        println!("{}: {issue}", config.file.display());
    }
    if !issues.is_empty() {
        return Err(ValidationError { issues }.into());
    }

    info!(
        file = %config.file.display(),
        entries = parsed.index.len(),
        "sidebar script is valid"
    );
    Ok(())
}

pub async fn convert(config: ConvertConfig) -> CommandResult {
    let parsed = SidebarJsParser::parse_file(&config.file).await?;
    let script = render_sidebar_js(&parsed.index, config.style)?;
    println!("{script}");
    Ok(())
}

pub async fn serve(config: ServeConfig) -> CommandResult {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(config.db_namespace.as_str())
        .use_db(config.db_name.as_str())
        .await?;
    let control = SidebarControlPlane::new(db);

    if let Some(seed) = config.seed {
        let script = tokio::fs::read_to_string(&seed.file).await?;
        let report = control
            .ingest_sidebar_js(SidebarIngestRequest {
                project_id: seed.project_id,
                module_path: seed.module_path,
                script,
                ingest_id: None,
                crate_name: None,
                strict: false,
            })
            .await?;
        info!(
            module_path = %report.module_path,
            entries = report.entry_count,
            "seeded sidebar store"
        );
    }

    let server_config = IngestServerConfig::new(config.addr)
        .with_max_body_bytes(config.max_body_bytes)
        .with_request_timeout(config.request_timeout);
    IngestServer::new(control, server_config).serve().await
}
