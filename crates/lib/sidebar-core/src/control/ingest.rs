use serde::{Deserialize, Serialize};
use sidebar_store::models::{SidebarEntryRecord, SidebarIndex, SidebarModule};
use sidebar_store::schema::{SOURCE_KIND_RUSTDOC_JSON, SOURCE_KIND_SIDEBAR_JS};
use surrealdb::Connection;
use tracing::{debug, info, warn};

use crate::parsers::{RustdocJsonParser, RustdocParseOptions, SidebarJsParser};
use crate::render::SidebarScriptStyle;
use crate::store::{ModuleReplacement, StoreError};
use crate::validate::{ValidateOptions, ValidationError, index_issues};

use super::{ControlError, SidebarControlPlane};

/// Input payload for ingesting a generated sidebar script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarIngestRequest {
    pub project_id: String,
    pub module_path: String,
    pub script: String,
    #[serde(default)]
    pub ingest_id: Option<String>,
    #[serde(default)]
    pub crate_name: Option<String>,
    /// Reject the script when the index has issues instead of logging them.
    #[serde(default)]
    pub strict: bool,
}

/// Summary of a sidebar script ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarIngestReport {
    pub module_path: String,
    pub style: SidebarScriptStyle,
    pub entry_count: usize,
    pub kinds: Vec<String>,
    pub issues: Vec<String>,
    pub ingest_id: String,
}

/// Input payload for deriving sidebars from rustdoc JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RustdocIngestRequest {
    pub project_id: String,
    #[serde(default)]
    pub json: Option<String>,
    /// Path read on the local filesystem. Only local callers may set it; the
    /// HTTP server rejects requests that carry one.
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub ingest_id: Option<String>,
    #[serde(default)]
    pub include_private: bool,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub strict: bool,
}

/// Summary of a rustdoc JSON ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RustdocIngestReport {
    pub crate_name: Option<String>,
    pub module_count: usize,
    pub entry_count: usize,
    pub issue_count: usize,
    pub ingest_id: String,
}

struct ModuleWrite<'a> {
    project_id: &'a str,
    module_path: &'a str,
    crate_name: Option<&'a str>,
    ingest_id: &'a str,
    source_kind: &'a str,
    style: Option<SidebarScriptStyle>,
    generated_at: &'a str,
}

impl<C: Connection> SidebarControlPlane<C> {
    /// Ingests a sidebar script for one module, replacing any stored copy.
    ///
    /// # Errors
    /// Returns `ControlError` if validation fails, parsing fails, or store writes fail.
    pub async fn ingest_sidebar_js(
        &self,
        request: SidebarIngestRequest,
    ) -> Result<SidebarIngestReport, ControlError> {
        let SidebarIngestRequest {
            project_id,
            module_path,
            script,
            ingest_id,
            crate_name,
            strict,
        } = request;

        require_field(&project_id, "project_id")?;
        require_field(&module_path, "module_path")?;

        let parsed = SidebarJsParser::parse_async(script).await?;
        let issues = checked_issues(&module_path, &parsed.index, strict)?;

        let ingest_id = ingest_id.unwrap_or_else(new_ingest_id);
        let generated_at = chrono::Utc::now().to_rfc3339();
        let replacement = module_replacement(
            &ModuleWrite {
                project_id: &project_id,
                module_path: &module_path,
                crate_name: crate_name.as_deref(),
                ingest_id: &ingest_id,
                source_kind: SOURCE_KIND_SIDEBAR_JS,
                style: Some(parsed.style),
                generated_at: &generated_at,
            },
            &parsed.index,
        )?;
        self.store
            .replace_module(replacement.module, replacement.entries)
            .await?;

        info!(
            project_id = %project_id,
            module_path = %module_path,
            entries = parsed.index.len(),
            "ingested sidebar script"
        );
        Ok(SidebarIngestReport {
            module_path,
            style: parsed.style,
            entry_count: parsed.index.len(),
            kinds: kind_keys(&parsed.index),
            issues,
            ingest_id,
        })
    }

    /// Derives and stores a sidebar for every module in rustdoc JSON output.
    ///
    /// # Errors
    /// Returns `ControlError` if validation fails, parsing fails, or store writes fail.
    pub async fn ingest_rustdoc_json(
        &self,
        request: RustdocIngestRequest,
    ) -> Result<RustdocIngestReport, ControlError> {
        let RustdocIngestRequest {
            project_id,
            json,
            json_path,
            ingest_id,
            include_private,
            include_hidden,
            strict,
        } = request;

        require_field(&project_id, "project_id")?;

        let options = RustdocParseOptions::new()
            .with_private(include_private)
            .with_hidden(include_hidden);
        let parsed = match (json, json_path) {
            (Some(json), _) => RustdocJsonParser::parse_async(json, options).await?,
            (None, Some(path)) => RustdocJsonParser::parse_file(path, options).await?,
            (None, None) => {
                return Err(ControlError::Store(StoreError::InvalidInput(
                    "json or json_path is required".to_string(),
                )));
            }
        };

        let mut issue_count = 0;
        for module in &parsed.modules {
            issue_count += checked_issues(&module.module_path, &module.index, strict)?.len();
        }

        let ingest_id = ingest_id.unwrap_or_else(new_ingest_id);
        let generated_at = chrono::Utc::now().to_rfc3339();
        let replacements = parsed
            .modules
            .iter()
            .map(|module| {
                module_replacement(
                    &ModuleWrite {
                        project_id: &project_id,
                        module_path: &module.module_path,
                        crate_name: parsed.crate_name.as_deref(),
                        ingest_id: &ingest_id,
                        source_kind: SOURCE_KIND_RUSTDOC_JSON,
                        style: None,
                        generated_at: &generated_at,
                    },
                    &module.index,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.store.replace_modules(replacements).await?;

        info!(
            project_id = %project_id,
            crate_name = parsed.crate_name.as_deref().unwrap_or_default(),
            modules = parsed.modules.len(),
            "ingested rustdoc JSON"
        );
        Ok(RustdocIngestReport {
            crate_name: parsed.crate_name.clone(),
            module_count: parsed.modules.len(),
            entry_count: parsed.entry_count(),
            issue_count,
            ingest_id,
        })
    }
}

fn module_replacement(
    write: &ModuleWrite<'_>,
    index: &SidebarIndex,
) -> Result<ModuleReplacement, StoreError> {
    let entries = SidebarEntryRecord::from_index(
        write.project_id,
        write.module_path,
        Some(write.ingest_id),
        index,
    )
    .map_err(|_| too_many_entries(write.module_path))?;
    let module = SidebarModule {
        project_id: write.project_id.to_string(),
        module_path: write.module_path.to_string(),
        crate_name: write.crate_name.map(str::to_string),
        ingest_id: Some(write.ingest_id.to_string()),
        source_kind: Some(write.source_kind.to_string()),
        style: write.style.map(|style| style.as_str().to_string()),
        entry_count: stored_count(index.len(), write.module_path)?,
        kinds: kind_keys(index),
        generated_at: Some(write.generated_at.to_string()),
    };
    debug!(
        module_path = %module.module_path,
        entries = module.entry_count,
        "prepared sidebar module"
    );
    Ok(ModuleReplacement { module, entries })
}

fn stored_count(count: usize, module_path: &str) -> Result<u32, StoreError> {
    u32::try_from(count).map_err(|_| too_many_entries(module_path))
}

fn too_many_entries(module_path: &str) -> StoreError {
    StoreError::InvalidInput(format!("module {module_path} has too many entries to store"))
}

/// Returns the issues of `index` as messages, failing instead when `strict`.
fn checked_issues(
    module_path: &str,
    index: &SidebarIndex,
    strict: bool,
) -> Result<Vec<String>, ValidationError> {
    let issues = index_issues(index, &ValidateOptions::default());
    if strict && !issues.is_empty() {
        return Err(ValidationError { issues });
    }
    Ok(issues
        .iter()
        .map(|issue| {
            warn!(module_path = %module_path, %issue, "sidebar index issue");
            issue.to_string()
        })
        .collect())
}

fn require_field(value: &str, field: &str) -> Result<(), ControlError> {
    if value.trim().is_empty() {
        return Err(ControlError::Store(StoreError::InvalidInput(format!(
            "{field} is required"
        ))));
    }
    Ok(())
}

fn kind_keys(index: &SidebarIndex) -> Vec<String> {
    index.kinds().map(|kind| kind.as_str().to_string()).collect()
}

fn new_ingest_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
