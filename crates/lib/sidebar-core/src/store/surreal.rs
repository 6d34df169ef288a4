use std::{error::Error, fmt, sync::Arc};

use sidebar_store::models::{SidebarEntryRecord, SidebarModule};
use sidebar_store::schema::{TABLE_SIDEBAR_ENTRY, TABLE_SIDEBAR_MODULE, make_module_key};
use surrealdb::{Connection, Surreal};

#[derive(Debug)]
pub enum StoreError {
    Surreal(Box<surrealdb::Error>),
    InvalidInput(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A module record and the entries that replace its stored ones.
#[derive(Debug, Clone)]
pub struct ModuleReplacement {
    pub module: SidebarModule,
    pub entries: Vec<SidebarEntryRecord>,
}

pub struct SurrealSidebarStore<C: Connection> {
    db: Arc<Surreal<C>>,
}

impl<C: Connection> Clone for SurrealSidebarStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealSidebarStore<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db: Arc::new(db),
        }
    }

    #[must_use]
    pub const fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }

    /// Replaces the stored sidebar for a module: prior entries are removed,
    /// the module record is upserted, and the new entries are inserted, all
    /// in one transaction.
    ///
    /// # Errors
    /// Returns `StoreError` if validation fails or a database write fails.
    pub async fn replace_module(
        &self,
        module: SidebarModule,
        entries: Vec<SidebarEntryRecord>,
    ) -> StoreResult<SidebarModule> {
        let project_id = module.project_id.clone();
        let module_path = module.module_path.clone();
        self.replace_modules(vec![ModuleReplacement { module, entries }]).await?;
        self.get_module(&project_id, &module_path)
            .await?
            .ok_or_else(|| {
                StoreError::InvalidInput(format!("No record returned when upserting {module_path}"))
            })
    }

    /// Replaces several modules in a single transaction. Either every module
    /// and its entries are stored, or the store is left unchanged.
    ///
    /// # Errors
    /// Returns `StoreError` if any replacement is invalid or the transaction fails.
    pub async fn replace_modules(&self, replacements: Vec<ModuleReplacement>) -> StoreResult<()> {
        if replacements.is_empty() {
            return Ok(());
        }

        let mut statements = vec!["BEGIN TRANSACTION;".to_string()];
        for (slot, replacement) in replacements.iter().enumerate() {
            check_replacement(replacement)?;
            statements.push(format!(
                "DELETE {TABLE_SIDEBAR_ENTRY} WHERE project_id = $project_{slot} AND module_path = $module_path_{slot};"
            ));
            statements.push(format!(
                "UPSERT type::thing('{TABLE_SIDEBAR_MODULE}', $key_{slot}) CONTENT $module_{slot};"
            ));
            if !replacement.entries.is_empty() {
                statements.push(format!("INSERT INTO {TABLE_SIDEBAR_ENTRY} $entries_{slot};"));
            }
        }
        statements.push("COMMIT TRANSACTION;".to_string());

        let mut query = self.db.query(statements.join("\n"));
        for (slot, ModuleReplacement { module, entries }) in replacements.into_iter().enumerate() {
            let key = make_module_key(&module.project_id, &module.module_path);
            query = query
                .bind((format!("project_{slot}"), module.project_id.clone()))
                .bind((format!("module_path_{slot}"), module.module_path.clone()))
                .bind((format!("key_{slot}"), key))
                .bind((format!("module_{slot}"), module))
                .bind((format!("entries_{slot}"), entries));
        }
        query.await?.check()?;
        Ok(())
    }

    /// Fetches a module record by project and module path.
    ///
    /// # Errors
    /// Returns `StoreError` if the database query fails.
    pub async fn get_module(
        &self,
        project_id: &str,
        module_path: &str,
    ) -> StoreResult<Option<SidebarModule>> {
        let key = make_module_key(project_id, module_path);
        let record: Option<SidebarModule> = self.db.select((TABLE_SIDEBAR_MODULE, key)).await?;
        Ok(record)
    }

    /// Lists module records for a project up to the provided limit.
    ///
    /// # Errors
    /// Returns `StoreError` if the limit is invalid or the database query fails.
    pub async fn list_modules(
        &self,
        project_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<SidebarModule>> {
        let project_id = project_id.to_string();
        let limit = limit_to_i64(limit)?;
        let query = "SELECT * FROM sidebar_module WHERE project_id = $project_id ORDER BY module_path ASC LIMIT $limit;";
        let mut response = self
            .db
            .query(query)
            .bind(("project_id", project_id))
            .bind(("limit", limit))
            .await?;
        let records: Vec<SidebarModule> = response.take(0)?;
        Ok(records)
    }

    /// Lists the entries of a module in display order.
    ///
    /// # Errors
    /// Returns `StoreError` if the database query fails.
    pub async fn list_entries(
        &self,
        project_id: &str,
        module_path: &str,
    ) -> StoreResult<Vec<SidebarEntryRecord>> {
        let project_id = project_id.to_string();
        let module_path = module_path.to_string();
        let query = "SELECT * FROM sidebar_entry WHERE project_id = $project_id AND module_path = $module_path ORDER BY position ASC;";
        let mut response = self
            .db
            .query(query)
            .bind(("project_id", project_id))
            .bind(("module_path", module_path))
            .await?;
        let records: Vec<SidebarEntryRecord> = response.take(0)?;
        Ok(records)
    }

    /// Searches entries by case-insensitive name substring within a project.
    ///
    /// # Errors
    /// Returns `StoreError` if the limit is invalid or the database query fails.
    pub async fn search_entries(
        &self,
        project_id: &str,
        name: &str,
        limit: usize,
    ) -> StoreResult<Vec<SidebarEntryRecord>> {
        let Some(name) = normalize_pattern(name) else {
            return Ok(Vec::new());
        };
        let project_id = project_id.to_string();
        let limit = limit_to_i64(limit)?;
        let query = "SELECT * FROM sidebar_entry WHERE project_id = $project_id AND string::lowercase(name) CONTAINS $name ORDER BY module_path ASC, position ASC LIMIT $limit;";
        let mut response = self
            .db
            .query(query)
            .bind(("project_id", project_id))
            .bind(("name", name))
            .bind(("limit", limit))
            .await?;
        let records: Vec<SidebarEntryRecord> = response.take(0)?;
        Ok(records)
    }

    /// Lists distinct entry kinds for a project.
    ///
    /// # Errors
    /// Returns `StoreError` if the database query fails.
    pub async fn list_kinds(&self, project_id: &str) -> StoreResult<Vec<String>> {
        let project_id = project_id.to_string();
        let query = "SELECT kind FROM sidebar_entry WHERE project_id = $project_id GROUP BY kind;";
        let mut response = self
            .db
            .query(query)
            .bind(("project_id", project_id))
            .await?;
        let records: Vec<EntryKindRow> = response.take(0)?;
        let mut kinds: Vec<String> = records
            .into_iter()
            .filter_map(|row| row.kind)
            .filter(|value| !value.trim().is_empty())
            .collect();
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }

    /// Deletes a module record and its entries. Returns whether a module
    /// record existed.
    ///
    /// # Errors
    /// Returns `StoreError` if the database write fails.
    pub async fn delete_module(&self, project_id: &str, module_path: &str) -> StoreResult<bool> {
        self.delete_entries(project_id, module_path).await?;
        let key = make_module_key(project_id, module_path);
        let removed: Option<SidebarModule> = self.db.delete((TABLE_SIDEBAR_MODULE, key)).await?;
        Ok(removed.is_some())
    }

    async fn delete_entries(&self, project_id: &str, module_path: &str) -> StoreResult<()> {
        let project_id = project_id.to_string();
        let module_path = module_path.to_string();
        let query = "DELETE sidebar_entry WHERE project_id = $project_id AND module_path = $module_path;";
        self.db
            .query(query)
            .bind(("project_id", project_id))
            .bind(("module_path", module_path))
            .await?
            .check()?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, field: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn check_replacement(replacement: &ModuleReplacement) -> StoreResult<()> {
    let module = &replacement.module;
    ensure_non_empty(&module.project_id, "project_id")?;
    ensure_non_empty(&module.module_path, "module_path")?;
    if let Some(stray) = replacement.entries.iter().find(|entry| {
        entry.project_id != module.project_id || entry.module_path != module.module_path
    }) {
        return Err(StoreError::InvalidInput(format!(
            "entry `{}` does not belong to module {}",
            stray.name, module.module_path
        )));
    }
    Ok(())
}

#[derive(serde::Deserialize)]
struct EntryKindRow {
    kind: Option<String>,
}

fn normalize_pattern(pattern: &str) -> Option<String> {
    let trimmed = pattern.trim().to_lowercase();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn limit_to_i64(limit: usize) -> StoreResult<i64> {
    i64::try_from(limit).map_err(|_| {
        StoreError::InvalidInput("limit exceeds supported range".to_string())
    })
}
