use sidebar_store::models::{SidebarEntryRecord, SidebarIndex, SidebarModule};
use surrealdb::Connection;

use crate::render::{SidebarScriptStyle, render_sidebar_js};
use crate::store::StoreError;

use super::{ControlError, SidebarControlPlane};

impl<C: Connection> SidebarControlPlane<C> {
    /// Fetches the stored module record.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn get_module(
        &self,
        project_id: &str,
        module_path: &str,
    ) -> Result<Option<SidebarModule>, ControlError> {
        Ok(self.store.get_module(project_id, module_path).await?)
    }

    /// Rebuilds the stored sidebar index for a module, in its original order.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails or a stored kind is unknown.
    pub async fn get_sidebar(
        &self,
        project_id: &str,
        module_path: &str,
    ) -> Result<Option<SidebarIndex>, ControlError> {
        let Some(module) = self.store.get_module(project_id, module_path).await? else {
            return Ok(None);
        };
        let entries = self.store.list_entries(project_id, module_path).await?;
        let index = SidebarIndex::from_records(&module.kinds, entries)
            .map_err(|err| StoreError::InvalidInput(err.to_string()))?;
        Ok(Some(index))
    }

    /// Renders the stored sidebar for a module as a script.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query or rendering fails.
    pub async fn render_sidebar(
        &self,
        project_id: &str,
        module_path: &str,
        style: SidebarScriptStyle,
    ) -> Result<Option<String>, ControlError> {
        let Some(index) = self.get_sidebar(project_id, module_path).await? else {
            return Ok(None);
        };
        Ok(Some(render_sidebar_js(&index, style)?))
    }

    /// Searches entries by name.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn search_entries(
        &self,
        project_id: &str,
        name: &str,
        limit: usize,
    ) -> Result<Vec<SidebarEntryRecord>, ControlError> {
        Ok(self.store.search_entries(project_id, name, limit).await?)
    }

    /// Lists distinct entry kinds for a project.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn list_kinds(&self, project_id: &str) -> Result<Vec<String>, ControlError> {
        Ok(self.store.list_kinds(project_id).await?)
    }

    /// Lists stored modules for a project.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn list_modules(
        &self,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<SidebarModule>, ControlError> {
        Ok(self.store.list_modules(project_id, limit).await?)
    }

    /// Removes a module's stored sidebar.
    ///
    /// # Errors
    /// Returns `ControlError` if the store write fails.
    pub async fn delete_sidebar(
        &self,
        project_id: &str,
        module_path: &str,
    ) -> Result<bool, ControlError> {
        Ok(self.store.delete_module(project_id, module_path).await?)
    }
}
