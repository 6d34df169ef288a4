use std::{error::Error, fmt, sync::Arc};

use surrealdb::{Connection, Surreal};

use crate::parsers::{RustdocParseError, SidebarParseError};
use crate::store::{StoreError, SurrealSidebarStore};
use crate::validate::ValidationError;

pub mod data;
pub mod ingest;

pub use ingest::{
    RustdocIngestReport,
    RustdocIngestRequest,
    SidebarIngestReport,
    SidebarIngestRequest,
};

#[derive(Debug)]
pub enum ControlError {
    Parse(SidebarParseError),
    RustdocParse(RustdocParseError),
    Validation(ValidationError),
    Render(serde_json::Error),
    Store(StoreError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::RustdocParse(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "sidebar render error: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {}

impl From<SidebarParseError> for ControlError {
    fn from(err: SidebarParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<RustdocParseError> for ControlError {
    fn from(err: RustdocParseError) -> Self {
        Self::RustdocParse(err)
    }
}

impl From<ValidationError> for ControlError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err)
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

pub struct SidebarControlPlane<C: Connection> {
    store: SurrealSidebarStore<C>,
}

impl<C: Connection> Clone for SidebarControlPlane<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<C: Connection> SidebarControlPlane<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            store: SurrealSidebarStore::new(db),
        }
    }

    pub fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self {
            store: SurrealSidebarStore::from_arc(db),
        }
    }

    pub const fn with_store(store: SurrealSidebarStore<C>) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &SurrealSidebarStore<C> {
        &self.store
    }
}
