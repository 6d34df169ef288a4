//! Sidebar script parser.

use std::{error::Error, fmt, path::Path};

use sidebar_store::models::SidebarIndex;
use tracing::debug;

use crate::render::{LEGACY_PREFIX, SidebarScriptStyle, WINDOW_PREFIX};

/// Output from parsing a sidebar script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarJsParseOutput {
    pub style: SidebarScriptStyle,
    pub index: SidebarIndex,
}

/// Error type for sidebar script parse failures.
#[derive(Debug)]
pub struct SidebarParseError {
    message: String,
}

impl SidebarParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SidebarParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sidebar script parse error: {}", self.message)
    }
}

impl Error for SidebarParseError {}

impl From<serde_json::Error> for SidebarParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for SidebarParseError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SidebarParseError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(err.to_string())
    }
}

/// Parser for generated sidebar scripts.
pub struct SidebarJsParser;

impl SidebarJsParser {
    /// Parses a sidebar script in any supported style.
    ///
    /// # Errors
    /// Returns `SidebarParseError` if the wrapper is not recognized or the
    /// payload is not a valid sidebar index.
    pub fn parse(source: &str) -> Result<SidebarJsParseOutput, SidebarParseError> {
        let (style, payload) = split_script(source)?;
        let index: SidebarIndex = serde_json::from_str(payload)?;
        debug!(%style, entries = index.len(), "parsed sidebar script");
        Ok(SidebarJsParseOutput { style, index })
    }

    /// Parses a sidebar script asynchronously using a blocking task.
    ///
    /// # Errors
    /// Returns `SidebarParseError` if parsing fails or the task panics.
    pub async fn parse_async(source: String) -> Result<SidebarJsParseOutput, SidebarParseError> {
        tokio::task::spawn_blocking(move || Self::parse(&source)).await?
    }

    /// Parses a sidebar script from a file path.
    ///
    /// # Errors
    /// Returns `SidebarParseError` if the file cannot be read or parsed.
    pub async fn parse_file(
        path: impl AsRef<Path>,
    ) -> Result<SidebarJsParseOutput, SidebarParseError> {
        let source = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse_async(source).await
    }
}

fn split_script(source: &str) -> Result<(SidebarScriptStyle, &str), SidebarParseError> {
    let trimmed = source.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    if let Some(rest) = trimmed.strip_prefix(LEGACY_PREFIX) {
        let payload = rest
            .strip_suffix(')')
            .ok_or_else(|| SidebarParseError::new("unterminated initSidebarItems call"))?;
        return Ok((SidebarScriptStyle::Legacy, payload.trim()));
    }
    if let Some(rest) = trimmed.strip_prefix(WINDOW_PREFIX) {
        let payload = rest
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(|| SidebarParseError::new("missing `=` after window.SIDEBAR_ITEMS"))?;
        return Ok((SidebarScriptStyle::Window, payload.trim()));
    }
    if trimmed.starts_with('{') {
        return Ok((SidebarScriptStyle::Json, trimmed));
    }
    Err(SidebarParseError::new(
        "unrecognized sidebar script; expected initSidebarItems(...), window.SIDEBAR_ITEMS = ..., or a JSON object",
    ))
}
