//! Sidebar script rendering.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sidebar_store::models::SidebarIndex;

pub(crate) const LEGACY_PREFIX: &str = "initSidebarItems(";
pub(crate) const WINDOW_PREFIX: &str = "window.SIDEBAR_ITEMS";

/// Wrapper around the JSON payload that the site renderer loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarScriptStyle {
    /// `initSidebarItems({...});`
    #[default]
    Legacy,
    /// `window.SIDEBAR_ITEMS = {...};`
    Window,
    /// The bare JSON object.
    Json,
}

impl SidebarScriptStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Window => "window",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for SidebarScriptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStyleError(String);

impl fmt::Display for ParseStyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sidebar script style: {} (expected legacy, window, or json)",
            self.0
        )
    }
}

impl Error for ParseStyleError {}

impl FromStr for SidebarScriptStyle {
    type Err = ParseStyleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "window" => Ok(Self::Window),
            "json" => Ok(Self::Json),
            _ => Err(ParseStyleError(value.to_string())),
        }
    }
}

/// Renders a sidebar index as a script in the requested style.
///
/// The JSON payload is compact and keeps group and entry order, so parsing
/// the output yields the same index.
///
/// # Errors
/// Returns `serde_json::Error` if the index cannot be serialized.
pub fn render_sidebar_js(
    index: &SidebarIndex,
    style: SidebarScriptStyle,
) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string(index)?;
    Ok(match style {
        SidebarScriptStyle::Legacy => format!("{LEGACY_PREFIX}{payload});"),
        SidebarScriptStyle::Window => format!("{WINDOW_PREFIX} = {payload};"),
        SidebarScriptStyle::Json => payload,
    })
}
