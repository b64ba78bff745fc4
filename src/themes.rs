use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BundleResult;

/// Whether a theme is meant for a light or a dark background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    Light,
    #[default]
    Dark,
}

/// A VSCode theme as the engine expects it.
///
/// Like for grammars, only the metadata is read here: `colors`, `tokenColors` and
/// everything else is forwarded to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRegistration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub theme_type: ThemeType,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ThemeRegistration {
    /// Reads a theme JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> BundleResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// What a theme resolves to
pub type ThemeInput = Arc<ThemeRegistration>;
