use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BundleResult;

/// The language names that mean "do not highlight", on top of [`PLAINTEXT`].
pub const PLAINTEXT_ALIASES: &[&str] = &["text", "txt", "plain"];

/// The canonical plaintext language name.
/// Code rendered with it is passed through without tokenization.
pub const PLAINTEXT: &str = "plaintext";

/// Returns whether the given language name is one of the plaintext markers.
/// A blank name means no language either.
pub fn is_plaintext(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == PLAINTEXT || PLAINTEXT_ALIASES.contains(&name)
}

/// A textmate grammar as the engine expects it.
///
/// Only the metadata needed to put it in a bundle is read, the rest of the grammar is kept
/// as is and handed to the engine untouched.
///
/// # Examples
/// ```json
/// {
///   "name": "javascript",
///   "scopeName": "source.js",
///   "displayName": "JavaScript",
///   "aliases": ["js"],
///   "patterns": [{ "include": "#statements" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRegistration {
    /// The name users refer to
    pub name: String,
    /// The root scope of the grammar
    /// Example: "source.js"
    pub scope_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Other names this language can be requested with
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Languages that this grammar includes and that need to be loaded with it
    #[serde(default)]
    pub embedded_langs: Vec<String>,
    /// Everything else: patterns, repository, injections...
    #[serde(flatten)]
    pub grammar: Map<String, Value>,
}

impl LanguageRegistration {
    /// Reads a grammar JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> BundleResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// What a language resolves to: the grammars to give to the engine, dependencies first.
///
/// The plaintext language resolves to an empty input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LanguageInput(Vec<Arc<LanguageRegistration>>);

impl LanguageInput {
    pub fn new(registrations: Vec<Arc<LanguageRegistration>>) -> Self {
        Self(registrations)
    }

    /// The input of a language that does not tokenize anything
    pub fn plaintext() -> Self {
        Self(Vec::new())
    }

    pub fn is_plaintext(&self) -> bool {
        self.0.is_empty()
    }

    pub fn registrations(&self) -> &[Arc<LanguageRegistration>] {
        &self.0
    }

    /// The main language of this input, which comes after the ones it embeds
    pub fn main(&self) -> Option<&LanguageRegistration> {
        self.0.last().map(|r| r.as_ref())
    }

    /// The name to highlight this input with
    pub fn name(&self) -> &str {
        self.main().map(|r| r.name.as_str()).unwrap_or(PLAINTEXT)
    }
}

impl From<LanguageRegistration> for LanguageInput {
    fn from(registration: LanguageRegistration) -> Self {
        Self(vec![Arc::new(registration)])
    }
}

impl From<Arc<LanguageRegistration>> for LanguageInput {
    fn from(registration: Arc<LanguageRegistration>) -> Self {
        Self(vec![registration])
    }
}
