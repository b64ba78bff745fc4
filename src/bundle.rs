use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{AssetKind, BundleResult, Error};
use crate::grammars::{LanguageInput, LanguageRegistration, is_plaintext};
use crate::references::{LanguageRef, ThemeRef};
use crate::themes::{ThemeInput, ThemeRegistration};

/// The fixed set of languages and themes a highlighter can be built from, by id.
///
/// A bundle is only read once handed to a [`BundleFactory`](crate::BundleFactory), resolving
/// the same reference twice always gives the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Bundle {
    // language id or alias -> grammars to load for it
    languages: HashMap<String, LanguageInput>,
    // theme id -> theme
    themes: HashMap<String, ThemeInput>,
}

impl Bundle {
    /// Creates a bundle from tables built elsewhere.
    pub fn new(
        languages: HashMap<String, LanguageInput>,
        themes: HashMap<String, ThemeInput>,
    ) -> Self {
        Self { languages, themes }
    }

    /// Adds a language under its name and all of its aliases.
    ///
    /// Languages listed in `embeddedLangs` are loaded along with it, so they need to be added
    /// to the bundle first. Missing ones are skipped.
    pub fn add_language(&mut self, registration: LanguageRegistration) {
        let registration = Arc::new(registration);
        let mut registrations = Vec::new();
        let mut seen = HashSet::from([registration.name.clone()]);

        for name in &registration.embedded_langs {
            match self.languages.get(name) {
                Some(input) => {
                    for r in input.registrations() {
                        if seen.insert(r.name.clone()) {
                            registrations.push(Arc::clone(r));
                        }
                    }
                }
                None => debug!(
                    "Embedded language `{name}` of `{}` is not in the bundle, skipping it",
                    registration.name
                ),
            }
        }
        registrations.push(Arc::clone(&registration));

        let input = LanguageInput::new(registrations);
        for alias in &registration.aliases {
            self.languages.insert(alias.clone(), input.clone());
        }
        self.languages.insert(registration.name.clone(), input);
    }

    /// Reads the file and add it as a language.
    pub fn add_language_from_path(&mut self, path: impl AsRef<Path>) -> BundleResult<()> {
        let registration = LanguageRegistration::load_from_file(path)?;
        self.add_language(registration);
        Ok(())
    }

    /// Adds an alias for the given language, does nothing if the language is not in the bundle
    pub fn add_alias(&mut self, language: &str, alias: &str) {
        if let Some(input) = self.languages.get(language) {
            let input = input.clone();
            self.languages.insert(alias.to_string(), input);
        }
    }

    /// Adds a theme, under its name.
    pub fn add_theme(&mut self, theme: ThemeRegistration) {
        self.themes.insert(theme.name.clone(), Arc::new(theme));
    }

    /// Reads the file and add it as a theme.
    pub fn add_theme_from_path(&mut self, path: impl AsRef<Path>) -> BundleResult<()> {
        let theme = ThemeRegistration::load_from_file(path)?;
        self.add_theme(theme);
        Ok(())
    }

    /// Checks whether the given id is a language of the bundle, aliases included.
    /// Plaintext markers are not part of any bundle.
    pub fn contains_language(&self, id: &str) -> bool {
        self.languages.contains_key(id)
    }

    /// Checks whether the given id is a theme of the bundle
    pub fn contains_theme(&self, id: &str) -> bool {
        self.themes.contains_key(id)
    }

    /// All the languages in the bundle, sorted by name. Aliases are not repeated.
    pub fn languages_info(&self) -> Vec<&LanguageRegistration> {
        let mut seen = HashSet::new();
        let mut out: Vec<_> = self
            .languages
            .values()
            .filter_map(|input| input.main())
            .filter(|r| seen.insert(r.name.clone()))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// All the themes in the bundle, sorted by name.
    pub fn themes_info(&self) -> Vec<&ThemeRegistration> {
        let mut out: Vec<_> = self.themes.values().map(|t| t.as_ref()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Turns a language reference into what the engine needs.
    ///
    /// Plaintext resolves to an empty input whatever the bundle contains and inline
    /// definitions are returned unchanged.
    pub fn resolve_language(&self, reference: &LanguageRef) -> BundleResult<LanguageInput> {
        match reference {
            LanguageRef::Plaintext => Ok(LanguageInput::plaintext()),
            LanguageRef::Bundled(id) if is_plaintext(id) => Ok(LanguageInput::plaintext()),
            LanguageRef::Bundled(id) => {
                trace!("Resolving bundled language `{id}`");
                self.languages
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::not_bundled(AssetKind::Language, id))
            }
            LanguageRef::Inline(input) => Ok(input.clone()),
        }
    }

    /// Turns a theme reference into what the engine needs.
    pub fn resolve_theme(&self, reference: &ThemeRef) -> BundleResult<ThemeInput> {
        match reference {
            ThemeRef::Bundled(id) => {
                trace!("Resolving bundled theme `{id}`");
                self.themes
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::not_bundled(AssetKind::Theme, id))
            }
            ThemeRef::Inline(theme) => Ok(Arc::clone(theme)),
        }
    }

    /// Resolves all the references, stopping at the first one not in the bundle.
    pub fn resolve_languages(&self, references: &[LanguageRef]) -> BundleResult<Vec<LanguageInput>> {
        references
            .iter()
            .map(|r| self.resolve_language(r))
            .collect()
    }

    /// Resolves all the references, stopping at the first one not in the bundle.
    /// Blank ids are skipped.
    pub fn resolve_themes(&self, references: &[ThemeRef]) -> BundleResult<Vec<ThemeInput>> {
        references
            .iter()
            .filter(|r| !r.is_blank())
            .map(|r| self.resolve_theme(r))
            .collect()
    }

    #[cfg(feature = "dump")]
    /// Dump the bundle to a zstd-compressed file that can be loaded later
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> BundleResult<()> {
        let file = std::fs::File::create(path)?;
        let mut encoder = zstd::Encoder::new(file, 0)?;
        serde_json::to_writer(&mut encoder, self)?;
        encoder.finish()?;
        Ok(())
    }

    #[cfg(feature = "dump")]
    /// Load a bundle from bytes written by [`Bundle::dump_to_file`]
    pub fn load_from_bytes(compressed_data: &[u8]) -> BundleResult<Self> {
        let data = zstd::decode_all(compressed_data)?;
        Ok(serde_json::from_slice(&data)?)
    }

    #[cfg(feature = "dump")]
    /// Read a bundle dump from a file
    pub fn load_from_file(path: impl AsRef<Path>) -> BundleResult<Self> {
        let compressed_data = std::fs::read(path)?;
        Self::load_from_bytes(&compressed_data)
    }
}
