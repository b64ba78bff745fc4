use std::ops::Deref;
use std::sync::Arc;

use futures::future;
use log::{debug, trace};

use crate::bundle::Bundle;
use crate::engine::{Engine, EngineOptions};
use crate::error::{BundleResult, Error};
use crate::grammars::LanguageInput;
use crate::references::{LanguageRef, ThemeRef};
use crate::themes::ThemeInput;

/// What to load in a highlighter when creating it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlighterOptions<O = ()> {
    pub(crate) themes: Vec<ThemeRef>,
    pub(crate) langs: Vec<LanguageRef>,
    pub(crate) engine: O,
}

impl<O: Default> HighlighterOptions<O> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O> HighlighterOptions<O> {
    /// Adds a theme to load
    pub fn theme(mut self, theme: impl Into<ThemeRef>) -> Self {
        self.themes.push(theme.into());
        self
    }

    /// Adds themes to load, in order
    pub fn themes<T: Into<ThemeRef>>(mut self, themes: impl IntoIterator<Item = T>) -> Self {
        self.themes.extend(themes.into_iter().map(Into::into));
        self
    }

    /// Adds a language to load
    pub fn lang(mut self, lang: impl Into<LanguageRef>) -> Self {
        self.langs.push(lang.into());
        self
    }

    /// Adds languages to load, in order
    pub fn langs<T: Into<LanguageRef>>(mut self, langs: impl IntoIterator<Item = T>) -> Self {
        self.langs.extend(langs.into_iter().map(Into::into));
        self
    }

    /// Options given as is to the engine
    pub fn engine_options(mut self, options: O) -> Self {
        self.engine = options;
        self
    }
}

/// Builds highlighters where languages and themes can be asked for by id.
///
/// Every call to [`BundleFactory::get_highlighter`] creates a new engine, use
/// [`SingletonHighlighter`](crate::SingletonHighlighter) to share one.
pub struct BundleFactory<E: Engine> {
    bundle: Arc<Bundle>,
    loader: E::Loader,
}

impl<E: Engine> Clone for BundleFactory<E> {
    fn clone(&self) -> Self {
        Self {
            bundle: Arc::clone(&self.bundle),
            loader: self.loader.clone(),
        }
    }
}

impl<E: Engine> BundleFactory<E> {
    /// The loader is not used here, it is given to the engine every time one is created.
    pub fn new(bundle: Bundle, loader: E::Loader) -> Self {
        Self {
            bundle: Arc::new(bundle),
            loader,
        }
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Creates a new engine with the requested themes and languages.
    ///
    /// All references are resolved before the engine is created: if one of them isn't in the
    /// bundle, nothing is created.
    pub async fn get_highlighter(
        &self,
        options: HighlighterOptions<E::Options>,
    ) -> BundleResult<BundledHighlighter<E>> {
        let themes = self.bundle.resolve_themes(&options.themes)?;
        let langs = self.bundle.resolve_languages(&options.langs)?;

        debug!(
            "Creating engine with {} theme(s) and {} language(s)",
            themes.len(),
            langs.len()
        );
        let engine = E::create(EngineOptions {
            themes,
            langs,
            loader: self.loader.clone(),
            options: options.engine,
        })
        .await
        .map_err(Error::engine)?;

        Ok(BundledHighlighter {
            engine,
            bundle: Arc::clone(&self.bundle),
        })
    }
}

/// An engine that can load languages and themes by bundle id.
///
/// Everything else the engine does is available directly through `Deref`.
#[derive(Debug)]
pub struct BundledHighlighter<E: Engine> {
    engine: E,
    bundle: Arc<Bundle>,
}

impl<E: Engine> BundledHighlighter<E> {
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Loads more languages, resolved from the bundle
    pub async fn load_language(&self, langs: &[LanguageRef]) -> BundleResult<()> {
        let langs = self.bundle.resolve_languages(langs)?;
        self.load_resolved_languages(langs).await
    }

    /// Loads more themes, resolved from the bundle
    pub async fn load_theme(&self, themes: &[ThemeRef]) -> BundleResult<()> {
        let themes = self.bundle.resolve_themes(themes)?;
        self.load_resolved_themes(themes).await
    }

    /// Loads themes and languages at the same time.
    ///
    /// Nothing is loaded if a reference is not in the bundle. Otherwise both loads run to
    /// completion and the first error, themes first, is returned.
    pub async fn load(&self, themes: &[ThemeRef], langs: &[LanguageRef]) -> BundleResult<()> {
        let themes = self.bundle.resolve_themes(themes)?;
        let langs = self.bundle.resolve_languages(langs)?;
        let (themes_res, langs_res) = future::join(
            self.load_resolved_themes(themes),
            self.load_resolved_languages(langs),
        )
        .await;
        themes_res?;
        langs_res
    }

    async fn load_resolved_languages(&self, langs: Vec<LanguageInput>) -> BundleResult<()> {
        if langs.is_empty() {
            return Ok(());
        }
        trace!("Loading {} language(s)", langs.len());
        self.engine.load_language(langs).await.map_err(Error::engine)
    }

    async fn load_resolved_themes(&self, themes: Vec<ThemeInput>) -> BundleResult<()> {
        if themes.is_empty() {
            return Ok(());
        }
        trace!("Loading {} theme(s)", themes.len());
        self.engine.load_theme(themes).await.map_err(Error::engine)
    }
}

impl<E: Engine> Deref for BundledHighlighter<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}
