use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use tokio::sync::OnceCell;

use crate::engine::{
    CodeToHtmlOptions, CodeToHtmlThemesOptions, CodeToTokensOptions, Engine, ThemedToken,
};
use crate::error::{BundleResult, Error};
use crate::factory::{BundleFactory, BundledHighlighter, HighlighterOptions};
use crate::grammars::LanguageInput;
use crate::references::{LanguageRef, ThemeRef};
use crate::themes::ThemeInput;

/// Options for rendering a snippet with one theme
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub(crate) lang: LanguageRef,
    pub(crate) theme: ThemeRef,
}

impl RenderOptions {
    pub fn new(lang: impl Into<LanguageRef>, theme: impl Into<ThemeRef>) -> Self {
        Self {
            lang: lang.into(),
            theme: theme.into(),
        }
    }
}

/// Options for rendering a snippet with several themes at once.
///
/// Roles without a theme are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiThemeRenderOptions {
    pub(crate) lang: LanguageRef,
    pub(crate) themes: BTreeMap<String, Option<ThemeRef>>,
    pub(crate) default_color: Option<String>,
}

impl MultiThemeRenderOptions {
    pub fn new(lang: impl Into<LanguageRef>) -> Self {
        Self {
            lang: lang.into(),
            themes: BTreeMap::new(),
            default_color: None,
        }
    }

    /// Sets the theme for the given role, eg `light` or `dark`
    pub fn theme(mut self, role: impl Into<String>, theme: impl Into<ThemeRef>) -> Self {
        self.themes.insert(role.into(), Some(theme.into()));
        self
    }

    /// Sets all the roles at once, some of them possibly without theme
    pub fn themes<K, T>(mut self, themes: impl IntoIterator<Item = (K, Option<T>)>) -> Self
    where
        K: Into<String>,
        T: Into<ThemeRef>,
    {
        self.themes.extend(
            themes
                .into_iter()
                .map(|(role, theme)| (role.into(), theme.map(Into::into))),
        );
        self
    }

    /// Which role is applied by default
    pub fn default_color(mut self, role: impl Into<String>) -> Self {
        self.default_color = Some(role.into());
        self
    }

    /// The roles that have an actual theme
    fn set_themes(&self) -> impl Iterator<Item = (&String, &ThemeRef)> {
        self.themes
            .iter()
            .filter_map(|(role, theme)| theme.as_ref().map(|t| (role, t)))
            .filter(|(_, theme)| !theme.is_blank())
    }
}

/// A highlighter shared by all callers, created the first time it's needed.
///
/// The first call creates the engine with what it asked for, following ones add the themes
/// and languages they need to that same engine. Calls arriving while the engine is being
/// created wait for it instead of creating another one.
/// If creating the engine fails, nothing is kept and the next call tries again.
pub struct SingletonHighlighter<E: Engine> {
    factory: BundleFactory<E>,
    engine_options: E::Options,
    highlighter: OnceCell<Arc<BundledHighlighter<E>>>,
}

impl<E: Engine> SingletonHighlighter<E> {
    pub fn new(factory: BundleFactory<E>) -> Self {
        Self {
            factory,
            engine_options: E::Options::default(),
            highlighter: OnceCell::new(),
        }
    }

    /// Options given to the engine when it gets created
    pub fn with_engine_options(mut self, options: E::Options) -> Self {
        self.engine_options = options;
        self
    }

    pub fn factory(&self) -> &BundleFactory<E> {
        &self.factory
    }

    /// Whether the engine has been created
    pub fn is_initialized(&self) -> bool {
        self.highlighter.initialized()
    }

    /// Returns the shared highlighter, with at least the given themes and languages loaded.
    pub async fn get(
        &self,
        themes: &[ThemeRef],
        langs: &[LanguageRef],
    ) -> BundleResult<Arc<BundledHighlighter<E>>> {
        let mut created = false;
        let created_flag = &mut created;
        let highlighter = self
            .highlighter
            .get_or_try_init(|| async move {
                *created_flag = true;
                debug!("Creating the shared highlighter");
                let options = HighlighterOptions {
                    themes: themes.to_vec(),
                    langs: langs.to_vec(),
                    engine: self.engine_options.clone(),
                };
                self.factory.get_highlighter(options).await.map(Arc::new)
            })
            .await?;
        let highlighter = Arc::clone(highlighter);

        if !created {
            highlighter.load(themes, langs).await?;
        }
        Ok(highlighter)
    }

    /// Resolves the references once and makes sure they are loaded.
    ///
    /// The resolved inputs are what gets loaded, so their names are what the engine knows
    /// them by.
    async fn ensure_resolved(
        &self,
        theme: &ThemeRef,
        lang: &LanguageRef,
    ) -> BundleResult<(Arc<BundledHighlighter<E>>, ThemeInput, LanguageInput)> {
        let bundle = self.factory.bundle();
        let theme = bundle.resolve_theme(theme)?;
        let lang = bundle.resolve_language(lang)?;
        let themes = [ThemeRef::Inline(Arc::clone(&theme))];
        let langs = [LanguageRef::Inline(lang.clone())];
        let highlighter = self.get(&themes, &langs).await?;
        Ok((highlighter, theme, lang))
    }

    /// Renders the code to HTML, loading the language and theme first if needed
    pub async fn code_to_html(&self, code: &str, options: &RenderOptions) -> BundleResult<String> {
        let (highlighter, theme, lang) =
            self.ensure_resolved(&options.theme, &options.lang).await?;
        highlighter
            .engine()
            .code_to_html(
                code,
                &CodeToHtmlOptions {
                    lang: lang.name().to_owned(),
                    theme: theme.name.clone(),
                },
            )
            .map_err(Error::engine)
    }

    /// Tokenizes the code, loading the language and theme first if needed
    pub async fn code_to_themed_tokens(
        &self,
        code: &str,
        options: &RenderOptions,
    ) -> BundleResult<Vec<Vec<ThemedToken>>> {
        let (highlighter, theme, lang) =
            self.ensure_resolved(&options.theme, &options.lang).await?;
        highlighter
            .engine()
            .code_to_themed_tokens(
                code,
                &CodeToTokensOptions {
                    lang: lang.name().to_owned(),
                    theme: theme.name.clone(),
                },
            )
            .map_err(Error::engine)
    }

    /// Renders the code with every theme given, loading them and the language first if needed
    pub async fn code_to_html_themes(
        &self,
        code: &str,
        options: &MultiThemeRenderOptions,
    ) -> BundleResult<String> {
        let bundle = self.factory.bundle();
        let mut roles = Vec::new();
        for (role, theme) in options.set_themes() {
            roles.push((role.clone(), bundle.resolve_theme(theme)?));
        }
        let lang = bundle.resolve_language(&options.lang)?;

        let requested: Vec<ThemeRef> = roles
            .iter()
            .map(|(_, theme)| ThemeRef::Inline(Arc::clone(theme)))
            .collect();
        let langs = [LanguageRef::Inline(lang.clone())];
        let highlighter = self.get(&requested, &langs).await?;

        let themes = roles
            .into_iter()
            .map(|(role, theme)| (role, theme.name.clone()))
            .collect();
        highlighter
            .engine()
            .code_to_html_themes(
                code,
                &CodeToHtmlThemesOptions {
                    lang: lang.name().to_owned(),
                    themes,
                    default_color: options.default_color.clone(),
                },
            )
            .map_err(Error::engine)
    }
}
