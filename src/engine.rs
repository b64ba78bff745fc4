use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::grammars::LanguageInput;
use crate::themes::ThemeInput;

/// What the engine receives when being created: everything already resolved.
#[derive(Debug, Clone)]
pub struct EngineOptions<L, O> {
    pub themes: Vec<ThemeInput>,
    pub langs: Vec<LanguageInput>,
    /// The loader of the regex runtime. Opaque, it is only carried over.
    pub loader: L,
    /// Any other engine specific options
    pub options: O,
}

/// Rendering a snippet with a single theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeToHtmlOptions {
    pub lang: String,
    pub theme: String,
}

/// Tokenizing a snippet with a single theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeToTokensOptions {
    pub lang: String,
    pub theme: String,
}

/// Rendering a snippet with several themes, eg light and dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeToHtmlThemesOptions {
    pub lang: String,
    /// Theme role (`light`, `dark`...) -> theme name
    pub themes: BTreeMap<String, String>,
    /// Which role gets applied without any CSS variable, if any
    pub default_color: Option<String>,
}

/// Font style flags as set by the engine.
/// What each bit means is up to the engine, it is only carried along with the token.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug,
)]
#[serde(transparent)]
pub struct FontStyle {
    bits: u8,
}

impl FontStyle {
    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Returns `true` if no style is applied
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// A token with the style the theme gave it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemedToken {
    pub content: String,
    /// Byte offset of the token in the whole input
    pub offset: usize,
    pub color: Option<String>,
    pub bg_color: Option<String>,
    pub font_style: FontStyle,
}

/// The highlighting engine being wrapped.
///
/// Tokenizing and rendering are entirely up to the engine: this crate only decides which
/// grammars and themes it gets.
/// Loading is incremental and must accept assets that are already loaded, it is done through
/// `&self` since one instance is shared by every caller once created.
#[async_trait]
pub trait Engine: Send + Sync + Sized + 'static {
    /// The handle used to load the regex runtime
    type Loader: Clone + Send + Sync;
    /// Engine options that are not about languages or themes
    type Options: Clone + Default + Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates an instance with the given assets loaded
    async fn create(options: EngineOptions<Self::Loader, Self::Options>) -> Result<Self, Self::Error>;

    /// Adds languages to the instance
    async fn load_language(&self, langs: Vec<LanguageInput>) -> Result<(), Self::Error>;

    /// Adds themes to the instance
    async fn load_theme(&self, themes: Vec<ThemeInput>) -> Result<(), Self::Error>;

    fn code_to_html(&self, code: &str, options: &CodeToHtmlOptions) -> Result<String, Self::Error>;

    /// Tokens of each line of the code
    fn code_to_themed_tokens(
        &self,
        code: &str,
        options: &CodeToTokensOptions,
    ) -> Result<Vec<Vec<ThemedToken>>, Self::Error>;

    fn code_to_html_themes(
        &self,
        code: &str,
        options: &CodeToHtmlThemesOptions,
    ) -> Result<String, Self::Error>;
}
