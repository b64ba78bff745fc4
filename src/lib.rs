mod bundle;
mod engine;
mod error;
mod factory;
mod grammars;
mod references;
mod singleton;
mod themes;

#[cfg(test)]
mod test_utils;

pub use bundle::Bundle;
pub use engine::{
    CodeToHtmlOptions, CodeToHtmlThemesOptions, CodeToTokensOptions, Engine, EngineOptions,
    FontStyle, ThemedToken,
};
pub use error::{AssetKind, Error};
pub use factory::{BundleFactory, BundledHighlighter, HighlighterOptions};
pub use grammars::{
    LanguageInput, LanguageRegistration, PLAINTEXT, PLAINTEXT_ALIASES, is_plaintext,
};
pub use references::{LanguageRef, ThemeRef};
pub use singleton::{MultiThemeRenderOptions, RenderOptions, SingletonHighlighter};
pub use themes::{ThemeInput, ThemeRegistration, ThemeType};
