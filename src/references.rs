use std::sync::Arc;

use crate::grammars::{LanguageInput, LanguageRegistration, PLAINTEXT, is_plaintext};
use crate::themes::{ThemeInput, ThemeRegistration};

/// How a caller refers to a language
///
/// Strings convert into references directly: the plaintext markers (`plaintext`, `text`,
/// `txt` and `plain`) become [`LanguageRef::Plaintext`], anything else is an id to look up in
/// the bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageRef {
    /// No highlighting, the text is kept verbatim
    Plaintext,
    /// A language id (or alias) that needs to be in the bundle
    Bundled(String),
    /// A language definition given directly, used as is
    Inline(LanguageInput),
}

impl LanguageRef {
    /// The name the engine knows this language by
    pub fn name(&self) -> &str {
        match self {
            LanguageRef::Plaintext => PLAINTEXT,
            LanguageRef::Bundled(id) => id,
            LanguageRef::Inline(input) => input.name(),
        }
    }
}

impl From<&str> for LanguageRef {
    fn from(value: &str) -> Self {
        if is_plaintext(value) {
            LanguageRef::Plaintext
        } else {
            LanguageRef::Bundled(value.trim().to_owned())
        }
    }
}

impl From<String> for LanguageRef {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&String> for LanguageRef {
    fn from(value: &String) -> Self {
        value.as_str().into()
    }
}

impl From<LanguageInput> for LanguageRef {
    fn from(value: LanguageInput) -> Self {
        LanguageRef::Inline(value)
    }
}

impl From<LanguageRegistration> for LanguageRef {
    fn from(value: LanguageRegistration) -> Self {
        LanguageRef::Inline(value.into())
    }
}

/// How a caller refers to a theme
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeRef {
    /// A theme id that needs to be in the bundle
    Bundled(String),
    /// A theme given directly, used as is
    Inline(ThemeInput),
}

impl ThemeRef {
    /// The name as written by the caller, or the name of the inline theme
    pub fn name(&self) -> &str {
        match self {
            ThemeRef::Bundled(id) => id,
            ThemeRef::Inline(theme) => &theme.name,
        }
    }

    /// Whether this is an empty or whitespace-only id, which does not ask for any theme
    pub fn is_blank(&self) -> bool {
        matches!(self, ThemeRef::Bundled(id) if id.trim().is_empty())
    }
}

impl From<&str> for ThemeRef {
    fn from(value: &str) -> Self {
        ThemeRef::Bundled(value.trim().to_owned())
    }
}

impl From<String> for ThemeRef {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&String> for ThemeRef {
    fn from(value: &String) -> Self {
        value.as_str().into()
    }
}

impl From<ThemeInput> for ThemeRef {
    fn from(value: ThemeInput) -> Self {
        ThemeRef::Inline(value)
    }
}

impl From<ThemeRegistration> for ThemeRef {
    fn from(value: ThemeRegistration) -> Self {
        ThemeRef::Inline(Arc::new(value))
    }
}
