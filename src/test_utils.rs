use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::bundle::Bundle;
use crate::engine::{
    CodeToHtmlOptions, CodeToHtmlThemesOptions, CodeToTokensOptions, Engine, EngineOptions,
    FontStyle, ThemedToken,
};
use crate::grammars::{LanguageInput, LanguageRegistration, PLAINTEXT, is_plaintext};
use crate::themes::ThemeInput;

pub(crate) fn fixture_bundle() -> Bundle {
    let mut bundle = Bundle::default();
    // html embeds the other two so it goes last
    for grammar in ["css", "javascript", "html"] {
        bundle
            .add_language_from_path(format!("fixtures/grammars/{grammar}.json"))
            .unwrap();
    }
    for theme in ["nord", "min-light"] {
        bundle
            .add_theme_from_path(format!("fixtures/themes/{theme}.json"))
            .unwrap();
    }
    bundle
}

/// Counts how many engines were created with it and can make creation fail or take time.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeLoader {
    creations: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl FakeLoader {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// How many times `create` was called, failed attempts included
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Makes the next `count` creations fail
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FakeOptions {
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeError {
    CreationFailed,
    NotLoaded { kind: &'static str, name: String },
    UnnamedTheme,
}

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeError::CreationFailed => f.write_str("creation failed"),
            FakeError::NotLoaded { kind, name } => write!(f, "{kind} `{name}` is not loaded"),
            FakeError::UnnamedTheme => f.write_str("theme has no name"),
        }
    }
}

impl std::error::Error for FakeError {}

/// An engine that does not tokenize anything but tracks what got loaded into it
pub(crate) struct FakeEngine {
    // name or alias -> grammar
    languages: papaya::HashMap<String, Arc<LanguageRegistration>>,
    themes: papaya::HashMap<String, ThemeInput>,
    theme_loads: AtomicUsize,
    language_loads: AtomicUsize,
    options: FakeOptions,
}

impl FakeEngine {
    fn register_languages(&self, langs: &[LanguageInput]) {
        let languages = self.languages.pin();
        for registration in langs.iter().flat_map(|l| l.registrations()) {
            for alias in &registration.aliases {
                languages.insert(alias.clone(), Arc::clone(registration));
            }
            languages.insert(registration.name.clone(), Arc::clone(registration));
        }
    }

    fn register_themes(&self, themes: &[ThemeInput]) -> Result<(), FakeError> {
        let mut result = Ok(());
        let loaded = self.themes.pin();
        for theme in themes {
            if theme.name.is_empty() {
                result = Err(FakeError::UnnamedTheme);
                continue;
            }
            loaded.insert(theme.name.clone(), Arc::clone(theme));
        }
        result
    }

    fn language_name(&self, lang: &str) -> Result<String, FakeError> {
        if is_plaintext(lang) {
            return Ok(PLAINTEXT.to_owned());
        }
        self.languages
            .pin()
            .get(lang)
            .map(|r| r.name.clone())
            .ok_or_else(|| FakeError::NotLoaded {
                kind: "language",
                name: lang.to_owned(),
            })
    }

    fn theme(&self, name: &str) -> Result<ThemeInput, FakeError> {
        self.themes
            .pin()
            .get(name)
            .cloned()
            .ok_or_else(|| FakeError::NotLoaded {
                kind: "theme",
                name: name.to_owned(),
            })
    }

    fn pre_class(&self) -> String {
        match &self.options.class {
            Some(class) => format!("fake {class}"),
            None => "fake".to_owned(),
        }
    }

    pub fn loaded_themes(&self) -> Vec<String> {
        let mut names: Vec<_> = self.themes.pin().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_language(&self, name: &str) -> bool {
        self.languages.pin().contains_key(name)
    }

    pub fn theme_loads(&self) -> usize {
        self.theme_loads.load(Ordering::SeqCst)
    }

    pub fn language_loads(&self) -> usize {
        self.language_loads.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for FakeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeEngine")
            .field("themes", &self.loaded_themes())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn escape(code: &str) -> String {
    code.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl Engine for FakeEngine {
    type Loader = FakeLoader;
    type Options = FakeOptions;
    type Error = FakeError;

    async fn create(options: EngineOptions<FakeLoader, FakeOptions>) -> Result<Self, FakeError> {
        let loader = options.loader;
        loader.creations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = loader.delay {
            tokio::time::sleep(delay).await;
        }
        if loader
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(FakeError::CreationFailed);
        }

        let engine = FakeEngine {
            languages: papaya::HashMap::new(),
            themes: papaya::HashMap::new(),
            theme_loads: AtomicUsize::new(0),
            language_loads: AtomicUsize::new(0),
            options: options.options,
        };
        engine.register_languages(&options.langs);
        engine.register_themes(&options.themes)?;
        Ok(engine)
    }

    async fn load_language(&self, langs: Vec<LanguageInput>) -> Result<(), FakeError> {
        tokio::task::yield_now().await;
        self.language_loads.fetch_add(1, Ordering::SeqCst);
        self.register_languages(&langs);
        Ok(())
    }

    async fn load_theme(&self, themes: Vec<ThemeInput>) -> Result<(), FakeError> {
        tokio::task::yield_now().await;
        self.theme_loads.fetch_add(1, Ordering::SeqCst);
        self.register_themes(&themes)
    }

    fn code_to_html(&self, code: &str, options: &CodeToHtmlOptions) -> Result<String, FakeError> {
        let lang = self.language_name(&options.lang)?;
        let theme = self.theme(&options.theme)?;
        Ok(format!(
            r#"<pre class="{}" data-lang="{lang}" data-theme="{}"><code>{}</code></pre>"#,
            self.pre_class(),
            theme.name,
            escape(code)
        ))
    }

    fn code_to_themed_tokens(
        &self,
        code: &str,
        options: &CodeToTokensOptions,
    ) -> Result<Vec<Vec<ThemedToken>>, FakeError> {
        self.language_name(&options.lang)?;
        let theme = self.theme(&options.theme)?;
        let color = theme
            .settings
            .get("colors")
            .and_then(|c| c.get("editor.foreground"))
            .and_then(|c| c.as_str())
            .map(|c| c.to_owned());

        let mut offset = 0;
        let mut lines = Vec::new();
        for line in code.split('\n') {
            let tokens = if line.is_empty() {
                Vec::new()
            } else {
                vec![ThemedToken {
                    content: line.to_owned(),
                    offset,
                    color: color.clone(),
                    bg_color: None,
                    font_style: FontStyle::default(),
                }]
            };
            lines.push(tokens);
            offset += line.len() + 1;
        }
        Ok(lines)
    }

    fn code_to_html_themes(
        &self,
        code: &str,
        options: &CodeToHtmlThemesOptions,
    ) -> Result<String, FakeError> {
        let lang = self.language_name(&options.lang)?;
        let mut themes = BTreeMap::new();
        for (role, name) in &options.themes {
            themes.insert(role.as_str(), self.theme(name)?.name.clone());
        }
        let themes = themes
            .iter()
            .map(|(role, name)| format!("{role}:{name}"))
            .collect::<Vec<_>>()
            .join(" ");
        let default_color = options
            .default_color
            .as_ref()
            .map(|c| format!(r#" data-default="{c}""#))
            .unwrap_or_default();
        Ok(format!(
            r#"<pre class="{}" data-lang="{lang}" data-themes="{themes}"{default_color}><code>{}</code></pre>"#,
            self.pre_class(),
            escape(code)
        ))
    }
}
