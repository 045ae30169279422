//! Language-to-image resolution.
//!
//! The registry is built once at startup from `[images]` in `codespace.toml`
//! and never changes afterwards. Selector case-folding happens here and
//! nowhere else.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::sandbox::error::SandboxError;

/// Languages the lab offers sandboxes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Language {
    Cpp,
    Java,
    JavaScript,
    Python,
}

impl Language {
    /// All supported languages, in listing order.
    pub const ALL: [Self; 4] = [Self::Cpp, Self::Java, Self::JavaScript, Self::Python];

    /// Canonical key used in config files and container labels.
    pub fn key(self) -> &'static str {
        match self {
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::Python => "python",
        }
    }

    /// Selector spellings accepted (case-insensitively) for this language.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Cpp => &["cpp", "c++"],
            Self::Java => &["java"],
            Self::JavaScript => &["javascript", "js", "node", "nodejs"],
            Self::Python => &["python", "python3"],
        }
    }

    /// Image used when the config carries no override.
    fn default_image(self) -> &'static str {
        match self {
            Self::Cpp => "codespace-cpp:latest",
            Self::Java => "codespace-java:latest",
            Self::JavaScript => "codespace-javascript:latest",
            Self::Python => "codespace-python:latest",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Language {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.aliases().contains(&folded.as_str()))
            .ok_or_else(|| SandboxError::unsupported_language(s.trim()))
    }
}

/// Static mapping from language to container image reference.
#[derive(Debug, Clone)]
pub(crate) struct ImageRegistry {
    images: HashMap<Language, String>,
}

impl ImageRegistry {
    /// Builds the registry from config overrides keyed by canonical language
    /// name. Unknown keys are ignored with a warning.
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        for key in overrides.keys() {
            if Language::ALL.iter().all(|lang| lang.key() != key) {
                warn!(key = %key, "ignoring image override for unknown language");
            }
        }

        let images = Language::ALL
            .into_iter()
            .map(|lang| {
                let image = overrides
                    .get(lang.key())
                    .cloned()
                    .unwrap_or_else(|| lang.default_image().to_string());
                (lang, image)
            })
            .collect();

        Self { images }
    }

    /// Resolves a user-supplied selector to a language and its image.
    ///
    /// Case-insensitive and side-effect-free; fails with
    /// `UnsupportedLanguage` when no mapping exists.
    pub fn resolve(&self, selector: &str) -> Result<(Language, String), SandboxError> {
        let language: Language = selector.parse()?;
        Ok((language, self.images[&language].clone()))
    }

    /// Image reference for a known language.
    pub fn image_for(&self, language: Language) -> &str {
        &self.images[&language]
    }

    /// All `(language, image)` pairs in listing order.
    pub fn entries(&self) -> impl Iterator<Item = (Language, &str)> {
        Language::ALL
            .into_iter()
            .map(|lang| (lang, self.images[&lang].as_str()))
    }
}

impl Default for ImageRegistry {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}
