use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::nonce::Nonce;

/// Stylesheet shipped next to the dictionary data file.
pub const STYLESHEET_FILE: &str = "DefaultStyle.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    First,
    All,
}

struct Substitution {
    pattern: &'static str,
    replacement: &'static str,
    scope: Scope,
}

// Dictionary styles target a light system theme; remap to a dark host.
const DARK_THEME: &[Substitution] = &[
    Substitution {
        pattern: "font-size: 12pt",
        replacement: "font-size: 16pt",
        scope: Scope::First,
    },
    Substitution {
        pattern: "color: text",
        replacement: "color:whitesmoke",
        scope: Scope::All,
    },
    Substitution {
        pattern: "-webkit-link",
        replacement: "lightskyblue",
        scope: Scope::All,
    },
    Substitution {
        pattern: "-apple-system-secondary-label",
        replacement: "grey",
        scope: Scope::All,
    },
    Substitution {
        pattern: "-apple-system-tertiary-label",
        replacement: "dimgrey",
        scope: Scope::All,
    },
    Substitution {
        pattern: "-apple-system-text-background",
        replacement: "black",
        scope: Scope::All,
    },
];

#[derive(Debug, Clone)]
pub struct StyleSheet {
    raw: String,
}

impl StyleSheet {
    pub fn from_text(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn sibling_path(dictionary_path: &Path) -> PathBuf {
        dictionary_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(STYLESHEET_FILE)
    }

    pub fn load_for(dictionary_path: &Path) -> Result<Self, RenderError> {
        let path = Self::sibling_path(dictionary_path);
        fs::read_to_string(&path)
            .map(Self::from_text)
            .map_err(|source| RenderError::Stylesheet { path, source })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The stylesheet with the dark-theme substitutions applied to the raw text.
    pub fn themed(&self) -> String {
        DARK_THEME
            .iter()
            .fold(self.raw.clone(), |text, rule| match rule.scope {
                Scope::First => text.replacen(rule.pattern, rule.replacement, 1),
                Scope::All => text.replace(rule.pattern, rule.replacement),
            })
    }

    pub fn style_tag(&self, nonce: &Nonce) -> String {
        format!(r#"<style nonce="{nonce}">{}</style>"#, self.themed())
    }
}
