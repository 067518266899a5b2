//! Brand and theme context threaded explicitly into every render.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use crate::blocks::registry::ValidationError;
use crate::error::{CmsError, CmsResult};

/// The two site identities sharing this CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Brand {
    Physiotherapy,
    PhysioKonzept,
}

impl Brand {
    pub const ALL: [Brand; 2] = [Brand::Physiotherapy, Brand::PhysioKonzept];

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Physiotherapy => "physiotherapy",
            Brand::PhysioKonzept => "physio-konzept",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Brand::Physiotherapy => "Physiotherapie",
            Brand::PhysioKonzept => "Physio-Konzept",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Brand {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Brand::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| CmsError::UnknownBrand(s.to_string()))
    }
}

/// Theme variables a brand may set. Anything else is dropped.
pub const THEME_VARIABLES: &[&str] = &[
    "--color-primary",
    "--color-primary-contrast",
    "--color-secondary",
    "--color-accent",
    "--color-background",
    "--color-surface",
    "--color-text",
    "--color-muted",
    "--font-heading",
    "--font-body",
    "--radius-card",
    "--radius-button",
    "--section-spacing",
    "--container-width",
    "--hero-gradient",
    "--hero-overlay",
];

const MAX_TOKEN_LEN: usize = 256;

fn is_safe_value(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_TOKEN_LEN
        && !value
            .chars()
            .any(|c| matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\') || c.is_control())
}

/// Allow-listed theme variables. Values are opaque to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThemeTokens {
    vars: BTreeMap<String, String>,
}

impl ThemeTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) -> CmsResult<()> {
        if !THEME_VARIABLES.contains(&name) {
            return Err(CmsError::Validation(vec![ValidationError::new(
                name,
                "is not an allowed theme variable",
            )]));
        }
        let value = value.trim();
        if !is_safe_value(value) {
            return Err(CmsError::Validation(vec![ValidationError::new(
                name,
                "contains characters not allowed in a theme value",
            )]));
        }
        self.vars.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Build from untrusted pairs, keeping only allowed, safe entries.
    pub fn sanitized<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tokens = Self::new();
        for (name, value) in pairs {
            if let Err(e) = tokens.set(name, value) {
                tracing::warn!(variable = %name, error = %e, "dropping theme variable");
            }
        }
        tokens
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `var(--name)` if the theme defines it, else `var(--fallback)`.
    pub fn var_or(&self, name: &str, fallback: &str) -> String {
        if self.contains(name) {
            format!("var({})", name)
        } else {
            format!("var({})", fallback)
        }
    }

    /// Declarations for a `:root` rule, in stable order.
    pub fn to_css_declarations(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Built-in preset for a brand.
    pub fn preset(brand: Brand) -> Self {
        let pairs: &[(&str, &str)] = match brand {
            Brand::Physiotherapy => &[
                ("--color-primary", "#0f766e"),
                ("--color-primary-contrast", "#ffffff"),
                ("--color-secondary", "#134e4a"),
                ("--color-accent", "#f59e0b"),
                ("--color-background", "#ffffff"),
                ("--color-surface", "#f0fdfa"),
                ("--color-text", "#1f2937"),
                ("--color-muted", "#6b7280"),
                ("--font-heading", "'Poppins', sans-serif"),
                ("--font-body", "'Inter', sans-serif"),
                ("--radius-card", "12px"),
                ("--radius-button", "999px"),
                ("--section-spacing", "4rem"),
                ("--container-width", "1120px"),
                (
                    "--hero-gradient",
                    "linear-gradient(135deg, #0f766e 0%, #14b8a6 100%)",
                ),
            ],
            Brand::PhysioKonzept => &[
                ("--color-primary", "#1e3a8a"),
                ("--color-primary-contrast", "#ffffff"),
                ("--color-secondary", "#0f172a"),
                ("--color-accent", "#ea580c"),
                ("--color-background", "#f8fafc"),
                ("--color-surface", "#ffffff"),
                ("--color-text", "#0f172a"),
                ("--color-muted", "#64748b"),
                ("--font-heading", "'Montserrat', sans-serif"),
                ("--font-body", "'Source Sans 3', sans-serif"),
                ("--radius-card", "4px"),
                ("--radius-button", "4px"),
                ("--section-spacing", "5rem"),
                ("--container-width", "1200px"),
                ("--hero-overlay", "rgba(15, 23, 42, 0.55)"),
            ],
        };
        Self::sanitized(pairs.iter().copied())
    }
}

/// Per-request render input: brand, theme and edit mode.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub brand: Brand,
    pub theme: ThemeTokens,
    pub editable: bool,
}

impl RenderContext {
    /// Read-only context for public page views.
    pub fn public(brand: Brand) -> Self {
        Self {
            brand,
            theme: ThemeTokens::preset(brand),
            editable: false,
        }
    }

    /// Context for admin previews with inline-edit targets.
    pub fn editor(brand: Brand) -> Self {
        Self {
            editable: true,
            ..Self::public(brand)
        }
    }

    pub fn with_theme(mut self, theme: ThemeTokens) -> Self {
        self.theme = theme;
        self
    }
}
