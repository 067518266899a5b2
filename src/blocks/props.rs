//! Typed props for every registered block type.
//!
//! Optional fields serialize as `null` rather than being skipped, so every
//! editable path exists in a block's JSON form and can be patched in place.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
            TextAlignment::Justify => "justify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    #[default]
    Plain,
    Outlined,
    Elevated,
}

impl CardVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardVariant::Plain => "plain",
            CardVariant::Outlined => "outlined",
            CardVariant::Elevated => "elevated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

impl ImagePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePosition::Left => "left",
            ImagePosition::Right => "right",
        }
    }
}

/// Full-width opening section with headline and call to action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroProps {
    pub headline: String,
    #[serde(default)]
    pub subheadline: Option<String>,
    #[serde(default)]
    pub cta_label: Option<String>,
    #[serde(default)]
    pub cta_href: Option<String>,
    /// Media reference, resolved to a URL at render time.
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub alignment: Alignment,
}

impl Default for HeroProps {
    fn default() -> Self {
        Self {
            headline: "Willkommen in unserer Praxis".to_string(),
            subheadline: Some("Physiotherapie mit Herz und Verstand".to_string()),
            cta_label: Some("Termin vereinbaren".to_string()),
            cta_href: Some("/kontakt".to_string()),
            background_image: None,
            alignment: Alignment::Center,
        }
    }
}

/// Rich text section. `content` holds HTML that is sanitized on render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub content: String,
    #[serde(default)]
    pub alignment: TextAlignment,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: "<p>Neuer Textabschnitt</p>".to_string(),
            alignment: TextAlignment::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    #[serde(default)]
    pub icon: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGridProps {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_columns")]
    pub columns: u8,
    #[serde(default)]
    pub items: Vec<FeatureItem>,
}

fn default_columns() -> u8 {
    3
}

impl Default for FeatureGridProps {
    fn default() -> Self {
        let item = |icon: &str, title: &str, description: &str| FeatureItem {
            icon: Some(icon.to_string()),
            title: title.to_string(),
            description: Some(description.to_string()),
        };
        Self {
            title: Some("Unsere Leistungen".to_string()),
            columns: default_columns(),
            items: vec![
                item("hand", "Manuelle Therapie", "Gezielte Behandlung von Gelenken und Muskeln."),
                item("activity", "Krankengymnastik", "Aktive Übungen für mehr Beweglichkeit."),
                item("heart", "Massage", "Entspannung und Schmerzlinderung."),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProps {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link_label: Option<String>,
    #[serde(default)]
    pub link_href: Option<String>,
    #[serde(default)]
    pub variant: CardVariant,
}

impl Default for CardProps {
    fn default() -> Self {
        Self {
            title: "Neue Karte".to_string(),
            body: Some("<p>Kurzer Beschreibungstext.</p>".to_string()),
            image: None,
            link_label: None,
            link_href: None,
            variant: CardVariant::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTextProps {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image_position: ImagePosition,
}

impl Default for ImageTextProps {
    fn default() -> Self {
        Self {
            image: None,
            image_alt: Some(String::new()),
            heading: Some("Über uns".to_string()),
            body: Some("<p>Erzählen Sie hier von Ihrem Team.</p>".to_string()),
            image_position: ImagePosition::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactFormProps {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    pub submit_label: String,
    #[serde(default)]
    pub show_phone: bool,
    #[serde(default)]
    pub privacy_note: Option<String>,
}

impl Default for ContactFormProps {
    fn default() -> Self {
        Self {
            title: Some("Kontakt".to_string()),
            intro: Some("Schreiben Sie uns, wir melden uns zeitnah.".to_string()),
            submit_label: "Nachricht senden".to_string(),
            show_phone: true,
            privacy_note: Some(
                "Ihre Angaben werden ausschließlich zur Bearbeitung Ihrer Anfrage verwendet."
                    .to_string(),
            ),
        }
    }
}
