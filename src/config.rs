use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

pub type Rgb = [u8; 3];

/// Tunables for keeping entries and headings together. These are empirical
/// heuristics, not physical constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrphanRules {
    /// Minimum safety buffer below a projected entry, in body lines.
    pub safety_lines: f32,
    /// Minimum safety buffer below a projected entry, as a share of the entry height.
    pub safety_fraction: f32,
    /// Below this share of usable page height left, a new entry starts a new page.
    pub min_remaining_fraction: f32,
}

impl Default for OrphanRules {
    fn default() -> Self {
        Self {
            safety_lines: 6.0,
            safety_fraction: 0.25,
            min_remaining_fraction: 0.20,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pl,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "pl" | "polish" => Ok(Language::Pl),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Fixed strings drawn by the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Labels {
    pub placeholder_name: &'static str,
    pub summary: &'static str,
    pub education: &'static str,
    pub experience: &'static str,
    pub skills: &'static str,
    pub technical: &'static str,
    pub soft: &'static str,
    pub languages: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
}

impl Language {
    pub fn labels(self) -> Labels {
        match self {
            Language::En => Labels {
                placeholder_name: "Your Name",
                summary: "Summary",
                education: "Education",
                experience: "Professional Experience",
                skills: "Skills",
                technical: "Technical Skills:",
                soft: "Soft Skills:",
                languages: "Languages:",
                phone: "Phone",
                email: "Email",
            },
            Language::Pl => Labels {
                placeholder_name: "Imię i nazwisko",
                summary: "O mnie",
                education: "Edukacja",
                experience: "Doświadczenie zawodowe",
                skills: "Kompetencje",
                technical: "Umiejętności techniczne:",
                soft: "Umiejętności miękkie:",
                languages: "Języki:",
                phone: "Telefon",
                email: "Email",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin: f32,
    pub line_height: f32,
    pub bullet_indent: f32,
    pub bullet_spacing: f32,
    pub section_spacing: f32,
    pub item_spacing: f32,
    pub photo_size: f32,
    pub accent_color: Rgb,
    pub text_color: Rgb,
    pub muted_color: Rgb,
    pub body_color: Rgb,
    pub rule_color: Rgb,
    pub guide_color: Rgb,
    pub show_guide: bool,
    pub orphans: OrphanRules,
    pub language: Language,
    /// Family searched in the font directories; built-in Helvetica when unset or not found.
    pub font_family: Option<String>,
    pub photo_timeout_secs: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 54.0,
            line_height: 14.0,
            bullet_indent: 20.0,
            bullet_spacing: 4.0,
            section_spacing: 16.0,
            item_spacing: 12.0,
            photo_size: 104.0,
            accent_color: [37, 99, 235],
            text_color: [31, 41, 55],
            muted_color: [107, 114, 128],
            body_color: [55, 65, 81],
            rule_color: [229, 231, 235],
            guide_color: [229, 231, 235],
            show_guide: false,
            orphans: OrphanRules::default(),
            language: Language::En,
            font_family: None,
            photo_timeout_secs: 10,
        }
    }
}

impl LayoutConfig {
    /// On-screen preview profile: identical geometry, left guide drawn.
    pub fn preview() -> Self {
        Self {
            show_guide: true,
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * self.margin
    }

    pub fn content_top(&self) -> f32 {
        self.margin
    }

    pub fn content_bottom(&self) -> f32 {
        PAGE_HEIGHT - self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    pub fn labels(&self) -> Labels {
        self.language.labels()
    }
}
