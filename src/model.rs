use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Root aggregate. Treated as an immutable snapshot for the duration of an export.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    pub name: String,
    pub title: Option<String>,
    pub contact: Contact,
    /// Data URL, http(s) URL or local path of the profile photo.
    pub photo: Option<String>,
    pub summary: Option<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: SkillsBlock,
}

/// Wire shape accepted on input: the nested `contact` object, or the flat
/// `phone`/`email` fields written by older exports.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawDocument {
    name: String,
    title: Option<String>,
    contact: Option<Contact>,
    phone: Option<String>,
    email: Option<String>,
    #[serde(alias = "photoUrl")]
    photo: Option<String>,
    summary: Option<String>,
    education: Vec<EducationEntry>,
    experience: Vec<ExperienceEntry>,
    skills: SkillsBlock,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let mut contact = raw.contact.unwrap_or_default();
        if contact.phone.is_none() {
            contact.phone = raw.phone;
        }
        if contact.email.is_none() {
            contact.email = raw.email;
        }
        Document {
            name: raw.name,
            title: raw.title,
            contact,
            photo: raw.photo,
            summary: raw.summary,
            education: raw.education,
            experience: raw.experience,
            skills: raw.skills,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: Option<String>,
    #[serde(alias = "university")]
    pub institution: Option<String>,
    #[serde(alias = "cityState")]
    pub location: Option<String>,
    pub year: Option<String>,
    pub description: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub job_title: Option<String>,
    pub company: Option<String>,
    #[serde(alias = "cityState")]
    pub location: Option<String>,
    pub dates: Option<String>,
    pub responsibilities: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    pub title: String,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillSectionId {
    Technical,
    Soft,
    Languages,
    Custom(usize),
}

impl FromStr for SkillSectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(SkillSectionId::Technical),
            "soft" => Ok(SkillSectionId::Soft),
            "languages" => Ok(SkillSectionId::Languages),
            other => other
                .strip_prefix("custom-")
                .and_then(|idx| idx.parse().ok())
                .map(SkillSectionId::Custom)
                .ok_or_else(|| format!("unknown skill section id: {other}")),
        }
    }
}

impl TryFrom<String> for SkillSectionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SkillSectionId> for String {
    fn from(id: SkillSectionId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for SkillSectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillSectionId::Technical => f.write_str("technical"),
            SkillSectionId::Soft => f.write_str("soft"),
            SkillSectionId::Languages => f.write_str("languages"),
            SkillSectionId::Custom(i) => write!(f, "custom-{i}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsBlock {
    pub title: Option<String>,
    pub order: Vec<SkillSectionId>,
    pub technical: Option<String>,
    pub soft: Option<String>,
    pub languages: Option<String>,
    pub custom: Vec<CustomSection>,
}

/// One skills section ready to draw. `title` is `None` for the built-in
/// sections, whose label comes from the active language.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillSection<'a> {
    pub id: SkillSectionId,
    pub title: Option<&'a str>,
    pub content: &'a str,
}

impl SkillsBlock {
    /// `order` as given, or the natural order when it is empty.
    pub fn resolved_order(&self) -> Vec<SkillSectionId> {
        if !self.order.is_empty() {
            return self.order.clone();
        }
        let mut ids = vec![
            SkillSectionId::Technical,
            SkillSectionId::Soft,
            SkillSectionId::Languages,
        ];
        ids.extend((0..self.custom.len()).map(SkillSectionId::Custom));
        ids
    }

    /// Sections with content in display order, plus ids that reference no
    /// existing section. Empty sections are skipped but not reported.
    pub fn sections(&self) -> (Vec<SkillSection<'_>>, Vec<SkillSectionId>) {
        let mut present = Vec::new();
        let mut unknown = Vec::new();
        for id in self.resolved_order() {
            let (title, content) = match id {
                SkillSectionId::Technical => (None, self.technical.as_deref()),
                SkillSectionId::Soft => (None, self.soft.as_deref()),
                SkillSectionId::Languages => (None, self.languages.as_deref()),
                SkillSectionId::Custom(i) => match self.custom.get(i) {
                    Some(c) => (provided(Some(c.title.as_str())), Some(c.content.as_str())),
                    None => {
                        unknown.push(id);
                        continue;
                    }
                },
            };
            if let Some(content) = non_blank(content) {
                present.push(SkillSection { id, title, content });
            }
        }
        (present, unknown)
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\[\]]*\]").expect("valid placeholder pattern"))
}

/// True when a value still carries an unedited template marker such as `[Company Name]`.
pub fn is_placeholder(value: &str) -> bool {
    placeholder_re().is_match(value)
}

/// The trimmed value when it is not blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The trimmed value when it is neither blank nor a placeholder.
pub fn provided(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_placeholder(v))
}

impl EducationEntry {
    pub fn is_renderable(&self) -> bool {
        [&self.degree, &self.institution, &self.location, &self.year]
            .into_iter()
            .any(|f| provided(f.as_deref()).is_some())
            || self.description.iter().any(|l| !l.trim().is_empty())
    }
}

impl ExperienceEntry {
    /// Entries whose title and company are both blank or placeholders are not drawn.
    pub fn is_renderable(&self) -> bool {
        provided(self.job_title.as_deref()).is_some() || provided(self.company.as_deref()).is_some()
    }
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
