//! Best-effort recovery of a [`Document`] from CV text, such as the text
//! layer of a previously exported PDF.
//!
//! The heuristics expect the layout this crate draws: name first, an
//! optional title, a `Phone: … | Email: …` line, then section headings on
//! lines of their own. Entry headers look like `Title | Company, City` and
//! bullets start with `•` or `-`. Anything else is ignored.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{Contact, Document, EducationEntry, ExperienceEntry, SkillsBlock};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("no text found")]
    Empty,

    #[error("text does not look like a CV: no contact line and no known section headings")]
    Unrecognised,

    #[error("PDF text extraction failed: {0}")]
    Extract(String),

    #[error("PDF import is not supported by this build")]
    Unsupported,
}

#[cfg(feature = "import")]
impl From<pdf_extract::OutputError> for ImportError {
    fn from(err: pdf_extract::OutputError) -> Self {
        ImportError::Extract(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Summary,
    Education,
    Experience,
    Skills,
}

fn section_heading(line: &str) -> Option<Section> {
    match line.to_lowercase().as_str() {
        "summary" | "o mnie" => Some(Section::Summary),
        "education" | "edukacja" => Some(Section::Education),
        "professional experience" | "experience" | "doświadczenie zawodowe" => {
            Some(Section::Experience)
        }
        "skills" | "kompetencje" => Some(Section::Skills),
        _ => None,
    }
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[•\-–*]\s*").expect("valid bullet pattern"))
}

fn contact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(phone|telefon|email|e-mail)\s*:\s*([^|]+)").expect("valid contact pattern")
    })
}

fn skill_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(technical skills|umiejętności techniczne|soft skills|umiejętności miękkie|languages|języki)\s*:",
        )
        .expect("valid skill label pattern")
    })
}

fn is_bullet(line: &str) -> bool {
    bullet_re().is_match(line)
}

fn strip_bullet(line: &str) -> String {
    bullet_re().replace(line, "").trim().to_string()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// `Left | Right, City` into its three parts.
fn split_entry_header(line: &str) -> (Option<String>, Option<String>, Option<String>) {
    let (left, right) = line.split_once('|').unwrap_or((line, ""));
    let (middle, city) = right.split_once(',').unwrap_or((right, ""));
    (non_empty(left), non_empty(middle), non_empty(city))
}

/// A meta line: `Location • Dates`, or just the dates.
fn split_meta(line: &str) -> (Option<String>, Option<String>) {
    match line.split_once('•') {
        Some((location, dates)) => (non_empty(location), non_empty(dates)),
        None => (None, non_empty(line)),
    }
}

fn is_meta(line: &str) -> bool {
    !is_bullet(line) && !line.contains('|')
}

/// Bullets of an entry starting at `i`. Lines that are neither bullets nor
/// entry headers continue the previous bullet.
fn take_bullets(lines: &[&str], mut i: usize) -> (Vec<String>, usize) {
    let mut bullets: Vec<String> = Vec::new();
    while i < lines.len() {
        let line = lines[i];
        if is_bullet(line) {
            bullets.push(strip_bullet(line));
        } else if line.contains('|') {
            break;
        } else if let Some(last) = bullets.last_mut() {
            last.push(' ');
            last.push_str(line);
        } else {
            break;
        }
        i += 1;
    }
    (bullets, i)
}

fn parse_experience(lines: &[&str]) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let header = lines[i];
        if !header.contains('|') {
            i += 1;
            continue;
        }
        let (job_title, company, mut location) = split_entry_header(header);
        let mut dates = None;
        i += 1;
        if let Some(next) = lines.get(i).filter(|l| is_meta(l)) {
            let (meta_location, meta_dates) = split_meta(next);
            location = location.or(meta_location);
            dates = meta_dates;
            i += 1;
        }
        let (responsibilities, next) = take_bullets(lines, i);
        i = next;
        entries.push(ExperienceEntry {
            job_title,
            company,
            location,
            dates,
            responsibilities,
        });
    }
    entries
}

fn parse_education(lines: &[&str]) -> Vec<EducationEntry> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let header = lines[i];
        if !header.contains('|') {
            i += 1;
            continue;
        }
        let (degree, institution, mut location) = split_entry_header(header);
        let mut year = None;
        i += 1;
        if let Some(next) = lines.get(i).filter(|l| is_meta(l)) {
            let (meta_location, meta_year) = split_meta(next);
            location = location.or(meta_location);
            year = meta_year;
            i += 1;
        }
        let (description, next) = take_bullets(lines, i);
        i = next;
        entries.push(EducationEntry {
            degree,
            institution,
            location,
            year,
            description,
        });
    }
    entries
}

fn parse_skills(lines: &[&str]) -> SkillsBlock {
    let text = lines.join(" ");
    let markers: Vec<_> = skill_label_re().captures_iter(&text).collect();
    let mut skills = SkillsBlock::default();
    for (n, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = markers
            .get(n + 1)
            .and_then(|c| c.get(0))
            .map_or(text.len(), |m| m.start());
        let content = non_empty(&text[whole.end()..end]);
        let slot = match label.as_str().to_lowercase().as_str() {
            "technical skills" | "umiejętności techniczne" => &mut skills.technical,
            "soft skills" | "umiejętności miękkie" => &mut skills.soft,
            _ => &mut skills.languages,
        };
        if slot.is_none() {
            *slot = content;
        }
    }
    skills
}

/// Lines between a section heading and the next heading.
fn section_body<'a>(
    lines: &'a [&'a str],
    headings: &[(usize, Section)],
    section: Section,
) -> &'a [&'a str] {
    let Some(pos) = headings.iter().position(|(_, s)| *s == section) else {
        return &[];
    };
    let start = headings[pos].0 + 1;
    let end = headings.get(pos + 1).map_or(lines.len(), |(i, _)| *i);
    &lines[start..end]
}

/// Build a document from extracted CV text.
pub fn parse_text(text: &str) -> Result<Document, ImportError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(ImportError::Empty);
    }

    let headings: Vec<(usize, Section)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| section_heading(l).map(|s| (i, s)))
        .collect();
    let body = |section: Section| section_body(&lines, &headings, section);

    let header_end = headings.first().map_or(lines.len(), |(i, _)| *i);
    let header = &lines[..header_end];

    let mut contact = Contact::default();
    let mut contact_found = false;
    for line in header {
        for caps in contact_re().captures_iter(line) {
            contact_found = true;
            let value = non_empty(&caps[2]);
            if caps[1].to_lowercase().starts_with('e') {
                contact.email = contact.email.or(value);
            } else {
                contact.phone = contact.phone.or(value);
            }
        }
    }
    if headings.is_empty() && !contact_found {
        return Err(ImportError::Unrecognised);
    }

    let name = header.first().map(|l| l.to_string()).unwrap_or_default();
    let title = header
        .get(1)
        .filter(|l| !contact_re().is_match(l))
        .map(|l| l.to_string());

    let summary = non_empty(&body(Section::Summary).join(" "));
    let doc = Document {
        name,
        title,
        contact,
        photo: None,
        summary,
        education: parse_education(body(Section::Education)),
        experience: parse_experience(body(Section::Experience)),
        skills: parse_skills(body(Section::Skills)),
    };
    log::info!(
        "Imported {:?}: {} experience, {} education entries",
        doc.name,
        doc.experience.len(),
        doc.education.len()
    );
    Ok(doc)
}

/// Extract the text layer of a PDF and parse it.
#[cfg(feature = "import")]
pub fn parse_pdf(bytes: &[u8]) -> Result<Document, ImportError> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    parse_text(&text)
}

#[cfg(not(feature = "import"))]
pub fn parse_pdf(_bytes: &[u8]) -> Result<Document, ImportError> {
    Err(ImportError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
Jane Roe
Staff Engineer
Phone: +44 20 7946 0000 | Email: jane@roe.dev

Summary
Builds reliable systems.
Enjoys mentoring.

Education
BSc Computer Science | University of Edinburgh
Edinburgh • 2012
• First class honours

Professional Experience
Staff Engineer | Acme, London
2019 - present
• Led the storage team
• Cut p99 latency by
half across regions
Engineer | Initech
Remote • 2015 - 2019
- Shipped billing

Skills
Technical Skills: Rust, Go
Soft Skills: Mentoring
Languages: English, Polish
";

    #[test]
    fn header_and_contact() {
        let doc = parse_text(SAMPLE).unwrap();
        assert_eq!(doc.name, "Jane Roe");
        assert_eq!(doc.title.as_deref(), Some("Staff Engineer"));
        assert_eq!(doc.contact.phone.as_deref(), Some("+44 20 7946 0000"));
        assert_eq!(doc.contact.email.as_deref(), Some("jane@roe.dev"));
        assert_eq!(doc.summary.as_deref(), Some("Builds reliable systems. Enjoys mentoring."));
    }

    #[test]
    fn experience_entries_and_wrapped_bullets() {
        let doc = parse_text(SAMPLE).unwrap();
        assert_eq!(doc.experience.len(), 2);
        let first = &doc.experience[0];
        assert_eq!(first.company.as_deref(), Some("Acme"));
        assert_eq!(first.location.as_deref(), Some("London"));
        assert_eq!(first.dates.as_deref(), Some("2019 - present"));
        assert_eq!(
            first.responsibilities,
            vec!["Led the storage team", "Cut p99 latency by half across regions"]
        );
        let second = &doc.experience[1];
        assert_eq!(second.location.as_deref(), Some("Remote"));
        assert_eq!(second.responsibilities, vec!["Shipped billing"]);
    }

    #[test]
    fn education_with_meta_and_description() {
        let doc = parse_text(SAMPLE).unwrap();
        let edu = &doc.education[0];
        assert_eq!(edu.institution.as_deref(), Some("University of Edinburgh"));
        assert_eq!(edu.location.as_deref(), Some("Edinburgh"));
        assert_eq!(edu.year.as_deref(), Some("2012"));
        assert_eq!(edu.description, vec!["First class honours"]);
    }

    #[test]
    fn skills_split_on_labels() {
        let doc = parse_text(SAMPLE).unwrap();
        assert_eq!(doc.skills.technical.as_deref(), Some("Rust, Go"));
        assert_eq!(doc.skills.soft.as_deref(), Some("Mentoring"));
        assert_eq!(doc.skills.languages.as_deref(), Some("English, Polish"));
    }

    #[test]
    fn polish_headings_are_recognised() {
        let text = "Jan Kowalski\nTelefon: 123\nDoświadczenie zawodowe\nInżynier | Firma\n• Praca\nKompetencje\nJęzyki: polski";
        let doc = parse_text(text).unwrap();
        assert_eq!(doc.contact.phone.as_deref(), Some("123"));
        assert_eq!(doc.experience[0].responsibilities, vec!["Praca"]);
        assert_eq!(doc.skills.languages.as_deref(), Some("polski"));
    }

    #[test]
    fn unstructured_text_is_rejected() {
        assert!(matches!(parse_text("   \n  "), Err(ImportError::Empty)));
        assert!(matches!(
            parse_text("Dear hiring manager,\nI am writing to apply."),
            Err(ImportError::Unrecognised)
        ));
    }
}
