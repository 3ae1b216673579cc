#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cvpress::model::ExperienceEntry;
use cvpress::{Document, Fonts, Layout, LayoutConfig};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn sample_document() -> Document {
    Document::from_json_file(&fixture_path("jane_roe.json")).expect("fixture parses")
}

pub fn experience(title: &str, bullets: Vec<String>) -> ExperienceEntry {
    ExperienceEntry {
        job_title: Some(title.to_string()),
        company: Some("Acme".to_string()),
        location: Some("London".to_string()),
        dates: Some("2020 - 2024".to_string()),
        responsibilities: bullets,
    }
}

/// A bullet that wraps to several lines at the default bullet width.
pub fn long_bullet(n: usize, repeat: usize) -> String {
    let sentence = "Coordinated quarterly platform migrations across several regional teams";
    format!("Item {n}: {}", vec![sentence; repeat].join(" and "))
}

/// A document with `entries` experience entries of `bullets` bullets each.
pub fn long_document(entries: usize, bullets: usize) -> Document {
    Document {
        name: "Test Person".to_string(),
        summary: Some("Summary paragraph. ".repeat(20)),
        experience: (0..entries)
            .map(|e| {
                experience(
                    &format!("Role {e}"),
                    (0..bullets).map(|b| long_bullet(e * 100 + b, 2)).collect(),
                )
            })
            .collect(),
        ..Default::default()
    }
}

pub fn layout_of(doc: &Document) -> Layout {
    cvpress::layout(doc, &Fonts::builtin(), &LayoutConfig::default(), None)
}

/// All drawn text of a layout, page by page, joined with spaces.
pub fn all_text(layout: &Layout) -> String {
    (0..layout.page_count())
        .flat_map(|p| layout.page_text(p))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of page objects in a PDF written by this crate (object
/// dictionaries are not compressed).
pub fn count_pdf_pages(bytes: &[u8]) -> usize {
    let needle = b"/Type /Page";
    bytes
        .windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

pub fn contains(bytes: &[u8], needle: &[u8]) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle)
}
