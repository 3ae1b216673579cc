//! Turns a [`Document`] into a flat list of measured [`RenderBlock`]s.
//!
//! Every block carries the full vertical footprint it will occupy, including
//! the spacing drawn above and below it, so the planner never needs to know
//! about fonts.

use serde::Serialize;

use crate::config::{Labels, LayoutConfig};
use crate::fonts::Fonts;
use crate::model::{Document, EducationEntry, ExperienceEntry, SkillSectionId, non_blank, provided};
use crate::warning::LayoutWarning;

pub const NAME_SIZE: f32 = 24.0;
pub const NAME_LINE: f32 = 26.0;
pub const TITLE_SIZE: f32 = 16.0;
pub const TITLE_GAP: f32 = 8.0;
pub const TITLE_LINE: f32 = 18.0;
pub const CONTACT_SIZE: f32 = 11.0;
pub const CONTACT_GAP: f32 = 14.0;
pub const CONTACT_LINE: f32 = 14.0;
pub const HEADING_SIZE: f32 = 16.0;
pub const ENTRY_HEADER_SIZE: f32 = 12.0;
pub const META_SIZE: f32 = 10.0;
pub const BULLET_SIZE: f32 = 10.0;
pub const SUMMARY_SIZE: f32 = 11.0;
pub const SKILL_LABEL_SIZE: f32 = 11.0;
pub const SKILL_CONTENT_SIZE: f32 = 10.0;

/// Gap between the header and the rule below it.
const HEADER_RULE_GAP: f32 = 18.0;
/// Gap between a rule and the section heading that follows.
const RULE_TRAIL: f32 = 12.0;
/// Rule drawn between two sections.
const SECTION_RULE_GAP: f32 = 6.0;
/// Horizontal room kept between header text and the photo.
const PHOTO_GUTTER: f32 = 16.0;
/// Heading baseline below the spacing above it.
const HEADING_ASCENT: f32 = 12.0;
const HEADING_UNDERLINE_GAP: f32 = 6.0;
const HEADING_TRAIL: f32 = 12.0;
const ENTRY_HEADER_TRAIL: f32 = 2.0;
const EXPERIENCE_META_TRAIL: f32 = 8.0;
const SUMMARY_TRAIL: f32 = 8.0;
const SKILL_LABEL_TRAIL: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Header,
    Heading,
    Paragraph,
    BulletItem,
    EntryHeader,
    EntryMeta,
    Divider,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Text,
    Body,
    Muted,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub color: ColorRole,
}

impl TextStyle {
    const fn new(font_size: f32, bold: bool, color: ColorRole) -> Self {
        Self {
            font_size,
            bold,
            color,
        }
    }
}

/// Wrapped lines of one block. `lead` is blank space above the first line,
/// `trail` below the last.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextContent {
    pub lines: Vec<String>,
    pub style: TextStyle,
    pub indent: f32,
    pub bullet: bool,
    pub lead: f32,
    pub trail: f32,
}

/// A line of the page header, positioned relative to the top of the block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderLine {
    pub text: String,
    pub style: TextStyle,
    pub baseline: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderContent {
    pub lines: Vec<HeaderLine>,
    /// Edge length of the photo square reserved in the top-right corner.
    pub photo_size: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeadingContent {
    pub title: String,
    pub baseline: f32,
    pub underline: f32,
    pub underline_width: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Header(HeaderContent),
    Heading(HeadingContent),
    Text(TextContent),
    /// Horizontal rule across the content width, `offset` below the block top.
    Rule { offset: f32 },
}

/// Blocks sharing a group id form one experience or education entry, the
/// unit the orphan rule moves between pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GroupId(pub usize);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderBlock {
    pub kind: BlockKind,
    pub content: BlockContent,
    pub height: f32,
    pub group: Option<GroupId>,
    /// The block must share a page with the start of the block after it.
    pub keep_with_next: bool,
}

impl RenderBlock {
    pub fn text(&self) -> Option<&TextContent> {
        match &self.content {
            BlockContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Paragraphs may be split between lines; everything else moves whole.
    pub fn is_splittable(&self) -> bool {
        self.kind == BlockKind::Paragraph
    }

    pub fn line_count(&self) -> usize {
        self.text().map_or(1, |t| t.lines.len())
    }

    /// Every string this block draws, in order.
    pub fn visible_text(&self) -> Vec<&str> {
        match &self.content {
            BlockContent::Header(h) => h.lines.iter().map(|l| l.text.as_str()).collect(),
            BlockContent::Heading(h) => vec![h.title.as_str()],
            BlockContent::Text(t) => t.lines.iter().map(String::as_str).collect(),
            BlockContent::Rule { .. } => Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Measure {
    pub line_count: usize,
    pub height: f32,
}

/// Wraps text with the active font metrics.
pub struct Measurer<'a> {
    fonts: &'a Fonts,
    line_height: f32,
}

impl<'a> Measurer<'a> {
    pub fn new(fonts: &'a Fonts, config: &LayoutConfig) -> Self {
        Self {
            fonts,
            line_height: config.line_height,
        }
    }

    /// Lines and height the text occupies at the given width. Empty text
    /// occupies nothing.
    pub fn measure(&self, text: &str, font_size: f32, bold: bool, width: f32) -> Measure {
        let line_count = self.wrap(text, font_size, bold, width).len();
        Measure {
            line_count,
            height: line_count as f32 * self.line_height,
        }
    }

    /// Greedy word wrap. Explicit newlines are kept and words wider than the
    /// line are broken between characters.
    pub fn wrap(&self, text: &str, font_size: f32, bold: bool, width: f32) -> Vec<String> {
        let face = self.fonts.face(bold);
        let space = face.space_width(font_size);
        let mut lines = Vec::new();

        for hard in text.trim().split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0;

            for word in hard.split_whitespace() {
                let word_width = face.text_width(word, font_size);
                let needed = if current.is_empty() {
                    word_width
                } else {
                    current_width + space + word_width
                };
                if needed <= width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width = needed;
                    continue;
                }
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                if word_width <= width {
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }
                // Break the word where it overflows.
                for ch in word.chars() {
                    let w = face.text_width(ch.encode_utf8(&mut [0; 4]), font_size);
                    if !current.is_empty() && current_width + w > width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += w;
                }
            }
            lines.push(current);
        }

        if lines.iter().all(String::is_empty) {
            lines.clear();
        }
        lines
    }
}

/// Measure every visible part of `doc`. `has_photo` reserves the photo square
/// in the header.
pub fn build_blocks(
    doc: &Document,
    fonts: &Fonts,
    config: &LayoutConfig,
    has_photo: bool,
) -> (Vec<RenderBlock>, Vec<LayoutWarning>) {
    let mut builder = BlockBuilder {
        measurer: Measurer::new(fonts, config),
        fonts,
        config,
        labels: config.labels(),
        blocks: Vec::new(),
        warnings: Vec::new(),
        next_group: 0,
    };
    builder.header(doc, has_photo);

    let present = [
        non_blank(doc.summary.as_deref()).is_some(),
        doc.education.iter().any(EducationEntry::is_renderable),
        doc.experience.iter().any(ExperienceEntry::is_renderable),
        !doc.skills.sections().0.is_empty(),
    ];
    let mut first = true;
    for (index, _) in present.iter().enumerate().filter(|(_, p)| **p) {
        builder.divider(first);
        first = false;
        match index {
            0 => builder.summary(doc),
            1 => builder.education(doc),
            2 => builder.experience(doc),
            _ => builder.skills(doc),
        }
    }
    for id in doc.skills.sections().1 {
        builder
            .warnings
            .push(LayoutWarning::UnknownSkillSection { id: id.to_string() });
    }

    (builder.blocks, builder.warnings)
}

struct BlockBuilder<'a> {
    measurer: Measurer<'a>,
    fonts: &'a Fonts,
    config: &'a LayoutConfig,
    labels: Labels,
    blocks: Vec<RenderBlock>,
    warnings: Vec<LayoutWarning>,
    next_group: usize,
}

impl BlockBuilder<'_> {
    /// Replace glyphs the face lacks, recording what changed.
    fn fold(&mut self, text: &str, bold: bool) -> String {
        let folded = self.fonts.face(bold).fold_text(text);
        if folded != text {
            self.warnings.push(LayoutWarning::Transliterated {
                original: text.to_string(),
                replacement: folded.to_string(),
            });
        }
        folded.into_owned()
    }

    fn wrap(&mut self, text: &str, style: TextStyle, width: f32) -> Vec<String> {
        let text = self.fold(text, style.bold);
        self.measurer.wrap(&text, style.font_size, style.bold, width)
    }

    fn new_group(&mut self) -> GroupId {
        self.next_group += 1;
        GroupId(self.next_group)
    }

    fn push(&mut self, kind: BlockKind, content: BlockContent, height: f32) {
        self.blocks.push(RenderBlock {
            kind,
            content,
            height,
            group: None,
            keep_with_next: matches!(kind, BlockKind::Heading | BlockKind::Divider),
        });
    }

    /// Wrap and push a text block. Returns false when the text was empty.
    fn push_text(
        &mut self,
        kind: BlockKind,
        text: &str,
        style: TextStyle,
        bullet: bool,
        trail: f32,
        group: Option<GroupId>,
    ) -> bool {
        let indent = if bullet { self.config.bullet_indent } else { 0.0 };
        let lines = self.wrap(text, style, self.config.content_width() - indent);
        if lines.is_empty() {
            return false;
        }
        let height = lines.len() as f32 * self.config.line_height + trail;
        self.blocks.push(RenderBlock {
            kind,
            content: BlockContent::Text(TextContent {
                lines,
                style,
                indent,
                bullet,
                lead: 0.0,
                trail,
            }),
            height,
            group,
            keep_with_next: false,
        });
        true
    }

    /// Add trailing space to the last block pushed.
    fn extend_last(&mut self, extra: f32) {
        if let Some(block) = self.blocks.last_mut() {
            block.height += extra;
            if let BlockContent::Text(t) = &mut block.content {
                t.trail += extra;
            }
        }
    }

    fn header(&mut self, doc: &Document, has_photo: bool) {
        let photo_size = has_photo.then_some(self.config.photo_size);
        let width = match photo_size {
            Some(size) => self.config.content_width() - size - PHOTO_GUTTER,
            None => self.config.content_width(),
        };

        let name = provided(Some(doc.name.as_str())).unwrap_or(self.labels.placeholder_name);
        let name_style = TextStyle::new(NAME_SIZE, true, ColorRole::Text);
        let title_style = TextStyle::new(TITLE_SIZE, true, ColorRole::Body);
        let contact_style = TextStyle::new(CONTACT_SIZE, false, ColorRole::Muted);

        // Baselines relative to the top of the text block.
        let mut lines = Vec::new();
        let mut baseline = 0.0;
        for line in self.wrap(name, name_style, width) {
            baseline += NAME_LINE;
            lines.push(HeaderLine {
                text: line,
                style: name_style,
                baseline,
            });
        }
        if let Some(title) = provided(doc.title.as_deref()) {
            baseline += TITLE_GAP;
            for line in self.wrap(title, title_style, width) {
                baseline += TITLE_LINE;
                lines.push(HeaderLine {
                    text: line,
                    style: title_style,
                    baseline,
                });
            }
        }
        let contact = self.contact_line(doc);
        if !contact.is_empty() {
            baseline += CONTACT_GAP;
            for line in self.wrap(&contact, contact_style, width) {
                baseline += CONTACT_LINE;
                lines.push(HeaderLine {
                    text: line,
                    style: contact_style,
                    baseline,
                });
            }
        }

        // Centre the text on the photo, never above the top margin.
        let text_height = baseline;
        let offset = match photo_size {
            Some(size) => ((size - text_height) / 2.0).max(0.0),
            None => 0.0,
        };
        for line in &mut lines {
            line.baseline += offset;
        }
        let height = (offset + text_height).max(photo_size.unwrap_or(0.0));

        self.push(
            BlockKind::Header,
            BlockContent::Header(HeaderContent { lines, photo_size }),
            height,
        );
    }

    fn contact_line(&self, doc: &Document) -> String {
        let mut parts = Vec::new();
        if let Some(phone) = provided(doc.contact.phone.as_deref()) {
            parts.push(format!("{}: {phone}", self.labels.phone));
        }
        if let Some(email) = provided(doc.contact.email.as_deref()) {
            parts.push(format!("{}: {email}", self.labels.email));
        }
        parts.join(" | ")
    }

    fn divider(&mut self, after_header: bool) {
        let (offset, height) = if after_header {
            (HEADER_RULE_GAP, HEADER_RULE_GAP + RULE_TRAIL)
        } else {
            (SECTION_RULE_GAP, SECTION_RULE_GAP)
        };
        self.push(BlockKind::Divider, BlockContent::Rule { offset }, height);
    }

    fn heading(&mut self, title: &str) {
        let title = self.fold(title, true);
        let baseline = self.config.section_spacing + HEADING_ASCENT;
        let underline = baseline + HEADING_UNDERLINE_GAP;
        let underline_width = (self.config.content_width() * 0.35).min(180.0);
        self.push(
            BlockKind::Heading,
            BlockContent::Heading(HeadingContent {
                title,
                baseline,
                underline,
                underline_width,
            }),
            underline + HEADING_TRAIL,
        );
    }

    fn summary(&mut self, doc: &Document) {
        let Some(summary) = non_blank(doc.summary.as_deref()) else {
            return;
        };
        self.heading(self.labels.summary);
        self.push_text(
            BlockKind::Paragraph,
            summary,
            TextStyle::new(SUMMARY_SIZE, false, ColorRole::Body),
            false,
            SUMMARY_TRAIL,
            None,
        );
    }

    fn education(&mut self, doc: &Document) {
        self.heading(self.labels.education);
        for entry in doc.education.iter().filter(|e| e.is_renderable()) {
            let group = Some(self.new_group());
            let header = join_present(
                &[entry.degree.as_deref(), entry.institution.as_deref()],
                " | ",
            );
            let meta = join_present(&[entry.location.as_deref(), entry.year.as_deref()], " • ");
            self.entry(group, &header, &meta, 0.0, &entry.description);
        }
    }

    fn experience(&mut self, doc: &Document) {
        self.heading(self.labels.experience);
        for entry in doc.experience.iter().filter(|e| e.is_renderable()) {
            let group = Some(self.new_group());
            let header = join_present(
                &[entry.job_title.as_deref(), entry.company.as_deref()],
                " | ",
            );
            let meta = join_present(&[entry.location.as_deref(), entry.dates.as_deref()], " • ");
            self.entry(group, &header, &meta, EXPERIENCE_META_TRAIL, &entry.responsibilities);
        }
    }

    fn entry(
        &mut self,
        group: Option<GroupId>,
        header: &str,
        meta: &str,
        meta_trail: f32,
        bullets: &[String],
    ) {
        let start = self.blocks.len();
        self.push_text(
            BlockKind::EntryHeader,
            header,
            TextStyle::new(ENTRY_HEADER_SIZE, true, ColorRole::Text),
            false,
            ENTRY_HEADER_TRAIL,
            group,
        );
        self.push_text(
            BlockKind::EntryMeta,
            meta,
            TextStyle::new(META_SIZE, false, ColorRole::Muted),
            false,
            meta_trail,
            group,
        );
        let bullet_style = TextStyle::new(BULLET_SIZE, false, ColorRole::Body);
        for bullet in bullets {
            let clean = bullet.split_whitespace().collect::<Vec<_>>().join(" ");
            if clean.is_empty() {
                continue;
            }
            self.push_text(
                BlockKind::BulletItem,
                &clean,
                bullet_style,
                true,
                self.config.bullet_spacing,
                group,
            );
        }
        if self.blocks.len() > start {
            self.extend_last(self.config.item_spacing);
        }
    }

    fn skills(&mut self, doc: &Document) {
        let title = provided(doc.skills.title.as_deref()).unwrap_or(self.labels.skills);
        self.heading(title);
        let (sections, _) = doc.skills.sections();
        let count = sections.len();
        for (i, section) in sections.into_iter().enumerate() {
            let label = match (section.id, section.title) {
                (_, Some(title)) => title.to_string(),
                (SkillSectionId::Technical, None) => self.labels.technical.to_string(),
                (SkillSectionId::Soft, None) => self.labels.soft.to_string(),
                (SkillSectionId::Languages, None) => self.labels.languages.to_string(),
                (SkillSectionId::Custom(_), None) => String::new(),
            };
            let labelled = self.push_text(
                BlockKind::Paragraph,
                &label,
                TextStyle::new(SKILL_LABEL_SIZE, true, ColorRole::Text),
                false,
                SKILL_LABEL_TRAIL,
                None,
            );
            if labelled && let Some(block) = self.blocks.last_mut() {
                block.keep_with_next = true;
            }
            let trail = if i + 1 < count {
                self.config.item_spacing
            } else {
                0.0
            };
            self.push_text(
                BlockKind::Paragraph,
                section.content,
                TextStyle::new(SKILL_CONTENT_SIZE, false, ColorRole::Body),
                false,
                trail,
                None,
            );
        }
    }
}

fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .filter_map(|p| provided(*p))
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, SkillsBlock};

    fn measurer_fixture() -> (Fonts, LayoutConfig) {
        (Fonts::builtin(), LayoutConfig::default())
    }

    fn experience(title: &str, bullets: &[&str]) -> ExperienceEntry {
        ExperienceEntry {
            job_title: Some(title.into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            dates: Some("2020 - 2024".into()),
            responsibilities: bullets.iter().map(|b| b.to_string()).collect(),
        }
    }

    // ── measure ──

    #[test]
    fn empty_text_measures_zero() {
        let (fonts, cfg) = measurer_fixture();
        let m = Measurer::new(&fonts, &cfg);
        assert_eq!(m.measure("", 10.0, false, 100.0), Measure::default());
        assert_eq!(m.measure("  \n ", 10.0, false, 100.0).line_count, 0);
    }

    #[test]
    fn height_is_lines_times_line_height() {
        let (fonts, cfg) = measurer_fixture();
        let m = Measurer::new(&fonts, &cfg);
        let text = "word ".repeat(80);
        let result = m.measure(&text, 10.0, false, 200.0);
        assert!(result.line_count > 1);
        assert_eq!(result.height, result.line_count as f32 * 14.0);
    }

    #[test]
    fn wrapped_lines_fit_the_width() {
        let (fonts, cfg) = measurer_fixture();
        let m = Measurer::new(&fonts, &cfg);
        let text = "Designed and shipped a distributed build cache used by forty teams";
        for line in m.wrap(text, 10.0, false, 120.0) {
            assert!(fonts.face(false).text_width(&line, 10.0) <= 120.0, "{line}");
        }
    }

    #[test]
    fn overlong_word_is_broken() {
        let (fonts, cfg) = measurer_fixture();
        let m = Measurer::new(&fonts, &cfg);
        let lines = m.wrap(&"x".repeat(200), 10.0, false, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 200);
    }

    #[test]
    fn explicit_newlines_start_new_lines() {
        let (fonts, cfg) = measurer_fixture();
        let m = Measurer::new(&fonts, &cfg);
        assert_eq!(m.wrap("one\ntwo", 10.0, false, 400.0), vec!["one", "two"]);
    }

    // ── blocks ──

    #[test]
    fn empty_document_yields_placeholder_header_only() {
        let (fonts, cfg) = measurer_fixture();
        let (blocks, warnings) = build_blocks(&Document::default(), &fonts, &cfg, false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Header);
        assert_eq!(blocks[0].visible_text(), vec!["Your Name"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn placeholder_experience_is_skipped() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            name: "Jane".into(),
            experience: vec![ExperienceEntry {
                job_title: Some("[Job Title]".into()),
                company: Some("[Company]".into()),
                responsibilities: vec!["Did things".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, false);
        assert!(blocks.iter().all(|b| b.kind != BlockKind::BulletItem));
        assert!(blocks.iter().all(|b| b.kind != BlockKind::Heading));
    }

    #[test]
    fn entry_blocks_share_a_group() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            experience: vec![experience("Engineer", &["a", "b"]), experience("Lead", &["c"])],
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, false);
        let groups: Vec<_> = blocks.iter().filter_map(|b| b.group).collect();
        assert_eq!(groups.len(), 7);
        assert!(groups[..4].iter().all(|g| *g == groups[0]));
        assert!(groups[4..].iter().all(|g| *g == groups[4]));
        assert_ne!(groups[0], groups[4]);
    }

    #[test]
    fn bullets_wrap_within_indented_width() {
        let (fonts, cfg) = measurer_fixture();
        let long = "Reduced deployment time across the whole organisation ".repeat(6);
        let doc = Document {
            experience: vec![experience("Engineer", &[long.as_str()])],
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, false);
        let bullet = blocks
            .iter()
            .find(|b| b.kind == BlockKind::BulletItem)
            .unwrap();
        let text = bullet.text().unwrap();
        assert!(text.bullet);
        let width = cfg.content_width() - cfg.bullet_indent;
        for line in &text.lines {
            assert!(fonts.face(false).text_width(line, BULLET_SIZE) <= width);
        }
        // Last bullet of the entry also carries the item spacing.
        let expected = text.lines.len() as f32 * 14.0 + cfg.bullet_spacing + cfg.item_spacing;
        assert!((bullet.height - expected).abs() < 1e-3);
    }

    #[test]
    fn header_text_centres_on_photo() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            name: "Jane Roe".into(),
            title: Some("Engineer".into()),
            contact: Contact {
                phone: Some("123".into()),
                email: Some("j@r.io".into()),
            },
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, true);
        let BlockContent::Header(header) = &blocks[0].content else {
            panic!("first block is not the header");
        };
        assert_eq!(header.photo_size, Some(104.0));
        assert_eq!(blocks[0].height, 104.0);
        // 26 + 26 + 28 = 80 of text, centred in 104.
        assert!((header.lines[0].baseline - (12.0 + 26.0)).abs() < 1e-3);
        assert_eq!(header.lines[2].text, "Phone: 123 | Email: j@r.io");
    }

    #[test]
    fn tall_header_text_starts_at_top_of_photo_row() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            name: "Maximilian Alexander Montgomery-Fairweather Wolfeschlegelstein".into(),
            title: Some("Principal Distributed Systems Engineer".into()),
            contact: Contact {
                phone: Some("+44 20 7946 0000".into()),
                email: Some("max@example.org".into()),
            },
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, true);
        let BlockContent::Header(header) = &blocks[0].content else {
            panic!("first block is not the header");
        };
        let text_height = header.lines.last().unwrap().baseline;
        assert!(text_height > cfg.photo_size, "header text only {text_height}pt");
        assert_eq!(header.lines[0].baseline, NAME_LINE);
        assert_eq!(blocks[0].height, text_height);
    }

    #[test]
    fn skill_labels_stay_with_content_without_entry_groups() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            skills: SkillsBlock {
                technical: Some("Rust".into()),
                soft: Some("Mentoring".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, false);
        let skills: Vec<_> = blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Paragraph)
            .collect();
        assert_eq!(skills.len(), 4);
        assert!(skills.iter().all(|b| b.group.is_none()));
        assert!(skills[0].keep_with_next && !skills[1].keep_with_next);
        assert!(skills[2].keep_with_next && !skills[3].keep_with_next);
    }

    #[test]
    fn skills_follow_order_and_report_unknown() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            skills: SkillsBlock {
                order: vec![
                    SkillSectionId::Languages,
                    SkillSectionId::Custom(2),
                    SkillSectionId::Technical,
                ],
                technical: Some("Rust".into()),
                languages: Some("English".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (blocks, warnings) = build_blocks(&doc, &fonts, &cfg, false);
        let texts: Vec<&str> = blocks.iter().flat_map(|b| b.visible_text()).collect();
        let langs = texts.iter().position(|t| *t == "Languages:").unwrap();
        let tech = texts.iter().position(|t| *t == "Technical Skills:").unwrap();
        assert!(langs < tech);
        assert_eq!(
            warnings,
            vec![LayoutWarning::UnknownSkillSection {
                id: "custom-2".into()
            }]
        );
    }

    #[test]
    fn undrawable_characters_are_reported() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            name: "Paweł".into(),
            ..Default::default()
        };
        let (blocks, warnings) = build_blocks(&doc, &fonts, &cfg, false);
        assert_eq!(blocks[0].visible_text(), vec!["Pawel"]);
        assert!(matches!(
            &warnings[0],
            LayoutWarning::Transliterated { original, .. } if original == "Paweł"
        ));
    }

    #[test]
    fn non_empty_blocks_have_height() {
        let (fonts, cfg) = measurer_fixture();
        let doc = Document {
            name: "Jane".into(),
            summary: Some("Short.".into()),
            experience: vec![experience("Engineer", &["x"])],
            ..Default::default()
        };
        let (blocks, _) = build_blocks(&doc, &fonts, &cfg, false);
        assert!(blocks.iter().all(|b| b.height > 0.0));
    }
}
