use std::ops::Range;

use pdf_writer::{Content, Name, Str};

use crate::config::{LayoutConfig, PAGE_HEIGHT, PAGE_WIDTH, Rgb};
use crate::fonts::{EmbeddedFont, Fonts};
use crate::measure::{ColorRole, HeaderContent, HeadingContent, TextContent, TextStyle};

/// Bezier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;
const RING_COLOR: Rgb = [209, 213, 219];
const RING_WIDTH: f32 = 1.2;
const GUIDE_WIDTH: f32 = 0.8;
const RULE_WIDTH: f32 = 1.0;
const UNDERLINE_WIDTH: f32 = 1.5;
const BULLET: &str = "•";

fn pdf_y(top_down: f32) -> f32 {
    PAGE_HEIGHT - top_down
}

/// Draws measured blocks into the content stream of one page. All `y`
/// arguments are top-down offsets from the top edge of the page.
pub(super) struct Painter<'a> {
    content: Content,
    config: &'a LayoutConfig,
    fonts: &'a Fonts,
    regular: &'a EmbeddedFont,
    bold: &'a EmbeddedFont,
}

impl<'a> Painter<'a> {
    pub(super) fn new(
        config: &'a LayoutConfig,
        fonts: &'a Fonts,
        regular: &'a EmbeddedFont,
        bold: &'a EmbeddedFont,
    ) -> Self {
        Self {
            content: Content::new(),
            config,
            fonts,
            regular,
            bold,
        }
    }

    pub(super) fn finish(self) -> Vec<u8> {
        self.content.finish().to_vec()
    }

    fn color(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Text => self.config.text_color,
            ColorRole::Body => self.config.body_color,
            ColorRole::Muted => self.config.muted_color,
        }
    }

    fn set_fill(&mut self, [r, g, b]: Rgb) {
        self.content
            .set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    }

    fn set_stroke(&mut self, [r, g, b]: Rgb) {
        self.content
            .set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    }

    fn line(&mut self, color: Rgb, width: f32, from: (f32, f32), to: (f32, f32)) {
        self.content.save_state();
        self.content.set_line_width(width);
        self.set_stroke(color);
        self.content.move_to(from.0, pdf_y(from.1));
        self.content.line_to(to.0, pdf_y(to.1));
        self.content.stroke();
        self.content.restore_state();
    }

    fn show(&mut self, text: &str, x: f32, baseline: f32, font_size: f32, bold: bool, color: Rgb) {
        let font = if bold { self.bold } else { self.regular };
        let bytes = font.encode(text);
        self.set_fill(color);
        self.content
            .begin_text()
            .set_font(font.name(), font_size)
            .next_line(x, pdf_y(baseline))
            .show(Str(&bytes))
            .end_text();
    }

    /// Baseline of a line drawn in a slot of one line height.
    fn baseline_offset(&self, style: TextStyle) -> f32 {
        let ascent = style.font_size * self.fonts.face(style.bold).ascender_ratio;
        (self.config.line_height + ascent) / 2.0
    }

    /// Vertical guide along the left margin.
    pub(super) fn guide(&mut self) {
        let m = self.config.margin;
        self.line(self.config.guide_color, GUIDE_WIDTH, (m, m), (m, PAGE_HEIGHT - m));
    }

    pub(super) fn header(&mut self, y: f32, header: &HeaderContent, photo: Option<&str>) {
        let x = self.config.margin;
        for line in &header.lines {
            let color = self.color(line.style.color);
            self.show(
                &line.text,
                x,
                y + line.baseline,
                line.style.font_size,
                line.style.bold,
                color,
            );
        }
        if let (Some(size), Some(name)) = (header.photo_size, photo) {
            self.photo(name, PAGE_WIDTH - self.config.margin - size, y, size);
        }
    }

    fn photo(&mut self, name: &str, x: f32, y: f32, size: f32) {
        let bottom = pdf_y(y + size);
        self.content.save_state();
        self.content.transform([size, 0.0, 0.0, size, x, bottom]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();

        let r = size / 2.0;
        let (cx, cy) = (x + r, bottom + r);
        let k = KAPPA * r;
        self.content.save_state();
        self.content.set_line_width(RING_WIDTH);
        self.set_stroke(RING_COLOR);
        self.content.move_to(cx + r, cy);
        self.content.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        self.content.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        self.content.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        self.content.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        self.content.close_path();
        self.content.stroke();
        self.content.restore_state();
    }

    pub(super) fn heading(&mut self, y: f32, heading: &HeadingContent, font_size: f32) {
        let x = self.config.margin;
        let color = self.config.text_color;
        self.show(&heading.title, x, y + heading.baseline, font_size, true, color);
        let underline = y + heading.underline;
        self.line(
            self.config.accent_color,
            UNDERLINE_WIDTH,
            (x, underline),
            (x + heading.underline_width, underline),
        );
    }

    pub(super) fn rule(&mut self, y: f32) {
        let m = self.config.margin;
        self.line(
            self.config.rule_color,
            RULE_WIDTH,
            (m, y),
            (PAGE_WIDTH - m, y),
        );
    }

    /// Draw `lines` of a text block whose placed part starts at `y`.
    pub(super) fn text(&mut self, y: f32, text: &TextContent, lines: Range<usize>) {
        let style = text.style;
        let lead = if lines.start == 0 { text.lead } else { 0.0 };
        let top = y + lead;
        let baseline = self.baseline_offset(style);
        let x = self.config.margin + text.indent;
        let color = self.color(style.color);

        if text.bullet && lines.start == 0 {
            let accent = self.config.accent_color;
            self.show(BULLET, self.config.margin, top + baseline, style.font_size, false, accent);
        }
        for (row, line) in text.lines[lines].iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_top = top + row as f32 * self.config.line_height;
            self.show(line, x, line_top + baseline, style.font_size, style.bold, color);
        }
    }
}
