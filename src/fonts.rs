use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::Face;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::LayoutConfig;
use crate::error::Error;

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_ASCII: [f32; 95] = [
    278.0, 278.0, 355.0, 556.0, 556.0, 889.0, 667.0, 191.0, 333.0, 333.0, 389.0, 584.0, 278.0, 333.0, 278.0, 278.0,
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 278.0, 278.0, 584.0, 584.0, 584.0, 556.0,
    1015.0, 667.0, 667.0, 722.0, 722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 500.0, 667.0, 556.0, 833.0, 722.0, 778.0,
    667.0, 778.0, 722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 278.0, 278.0, 278.0, 469.0, 556.0,
    333.0, 556.0, 556.0, 500.0, 556.0, 556.0, 278.0, 556.0, 556.0, 222.0, 222.0, 500.0, 222.0, 833.0, 556.0, 556.0,
    556.0, 556.0, 333.0, 500.0, 278.0, 556.0, 500.0, 722.0, 500.0, 500.0, 500.0, 334.0, 260.0, 334.0, 584.0,
];

/// Helvetica-Bold advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [f32; 95] = [
    278.0, 333.0, 474.0, 556.0, 556.0, 889.0, 722.0, 238.0, 333.0, 333.0, 389.0, 584.0, 278.0, 333.0, 278.0, 278.0,
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 333.0, 333.0, 584.0, 584.0, 584.0, 611.0,
    975.0, 722.0, 722.0, 722.0, 722.0, 667.0, 611.0, 778.0, 722.0, 278.0, 556.0, 722.0, 611.0, 833.0, 722.0, 778.0,
    667.0, 778.0, 722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 333.0, 278.0, 333.0, 584.0, 556.0,
    333.0, 556.0, 611.0, 556.0, 611.0, 556.0, 333.0, 611.0, 611.0, 278.0, 278.0, 556.0, 278.0, 889.0, 611.0, 611.0,
    611.0, 611.0, 389.0, 556.0, 333.0, 611.0, 556.0, 778.0, 556.0, 556.0, 500.0, 389.0, 280.0, 389.0, 584.0,
];

const HELVETICA_ASCENDER: f32 = 0.718;

enum FontData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl FontData {
    fn bytes(&self) -> &[u8] {
        match self {
            FontData::Mapped(m) => m,
            FontData::Owned(v) => v,
        }
    }
}

struct TrueTypeFace {
    ps_name: String,
    data: FontData,
    face_index: u32,
    /// char -> (original glyph id, advance in 1000 units)
    glyphs: HashMap<char, (u16, f32)>,
    bbox: Rect,
    ascent: f32,
    descent: f32,
    cap_height: f32,
}

enum FaceKind {
    Builtin {
        base_font: &'static str,
        widths_1000: Vec<f32>,
    },
    TrueType(Box<TrueTypeFace>),
}

/// One typeface style used for measurement and, later, embedding.
pub struct FontFace {
    kind: FaceKind,
    pub(crate) ascender_ratio: f32,
}

/// Regular and bold faces for a render.
pub struct Fonts {
    regular: FontFace,
    bold: FontFace,
}

impl FontFace {
    fn builtin(bold: bool) -> Self {
        let ascii = if bold {
            &HELVETICA_BOLD_ASCII
        } else {
            &HELVETICA_ASCII
        };
        FontFace {
            kind: FaceKind::Builtin {
                base_font: if bold { "Helvetica-Bold" } else { "Helvetica" },
                widths_1000: winansi_widths(ascii),
            },
            ascender_ratio: HELVETICA_ASCENDER,
        }
    }

    pub fn has_char(&self, ch: char) -> bool {
        match &self.kind {
            FaceKind::Builtin { .. } => char_to_winansi(ch) != 0,
            FaceKind::TrueType(tt) => tt.glyphs.contains_key(&ch),
        }
    }

    /// Width of a single character in 1000-units.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match &self.kind {
            FaceKind::Builtin { widths_1000, .. } => {
                let byte = char_to_winansi(ch);
                if byte >= 32 {
                    widths_1000[(byte - 32) as usize]
                } else {
                    0.0
                }
            }
            FaceKind::TrueType(tt) => tt
                .glyphs
                .get(&ch)
                .or_else(|| tt.glyphs.get(&'?'))
                .map(|&(_, w)| w)
                .unwrap_or(500.0),
        }
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }

    /// Replace characters this face cannot draw with the closest drawable
    /// ones. Borrowed when nothing needed replacing.
    pub fn fold_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.chars().all(|ch| ch.is_whitespace() || self.has_char(ch)) {
            return Cow::Borrowed(text);
        }
        Cow::Owned(
            text.chars()
                .map(|ch| {
                    if ch.is_whitespace() {
                        ch
                    } else {
                        fold_char(ch, |c| self.has_char(c))
                    }
                })
                .collect(),
        )
    }
}

/// Polish letters that have no canonical decomposition.
fn stroke_letter_fallback(ch: char) -> Option<char> {
    match ch {
        'ł' => Some('l'),
        'Ł' => Some('L'),
        'đ' => Some('d'),
        'Đ' => Some('D'),
        'ø' => Some('o'),
        'Ø' => Some('O'),
        _ => None,
    }
}

fn fold_char(ch: char, has: impl Fn(char) -> bool) -> char {
    if has(ch) {
        return ch;
    }
    if let Some(c) = stroke_letter_fallback(ch).filter(|&c| has(c)) {
        return c;
    }
    let base = std::iter::once(ch).nfd().find(|c| !is_combining_mark(*c));
    if let Some(b) = base.filter(|&b| b != ch && has(b)) {
        return b;
    }
    '?'
}

impl Fonts {
    pub fn builtin() -> Self {
        Fonts {
            regular: FontFace::builtin(false),
            bold: FontFace::builtin(true),
        }
    }

    /// Load TrueType faces from files. Without a bold file the regular face
    /// also serves bold text.
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> Result<Self, Error> {
        let regular_face = load_truetype(regular, 0)?;
        let bold_face = match bold {
            Some(path) => load_truetype(path, 0)?,
            None => load_truetype(regular, 0)?,
        };
        Ok(Fonts {
            regular: regular_face,
            bold: bold_face,
        })
    }

    /// Resolve fonts from `CVPRESS_FONT`/`CVPRESS_FONT_BOLD`, then the configured
    /// family in the font directories, then built-in Helvetica.
    pub fn load(config: &LayoutConfig) -> Result<Self, Error> {
        if let Ok(regular) = std::env::var("CVPRESS_FONT") {
            let bold = std::env::var("CVPRESS_FONT_BOLD").ok().map(PathBuf::from);
            return Self::from_files(Path::new(&regular), bold.as_deref());
        }

        if let Some(family) = config.font_family.as_deref() {
            let index = scan_font_dirs();
            let key = family.to_lowercase();
            if let Some((path, face_idx)) = index.get(&(key.clone(), false)) {
                let regular = load_truetype(path, *face_idx)?;
                let bold = match index.get(&(key, true)) {
                    Some((bpath, bidx)) => load_truetype(bpath, *bidx)?,
                    None => load_truetype(path, *face_idx)?,
                };
                return Ok(Fonts { regular, bold });
            }
            log::warn!("Font not found: {family}, using Helvetica");
        }

        Ok(Self::builtin())
    }

    pub fn face(&self, bold: bool) -> &FontFace {
        if bold { &self.bold } else { &self.regular }
    }
}

fn load_truetype(path: &Path, face_index: u32) -> Result<FontFace, Error> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
    // SAFETY: font files are opened read-only and not expected to change during a render.
    let data = match unsafe { Mmap::map(&file) } {
        Ok(m) => FontData::Mapped(m),
        Err(_) => FontData::Owned(std::fs::read(path)?),
    };
    let face = parse_truetype(data, face_index)
        .ok_or_else(|| Error::Font(format!("{}: not a usable TrueType/OpenType font", path.display())))?;
    log::debug!("Loaded font {} (face {face_index})", path.display());
    Ok(face)
}

fn parse_truetype(data: FontData, face_index: u32) -> Option<FontFace> {
    let (glyphs, ps_name, bbox, ascent, descent, cap_height, ascender_ratio) = {
        let face = Face::parse(data.bytes(), face_index).ok()?;
        let units = face.units_per_em() as f32;
        let to_1000 = |v: f32| v / units * 1000.0;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = subtable.glyph_index(cp) {
                        let adv = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
                        glyphs.entry(ch).or_insert((gid.0, to_1000(adv)));
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return None;
        }

        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            to_1000(bb.x_min as f32),
            to_1000(bb.y_min as f32),
            to_1000(bb.x_max as f32),
            to_1000(bb.y_max as f32),
        );
        let ps_name = font_family_name(&face)
            .unwrap_or_else(|| "EmbeddedFont".to_string())
            .replace(' ', "");
        (
            glyphs,
            ps_name,
            bbox,
            to_1000(face.ascender() as f32),
            to_1000(face.descender() as f32),
            face.capital_height()
                .map(|h| to_1000(h as f32))
                .unwrap_or(700.0),
            face.ascender() as f32 / units,
        )
    };

    Some(FontFace {
        kind: FaceKind::TrueType(Box::new(TrueTypeFace {
            ps_name,
            data,
            face_index,
            glyphs,
            bbox,
            ascent,
            descent,
            cap_height,
        })),
        ascender_ratio,
    })
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// (lowercase family name, bold) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool), (PathBuf, u32)>;

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("CVPRESS_FONT_DIRS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_scanned = 0u32;

    let mut stack = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            // SAFETY: read-only mapping used only for the duration of this scan.
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            files_scanned += 1;
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                if face.is_italic() {
                    continue;
                }
                if let Some(family) = font_family_name(&face) {
                    index
                        .entry((family.to_lowercase(), face.is_bold()))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );
    index
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}', // bullet
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes for PDF Str encoding. Unmappable
/// characters are expected to have been folded already and are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Widths for WinAnsi bytes 32..=255. Accented letters take their base
/// letter's width.
fn winansi_widths(ascii: &[f32; 95]) -> Vec<f32> {
    (32u8..=255u8)
        .map(|byte| {
            if byte <= 126 {
                return ascii[(byte - 32) as usize];
            }
            let ch = winansi_to_char(byte);
            let base = std::iter::once(ch).nfd().next().unwrap_or(ch);
            if base != ch && (' '..='~').contains(&base) {
                return ascii[(base as u8 - 32) as usize];
            }
            match ch {
                '\u{00A0}' => 278.0,
                '\u{2022}' => 350.0,
                '\u{2026}' | '\u{2014}' | '\u{2030}' => 1000.0,
                '\u{2018}' | '\u{2019}' | '\u{201A}' => 222.0,
                '\u{201C}' | '\u{201D}' | '\u{201E}' => 333.0,
                '\u{2039}' | '\u{203A}' => 333.0,
                'Æ' | 'Œ' => 1000.0,
                'æ' | 'œ' => 889.0,
                _ => 556.0,
            }
        })
        .collect()
}

/// A face written into a PDF, ready to encode text for content streams.
pub(crate) struct EmbeddedFont {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl EmbeddedFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }

    pub(crate) fn name(&self) -> Name<'_> {
        Name(self.pdf_name.as_bytes())
    }
}

/// Encode text as big-endian 2-byte glyph IDs for CIDFont content streams.
fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

impl FontFace {
    /// Write this face into `pdf`. TrueType faces are subset to `used_chars`.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        pdf_name: String,
        alloc: &mut impl FnMut() -> Ref,
        used_chars: &HashSet<char>,
    ) -> EmbeddedFont {
        let font_ref = alloc();
        match &self.kind {
            FaceKind::Builtin { base_font, .. } => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                EmbeddedFont {
                    pdf_name,
                    font_ref,
                    char_to_gid: None,
                }
            }
            FaceKind::TrueType(tt) => {
                let char_to_gid = embed_truetype(pdf, font_ref, tt, used_chars, alloc);
                EmbeddedFont {
                    pdf_name,
                    font_ref,
                    char_to_gid: Some(char_to_gid),
                }
            }
        }
    }
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with Identity-H
/// encoding, subset to the glyphs in `used_chars`. Returns char -> new glyph id.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    tt: &TrueTypeFace,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> HashMap<char, u16> {
    let t0 = std::time::Instant::now();
    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: BTreeMap<u16, f32> = BTreeMap::new();
    for &ch in used_chars {
        if let Some(&(gid, width)) = tt.glyphs.get(&ch) {
            let new_gid = remapper.remap(gid);
            char_to_gid.insert(ch, new_gid);
            gid_widths.insert(new_gid, width);
        }
    }

    let font_data = tt.data.bytes();
    let subset_data = subsetter::subset(font_data, tt.face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {}: {e}, embedding full font", tt.ps_name);
        font_data.to_vec()
    });
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&subset_data, 6);
    pdf.stream(data_ref, &compressed)
        .filter(pdf_writer::Filter::FlateDecode)
        .pair(Name(b"Length1"), subset_data.len() as i32);

    let ps_name = tt.ps_name.as_str();
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(tt.bbox)
        .italic_angle(0.0)
        .ascent(tt.ascent)
        .descent(tt.descent)
        .cap_height(tt.cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = pdf_writer::types::SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for (&gid, &width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    log::debug!(
        "embed_truetype: {ps_name} {} glyphs → {:.1}ms",
        char_to_gid.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    char_to_gid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_widths_follow_afm_metrics() {
        let fonts = Fonts::builtin();
        let regular = fonts.face(false);
        let bold = fonts.face(true);
        assert!((regular.text_width("Hello", 10.0) - 22.78).abs() < 0.01);
        assert!(bold.text_width("Hello", 10.0) > regular.text_width("Hello", 10.0));
        assert!((regular.space_width(10.0) - 2.78).abs() < 0.01);
    }

    #[test]
    fn accented_letters_use_base_width() {
        let face = FontFace::builtin(false);
        assert_eq!(face.char_width_1000('é'), face.char_width_1000('e'));
        assert_eq!(face.char_width_1000('Ñ'), face.char_width_1000('N'));
        assert_eq!(face.char_width_1000('•'), 350.0);
    }

    #[test]
    fn fold_keeps_winansi_and_transliterates_the_rest() {
        let face = FontFace::builtin(false);
        assert!(matches!(face.fold_text("Café – naïve"), Cow::Borrowed(_)));
        assert_eq!(face.fold_text("Łódź, Kraków"), "Lódz, Kraków");
        assert_eq!(face.fold_text("Zażółć"), "Zazólc");
        assert_eq!(face.fold_text("日本"), "??");
    }

    #[test]
    fn winansi_bytes_cover_typographic_punctuation() {
        assert_eq!(to_winansi_bytes("a\u{2022}b"), vec![b'a', 0x95, b'b']);
        assert_eq!(to_winansi_bytes("é"), vec![0xE9]);
    }

    #[test]
    fn missing_font_file_is_a_font_error() {
        let err = Fonts::from_files(Path::new("/nonexistent/font.ttf"), None);
        assert!(matches!(err, Err(Error::Font(_))));
    }
}
