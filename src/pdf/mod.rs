mod draw;

use std::collections::HashSet;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref, TextStr};

use crate::Layout;
use crate::config::{LayoutConfig, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::Error;
use crate::fonts::Fonts;
use crate::measure::{BlockContent, HEADING_SIZE};
use crate::photo::Photo;

use draw::Painter;

const PHOTO_NAME: &str = "Im1";

/// Characters drawn in the regular and bold faces, for subsetting.
fn used_chars(layout: &Layout) -> [HashSet<char>; 2] {
    let mut used = [HashSet::new(), HashSet::new()];
    used[0].insert('•');
    for block in &layout.blocks {
        match &block.content {
            BlockContent::Header(h) => {
                for line in &h.lines {
                    used[line.style.bold as usize].extend(line.text.chars());
                }
            }
            BlockContent::Heading(h) => used[1].extend(h.title.chars()),
            BlockContent::Text(t) => {
                for line in &t.lines {
                    used[t.style.bold as usize].extend(line.chars());
                }
            }
            BlockContent::Rule { .. } => {}
        }
    }
    used
}

/// Write the RGB samples and the circular alpha mask of the photo.
fn embed_photo(pdf: &mut Pdf, photo: &Photo, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let size = photo.pixels as i32;

    let mask_ref = alloc();
    let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&photo.alpha, 6);
    {
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(size);
        mask.height(size);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
    }

    let xobj_ref = alloc();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&photo.rgb, 6);
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(size);
    xobj.height(size);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    xobj.s_mask(mask_ref);
    xobj_ref
}

/// Draw a planned layout into a finished PDF document, one page per page
/// index of the plan.
pub fn render(
    layout: &Layout,
    fonts: &Fonts,
    config: &LayoutConfig,
    photo: Option<&Photo>,
    title: &str,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: fonts, subset to the characters actually drawn
    let [regular_chars, bold_chars] = used_chars(layout);
    let regular = fonts
        .face(false)
        .embed(&mut pdf, "F1".to_string(), &mut alloc, &regular_chars);
    let bold = fonts
        .face(true)
        .embed(&mut pdf, "F2".to_string(), &mut alloc, &bold_chars);
    let t_fonts = t0.elapsed();

    // Phase 2: photo
    let photo_ref = photo.map(|p| embed_photo(&mut pdf, p, &mut alloc));
    let photo_name = photo_ref.map(|_| PHOTO_NAME);
    let t_photo = t0.elapsed();

    // Phase 3: one content stream per page
    let page_count = layout.plan.page_count.max(1);
    let mut contents: Vec<Vec<u8>> = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let mut painter = Painter::new(config, fonts, &regular, &bold);
        if config.show_guide {
            painter.guide();
        }
        for placement in layout.plan.on_page(page) {
            let block = layout.blocks.get(placement.block).ok_or_else(|| {
                Error::Render(format!(
                    "placement on page {page} references missing block {}",
                    placement.block
                ))
            })?;
            let y = placement.y;
            match &block.content {
                BlockContent::Header(h) => painter.header(y, h, photo_name),
                BlockContent::Heading(h) => painter.heading(y, h, HEADING_SIZE),
                BlockContent::Text(t) => painter.text(y, t, placement.lines.clone()),
                BlockContent::Rule { offset } => painter.rule(y + offset),
            }
        }
        contents.push(painter.finish());
    }
    let t_draw = t0.elapsed();

    // Phase 4: assembly
    let page_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();

    for (i, raw) in contents.iter().enumerate() {
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw, 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_count as i32);

    let font_pairs = [
        (regular.pdf_name.as_str(), regular.font_ref),
        (bold.pdf_name.as_str(), bold.font_ref),
    ];
    for i in 0..page_count {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in font_pairs {
                fonts.pair(Name(name.as_bytes()), font_ref);
            }
        }
        if let Some(photo_ref) = photo_ref {
            resources
                .x_objects()
                .pair(Name(PHOTO_NAME.as_bytes()), photo_ref);
        }
    }

    {
        let mut info = pdf.document_info(info_id);
        if !title.is_empty() {
            info.title(TextStr(title));
        }
        info.creator(TextStr(concat!("cvpress ", env!("CARGO_PKG_VERSION"))));
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Render phases: fonts={:.1}ms, photo={:.1}ms, draw={:.1}ms, assembly={:.1}ms ({page_count} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_photo - t_fonts).as_secs_f64() * 1000.0,
        (t_draw - t_photo).as_secs_f64() * 1000.0,
        (t_assembly - t_draw).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}
