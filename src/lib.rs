pub mod config;
mod error;
pub mod export;
pub mod fonts;
pub mod import;
pub mod measure;
pub mod model;
pub mod pdf;
pub mod photo;
pub mod plan;
mod warning;

pub use config::{Language, LayoutConfig, OrphanRules};
pub use error::Error;
pub use export::{
    CancelToken, ExportOptions, ExportedPdf, export_json_file, export_pdf, export_pdf_with_fonts,
    sanitize_file_name,
};
pub use fonts::Fonts;
pub use model::Document;
pub use photo::Photo;
pub use plan::PagePlan;
pub use warning::LayoutWarning;

use std::time::Instant;

use serde::Serialize;

use measure::RenderBlock;
use plan::PageGeometry;

/// Measured blocks and the pages they were assigned to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    pub blocks: Vec<RenderBlock>,
    pub plan: PagePlan,
    pub warnings: Vec<LayoutWarning>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.plan.page_count
    }

    /// Text lines drawn on `page`, top to bottom.
    pub fn page_text(&self, page: usize) -> Vec<&str> {
        self.plan
            .on_page(page)
            .flat_map(|p| {
                let block = &self.blocks[p.block];
                match block.text() {
                    Some(t) => t.lines[p.lines.clone()].iter().map(String::as_str).collect(),
                    None => block.visible_text(),
                }
            })
            .collect()
    }
}

/// Measure and paginate a document without drawing it. `photo` only decides
/// whether the header reserves room for a picture.
pub fn layout(doc: &Document, fonts: &Fonts, config: &LayoutConfig, photo: Option<&Photo>) -> Layout {
    let t0 = Instant::now();

    let (blocks, mut warnings) = measure::build_blocks(doc, fonts, config, photo.is_some());
    let t_measure = t0.elapsed();

    let (plan, plan_warnings) = plan::plan(&blocks, &PageGeometry::from_config(config));
    warnings.extend(plan_warnings);
    let t_plan = t0.elapsed();

    for warning in &warnings {
        warning.log();
    }
    log::info!(
        "Layout phases: measure={:.1}ms, plan={:.1}ms ({} blocks, {} pages)",
        t_measure.as_secs_f64() * 1000.0,
        (t_plan - t_measure).as_secs_f64() * 1000.0,
        blocks.len(),
        plan.page_count,
    );

    Layout {
        blocks,
        plan,
        warnings,
    }
}
