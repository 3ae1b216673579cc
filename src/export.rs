//! Runs measurement, planning and rendering for one document and names the
//! resulting file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::Fonts;
use crate::model::{Document, provided};
use crate::photo::{self, Photo};
use crate::warning::LayoutWarning;

const FALLBACK_FILE_NAME: &str = "CV_Resume.pdf";

/// Shared flag for abandoning an export before its photo is fetched.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub config: LayoutConfig,
    pub cancel: CancelToken,
}

impl ExportOptions {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }
}

/// A finished PDF held in memory.
#[derive(Clone, Debug)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<LayoutWarning>,
}

impl ExportedPdf {
    /// Write the PDF into `dir` under its sanitised name. The bytes go to a
    /// temporary file in the same directory first, so an interrupted save
    /// never leaves a truncated PDF behind.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, Error> {
        let target = dir.join(&self.file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| Error::Io(e.error))?;
        log::info!("Saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// `<Name>_Resume.pdf` with accents folded to their base letters, every
/// character outside `[A-Za-z0-9 ]` removed and spaces joined by `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let kept: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        format!("{stem}_Resume.pdf")
    }
}

/// Resolve the document photo. Failures degrade to no photo plus a warning;
/// only cancellation is an error.
pub fn resolve_photo(
    doc: &Document,
    config: &LayoutConfig,
    cancel: &CancelToken,
) -> Result<(Option<Photo>, Option<LayoutWarning>), Error> {
    cancel.check()?;
    let Some(source) = provided(doc.photo.as_deref()) else {
        return Ok((None, None));
    };
    let timeout = Duration::from_secs(config.photo_timeout_secs);
    match photo::load(source, config.photo_size, timeout) {
        Ok(photo) => Ok((Some(photo), None)),
        Err(e) => Ok((
            None,
            Some(LayoutWarning::PhotoUnavailable {
                reason: e.to_string(),
            }),
        )),
    }
}

/// Export with fonts the caller already loaded.
pub fn export_pdf_with_fonts(
    doc: &Document,
    fonts: &Fonts,
    options: &ExportOptions,
) -> Result<ExportedPdf, Error> {
    let t0 = std::time::Instant::now();
    let config = &options.config;

    let (photo, photo_warning) = resolve_photo(doc, config, &options.cancel)?;
    if let Some(w) = &photo_warning {
        w.log();
    }
    let t_photo = t0.elapsed();

    let layout = crate::layout(doc, fonts, config, photo.as_ref());
    let t_layout = t0.elapsed();

    let title = provided(Some(doc.name.as_str())).unwrap_or_default();
    let bytes = crate::pdf::render(&layout, fonts, config, photo.as_ref(), title)?;
    let t_render = t0.elapsed();

    log::info!(
        "Export phases: photo={:.1}ms, layout={:.1}ms, render={:.1}ms",
        t_photo.as_secs_f64() * 1000.0,
        (t_layout - t_photo).as_secs_f64() * 1000.0,
        (t_render - t_layout).as_secs_f64() * 1000.0,
    );

    let mut warnings: Vec<LayoutWarning> = photo_warning.into_iter().collect();
    warnings.extend(layout.warnings.iter().cloned());
    Ok(ExportedPdf {
        file_name: sanitize_file_name(&doc.name),
        bytes,
        page_count: layout.page_count(),
        warnings,
    })
}

/// Export a document, loading fonts as the configuration asks.
pub fn export_pdf(doc: &Document, options: &ExportOptions) -> Result<ExportedPdf, Error> {
    let fonts = Fonts::load(&options.config)?;
    export_pdf_with_fonts(doc, &fonts, options)
}

/// Read a document from JSON and save its PDF into `out_dir`.
pub fn export_json_file(
    input: &Path,
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<(PathBuf, ExportedPdf), Error> {
    let doc = Document::from_json_file(input)?;
    let exported = export_pdf(&doc, options)?;
    let path = exported.save_into(out_dir)?;
    Ok((path, exported))
}
