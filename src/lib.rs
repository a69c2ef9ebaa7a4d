mod docx;
mod error;
pub mod html;
pub mod model;
mod options;
pub mod units;

pub use error::{ConversionError, Error, StyleError};
pub use options::ConvertOptions;

use std::path::Path;
use std::time::Instant;

use model::Document;

fn log_timing(t_parse: std::time::Duration, t_total: std::time::Duration, html: &str) {
    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        html.len(),
    );
}

pub fn convert_docx_to_html(input: &Path) -> Result<String, Error> {
    convert_docx_to_html_with_options(input, &ConvertOptions::default())
}

pub fn convert_docx_to_html_with_options(
    input: &Path,
    options: &ConvertOptions,
) -> Result<String, Error> {
    let t0 = Instant::now();

    let doc = docx::parse(input, options)?;
    let t_parse = t0.elapsed();

    let html = html::render_document(&doc, options);
    log_timing(t_parse, t0.elapsed(), &html);

    Ok(html)
}

pub fn convert_docx_bytes_to_html(input: &[u8]) -> Result<String, Error> {
    convert_docx_bytes_to_html_with_options(input, &ConvertOptions::default())
}

pub fn convert_docx_bytes_to_html_with_options(
    input: &[u8],
    options: &ConvertOptions,
) -> Result<String, Error> {
    let t0 = Instant::now();

    let doc = docx::parse_bytes(input, options)?;
    let t_parse = t0.elapsed();

    let html = html::render_document(&doc, options);
    log_timing(t_parse, t0.elapsed(), &html);

    Ok(html)
}

/// Parse a package into the block model without rendering it.
pub fn parse_docx_bytes(input: &[u8], options: &ConvertOptions) -> Result<Document, Error> {
    docx::parse_bytes(input, options)
}

/// Render an already-parsed document. Per-block failures are logged and
/// skipped, so this never fails.
pub fn convert_document(doc: &Document, options: &ConvertOptions) -> String {
    html::render_document(doc, options)
}
