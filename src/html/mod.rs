//! HTML emission: the document walker and the default page shell.

pub mod image;
mod list;
pub mod runs;
pub mod table;

use std::collections::HashMap;

use crate::error::ConversionError;
use crate::model::{Block, Document, MediaPart, Paragraph, TableCell};
use crate::options::ConvertOptions;
use crate::units::pt_to_px;

use list::ListStack;

const DEFAULT_STYLESHEET: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
h1, h2, h3, h4, h5, h6 { color: #2e6c80; }
table, th, td { padding: 20px; text-align: left; }
img { max-width: 100%; height: auto; }
ul, ol { margin: 0; padding-left: 40px; }
td { vertical-align: top; }
p { margin: 0 0 1em 0; }";

/// An ordered list of CSS declarations, joined into a `style` value once
/// at emission time.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Css(Vec<(&'static str, String)>);

impl Css {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: &'static str, value: impl Into<String>) {
        self.0.push((property, value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ` style="..."`, or nothing when there are no declarations.
    pub fn attr(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let joined = self
            .0
            .iter()
            .map(|(prop, value)| format!("{prop}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            " style=\"{}\"",
            html_escape::encode_double_quoted_attribute(&joined)
        )
    }
}

pub fn hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Per-conversion mutable state. Lives for one `render_document` call.
pub struct RenderContext<'d> {
    pub options: &'d ConvertOptions,
    media: &'d HashMap<String, MediaPart>,
    placeholder_count: usize,
}

impl<'d> RenderContext<'d> {
    pub fn new(options: &'d ConvertOptions, media: &'d HashMap<String, MediaPart>) -> Self {
        Self {
            options,
            media,
            placeholder_count: 0,
        }
    }

    pub(crate) fn next_placeholder(&mut self) -> usize {
        self.placeholder_count += 1;
        self.placeholder_count
    }
}

pub fn render_document(doc: &Document, options: &ConvertOptions) -> String {
    let mut ctx = RenderContext::new(options, &doc.media);
    let body = render_blocks(&doc.blocks, &mut ctx);

    let body_style = doc
        .margins
        .map(|m| {
            let mut css = Css::new();
            css.push(
                "margin",
                format!(
                    "{}px {}px {}px {}px",
                    pt_to_px(m.top as f64),
                    pt_to_px(m.right as f64),
                    pt_to_px(m.bottom as f64),
                    pt_to_px(m.left as f64)
                ),
            );
            css.attr()
        })
        .unwrap_or_default();

    format!(
        "<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>\n{DEFAULT_STYLESHEET}\n</style>\n</head>\n<body{body_style}>\n{body}</body>\n</html>\n"
    )
}

/// Walk sibling blocks in order. List paragraphs accumulate into the open
/// list context; any other block closes it first. A block that fails to
/// render is skipped and the walk continues with its next sibling.
pub fn render_blocks(blocks: &[Block], ctx: &mut RenderContext) -> String {
    let mut out = String::new();
    let mut lists = ListStack::default();

    for block in blocks {
        if let Block::Paragraph(para) = block
            && let Some(info) = &para.list
        {
            let content = runs::render_runs(&para.runs, ctx);
            lists.push_item(info, &content, &mut out);
            continue;
        }
        lists.close_all(&mut out);

        match render_block(block, ctx) {
            Ok(html) => {
                out.push_str(&html);
                if !html.is_empty() {
                    out.push('\n');
                }
            }
            Err(e @ ConversionError::UnsupportedImage { .. }) => log::debug!("Skipping block: {e}"),
            Err(e) => log::warn!("Skipping block: {e}"),
        }
    }
    lists.close_all(&mut out);
    out
}

fn render_block(block: &Block, ctx: &mut RenderContext) -> Result<String, ConversionError> {
    match block {
        Block::Paragraph(para) => Ok(render_paragraph(para, ctx)),
        Block::Table(table) => Ok(table::render_table(table, &mut |cell: &TableCell| {
            render_blocks(&cell.content, ctx)
        })),
        Block::Drawing(drawing) => {
            if !ctx.options.embed_images {
                return Ok(String::new());
            }
            image::render_drawing(drawing, ctx.media)
        }
    }
}

fn render_paragraph(para: &Paragraph, ctx: &mut RenderContext) -> String {
    if let Some(level) = para.heading_level {
        let text = html_escape::encode_quoted_attribute(&para.plain_text()).replace('\n', "<br>");
        return format!("<h{level}>{text}</h{level}>");
    }
    let mut css = Css::new();
    css.push("text-align", para.alignment.css());
    let content = runs::render_runs(&para.runs, ctx);
    let content = if content.is_empty() {
        "<br>".to_string()
    } else {
        content
    };
    format!("<p{}>{content}</p>", css.attr())
}
