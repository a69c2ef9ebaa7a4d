mod styles;
mod table;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{ConversionError, Error};
use crate::model::{
    Alignment, Block, Document, Drawing, Hyperlink, ListInfo, ListKind, MediaPart, PageMargins,
    Paragraph, Run, Style,
};
use crate::options::ConvertOptions;
use crate::units::emu_to_px;

use styles::{StylesInfo, parse_alignment, parse_styles, resolve_run_style};

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// `RRGGBB`. Anything else, including non-ASCII input, is `None`.
pub(super) fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    if val.len() != 6 || !val.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(val.get(range)?, 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Parse a WML boolean toggle element (e.g., w:b, w:i, w:strike).
/// Present with no val or a val other than "0"/"false"/"off" means true.
pub(super) fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false" && v != "off")
    })
}

pub(super) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(super) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

pub(super) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn twips_attr(node: roxmltree::Node, attr: &str) -> Option<f32> {
    node.attribute((WML_NS, attr))
        .and_then(|v| v.parse::<f32>().ok())
        .map(|twips| twips / 20.0)
}

/// Flatten SDT wrappers: descend into w:sdtContent and collect effective children.
pub(super) fn collect_block_nodes<'a>(
    parent: roxmltree::Node<'a, 'a>,
) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

struct Relationship {
    target: String,
    kind: String,
    external: bool,
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, Relationship> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        log::warn!("Relationship part is not well-formed; ignoring it");
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(
                id.to_string(),
                Relationship {
                    target: target.to_string(),
                    kind: node.attribute("Type").unwrap_or("").to_string(),
                    external: node.attribute("TargetMode") == Some("External"),
                },
            );
        }
    }
    rels
}

/// `[Content_Types].xml`: overrides by part name, defaults by extension.
#[derive(Default)]
struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn parse(xml_content: &str) -> Self {
        let mut types = ContentTypes::default();
        let Ok(xml) = roxmltree::Document::parse(xml_content) else {
            log::warn!("[Content_Types].xml is not well-formed; ignoring it");
            return types;
        };
        for node in xml.root_element().children() {
            let Some(content_type) = node.attribute("ContentType") else {
                continue;
            };
            match node.tag_name().name() {
                "Default" => {
                    if let Some(ext) = node.attribute("Extension") {
                        types
                            .defaults
                            .insert(ext.to_ascii_lowercase(), content_type.to_string());
                    }
                }
                "Override" => {
                    if let Some(part) = node.attribute("PartName") {
                        let part = part.trim_start_matches('/').to_string();
                        types.overrides.insert(part, content_type.to_string());
                    }
                }
                _ => {}
            }
        }
        types
    }

    fn lookup(&self, part_name: &str) -> Option<String> {
        if let Some(ct) = self.overrides.get(part_name) {
            return Some(ct.clone());
        }
        let ext = part_name.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults.get(&ext).cloned()
    }
}

/// Resolve a relationship target against the `word/` directory, folding `..`.
fn resolve_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

struct NumberingInfo {
    /// (abstractNumId, ilvl) → numFmt
    formats: HashMap<(String, u8), String>,
    num_to_abstract: HashMap<String, String>,
}

impl NumberingInfo {
    fn list_kind(&self, num_id: &str, level: u8) -> ListKind {
        let fmt = self
            .num_to_abstract
            .get(num_id)
            .and_then(|abs| self.formats.get(&(abs.clone(), level)));
        match fmt.map(String::as_str) {
            None | Some("bullet") | Some("none") => ListKind::Unordered,
            Some(_) => ListKind::Ordered,
        }
    }
}

fn parse_numbering(xml_content: Option<&str>) -> NumberingInfo {
    let mut formats = HashMap::new();
    let mut num_to_abstract = HashMap::new();

    let xml = xml_content.and_then(|s| roxmltree::Document::parse(s).ok());
    let Some(xml) = xml else {
        return NumberingInfo {
            formats,
            num_to_abstract,
        };
    };

    for node in xml.root_element().children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "abstractNum" => {
                let Some(abs_id) = node.attribute((WML_NS, "abstractNumId")) else {
                    continue;
                };
                for lvl in node.children().filter(|n| is_wml(*n, "lvl")) {
                    let Some(ilvl) = lvl
                        .attribute((WML_NS, "ilvl"))
                        .and_then(|v| v.parse::<u8>().ok())
                    else {
                        continue;
                    };
                    let num_fmt = wml_attr(lvl, "numFmt").unwrap_or("bullet").to_string();
                    formats.insert((abs_id.to_string(), ilvl), num_fmt);
                }
            }
            "num" => {
                let Some(num_id) = node.attribute((WML_NS, "numId")) else {
                    continue;
                };
                let Some(abs_id) = wml_attr(node, "abstractNumId") else {
                    continue;
                };
                num_to_abstract.insert(num_id.to_string(), abs_id.to_string());
            }
            _ => {}
        }
    }

    NumberingInfo {
        formats,
        num_to_abstract,
    }
}

/// Everything block extraction needs besides the XML node itself.
pub(super) struct ParseContext<'o> {
    styles: StylesInfo,
    numbering: NumberingInfo,
    rels: HashMap<String, Relationship>,
    pub(super) options: &'o ConvertOptions,
}

/// Extract the blocks under `parent` (the body or a table cell). `depth` is
/// the table nesting depth of `parent`: 0 for the body. A block that fails
/// to extract is logged and skipped without affecting its siblings.
pub(super) fn extract_blocks(
    parent: roxmltree::Node,
    ctx: &ParseContext,
    depth: usize,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    for node in collect_block_nodes(parent) {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "p" => blocks.extend(extract_paragraph(node, ctx)),
            "tbl" => match table::extract_table(node, ctx, depth + 1) {
                Ok(t) => blocks.push(Block::Table(t)),
                Err(e) => log::warn!("Skipping table: {e}"),
            },
            "drawing" => blocks.extend(parse_drawing(node).map(Block::Drawing)),
            _ => {}
        }
    }
    blocks
}

/// Collect `w:r` nodes of a paragraph in document order, paired with the
/// hyperlink that encloses them. Each `w:hyperlink` element gets the next
/// ordinal from `links`.
fn collect_run_nodes<'a>(
    parent: roxmltree::Node<'a, 'a>,
    rels: &HashMap<String, Relationship>,
    hyperlink: Option<&Hyperlink>,
    links: &mut usize,
    out: &mut Vec<(roxmltree::Node<'a, 'a>, Option<Hyperlink>)>,
) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => out.push((child, hyperlink.cloned())),
            "hyperlink" => {
                let link = child
                    .attribute((REL_NS, "id"))
                    .and_then(|rid| rels.get(rid))
                    .map(|rel| rel.target.clone())
                    .or_else(|| {
                        child
                            .attribute((WML_NS, "anchor"))
                            .map(|anchor| format!("#{anchor}"))
                    })
                    .map(|target| {
                        *links += 1;
                        Hyperlink {
                            target,
                            ordinal: *links,
                        }
                    });
                collect_run_nodes(child, rels, link.as_ref().or(hyperlink), links, out);
            }
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_run_nodes(content, rels, hyperlink, links, out);
                }
            }
            "ins" | "smartTag" | "fldSimple" | "customXml" => {
                collect_run_nodes(child, rels, hyperlink, links, out);
            }
            _ => {}
        }
    }
}

fn extract_paragraph(para_node: roxmltree::Node, ctx: &ParseContext) -> Vec<Block> {
    let ppr = wml(para_node, "pPr");
    let para_style = ppr
        .and_then(|ppr| wml_attr(ppr, "pStyle"))
        .and_then(|id| ctx.styles.paragraph_styles.get(id));

    let alignment = ppr
        .and_then(|ppr| wml_attr(ppr, "jc"))
        .map(parse_alignment)
        .or_else(|| para_style.and_then(|s| s.alignment))
        .unwrap_or(Alignment::Left);

    let list = ppr
        .and_then(|ppr| wml(ppr, "numPr"))
        .and_then(|num_pr| {
            let num_id = wml_attr(num_pr, "numId")?;
            if num_id == "0" {
                return None;
            }
            let level = wml_attr(num_pr, "ilvl")
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(0);
            Some(ListInfo {
                num_id: num_id.to_string(),
                level,
                kind: ctx.numbering.list_kind(num_id, level),
            })
        });

    let mut run_nodes = Vec::new();
    collect_run_nodes(para_node, &ctx.rels, None, &mut 0, &mut run_nodes);

    let mut runs: Vec<Run> = Vec::new();
    let mut drawings: Vec<Drawing> = Vec::new();

    for (run_node, hyperlink) in run_nodes {
        let style = resolve_run_style(wml(run_node, "rPr"), &ctx.styles).unwrap_or_else(|e| {
            log::warn!("{}", ConversionError::from(e));
            Style::default()
        });

        let mut text = String::new();
        for child in run_node.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                "t" => text.push_str(child.text().unwrap_or("")),
                "tab" => text.push('\t'),
                "cr" => text.push('\n'),
                "br" => match child.attribute((WML_NS, "type")) {
                    Some("page") | Some("column") => {}
                    _ => text.push('\n'),
                },
                "noBreakHyphen" => text.push('-'),
                "drawing" => drawings.extend(parse_drawing(child)),
                _ => {}
            }
        }

        if !text.is_empty() {
            runs.push(Run {
                text,
                style,
                hyperlink,
            });
        }
    }

    let mut blocks = Vec::new();
    // An image-only paragraph is just its drawings.
    if runs.is_empty() && !drawings.is_empty() {
        blocks.extend(drawings.into_iter().map(Block::Drawing));
        return blocks;
    }

    blocks.push(Block::Paragraph(Paragraph {
        runs,
        alignment,
        list,
        heading_level: para_style.and_then(|s| s.heading_level),
    }));
    if !drawings.is_empty() {
        log::debug!(
            "Paragraph mixes text and {} image(s); images follow the paragraph",
            drawings.len()
        );
        blocks.extend(drawings.into_iter().map(Block::Drawing));
    }
    blocks
}

fn parse_drawing(drawing_node: roxmltree::Node) -> Option<Drawing> {
    let container = drawing_node.children().find(|n| {
        let name = n.tag_name().name();
        (name == "inline" || name == "anchor") && n.tag_name().namespace() == Some(WPD_NS)
    })?;

    let rel_id = container
        .descendants()
        .find(|n| n.tag_name().name() == "blip" && n.tag_name().namespace() == Some(DML_NS))
        .and_then(|n| n.attribute((REL_NS, "embed")))?;

    let extent = container
        .children()
        .find(|n| n.tag_name().name() == "extent" && n.tag_name().namespace() == Some(WPD_NS));
    let emu = |attr: &str| {
        extent
            .and_then(|n| n.attribute(attr))
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| emu_to_px(v) as u32)
    };

    Some(Drawing {
        rel_id: rel_id.to_string(),
        width_px: emu("cx"),
        height_px: emu("cy"),
    })
}

/// Page margins of the first section: the first paragraph-level `w:sectPr`
/// in document order, else the body-level one.
fn parse_page_margins(body: roxmltree::Node) -> Option<PageMargins> {
    let sect = body.descendants().find(|n| is_wml(*n, "sectPr"))?;
    let pg_mar = wml(sect, "pgMar")?;
    Some(PageMargins {
        top: twips_attr(pg_mar, "top").unwrap_or(72.0),
        right: twips_attr(pg_mar, "right").unwrap_or(72.0),
        bottom: twips_attr(pg_mar, "bottom").unwrap_or(72.0),
        left: twips_attr(pg_mar, "left").unwrap_or(72.0),
    })
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn read_zip_bytes<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    zip.by_name(name).ok()?.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Load every internal image part the document relationships point at.
fn load_media<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    rels: &HashMap<String, Relationship>,
    content_types: &ContentTypes,
) -> HashMap<String, MediaPart> {
    let mut media = HashMap::new();
    for (id, rel) in rels {
        if rel.external || !rel.kind.ends_with("/image") {
            continue;
        }
        let part_name = resolve_part_path(&rel.target);
        let Some(data) = read_zip_bytes(zip, &part_name) else {
            log::warn!("Image relationship {id} points at missing part {part_name}");
            continue;
        };
        log::debug!("Loaded image part {part_name} ({} bytes)", data.len());
        media.insert(
            id.clone(),
            MediaPart {
                content_type: content_types.lookup(&part_name),
                part_name,
                data,
            },
        );
    }
    media
}

pub fn parse(path: &Path, options: &ConvertOptions) -> Result<Document, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_archive(file, options)
}

pub fn parse_bytes(input: &[u8], options: &ConvertOptions) -> Result<Document, Error> {
    parse_archive(Cursor::new(input), options)
}

fn parse_archive<R: Read + Seek>(reader: R, options: &ConvertOptions) -> Result<Document, Error> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

    let styles = read_zip_text(&mut zip, "word/styles.xml")
        .map(|xml| parse_styles(&xml))
        .unwrap_or_default();
    let numbering = parse_numbering(read_zip_text(&mut zip, "word/numbering.xml").as_deref());
    let rels = read_zip_text(&mut zip, "word/_rels/document.xml.rels")
        .map(|xml| parse_rels_xml(&xml))
        .unwrap_or_default();
    let content_types = read_zip_text(&mut zip, "[Content_Types].xml")
        .map(|xml| ContentTypes::parse(&xml))
        .unwrap_or_default();
    let media = load_media(&mut zip, &rels, &content_types);

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let ctx = ParseContext {
        styles,
        numbering,
        rels,
        options,
    };
    let blocks = extract_blocks(body, &ctx, 0);

    Ok(Document {
        blocks,
        margins: parse_page_margins(body),
        media,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_paths() {
        assert_eq!(resolve_part_path("media/image1.png"), "word/media/image1.png");
        assert_eq!(resolve_part_path("/word/media/a.png"), "word/media/a.png");
        assert_eq!(resolve_part_path("../customXml/item.xml"), "customXml/item.xml");
    }

    #[test]
    fn content_type_lookup() {
        let types = ContentTypes::parse(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="png" ContentType="image/png"/>
                <Override PartName="/word/media/x.bin" ContentType="image/jpeg"/>
            </Types>"#,
        );
        assert_eq!(types.lookup("word/media/a.PNG").as_deref(), Some("image/png"));
        assert_eq!(types.lookup("word/media/x.bin").as_deref(), Some("image/jpeg"));
        assert_eq!(types.lookup("word/media/a.emf"), None);
    }

    #[test]
    fn numbering_kinds() {
        let xml = format!(
            r#"<w:numbering xmlns:w="{WML_NS}">
                <w:abstractNum w:abstractNumId="1">
                    <w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl>
                    <w:lvl w:ilvl="1"><w:numFmt w:val="bullet"/></w:lvl>
                </w:abstractNum>
                <w:num w:numId="3"><w:abstractNumId w:val="1"/></w:num>
            </w:numbering>"#
        );
        let numbering = parse_numbering(Some(&xml));
        assert_eq!(numbering.list_kind("3", 0), ListKind::Ordered);
        assert_eq!(numbering.list_kind("3", 1), ListKind::Unordered);
        assert_eq!(numbering.list_kind("9", 0), ListKind::Unordered);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("FF8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_color("ff8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_color("auto"), None);
        assert_eq!(parse_hex_color("GG0000"), None);
        // Six bytes, five chars.
        assert_eq!(parse_hex_color("aébcd"), None);
        assert_eq!(parse_hex_color("ééé"), None);
    }
}
