use std::collections::HashMap;

use crate::error::StyleError;
use crate::model::{Alignment, Style, VertAlign};

use super::{WML_NS, parse_hex_color, wml, wml_attr, wml_bool};

/// Run properties as declared, before defaults are applied. `None` means
/// "not set here, inherit".
#[derive(Clone, Debug, Default)]
pub(super) struct RunProps {
    font_size: Option<u32>,
    bold: Option<bool>,
    italic: Option<bool>,
    underline: Option<bool>,
    strike: Option<bool>,
    caps: Option<bool>,
    small_caps: Option<bool>,
    vertical_align: Option<VertAlign>,
    highlight: Option<Option<[u8; 3]>>,
    color: Option<Option<[u8; 3]>>,
}

impl RunProps {
    fn or(self, fallback: &RunProps) -> RunProps {
        RunProps {
            font_size: self.font_size.or(fallback.font_size),
            bold: self.bold.or(fallback.bold),
            italic: self.italic.or(fallback.italic),
            underline: self.underline.or(fallback.underline),
            strike: self.strike.or(fallback.strike),
            caps: self.caps.or(fallback.caps),
            small_caps: self.small_caps.or(fallback.small_caps),
            vertical_align: self.vertical_align.or(fallback.vertical_align),
            highlight: self.highlight.or(fallback.highlight),
            color: self.color.or(fallback.color),
        }
    }

    fn into_style(self) -> Style {
        Style {
            font_size: self.font_size,
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            underline: self.underline.unwrap_or(false),
            strike: self.strike.unwrap_or(false),
            caps: self.caps.unwrap_or(false),
            small_caps: self.small_caps.unwrap_or(false),
            vertical_align: self.vertical_align.unwrap_or_default(),
            highlight: self.highlight.flatten(),
            color: self.color.flatten(),
        }
    }
}

pub(super) struct ParagraphStyle {
    pub(super) alignment: Option<Alignment>,
    pub(super) heading_level: Option<u8>,
    pub(super) based_on: Option<String>,
}

#[derive(Default)]
pub(super) struct StylesInfo {
    pub(super) paragraph_styles: HashMap<String, ParagraphStyle>,
    pub(super) character_styles: HashMap<String, RunProps>,
}

pub(super) fn parse_alignment(val: &str) -> Alignment {
    match val {
        "center" => Alignment::Center,
        "right" | "end" => Alignment::Right,
        "both" | "distribute" => Alignment::Justify,
        _ => Alignment::Left,
    }
}

fn highlight_color(name: &str) -> Option<[u8; 3]> {
    match name {
        "yellow" => Some([255, 255, 0]),
        "green" => Some([0, 255, 0]),
        "cyan" => Some([0, 255, 255]),
        "magenta" => Some([255, 0, 255]),
        "red" => Some([255, 0, 0]),
        "blue" => Some([0, 0, 255]),
        "darkYellow" => Some([128, 128, 0]),
        "darkGreen" => Some([0, 128, 0]),
        "darkCyan" => Some([0, 128, 128]),
        "darkMagenta" => Some([128, 0, 128]),
        "darkRed" => Some([128, 0, 0]),
        "darkBlue" => Some([0, 0, 128]),
        "lightGray" => Some([192, 192, 192]),
        "darkGray" => Some([128, 128, 128]),
        "black" => Some([0, 0, 0]),
        "white" => Some([255, 255, 255]),
        _ => None,
    }
}

/// "heading 2" (style name) or "Heading2" (style id) → 2.
fn heading_level(label: &str) -> Option<u8> {
    let lower = label.to_ascii_lowercase();
    let rest = lower.strip_prefix("heading")?.trim_start();
    let level = rest.parse::<u8>().ok()?;
    (1..=9).contains(&level).then_some(level)
}

/// Read the `w:rPr` of a run or style. Malformed numeric or color values
/// fail the whole snapshot rather than producing a half-resolved style.
pub(super) fn parse_run_props(rpr: roxmltree::Node) -> Result<RunProps, StyleError> {
    let font_size = match wml_attr(rpr, "sz") {
        Some(v) => Some(
            v.trim()
                .parse::<u32>()
                .map_err(|_| StyleError::FontSize(v.to_string()))?,
        ),
        None => None,
    };

    let color = match wml_attr(rpr, "color") {
        Some("auto") => Some(None),
        Some(v) => Some(Some(
            parse_hex_color(v).ok_or_else(|| StyleError::Color(v.to_string()))?,
        )),
        None => None,
    };

    let underline = wml(rpr, "u").map(|u| {
        u.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "none" && v != "0")
    });

    let vertical_align = wml_attr(rpr, "vertAlign").map(|v| match v {
        "superscript" => VertAlign::Superscript,
        "subscript" => VertAlign::Subscript,
        _ => VertAlign::Baseline,
    });

    let highlight = wml_attr(rpr, "highlight").map(highlight_color);

    Ok(RunProps {
        font_size,
        bold: wml_bool(rpr, "b"),
        italic: wml_bool(rpr, "i"),
        underline,
        strike: wml_bool(rpr, "strike").or_else(|| wml_bool(rpr, "dstrike")),
        caps: wml_bool(rpr, "caps"),
        small_caps: wml_bool(rpr, "smallCaps"),
        vertical_align,
        highlight,
        color,
    })
}

/// Direct run formatting, falling back to the run's character style.
pub(super) fn resolve_run_style(
    rpr: Option<roxmltree::Node>,
    styles: &StylesInfo,
) -> Result<Style, StyleError> {
    let Some(rpr) = rpr else {
        return Ok(Style::default());
    };
    let direct = parse_run_props(rpr)?;
    let resolved = match wml_attr(rpr, "rStyle").and_then(|id| styles.character_styles.get(id)) {
        Some(char_style) => direct.or(char_style),
        None => direct,
    };
    Ok(resolved.into_style())
}

pub(super) fn parse_styles(xml_content: &str) -> StylesInfo {
    let mut paragraph_styles = HashMap::new();
    let mut character_styles = HashMap::new();

    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        log::warn!("word/styles.xml is not well-formed; ignoring styles");
        return StylesInfo::default();
    };

    for style_node in xml.root_element().children() {
        if style_node.tag_name().name() != "style"
            || style_node.tag_name().namespace() != Some(WML_NS)
        {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };

        match style_node.attribute((WML_NS, "type")) {
            Some("paragraph") => {
                let heading = wml_attr(style_node, "name")
                    .and_then(heading_level)
                    .or_else(|| heading_level(style_id));
                let alignment = wml(style_node, "pPr")
                    .and_then(|ppr| wml_attr(ppr, "jc"))
                    .map(parse_alignment);
                let based_on = wml_attr(style_node, "basedOn").map(|s| s.to_string());

                paragraph_styles.insert(
                    style_id.to_string(),
                    ParagraphStyle {
                        alignment,
                        heading_level: heading,
                        based_on,
                    },
                );
            }
            Some("character") => {
                let Some(rpr) = wml(style_node, "rPr") else {
                    continue;
                };
                match parse_run_props(rpr) {
                    Ok(props) => {
                        character_styles.insert(style_id.to_string(), props);
                    }
                    Err(e) => log::warn!("Character style {style_id}: {e}; ignoring"),
                }
            }
            _ => {}
        }
    }

    resolve_based_on(&mut paragraph_styles);

    StylesInfo {
        paragraph_styles,
        character_styles,
    }
}

/// Inherit alignment along the `basedOn` chain; the closest ancestor wins.
fn resolve_based_on(styles: &mut HashMap<String, ParagraphStyle>) {
    let ids: Vec<String> = styles.keys().cloned().collect();
    for id in ids {
        let mut chain: Vec<String> = Vec::new();
        let mut current = id.clone();
        loop {
            if chain.contains(&current) {
                break;
            }
            chain.push(current.clone());
            match styles.get(&current).and_then(|s| s.based_on.clone()) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let inherited = chain
            .iter()
            .skip(1)
            .find_map(|ancestor| styles.get(ancestor).and_then(|s| s.alignment));

        if let Some(s) = styles.get_mut(&id) {
            s.alignment = s.alignment.or(inherited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpr(inner: &str) -> String {
        format!(r#"<w:rPr xmlns:w="{WML_NS}">{inner}</w:rPr>"#)
    }

    fn resolve(inner: &str) -> Result<Style, StyleError> {
        let xml = rpr(inner);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        resolve_run_style(Some(doc.root_element()), &StylesInfo::default())
    }

    #[test]
    fn absent_properties_are_plain() {
        assert_eq!(resolve("").unwrap(), Style::default());
        assert!(resolve("").unwrap().is_plain());
    }

    #[test]
    fn toggles_and_sizes() {
        let style = resolve(
            r#"<w:b/><w:i w:val="0"/><w:u w:val="single"/><w:sz w:val="28"/><w:color w:val="FF0000"/><w:vertAlign w:val="superscript"/>"#,
        )
        .unwrap();
        assert!(style.bold);
        assert!(!style.italic);
        assert!(style.underline);
        assert_eq!(style.font_size, Some(28));
        assert_eq!(style.color, Some([255, 0, 0]));
        assert_eq!(style.vertical_align, VertAlign::Superscript);
    }

    #[test]
    fn auto_color_is_no_color() {
        assert_eq!(resolve(r#"<w:color w:val="auto"/>"#).unwrap().color, None);
    }

    #[test]
    fn malformed_values_fail() {
        assert!(matches!(
            resolve(r#"<w:sz w:val="big"/>"#),
            Err(StyleError::FontSize(_))
        ));
        assert!(matches!(
            resolve(r#"<w:color w:val="notacolor"/>"#),
            Err(StyleError::Color(_))
        ));
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level("heading 1"), Some(1));
        assert_eq!(heading_level("Heading9"), Some(9));
        assert_eq!(heading_level("Heading 10"), None);
        assert_eq!(heading_level("Normal"), None);
    }
}
