use crate::error::ConversionError;
use crate::model::{
    BorderSide, BorderStyle, Borders, CellVAlign, Table, TableAlignment, TableCell, TableRow,
    VMerge, WidthSpec,
};
use crate::units::{eighth_points_to_px, twips_to_px};

use super::{
    ParseContext, WML_NS, collect_block_nodes, extract_blocks, is_wml, parse_hex_color, wml,
    wml_attr, wml_bool,
};

/// Size used when a visible border omits `w:sz` (half a point).
const DEFAULT_BORDER_SZ: u32 = 4;

/// `tblLook` attribute flags, as packed into the legacy hex `w:val`.
const LOOK_FLAGS: &[(&str, u16)] = &[
    ("firstRow", 0x0020),
    ("lastRow", 0x0040),
    ("firstColumn", 0x0080),
    ("lastColumn", 0x0100),
    ("noHBand", 0x0200),
    ("noVBand", 0x0400),
];

fn is_on(val: &str) -> bool {
    val == "1" || val == "true" || val == "on"
}

/// Read a `tblW`/`tcW` measurement. `dxa` becomes pixels, `pct` becomes
/// 0..=100 (fiftieths of a percent unless written as `N%`), `auto`/`nil`
/// carry no explicit width.
pub(crate) fn parse_width(node: roxmltree::Node) -> WidthSpec {
    let kind = node.attribute((WML_NS, "type")).unwrap_or("dxa");
    let value = node.attribute((WML_NS, "w")).map(str::trim);
    match kind {
        "dxa" => match value.and_then(|v| v.parse::<f64>().ok()) {
            Some(twips) if twips > 0.0 => WidthSpec::Fixed(twips_to_px(twips as i64) as u32),
            Some(_) => WidthSpec::Auto,
            None => {
                if let Some(v) = value {
                    log::warn!("Unreadable width {v:?}; using auto");
                }
                WidthSpec::Auto
            }
        },
        "pct" => {
            let pct = value.and_then(|v| match v.strip_suffix('%') {
                Some(explicit) => explicit.trim().parse::<f32>().ok(),
                None => v.parse::<f32>().ok().map(|fiftieths| fiftieths / 50.0),
            });
            match pct {
                Some(p) if p > 0.0 => WidthSpec::Percent(p.min(100.0)),
                _ => WidthSpec::Percent(100.0),
            }
        }
        _ => WidthSpec::Auto,
    }
}

pub(crate) fn parse_border(node: roxmltree::Node) -> Option<BorderSide> {
    let val = node.attribute((WML_NS, "val")).unwrap_or("none");
    if matches!(val, "nil" | "none" | "hidden") {
        return None;
    }
    let sz = match node.attribute((WML_NS, "sz")) {
        Some(v) => v.trim().parse::<u32>().ok()?,
        None => DEFAULT_BORDER_SZ,
    };
    if sz == 0 {
        return None;
    }
    let style = match val {
        "double" => BorderStyle::Double,
        "dotted" => BorderStyle::Dotted,
        "dashed" => BorderStyle::Dashed,
        "dotDash" | "dotDotDash" => BorderStyle::DashDot,
        _ => BorderStyle::Solid,
    };
    let color = node
        .attribute((WML_NS, "color"))
        .and_then(parse_hex_color)
        .unwrap_or([0, 0, 0]);
    Some(BorderSide {
        style,
        width_px: eighth_points_to_px(sz),
        color,
    })
}

/// `tblBorders` / `tcBorders`. Each side resolves independently; `start`
/// and `end` stand in for `left` and `right`.
pub(crate) fn parse_borders(container: roxmltree::Node) -> Borders {
    let side = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| wml(container, name))
            .and_then(parse_border)
    };
    Borders {
        top: side(&["top"]),
        left: side(&["left", "start"]),
        bottom: side(&["bottom"]),
        right: side(&["right", "end"]),
    }
}

fn parse_look(look: roxmltree::Node) -> String {
    if let Some(val) = look.attribute((WML_NS, "val")) {
        return val.to_ascii_uppercase();
    }
    let code = LOOK_FLAGS
        .iter()
        .filter(|(attr, _)| look.attribute((WML_NS, *attr)).is_some_and(is_on))
        .fold(0u16, |acc, (_, flag)| acc | flag);
    format!("{code:04X}")
}

fn parse_shading(pr: roxmltree::Node) -> Option<[u8; 3]> {
    wml(pr, "shd")
        .and_then(|shd| shd.attribute((WML_NS, "fill")))
        .and_then(parse_hex_color)
}

pub(super) fn extract_table(
    node: roxmltree::Node,
    ctx: &ParseContext,
    depth: usize,
) -> Result<Table, ConversionError> {
    let limit = ctx.options.max_nesting_depth;
    if depth > limit {
        return Err(ConversionError::NestingTooDeep { depth, limit });
    }

    let col_widths: Vec<u32> = wml(node, "tblGrid")
        .into_iter()
        .flat_map(|grid| grid.children())
        .filter(|n| is_wml(*n, "gridCol"))
        .filter_map(|n| n.attribute((WML_NS, "w")))
        .filter_map(|v| v.parse::<f64>().ok())
        .map(|w| w.max(0.0) as u32)
        .collect();

    let mut table = Table {
        col_widths,
        ..Table::default()
    };

    if let Some(tbl_pr) = wml(node, "tblPr") {
        table.alignment = match wml_attr(tbl_pr, "jc") {
            Some("center") => TableAlignment::Center,
            Some("right") | Some("end") => TableAlignment::Right,
            _ => TableAlignment::Left,
        };
        table.width = wml(tbl_pr, "tblW").map(parse_width).unwrap_or(WidthSpec::Auto);
        table.autofit = wml(tbl_pr, "tblLayout")
            .and_then(|n| n.attribute((WML_NS, "type")))
            .is_none_or(|t| t != "fixed");
        table.borders = wml(tbl_pr, "tblBorders")
            .map(parse_borders)
            .unwrap_or_default();
        table.look = wml(tbl_pr, "tblLook").map(parse_look);
        table.shading = parse_shading(tbl_pr);
    } else {
        log::debug!("Table without tblPr; using defaults");
    }

    for tr in collect_block_nodes(node)
        .into_iter()
        .filter(|n| is_wml(*n, "tr"))
    {
        table.rows.push(extract_row(tr, ctx, depth));
    }

    log::debug!(
        "Extracted table depth={} rows={} cols={}",
        depth,
        table.rows.len(),
        table.col_widths.len()
    );
    Ok(table)
}

fn extract_row(tr: roxmltree::Node, ctx: &ParseContext, depth: usize) -> TableRow {
    let tr_pr = wml(tr, "trPr");
    let is_header = tr_pr
        .and_then(|pr| wml_bool(pr, "tblHeader"))
        .unwrap_or(false);
    let height = tr_pr
        .and_then(|pr| wml(pr, "trHeight"))
        .and_then(|h| h.attribute((WML_NS, "val")))
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|twips| twips_to_px(twips) as u32);

    let cells = collect_block_nodes(tr)
        .into_iter()
        .filter(|n| is_wml(*n, "tc"))
        .map(|tc| extract_cell(tc, ctx, depth))
        .collect();

    TableRow {
        cells,
        is_header,
        height,
    }
}

fn extract_cell(tc: roxmltree::Node, ctx: &ParseContext, depth: usize) -> TableCell {
    let content = extract_blocks(tc, ctx, depth);
    let Some(tc_pr) = wml(tc, "tcPr") else {
        return TableCell {
            content,
            ..TableCell::default()
        };
    };

    let grid_span = wml_attr(tc_pr, "gridSpan")
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(1)
        .max(1);

    // A bare <w:vMerge/> continues the merge above it.
    let v_merge = wml(tc_pr, "vMerge")
        .map(|n| match n.attribute((WML_NS, "val")) {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        })
        .unwrap_or(VMerge::None);

    let v_align = wml_attr(tc_pr, "vAlign").map(|v| match v {
        "center" => CellVAlign::Center,
        "bottom" => CellVAlign::Bottom,
        _ => CellVAlign::Top,
    });

    TableCell {
        grid_span,
        v_merge,
        borders: wml(tc_pr, "tcBorders").map(parse_borders),
        v_align,
        width: wml(tc_pr, "tcW").map(parse_width),
        shading: parse_shading(tc_pr),
        content,
    }
}
