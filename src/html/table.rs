//! Table rendering: header/body split, colgroup hints and merge
//! reconstruction into `rowspan`/`colspan`.

use crate::model::{Borders, Table, TableAlignment, TableCell, TableRow, VMerge, WidthSpec};
use crate::units::twips_to_px;

use super::{Css, hex_color};

fn push_borders(css: &mut Css, borders: &Borders) {
    for (side, border) in borders.sides() {
        let Some(b) = border else { continue };
        let property = match side {
            "top" => "border-top",
            "left" => "border-left",
            "bottom" => "border-bottom",
            _ => "border-right",
        };
        css.push(
            property,
            format!("{}px {} {}", b.width_px, b.style.css(), hex_color(b.color)),
        );
    }
}

fn push_width(css: &mut Css, width: WidthSpec) {
    match width {
        WidthSpec::Fixed(px) => css.push("width", format!("{px}px")),
        WidthSpec::Percent(pct) => css.push("width", format!("{pct}%")),
        WidthSpec::Auto => {}
    }
}

fn table_css(table: &Table) -> Css {
    let mut css = Css::new();
    match table.width {
        WidthSpec::Auto => {
            let total: i64 = table.col_widths.iter().map(|w| *w as i64).sum();
            if total > 0 {
                css.push("width", format!("{}px", twips_to_px(total)));
            } else {
                css.push("width", "auto");
            }
        }
        width => push_width(&mut css, width),
    }
    css.push(
        "table-layout",
        if table.autofit { "auto" } else { "fixed" },
    );
    match table.alignment {
        TableAlignment::Center => {
            css.push("margin-left", "auto");
            css.push("margin-right", "auto");
        }
        TableAlignment::Right => css.push("margin-left", "auto"),
        TableAlignment::Left => {}
    }
    if let Some(rgb) = table.shading {
        css.push("background-color", hex_color(rgb));
    }
    push_borders(&mut css, &table.borders);
    css
}

fn cell_css(cell: &TableCell) -> Css {
    let mut css = Css::new();
    match &cell.borders {
        None => css.push("border", "1px solid black"),
        Some(borders) => push_borders(&mut css, borders),
    }
    if let Some(width) = cell.width {
        push_width(&mut css, width);
    }
    if let Some(rgb) = cell.shading {
        css.push("background-color", hex_color(rgb));
    }
    if let Some(v_align) = cell.v_align {
        css.push("vertical-align", v_align.css());
    }
    css
}

/// Grid column each cell starts at, per row.
fn grid_positions(rows: &[TableRow]) -> Vec<Vec<usize>> {
    rows.iter()
        .map(|row| {
            let mut col = 0usize;
            row.cells
                .iter()
                .map(|cell| {
                    let start = col;
                    col += cell.grid_span as usize;
                    start
                })
                .collect()
        })
        .collect()
}

/// Merge state of the cell starting at grid column `col` in `rows[index]`.
fn merge_at(rows: &[TableRow], positions: &[Vec<usize>], index: usize, col: usize) -> Option<VMerge> {
    positions[index]
        .iter()
        .position(|start| *start == col)
        .map(|i| rows[index].cells[i].v_merge)
}

/// Whether walking `above` (nearest row first) through `continue` cells in
/// grid column `col` reaches a `restart`.
fn reaches_restart(
    rows: &[TableRow],
    positions: &[Vec<usize>],
    above: impl Iterator<Item = usize>,
    col: usize,
) -> bool {
    for index in above {
        match merge_at(rows, positions, index, col) {
            Some(VMerge::Restart) => return true,
            Some(VMerge::Continue) => {}
            _ => return false,
        }
    }
    false
}

/// Length of the merge group starting at `section[pos]` in grid column
/// `col`: the restart cell plus every directly following `continue` cell
/// there. Only rows of the same section count; a rowspan cannot leave its
/// `thead` or `tbody`.
fn merge_length(
    rows: &[TableRow],
    positions: &[Vec<usize>],
    section: &[usize],
    pos: usize,
    col: usize,
) -> usize {
    1 + section[pos + 1..]
        .iter()
        .take_while(|next| merge_at(rows, positions, **next, col) == Some(VMerge::Continue))
        .count()
}

fn render_row(
    rows: &[TableRow],
    positions: &[Vec<usize>],
    section: &[usize],
    pos: usize,
    cell_html: &mut dyn FnMut(&TableCell) -> String,
) -> String {
    let index = section[pos];
    let row = &rows[index];
    let tag = if row.is_header { "th" } else { "td" };

    let mut row_css = Css::new();
    if let Some(height) = row.height {
        row_css.push("height", format!("{height}px"));
    }

    let mut out = format!("<tr{}>\n", row_css.attr());
    for (cell, col) in row.cells.iter().zip(&positions[index]) {
        let mut attrs = String::new();
        match cell.v_merge {
            VMerge::Continue => {
                if reaches_restart(rows, positions, section[..pos].iter().rev().copied(), *col) {
                    continue;
                }
                // Cut off from its restart by the header/body split: keep
                // the grid aligned with an empty cell.
                if reaches_restart(rows, positions, (0..index).rev(), *col) {
                    out.push_str(&format!("<{tag}{}></{tag}>\n", cell_css(cell).attr()));
                }
                continue;
            }
            VMerge::Restart => {
                let span = merge_length(rows, positions, section, pos, *col);
                if span > 1 {
                    attrs.push_str(&format!(" rowspan=\"{span}\""));
                }
            }
            VMerge::None => {}
        }
        if cell.grid_span > 1 {
            attrs.push_str(&format!(" colspan=\"{}\"", cell.grid_span));
        }
        let content = cell_html(cell);
        out.push_str(&format!(
            "<{tag}{attrs}{}>{}</{tag}>\n",
            cell_css(cell).attr(),
            content.trim_end()
        ));
    }
    out.push_str("</tr>\n");
    out
}

/// Emit one table. `cell_html` converts a cell's nested blocks; it is the
/// walker recursing back into itself.
pub fn render_table(table: &Table, cell_html: &mut dyn FnMut(&TableCell) -> String) -> String {
    let positions = grid_positions(&table.rows);

    let class = table
        .look
        .as_deref()
        .map(|code| {
            format!(
                " class=\"table-look-{}\"",
                html_escape::encode_double_quoted_attribute(code)
            )
        })
        .unwrap_or_default();
    let mut out = format!("<table{class}{}>\n", table_css(table).attr());

    let total: u64 = table.col_widths.iter().map(|w| *w as u64).sum();
    if !table.autofit && total > 0 {
        out.push_str("<colgroup>\n");
        for width in &table.col_widths {
            let pct = *width as f64 * 100.0 / total as f64;
            out.push_str(&format!("<col style=\"width: {pct:.2}%;\">\n"));
        }
        out.push_str("</colgroup>\n");
    }

    let (header, body): (Vec<usize>, Vec<usize>) =
        (0..table.rows.len()).partition(|i| table.rows[*i].is_header);

    for (tag, section) in [("thead", &header), ("tbody", &body)] {
        if section.is_empty() {
            continue;
        }
        out.push_str(&format!("<{tag}>\n"));
        for pos in 0..section.len() {
            out.push_str(&render_row(&table.rows, &positions, section, pos, cell_html));
        }
        out.push_str(&format!("</{tag}>\n"));
    }
    out.push_str("</table>");
    out
}
