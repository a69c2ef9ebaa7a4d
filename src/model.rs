use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

/// Resolved character formatting of one run. `Style::default()` is the
/// "no formatting" snapshot; two runs group together iff their styles are equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Half-points, as declared by `w:sz`.
    pub font_size: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub caps: bool,
    pub small_caps: bool,
    pub vertical_align: VertAlign,
    pub highlight: Option<[u8; 3]>,
    pub color: Option<[u8; 3]>,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

/// Target of one `w:hyperlink` element. `ordinal` tells apart adjacent
/// links that share a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hyperlink {
    pub target: String,
    pub ordinal: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    /// Raw text; `\n` marks a hard line break, `\t` a tab.
    pub text: String,
    pub style: Style,
    pub hyperlink: Option<Hyperlink>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListInfo {
    pub num_id: String,
    pub level: u8,
    pub kind: ListKind,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub list: Option<ListInfo>,
    /// 1..=9
    pub heading_level: Option<u8>,
}

impl Paragraph {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidthSpec {
    /// Pixels, already converted from twips.
    Fixed(u32),
    /// 0..=100
    Percent(f32),
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    Double,
    Dotted,
    Dashed,
    DashDot,
}

impl BorderStyle {
    pub fn css(self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Double => "double",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Dashed => "dashed",
            BorderStyle::DashDot => "dashdot",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub width_px: u32,
    pub color: [u8; 3],
}

/// A side is `None` when the source declares no visible border there.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Borders {
    pub top: Option<BorderSide>,
    pub left: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
    pub right: Option<BorderSide>,
}

impl Borders {
    pub fn sides(&self) -> [(&'static str, Option<BorderSide>); 4] {
        [
            ("top", self.top),
            ("left", self.left),
            ("bottom", self.bottom),
            ("right", self.right),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VMerge {
    #[default]
    None,
    Restart,
    Continue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellVAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl CellVAlign {
    pub fn css(self) -> &'static str {
        match self {
            CellVAlign::Top => "top",
            CellVAlign::Center => "middle",
            CellVAlign::Bottom => "bottom",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub alignment: TableAlignment,
    pub width: WidthSpec,
    pub autofit: bool,
    pub borders: Borders,
    pub look: Option<String>,
    /// Grid column widths in twips.
    pub col_widths: Vec<u32>,
    pub shading: Option<[u8; 3]>,
    pub rows: Vec<TableRow>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            alignment: TableAlignment::Left,
            width: WidthSpec::Auto,
            autofit: true,
            borders: Borders::default(),
            look: None,
            col_widths: Vec::new(),
            shading: None,
            rows: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub is_header: bool,
    /// Pixels.
    pub height: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub grid_span: u16,
    pub v_merge: VMerge,
    /// `None` when the cell has no `tcBorders`; rendered with the default border.
    pub borders: Option<Borders>,
    pub v_align: Option<CellVAlign>,
    pub width: Option<WidthSpec>,
    pub shading: Option<[u8; 3]>,
    pub content: Vec<Block>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            grid_span: 1,
            v_merge: VMerge::None,
            borders: None,
            v_align: None,
            width: None,
            shading: None,
            content: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
    /// Relationship id of the embedded blip.
    pub rel_id: String,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Drawing(Drawing),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaPart {
    pub part_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    /// Points.
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

pub struct Document {
    pub blocks: Vec<Block>,
    pub margins: Option<PageMargins>,
    /// Image parts keyed by relationship id.
    pub media: HashMap<String, MediaPart>,
}
