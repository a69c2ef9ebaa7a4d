//! Run grouping: adjacent runs with identical formatting collapse into one
//! styled span.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::{Hyperlink, Run, Style, VertAlign};
use crate::units::half_points_to_pt;

use super::{Css, RenderContext, hex_color};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}").unwrap());

/// Fill-in marks typed as something other than plain dots, applied in order.
const PLACEHOLDER_SPELLINGS: &[(&str, &str)] = &[
    ("\u{2026}", "..."),
    ("\u{a0}", " "),
    (". .", "..."),
    (".. ", "..."),
    (" ..", "..."),
    ("./.", "..."),
    ("/ ..", "..."),
    ("/..", "..."),
    ("./ ", "..."),
    ("/ .", "..."),
    ("\t", "..."),
];

/// A maximal stretch of runs sharing one style and one enclosing hyperlink.
/// Text is already escaped; `lines` are separated by hard breaks.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleGroup {
    pub style: Style,
    pub hyperlink: Option<Hyperlink>,
    pub lines: Vec<String>,
}

pub fn group_runs(runs: &[Run]) -> Vec<StyleGroup> {
    let mut groups: Vec<StyleGroup> = Vec::new();

    for run in runs {
        let text = html_escape::encode_quoted_attribute(&run.text);
        let has_break = text.contains('\n');

        let joins_last = !has_break
            && groups
                .last()
                .is_some_and(|g| g.style == run.style && g.hyperlink == run.hyperlink);

        match groups.last_mut() {
            Some(group) if joins_last => {
                if let Some(line) = group.lines.last_mut() {
                    line.push_str(&text);
                }
            }
            _ => groups.push(StyleGroup {
                style: run.style.clone(),
                hyperlink: run.hyperlink.clone(),
                lines: text.split('\n').map(str::to_string).collect(),
            }),
        }
    }
    groups
}

pub fn style_css(style: &Style) -> Css {
    let mut css = Css::new();
    if let Some(size) = style.font_size {
        css.push("font-size", format!("{}pt", half_points_to_pt(size)));
    }
    if style.bold {
        css.push("font-weight", "bold");
    }
    if style.italic {
        css.push("font-style", "italic");
    }
    let decoration = match (style.underline, style.strike) {
        (true, true) => Some("underline line-through"),
        (true, false) => Some("underline"),
        (false, true) => Some("line-through"),
        (false, false) => None,
    };
    if let Some(decoration) = decoration {
        css.push("text-decoration", decoration);
    }
    if style.caps {
        css.push("text-transform", "uppercase");
    }
    if style.small_caps {
        css.push("font-variant", "small-caps");
    }
    match style.vertical_align {
        VertAlign::Superscript => css.push("vertical-align", "super"),
        VertAlign::Subscript => css.push("vertical-align", "sub"),
        VertAlign::Baseline => {}
    }
    if let Some(rgb) = style.highlight {
        css.push("background-color", hex_color(rgb));
    }
    if let Some(rgb) = style.color {
        css.push("color", hex_color(rgb));
    }
    css
}

pub fn normalize_placeholders(line: &str) -> String {
    PLACEHOLDER_SPELLINGS
        .iter()
        .fold(line.to_string(), |text, (from, to)| text.replace(from, to))
}

fn mark_placeholders(line: &str, ctx: &mut RenderContext) -> String {
    if !ctx.options.include_placeholder_markers {
        return line.to_string();
    }
    PLACEHOLDER
        .replace_all(line, |caps: &Captures| {
            format!(
                "<span class=\"placeholder\" data-placeholder=\"{}\">{}</span>",
                ctx.next_placeholder(),
                &caps[0]
            )
        })
        .into_owned()
}

pub fn render_runs(runs: &[Run], ctx: &mut RenderContext) -> String {
    let mut out = String::new();
    for group in group_runs(runs) {
        let style_attr = style_css(&group.style).attr();
        let mut html = String::new();
        for (i, line) in group.lines.iter().enumerate() {
            if i > 0 {
                html.push_str("<br>");
            }
            if line.is_empty() {
                continue;
            }
            let text = if ctx.options.normalize_placeholders {
                mark_placeholders(&normalize_placeholders(line), ctx)
            } else {
                mark_placeholders(line, ctx)
            };
            html.push_str(&format!("<span{style_attr}>{text}</span>"));
        }

        match &group.hyperlink {
            Some(link) => out.push_str(&format!(
                "<a href=\"{}\">{html}</a>",
                html_escape::encode_double_quoted_attribute(&link.target)
            )),
            None => out.push_str(&html),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::options::ConvertOptions;

    fn run(text: &str, style: Style) -> Run {
        Run {
            text: text.into(),
            style,
            hyperlink: None,
        }
    }

    fn link(target: &str, ordinal: usize) -> Option<Hyperlink> {
        Some(Hyperlink {
            target: target.into(),
            ordinal,
        })
    }

    fn bold() -> Style {
        Style {
            bold: true,
            ..Style::default()
        }
    }

    fn render(runs: &[Run], options: &ConvertOptions) -> String {
        let media = HashMap::new();
        let mut ctx = RenderContext::new(options, &media);
        render_runs(runs, &mut ctx)
    }

    #[test]
    fn same_style_runs_form_one_group() {
        let runs: Vec<Run> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| run(t, Style::default()))
            .collect();
        let groups = group_runs(&runs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lines, vec!["abcd".to_string()]);
    }

    #[test]
    fn hard_break_starts_group_and_keeps_text() {
        let runs = vec![
            run("one", Style::default()),
            run("two\nthree", Style::default()),
            run(" four", Style::default()),
        ];
        let groups = group_runs(&runs);
        assert_eq!(groups.len(), 2);
        let joined: Vec<String> = groups.iter().map(|g| g.lines.join("\n")).collect();
        assert_eq!(joined.concat(), "onetwo\nthree four");
    }

    #[test]
    fn style_and_hyperlink_boundaries() {
        let mut linked = run("link", Style::default());
        linked.hyperlink = link("https://example.com", 1);
        let runs = vec![
            run("plain", Style::default()),
            run("bold", bold()),
            linked,
            run("tail", Style::default()),
        ];
        let groups = group_runs(&runs);
        assert_eq!(groups.len(), 4);
        assert_eq!(
            groups[2].hyperlink.as_ref().map(|l| l.target.as_str()),
            Some("https://example.com")
        );
    }

    #[test]
    fn adjacent_links_to_one_target_stay_apart() {
        let mut first = run("one", Style::default());
        first.hyperlink = link("https://example.com", 1);
        let mut second = run("two", Style::default());
        second.hyperlink = link("https://example.com", 2);
        let mut same_element = run("three", Style::default());
        same_element.hyperlink = link("https://example.com", 2);

        let runs = [first, second, same_element];
        assert_eq!(group_runs(&runs).len(), 2);
        assert_eq!(
            render(&runs, &ConvertOptions::default()),
            r#"<a href="https://example.com"><span>one</span></a><a href="https://example.com"><span>twothree</span></a>"#
        );
    }

    #[test]
    fn text_is_escaped_once() {
        let groups = group_runs(&[run("a < b & \"c\"", Style::default())]);
        assert_eq!(groups[0].lines[0], "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn hello_bold_world() {
        let runs = vec![run("Hello ", Style::default()), run("world", bold())];
        assert_eq!(
            render(&runs, &ConvertOptions::default()),
            r#"<span>Hello </span><span style="font-weight: bold;">world</span>"#
        );
    }

    #[test]
    fn dot_runs_survive_verbatim() {
        let runs = vec![run("Name: ", Style::default()), run("..........", Style::default())];
        let html = render(&runs, &ConvertOptions::default());
        assert!(html.contains(
            r#"<span class="placeholder" data-placeholder="1">..........</span>"#
        ));

        let options = ConvertOptions {
            include_placeholder_markers: false,
            ..ConvertOptions::default()
        };
        assert_eq!(
            render(&runs, &options),
            "<span>Name: ..........</span>"
        );
    }

    #[test]
    fn hyperlink_wraps_group() {
        let mut linked = run("docs", Style::default());
        linked.hyperlink = link("https://example.com/?a=1&b=2", 1);
        assert_eq!(
            render(&[linked], &ConvertOptions::default()),
            r#"<a href="https://example.com/?a=1&amp;b=2"><span>docs</span></a>"#
        );
    }

    #[test]
    fn combined_decorations() {
        let style = Style {
            underline: true,
            strike: true,
            font_size: Some(21),
            color: Some([0x12, 0xAB, 0xFF]),
            ..Style::default()
        };
        assert_eq!(
            style_css(&style).attr(),
            r#" style="font-size: 10.5pt; text-decoration: underline line-through; color: #12ABFF;""#
        );
    }

    #[test]
    fn look_alike_fill_marks_are_normalized_on_request() {
        assert_eq!(normalize_placeholders("Date\u{2026}"), "Date...");
        assert_eq!(normalize_placeholders("No./."), "No...");
        assert_eq!(normalize_placeholders("a\tb"), "a...b");
        assert_eq!(normalize_placeholders("plain text."), "plain text.");

        let runs = vec![run("Date:. .", Style::default())];
        let options = ConvertOptions {
            normalize_placeholders: true,
            ..ConvertOptions::default()
        };
        assert_eq!(
            render(&runs, &options),
            r#"<span>Date:<span class="placeholder" data-placeholder="1">...</span></span>"#
        );
        assert_eq!(
            render(&runs, &ConvertOptions::default()),
            "<span>Date:. .</span>"
        );
    }
}
