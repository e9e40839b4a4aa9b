//! Markdown-to-ratatui rendering for review and PR text.
//!
//! Deliberately small: headings, bullets, inline bold, horizontal rules,
//! and fenced code blocks. Fences are syntax-highlighted with syntect;
//! `diff` fences get plain +/− coloring instead, which reads better for
//! review output than lexing the diff as source code.

use std::sync::LazyLock;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Renders markdown into owned lines ready for a `Paragraph`.
pub fn render(markdown: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut out: Vec<Line<'static>> = Vec::new();
    let mut fence: Option<String> = None;
    let mut highlighter: Option<HighlightLines> = None;

    for line in markdown.split('\n') {
        if let Some(tag) = line.strip_prefix("```") {
            match fence.take() {
                Some(_) => highlighter = None,
                None => {
                    let tag = tag.trim().to_owned();
                    highlighter = make_highlighter(&tag);
                    fence = Some(tag);
                }
            }
            continue;
        }

        if let Some(tag) = &fence {
            out.push(code_line(line, tag, highlighter.as_mut(), theme));
            continue;
        }

        out.push(prose_line(line, theme));
    }

    out
}

fn make_highlighter(tag: &str) -> Option<HighlightLines<'static>> {
    if tag.is_empty() || tag == "diff" {
        return None;
    }
    let syntax = PS
        .find_syntax_by_token(tag)
        .unwrap_or_else(|| PS.find_syntax_plain_text());
    let syntect_theme = TS
        .themes
        .get("base16-ocean.dark")
        .or_else(|| TS.themes.values().next())?;
    Some(HighlightLines::new(syntax, syntect_theme))
}

fn code_line(
    line: &str,
    tag: &str,
    highlighter: Option<&mut HighlightLines>,
    theme: &Theme,
) -> Line<'static> {
    if tag == "diff" {
        let style = if line.starts_with('+') {
            Style::default().fg(theme.diff_added)
        } else if line.starts_with('-') {
            Style::default().fg(theme.diff_removed)
        } else {
            Style::default().fg(theme.subtext)
        };
        return Line::from(Span::styled(line.to_owned(), style));
    }

    if let Some(h) = highlighter {
        if let Ok(ranges) = h.highlight_line(line, &PS) {
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    let c = style.foreground;
                    Span::styled(
                        text.to_owned(),
                        Style::default().fg(ratatui::style::Color::Rgb(c.r, c.g, c.b)),
                    )
                })
                .collect();
            if !spans.is_empty() {
                return Line::from(spans);
            }
        }
    }
    Line::from(Span::styled(line.to_owned(), Style::default().fg(theme.text)))
}

fn prose_line(line: &str, theme: &Theme) -> Line<'static> {
    let trimmed = line.trim_start();

    if let Some(rest) = heading_text(trimmed) {
        return Line::from(Span::styled(
            rest.to_owned(),
            Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
        ));
    }

    if trimmed == "---" || trimmed == "***" {
        return Line::from(Span::styled(
            "─".repeat(40),
            Style::default().fg(theme.subtext),
        ));
    }

    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        let indent = line.len() - trimmed.len();
        let mut spans = vec![Span::raw(format!("{}• ", " ".repeat(indent)))];
        spans.extend(inline_spans(rest, theme));
        return Line::from(spans);
    }

    Line::from(inline_spans(line, theme))
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    line[hashes..].strip_prefix(' ')
}

/// Splits `**bold**` runs into styled spans; everything else is plain.
fn inline_spans(text: &str, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, piece) in text.split("**").enumerate() {
        if piece.is_empty() {
            continue;
        }
        // Odd-indexed pieces sit between a pair of ** markers.
        let style = if i % 2 == 1 {
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        spans.push(Span::styled(piece.to_owned(), style));
    }
    if spans.is_empty() {
        spans.push(Span::raw(String::new()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn headings_drop_hashes() {
        let lines = render("## Findings\nbody", &Theme::dark());
        assert_eq!(plain_text(&lines), ["Findings", "body"]);
    }

    #[test]
    fn bullets_become_dots() {
        let lines = render("- first\n* second", &Theme::dark());
        assert_eq!(plain_text(&lines), ["• first", "• second"]);
    }

    #[test]
    fn fences_are_consumed_and_body_kept() {
        let lines = render("```rust\nlet x = 1;\n```\nafter", &Theme::dark());
        assert_eq!(plain_text(&lines), ["let x = 1;", "after"]);
    }

    #[test]
    fn diff_fences_color_by_marker() {
        let theme = Theme::dark();
        let lines = render("```diff\n+new\n-old\n ctx\n```", &theme);
        assert_eq!(plain_text(&lines), ["+new", "-old", " ctx"]);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.diff_added));
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.diff_removed));
    }

    #[test]
    fn bold_runs_are_emphasised() {
        let lines = render("a **big** deal", &Theme::dark());
        let line = &lines[0];
        assert_eq!(plain_text(&lines), ["a big deal"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }
}
