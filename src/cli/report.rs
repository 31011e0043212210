//! Invocation result payloads and their terminal rendering
//!
//! Handlers return structured data; the shape decides how it is rendered
//! (plain text, key/value panel, column table, tree, or markdown). Reports
//! are created per invocation and discarded after rendering.

use colored::Colorize;

use super::output;

/// Success payload of one command invocation.
#[derive(Debug)]
pub enum Report {
    /// Plain text, printed as-is
    Text(String),
    /// Key/value panel with a header line
    KeyValue {
        title: String,
        pairs: Vec<(String, String)>,
    },
    /// Column table with a header line
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Directory-style tree
    Tree(termtree::Tree<String>),
    /// Markdown source, rendered for the terminal
    Markdown(String),
    /// Several payloads rendered in order, separated by blank lines
    Multi(Vec<Report>),
}

impl Report {
    pub fn text(content: impl Into<String>) -> Self {
        Report::Text(content.into())
    }

    pub fn key_value<K, V>(title: impl Into<String>, pairs: Vec<(K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Report::KeyValue {
            title: title.into(),
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn table<H: Into<String>>(
        title: impl Into<String>,
        headers: Vec<H>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Report::Table {
            title: title.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Render to stdout.
    pub fn render(&self) {
        match self {
            Report::Text(content) => output::info(content),
            Report::KeyValue { title, pairs } => render_key_value(title, pairs),
            Report::Table {
                title,
                headers,
                rows,
            } => render_table(title, headers, rows),
            Report::Tree(tree) => output::info(tree),
            Report::Markdown(source) => termimad::print_text(source),
            Report::Multi(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    part.render();
                }
            }
        }
    }
}

fn render_key_value(title: &str, pairs: &[(String, String)]) {
    output::header(title);
    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in pairs {
        let label = pad_visible(&key.bold().to_string(), width);
        println!("  {}  {}", label, value);
    }
}

fn render_table(title: &str, headers: &[String], rows: &[Vec<String>]) {
    output::header(title);

    // visible width per column, over header and body
    let mut widths: Vec<usize> = headers.iter().map(|h| visible_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(visible_width(cell));
            }
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:w$}", h, w = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {}", header_line.bold());

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("  {}", rule.join("  "));

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                pad_visible(cell, w)
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line.trim_end());
    }
}

/// Character count ignoring ANSI escape sequences, so colored cells line up.
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\u{1b}' {
            in_escape = true;
        } else {
            width += 1;
        }
    }
    width
}

fn pad_visible(s: &str, width: usize) -> String {
    let visible = visible_width(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_cell_when_measured_then_counts_chars() {
        assert_eq!(visible_width("hello"), 5);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn given_ansi_colored_cell_when_measured_then_ignores_escapes() {
        let colored = "\u{1b}[31mred\u{1b}[0m";
        assert_eq!(visible_width(colored), 3);
    }

    #[test]
    fn given_short_cell_when_padded_then_reaches_target_width() {
        assert_eq!(pad_visible("ab", 5), "ab   ");
        assert_eq!(pad_visible("abcdef", 3), "abcdef");
    }

    #[test]
    fn given_helpers_when_constructing_then_shapes_match() {
        let report = Report::key_value("Panel", vec![("k", "v")]);
        match report {
            Report::KeyValue { title, pairs } => {
                assert_eq!(title, "Panel");
                assert_eq!(pairs, vec![("k".to_string(), "v".to_string())]);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
