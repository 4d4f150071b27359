use std::borrow::Cow;
use std::fmt::Write as _;

use crate::report::RenderedView;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    render_table_with_footer(headers, rows, 0)
}

/// Like [`render_table`], with a second separator above the last
/// `footer_rows` rows.
pub fn render_table_with_footer(
    headers: &[String],
    rows: &[Vec<String>],
    footer_rows: usize,
) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths);
    let _ = writeln!(output, "{header_line}");

    let separator_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<usize>>();
    let separator_cells = separator_widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &separator_widths);
    let _ = writeln!(output, "{separator_line}");

    let footer_start = rows.len().saturating_sub(footer_rows);
    for (idx, row) in rows.iter().enumerate() {
        if footer_rows > 0 && idx == footer_start {
            let _ = writeln!(output, "{separator_line}");
        }
        let row_line = format_row(row, &widths);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

/// Title, key/value metrics, the table, any notice and load warnings, in that
/// order.
pub fn render_view(view: &RenderedView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "== {} ==", view.title);

    if !view.metrics.is_empty() {
        let label_width = view
            .metrics
            .iter()
            .map(|(label, _)| display_width(label))
            .max()
            .unwrap_or_default();
        for (label, value) in &view.metrics {
            let padding = label_width.saturating_sub(display_width(label));
            let _ = writeln!(
                output,
                "{}:{} {}",
                sanitize_cell(label),
                " ".repeat(padding),
                sanitize_cell(value)
            );
        }
    }

    if !view.headers.is_empty() {
        let footer_rows = usize::from(view.has_grand_total);
        output.push_str(&render_table_with_footer(&view.headers, &view.rows, footer_rows));
    }

    if let Some(notice) = &view.notice {
        let _ = writeln!(output, "{}", sanitize_cell(notice));
    }
    for warning in &view.warnings {
        let _ = writeln!(output, "warning: {}", sanitize_cell(warning));
    }
    output
}

pub fn print_view(view: &RenderedView) {
    let rendered = render_view(view);
    println!("{rendered}");
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let display = display_width(sanitized.as_ref());
        let mut cell = sanitized.into_owned();
        let padding = widths
            .get(idx)
            .copied()
            .unwrap_or_default()
            .saturating_sub(display);
        if padding > 0 {
            cell.push_str(&" ".repeat(padding));
        }
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        let mut sanitized = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '\n' | '\r' | '\t' => sanitized.push(' '),
                other => sanitized.push(other),
            }
        }
        Cow::Owned(sanitized)
    } else {
        Cow::Borrowed(value)
    }
}
