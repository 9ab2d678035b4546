use anyhow::{Context, Result};
use std::path::Path;

/// Extract the text layer of a PDF and render it as Markdown
///
/// pdf-extract panics on some malformed inputs, so the call is isolated and
/// a panic is reported as an ordinary error.
pub fn extract_pdf_to_markdown(path: &Path) -> Result<String> {
    let owned = path.to_path_buf();
    let text = std::panic::catch_unwind(move || pdf_extract::extract_text(&owned))
        .map_err(|_| anyhow::anyhow!("PDF parser panicked on {}", path.display()))?
        .context("Failed to extract text from PDF")?;

    Ok(format_as_markdown(&text))
}

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Blank,
    Heading(&'a str),
    TableRow(Vec<&'a str>),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Line::Blank
    } else if let Some(cells) = table_cells(trimmed) {
        Line::TableRow(cells)
    } else if is_likely_heading(trimmed) {
        Line::Heading(trimmed.trim_end_matches(':'))
    } else {
        Line::Text(trimmed)
    }
}

/// Add headings and tables to the flat text layer
fn format_as_markdown(text: &str) -> String {
    let mut markdown = String::with_capacity(text.len());
    let mut in_table = false;

    for line in text.lines() {
        let line = classify(line);
        let is_row = matches!(line, Line::TableRow(_));
        if in_table && !is_row {
            markdown.push('\n');
        }

        match line {
            Line::Blank => markdown.push('\n'),
            Line::Heading(title) => {
                let level = if title.len() < 30 { "##" } else { "###" };
                markdown.push_str(&format!("{} {}\n\n", level, title));
            }
            Line::TableRow(cells) => {
                markdown.push_str(&format!("| {} |\n", cells.join(" | ")));
                if !in_table {
                    let separator = vec!["---"; cells.len()];
                    markdown.push_str(&format!("| {} |\n", separator.join(" | ")));
                }
            }
            Line::Text(body) => {
                markdown.push_str(body);
                markdown.push('\n');
            }
        }

        in_table = is_row;
    }

    markdown
}

/// Cells of a line that looks like a table row (3+ columns split by tabs or runs of spaces)
fn table_cells(line: &str) -> Option<Vec<&str>> {
    if line.split_whitespace().count() < 3 {
        return None;
    }

    let cells: Vec<&str> = if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else if line.contains("  ") {
        line.split("  ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        return None;
    };

    Some(cells)
}

/// Mostly upper-case lines and short lines ending in ':' read as headings
fn is_likely_heading(line: &str) -> bool {
    let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
    let upper = line.chars().filter(|c| c.is_uppercase()).count();

    if alpha > 0 && (upper as f64 / alpha as f64) > 0.8 && line.len() < 100 {
        return true;
    }

    line.ends_with(':') && line.len() < 80 && !line.contains("://")
}
