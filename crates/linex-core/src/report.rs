//! Markdown report rendering for extracted line items.

use std::path::{Path, PathBuf};

use crate::models::record::LineItem;

const HEADERS: [&str; 2] = ["Description", "Total Price"];

/// Report path for an input PDF: `<stem>_extracted.md` next to the input.
pub fn report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}_extracted.md", stem))
}

/// Render line items as a Markdown pipe table with padded columns.
pub fn render_markdown(items: &[LineItem]) -> String {
    let rows: Vec<[String; 2]> = items
        .iter()
        .map(|item| [escape(&item.description), escape(&item.total_price)])
        .collect();

    let mut widths = [HEADERS[0].len(), HEADERS[1].len()];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &[HEADERS[0].to_string(), HEADERS[1].to_string()], &widths);
    out.push_str(&format!(
        "|{}|{}|\n",
        "-".repeat(widths[0] + 2),
        "-".repeat(widths[1] + 2)
    ));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out
}

fn push_row(out: &mut String, cells: &[String; 2], widths: &[usize; 2]) {
    out.push_str(&format!(
        "| {:<w0$} | {:<w1$} |\n",
        cells[0],
        cells[1],
        w0 = widths[0],
        w1 = widths[1]
    ));
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("/data/Foley_11.pdf")),
            PathBuf::from("/data/Foley_11_extracted.md")
        );
    }

    #[test]
    fn test_render_table() {
        let items = vec![
            LineItem {
                description: "Concrete Pump Rental 4 hrs".to_string(),
                total_price: "$425.00".to_string(),
            },
            LineItem {
                description: "Crane Service".to_string(),
                total_price: "$1,200.00".to_string(),
            },
        ];

        let expected = "\
| Description                | Total Price |
|----------------------------|-------------|
| Concrete Pump Rental 4 hrs | $425.00     |
| Crane Service              | $1,200.00   |
";
        assert_eq!(render_markdown(&items), expected);
    }

    #[test]
    fn test_pipe_escaped() {
        let items = vec![LineItem {
            description: "Rental | misc".to_string(),
            total_price: "$1.00".to_string(),
        }];

        let rendered = render_markdown(&items);
        assert!(rendered.contains("Rental \\| misc"));
    }
}
