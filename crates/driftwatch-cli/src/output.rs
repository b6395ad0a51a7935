use serde::Serialize;

/// Placeholder for a statistic that could not be computed.
const MISSING: &str = "-";

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Lay out rows under a header and a dashed rule. Columns whose cells are
/// all numbers (or the missing placeholder) are right-aligned so decimal
/// points line up.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let numeric: Vec<bool> = (0..columns).map(|i| is_numeric_column(rows, i)).collect();

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths, &numeric);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_line(&mut out, &rule, &widths, &numeric);
    for row in rows {
        push_line(&mut out, row, &widths, &numeric);
    }
    out
}

fn is_numeric_column(rows: &[Vec<String>], column: usize) -> bool {
    let mut any_number = false;
    for cell in rows.iter().filter_map(|r| r.get(column)) {
        if cell.parse::<f64>().is_ok() {
            any_number = true;
        } else if cell != MISSING {
            return false;
        }
    }
    any_number
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], numeric: &[bool]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter().zip(numeric))
        .map(|(cell, (&width, &right))| {
            if right {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Render an optional float for table output.
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.4}"))
}
