//! Plain-text rendering of the final report table.

use pedon_core::export;
use pedon_schemas::report::BinnedRow;

/// Prints the report as a right-aligned table, one row per
/// (coordinate, depth bin). Absent values show as blank cells.
pub fn print_table(rows: &[BinnedRow]) {
    let header = export::header();
    let formatted: Vec<Vec<String>> = rows.iter().map(export::cells).collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for cells in &formatted {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    println!("{}", render_line(&header, &widths));
    for cells in &formatted {
        println!("{}", render_line(cells, &widths));
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_padded_to_column_widths() {
        let cells = vec!["0-10".to_string(), "40.3".to_string()];
        let widths = vec![9, 6];
        assert_eq!(render_line(&cells, &widths), "     0-10    40.3");
    }
}
