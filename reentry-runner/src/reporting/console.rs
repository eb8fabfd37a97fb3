//! Console output: banners and tables on stdout.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Row, Table};

const RULE_WIDTH: usize = 100;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Title framed by full-width rules.
pub fn banner(title: &str) -> String {
    format!("{}\n{title}\n{}", rule(), rule())
}

pub fn print_banner(title: &str) {
    println!("\n{}", banner(title));
}

/// Thin divider between cases.
pub fn print_divider() {
    println!("{}", "-".repeat(RULE_WIDTH));
}

/// A table with the project's preset and the given header.
pub fn table<R: Into<Row>>(header: R) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    t
}

/// Right-align every column after the first.
pub fn align_numbers(table: &mut Table) {
    let columns = table.column_count();
    for i in 1..columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// `count (share%)` as shown throughout the console tables.
pub fn count_share(count: usize, share_pct: f64) -> String {
    format!("{count} ({share_pct:.2}%)")
}

pub fn minutes_label(minutes: f64) -> String {
    format!("{minutes:.2} min")
}

/// Minutes with the day equivalent, for long intervals.
pub fn minutes_days_label(minutes: f64) -> String {
    format!("{minutes:.2} min ({:.2} days)", minutes / 1440.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_frames_title() {
        let b = banner("Reentry");
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Reentry");
        assert_eq!(lines[0].len(), RULE_WIDTH);
    }

    #[test]
    fn table_renders_header_and_rows() {
        let mut t = table(["Metric", "Value"]);
        t.add_row(vec!["Trades".to_string(), "165".to_string()]);
        align_numbers(&mut t);
        let s = t.to_string();
        assert!(s.contains("Metric"));
        assert!(s.contains("165"));
    }

    #[test]
    fn labels() {
        assert_eq!(count_share(3, 12.5), "3 (12.50%)");
        assert_eq!(minutes_days_label(2880.0), "2880.00 min (2.00 days)");
    }
}
