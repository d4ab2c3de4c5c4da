use crossterm::style::Stylize;

use crate::pipeline::WeeklySummary;

/// Prints the weekly recommended-pressure table. Rows are colored by the
/// direction of the week-over-week change: increases red, decreases green,
/// the first row and unchanged weeks neutral.
pub fn print_weekly_summary(summary: &WeeklySummary) {
    println!("Recommended Pressure Settings Over Time");
    println!(
        "{:<12}  {:>20}  {:>26}",
        "Week Start", "Recommended Pressure", "Change from Previous Week"
    );
    for (index, row) in summary.rows.iter().enumerate() {
        let line = format!(
            "{:<12}  {:>20}  {:>26}",
            row.week_start.format("%Y-%m-%d"),
            row.pressure_text(),
            row.change_text()
        );
        if index == 0 || row.change_pct == 0.0 {
            println!("{line}");
        } else if row.change_pct > 0.0 {
            println!("{}", line.red());
        } else {
            println!("{}", line.green());
        }
    }
}
