//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};

use bankline_core::BalanceReport;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render a balance snapshot as `id | balance` rows with a total footer
pub fn balance_table(report: &BalanceReport) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Account", "Balance"]);

    for account in &report.accounts {
        table.add_row(vec![
            Cell::new(account.id()),
            Cell::new(account.balance()).set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(report.total).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Print a balance snapshot with a heading
pub fn print_balances(title: &str, report: &BalanceReport) {
    println!("{}", title.bold());
    if report.accounts.is_empty() {
        println!("{}", "No accounts".dimmed());
        return;
    }
    println!("{}", balance_table(report));
    println!(
        "{}",
        format!("as of {}", report.taken_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
}
