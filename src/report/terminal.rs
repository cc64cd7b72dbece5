use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::commands::CommandResult;

/// Print a command result for a human reader.
pub fn render(result: &CommandResult, verbose: bool, quiet: bool) {
    let status = if result.success {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("{} {}", status, result.message);

    if quiet {
        return;
    }

    for line in &result.lines {
        println!("{}", line);
    }

    if !result.failures.is_empty() {
        println!("\n {} Files that could not be copied:\n", "[ERROR]".red().bold());
        println!("{}", failure_table(result));
    }

    if verbose && !result.files.is_empty() {
        println!("\n {} Collected license files:\n", "[OK]".green().bold());
        println!("{}", files_table(result));
    }
}

fn files_table(result: &CommandResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Saved as").add_attribute(Attribute::Bold),
        ]);

    for file in &result.files {
        table.add_row(vec![
            Cell::new(file.index),
            Cell::new(&file.source),
            Cell::new(file.destination.display()).fg(Color::Green),
        ]);
    }
    table
}

fn failure_table(result: &CommandResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Reason").add_attribute(Attribute::Bold),
        ]);

    for failure in &result.failures {
        table.add_row(vec![
            Cell::new(&failure.source),
            Cell::new(&failure.reason).fg(Color::Red),
        ]);
    }
    table
}
