//! Terminal output helpers.

use crossterm::style::Stylize;

/// Display width of a string, counting non-ASCII chars as two cells.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Print a boxed section header.
pub fn print_header(title: &str) {
    let inner_width: usize = 58;
    let total_padding = inner_width.saturating_sub(display_width(title));
    let left_pad = total_padding / 2;
    let right_pad = total_padding - left_pad;

    println!();
    println!("{}", format!("╔{}╗", "═".repeat(inner_width)).dark_cyan());
    println!(
        "{}",
        format!("║{}{}{}║", " ".repeat(left_pad), title, " ".repeat(right_pad)).dark_cyan()
    );
    println!("{}", format!("╚{}╝", "═".repeat(inner_width)).dark_cyan());
    println!();
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", key).dark_grey(), value);
}

/// Key-value pair whose value is green when `flag` is set, grey otherwise.
pub fn print_flag(key: &str, flag: bool) {
    let value = if flag {
        "yes".green().to_string()
    } else {
        "no".dark_grey().to_string()
    };
    println!("  {:<16} {}", format!("{}:", key).dark_grey(), value);
}

pub fn print_table_header(columns: &[(&str, usize)]) {
    println!("  {}", join_columns(columns).white().bold());
    let separator: String = columns
        .iter()
        .map(|(_, width)| "─".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    println!("  {}", separator.dark_grey());
}

pub fn print_table_row(columns: &[(&str, usize)]) {
    println!("  {}", join_columns(columns));
}

fn join_columns(columns: &[(&str, usize)]) -> String {
    columns
        .iter()
        .map(|(val, width)| format!("{:<width$}", val, width = width))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_empty(msg: &str) {
    println!();
    println!("  {}", msg.dark_grey().italic());
    println!();
}

/// `yes`/`no` for table cells.
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
