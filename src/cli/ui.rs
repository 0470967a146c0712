use crate::core::{CurrencyPair, WatchSession, WatchStatus};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Success,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Success => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn status_cell(status: WatchStatus) -> Cell {
    let color = match status {
        WatchStatus::Succeeded => Color::Green,
        WatchStatus::Exhausted => Color::Red,
        WatchStatus::Cancelled => Color::Yellow,
        WatchStatus::Idle | WatchStatus::Running => Color::DarkGrey,
    };
    Cell::new(status.to_string())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

/// Renders the final state of a watch session as a two column table.
pub fn session_table(pair: &CurrencyPair, session: &WatchSession, max_attempts: u32) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![header_cell("Watch"), header_cell(&pair.to_string())]);

    let right = |text: String| Cell::new(text).set_alignment(CellAlignment::Right);
    table.add_row(vec![Cell::new("Start rate"), right(session.start_rate().to_string())]);
    table.add_row(vec![Cell::new("Target rate"), right(session.target_rate().to_string())]);
    table.add_row(vec![Cell::new("Direction"), right(session.direction().to_string())]);
    table.add_row(vec![
        Cell::new("Attempts"),
        right(format!("{}/{}", session.attempt(), max_attempts)),
    ]);
    table.add_row(vec![Cell::new("Status"), status_cell(session.status())]);
    table
}

/// Creates a ticking spinner for long running operations.
pub fn new_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
