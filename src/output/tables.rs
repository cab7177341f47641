use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::gitlab::PipelineStatus;
use crate::status::CardColor;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cells(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn status_cell(status: Option<PipelineStatus>, color: CardColor) -> Cell {
    let text = status.map_or("no data", |status| status.as_str()).to_uppercase();
    let table_color = match color {
        CardColor::Success => TableColor::Green,
        CardColor::Warning => TableColor::Yellow,
        CardColor::Danger => TableColor::Red,
        CardColor::Secondary => TableColor::Grey,
    };
    Cell::new(text).fg(table_color)
}

pub fn coverage_cell(coverage: f64) -> Cell {
    let text = format!("{coverage:.2}%");
    if coverage >= 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if coverage >= 50.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

pub fn trend_cell(value: f64, suffix: &str) -> Cell {
    let text = format!("{value:+.2}{suffix}");
    if value > 0.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if value < 0.0 {
        Cell::new(text).fg(TableColor::Red)
    } else {
        Cell::new(text).fg(TableColor::Grey)
    }
}

/// Seconds as `H:MM:SS`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}
