use crate::status::StatusCard;

use super::styling::{bright, dim, failing, passing, running};
use crate::gitlab::PipelineStatus;
use super::tables::{
    coverage_cell, create_table, format_duration, header_cells, status_cell,
};
use comfy_table::Cell;

/// Renders the live status cards as one row per project.
pub fn print_status_cards(cards: &[StatusCard]) {
    println!("{}", render_status_cards(cards));
}

fn render_status_cards(cards: &[StatusCard]) -> String {
    let mut table = create_table();
    table.set_header(header_cells(&[
        "Project", "Ref", "Status", "Duration", "Coverage", "Jobs", "Tests",
    ]));

    for card in cards {
        let name = if card.project_name.is_empty() {
            format!("#{}", card.project_id)
        } else {
            format!("{} (#{})", card.project_name, card.project_id)
        };

        table.add_row(vec![
            Cell::new(name),
            Cell::new(&card.ref_name),
            status_cell(card.status, card.color()),
            Cell::new(format_duration(card.duration)),
            coverage_cell(card.coverage),
            Cell::new(card.jobs.join(", ")),
            Cell::new(card.test_summary.as_deref().unwrap_or("")),
        ]);
    }

    format!(
        "{} {}\n{table}\n{}\n",
        bright("🚦"),
        bright("Pipeline status").underlined(),
        summary_line(cards)
    )
}

fn summary_line(cards: &[StatusCard]) -> String {
    let count = |status| cards.iter().filter(|card| card.status == Some(status)).count();
    format!(
        "  {}  {}  {}",
        passing(format!("{} passing", count(PipelineStatus::Success))),
        running(format!("{} running", count(PipelineStatus::Running))),
        failing(format!("{} failing", count(PipelineStatus::Failed))),
    )
}

/// One-line footer with the next refresh, shown by `pipewatch watch`.
pub fn print_watch_footer(interval_secs: u64) {
    println!(
        "{}",
        dim(format!("Refreshing every {interval_secs}s. Ctrl-C to quit."))
    );
}
