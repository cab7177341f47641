use comfy_table::Cell;

use crate::overview::Overview;

use super::styling::{bright, cyan, dim};
use super::tables::{coverage_cell, create_table, header_cells, status_cell, trend_cell};

/// Prints the dashboard overview: per-project activity over the look-back
/// window, plus milestone velocity for the group.
pub fn print_overview(overview: &Overview) {
    println!("{}", render_overview(overview));
}

fn render_overview(overview: &Overview) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        bright("📊"),
        bright("Project activity (last 14 days)").underlined()
    ));
    if !overview.group_name.is_empty() {
        output.push_str(&format!(
            "  {} {}\n",
            dim("Group:"),
            cyan(&overview.group_name)
        ));
    }

    let mut projects = create_table();
    projects.set_header(header_cells(&[
        "Project",
        "Ref",
        "Status",
        "OK",
        "Failed",
        "Coverage",
        "Trend",
        "Tests",
        "Commits",
        "Staging",
        "Production",
    ]));

    for project in &overview.projects {
        let name = if project.project_name.is_empty() {
            format!("#{}", project.project_id)
        } else {
            project.project_name.clone()
        };
        projects.add_row(vec![
            Cell::new(name),
            Cell::new(&project.ref_name),
            status_cell(
                project.latest_status,
                crate::status::status_color(project.latest_status),
            ),
            Cell::new(project.success_pipelines),
            Cell::new(project.failed_pipelines),
            coverage_cell(project.latest_coverage),
            trend_cell(project.coverage_trend, "%"),
            Cell::new(format!(
                "{} ({:+})",
                project.latest_tests_total, project.tests_trend
            )),
            Cell::new(project.commit_count),
            Cell::new(project.staging_deployments),
            Cell::new(project.production_deployments),
        ]);
    }
    output.push_str(&format!("{projects}\n\n"));

    output.push_str(&format!(
        "{} {}\n",
        bright("🏁"),
        bright("Velocity").underlined()
    ));
    let mut velocity = create_table();
    velocity.set_header(header_cells(&["Milestone", "Total", "Closed", "Defects"]));
    for milestone in &overview.velocity {
        velocity.add_row(vec![
            Cell::new(&milestone.title),
            Cell::new(milestone.total_weight),
            Cell::new(milestone.closed_weight),
            Cell::new(milestone.defect_count),
        ]);
    }
    output.push_str(&format!("{velocity}\n"));

    output
}
