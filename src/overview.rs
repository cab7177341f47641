use serde::{Deserialize, Serialize};

use crate::config::ProjectRef;
use crate::gitlab::{
    CommitRecord, DeploymentRecord, MilestoneRecord, PipelineRecord, PipelineStatus,
};

/// Per-project dashboard summary over the look-back window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectOverview {
    pub project_id: u64,
    pub project_name: String,
    pub ref_name: String,
    pub success_pipelines: usize,
    pub failed_pipelines: usize,
    pub latest_status: Option<PipelineStatus>,
    pub latest_coverage: f64,
    /// Latest coverage minus the oldest in-window coverage
    pub coverage_trend: f64,
    pub latest_tests_total: u64,
    /// Latest test count minus the oldest in-window test count
    pub tests_trend: i64,
    pub commit_count: usize,
    pub staging_deployments: usize,
    pub production_deployments: usize,
}

/// Weight-based velocity for one milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneVelocity {
    pub title: String,
    pub total_weight: u64,
    pub closed_weight: u64,
    /// Issues carrying a `Bug::*` label
    pub defect_count: usize,
}

/// Full overview payload, suitable for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub group_name: String,
    pub projects: Vec<ProjectOverview>,
    pub velocity: Vec<MilestoneVelocity>,
}

/// Summarizes one project's records.
///
/// Trend fields compare the newest pipeline against the oldest one in the
/// window (by pipeline id, which GitLab assigns monotonically).
pub fn project_overview(
    project: &ProjectRef,
    pipelines: &[PipelineRecord],
    commits: &[CommitRecord],
    deployments: &[DeploymentRecord],
) -> ProjectOverview {
    let mut own: Vec<&PipelineRecord> = pipelines
        .iter()
        .filter(|record| record.project_id == project.id)
        .collect();
    own.sort_by_key(|record| record.id);

    let success_pipelines = own
        .iter()
        .filter(|record| record.status == PipelineStatus::Success)
        .count();
    let failed_pipelines = own
        .iter()
        .filter(|record| record.status == PipelineStatus::Failed)
        .count();

    let first = own.first();
    let latest = own.last();

    let project_name = latest
        .map(|record| record.project_name.clone())
        .unwrap_or_default();
    let latest_status = latest.map(|record| record.status);
    let latest_coverage = latest.map(|record| record.coverage).unwrap_or(0.0);
    let coverage_trend =
        latest_coverage - first.map(|record| record.coverage).unwrap_or(0.0);
    let latest_tests_total = latest
        .map(|record| record.test_report.total_count)
        .unwrap_or(0);
    let to_signed = |count: u64| i64::try_from(count).unwrap_or(i64::MAX);
    let tests_trend = to_signed(latest_tests_total)
        - to_signed(first.map(|record| record.test_report.total_count).unwrap_or(0));

    let commit_count = commits
        .iter()
        .filter(|commit| commit.project_id == project.id)
        .count();

    let own_deployments = deployments
        .iter()
        .filter(|deployment| deployment.project_id == project.id);
    let (mut staging_deployments, mut production_deployments) = (0, 0);
    for deployment in own_deployments {
        match deployment.environment.name.as_str() {
            "staging" => staging_deployments += 1,
            "production" => production_deployments += 1,
            _ => {}
        }
    }

    ProjectOverview {
        project_id: project.id,
        project_name,
        ref_name: project.ref_name.clone(),
        success_pipelines,
        failed_pipelines,
        latest_status,
        latest_coverage,
        coverage_trend,
        latest_tests_total,
        tests_trend,
        commit_count,
        staging_deployments,
        production_deployments,
    }
}

/// Weight totals per milestone, in the milestones' given (title-sorted) order.
pub fn milestone_velocity(milestones: &[MilestoneRecord]) -> Vec<MilestoneVelocity> {
    milestones
        .iter()
        .map(|record| {
            let weights = record.weights();
            let defect_count = record
                .issues
                .iter()
                .filter(|issue| issue.labels.iter().any(|label| label.starts_with("Bug::")))
                .count();

            MilestoneVelocity {
                title: record.milestone.title.clone(),
                total_weight: weights.total,
                closed_weight: weights.closed,
                defect_count,
            }
        })
        .collect()
}
