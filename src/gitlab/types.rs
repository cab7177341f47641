use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Final status of a pipeline run.
///
/// Anything the server reports outside the known set (e.g. `skipped`,
/// `created`) collapses into `Unknown` rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Failed,
    Running,
    Manual,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Manual => "manual",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

/// Pipeline list item as returned by `/projects/:id/pipelines`.
///
/// The list endpoint carries no duration/coverage; those come from the
/// per-pipeline detail request.
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub status: PipelineStatus,
    #[serde(rename = "ref")]
    pub ref_: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub web_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Detail fields from `/projects/:id/pipelines/:pipeline_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineDetail {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Summary counts from `/projects/:id/pipelines/:pipeline_id/test_report`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestReport {
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub error_count: u64,
}

/// A pipeline enriched with its detail and test report, tagged with the
/// owning project. This is the record the dashboard aggregates over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: u64,
    pub project_id: u64,
    pub project_name: String,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub sha: String,
    pub status: PipelineStatus,
    pub web_url: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Seconds; 0 when the detail fetch failed or reported null
    pub duration: u64,
    /// Percentage; 0.0 when unknown
    pub coverage: f64,
    #[serde(flatten)]
    pub test_report: TestReport,
}

/// A repository commit tagged with the owning project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub project_id: u64,
    pub short_id: String,
    #[serde(default)]
    pub title: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
}

/// A deployment tagged with the owning project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(default)]
    pub project_id: u64,
    pub id: u64,
    pub status: String,
    pub environment: Environment,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    Active,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A group milestone ("sprint").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    pub state: MilestoneState,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// An issue attached to a milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub state: String,
    /// Null weights count as zero
    #[serde(default)]
    pub weight: Option<u64>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn weight_or_zero(&self) -> u64 {
        self.weight.unwrap_or(0)
    }
}

/// A selected milestone with its issue list attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneRecord {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub issues: Vec<Issue>,
}

impl MilestoneRecord {
    /// Total vs closed issue weight. Null weights count as zero.
    pub fn weights(&self) -> IssueWeights {
        let mut weights = IssueWeights::default();
        for issue in &self.issues {
            let weight = issue.weight_or_zero();
            weights.total += weight;
            if issue.state == "closed" {
                weights.closed += weight;
            }
        }
        weights
    }
}

/// A job within a pipeline, from the scoped job endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub stage: String,
}

/// Total vs closed issue weight for a group query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueWeights {
    pub total: u64,
    pub closed: u64,
}

/// GitLab reports pipeline coverage as a number, a numeric string, or null
/// depending on version and project settings. Normalize all three.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(Some(n)),
        Raw::Text(s) => Ok(s.trim().parse::<f64>().ok()),
        Raw::Null => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_status_unknown_catch_all() {
        let status: PipelineStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(status, PipelineStatus::Unknown);

        let status: PipelineStatus = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(status, PipelineStatus::Success);
    }

    #[test]
    fn test_detail_coverage_as_string() {
        let detail: PipelineDetail =
            serde_json::from_str(r#"{"coverage": "87.3", "duration": 61.0}"#).unwrap();
        assert_eq!(detail.coverage, Some(87.3));
        assert_eq!(detail.duration, Some(61.0));
    }

    #[test]
    fn test_detail_coverage_as_number() {
        let detail: PipelineDetail =
            serde_json::from_str(r#"{"coverage": 92.5, "duration": null}"#).unwrap();
        assert_eq!(detail.coverage, Some(92.5));
        assert_eq!(detail.duration, None);
    }

    #[test]
    fn test_detail_coverage_null_or_garbage() {
        let detail: PipelineDetail =
            serde_json::from_str(r#"{"coverage": null, "duration": 5}"#).unwrap();
        assert_eq!(detail.coverage, None);

        let detail: PipelineDetail =
            serde_json::from_str(r#"{"coverage": "n/a", "duration": 5}"#).unwrap();
        assert_eq!(detail.coverage, None);
    }

    #[test]
    fn test_issue_null_weight_defaults_to_zero() {
        let issue: Issue = serde_json::from_str(
            r#"{"id": 1, "state": "opened", "weight": null, "labels": ["Bug::major"]}"#,
        )
        .unwrap();
        assert_eq!(issue.weight_or_zero(), 0);
        assert_eq!(issue.labels, vec!["Bug::major"]);
    }

    #[test]
    fn test_milestone_weights_null_counts_as_zero() {
        let record: MilestoneRecord = serde_json::from_str(
            r#"{
                "id": 12, "title": "Sprint 12", "state": "active",
                "start_date": null, "due_date": null,
                "issues": [
                    {"id": 1, "state": "closed", "weight": 5, "labels": []},
                    {"id": 2, "state": "closed", "weight": null, "labels": []},
                    {"id": 3, "state": "opened", "weight": 2, "labels": []}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.weights(), IssueWeights { total: 7, closed: 5 });
    }

    #[test]
    fn test_test_report_missing_fields_default() {
        let report: TestReport = serde_json::from_str(r#"{"total_count": 10}"#).unwrap();
        assert_eq!(report.total_count, 10);
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.total_time, 0.0);
    }
}
