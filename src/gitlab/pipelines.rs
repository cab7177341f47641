use log::warn;

use super::client::GitLabClient;
use super::types::{Job, Pipeline, PipelineDetail, PipelineRecord, TestReport};

/// Test reports were introduced with GitLab 13.
const TEST_REPORT_MIN_MAJOR: u32 = 13;

impl GitLabClient {
    /// All finished pipelines for a project ref within the look-back window,
    /// each enriched with its detail and test report.
    ///
    /// A failed detail or test-report sub-fetch zeroes the affected numeric
    /// fields; the pipeline record itself is always kept.
    pub async fn pipelines(&self, project_id: u64, ref_name: &str) -> Vec<PipelineRecord> {
        let endpoint = format!(
            "/projects/{project_id}/pipelines?ref={ref_name}&scope=finished&updated_after={}",
            Self::horizon()
        );
        let stubs: Vec<Pipeline> = self.get_all_pages(&endpoint).await;
        if stubs.is_empty() {
            return Vec::new();
        }

        // One name lookup per aggregation, not one per pipeline
        let project_name = self.project_name(project_id).await;

        let mut records = Vec::with_capacity(stubs.len());
        for stub in stubs {
            records.push(self.enrich(project_id, &project_name, stub, true).await);
        }
        records
    }

    /// The single most recent pipeline for a project ref, enriched with its
    /// detail. `None` when the project has no pipelines on that ref.
    pub async fn latest_pipeline(&self, project_id: u64, ref_name: &str) -> Option<PipelineRecord> {
        let endpoint = format!("/projects/{project_id}/pipelines?ref={ref_name}");
        let (stubs, _) = self.get_page::<Pipeline>(&endpoint, 1, 1).await;
        let stub = stubs.into_iter().next()?;

        let project_name = self.project_name(project_id).await;
        Some(self.enrich(project_id, &project_name, stub, false).await)
    }

    async fn enrich(
        &self,
        project_id: u64,
        project_name: &str,
        stub: Pipeline,
        with_test_report: bool,
    ) -> PipelineRecord {
        let detail: Option<PipelineDetail> = self
            .get_json(&format!("/projects/{project_id}/pipelines/{}", stub.id))
            .await;
        let (duration, coverage) = match detail {
            Some(detail) => (
                detail.duration.unwrap_or(0.0) as u64,
                detail.coverage.unwrap_or(0.0),
            ),
            None => (0, 0.0),
        };

        let test_report = if with_test_report {
            self.test_report(project_id, stub.id).await.unwrap_or_default()
        } else {
            TestReport::default()
        };

        PipelineRecord {
            id: stub.id,
            project_id,
            project_name: project_name.to_string(),
            ref_: stub.ref_,
            sha: stub.sha,
            status: stub.status,
            web_url: stub.web_url,
            created_at: stub.created_at,
            duration,
            coverage,
            test_report,
        }
    }

    /// Test report summary for a pipeline.
    ///
    /// Skipped with a warning when the server version is unknown or predates
    /// the endpoint.
    pub async fn test_report(&self, project_id: u64, pipeline_id: u64) -> Option<TestReport> {
        match self.version() {
            Some(version) if version.major >= TEST_REPORT_MIN_MAJOR => {
                self.get_json(&format!(
                    "/projects/{project_id}/pipelines/{pipeline_id}/test_report"
                ))
                .await
            }
            Some(version) => {
                warn!(
                    "GitLab version ({}) does not support the test_report endpoint",
                    version.raw
                );
                None
            }
            None => {
                warn!("GitLab version unknown; skipping test report for pipeline {pipeline_id}");
                None
            }
        }
    }

    /// Jobs currently pending, running, or waiting on manual action.
    pub async fn active_jobs(&self, project_id: u64, pipeline_id: u64) -> Vec<Job> {
        self.get_json(&format!(
            "/projects/{project_id}/pipelines/{pipeline_id}/jobs?scope[]=pending&scope[]=running&scope[]=manual"
        ))
        .await
        .unwrap_or_default()
    }

    /// Jobs that failed or were canceled.
    pub async fn inactive_jobs(&self, project_id: u64, pipeline_id: u64) -> Vec<Job> {
        self.get_json(&format!(
            "/projects/{project_id}/pipelines/{pipeline_id}/jobs?scope[]=failed&scope[]=canceled"
        ))
        .await
        .unwrap_or_default()
    }
}
