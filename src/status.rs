use serde::{Deserialize, Serialize};

use crate::config::ProjectRef;
use crate::gitlab::{GitLabClient, PipelineStatus};

/// Bootstrap-style severity color for a status card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Success,
    Warning,
    Danger,
    Secondary,
}

/// Everything the live view shows for one project: the latest pipeline, the
/// jobs worth naming for its state, and a test summary when it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCard {
    pub project_id: u64,
    pub project_name: String,
    pub ref_name: String,
    /// `None` is the sentinel for "no pipeline on this ref yet"
    pub status: Option<PipelineStatus>,
    /// Seconds
    pub duration: u64,
    pub coverage: f64,
    pub web_url: String,
    pub jobs: Vec<String>,
    pub test_summary: Option<String>,
}

impl StatusCard {
    fn empty(project: &ProjectRef) -> Self {
        Self {
            project_id: project.id,
            project_name: String::new(),
            ref_name: project.ref_name.clone(),
            status: None,
            duration: 0,
            coverage: 0.0,
            web_url: String::new(),
            jobs: Vec::new(),
            test_summary: None,
        }
    }

    pub fn color(&self) -> CardColor {
        status_color(self.status)
    }
}

/// Severity color for a pipeline status, `None` meaning "no data".
pub fn status_color(status: Option<PipelineStatus>) -> CardColor {
    match status {
        Some(PipelineStatus::Success) => CardColor::Success,
        Some(PipelineStatus::Running) => CardColor::Warning,
        Some(PipelineStatus::Failed) => CardColor::Danger,
        _ => CardColor::Secondary,
    }
}

/// Builds the live status card for one project from its latest pipeline.
///
/// Failed or canceled pipelines list their failed/canceled jobs; running or
/// manual ones list the jobs still in flight. A failed pipeline with a
/// non-empty test report gets a one-line test summary.
pub async fn status_card(client: &GitLabClient, project: &ProjectRef) -> StatusCard {
    let Some(pipeline) = client.latest_pipeline(project.id, &project.ref_name).await else {
        return StatusCard::empty(project);
    };

    let jobs = match pipeline.status {
        PipelineStatus::Failed | PipelineStatus::Canceled => {
            client.inactive_jobs(project.id, pipeline.id).await
        }
        PipelineStatus::Running | PipelineStatus::Manual => {
            client.active_jobs(project.id, pipeline.id).await
        }
        _ => Vec::new(),
    };
    let jobs = jobs.into_iter().map(|job| job.name).collect();

    let test_summary = if pipeline.status == PipelineStatus::Failed {
        client
            .test_report(project.id, pipeline.id)
            .await
            .filter(|report| report.total_count > 0)
            .map(|report| {
                format!(
                    "Total ({}): Success ({}), Skipped ({}), Failed ({})",
                    report.total_count,
                    report.success_count,
                    report.skipped_count,
                    report.failed_count
                )
            })
    } else {
        None
    };

    StatusCard {
        project_id: project.id,
        project_name: pipeline.project_name,
        ref_name: project.ref_name.clone(),
        status: Some(pipeline.status),
        duration: pipeline.duration,
        coverage: pipeline.coverage,
        web_url: pipeline.web_url,
        jobs,
        test_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use serde_json::json;
    use std::time::Duration;

    fn project(id: u64) -> ProjectRef {
        ProjectRef {
            id,
            ref_name: "main".to_string(),
        }
    }

    async fn test_client(server: &mut mockito::ServerGuard) -> GitLabClient {
        server
            .mock("GET", "/version")
            .with_status(200)
            .with_body(json!({ "version": "16.0.1" }).to_string())
            .create_async()
            .await;
        GitLabClient::new(&server.url(), Some(Token::from("t")), Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[test]
    fn test_color_mapping() {
        let mut card = StatusCard::empty(&project(1));
        assert_eq!(card.color(), CardColor::Secondary);

        card.status = Some(PipelineStatus::Success);
        assert_eq!(card.color(), CardColor::Success);
        card.status = Some(PipelineStatus::Running);
        assert_eq!(card.color(), CardColor::Warning);
        card.status = Some(PipelineStatus::Failed);
        assert_eq!(card.color(), CardColor::Danger);
        card.status = Some(PipelineStatus::Manual);
        assert_eq!(card.color(), CardColor::Secondary);
    }

    #[tokio::test]
    async fn test_card_without_pipeline_is_sentinel() {
        let mut server = mockito::Server::new_async().await;
        let client = test_client(&mut server).await;

        server
            .mock("GET", "/projects/4/pipelines?ref=main&page=1&per_page=1")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let card = status_card(&client, &project(4)).await;
        assert!(card.status.is_none());
        assert_eq!(card.project_id, 4);
        assert!(card.jobs.is_empty());
    }

    #[tokio::test]
    async fn test_failed_card_lists_jobs_and_test_summary() {
        let mut server = mockito::Server::new_async().await;
        let client = test_client(&mut server).await;

        server
            .mock("GET", "/projects/4/pipelines?ref=main&page=1&per_page=1")
            .with_status(200)
            .with_body(
                json!([{"id": 50, "status": "failed", "ref": "main", "sha": "f00",
                        "web_url": "https://example.com/p/50"}])
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/projects/4")
            .with_status(200)
            .with_body(json!({ "name": "billing" }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/projects/4/pipelines/50")
            .with_status(200)
            .with_body(json!({ "coverage": "61.2", "duration": 95 }).to_string())
            .create_async()
            .await;
        server
            .mock(
                "GET",
                "/projects/4/pipelines/50/jobs?scope[]=failed&scope[]=canceled",
            )
            .with_status(200)
            .with_body(
                json!([
                    {"id": 1, "name": "unit-tests", "status": "failed"},
                    {"id": 2, "name": "lint", "status": "canceled"}
                ])
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/projects/4/pipelines/50/test_report")
            .with_status(200)
            .with_body(
                json!({ "total_count": 12, "success_count": 9, "skipped_count": 1,
                        "failed_count": 2 })
                .to_string(),
            )
            .create_async()
            .await;

        let card = status_card(&client, &project(4)).await;
        assert_eq!(card.status, Some(PipelineStatus::Failed));
        assert_eq!(card.project_name, "billing");
        assert_eq!(card.jobs, vec!["unit-tests", "lint"]);
        assert_eq!(
            card.test_summary.as_deref(),
            Some("Total (12): Success (9), Skipped (1), Failed (2)")
        );
        assert_eq!(card.color(), CardColor::Danger);
    }

    #[tokio::test]
    async fn test_running_card_lists_active_jobs_without_summary() {
        let mut server = mockito::Server::new_async().await;
        let client = test_client(&mut server).await;

        server
            .mock("GET", "/projects/4/pipelines?ref=main&page=1&per_page=1")
            .with_status(200)
            .with_body(
                json!([{"id": 51, "status": "running", "ref": "main", "sha": "0ff",
                        "web_url": ""}])
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/projects/4")
            .with_status(200)
            .with_body(json!({ "name": "billing" }).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/projects/4/pipelines/51")
            .with_status(200)
            .with_body(json!({ "coverage": null, "duration": null }).to_string())
            .create_async()
            .await;
        server
            .mock(
                "GET",
                "/projects/4/pipelines/51/jobs?scope[]=pending&scope[]=running&scope[]=manual",
            )
            .with_status(200)
            .with_body(json!([{"id": 3, "name": "deploy", "status": "running"}]).to_string())
            .create_async()
            .await;

        let card = status_card(&client, &project(4)).await;
        assert_eq!(card.status, Some(PipelineStatus::Running));
        assert_eq!(card.jobs, vec!["deploy"]);
        assert!(card.test_summary.is_none());
        assert_eq!(card.color(), CardColor::Warning);
    }
}
