use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::cache::RefreshCache;
use crate::config::{Config, ProjectRef};
use crate::error::Result;
use crate::gitlab::{CommitRecord, DeploymentRecord, GitLabClient, MilestoneRecord, PipelineRecord};

/// Cached cross-project dashboard data.
///
/// Merges per-project aggregations behind two cache tiers: a short one for
/// pipelines, commits, and deployments, and an hourly one for milestones,
/// which change rarely and cost the most API calls. Projects are fetched
/// sequentially; one project failing its fetch contributes no records but
/// never suppresses the others.
pub struct Dashboard {
    client: Arc<GitLabClient>,
    group_id: u64,
    milestone_filter: String,
    projects: Vec<ProjectRef>,
    short: RefreshCache,
    hourly: RefreshCache,
}

impl Dashboard {
    /// # Errors
    ///
    /// Returns a configuration error when no projects or group are
    /// configured; the dashboard would have nothing to show.
    pub fn new(client: Arc<GitLabClient>, config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            client,
            group_id: config.gitlab.group_id.unwrap_or_default(),
            milestone_filter: config.gitlab.milestone_filter.clone(),
            projects: config.gitlab.projects.clone(),
            short: RefreshCache::new(Duration::from_secs(config.refresh.short_ttl_secs)),
            hourly: RefreshCache::new(Duration::from_secs(config.refresh.hourly_ttl_secs)),
        })
    }

    pub fn projects(&self) -> &[ProjectRef] {
        &self.projects
    }

    pub fn group_id(&self) -> u64 {
        self.group_id
    }

    /// Finished pipelines across all watched projects, from the short tier.
    pub async fn pipeline_data(&self) -> Result<Vec<PipelineRecord>> {
        self.short
            .get_or_refresh("pipelines", || async {
                info!("Composing pipeline data");
                let mut records = Vec::new();
                for project in &self.projects {
                    records.extend(self.client.pipelines(project.id, &project.ref_name).await);
                }
                info!("Finished composing pipeline data ({} records)", records.len());
                Ok(records)
            })
            .await
    }

    /// Commits across all watched projects, from the short tier.
    pub async fn commit_data(&self) -> Result<Vec<CommitRecord>> {
        self.short
            .get_or_refresh("commits", || async {
                info!("Composing commit data");
                let mut records = Vec::new();
                for project in &self.projects {
                    records.extend(self.client.commits(project.id, &project.ref_name).await);
                }
                info!("Finished composing commit data ({} records)", records.len());
                Ok(records)
            })
            .await
    }

    /// Successful deployments across all watched projects, from the short tier.
    pub async fn deployment_data(&self) -> Result<Vec<DeploymentRecord>> {
        self.short
            .get_or_refresh("deployments", || async {
                info!("Composing deployment data");
                let mut records = Vec::new();
                for project in &self.projects {
                    records.extend(self.client.deployments(project.id).await);
                }
                info!(
                    "Finished composing deployment data ({} records)",
                    records.len()
                );
                Ok(records)
            })
            .await
    }

    /// Recent group milestones with their issues, from the hourly tier.
    pub async fn milestone_data(&self) -> Result<Vec<MilestoneRecord>> {
        self.hourly
            .get_or_refresh("milestones", || async {
                info!("Composing milestone data");
                let records = self
                    .client
                    .milestones(self.group_id, &self.milestone_filter)
                    .await;
                info!(
                    "Finished composing milestone data ({} milestones)",
                    records.len()
                );
                Ok(records)
            })
            .await
    }
}
