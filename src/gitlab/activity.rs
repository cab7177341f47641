use super::client::GitLabClient;
use super::types::{CommitRecord, DeploymentRecord};

impl GitLabClient {
    /// Commits on a ref within the look-back window, tagged with the owning
    /// project.
    pub async fn commits(&self, project_id: u64, ref_name: &str) -> Vec<CommitRecord> {
        let endpoint = format!(
            "/projects/{project_id}/repository/commits?ref_name={ref_name}&since={}",
            Self::horizon()
        );
        let mut commits: Vec<CommitRecord> = self.get_all_pages(&endpoint).await;
        for commit in &mut commits {
            commit.project_id = project_id;
        }
        commits
    }

    /// Successful deployments updated within the look-back window, tagged
    /// with the owning project.
    pub async fn deployments(&self, project_id: u64) -> Vec<DeploymentRecord> {
        let endpoint = format!(
            "/projects/{project_id}/deployments?status=success&updated_after={}",
            Self::horizon()
        );
        let mut deployments: Vec<DeploymentRecord> = self.get_all_pages(&endpoint).await;
        for deployment in &mut deployments {
            deployment.project_id = project_id;
        }
        deployments
    }
}
