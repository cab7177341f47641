mod activity;
mod client;
mod milestones;
mod pipelines;
mod types;

pub use client::{GitLabClient, ServerVersion};
pub use types::{
    CommitRecord, DeploymentRecord, Environment, Issue, IssueWeights, Job, Milestone,
    MilestoneRecord, MilestoneState, PipelineRecord, PipelineStatus, TestReport,
};
