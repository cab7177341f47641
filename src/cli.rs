use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use crate::auth::Token;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::gitlab::GitLabClient;
use crate::output;
use crate::overview::{milestone_velocity, project_overview, Overview};
use crate::status::{status_card, StatusCard};

#[derive(Parser)]
#[command(name = "pipewatch")]
#[command(author, version, about = "GitLab status dashboard for your terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./pipewatch.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitLab private token
    #[arg(short, long, global = true, env = "GITLAB_TOKEN")]
    token: Option<String>,

    /// Write the result as JSON to a file instead of rendering tables
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest pipeline status card for each project
    Status,

    /// Show aggregated activity and velocity for the look-back window
    Overview,

    /// Re-render the status cards on a fixed interval
    Watch {
        /// Seconds between redraws (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        if matches!(self.command, Commands::Watch { .. }) && self.output.is_some() {
            anyhow::bail!("--output cannot be combined with watch; use status for a JSON snapshot");
        }

        let mut config = Config::load(self.config.as_deref())?;
        if let Some(token) = &self.token {
            config.gitlab.token = Some(token.clone());
        }
        config.validate()?;

        let client = GitLabClient::new(
            &config.gitlab.api_url,
            config.gitlab.token.as_deref().map(Token::from),
            Duration::from_secs(config.http.timeout_secs),
        )
        .await?;

        match &self.command {
            Commands::Status => self.execute_status(&client, &config).await,
            Commands::Overview => self.execute_overview(client, &config).await,
            Commands::Watch { interval } => {
                let interval = interval.unwrap_or(config.refresh.status_interval_secs);
                self.execute_watch(&client, &config, interval).await
            }
        }
    }

    async fn fetch_cards(client: &GitLabClient, config: &Config) -> Vec<StatusCard> {
        let mut cards = Vec::with_capacity(config.gitlab.projects.len());
        for project in &config.gitlab.projects {
            cards.push(status_card(client, project).await);
        }
        cards
    }

    async fn execute_status(&self, client: &GitLabClient, config: &Config) -> Result<()> {
        let spinner = output::fetch_spinner("Fetching latest pipelines");
        let cards = Self::fetch_cards(client, config).await;
        spinner.finish_and_clear();

        self.emit(&cards, |cards| output::print_status_cards(cards))
    }

    async fn execute_overview(&self, client: GitLabClient, config: &Config) -> Result<()> {
        let client = Arc::new(client);
        let dashboard = Dashboard::new(Arc::clone(&client), config)?;

        let spinner = output::fetch_spinner("Fetching dashboard data");
        let pipelines = dashboard.pipeline_data().await?;
        let commits = dashboard.commit_data().await?;
        let deployments = dashboard.deployment_data().await?;
        let milestones = dashboard.milestone_data().await?;
        let group_name = client.group_name(dashboard.group_id()).await;
        spinner.finish_and_clear();

        let overview = Overview {
            group_name,
            projects: dashboard
                .projects()
                .iter()
                .map(|project| project_overview(project, &pipelines, &commits, &deployments))
                .collect(),
            velocity: milestone_velocity(&milestones),
        };

        self.emit(&overview, output::print_overview)
    }

    async fn execute_watch(
        &self,
        client: &GitLabClient,
        config: &Config,
        interval: u64,
    ) -> Result<()> {
        info!("Watching {} projects", config.gitlab.projects.len());
        let term = console::Term::stdout();

        loop {
            let cards = Self::fetch_cards(client, config).await;
            term.clear_screen()?;
            output::print_status_cards(&cards);
            output::print_watch_footer(interval);
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    }

    /// Writes JSON to the output path when one was given, otherwise renders
    /// through the provided printer.
    fn emit<T: serde::Serialize>(&self, value: &T, print: impl Fn(&T)) -> Result<()> {
        if let Some(output_path) = &self.output {
            let json_output = if self.pretty {
                serde_json::to_string_pretty(value)?
            } else {
                serde_json::to_string(value)?
            };
            std::fs::write(output_path, json_output)?;
            info!("Output written to: {}", output_path.display());
        } else {
            print(value);
        }
        Ok(())
    }
}
