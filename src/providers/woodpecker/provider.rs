use std::cmp::Reverse;

use chrono::Utc;
use futures::future::join_all;
use log::{info, warn};

use crate::auth::Token;
use crate::error::Result;
use crate::status::{Pipeline, PipelinesReport, Repo, StatusReport, Step};

use super::client::WoodpeckerClient;
use super::links::repo_link;
use super::normalize::{flatten_steps, normalize_pipeline};
use super::types::RawRepo;

/// Woodpecker CI status provider.
///
/// Takes one snapshot of the user's active repositories, their last
/// pipelines and, for pipelines still in flight, their steps.
pub struct WoodpeckerProvider {
    client: WoodpeckerClient,
}

impl WoodpeckerProvider {
    /// Creates a provider for the given server.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = WoodpeckerClient::new(base_url, token)?;
        Ok(Self { client })
    }

    /// Fetches active repositories, most recently built first, with steps
    /// attached to running and pending pipelines.
    ///
    /// Repositories with equal (or no) pipeline timestamps keep the order the
    /// server returned them in.
    ///
    /// # Errors
    ///
    /// Fails only when the repository list itself cannot be fetched. Step
    /// lookups that fail leave that repository's steps empty.
    pub async fn fetch_repos(&self) -> Result<Vec<Repo>> {
        let raw_repos = self.client.fetch_repos().await?;
        info!("Fetched {} repositories", raw_repos.len());

        let mut repos: Vec<Repo> = raw_repos
            .into_iter()
            .filter(|raw| raw.active == Some(true))
            .map(|raw| self.transform_repo(raw))
            .collect();

        // sort_by_key is stable
        repos.sort_by_key(|repo| Reverse(repo.last_activity()));

        self.attach_steps(&mut repos).await;

        Ok(repos)
    }

    fn transform_repo(&self, raw: RawRepo) -> Repo {
        let id = raw.id.unwrap_or(0);
        let last_pipeline = normalize_pipeline(raw.last_pipeline);
        let link = repo_link(
            self.client.base_url(),
            id,
            last_pipeline.as_ref().map(|p| p.number),
        );

        Repo {
            id,
            name: raw.name.unwrap_or_default(),
            full_name: raw.full_name.unwrap_or_default(),
            active: true,
            last_pipeline,
            link,
        }
    }

    /// Fetches step detail for every in-flight pipeline concurrently and
    /// writes it back by index.
    async fn attach_steps(&self, repos: &mut [Repo]) {
        let targets: Vec<(usize, i64, i64)> = repos
            .iter()
            .enumerate()
            .filter_map(|(index, repo)| {
                let pipeline = repo.last_pipeline.as_ref()?;
                pipeline
                    .is_active()
                    .then_some((index, repo.id, pipeline.number))
            })
            .collect();

        if targets.is_empty() {
            return;
        }

        info!("Fetching steps for {} active pipelines...", targets.len());

        let futures = targets
            .iter()
            .map(|&(_, repo_id, number)| self.fetch_steps(repo_id, number));
        let results = join_all(futures).await;

        for ((index, _, _), steps) in targets.into_iter().zip(results) {
            if let Some(pipeline) = repos[index].last_pipeline.as_mut() {
                pipeline.steps = steps;
            }
        }
    }

    async fn fetch_steps(&self, repo_id: i64, number: i64) -> Vec<Step> {
        match self.client.fetch_pipeline(repo_id, number).await {
            Ok(detail) => flatten_steps(detail),
            Err(e) => {
                warn!("Failed to fetch steps for repo {repo_id} pipeline {number}: {e}");
                Vec::new()
            }
        }
    }

    /// Fetches the last `count` pipelines of one repository in server order.
    ///
    /// Any failure yields an empty list.
    pub async fn fetch_recent_pipelines(&self, repo_id: i64, count: usize) -> Vec<Pipeline> {
        match self.client.fetch_pipelines(repo_id, count).await {
            Ok(raw) => raw
                .into_iter()
                .filter_map(|p| normalize_pipeline(Some(p)))
                .collect(),
            Err(e) => {
                warn!("Failed to fetch pipelines for repo {repo_id}: {e}");
                Vec::new()
            }
        }
    }

    /// Collects the status snapshot printed in the default mode.
    pub async fn collect_status(&self) -> Result<StatusReport> {
        let repos = self.fetch_repos().await?;
        let report = StatusReport::new(repos, Utc::now());

        info!(
            "{} repositories, {} running, {} failing",
            report.repos.len(),
            report.running,
            report.failing
        );

        Ok(report)
    }

    pub async fn collect_pipelines(&self, repo_id: i64, count: usize) -> PipelinesReport {
        let pipelines = self.fetch_recent_pipelines(repo_id, count).await;

        PipelinesReport {
            pipelines,
            timestamp: Utc::now(),
        }
    }
}
