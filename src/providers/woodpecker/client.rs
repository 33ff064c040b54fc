use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{Result, WoodbarError};

use super::types::{RawPipeline, RawPipelineDetail, RawRepo};

/// Thin authenticated JSON client for the Woodpecker REST API.
pub struct WoodpeckerClient {
    client: Client,
    base_url: String,
    token: Token,
}

impl WoodpeckerClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("woodbar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WoodbarError::Config(format!("Failed to create HTTP client: {e}")))?;

        Url::parse(base_url).map_err(|e| WoodbarError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Server URL without trailing slash, used for API paths and web links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_repos(&self) -> Result<Vec<RawRepo>> {
        self.get_json("api/user/repos").await
    }

    /// Lists the most recent pipelines of a repository, newest first.
    ///
    /// `null` entries in the response are dropped.
    pub async fn fetch_pipelines(&self, repo_id: i64, per_page: usize) -> Result<Vec<RawPipeline>> {
        let pipelines: Vec<Option<RawPipeline>> = self
            .get_json(&format!("api/repos/{repo_id}/pipelines?per_page={per_page}"))
            .await?;

        Ok(pipelines.into_iter().flatten().collect())
    }

    pub async fn fetch_pipeline(&self, repo_id: i64, number: i64) -> Result<RawPipelineDetail> {
        self.get_json(&format!("api/repos/{repo_id}/pipelines/{number}"))
            .await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(WoodbarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
