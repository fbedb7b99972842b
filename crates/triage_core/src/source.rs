use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::Cluster;
use url::Url;

use crate::config::Settings;

/// Read side of the backend: one call returning every cluster, unpaged.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;
}

pub struct HttpClusterSource {
    http: Client,
    base_url: String,
}

impl HttpClusterSource {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.data_source_url()?, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ClusterSource for HttpClusterSource {
    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let clusters: Vec<Cluster> = self
            .http
            .get(format!("{}/clusters", self.base_url))
            .send()
            .await
            .with_context(|| format!("request to {}/clusters failed", self.base_url))?
            .error_for_status()?
            .json()
            .await
            .context("invalid cluster list payload")?;
        Ok(clusters)
    }
}

/// Serves a fixed collection; used for offline review of exported datasets.
pub struct StaticClusterSource {
    clusters: Vec<Cluster>,
}

impl StaticClusterSource {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster file '{}'", path.display()))?;
        let clusters = serde_json::from_str(&raw)
            .with_context(|| format!("invalid cluster json in '{}'", path.display()))?;
        Ok(Self { clusters })
    }
}

#[async_trait]
impl ClusterSource for StaticClusterSource {
    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        Ok(self.clusters.clone())
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
