use serde::{Deserialize, Serialize};

use crate::domain::{ArticleId, ArticleStatus, ClusterId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    /// Topic classification.
    #[serde(default)]
    pub pillar: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub engagement: f64,
    #[serde(default)]
    pub views: i64,
}

impl Article {
    pub fn new(id: impl Into<ArticleId>, status: ArticleStatus) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            author: String::new(),
            pillar: String::new(),
            url: String::new(),
            status,
            labels: Vec::new(),
            cover_image_url: String::new(),
            engagement: 0.0,
            views: 0,
        }
    }
}

fn default_edge_weight() -> f64 {
    -1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start: ArticleId,
    pub end: ArticleId,
    #[serde(default = "default_edge_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Cluster {
    pub fn new(id: impl Into<ClusterId>, name: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            articles,
            edges: Vec::new(),
        }
    }

    /// A cluster counts as reviewed once its lead article carries a non-default status.
    pub fn is_reviewed(&self) -> bool {
        self.articles
            .first()
            .map(|article| !article.status.is_default())
            .unwrap_or(false)
    }
}
