use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{ArticleId, ClusterId},
    error::StoreError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use triage_core::{
    filters::{self, ReviewFilter},
    sorting::{self, SortSpec},
    ClusterSource, ClusterStore, GroupManager, GroupRegistry, HttpClusterSource, Settings,
    StaticClusterSource,
};

#[derive(Parser, Debug)]
#[command(about = "Triage clusters of syndicated articles")]
struct Args {
    /// Base url of the cluster backend; overrides triage.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Read clusters from an exported JSON file instead of the backend.
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filtered, sorted cluster list.
    List {
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        #[arg(long)]
        completed: bool,
        /// Sort keys, e.g. `articles:desc,name`.
        #[arg(long, value_delimiter = ',')]
        sort: Vec<SortSpec>,
        #[arg(long)]
        min_articles: Option<usize>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print a cluster's review groups, optionally moving articles first.
    Groups {
        cluster_id: String,
        /// `ARTICLE=GROUP`; may be repeated.
        #[arg(long = "assign", value_parser = parse_assignment)]
        assignments: Vec<(ArticleId, String)>,
    },
}

fn parse_assignment(raw: &str) -> Result<(ArticleId, String), String> {
    let (article, group) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ARTICLE=GROUP, got '{raw}'"))?;
    if article.trim().is_empty() {
        return Err(format!("missing article id in '{raw}'"));
    }
    Ok((ArticleId::from(article.trim()), group.trim().to_string()))
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Machine-readable form of a store failure, if the chain carries one.
fn failure_report(err: &anyhow::Error) -> Option<serde_json::Value> {
    let store_err = err.downcast_ref::<StoreError>()?;
    Some(serde_json::json!({
        "error": {
            "code": store_err.code(),
            "recoverable": store_err.is_recoverable(),
            "message": store_err.to_string(),
        }
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let json = args.json;
    let result = run(args).await;
    if let Err(err) = &result {
        if let Some(store_err) = err.downcast_ref::<StoreError>() {
            warn!(code = ?store_err.code(), error = %store_err, "cluster store request failed");
        }
        if json {
            if let Some(report) = failure_report(err) {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }
    result
}

async fn run(args: Args) -> Result<()> {
    let mut settings = triage_core::load_settings()?;
    if let Some(url) = &args.server_url {
        settings.data_source_url = url.clone();
    }
    init_tracing(&settings);

    let source: Arc<dyn ClusterSource> = match &args.source {
        Some(path) => Arc::new(StaticClusterSource::from_json_file(path)?),
        None => Arc::new(HttpClusterSource::from_settings(&settings)?),
    };
    let store = ClusterStore::new(source);
    let outcome = store.fetch().await.context("failed to load clusters")?;
    info!(?outcome, "clusters loaded");

    match args.command {
        Command::List {
            pending,
            completed,
            sort,
            min_articles,
            name,
        } => {
            list_clusters(&store, pending, completed, &sort, min_articles, name, args.json)?;
        }
        Command::Groups {
            cluster_id,
            assignments,
        } => {
            let registry = GroupRegistry::new();
            let manager = registry.manager_for_id(&store, &ClusterId::from(cluster_id))?;
            for (article_id, group) in &assignments {
                if !manager.assign_article(article_id, group) {
                    warn!(%article_id, %group, "assignment had no effect");
                }
            }
            print_groups(&manager, args.json)?;
        }
    }

    Ok(())
}

fn list_clusters(
    store: &ClusterStore,
    pending: bool,
    completed: bool,
    sort: &[SortSpec],
    min_articles: Option<usize>,
    name: Option<String>,
    json: bool,
) -> Result<()> {
    let selection = if pending || completed {
        ReviewFilter { pending, completed }
    } else {
        ReviewFilter::default()
    };
    filters::apply_review_filter(store, selection);
    if let Some(min) = min_articles {
        store.add_filter("min-articles", filters::min_articles(min));
    }
    if let Some(needle) = name {
        store.add_filter("name", filters::name_contains(&needle));
    }
    if !sort.is_empty() {
        store.set_sorter(sorting::sorter_from_specs(sort));
    }

    let view = store.snapshot();
    if json {
        let clusters: Vec<_> = view.iter().map(|cluster| cluster.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&clusters)?);
        return Ok(());
    }

    for cluster in view.iter() {
        let state = if cluster.is_reviewed() { "reviewed" } else { "pending" };
        println!(
            "{}\t{}\t{} articles\t{}",
            cluster.id,
            cluster.name,
            cluster.articles.len(),
            state
        );
    }
    println!("{} cluster(s)", view.len());
    Ok(())
}

fn print_groups(manager: &GroupManager, json: bool) -> Result<()> {
    let grouping = manager.grouping();
    if json {
        let groups: Vec<_> = grouping
            .iter()
            .map(|group| {
                serde_json::json!({
                    "name": group.name,
                    "articles": group.articles.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    println!("cluster {}", manager.cluster_id());
    for group in grouping.iter() {
        println!("{} ({})", group.name, group.articles.len());
        for article in &group.articles {
            println!("  {}\t{}", article.id, article.title);
        }
    }
    println!("addable: {}", grouping.addable_names().join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignment_pairs() {
        assert_eq!(
            parse_assignment("a1=combine"),
            Ok((ArticleId::from("a1"), "combine".to_string()))
        );
        assert_eq!(
            parse_assignment(" a2 = sports "),
            Ok((ArticleId::from("a2"), "sports".to_string()))
        );
        assert!(parse_assignment("a1").is_err());
        assert!(parse_assignment("=combine").is_err());
    }

    #[test]
    fn store_failures_report_their_code() {
        let err = anyhow::Error::new(StoreError::ClusterNotFound {
            id: ClusterId::from("c9"),
        })
        .context("failed to open cluster");
        let report = failure_report(&err).expect("store error in chain");
        assert_eq!(report["error"]["code"], "not_found");
        assert_eq!(report["error"]["recoverable"], false);
        assert_eq!(report["error"]["message"], "cluster c9 not found");

        let transport = anyhow::Error::new(StoreError::Transport("timed out".into()));
        assert_eq!(failure_report(&transport).expect("report")["error"]["code"], "transport");

        assert!(failure_report(&anyhow::anyhow!("bad settings")).is_none());
    }

    #[test]
    fn cli_accepts_sort_lists() {
        let args = Args::try_parse_from([
            "triage_cli",
            "list",
            "--pending",
            "--sort",
            "articles:desc,name",
        ])
        .expect("parse args");
        match args.command {
            Command::List { pending, sort, .. } => {
                assert!(pending);
                assert_eq!(sort.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
