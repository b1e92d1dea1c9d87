//! wukong CLI
//!
//! Command-line interface for querying a Solr cluster with node failover

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use wukong_client::{Headers, QueryParams};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "wukong", version)]
#[command(about = "Failover client for Solr clusters", long_about = None)]
struct Cli {
    /// Path to a wukong.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Solr base URL, repeatable; tried in the given order
    #[arg(long = "host", global = true)]
    hosts: Vec<String>,

    /// Seed URL used to discover live nodes, repeatable
    #[arg(long = "discover", global = true)]
    discover: Vec<String>,

    /// Per-node timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get {
        /// Path relative to each node's base URL
        path: String,

        /// Query parameter as key=value, repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Header as name=value, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,
    },
    /// Send a POST request
    Post {
        /// Path relative to each node's base URL
        path: String,

        /// Query parameter as key=value, repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Header as name=value, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,

        /// Request body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
}

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn optional_params(pairs: Vec<(String, String)>) -> Option<QueryParams> {
    (!pairs.is_empty()).then(|| pairs.into_iter().collect())
}

fn optional_headers(pairs: Vec<(String, String)>) -> Option<Headers> {
    (!pairs.is_empty()).then(|| pairs.into_iter().collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.apply_overrides(&cli.hosts, &cli.discover, cli.timeout);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = config.client.connect().await?;
    tracing::debug!(hosts = client.master_hosts().len(), "client ready");

    let document = match cli.command {
        Commands::Get {
            path,
            params,
            headers,
        } => {
            client
                .get(&path, optional_params(params), optional_headers(headers))
                .await?
        }
        Commands::Post {
            path,
            params,
            headers,
            body,
            body_file,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => Some(body.into_bytes()),
                (None, Some(file)) => Some(std::fs::read(file)?),
                (None, None) => None,
            };
            client
                .post(
                    &path,
                    optional_params(params),
                    body,
                    optional_headers(headers),
                )
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&Value::Object(document))?);
    Ok(())
}
