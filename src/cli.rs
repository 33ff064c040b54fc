use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::Config;
use crate::providers::WoodpeckerProvider;
use crate::status::StatusReport;

#[derive(Parser, Debug)]
#[command(name = "woodbar")]
#[command(author, version, about = "Woodpecker CI status for menu-bar widgets", long_about = None)]
pub struct Cli {
    /// Woodpecker server URL
    #[arg(short, long, env = "WOODPECKER_URL")]
    url: Option<String>,

    /// Personal access token
    #[arg(short, long, env = "WOODPECKER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// List the recent pipelines of one repository instead of the overview
    #[arg(long, default_value_t = false)]
    pipelines: bool,

    /// Repository ID for --pipelines
    #[arg(short, long)]
    repo: Option<i64>,

    /// Number of pipelines listed with --pipelines
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// What a single invocation does once flags and config are merged.
#[derive(Debug, PartialEq)]
enum Mode {
    NoToken,
    Status {
        token: Token,
    },
    Pipelines {
        token: Token,
        repo_id: i64,
        count: usize,
    },
}

#[derive(Debug)]
struct Settings {
    url: String,
    pretty: bool,
    mode: Mode,
}

impl Cli {
    /// Merges flags (and their environment variables) over the config file.
    fn resolve(&self, config: Config) -> Settings {
        let url = self.url.clone().unwrap_or(config.server.url);
        let pretty = self.pretty || config.output.pretty;
        let token = self
            .token
            .as_deref()
            .or(config.server.token.as_deref())
            .and_then(Token::new);

        let mode = match (token, self.pipelines, self.repo) {
            (None, _, _) => Mode::NoToken,
            (Some(token), true, Some(repo_id)) if repo_id != 0 => Mode::Pipelines {
                token,
                repo_id,
                count: self.count.unwrap_or(config.pipelines.count),
            },
            (Some(token), pipelines, _) => {
                if pipelines {
                    warn!("--pipelines needs --repo, showing the repository overview instead");
                }
                Mode::Status { token }
            }
        };

        Settings { url, pretty, mode }
    }

    /// Loads the config file. Without a token from flags or environment a
    /// broken file cannot supply one either, so it degrades to defaults and
    /// the run still ends in the no-token envelope.
    fn load_config(&self) -> Result<Config> {
        match Config::load(self.config.as_deref()) {
            Ok(config) => Ok(config),
            Err(e) if self.token.as_deref().and_then(Token::new).is_none() => {
                warn!("Ignoring config file: {e:#}");
                Ok(Config::default())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        let settings = self.resolve(config);

        match settings.mode {
            Mode::NoToken => {
                info!("No token configured");
                emit(&StatusReport::no_token(Utc::now()), settings.pretty)
            }
            Mode::Pipelines {
                token,
                repo_id,
                count,
            } => {
                info!("Fetching {count} recent pipelines for repo {repo_id}");
                let provider = WoodpeckerProvider::new(&settings.url, token)?;
                let report = provider.collect_pipelines(repo_id, count).await;
                emit(&report, settings.pretty)
            }
            Mode::Status { token } => {
                info!("Collecting repository status from {}", settings.url);
                let provider = WoodpeckerProvider::new(&settings.url, token)?;
                let report = provider.collect_status().await?;
                emit(&report, settings.pretty)
            }
        }
    }
}

/// Writes the envelope as the single JSON document on stdout.
fn emit(value: &impl Serialize, pretty: bool) -> Result<()> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    println!("{json_output}");
    Ok(())
}
