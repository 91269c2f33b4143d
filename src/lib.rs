pub mod api;
pub mod config;
pub mod model;
pub mod search;
pub mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::{ApiError, HttpSearchApi, SearchApi};
use config::PatchyConfig;
use model::SearchResult;
use search::query_sync::{MIN_QUERY_CHARS, is_searchable};
use ui::markup;
use ui::route::Route;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "patchy",
    version,
    about = "Terminal search client for the Patchy mailing-list search API"
)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, e.g. http://localhost:7788/api
    #[arg(long, global = true)]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch interactive TUI
    Tui {
        /// Start route, e.g. "/?q=btrfs" or "/result/42"
        #[arg(long, default_value = "/")]
        route: String,

        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,

        /// Override data dir (log file and UI state)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Search once and print the results
    Search {
        query: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch a single result by id
    Show {
        id: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tui {
            route,
            once,
            data_dir,
        } => {
            let data_dir = data_dir.unwrap_or_else(default_data_dir);
            let _log_guard = init_file_logging(&data_dir);
            let config = load_config(cli.config.as_deref(), cli.api)?;
            let start: Route = route.parse()?;
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || {
                ui::tui::run_tui(&config, start, &data_dir, once, runtime)
            })
            .await
            .context("tui thread panicked")?
        }
        Commands::Search { query, json } => {
            init_stderr_logging();
            let config = load_config(cli.config.as_deref(), cli.api)?;
            run_search(&config, &query, json).await
        }
        Commands::Show { id, json } => {
            init_stderr_logging();
            let config = load_config(cli.config.as_deref(), cli.api)?;
            run_show(&config, &id, json).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "patchy", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, api: Option<String>) -> Result<PatchyConfig> {
    let mut config = PatchyConfig::load(path)?;
    config.apply_env()?;
    if let Some(api) = api {
        config.api_base_url = api;
    }
    config.validate()?;
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The TUI owns the terminal, so its logs go to `<data dir>/patchy.log`.
/// The returned guard flushes the writer when dropped.
fn init_file_logging(data_dir: &Path) -> Option<WorkerGuard> {
    std::fs::create_dir_all(data_dir).ok()?;
    let appender = tracing_appender::rolling::never(data_dir, "patchy.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .ok()?;
    Some(guard)
}

fn api_failure(err: ApiError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

async fn run_search(config: &PatchyConfig, query: &str, json: bool) -> Result<()> {
    if !is_searchable(query) {
        anyhow::bail!("query must be at least {MIN_QUERY_CHARS} characters");
    }
    let api = HttpSearchApi::new(&config.api_base_url, config.http_timeout())?;
    let hits = api.search(query).await.map_err(api_failure)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    if hits.is_empty() {
        println!("No results");
    }
    for hit in &hits {
        print_result(hit);
    }
    Ok(())
}

async fn run_show(config: &PatchyConfig, id: &str, json: bool) -> Result<()> {
    let api = HttpSearchApi::new(&config.api_base_url, config.http_timeout())?;
    let result = api.get_result(id).await.map_err(api_failure)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &SearchResult) {
    println!(
        "#{}  {}",
        markup::strip_controls(&result.id),
        markup::strip_controls(&result.url)
    );
    for line in markup::plain_text(&result.text).lines() {
        println!("    {line}");
    }
    println!();
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "patchy", "patchy")
        .map_or_else(|| PathBuf::from(".patchy"), |dirs| dirs.data_dir().to_path_buf())
}
