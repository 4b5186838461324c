/* src/cli/core/src/main.rs */

mod check;
mod config;
mod fetch;
mod replay;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use prewarm_core::{LIVE_SLOT_KEY, PageDataFetcher};
use prewarm_fetch::{NextDataFetcher, NextDataOptions};
use tracing_subscriber::{EnvFilter, fmt};

use config::{PrewarmConfig, find_prewarm_config, load_prewarm_config, resolve_explicit_config};

#[derive(Parser)]
#[command(name = "prewarm", about = "Prewarm prerender scheduler CLI")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Validate prewarm.toml and show how paths resolve to pages
  Check {
    /// Path to prewarm.toml or its directory (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Raw paths or hrefs to resolve against the configured pages
    #[arg(short, long = "path")]
    paths: Vec<String>,
  },
  /// Replay a recorded JSON event trace through the scheduler
  Replay {
    /// Trace file: a JSON array of events
    trace: PathBuf,
    /// Path to prewarm.toml or its directory (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Request page data from the [data] endpoint instead of echoing paths
    #[arg(long)]
    live: bool,
    /// Print the step reports as JSON
    #[arg(long)]
    json: bool,
  },
  /// Fetch one page's data from the data endpoint
  Fetch {
    /// Page path (locale prefix and query are dropped)
    path: String,
    #[arg(short, long)]
    locale: Option<String>,
    /// Path to prewarm.toml or its directory (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides data.base_url
    #[arg(long)]
    base_url: Option<String>,
    /// Overrides data.build_id
    #[arg(long)]
    build_id: Option<String>,
  },
}

fn init_tracing() -> Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init().map_err(|e| anyhow!(e))
}

/// Try to load prewarm.toml from cwd upward; returns None if not found
fn try_load_config() -> Option<PrewarmConfig> {
  let cwd = std::env::current_dir().ok()?;
  let path = find_prewarm_config(&cwd).ok()?;
  load_prewarm_config(&path).ok()
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, PrewarmConfig)> {
  let path = match explicit {
    Some(p) => resolve_explicit_config(&p)?,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_prewarm_config(&cwd)?
    }
  };
  let config = load_prewarm_config(&path)?;
  Ok((path, config))
}

async fn run_replay(trace: &Path, config: &PrewarmConfig, live: bool, json: bool) -> Result<()> {
  let events = replay::load_trace(trace)?;
  let fetcher: Arc<dyn PageDataFetcher> = if live {
    let options = config.data()?.clone();
    Arc::new(NextDataFetcher::new(options).context("failed to build HTTP client")?)
  } else {
    replay::echo_fetcher()
  };
  let reports = replay::replay(config, events, fetcher).await?;

  if json {
    println!("{}", serde_json::to_string_pretty(&reports)?);
    return Ok(());
  }
  ui::banner("replay");
  let total = reports.len();
  for report in &reports {
    match &report.note {
      Some(note) => ui::step(report.step, total, &format!("{} ({note})", report.event)),
      None => ui::step(report.step, total, &report.event),
    }
    let warm = if report.warm.is_empty() { "-".to_string() } else { report.warm.join(" ") };
    ui::label("warm", &warm);
    let visible = if report.visible == LIVE_SLOT_KEY { "live" } else { report.visible.as_str() };
    ui::label("visible", visible);
  }
  ui::blank();
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing()?;
  let cli = Cli::parse();

  match cli.command {
    Command::Check { config, paths } => {
      let (config_path, prewarm_config) = resolve_config(config)?;
      check::run_check(&config_path, &prewarm_config, &paths)?;
    }
    Command::Replay { trace, config, live, json } => {
      let (_, prewarm_config) = resolve_config(config)?;
      run_replay(&trace, &prewarm_config, live, json).await?;
    }
    Command::Fetch { path, locale, config, base_url, build_id } => {
      let cfg = match config {
        Some(explicit) => Some(load_prewarm_config(&explicit)?),
        None => try_load_config(),
      };
      let mut options = cfg.as_ref().and_then(|c| c.data.clone());
      if let (Some(base_url), Some(build_id)) = (&base_url, &build_id) {
        options = Some(NextDataOptions::new(base_url, build_id));
      } else if let Some(ref mut options) = options {
        if let Some(base_url) = base_url {
          options.base_url = base_url;
        }
        if let Some(build_id) = build_id {
          options.build_id = build_id;
        }
      }
      let options = options
        .context("no data endpoint: pass --base-url and --build-id or add [data] to prewarm.toml")?;
      let locales = cfg.map(|c| c.prerender.locales).unwrap_or_default();
      let props = fetch::fetch_page(options, &locales, &path, locale.as_deref()).await?;
      println!("{}", serde_json::to_string_pretty(&props)?);
    }
  }

  Ok(())
}
