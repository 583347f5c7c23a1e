//! Layered configuration: defaults, then the TOML file, then `LOUPE_*`
//! environment variables, then command-line flags.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::format::StrftimeItems;
use clap::Parser;
use loupe_core::{activity::ActivityEventType, query::ActivityFeedType};
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "loupe", about = "Terminal viewer for a data catalog's activity feed")]
pub struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Base URL of the catalog platform (default: http://localhost:8080).
  #[arg(long)]
  pub url: Option<String>,

  /// Bearer token sent with every API request.
  #[arg(long)]
  pub token: Option<String>,

  /// How many days of activity to load.
  #[arg(long)]
  pub days: Option<i64>,

  /// Activities per page (1-100).
  #[arg(long)]
  pub page_size: Option<i64>,

  /// Feed to open: all, my_objects, downstream or upstream.
  #[arg(long)]
  pub feed: Option<ActivityFeedType>,

  /// Only show activities of this event type, e.g. DESCRIPTION_UPDATED.
  #[arg(long, value_parser = known_event_type)]
  pub event_type: Option<ActivityEventType>,

  /// Open this entity's page instead of the feed.
  #[arg(long, value_name = "ID")]
  pub entity: Option<i64>,

  /// Start with activity details collapsed.
  #[arg(long)]
  pub hide_details: bool,

  /// Write logs to this file (the terminal is taken by the UI).
  #[arg(long, value_name = "FILE")]
  pub log_file: Option<PathBuf>,
}

/// Like `FromStr`, minus the catch-all tag for unknown server events.
fn known_event_type(s: &str) -> Result<ActivityEventType, String> {
  match s.parse::<ActivityEventType>() {
    Ok(ActivityEventType::Unrecognized) | Err(_) => Err(format!("unknown event type `{s}`")),
    Ok(t) => Ok(t),
  }
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// The merged configuration the app runs with.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub url:          String,
  #[serde(default)]
  pub token:        Option<String>,
  /// strftime pattern for activity timestamps, in local time.
  pub date_format:  String,
  pub days:         i64,
  pub page_size:    u32,
  #[serde(default)]
  pub feed:         Option<ActivityFeedType>,
  #[serde(default)]
  pub event_type:   Option<ActivityEventType>,
  #[serde(default)]
  pub hide_details: bool,
  #[serde(default)]
  pub log_file:     Option<PathBuf>,
}

impl Settings {
  pub const DEFAULT_URL: &'static str = "http://localhost:8080";
  pub const DEFAULT_DATE_FORMAT: &'static str = "%-d %b %Y, %H:%M";

  pub fn load(args: &Args) -> Result<Self> {
    let mut builder = config::Config::builder()
      .set_default("url", Self::DEFAULT_URL)?
      .set_default("date_format", Self::DEFAULT_DATE_FORMAT)?
      .set_default("days", 7_i64)?
      .set_default("page_size", 30_i64)?;

    if let Some(path) = &args.config {
      builder = builder.add_source(config::File::from(path.as_path()).required(true));
    }

    let settings = builder
      .add_source(config::Environment::with_prefix("LOUPE"))
      .set_override_option("url", args.url.clone())?
      .set_override_option("token", args.token.clone())?
      .set_override_option("days", args.days)?
      .set_override_option("page_size", args.page_size)?
      .set_override_option("feed", args.feed.map(|f| f.to_string()))?
      .set_override_option("event_type", args.event_type.map(|t| t.to_string()))?
      .set_override_option(
        "log_file",
        args.log_file.as_ref().map(|p| p.display().to_string()),
      )?
      .build()
      .context("reading configuration")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("invalid configuration")?;
    settings.hide_details |= args.hide_details;

    if let Err(e) = StrftimeItems::new(&settings.date_format).parse() {
      bail!("invalid date_format `{}`: {e}", settings.date_format);
    }
    if settings.event_type == Some(ActivityEventType::Unrecognized) {
      bail!("unknown event_type in configuration");
    }
    Ok(settings)
  }
}
