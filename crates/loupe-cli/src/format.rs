//! Link and date collaborators for the activity renderer.

use std::fmt::Write;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use loupe_core::render::{DateFormatter, EntityLinkResolver};

/// Links to an entity's overview page in the catalog web UI.
#[derive(Debug, Clone)]
pub struct OverviewLinks {
  base_url: String,
}

impl OverviewLinks {
  pub fn new(base_url: &str) -> Self {
    Self { base_url: base_url.trim_end_matches('/').to_string() }
  }
}

impl EntityLinkResolver for OverviewLinks {
  fn entity_link(&self, entity_id: i64) -> String {
    format!("{}/dataentities/{entity_id}/overview", self.base_url)
  }
}

/// Formats timestamps in the local timezone with a strftime pattern. A
/// pattern chrono cannot format falls back to RFC 3339.
#[derive(Debug, Clone)]
pub struct LocalDates {
  pattern: String,
}

impl LocalDates {
  pub fn new(pattern: impl Into<String>) -> Self { Self { pattern: pattern.into() } }
}

impl DateFormatter for LocalDates {
  fn format_date(&self, at: &DateTime<Utc>) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.with_timezone(&Local).format(&self.pattern)).is_err() {
      return at.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
  }
}
