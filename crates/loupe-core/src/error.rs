//! Error types for `loupe-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("activity range begins at {begin} but ends earlier, at {end}")]
  InvertedRange {
    begin: DateTime<Utc>,
    end:   DateTime<Utc>,
  },

  #[error("page size must be between 1 and {max}, got {size}")]
  PageSize { size: u32, max: u32 },

  #[error("cannot go back {days} days")]
  DayRange { days: i64 },

  #[error("no known event type to filter by")]
  UnrecognizedEventType,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rejected description save.
///
/// Carries the server's status text when there was one (e.g. "Service
/// Unavailable"); [`SaveFailure::message`] falls back to a generic sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", save_message(.status_text))]
pub struct SaveFailure {
  pub status_text: Option<String>,
}

impl SaveFailure {
  pub const FALLBACK_MESSAGE: &'static str = "Unable to update description";

  pub fn new(status_text: impl Into<String>) -> Self {
    Self { status_text: Some(status_text.into()) }
  }

  /// The human-readable message shown next to the editor.
  pub fn message(&self) -> &str { save_message(&self.status_text) }
}

fn save_message(status_text: &Option<String>) -> &str {
  status_text
    .as_deref()
    .filter(|s| !s.is_empty())
    .unwrap_or(SaveFailure::FALLBACK_MESSAGE)
}
