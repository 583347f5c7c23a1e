//! The `Catalog` trait: everything the viewer needs from the platform.
//!
//! Implemented by the HTTP client in `loupe-cli`. The UI depends on this
//! abstraction, not on any concrete transport, which keeps it testable
//! against an in-process stub.

use std::future::Future;

use crate::{
  activity::Activity,
  entity::DataEntityDetails,
  error::SaveFailure,
  query::{ActivityCounts, ActivityQuery},
};

/// Abstraction over the catalog platform's activity and entity endpoints.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tokio tasks.
pub trait Catalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Activity feed ─────────────────────────────────────────────────────

  /// One page of the global activity feed, newest first.
  fn list_activities<'a>(
    &'a self,
    query: &'a ActivityQuery,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + 'a;

  /// Totals for each feed type over the query's window and filters. The
  /// query's `feed` and cursor are ignored.
  fn activity_counts<'a>(
    &'a self,
    query: &'a ActivityQuery,
  ) -> impl Future<Output = Result<ActivityCounts, Self::Error>> + Send + 'a;

  /// One page of the activity of a single entity.
  fn entity_activities<'a>(
    &'a self,
    entity_id: i64,
    query: &'a ActivityQuery,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + 'a;

  // ── Entities ──────────────────────────────────────────────────────────

  fn entity_details(
    &self,
    entity_id: i64,
  ) -> impl Future<Output = Result<DataEntityDetails, Self::Error>> + Send + '_;

  /// Replace the entity's internal description. On success returns the text
  /// as stored.
  fn update_description(
    &self,
    entity_id: i64,
    text: String,
  ) -> impl Future<Output = Result<String, SaveFailure>> + Send + '_;
}
