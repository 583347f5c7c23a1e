//! Activity feed queries and keyset pagination.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error,
  Result,
  activity::{Activity, ActivityEventType},
};

/// Which slice of the feed to show.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ActivityFeedType {
  #[default]
  All,
  /// Entities the current user owns.
  MyObjects,
  /// Entities downstream of the user's entities in the lineage graph.
  Downstream,
  /// Entities upstream of the user's entities in the lineage graph.
  Upstream,
}

/// Per-feed activity totals, as shown in the feed tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
  #[serde(default)]
  pub total_count:      u64,
  #[serde(default)]
  pub my_objects_count: u64,
  #[serde(default)]
  pub downstream_count: u64,
  #[serde(default)]
  pub upstream_count:   u64,
}

/// Parameters for [`crate::catalog::Catalog::list_activities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
  pub begin_date:           DateTime<Utc>,
  pub end_date:             DateTime<Utc>,
  pub size:                 u32,
  pub datasource_id:        Option<i64>,
  pub namespace_id:         Option<i64>,
  pub tag_ids:              Vec<i64>,
  pub owner_ids:            Vec<i64>,
  pub user_ids:             Vec<i64>,
  pub feed:                 Option<ActivityFeedType>,
  pub event_type:           Option<ActivityEventType>,
  /// Keyset cursor: id of the last activity already shown.
  pub last_event_id:        Option<i64>,
  /// Keyset cursor: timestamp of the last activity already shown.
  pub last_event_date_time: Option<DateTime<Utc>>,
}

impl ActivityQuery {
  pub const DEFAULT_PAGE_SIZE: u32 = 30;
  pub const MAX_PAGE_SIZE: u32 = 100;

  /// The first page of the last `days` days, ending at `now`.
  pub fn last_days(now: DateTime<Utc>, days: i64) -> Result<Self> {
    let begin_date = Duration::try_days(days)
      .and_then(|span| now.checked_sub_signed(span))
      .ok_or(Error::DayRange { days })?;

    Ok(Self {
      begin_date,
      end_date:             now,
      size:                 Self::DEFAULT_PAGE_SIZE,
      datasource_id:        None,
      namespace_id:         None,
      tag_ids:              Vec::new(),
      owner_ids:            Vec::new(),
      user_ids:             Vec::new(),
      feed:                 None,
      event_type:           None,
      last_event_id:        None,
      last_event_date_time: None,
    })
  }

  pub fn validate(&self) -> Result<()> {
    if self.begin_date > self.end_date {
      return Err(Error::InvertedRange {
        begin: self.begin_date,
        end:   self.end_date,
      });
    }
    if self.size == 0 || self.size > Self::MAX_PAGE_SIZE {
      return Err(Error::PageSize {
        size: self.size,
        max:  Self::MAX_PAGE_SIZE,
      });
    }
    if self.event_type == Some(ActivityEventType::Unrecognized) {
      return Err(Error::UnrecognizedEventType);
    }
    Ok(())
  }

  /// The page following the one that ended with `last`.
  pub fn after(&self, last: &Activity) -> Self {
    Self {
      last_event_id: Some(last.id),
      last_event_date_time: Some(last.created_at),
      ..self.clone()
    }
  }

  /// Drop the pagination cursor, returning to the first page.
  pub fn first_page(&self) -> Self {
    Self {
      last_event_id: None,
      last_event_date_time: None,
      ..self.clone()
    }
  }

  /// Query-string pairs in the API's naming. Id lists repeat their key.
  pub fn to_params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![
      ("beginDate", rfc3339(&self.begin_date)),
      ("endDate", rfc3339(&self.end_date)),
      ("size", self.size.to_string()),
    ];
    if let Some(id) = self.datasource_id {
      params.push(("datasourceId", id.to_string()));
    }
    if let Some(id) = self.namespace_id {
      params.push(("namespaceId", id.to_string()));
    }
    params.extend(self.tag_ids.iter().map(|id| ("tagIds", id.to_string())));
    params.extend(self.owner_ids.iter().map(|id| ("ownerIds", id.to_string())));
    params.extend(self.user_ids.iter().map(|id| ("userIds", id.to_string())));
    if let Some(feed) = self.feed {
      params.push(("type", feed.to_string()));
    }
    if let Some(event_type) = self.event_type {
      params.push(("eventType", event_type.to_string()));
    }
    if let Some(id) = self.last_event_id {
      params.push(("lastEventId", id.to_string()));
    }
    if let Some(at) = &self.last_event_date_time {
      params.push(("lastEventDateTime", rfc3339(at)));
    }
    params
  }
}

/// Sub-second digits are kept: the server pages on the exact timestamp.
fn rfc3339(at: &DateTime<Utc>) -> String { at.to_rfc3339_opts(SecondsFormat::AutoSi, true) }
