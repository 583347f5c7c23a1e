//! Activity records. One audit-log entry per change to a catalog entity or
//! alert.
//!
//! Records are read-only view models. They are decoded from the feed API,
//! rendered once and dropped. Field names follow the API's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::entity::{DataEntityRef, EntityClass};

// ─── Event type ──────────────────────────────────────────────────────────────

/// The closed set of activity event tags the feed can carry.
///
/// Tags introduced by newer servers decode as [`Unrecognized`] and render
/// with a header only.
///
/// [`Unrecognized`]: ActivityEventType::Unrecognized
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityEventType {
  // ── Ownership ───────────────────────────────────────────────────────────
  OwnershipCreated,
  OwnershipUpdated,
  OwnershipDeleted,

  // ── Entity ──────────────────────────────────────────────────────────────
  DataEntityCreated,
  DescriptionUpdated,
  BusinessNameUpdated,
  TagAssignmentUpdated,
  TermAssignmentUpdated,

  // ── Dataset fields ──────────────────────────────────────────────────────
  DatasetFieldDescriptionUpdated,
  DatasetFieldLabelsUpdated,
  DatasetFieldTermAssignmentUpdated,
  DatasetFieldValuesUpdated,

  // ── Custom groups ───────────────────────────────────────────────────────
  CustomGroupCreated,
  CustomGroupUpdated,
  CustomGroupDeleted,

  // ── Alerts ──────────────────────────────────────────────────────────────
  AlertHaltConfigUpdated,
  AlertStatusUpdated,
  OpenAlertReceived,
  ResolvedAlertReceived,

  /// Any tag this client does not know.
  #[serde(other)]
  Unrecognized,
}

impl ActivityEventType {
  /// Every tag except [`ActivityEventType::Unrecognized`].
  pub fn recognized() -> impl Iterator<Item = Self> {
    Self::iter().filter(|t| *t != Self::Unrecognized)
  }

  /// Short human label for feed listings.
  pub fn label(self) -> &'static str {
    match self {
      Self::OwnershipCreated => "Owner added",
      Self::OwnershipUpdated => "Owner updated",
      Self::OwnershipDeleted => "Owner removed",
      Self::DataEntityCreated => "Entity created",
      Self::DescriptionUpdated => "Description updated",
      Self::BusinessNameUpdated => "Business name updated",
      Self::TagAssignmentUpdated => "Tags updated",
      Self::TermAssignmentUpdated => "Terms updated",
      Self::DatasetFieldDescriptionUpdated => "Field description updated",
      Self::DatasetFieldLabelsUpdated => "Field labels updated",
      Self::DatasetFieldTermAssignmentUpdated => "Field terms updated",
      Self::DatasetFieldValuesUpdated => "Field values updated",
      Self::CustomGroupCreated => "Custom group created",
      Self::CustomGroupUpdated => "Custom group updated",
      Self::CustomGroupDeleted => "Custom group deleted",
      Self::AlertHaltConfigUpdated => "Alert halt config updated",
      Self::AlertStatusUpdated => "Alert status updated",
      Self::OpenAlertReceived => "Alert opened",
      Self::ResolvedAlertReceived => "Alert resolved",
      Self::Unrecognized => "Activity",
    }
  }
}

// ─── Actor ───────────────────────────────────────────────────────────────────

/// The login identity behind a human-made change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  #[serde(default)]
  pub username: Option<String>,
}

/// The catalog owner an identity is associated with, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedOwner {
  #[serde(default)]
  pub identity: Identity,
  #[serde(default)]
  pub owner:    Option<OwnerRef>,
}

/// Who made a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
  /// Ingestion or another automated process; there is no human to name.
  System,
  Person {
    display_name: Option<String>,
    username:     Option<String>,
  },
}

impl Actor {
  /// The person label: display name, else username, else empty. `None` for
  /// [`Actor::System`].
  pub fn label(&self) -> Option<&str> {
    match self {
      Self::System => None,
      Self::Person { display_name, username } => Some(
        display_name
          .as_deref()
          .filter(|n| !n.is_empty())
          .or(username.as_deref())
          .unwrap_or_default(),
      ),
    }
  }
}

// ─── Snapshot sub-types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipActivityState {
  pub id:         i64,
  pub owner_name: String,
  /// The owner's role on the entity ("Data steward", ...).
  #[serde(default, alias = "titleName")]
  pub role_name:  Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntityActivityState {
  #[serde(default)]
  pub oddrn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionActivityState {
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessNameActivityState {
  #[serde(default)]
  pub internal_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelActivityState {
  #[serde(default)]
  pub id:   Option<i64>,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFieldInformationActivityState {
  #[serde(default)]
  pub id:          Option<i64>,
  #[serde(default)]
  pub name:        Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub labels:      Option<Vec<LabelActivityState>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagActivityState {
  #[serde(default)]
  pub id:        Option<i64>,
  pub name:      String,
  #[serde(default)]
  pub important: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRef {
  #[serde(default)]
  pub id:   Option<i64>,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermActivityState {
  #[serde(default)]
  pub id:                  Option<i64>,
  pub name:                String,
  #[serde(default)]
  pub namespace:           Option<NamespaceRef>,
  /// Whether the term was attached through a link in the description rather
  /// than assigned directly.
  #[serde(default)]
  pub is_description_link: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFieldTermsActivityState {
  #[serde(default)]
  pub id:    Option<i64>,
  #[serde(default)]
  pub name:  Option<String>,
  #[serde(default)]
  pub terms: Vec<TermActivityState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueActivityState {
  #[serde(default)]
  pub id:          Option<i64>,
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFieldValuesActivityState {
  #[serde(default)]
  pub id:     Option<i64>,
  #[serde(default)]
  pub name:   Option<String>,
  #[serde(default)]
  pub values: Vec<EnumValueActivityState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomGroupActivityState {
  #[serde(default)]
  pub name:           Option<String>,
  #[serde(default)]
  pub namespace_name: Option<String>,
  #[serde(default, rename = "type")]
  pub entity_type:    Option<EntityClass>,
  #[serde(default)]
  pub entity_classes: Vec<EntityClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertActivityState {
  #[serde(default)]
  pub id:                Option<i64>,
  #[serde(default, rename = "type")]
  pub alert_type:        Option<String>,
  #[serde(default)]
  pub status:            Option<String>,
  #[serde(default)]
  pub status_updated_by: Option<String>,
  #[serde(default)]
  pub last_created_at:   Option<DateTime<Utc>>,
}

/// Per-alert-kind mute windows; each alert kind is silenced until its
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertHaltConfigActivityState {
  #[serde(default)]
  pub failed_job_halt_until:           Option<DateTime<Utc>>,
  #[serde(default)]
  pub failed_dq_test_halt_until:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub incomplete_run_halt_until:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub distribution_anomaly_halt_until: Option<DateTime<Utc>>,
}

// ─── ActivityState ───────────────────────────────────────────────────────────

/// A sparse snapshot of an entity before or after a change. Only the
/// category relevant to the event type is populated in practice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityState {
  #[serde(default)]
  pub ownerships:                Option<Vec<OwnershipActivityState>>,
  #[serde(default)]
  pub data_entity:               Option<DataEntityActivityState>,
  #[serde(default)]
  pub description:               Option<DescriptionActivityState>,
  #[serde(default)]
  pub business_name:             Option<BusinessNameActivityState>,
  #[serde(default)]
  pub dataset_field_information: Option<DatasetFieldInformationActivityState>,
  #[serde(default)]
  pub tags:                      Option<Vec<TagActivityState>>,
  #[serde(default)]
  pub terms:                     Option<Vec<TermActivityState>>,
  #[serde(default)]
  pub dataset_field_terms:       Option<DatasetFieldTermsActivityState>,
  #[serde(default)]
  pub dataset_field_values:      Option<DatasetFieldValuesActivityState>,
  #[serde(default)]
  pub custom_group:              Option<CustomGroupActivityState>,
  #[serde(default)]
  pub alert:                     Option<AlertActivityState>,
  #[serde(default)]
  pub alert_halt_config:         Option<AlertHaltConfigActivityState>,
}

// ─── Activity ────────────────────────────────────────────────────────────────

/// One entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id:           i64,
  pub data_entity:  DataEntityRef,
  pub event_type:   ActivityEventType,
  #[serde(default)]
  pub system_event: bool,
  #[serde(default)]
  pub created_by:   Option<AssociatedOwner>,
  pub created_at:   DateTime<Utc>,
  #[serde(default)]
  pub old_state:    ActivityState,
  #[serde(default)]
  pub new_state:    ActivityState,
}

impl Activity {
  /// Resolve who made the change. System events never name a person, even
  /// when the server attached a `createdBy`.
  pub fn actor(&self) -> Actor {
    if self.system_event {
      return Actor::System;
    }
    let created_by = self.created_by.as_ref();
    Actor::Person {
      display_name: created_by
        .and_then(|c| c.owner.as_ref())
        .map(|o| o.name.clone()),
      username:     created_by.and_then(|c| c.identity.username.clone()),
    }
  }
}
