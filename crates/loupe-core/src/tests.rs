//! Rendering and editing tests against decoded feed payloads.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::{
  SaveFailure,
  activity::{
    Activity,
    ActivityEventType,
    ActivityState,
    AssociatedOwner,
    Identity,
    OwnerRef,
  },
  catalog::Catalog,
  dispatch::{ArrayField, GroupChange, StringField, ViewKind, select_view},
  editor::{DescriptionEditor, EditorState},
  entity::{DataEntityDetails, DataEntityRef, EntityClass},
  query::{ActivityCounts, ActivityQuery},
  render::{ActivityBody, ActivityRenderer, ActorBadge, DateFormatter, EntityLinkResolver},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn at() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap() }

fn renderer() -> ActivityRenderer<impl EntityLinkResolver, impl DateFormatter> {
  ActivityRenderer::new(
    |id: i64| format!("/dataentities/{id}/overview"),
    |at: &DateTime<Utc>| at.format("%Y-%m-%d %H:%M").to_string(),
  )
}

fn activity(event_type: ActivityEventType) -> Activity {
  Activity {
    id: 1,
    data_entity: DataEntityRef {
      id:             42,
      external_name:  Some("orders".into()),
      internal_name:  Some("Orders".into()),
      entity_classes: vec![EntityClass { id: 1, name: "DATA_SET".into() }],
    },
    event_type,
    system_event: false,
    created_by: Some(AssociatedOwner {
      identity: Identity { username: Some("alice123".into()) },
      owner:    Some(OwnerRef { id: 5, name: "Alice".into() }),
    }),
    created_at: at(),
    old_state: ActivityState::default(),
    new_state: ActivityState::default(),
  }
}

/// A feed entry as the API serves it.
fn decoded(value: serde_json::Value) -> Activity {
  serde_json::from_value(value).expect("valid activity payload")
}

// ─── Header ──────────────────────────────────────────────────────────────────

#[test]
fn header_carries_entity_link_classes_and_time() {
  let view = renderer().render(&activity(ActivityEventType::DescriptionUpdated), false);
  let h = view.header;
  assert_eq!(h.entity_id, 42);
  assert_eq!(h.entity_name, "orders");
  assert_eq!(h.entity_link, "/dataentities/42/overview");
  assert_eq!(h.entity_classes, vec!["DATA_SET".to_string()]);
  assert_eq!(h.occurred_at, "2024-05-01 09:30");
}

#[test]
fn system_actor_has_no_name() {
  let mut a = activity(ActivityEventType::DataEntityCreated);
  a.system_event = true;
  assert_eq!(renderer().header(&a).actor, ActorBadge::System);
}

#[test]
fn person_actor_uses_display_name() {
  let a = activity(ActivityEventType::DataEntityCreated);
  assert_eq!(renderer().header(&a).actor, ActorBadge::Person("Alice".into()));
}

#[test]
fn person_actor_falls_back_to_username() {
  let mut a = activity(ActivityEventType::DataEntityCreated);
  a.created_by = Some(AssociatedOwner {
    identity: Identity { username: Some("alice123".into()) },
    owner:    None,
  });
  assert_eq!(
    renderer().header(&a).actor,
    ActorBadge::Person("alice123".into())
  );
}

#[test]
fn nameless_entity_renders_empty_name() {
  let mut a = activity(ActivityEventType::DescriptionUpdated);
  a.data_entity.external_name = None;
  a.data_entity.internal_name = None;
  assert_eq!(renderer().header(&a).entity_name, "");
}

// ─── Body dispatch ───────────────────────────────────────────────────────────

#[test]
fn unrecognized_event_renders_header_only() {
  let a = decoded(json!({
    "id": 9,
    "dataEntity": { "id": 3, "internalName": "jobs" },
    "eventType": "DATA_ENTITY_STATUS_UPDATED",
    "systemEvent": true,
    "createdAt": "2024-05-01T09:30:00Z",
    "oldState": {},
    "newState": {}
  }));
  let view = renderer().render(&a, true);
  assert_eq!(view.header.entity_name, "jobs");
  assert_eq!(view.body, None);
}

#[test]
fn hide_all_details_reaches_every_body_that_takes_it() {
  for event_type in ActivityEventType::recognized() {
    let kind = select_view(event_type).unwrap();
    for flag in [true, false] {
      let body = renderer().render(&activity(event_type), flag).body.unwrap();
      let expected = kind.accepts_hide_all_details().then_some(flag);
      assert_eq!(body.hide_all_details(), expected, "{event_type} / {flag}");
    }
  }
}

#[test]
fn body_follows_event_type_not_populated_fields() {
  // A tags event whose snapshots only carry a description still renders
  // the tags view.
  let mut a = activity(ActivityEventType::TagAssignmentUpdated);
  a.new_state = decoded_state(json!({ "description": { "description": "x" } }));
  let body = renderer().render(&a, false).body.unwrap();
  let ActivityBody::Array(view) = body else {
    panic!("expected an array body, got {body:?}");
  };
  assert_eq!(view.field, ArrayField::Tags);
  assert!(view.items.diff.is_empty());
}

fn decoded_state(value: serde_json::Value) -> ActivityState {
  serde_json::from_value(value).expect("valid state payload")
}

#[test]
fn ownership_events_render_owner_diff() {
  let a = decoded(json!({
    "id": 2,
    "dataEntity": { "id": 42, "externalName": "orders" },
    "eventType": "OWNERSHIP_UPDATED",
    "createdBy": { "identity": { "username": "bob" } },
    "createdAt": "2024-05-01T09:30:00Z",
    "oldState": { "ownerships": [{ "id": 1, "ownerName": "Carol", "titleName": "Steward" }] },
    "newState": { "ownerships": [{ "id": 1, "ownerName": "Carol", "roleName": "Owner" }] }
  }));
  let view = renderer().render(&a, false);
  assert_eq!(view.header.actor, ActorBadge::Person("bob".into()));

  let Some(ActivityBody::Owners { event_type, owners }) = view.body else {
    panic!("expected owners body");
  };
  assert_eq!(event_type, ActivityEventType::OwnershipUpdated);
  assert_eq!(owners.diff.changed.len(), 1);
  assert_eq!(owners.diff.changed[0].1.role_name.as_deref(), Some("Owner"));
}

#[test]
fn data_entity_created_shows_oddrn() {
  let a = decoded(json!({
    "id": 3,
    "dataEntity": { "id": 42 },
    "eventType": "DATA_ENTITY_CREATED",
    "systemEvent": true,
    "createdAt": "2024-05-01T09:30:00Z",
    "newState": { "dataEntity": { "oddrn": "//postgresql/host/db/tables/orders" } }
  }));
  let Some(ActivityBody::Text(text)) = renderer().render(&a, false).body else {
    panic!("expected text body");
  };
  assert_eq!(text.field, StringField::Oddrn);
  assert_eq!(text.start_text, Some("Data entity with"));
  assert_eq!(text.name, "ODDRN");
  assert_eq!(text.old, None);
  assert_eq!(text.new.as_deref(), Some("//postgresql/host/db/tables/orders"));
}

#[test]
fn field_views_are_named_from_the_old_state() {
  let a = decoded(json!({
    "id": 4,
    "dataEntity": { "id": 42 },
    "eventType": "DATASET_FIELD_LABELS_UPDATED",
    "createdAt": "2024-05-01T09:30:00Z",
    "oldState": { "datasetFieldInformation": { "name": "amount", "labels": [{ "name": "money" }] } },
    "newState": { "datasetFieldInformation": { "name": "renamed", "labels": [{ "name": "money" }, { "name": "pii" }] } }
  }));
  let Some(ActivityBody::Array(view)) = renderer().render(&a, true).body else {
    panic!("expected array body");
  };
  assert_eq!(view.field, ArrayField::DatasetFieldLabels);
  assert_eq!(view.name, "Labels in amount column");
  assert!(view.plural);
  assert_eq!(view.items.diff.added.len(), 1);
  assert_eq!(view.items.diff.added[0].name, "pii");

  let mut b = a.clone();
  b.event_type = ActivityEventType::DatasetFieldDescriptionUpdated;
  let Some(ActivityBody::Text(text)) = renderer().render(&b, false).body else {
    panic!("expected text body");
  };
  assert_eq!(text.name, "Dataset field amount description");
}

#[test]
fn tag_importance_survives_into_chips() {
  let a = decoded(json!({
    "id": 5,
    "dataEntity": { "id": 42 },
    "eventType": "TAG_ASSIGNMENT_UPDATED",
    "createdAt": "2024-05-01T09:30:00Z",
    "oldState": { "tags": [] },
    "newState": { "tags": [{ "id": 1, "name": "gold", "important": true }] }
  }));
  let Some(ActivityBody::Array(view)) = renderer().render(&a, false).body else {
    panic!("expected array body");
  };
  assert!(view.items.new[0].important);
  assert_eq!(view.items.diff.summary(), "1 added");
}

#[test]
fn custom_group_notes_use_internal_name() {
  let mut a = activity(ActivityEventType::CustomGroupDeleted);
  a.data_entity.internal_name = Some("Finance group".into());
  let body = renderer().render(&a, true).body;
  assert_eq!(
    body,
    Some(ActivityBody::CustomGroupNote {
      change:     GroupChange::Deleted,
      group_name: "Finance group".into(),
    })
  );
}

#[test]
fn alert_events_carry_full_state() {
  let a = decoded(json!({
    "id": 6,
    "dataEntity": { "id": 42 },
    "eventType": "ALERT_STATUS_UPDATED",
    "createdAt": "2024-05-01T09:30:00Z",
    "oldState": { "alert": { "id": 11, "type": "FAILED_JOB", "status": "OPEN" } },
    "newState": { "alert": { "id": 11, "type": "FAILED_JOB", "status": "RESOLVED", "statusUpdatedBy": "alice" } }
  }));
  assert_eq!(select_view(a.event_type), Some(ViewKind::AlertDiff));
  let Some(ActivityBody::Alert(view)) = renderer().render(&a, true).body else {
    panic!("expected alert body");
  };
  assert_eq!(view.event_type, ActivityEventType::AlertStatusUpdated);
  assert_eq!(
    view.new.alert.as_ref().and_then(|al| al.status.as_deref()),
    Some("RESOLVED")
  );
}

// ─── Editor against a catalog ────────────────────────────────────────────────

/// Answers saves from a scripted queue of outcomes.
struct ScriptedCatalog {
  outcomes: Mutex<Vec<Result<String, SaveFailure>>>,
}

#[derive(Debug, thiserror::Error)]
#[error("not scripted")]
struct NotScripted;

impl Catalog for ScriptedCatalog {
  type Error = NotScripted;

  async fn list_activities(&self, _: &ActivityQuery) -> Result<Vec<Activity>, NotScripted> {
    Err(NotScripted)
  }

  async fn activity_counts(&self, _: &ActivityQuery) -> Result<ActivityCounts, NotScripted> {
    Err(NotScripted)
  }

  async fn entity_activities(
    &self,
    _: i64,
    _: &ActivityQuery,
  ) -> Result<Vec<Activity>, NotScripted> {
    Err(NotScripted)
  }

  async fn entity_details(&self, _: i64) -> Result<DataEntityDetails, NotScripted> {
    Err(NotScripted)
  }

  async fn update_description(&self, _: i64, _: String) -> Result<String, SaveFailure> {
    self.outcomes.lock().unwrap().remove(0)
  }
}

#[tokio::test]
async fn failed_then_successful_save() {
  let catalog = ScriptedCatalog {
    outcomes: Mutex::new(vec![
      Err(SaveFailure::new("Service Unavailable")),
      Ok("bar".into()),
    ]),
  };
  let mut ed = DescriptionEditor::new(42, Some("foo".into()), None);

  ed.edit();
  ed.draft_text_mut().unwrap().push_str("bar");
  let req = ed.begin_save().unwrap();
  let outcome = catalog.update_description(req.entity_id, req.text).await;
  ed.finish_save(req.ticket, outcome);
  assert!(ed.is_editing());
  assert_eq!(ed.error(), "Service Unavailable");
  assert_eq!(ed.draft().unwrap().text, "foobar");

  let draft = ed.draft_text_mut().unwrap();
  draft.clear();
  draft.push_str("bar");
  let req = ed.begin_save().unwrap();
  let outcome = catalog.update_description(req.entity_id, req.text).await;
  ed.finish_save(req.ticket, outcome);
  assert_eq!(ed.state(), &EditorState::Viewing);
  assert_eq!(ed.error(), "");
  assert_eq!(ed.persisted(), "bar");
}
