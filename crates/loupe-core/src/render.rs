//! The activity renderer: one [`Activity`] in, one [`ActivityView`] out.
//!
//! The renderer owns no state beyond its two collaborators: a resolver that
//! turns an entity id into a link, and a date formatter. Both are injected so
//! the same renderer serves the TUI, tests, and anything else that wants a
//! plain description of what to draw.

use chrono::{DateTime, Utc};

use crate::{
  activity::{
    Activity,
    ActivityEventType,
    ActivityState,
    CustomGroupActivityState,
    EnumValueActivityState,
    OwnershipActivityState,
    TermActivityState,
  },
  diff::{ListDiff, diff_by_key},
  dispatch::{ArrayField, GroupChange, StringField, ViewKind, select_view},
};

// ─── Collaborators ───────────────────────────────────────────────────────────

/// Resolves the link target for an entity's detail view.
pub trait EntityLinkResolver {
  fn entity_link(&self, entity_id: i64) -> String;
}

impl<F> EntityLinkResolver for F
where
  F: Fn(i64) -> String,
{
  fn entity_link(&self, entity_id: i64) -> String { self(entity_id) }
}

/// Formats activity timestamps for display.
pub trait DateFormatter {
  fn format_date(&self, at: &DateTime<Utc>) -> String;
}

impl<F> DateFormatter for F
where
  F: Fn(&DateTime<Utc>) -> String,
{
  fn format_date(&self, at: &DateTime<Utc>) -> String { self(at) }
}

// ─── Header ──────────────────────────────────────────────────────────────────

/// Who to show in the header's actor slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorBadge {
  /// Drawn as a gear; no name.
  System,
  /// Drawn as a person icon followed by the label.
  Person(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityHeader {
  pub entity_id:      i64,
  pub entity_name:    String,
  pub entity_link:    String,
  pub entity_classes: Vec<String>,
  pub actor:          ActorBadge,
  pub occurred_at:    String,
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// Old and new lists plus their keyed diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<T> {
  pub old:              Vec<T>,
  pub new:              Vec<T>,
  pub diff:             ListDiff<T>,
  pub hide_all_details: bool,
}

impl<T: Clone + PartialEq> ListView<T> {
  fn build<K: PartialEq>(
    old: Vec<T>,
    new: Vec<T>,
    hide_all_details: bool,
    key: impl Fn(&T) -> K,
  ) -> Self {
    let diff = diff_by_key(&old, &new, key);
    Self { old, new, diff, hide_all_details }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
  pub field:            StringField,
  /// Lead-in before the name, e.g. "Data entity with".
  pub start_text:       Option<&'static str>,
  pub name:             String,
  pub old:              Option<String>,
  pub new:              Option<String>,
  pub hide_all_details: bool,
}

/// A tag or label chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
  pub name:      String,
  pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayView {
  pub field:  ArrayField,
  pub name:   String,
  pub plural: bool,
  pub items:  ListView<Chip>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTermsView {
  pub field_name: Option<String>,
  pub terms:      ListView<TermActivityState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumsView {
  pub field_name: Option<String>,
  pub values:     ListView<EnumValueActivityState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomGroupView {
  pub old:              CustomGroupActivityState,
  pub new:              CustomGroupActivityState,
  pub hide_all_details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertView {
  pub event_type: ActivityEventType,
  pub old:        ActivityState,
  pub new:        ActivityState,
}

/// The body region of an activity, one variant per [`ViewKind`] family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityBody {
  Owners {
    event_type: ActivityEventType,
    owners:     ListView<OwnershipActivityState>,
  },
  Text(TextView),
  Array(ArrayView),
  Terms(ListView<TermActivityState>),
  DatasetTerms(DatasetTermsView),
  Enums(EnumsView),
  CustomGroupNote {
    change:     GroupChange,
    group_name: String,
  },
  CustomGroup(CustomGroupView),
  Alert(AlertView),
}

impl ActivityBody {
  /// The collapse flag this body was built with; `None` for bodies that do
  /// not take one.
  pub fn hide_all_details(&self) -> Option<bool> {
    match self {
      Self::Owners { owners, .. } => Some(owners.hide_all_details),
      Self::Text(v) => Some(v.hide_all_details),
      Self::Array(v) => Some(v.items.hide_all_details),
      Self::Terms(v) => Some(v.hide_all_details),
      Self::DatasetTerms(v) => Some(v.terms.hide_all_details),
      Self::Enums(v) => Some(v.values.hide_all_details),
      Self::CustomGroup(v) => Some(v.hide_all_details),
      Self::CustomGroupNote { .. } | Self::Alert(_) => None,
    }
  }
}

/// A fully rendered activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityView {
  pub header: ActivityHeader,
  /// `None` for event types with no body view.
  pub body:   Option<ActivityBody>,
}

// ─── Renderer ────────────────────────────────────────────────────────────────

pub struct ActivityRenderer<L, D> {
  links: L,
  dates: D,
}

impl<L, D> ActivityRenderer<L, D>
where
  L: EntityLinkResolver,
  D: DateFormatter,
{
  pub fn new(links: L, dates: D) -> Self { Self { links, dates } }

  pub fn links(&self) -> &L { &self.links }

  /// The date formatter, for timestamps inside bodies.
  pub fn dates(&self) -> &D { &self.dates }

  /// Render `activity`. `hide_all_details` is handed to the body untouched.
  pub fn render(&self, activity: &Activity, hide_all_details: bool) -> ActivityView {
    ActivityView {
      header: self.header(activity),
      body:   select_view(activity.event_type)
        .map(|kind| body(activity, kind, hide_all_details)),
    }
  }

  pub fn header(&self, activity: &Activity) -> ActivityHeader {
    let entity = &activity.data_entity;
    let actor = match activity.actor().label() {
      None => ActorBadge::System,
      Some(label) => ActorBadge::Person(label.to_string()),
    };

    ActivityHeader {
      entity_id: entity.id,
      entity_name: entity.display_name().to_string(),
      entity_link: self.links.entity_link(entity.id),
      entity_classes: entity
        .entity_classes
        .iter()
        .map(|c| c.name.clone())
        .collect(),
      actor,
      occurred_at: self.dates.format_date(&activity.created_at),
    }
  }
}

/// Build the body for an already-selected view. Only the snapshot category
/// belonging to `kind` is read.
fn body(activity: &Activity, kind: ViewKind, hide_all_details: bool) -> ActivityBody {
  let old = &activity.old_state;
  let new = &activity.new_state;

  match kind {
    ViewKind::OwnerDiff => ActivityBody::Owners {
      event_type: activity.event_type,
      owners:     ListView::build(
        old.ownerships.clone().unwrap_or_default(),
        new.ownerships.clone().unwrap_or_default(),
        hide_all_details,
        |o| o.owner_name.clone(),
      ),
    },

    ViewKind::StringDiff(field) => {
      let (start_text, name, old_value, new_value) = match field {
        StringField::Oddrn => (
          Some("Data entity with"),
          "ODDRN".to_string(),
          old.data_entity.as_ref().and_then(|d| d.oddrn.clone()),
          new.data_entity.as_ref().and_then(|d| d.oddrn.clone()),
        ),
        StringField::Description => (
          None,
          "Description".to_string(),
          old.description.as_ref().and_then(|d| d.description.clone()),
          new.description.as_ref().and_then(|d| d.description.clone()),
        ),
        StringField::BusinessName => (
          None,
          "Business name".to_string(),
          old.business_name.as_ref().and_then(|b| b.internal_name.clone()),
          new.business_name.as_ref().and_then(|b| b.internal_name.clone()),
        ),
        StringField::DatasetFieldDescription => (
          None,
          format!("Dataset field {} description", old_field_name(old)),
          old
            .dataset_field_information
            .as_ref()
            .and_then(|f| f.description.clone()),
          new
            .dataset_field_information
            .as_ref()
            .and_then(|f| f.description.clone()),
        ),
      };
      ActivityBody::Text(TextView {
        field,
        start_text,
        name,
        old: old_value,
        new: new_value,
        hide_all_details,
      })
    }

    ViewKind::ArrayDiff(field) => {
      let (name, old_items, new_items) = match field {
        ArrayField::Tags => (
          "Tags".to_string(),
          tag_chips(old),
          tag_chips(new),
        ),
        ArrayField::DatasetFieldLabels => (
          format!("Labels in {} column", old_field_name(old)),
          label_chips(old),
          label_chips(new),
        ),
      };
      ActivityBody::Array(ArrayView {
        field,
        name,
        plural: true,
        items: ListView::build(old_items, new_items, hide_all_details, |c| {
          c.name.clone()
        }),
      })
    }

    ViewKind::TermDiff => ActivityBody::Terms(ListView::build(
      old.terms.clone().unwrap_or_default(),
      new.terms.clone().unwrap_or_default(),
      hide_all_details,
      |t| t.name.clone(),
    )),

    ViewKind::DatasetTermDiff => {
      let old_terms = old.dataset_field_terms.clone().unwrap_or_default();
      let new_terms = new.dataset_field_terms.clone().unwrap_or_default();
      ActivityBody::DatasetTerms(DatasetTermsView {
        field_name: old_terms.name.clone().or(new_terms.name.clone()),
        terms:      ListView::build(
          old_terms.terms,
          new_terms.terms,
          hide_all_details,
          |t| t.name.clone(),
        ),
      })
    }

    ViewKind::EnumDiff => {
      let old_values = old.dataset_field_values.clone().unwrap_or_default();
      let new_values = new.dataset_field_values.clone().unwrap_or_default();
      ActivityBody::Enums(EnumsView {
        field_name: old_values.name.clone().or(new_values.name.clone()),
        values:     ListView::build(
          old_values.values,
          new_values.values,
          hide_all_details,
          |v| v.name.clone(),
        ),
      })
    }

    ViewKind::CustomGroupNote(change) => ActivityBody::CustomGroupNote {
      change,
      group_name: activity
        .data_entity
        .internal_name
        .clone()
        .unwrap_or_default(),
    },

    ViewKind::CustomGroupDiff => ActivityBody::CustomGroup(CustomGroupView {
      old: old.custom_group.clone().unwrap_or_default(),
      new: new.custom_group.clone().unwrap_or_default(),
      hide_all_details,
    }),

    ViewKind::AlertDiff => ActivityBody::Alert(AlertView {
      event_type: activity.event_type,
      old:        old.clone(),
      new:        new.clone(),
    }),
  }
}

/// Dataset-field views are labelled with the field name from the old state.
fn old_field_name(old: &ActivityState) -> &str {
  old
    .dataset_field_information
    .as_ref()
    .and_then(|f| f.name.as_deref())
    .unwrap_or_default()
}

fn tag_chips(state: &ActivityState) -> Vec<Chip> {
  state
    .tags
    .iter()
    .flatten()
    .map(|t| Chip {
      name:      t.name.clone(),
      important: t.important.unwrap_or(false),
    })
    .collect()
}

fn label_chips(state: &ActivityState) -> Vec<Chip> {
  state
    .dataset_field_information
    .iter()
    .flat_map(|f| f.labels.iter().flatten())
    .map(|l| Chip { name: l.name.clone(), important: false })
    .collect()
}
