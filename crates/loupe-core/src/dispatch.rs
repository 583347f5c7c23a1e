//! Event type → body view dispatch.
//!
//! Several event types share a view (the three ownership events, the four
//! alert events), so every [`ViewKind`] owns an explicit list of the event
//! types it renders. [`select_view`] is the single source of truth; the lists
//! must agree with it and never overlap, which the tests assert.

use crate::activity::ActivityEventType::{self, *};

/// Which scalar field a [`ViewKind::StringDiff`] compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringField {
  Oddrn,
  Description,
  BusinessName,
  DatasetFieldDescription,
}

/// Which list a [`ViewKind::ArrayDiff`] compares; also picks how items are
/// drawn (tag chips vs. label chips).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayField {
  Tags,
  DatasetFieldLabels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupChange {
  Created,
  Deleted,
}

impl GroupChange {
  pub fn verb(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Deleted => "deleted",
    }
  }
}

/// The body region drawn under an activity header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
  OwnerDiff,
  StringDiff(StringField),
  ArrayDiff(ArrayField),
  TermDiff,
  DatasetTermDiff,
  EnumDiff,
  /// A one-line "custom group X created/deleted" note; no comparison.
  CustomGroupNote(GroupChange),
  CustomGroupDiff,
  AlertDiff,
}

impl ViewKind {
  /// Every view, one entry per distinct body.
  pub const ALL: [ViewKind; 14] = [
    ViewKind::OwnerDiff,
    ViewKind::StringDiff(StringField::Oddrn),
    ViewKind::StringDiff(StringField::Description),
    ViewKind::StringDiff(StringField::BusinessName),
    ViewKind::StringDiff(StringField::DatasetFieldDescription),
    ViewKind::ArrayDiff(ArrayField::Tags),
    ViewKind::ArrayDiff(ArrayField::DatasetFieldLabels),
    ViewKind::TermDiff,
    ViewKind::DatasetTermDiff,
    ViewKind::EnumDiff,
    ViewKind::CustomGroupNote(GroupChange::Created),
    ViewKind::CustomGroupNote(GroupChange::Deleted),
    ViewKind::CustomGroupDiff,
    ViewKind::AlertDiff,
  ];

  /// The event types rendered by this view.
  pub fn event_types(self) -> &'static [ActivityEventType] {
    match self {
      Self::OwnerDiff => &[OwnershipCreated, OwnershipUpdated, OwnershipDeleted],
      Self::StringDiff(StringField::Oddrn) => &[DataEntityCreated],
      Self::StringDiff(StringField::Description) => &[DescriptionUpdated],
      Self::StringDiff(StringField::BusinessName) => &[BusinessNameUpdated],
      Self::StringDiff(StringField::DatasetFieldDescription) => {
        &[DatasetFieldDescriptionUpdated]
      }
      Self::ArrayDiff(ArrayField::Tags) => &[TagAssignmentUpdated],
      Self::ArrayDiff(ArrayField::DatasetFieldLabels) => {
        &[DatasetFieldLabelsUpdated]
      }
      Self::TermDiff => &[TermAssignmentUpdated],
      Self::DatasetTermDiff => &[DatasetFieldTermAssignmentUpdated],
      Self::EnumDiff => &[DatasetFieldValuesUpdated],
      Self::CustomGroupNote(GroupChange::Created) => &[CustomGroupCreated],
      Self::CustomGroupNote(GroupChange::Deleted) => &[CustomGroupDeleted],
      Self::CustomGroupDiff => &[CustomGroupUpdated],
      Self::AlertDiff => &[
        AlertHaltConfigUpdated,
        AlertStatusUpdated,
        OpenAlertReceived,
        ResolvedAlertReceived,
      ],
    }
  }

  /// Whether the view takes the collapse flag. The alert and custom-group
  /// note views always render in full.
  pub fn accepts_hide_all_details(self) -> bool {
    !matches!(self, Self::AlertDiff | Self::CustomGroupNote(_))
  }
}

/// Pick the body view for `event_type`. `None` means header only.
///
/// Depends on the tag alone, never on which snapshot fields are populated.
pub fn select_view(event_type: ActivityEventType) -> Option<ViewKind> {
  let kind = match event_type {
    OwnershipCreated | OwnershipUpdated | OwnershipDeleted => ViewKind::OwnerDiff,
    DataEntityCreated => ViewKind::StringDiff(StringField::Oddrn),
    DescriptionUpdated => ViewKind::StringDiff(StringField::Description),
    BusinessNameUpdated => ViewKind::StringDiff(StringField::BusinessName),
    DatasetFieldDescriptionUpdated => {
      ViewKind::StringDiff(StringField::DatasetFieldDescription)
    }
    TagAssignmentUpdated => ViewKind::ArrayDiff(ArrayField::Tags),
    DatasetFieldLabelsUpdated => ViewKind::ArrayDiff(ArrayField::DatasetFieldLabels),
    TermAssignmentUpdated => ViewKind::TermDiff,
    DatasetFieldTermAssignmentUpdated => ViewKind::DatasetTermDiff,
    DatasetFieldValuesUpdated => ViewKind::EnumDiff,
    CustomGroupCreated => ViewKind::CustomGroupNote(GroupChange::Created),
    CustomGroupDeleted => ViewKind::CustomGroupNote(GroupChange::Deleted),
    CustomGroupUpdated => ViewKind::CustomGroupDiff,
    AlertHaltConfigUpdated
    | AlertStatusUpdated
    | OpenAlertReceived
    | ResolvedAlertReceived => ViewKind::AlertDiff,
    Unrecognized => return None,
  };
  Some(kind)
}
