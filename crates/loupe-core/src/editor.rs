//! Description editor state machine.
//!
//! | from    | event                         | to                               |
//! |---------|-------------------------------|----------------------------------|
//! | Viewing | [`edit`]                      | Editing, draft seeded from saved |
//! | Editing | [`cancel`]                    | Viewing, draft dropped           |
//! | Editing | [`begin_save`]                | Editing, awaiting the save       |
//! | Editing | [`finish_save`] with `Ok`     | Viewing, error cleared           |
//! | Editing | [`finish_save`] with `Err`    | Editing, error set, draft kept   |
//!
//! The save itself runs elsewhere: [`begin_save`] hands out a
//! [`SaveRequest`] and the caller reports the outcome back with its ticket.
//! Cancel stays available while a save is outstanding. The outcome of a save
//! whose draft was cancelled still updates the saved text on success and is
//! otherwise dropped.
//!
//! [`edit`]: DescriptionEditor::edit
//! [`cancel`]: DescriptionEditor::cancel
//! [`begin_save`]: DescriptionEditor::begin_save
//! [`finish_save`]: DescriptionEditor::finish_save

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{entity::DataEntityDetails, error::SaveFailure};

/// Process-wide, so tickets never repeat across editors.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(0);

/// Write or preview, inside the editing state. Presentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorTab {
  #[default]
  Write,
  Preview,
}

/// Identifies one save round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(u64);

impl SaveTicket {
  fn next() -> Self { Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed)) }
}

/// What the save collaborator should persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
  pub ticket:    SaveTicket,
  pub entity_id: i64,
  pub text:      String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
  pub text:  String,
  pub tab:   EditorTab,
  /// Empty when there is nothing to report.
  pub error: String,
  awaiting:  Option<SaveTicket>,
}

impl Draft {
  /// True while this draft's save is outstanding.
  pub fn is_saving(&self) -> bool { self.awaiting.is_some() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
  Viewing,
  Editing(Draft),
}

/// Editor for one entity's internal description.
#[derive(Debug, Clone)]
pub struct DescriptionEditor {
  entity_id:   i64,
  persisted:   Option<String>,
  external:    Option<String>,
  state:       EditorState,
  in_flight:   Option<SaveTicket>,
}

impl DescriptionEditor {
  pub fn new(
    entity_id: i64,
    persisted: Option<String>,
    external: Option<String>,
  ) -> Self {
    Self {
      entity_id,
      persisted,
      external,
      state: EditorState::Viewing,
      in_flight: None,
    }
  }

  pub fn from_details(details: &DataEntityDetails) -> Self {
    Self::new(
      details.id,
      details.internal_description.clone(),
      details.external_description.clone(),
    )
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn entity_id(&self) -> i64 { self.entity_id }

  pub fn state(&self) -> &EditorState { &self.state }

  pub fn is_editing(&self) -> bool {
    matches!(self.state, EditorState::Editing(_))
  }

  /// The saved internal description, empty when there is none.
  pub fn persisted(&self) -> &str { self.persisted.as_deref().unwrap_or_default() }

  /// The read-only description ingested from the source system.
  pub fn external(&self) -> Option<&str> {
    self.external.as_deref().filter(|s| !s.is_empty())
  }

  pub fn draft(&self) -> Option<&Draft> {
    match &self.state {
      EditorState::Editing(draft) => Some(draft),
      EditorState::Viewing => None,
    }
  }

  /// The inline error, empty outside the editing state.
  pub fn error(&self) -> &str { self.draft().map_or("", |d| d.error.as_str()) }

  /// The markdown to preview: the draft while editing, else the saved text.
  pub fn preview_source(&self) -> &str {
    match &self.state {
      EditorState::Editing(draft) => &draft.text,
      EditorState::Viewing => self.persisted(),
    }
  }

  /// "Add description" when nothing is saved yet, else "Edit description".
  pub fn action_label(&self) -> &'static str {
    if self.persisted().is_empty() {
      "Add description"
    } else {
      "Edit description"
    }
  }

  pub fn is_save_in_flight(&self) -> bool { self.in_flight.is_some() }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Viewing → Editing, seeding the draft from the saved description. No-op
  /// while already editing.
  pub fn edit(&mut self) {
    if self.is_editing() {
      return;
    }
    self.state = EditorState::Editing(Draft {
      text:     self.persisted().to_string(),
      tab:      EditorTab::Write,
      error:    String::new(),
      awaiting: None,
    });
  }

  /// Editing → Viewing, discarding the draft and any error.
  pub fn cancel(&mut self) { self.state = EditorState::Viewing; }

  /// Mutable access to the draft text while editing.
  pub fn draft_text_mut(&mut self) -> Option<&mut String> {
    match &mut self.state {
      EditorState::Editing(draft) => Some(&mut draft.text),
      EditorState::Viewing => None,
    }
  }

  pub fn toggle_tab(&mut self) {
    if let EditorState::Editing(draft) = &mut self.state {
      draft.tab = match draft.tab {
        EditorTab::Write => EditorTab::Preview,
        EditorTab::Preview => EditorTab::Write,
      };
    }
  }

  /// Start saving the current draft.
  ///
  /// Returns `None` outside the editing state or while another save from
  /// this editor is still outstanding.
  pub fn begin_save(&mut self) -> Option<SaveRequest> {
    if self.in_flight.is_some() {
      return None;
    }
    let EditorState::Editing(draft) = &mut self.state else {
      return None;
    };

    let ticket = SaveTicket::next();
    self.in_flight = Some(ticket);
    draft.awaiting = Some(ticket);

    Some(SaveRequest {
      ticket,
      entity_id: self.entity_id,
      text: draft.text.clone(),
    })
  }

  /// Report the outcome of the save identified by `ticket`. `Ok` carries
  /// the description as the server stored it.
  pub fn finish_save(
    &mut self,
    ticket: SaveTicket,
    outcome: Result<String, SaveFailure>,
  ) {
    if self.in_flight == Some(ticket) {
      self.in_flight = None;
    }

    let awaited = matches!(
      &self.state,
      EditorState::Editing(draft) if draft.awaiting == Some(ticket)
    );

    match outcome {
      Ok(saved) => {
        self.persisted = Some(saved);
        if awaited {
          self.state = EditorState::Viewing;
        }
      }
      Err(failure) => {
        if let EditorState::Editing(draft) = &mut self.state
          && awaited
        {
          draft.awaiting = None;
          draft.error = failure.message().to_string();
        }
      }
    }
  }
}
