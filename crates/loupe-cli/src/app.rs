//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use loupe_core::{
  SaveFailure,
  activity::Activity,
  catalog::Catalog,
  editor::{DescriptionEditor, EditorTab, SaveTicket},
  entity::DataEntityDetails,
  query::{ActivityCounts, ActivityFeedType, ActivityQuery},
  render::ActivityRenderer,
};
use tokio::sync::mpsc;

use crate::format::{LocalDates, OverviewLinks};

pub type Renderer = ActivityRenderer<OverviewLinks, LocalDates>;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// The activity feed with the selected activity's detail.
  Feed,
  /// One entity's descriptions and its own activity.
  Entity,
}

/// Completions delivered back to the UI loop by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
  Saved {
    ticket:    SaveTicket,
    entity_id: i64,
    outcome:   Result<String, SaveFailure>,
  },
}

const FEEDS: [ActivityFeedType; 4] = [
  ActivityFeedType::All,
  ActivityFeedType::MyObjects,
  ActivityFeedType::Downstream,
  ActivityFeedType::Upstream,
];

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<C> {
  pub screen: Screen,

  /// The first-page query for the feed; pages after it are derived with
  /// [`ActivityQuery::after`].
  pub query: ActivityQuery,

  pub activities: Vec<Activity>,
  pub counts:     ActivityCounts,

  /// Whether the last page came back full, so another may follow.
  pub has_more: bool,

  /// Cursor position within `activities`.
  pub cursor: usize,

  /// Handed to every rendered activity body.
  pub hide_all_details: bool,

  /// The entity shown on [`Screen::Entity`].
  pub entity:            Option<DataEntityDetails>,
  pub entity_activities: Vec<Activity>,
  pub entity_scroll:     usize,
  pub editor:            Option<DescriptionEditor>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub renderer: Renderer,

  catalog:   Arc<C>,
  events_tx: mpsc::UnboundedSender<AppEvent>,
  events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<C: Catalog + 'static> App<C> {
  pub fn new(
    catalog: Arc<C>,
    query: ActivityQuery,
    renderer: Renderer,
    hide_all_details: bool,
  ) -> Self {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::Feed,
      query,
      activities: Vec::new(),
      counts: ActivityCounts::default(),
      has_more: false,
      cursor: 0,
      hide_all_details,
      entity: None,
      entity_activities: Vec::new(),
      entity_scroll: 0,
      editor: None,
      status_msg: String::new(),
      renderer,
      catalog,
      events_tx,
      events_rx,
    }
  }

  /// The activity under the feed cursor, if any.
  pub fn selected(&self) -> Option<&Activity> { self.activities.get(self.cursor) }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the first page of the feed and the per-feed counts.
  pub async fn load_feed(&mut self) -> anyhow::Result<()> {
    self.query = self.query.first_page();
    self.query.validate()?;

    self.status_msg = "Loading activity…".into();
    let page = self.catalog.list_activities(&self.query).await?;
    let counts = self.catalog.activity_counts(&self.query).await?;

    tracing::info!(count = page.len(), feed = ?self.query.feed, "loaded activity feed");
    self.has_more = page.len() == self.query.size as usize;
    self.activities = page;
    self.counts = counts;
    self.cursor = 0;
    self.status_msg.clear();
    Ok(())
  }

  /// Append the page following the last loaded activity.
  pub async fn load_more(&mut self) -> anyhow::Result<()> {
    let Some(last) = self.activities.last() else {
      return Ok(());
    };
    if !self.has_more {
      self.status_msg = "No more activity in this range".into();
      return Ok(());
    }

    let next = self.query.after(last);
    let page = self.catalog.list_activities(&next).await?;
    tracing::debug!(
      count = page.len(),
      after = ?next.last_event_id,
      "loaded next activity page"
    );
    self.has_more = page.len() == next.size as usize;
    self.activities.extend(page);
    self.status_msg.clear();
    Ok(())
  }

  /// Switch to the next feed type and reload.
  pub async fn cycle_feed(&mut self) -> anyhow::Result<()> {
    let current = self.query.feed.unwrap_or_default();
    let at = FEEDS.iter().position(|f| *f == current).unwrap_or(0);
    self.query.feed = Some(FEEDS[(at + 1) % FEEDS.len()]);
    self.load_feed().await
  }

  /// Transition to [`Screen::Entity`] for `entity_id`.
  pub async fn open_entity(&mut self, entity_id: i64) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    let details = self.catalog.entity_details(entity_id).await?;

    let mut query = self.query.first_page();
    query.feed = None;
    let activities = self.catalog.entity_activities(entity_id, &query).await?;

    self.editor = Some(DescriptionEditor::from_details(&details));
    self.entity = Some(details);
    self.entity_activities = activities;
    self.entity_scroll = 0;
    self.screen = Screen::Entity;
    self.status_msg.clear();
    Ok(())
  }

  fn close_entity(&mut self) {
    self.screen = Screen::Feed;
    self.entity = None;
    self.entity_activities.clear();
    self.editor = None;
  }

  /// Show a failed action in the status bar without leaving the UI.
  fn report(&mut self, result: anyhow::Result<()>) {
    if let Err(e) = result {
      tracing::warn!("request failed: {e:#}");
      self.status_msg = format!("Error: {e:#}");
    }
  }

  // ── Saving ────────────────────────────────────────────────────────────────

  /// Spawn the save of the current draft. The outcome arrives as an
  /// [`AppEvent::Saved`].
  fn start_save(&mut self) {
    let Some(request) = self.editor.as_mut().and_then(DescriptionEditor::begin_save)
    else {
      return;
    };

    tracing::info!(entity_id = request.entity_id, "saving description");
    self.status_msg = "Saving…".into();

    let catalog = Arc::clone(&self.catalog);
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let outcome = catalog
        .update_description(request.entity_id, request.text)
        .await;
      // The receiver only goes away when the app is shutting down.
      let _ = tx.send(AppEvent::Saved {
        ticket: request.ticket,
        entity_id: request.entity_id,
        outcome,
      });
    });
  }

  pub fn handle_event(&mut self, event: AppEvent) {
    match event {
      AppEvent::Saved { ticket, entity_id, outcome } => {
        match &outcome {
          Ok(_) => {
            tracing::info!(entity_id, "description saved");
            self.status_msg = "Description saved".into();
          }
          Err(failure) => {
            tracing::warn!(entity_id, reason = failure.message(), "description save failed");
            self.status_msg.clear();
          }
        }

        if let (Ok(saved), Some(entity)) = (&outcome, self.entity.as_mut())
          && entity.id == entity_id
        {
          entity.internal_description = Some(saved.clone());
        }

        if let Some(editor) = self.editor.as_mut()
          && editor.entity_id() == entity_id
        {
          editor.finish_save(ticket, outcome);
        }
      }
    }
  }

  /// Apply every completion that has arrived since the last frame.
  pub fn drain_events(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      self.handle_event(event);
    }
  }

  /// Wait for the next completion and apply it.
  #[cfg(test)]
  pub async fn next_event(&mut self) {
    if let Some(event) = self.events_rx.recv().await {
      self.handle_event(event);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.editor.as_ref().is_some_and(DescriptionEditor::is_editing) {
      self.handle_editing_key(key);
      return Ok(true);
    }

    match self.screen {
      Screen::Feed => self.handle_feed_key(key).await,
      Screen::Entity => self.handle_entity_key(key).await,
    }
  }

  fn handle_editing_key(&mut self, key: KeyEvent) {
    let Some(editor) = self.editor.as_mut() else {
      return;
    };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
      KeyCode::Esc => {
        editor.cancel();
        self.status_msg.clear();
      }
      KeyCode::Tab => editor.toggle_tab(),
      KeyCode::Char('s') if ctrl => self.start_save(),
      _ if ctrl => {}
      code => {
        let writing = editor.draft().is_some_and(|d| d.tab == EditorTab::Write);
        let Some(text) = editor.draft_text_mut().filter(|_| writing) else {
          return;
        };
        match code {
          KeyCode::Char(c) => text.push(c),
          KeyCode::Enter => text.push('\n'),
          KeyCode::Backspace => {
            text.pop();
          }
          _ => {}
        }
      }
    }
  }

  async fn handle_feed_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.activities.len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Char('n') => {
        let result = self.load_more().await;
        self.report(result);
      }
      KeyCode::Char('r') => {
        let result = self.load_feed().await;
        self.report(result);
      }
      KeyCode::Char('f') => {
        let result = self.cycle_feed().await;
        self.report(result);
      }
      KeyCode::Char('d') => self.hide_all_details = !self.hide_all_details,

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.selected().map(|a| a.data_entity.id) {
          let result = self.open_entity(id).await;
          self.report(result);
        }
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_entity_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_entity(),

      KeyCode::Char('e') => {
        if let Some(editor) = self.editor.as_mut() {
          editor.edit();
        }
      }
      KeyCode::Char('d') => self.hide_all_details = !self.hide_all_details,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.entity_scroll + 1 < self.entity_activities.len() {
          self.entity_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.entity_scroll = self.entity_scroll.saturating_sub(1);
      }

      _ => {}
    }
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::VecDeque, sync::Mutex};

  use chrono::{TimeZone, Utc};
  use loupe_core::editor::EditorState;
  use tokio::sync::Notify;

  use super::*;

  #[derive(Default)]
  struct StubCatalog {
    pages:   Mutex<VecDeque<Vec<Activity>>>,
    queries: Mutex<Vec<ActivityQuery>>,
    saves:   Mutex<VecDeque<Result<String, SaveFailure>>>,
    /// When set, saves wait for a permit before answering.
    gate:    Option<Notify>,
  }

  impl Catalog for StubCatalog {
    type Error = std::io::Error;

    async fn list_activities(
      &self,
      query: &ActivityQuery,
    ) -> Result<Vec<Activity>, Self::Error> {
      self.queries.lock().unwrap().push(query.clone());
      Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn activity_counts(
      &self,
      _query: &ActivityQuery,
    ) -> Result<ActivityCounts, Self::Error> {
      Ok(ActivityCounts { total_count: 3, ..Default::default() })
    }

    async fn entity_activities(
      &self,
      _entity_id: i64,
      _query: &ActivityQuery,
    ) -> Result<Vec<Activity>, Self::Error> {
      Ok(Vec::new())
    }

    async fn entity_details(&self, entity_id: i64) -> Result<DataEntityDetails, Self::Error> {
      Ok(DataEntityDetails {
        id:                   entity_id,
        external_name:        Some("orders".into()),
        internal_name:        None,
        entity_classes:       vec![],
        internal_description: Some("foo".into()),
        external_description: None,
      })
    }

    async fn update_description(
      &self,
      _entity_id: i64,
      text: String,
    ) -> Result<String, SaveFailure> {
      if let Some(gate) = &self.gate {
        gate.notified().await;
      }
      let scripted = self.saves.lock().unwrap().pop_front();
      scripted.unwrap_or(Ok(text))
    }
  }

  fn activity(id: i64) -> Activity {
    serde_json::from_value(serde_json::json!({
      "id": id,
      "dataEntity": { "id": 7, "externalName": "orders" },
      "eventType": "DESCRIPTION_UPDATED",
      "systemEvent": false,
      "createdAt": format!("2024-03-10T12:00:{:02}Z", 59 - id),
    }))
    .unwrap()
  }

  fn app(catalog: StubCatalog, page_size: u32) -> App<StubCatalog> {
    let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
    let mut query = ActivityQuery::last_days(now, 7).unwrap();
    query.size = page_size;
    let renderer = ActivityRenderer::new(
      OverviewLinks::new("http://catalog"),
      LocalDates::new("%Y-%m-%d"),
    );
    App::new(Arc::new(catalog), query, renderer, false)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn ctrl(c: char) -> KeyEvent { KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL) }

  async fn press(app: &mut App<StubCatalog>, keys: &[KeyEvent]) {
    for k in keys {
      assert!(app.handle_key(*k).await.unwrap());
    }
  }

  async fn editing_app(catalog: StubCatalog) -> App<StubCatalog> {
    let mut app = app(catalog, 30);
    app.open_entity(7).await.unwrap();
    press(&mut app, &[key(KeyCode::Char('e')), key(KeyCode::Char('!'))]).await;
    app
  }

  fn draft_text(app: &App<StubCatalog>) -> &str {
    app.editor.as_ref().and_then(|e| e.draft()).map(|d| d.text.as_str()).unwrap()
  }

  #[tokio::test]
  async fn full_page_enables_next_page_with_cursor() {
    let catalog = StubCatalog::default();
    catalog
      .pages
      .lock()
      .unwrap()
      .extend([vec![activity(1), activity(2)], vec![activity(3)]]);
    let mut app = app(catalog, 2);

    app.load_feed().await.unwrap();
    assert!(app.has_more);
    assert_eq!(app.counts.total_count, 3);

    press(&mut app, &[key(KeyCode::Char('n'))]).await;
    assert_eq!(app.activities.len(), 3);
    assert!(!app.has_more);

    let queries = app.catalog.queries.lock().unwrap();
    assert_eq!(queries[1].last_event_id, Some(2));
  }

  #[tokio::test]
  async fn feed_cycles_through_types() {
    let mut app = app(StubCatalog::default(), 30);
    press(&mut app, &[key(KeyCode::Char('f'))]).await;
    assert_eq!(app.query.feed, Some(ActivityFeedType::MyObjects));
    press(&mut app, &[key(KeyCode::Char('f')); 3]).await;
    assert_eq!(app.query.feed, Some(ActivityFeedType::All));
  }

  #[tokio::test]
  async fn details_toggle_flips_the_flag() {
    let mut app = app(StubCatalog::default(), 30);
    press(&mut app, &[key(KeyCode::Char('d'))]).await;
    assert!(app.hide_all_details);
  }

  #[tokio::test]
  async fn failed_save_keeps_the_draft() {
    let catalog = StubCatalog::default();
    catalog
      .saves
      .lock()
      .unwrap()
      .push_back(Err(SaveFailure::new("Service Unavailable")));
    let mut app = editing_app(catalog).await;

    press(&mut app, &[ctrl('s')]).await;
    app.next_event().await;

    let editor = app.editor.as_ref().unwrap();
    assert!(editor.is_editing());
    assert_eq!(editor.error(), "Service Unavailable");
    assert_eq!(draft_text(&app), "foo!");
  }

  #[tokio::test]
  async fn successful_save_returns_to_viewing() {
    let mut app = editing_app(StubCatalog::default()).await;

    press(&mut app, &[ctrl('s')]).await;
    app.next_event().await;

    let editor = app.editor.as_ref().unwrap();
    assert_eq!(editor.state(), &EditorState::Viewing);
    assert_eq!(editor.error(), "");
    assert_eq!(editor.persisted(), "foo!");
    assert_eq!(
      app.entity.as_ref().unwrap().internal_description.as_deref(),
      Some("foo!")
    );
  }

  #[tokio::test]
  async fn cancel_stays_available_while_saving() {
    let catalog = StubCatalog { gate: Some(Notify::new()), ..Default::default() };
    let mut app = editing_app(catalog).await;

    press(&mut app, &[ctrl('s'), key(KeyCode::Esc)]).await;
    assert!(!app.editor.as_ref().unwrap().is_editing());
    assert_eq!(app.screen, Screen::Entity);

    app.catalog.gate.as_ref().unwrap().notify_one();
    app.next_event().await;

    let editor = app.editor.as_ref().unwrap();
    assert!(!editor.is_editing());
    assert_eq!(editor.persisted(), "foo!");
  }

  #[tokio::test]
  async fn save_from_a_closed_pane_does_not_finish_the_reopened_one() {
    // Saves never answer on their own; completions are fed in by hand.
    let catalog = StubCatalog { gate: Some(Notify::new()), ..Default::default() };
    let mut app = editing_app(catalog).await;
    let stale = app.editor.as_mut().unwrap().begin_save().unwrap();

    press(&mut app, &[key(KeyCode::Esc), key(KeyCode::Esc)]).await;
    assert_eq!(app.screen, Screen::Feed);

    app.open_entity(7).await.unwrap();
    press(&mut app, &[key(KeyCode::Char('e')), key(KeyCode::Char('Z')), ctrl('s')]).await;
    assert!(app.editor.as_ref().unwrap().is_save_in_flight());

    app.handle_event(AppEvent::Saved {
      ticket:    stale.ticket,
      entity_id: 7,
      outcome:   Ok("foo!".into()),
    });

    let editor = app.editor.as_ref().unwrap();
    assert!(editor.is_editing());
    assert!(editor.is_save_in_flight());
    assert_eq!(draft_text(&app), "fooZ");
    assert_eq!(editor.persisted(), "foo!");
  }

  #[tokio::test]
  async fn preview_tab_ignores_typing() {
    let mut app = editing_app(StubCatalog::default()).await;
    press(&mut app, &[key(KeyCode::Tab), key(KeyCode::Char('x'))]).await;
    assert_eq!(draft_text(&app), "foo!");
    press(&mut app, &[key(KeyCode::Tab), key(KeyCode::Backspace)]).await;
    assert_eq!(draft_text(&app), "foo");
  }

  #[tokio::test]
  async fn escape_leaves_the_entity_screen_when_viewing() {
    let mut app = app(StubCatalog::default(), 30);
    app.open_entity(7).await.unwrap();
    press(&mut app, &[key(KeyCode::Esc)]).await;
    assert_eq!(app.screen, Screen::Feed);
    assert!(app.editor.is_none());
  }
}
