//! `loupe`: a terminal viewer for a data catalog's activity feed.
//!
//! # Usage
//!
//! ```
//! loupe --url http://localhost:8080 --token $TOKEN --days 14
//! loupe --config ~/.config/loupe/config.toml --entity 42
//! ```

mod app;
mod client;
mod format;
mod settings;
mod ui;

use std::{
  fs::File,
  io,
  path::Path,
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use chrono::Utc;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use format::{LocalDates, OverviewLinks};
use loupe_core::{query::ActivityQuery, render::ActivityRenderer};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Args, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log to `path`. The terminal belongs to the UI, so without a log file
/// nothing is logged.
fn init_logging(path: &Path) -> Result<()> {
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args)?;

  if let Some(path) = &settings.log_file {
    init_logging(path)?;
  }
  tracing::info!(url = %settings.url, days = settings.days, "starting");

  let mut query = ActivityQuery::last_days(Utc::now(), settings.days)
    .context("invalid activity range")?;
  query.size = settings.page_size;
  query.feed = settings.feed;
  query.event_type = settings.event_type;
  query.validate().context("invalid activity range")?;

  let client = ApiClient::new(ApiConfig {
    base_url: settings.url.clone(),
    token:    settings.token.clone(),
  })?;
  let renderer = ActivityRenderer::new(
    OverviewLinks::new(&settings.url),
    LocalDates::new(settings.date_format.clone()),
  );
  let mut app = App::new(Arc::new(client), query, renderer, settings.hide_details);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data.
  let mut load_result = app.load_feed().await;
  if load_result.is_ok()
    && let Some(id) = args.entity
  {
    load_result = app.open_entity(id).await;
  }

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  if let Err(e) = &run_result {
    tracing::error!("exiting: {e:#}");
  }
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  loop {
    app.drain_events();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      // Resizes are picked up by the next draw.
      _ => {}
    }
  }

  Ok(())
}
