//! Per-frame layout of every pane.

pub mod activity;
pub mod entity_pane;
pub mod feed_list;
pub mod markdown;

use loupe_core::{catalog::Catalog, query::ActivityCounts, render::EntityLinkResolver};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<C: Catalog + 'static>(f: &mut Frame, app: &App<C>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// Per-feed totals, the active feed highlighted.
fn counts_line(counts: &ActivityCounts, active: usize) -> Vec<Span<'static>> {
  let feeds = [
    ("All", counts.total_count),
    ("Mine", counts.my_objects_count),
    ("Down", counts.downstream_count),
    ("Up", counts.upstream_count),
  ];
  feeds
    .iter()
    .enumerate()
    .map(|(i, (label, count))| {
      let style = if i == active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Gray)
      };
      Span::styled(format!("{label} {count}  "), style)
    })
    .collect()
}

fn draw_header<C: Catalog + 'static>(f: &mut Frame, area: Rect, app: &App<C>) {
  let left = Span::styled(
    " loupe  [f] feed  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let active = app.query.feed.unwrap_or_default() as usize;
  let right = counts_line(&app.counts, active);

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width: u16 = right.iter().map(|s| s.content.chars().count() as u16).sum();
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let mut spans = vec![left, Span::raw(" ".repeat(pad as usize))];
  spans.extend(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<C: Catalog + 'static>(f: &mut Frame, area: Rect, app: &App<C>) {
  if app.screen == Screen::Entity
    && let (Some(entity), Some(editor)) = (&app.entity, &app.editor)
  {
    let activity_lines: Vec<Line<'static>> = app
      .entity_activities
      .iter()
      .skip(app.entity_scroll)
      .flat_map(|a| {
        let view = app.renderer.render(a, app.hide_all_details);
        let mut lines = activity::lines(&view, app.renderer.dates());
        lines.push(Line::default());
        lines
      })
      .collect();
    let link = app.renderer.links().entity_link(entity.id);
    entity_pane::draw(f, area, entity, &link, editor, &activity_lines);
    return;
  }

  // Split into left list pane (40%) and right detail pane (60%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  feed_list::draw_list(f, cols[0], app);
  feed_list::draw_detail(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<C: Catalog + 'static>(f: &mut Frame, area: Rect, app: &App<C>) {
  let editing = app.editor.as_ref().is_some_and(|e| e.is_editing());
  let (mode_label, hints) = match app.screen {
    Screen::Entity if editing => ("EDIT", "Tab write/preview  Ctrl-S save  Esc cancel"),
    Screen::Entity => (
      "ENTITY",
      "e edit  ↑↓/jk scroll activity  d details  Esc back  q quit",
    ),
    Screen::Feed => (
      "FEED",
      "↑↓/jk navigate  Enter entity  n more  d details  f feed  r reload  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn active_feed_is_highlighted() {
    let counts = ActivityCounts {
      total_count:      12,
      my_objects_count: 3,
      downstream_count: 0,
      upstream_count:   4,
    };
    let spans = counts_line(&counts, 1);
    let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
    assert_eq!(text, "All 12  Mine 3  Down 0  Up 4  ");
    assert_eq!(spans[1].style.fg, Some(Color::Yellow));
    assert_eq!(spans[0].style.fg, Some(Color::Gray));
  }
}
