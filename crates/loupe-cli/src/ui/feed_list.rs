//! Activity feed: the list on the left, the selected activity on the right.

use loupe_core::catalog::Catalog;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::activity;
use crate::app::App;

/// Render the activity list into `area`.
pub fn draw_list<C: Catalog + 'static>(f: &mut Frame, area: Rect, app: &App<C>) {
  let more = if app.has_more { "  [n] more" } else { "" };
  let block = Block::default()
    .title(format!(" Activity ({}){more} ", app.activities.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .activities
    .iter()
    .map(|a| {
      let header = app.renderer.header(a);
      ListItem::new(vec![
        Line::from(Span::styled(
          header.entity_name,
          Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
          Span::styled(a.event_type.label(), Style::default().fg(Color::Cyan)),
          Span::styled(
            format!("  {}", header.occurred_at),
            Style::default().fg(Color::DarkGray),
          ),
        ]),
      ])
    })
    .collect();

  let mut state = ListState::default();
  state.select(if app.activities.is_empty() {
    None
  } else {
    Some(app.cursor)
  });

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

/// Render the selected activity in full into `area`.
pub fn draw_detail<C: Catalog + 'static>(f: &mut Frame, area: Rect, app: &App<C>) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Some(selected) = app.selected() else {
    f.render_widget(
      Paragraph::new("No activity in this range.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  };

  let view = app.renderer.render(selected, app.hide_all_details);
  let mut lines = activity::lines(&view, app.renderer.dates());
  lines.push(Line::default());
  lines.push(Line::styled(
    view.header.entity_link.clone(),
    Style::default().fg(Color::DarkGray),
  ));

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false }),
    area,
  );
}
