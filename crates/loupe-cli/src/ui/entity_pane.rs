//! Entity pane: custom and pre-defined descriptions, the description
//! editor, and the entity's own activity.

use loupe_core::{
  editor::{DescriptionEditor, EditorState, EditorTab},
  entity::DataEntityDetails,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::markdown;

fn section(title: &str) -> Line<'static> {
  Line::styled(
    title.to_string(),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
  )
}

fn dim(text: &str) -> Line<'static> {
  Line::styled(text.to_string(), Style::default().fg(Color::DarkGray))
}

fn tabs(active: EditorTab) -> Line<'static> {
  let tab = |label: &'static str, tab: EditorTab| {
    if tab == active {
      Span::styled(
        format!(" {label} "),
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
    } else {
      Span::styled(format!(" {label} "), Style::default().fg(Color::DarkGray))
    }
  };
  Line::from(vec![
    tab("Write", EditorTab::Write),
    Span::raw(" "),
    tab("Preview", EditorTab::Preview),
  ])
}

/// The "Custom" and "Pre-defined" description sections.
pub fn description_lines(editor: &DescriptionEditor) -> Vec<Line<'static>> {
  let mut out = vec![section("Custom")];

  match editor.state() {
    EditorState::Viewing => {
      if editor.persisted().is_empty() {
        out.push(dim("Not created."));
      } else {
        out.extend(markdown::to_lines(editor.persisted()));
      }
      out.push(dim(&format!("[e] {}", editor.action_label())));
    }
    EditorState::Editing(draft) => {
      out.push(tabs(draft.tab));
      match draft.tab {
        EditorTab::Write => {
          let mut text: Vec<Line> = draft
            .text
            .split('\n')
            .map(|l| Line::from(l.to_string()))
            .collect();
          if let Some(last) = text.last_mut() {
            last.push_span(Span::styled("▏", Style::default().fg(Color::Cyan)));
          }
          out.extend(text);
        }
        EditorTab::Preview => out.extend(markdown::to_lines(&draft.text)),
      }
      if draft.is_saving() {
        out.push(Line::styled("Saving…", Style::default().fg(Color::Yellow)));
      }
      if !draft.error.is_empty() {
        out.push(Line::styled(draft.error.clone(), Style::default().fg(Color::Red)));
      }
      out.push(dim("Tab write/preview  Ctrl-S save  Esc cancel"));
    }
  }

  if let Some(external) = editor.external() {
    out.push(Line::default());
    out.push(section("Pre-defined"));
    out.extend(markdown::to_lines(external));
  }
  out
}

/// Render the pane into `area`. `activity` holds the already-rendered
/// entity activity.
pub fn draw(
  f: &mut Frame,
  area: Rect,
  entity: &DataEntityDetails,
  link: &str,
  editor: &DescriptionEditor,
  activity: &[Line<'static>],
) {
  let block = Block::default()
    .title(format!(" {} ", entity.display_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut lines = vec![dim(link), Line::default()];
  lines.extend(description_lines(editor));
  lines.push(Line::default());
  lines.push(section("Activity"));
  if activity.is_empty() {
    lines.push(dim("No activity in this range."));
  } else {
    lines.extend(activity.iter().cloned());
  }

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false }),
    area,
  );
}
