//! GitHub-flavoured markdown → ratatui lines, for the description preview.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
};

/// Render `source` into styled lines. Tables, strikethrough and task lists
/// are recognised.
pub fn to_lines(source: &str) -> Vec<Line<'static>> {
  let options =
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
  let mut writer = Writer::default();
  for event in Parser::new_ext(source, options) {
    writer.event(event);
  }
  writer.finish()
}

struct ListState {
  next_number: Option<u64>,
}

#[derive(Default)]
struct Writer {
  lines:          Vec<Line<'static>>,
  current:        Vec<Span<'static>>,
  styles:         Vec<Style>,
  lists:          Vec<ListState>,
  links:          Vec<String>,
  quote_depth:    usize,
  in_code_block:  bool,
  needs_blank:    bool,
  pending_bullet: bool,
}

impl Writer {
  fn style(&self) -> Style { self.styles.last().copied().unwrap_or_default() }

  fn push_style(&mut self, style: Style) { self.styles.push(self.style().patch(style)); }

  fn event(&mut self, event: Event<'_>) {
    match event {
      Event::Start(tag) => self.start(tag),
      Event::End(tag) => self.end(tag),
      Event::Text(text) => self.text(&text),
      Event::Code(code) => {
        self.bullet();
        self.current.push(Span::styled(
          code.to_string(),
          Style::default().fg(Color::Yellow),
        ));
      }
      Event::Html(html) | Event::InlineHtml(html) => {
        self.current.push(Span::styled(
          html.trim_end().to_string(),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Event::SoftBreak => self.current.push(Span::raw(" ")),
      Event::HardBreak => self.flush(),
      Event::Rule => {
        self.blank();
        self
          .lines
          .push(Line::styled("─".repeat(24), Style::default().fg(Color::DarkGray)));
        self.needs_blank = true;
      }
      Event::TaskListMarker(checked) => {
        self.pending_bullet = false;
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        let mark = if checked { "[x] " } else { "[ ] " };
        self.current.push(Span::raw(format!("{indent}{mark}")));
      }
      _ => {}
    }
  }

  fn start(&mut self, tag: Tag<'_>) {
    match tag {
      Tag::Heading { .. } => {
        self.blank();
        self.push_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
      }
      Tag::Paragraph => {
        if self.lists.is_empty() {
          self.blank();
        }
      }
      Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
      Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
      Tag::Strikethrough => {
        self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
      }
      Tag::CodeBlock(_) => {
        self.blank();
        self.in_code_block = true;
      }
      Tag::BlockQuote(_) => {
        self.blank();
        self.quote_depth += 1;
        self.push_style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC));
      }
      Tag::Link { dest_url, .. } => {
        self.links.push(dest_url.to_string());
        self.push_style(
          Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        );
      }
      Tag::List(start) => {
        if self.lists.is_empty() {
          self.blank();
        }
        self.flush();
        self.lists.push(ListState { next_number: start });
      }
      Tag::Item => {
        self.flush();
        self.pending_bullet = true;
      }
      Tag::TableCell => {
        if !self.current.is_empty() {
          self.current.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
      }
      Tag::Table(_) => self.blank(),
      _ => {}
    }
  }

  fn end(&mut self, tag: TagEnd) {
    match tag {
      TagEnd::Heading(_) => {
        self.styles.pop();
        self.flush();
        self.needs_blank = true;
      }
      TagEnd::Paragraph => {
        self.flush();
        if self.lists.is_empty() {
          self.needs_blank = true;
        }
      }
      TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
        self.styles.pop();
      }
      TagEnd::CodeBlock => {
        self.in_code_block = false;
        self.needs_blank = true;
      }
      TagEnd::BlockQuote(_) => {
        self.flush();
        self.styles.pop();
        self.quote_depth = self.quote_depth.saturating_sub(1);
        self.needs_blank = true;
      }
      TagEnd::Link => {
        self.styles.pop();
        if let Some(url) = self.links.pop() {
          self.current.push(Span::styled(
            format!(" <{url}>"),
            Style::default().fg(Color::DarkGray),
          ));
        }
      }
      TagEnd::List(_) => {
        self.flush();
        self.lists.pop();
        if self.lists.is_empty() {
          self.needs_blank = true;
        }
      }
      TagEnd::Item => self.flush(),
      TagEnd::TableHead => {
        self.flush();
        self
          .lines
          .push(Line::styled("─".repeat(24), Style::default().fg(Color::DarkGray)));
      }
      TagEnd::TableRow => self.flush(),
      TagEnd::Table => self.needs_blank = true,
      _ => {}
    }
  }

  fn text(&mut self, text: &str) {
    if self.in_code_block {
      let style = Style::default().fg(Color::Yellow);
      for line in text.lines() {
        self.lines.push(Line::from(Span::styled(format!("    {line}"), style)));
      }
      return;
    }
    self.bullet();
    let style = self.style();
    self.current.push(Span::styled(text.to_string(), style));
  }

  /// Emit the list marker for an item whose first text is arriving.
  fn bullet(&mut self) {
    if !std::mem::take(&mut self.pending_bullet) {
      return;
    }
    let indent = "  ".repeat(self.lists.len().saturating_sub(1));
    let marker = match self.lists.last_mut() {
      Some(ListState { next_number: Some(n) }) => {
        let marker = format!("{n}. ");
        *n += 1;
        marker
      }
      _ => "• ".to_string(),
    };
    self.current.push(Span::raw(format!("{indent}{marker}")));
  }

  fn blank(&mut self) {
    if std::mem::take(&mut self.needs_blank) && !self.lines.is_empty() {
      self.lines.push(Line::default());
    }
  }

  fn flush(&mut self) {
    if self.current.is_empty() {
      return;
    }
    let mut spans = Vec::with_capacity(self.current.len() + 1);
    if self.quote_depth > 0 {
      spans.push(Span::styled(
        "│ ".repeat(self.quote_depth),
        Style::default().fg(Color::DarkGray),
      ));
    }
    spans.append(&mut self.current);
    self.lines.push(Line::from(spans));
  }

  fn finish(mut self) -> Vec<Line<'static>> {
    self.flush();
    self.lines
  }
}
