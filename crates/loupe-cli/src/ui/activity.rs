//! Turns a rendered [`ActivityView`] into terminal lines.
//!
//! With `hide_all_details` set, list-shaped bodies collapse to a one-line
//! count summary and text bodies to their title. Custom group notes and
//! alerts have no collapsed form.

use chrono::{DateTime, Utc};
use loupe_core::{
  activity::{
    ActivityEventType,
    AlertHaltConfigActivityState,
    CustomGroupActivityState,
    OwnershipActivityState,
    TermActivityState,
  },
  entity::EntityClass,
  render::{
    ActivityBody,
    ActivityHeader,
    ActivityView,
    ActorBadge,
    AlertView,
    ArrayView,
    Chip,
    CustomGroupView,
    DateFormatter,
    ListView,
    TextView,
  },
};
use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
};

const ADDED: Color = Color::Green;
const REMOVED: Color = Color::Red;
const CHANGED: Color = Color::Yellow;

/// All lines for one activity: header, then body.
pub fn lines(view: &ActivityView, dates: &impl DateFormatter) -> Vec<Line<'static>> {
  let mut out = header_lines(&view.header);
  if let Some(body) = &view.body {
    out.extend(body_lines(body, dates));
  }
  out
}

/// Entity name with class badges, then actor and time.
pub fn header_lines(header: &ActivityHeader) -> Vec<Line<'static>> {
  let mut title = vec![Span::styled(
    header.entity_name.clone(),
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )];
  for class in &header.entity_classes {
    title.push(Span::styled(
      format!(" [{class}]"),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let actor = match &header.actor {
    ActorBadge::System => Span::styled("⚙ system", Style::default().fg(Color::Magenta)),
    ActorBadge::Person(name) => Span::raw(format!("● {name}")),
  };

  vec![
    Line::from(title),
    Line::from(vec![
      actor,
      Span::styled(
        format!("  {}", header.occurred_at),
        Style::default().fg(Color::DarkGray),
      ),
    ]),
  ]
}

pub fn body_lines(body: &ActivityBody, dates: &impl DateFormatter) -> Vec<Line<'static>> {
  match body {
    ActivityBody::Owners { event_type, owners } => list_lines(
      event_type.label(),
      owners,
      owner_text,
      |old, new| {
        format!(
          "{}: {} → {}",
          new.owner_name,
          old.role_name.as_deref().unwrap_or("no role"),
          new.role_name.as_deref().unwrap_or("no role"),
        )
      },
    ),
    ActivityBody::Text(view) => text_lines(view),
    ActivityBody::Array(view) => array_lines(view),
    ActivityBody::Terms(terms) => list_lines("Terms", terms, term_text, |_, new| term_text(new)),
    ActivityBody::DatasetTerms(view) => list_lines(
      &format!("Terms in {} column", view.field_name.as_deref().unwrap_or_default()),
      &view.terms,
      term_text,
      |_, new| term_text(new),
    ),
    ActivityBody::Enums(view) => list_lines(
      &format!("Values of {}", view.field_name.as_deref().unwrap_or_default()),
      &view.values,
      |v| match &v.description {
        Some(d) if !d.is_empty() => format!("{}: {d}", v.name),
        _ => v.name.clone(),
      },
      |old, new| {
        format!(
          "{}: {} → {}",
          new.name,
          old.description.as_deref().unwrap_or_default(),
          new.description.as_deref().unwrap_or_default(),
        )
      },
    ),
    ActivityBody::CustomGroupNote { change, group_name } => vec![Line::from(format!(
      "Custom group {group_name} {}",
      change.verb()
    ))],
    ActivityBody::CustomGroup(view) => custom_group_lines(view),
    ActivityBody::Alert(view) => alert_lines(view, dates),
  }
}

// ─── Lists ────────────────────────────────────────────────────────────────────

fn title(text: &str) -> Line<'static> {
  Line::styled(text.to_string(), Style::default().add_modifier(Modifier::BOLD))
}

fn marked(marker: char, text: String, color: Color) -> Line<'static> {
  Line::styled(format!("  {marker} {text}"), Style::default().fg(color))
}

/// Title plus one marked line per item, or a single summary line when
/// collapsed.
fn list_lines<T>(
  name: &str,
  view: &ListView<T>,
  item: impl Fn(&T) -> String,
  changed: impl Fn(&T, &T) -> String,
) -> Vec<Line<'static>> {
  if view.hide_all_details {
    return vec![title(&format!("{name}: {}", view.diff.summary()))];
  }

  let diff = &view.diff;
  let mut out = vec![title(name)];
  out.extend(diff.added.iter().map(|t| marked('+', item(t), ADDED)));
  out.extend(diff.removed.iter().map(|t| marked('-', item(t), REMOVED)));
  out.extend(
    diff
      .changed
      .iter()
      .map(|(old, new)| marked('~', changed(old, new), CHANGED)),
  );
  out.extend(
    diff
      .unchanged
      .iter()
      .map(|t| Line::styled(format!("    {}", item(t)), Style::default().fg(Color::DarkGray))),
  );
  out
}

fn owner_text(owner: &OwnershipActivityState) -> String {
  match owner.role_name.as_deref().filter(|r| !r.is_empty()) {
    Some(role) => format!("{} ({role})", owner.owner_name),
    None => owner.owner_name.clone(),
  }
}

fn term_text(term: &TermActivityState) -> String {
  let name = match &term.namespace {
    Some(ns) => format!("{}:{}", ns.name, term.name),
    None => term.name.clone(),
  };
  if term.is_description_link {
    format!("{name} (via description)")
  } else {
    name
  }
}

fn chip_text(chip: &Chip) -> String {
  if chip.important {
    format!("★ {}", chip.name)
  } else {
    chip.name.clone()
  }
}

fn array_lines(view: &ArrayView) -> Vec<Line<'static>> {
  list_lines(&view.name, &view.items, chip_text, |_, new| chip_text(new))
}

// ─── Text ─────────────────────────────────────────────────────────────────────

fn text_lines(view: &TextView) -> Vec<Line<'static>> {
  let heading = match view.start_text {
    Some(start) => format!("{start} {}", view.name),
    None => view.name.clone(),
  };
  let mut out = vec![title(&heading)];
  if view.hide_all_details {
    return out;
  }

  if let Some(old) = view.old.as_deref().filter(|s| !s.is_empty()) {
    out.extend(old.lines().map(|l| marked('-', l.to_string(), REMOVED)));
  }
  if let Some(new) = view.new.as_deref().filter(|s| !s.is_empty()) {
    out.extend(new.lines().map(|l| marked('+', l.to_string(), ADDED)));
  }
  out
}

// ─── Custom groups ────────────────────────────────────────────────────────────

fn classes(classes: &[EntityClass]) -> String {
  classes
    .iter()
    .map(|c| c.name.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

fn custom_group_lines(view: &CustomGroupView) -> Vec<Line<'static>> {
  let fields = |g: &CustomGroupActivityState| {
    [
      ("Name", g.name.clone().unwrap_or_default()),
      ("Namespace", g.namespace_name.clone().unwrap_or_default()),
      (
        "Type",
        g.entity_type
          .as_ref()
          .map(|t| t.name.clone())
          .unwrap_or_default(),
      ),
      ("Classes", classes(&g.entity_classes)),
    ]
  };

  let changed: Vec<_> = fields(&view.old)
    .into_iter()
    .zip(fields(&view.new))
    .filter(|((_, old), (_, new))| old != new)
    .collect();

  if view.hide_all_details {
    let summary = match changed.len() {
      0 => "no changes".to_string(),
      1 => "1 field changed".to_string(),
      n => format!("{n} fields changed"),
    };
    return vec![title(&format!("Custom group: {summary}"))];
  }

  let mut out = vec![title("Custom group")];
  out.extend(
    changed
      .into_iter()
      .map(|((label, old), (_, new))| marked('~', format!("{label}: {old} → {new}"), CHANGED)),
  );
  out
}

// ─── Alerts ───────────────────────────────────────────────────────────────────

fn alert_lines(view: &AlertView, dates: &impl DateFormatter) -> Vec<Line<'static>> {
  let old = view.old.alert.clone().unwrap_or_default();
  let new = view.new.alert.clone().unwrap_or_default();
  let kind = new
    .alert_type
    .as_deref()
    .or(old.alert_type.as_deref())
    .unwrap_or("Alert")
    .replace('_', " ")
    .to_lowercase();

  match view.event_type {
    ActivityEventType::OpenAlertReceived => {
      let mut line = format!("Alert opened: {kind}");
      if let Some(at) = &new.last_created_at {
        line.push_str(&format!(" at {}", dates.format_date(at)));
      }
      vec![Line::styled(line, Style::default().fg(REMOVED))]
    }
    ActivityEventType::ResolvedAlertReceived => {
      vec![Line::styled(format!("Alert resolved: {kind}"), Style::default().fg(ADDED))]
    }
    ActivityEventType::AlertStatusUpdated => {
      let mut line = format!(
        "Alert {kind} status: {} → {}",
        old.status.as_deref().unwrap_or("unknown"),
        new.status.as_deref().unwrap_or("unknown"),
      );
      if let Some(by) = new.status_updated_by.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!(" by {by}"));
      }
      vec![Line::from(line)]
    }
    _ => halt_config_lines(
      &view.old.alert_halt_config.clone().unwrap_or_default(),
      &view.new.alert_halt_config.clone().unwrap_or_default(),
      dates,
    ),
  }
}

fn halt_config_lines(
  old: &AlertHaltConfigActivityState,
  new: &AlertHaltConfigActivityState,
  dates: &impl DateFormatter,
) -> Vec<Line<'static>> {
  let pairs: [(&str, Option<DateTime<Utc>>, Option<DateTime<Utc>>); 4] = [
    ("Failed job", old.failed_job_halt_until, new.failed_job_halt_until),
    ("Failed DQ test", old.failed_dq_test_halt_until, new.failed_dq_test_halt_until),
    ("Incomplete run", old.incomplete_run_halt_until, new.incomplete_run_halt_until),
    (
      "Distribution anomaly",
      old.distribution_anomaly_halt_until,
      new.distribution_anomaly_halt_until,
    ),
  ];

  let mut out = vec![title("Alert notifications")];
  for (kind, before, after) in pairs {
    if before == after {
      continue;
    }
    let line = match after {
      Some(until) => format!("{kind}: muted until {}", dates.format_date(&until)),
      None => format!("{kind}: unmuted"),
    };
    out.push(marked('~', line, CHANGED));
  }
  out
}

#[cfg(test)]
mod tests {
  use loupe_core::{activity::Activity, render::ActivityRenderer};

  use super::*;

  fn dates(at: &DateTime<Utc>) -> String { at.format("%Y-%m-%d").to_string() }

  fn view(json: serde_json::Value, hide_all_details: bool) -> ActivityView {
    let mut activity = serde_json::json!({
      "id": 1,
      "dataEntity": { "id": 7, "externalName": "orders", "entityClasses": [{ "id": 1, "name": "Table" }] },
      "systemEvent": false,
      "createdBy": { "identity": { "username": "alice123" } },
      "createdAt": "2024-03-10T12:00:00Z",
    });
    for (k, v) in json.as_object().unwrap() {
      activity[k] = v.clone();
    }
    let activity: Activity = serde_json::from_value(activity).unwrap();
    ActivityRenderer::new(|id: i64| format!("/e/{id}"), dates).render(&activity, hide_all_details)
  }

  fn texts(lines: &[Line]) -> Vec<String> {
    lines
      .iter()
      .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
      .collect()
  }

  fn tags_update() -> serde_json::Value {
    serde_json::json!({
      "eventType": "TAG_ASSIGNMENT_UPDATED",
      "oldState": { "tags": [{ "name": "pii" }, { "name": "raw" }] },
      "newState": { "tags": [{ "name": "pii" }, { "name": "gold", "important": true }] },
    })
  }

  #[test]
  fn header_shows_classes_actor_and_time() {
    let lines = texts(&lines(&view(tags_update(), false), &dates));
    assert_eq!(lines[0], "orders [Table]");
    assert_eq!(lines[1], "● alice123  2024-03-10");
  }

  #[test]
  fn tags_list_every_change() {
    let lines = texts(&lines(&view(tags_update(), false), &dates));
    assert_eq!(&lines[2..], ["Tags", "  + ★ gold", "  - raw", "    pii"]);
  }

  #[test]
  fn hidden_details_collapse_to_a_summary() {
    let lines = texts(&lines(&view(tags_update(), true), &dates));
    assert_eq!(&lines[2..], ["Tags: 1 added, 1 removed"]);
  }

  #[test]
  fn description_change_shows_old_and_new() {
    let v = view(
      serde_json::json!({
        "eventType": "DESCRIPTION_UPDATED",
        "oldState": { "description": { "description": "old text" } },
        "newState": { "description": { "description": "new text" } },
      }),
      false,
    );
    assert_eq!(&texts(&lines(&v, &dates))[2..], [
      "Description",
      "  - old text",
      "  + new text"
    ]);
  }

  #[test]
  fn status_change_names_both_states() {
    let v = view(
      serde_json::json!({
        "eventType": "ALERT_STATUS_UPDATED",
        "oldState": { "alert": { "type": "FAILED_JOB", "status": "OPEN" } },
        "newState": { "alert": { "type": "FAILED_JOB", "status": "RESOLVED", "statusUpdatedBy": "bob" } },
      }),
      true,
    );
    assert_eq!(&texts(&lines(&v, &dates))[2..], [
      "Alert failed job status: OPEN → RESOLVED by bob"
    ]);
  }

  #[test]
  fn halt_config_lists_changed_windows_only() {
    let v = view(
      serde_json::json!({
        "eventType": "ALERT_HALT_CONFIG_UPDATED",
        "oldState": { "alertHaltConfig": { "failedJobHaltUntil": "2024-03-11T00:00:00Z" } },
        "newState": { "alertHaltConfig": {
          "failedJobHaltUntil": "2024-03-11T00:00:00Z",
          "incompleteRunHaltUntil": "2024-03-12T00:00:00Z",
        } },
      }),
      false,
    );
    assert_eq!(&texts(&lines(&v, &dates))[2..], [
      "Alert notifications",
      "  ~ Incomplete run: muted until 2024-03-12"
    ]);
  }

  #[test]
  fn unrecognized_event_is_header_only() {
    let v = view(serde_json::json!({ "eventType": "DATA_ENTITY_STATUS_UPDATED" }), false);
    assert_eq!(lines(&v, &dates).len(), 2);
  }
}
