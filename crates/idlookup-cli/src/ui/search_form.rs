//! Search form pane: mode tabs and the inputs of the active mode.

use idlookup_core::query::Mode;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Focus};

/// Render the form into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let busy = app.coordinator.is_busy();
  let title = if busy { " Search (busy) " } else { " Search " };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mode = app.coordinator.mode();
  let form = app.coordinator.form();

  let mut lines = vec![mode_tabs(mode)];
  match mode {
    Mode::Identity => {
      lines.push(field_line("Identity number", &form.identity, app.focus == Focus::Identity));
    }
    Mode::Name => {
      lines.push(field_line("Given name(s)", &form.given, app.focus == Focus::Given));
      lines.push(field_line("Surname(s)", &form.surname, app.focus == Focus::Surname));
    }
  }

  let style = if busy {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default()
  };
  f.render_widget(Paragraph::new(lines).style(style), inner);
}

fn mode_tabs(mode: Mode) -> Line<'static> {
  let active = Style::default()
    .fg(Color::Black)
    .bg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let idle = Style::default().fg(Color::DarkGray);
  let (identity, name) = match mode {
    Mode::Identity => (active, idle),
    Mode::Name => (idle, active),
  };
  Line::from(vec![
    Span::styled(" By identity ", identity),
    Span::raw(" "),
    Span::styled(" By name ", name),
  ])
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
  let label_style = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let mut spans = vec![
    Span::styled(format!("{label:<16}"), label_style),
    Span::raw(value),
  ];
  if focused {
    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
  }
  Line::from(spans)
}
