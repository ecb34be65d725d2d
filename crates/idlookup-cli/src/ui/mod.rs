//! TUI rendering: orchestrates all panes.

pub mod result_cards;
pub mod search_form;

use chrono::Local;
use idlookup_core::{
  coordinator::{Indicator, Loading},
  query::Mode,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Focus, Readiness};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let form_height = match app.coordinator.mode() {
    Mode::Identity => 4,
    Mode::Name => 5,
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),           // header
      Constraint::Length(form_height), // search form
      Constraint::Length(1),           // indicator
      Constraint::Min(0),              // result cards
      Constraint::Length(1),           // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  search_form::draw(f, rows[1], app);
  draw_indicator(f, rows[2], app);
  result_cards::draw(f, rows[3], app);
  draw_status(f, rows[4], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " idlookup  [F2] mode  [Ctrl-L] clear  [Ctrl-C] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("session {}  {date} ", app.coordinator.session().id),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Indicator ────────────────────────────────────────────────────────────────

fn draw_indicator(f: &mut Frame, area: Rect, app: &App) {
  let span = if let Some(loading) = app.coordinator.phase().loading() {
    let text = match loading {
      Loading::Local => " Searching local records… ⏳",
      Loading::Authority => " Querying the authority source… ⏳",
    };
    Span::styled(text, Style::default().fg(Color::Yellow))
  } else {
    match app.coordinator.indicator() {
      Indicator::Hidden => Span::raw(""),
      Indicator::NoResults => Span::styled(
        " No results found.",
        Style::default().fg(Color::Gray),
      ),
      Indicator::Error(msg) => Span::styled(
        format!(" {msg}"),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
      ),
      Indicator::Invalid(e) => {
        Span::styled(format!(" {e}"), Style::default().fg(Color::Magenta))
      }
    }
  };
  f.render_widget(Paragraph::new(Line::from(span)), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.focus {
    Focus::Results => ("RESULTS", "↑↓/jk move  Enter/e complete record  i edit  Tab focus  q quit"),
    _ => ("INPUT", "Type to edit  Enter search  Tab focus  Esc results"),
  };

  let status = if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else {
    match &app.readiness {
      Readiness::Checking => "Checking backend…".to_string(),
      Readiness::NotReady(msg) => format!("Backend loading: {msg}"),
      Readiness::Unreachable(_) => "Backend unreachable, retrying…".to_string(),
      Readiness::Ready(_) => hints.to_string(),
    }
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
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
