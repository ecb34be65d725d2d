//! Result list pane: one card per record.

use idlookup_core::view::Card;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span, Text},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{App, Focus};

/// Render the result cards into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cards = app.cards();

  let block = Block::default()
    .title(format!(" Results ({}) ", cards.len()))
    .borders(Borders::ALL)
    .border_style(if app.focus == Focus::Results {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    });

  let items: Vec<ListItem> = cards.iter().map(card_item).collect();

  let mut state = ListState::default();
  state.select(if cards.is_empty() {
    None
  } else {
    Some(app.cursor)
  });

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
      .highlight_symbol("▌"),
    area,
    &mut state,
  );
}

fn card_item(card: &Card) -> ListItem<'static> {
  let label = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  let row = |name: &'static str, value: &str| {
    Line::from(vec![
      Span::styled(format!("{name:<16}"), label),
      Span::raw(value.to_owned()),
    ])
  };

  let mut lines = vec![
    row("Identity", &card.identity),
    row("Given name(s)", &card.given),
    row("Surname(s)", &card.surname),
    row("Birth date", &card.birth_date),
    row("Birth place", &card.birth_place),
  ];
  if card.is_enrichable() {
    lines.push(Line::from(Span::styled(
      "🔍 incomplete, press Enter to query the authority source",
      Style::default().fg(Color::Yellow),
    )));
  }
  lines.push(Line::from(""));
  ListItem::new(Text::from(lines))
}
