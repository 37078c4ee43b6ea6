//! Purchase modal and post-payment download screen.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;

/// A centered `width`×`height` rectangle inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Min(0),
      Constraint::Length(height.min(area.height)),
      Constraint::Min(0),
    ])
    .split(area);
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Min(0),
      Constraint::Length(width.min(area.width)),
      Constraint::Min(0),
    ])
    .split(rows[1]);
  cols[1]
}

// ─── Purchase modal ───────────────────────────────────────────────────────────

/// Render the email-entry modal over the storefront.
pub fn draw_modal(f: &mut Frame, area: Rect, app: &App) {
  let Some(project) = &app.modal_project else {
    return;
  };

  let rect = centered(area, 56, 11);
  f.render_widget(Clear, rect);

  let block = Block::default()
    .title(" Complete Purchase ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let error_line = match &app.modal_error {
    Some(message) => Line::from(Span::styled(
      message.clone(),
      Style::default().fg(Color::Red),
    )),
    None => Line::default(),
  };

  let lines = vec![
    Line::from(Span::styled(
      project.name.clone(),
      Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      format!("₦{} one-time payment", project.price),
      Style::default().fg(Color::Cyan),
    )),
    Line::default(),
    Line::from(Span::styled(
      "Email address (for receipt):",
      Style::default().fg(Color::Gray),
    )),
    Line::from(Span::styled(
      format!("{}_", app.modal_email),
      Style::default().fg(Color::Yellow),
    )),
    error_line,
    Line::default(),
    Line::from(Span::styled(
      format!("[Enter] Pay ₦{} & download   [Esc] Cancel", project.price),
      Style::default().fg(Color::Gray),
    )),
  ];

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ─── Download screen ──────────────────────────────────────────────────────────

/// Render the post-payment success screen into the body area.
pub fn draw_download(f: &mut Frame, area: Rect, app: &App) {
  let rect = centered(area, 64, 13);

  let block = Block::default()
    .title(" Payment Successful ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Green));
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let name = app
    .download_project
    .as_ref()
    .map(|p| p.name.clone())
    .unwrap_or_default();

  let lines = vec![
    Line::from(Span::styled(
      "✔ Payment successful!",
      Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(name),
    Line::default(),
    Line::from(Span::styled(
      "Your download has started automatically. If you leave now, use",
      Style::default().fg(Color::Yellow),
    )),
    Line::from(Span::styled(
      "the same device to \"download again\" without paying twice.",
      Style::default().fg(Color::Yellow),
    )),
    Line::default(),
    Line::from(vec![
      Span::styled("Reference: ", Style::default().fg(Color::Gray)),
      Span::styled(
        app.download_reference.clone(),
        Style::default().fg(Color::White),
      ),
    ]),
    Line::default(),
    Line::from(Span::styled(
      "[d] Download again   [Esc] Back to store",
      Style::default().fg(Color::Gray),
    )),
  ];

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
