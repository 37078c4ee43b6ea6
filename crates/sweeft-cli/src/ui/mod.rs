//! TUI rendering — orchestrates all panes.

pub mod checkout;
pub mod storefront;

use std::time::Duration;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, NoticeKind, Screen};

/// How long a transient notice stays on the status bar.
const NOTICE_TTL: Duration = Duration::from_secs(5);

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let banner_height = u16::from(app.catalog_error.is_some());

  // Vertical stack: header, optional error banner, filter bar, body, status.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),             // header
      Constraint::Length(banner_height), // persistent load-failure banner
      Constraint::Length(2),             // search + filters
      Constraint::Min(0),                // body
      Constraint::Length(1),             // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);
  if app.catalog_error.is_some() {
    draw_banner(f, rows[1], app);
  }
  draw_filters(f, rows[2], app);
  draw_body(f, rows[3], app);
  draw_status(f, rows[4], app);

  // Modals render last, over the body.
  if app.screen == Screen::Purchase {
    checkout::draw_modal(f, area, app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " SWEEFT PROJECT STORE  [/] search  [s] school  [d] dept  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::Blue));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Load-failure banner ──────────────────────────────────────────────────────

fn draw_banner(f: &mut Frame, area: Rect, app: &App) {
  let Some(message) = &app.catalog_error else {
    return;
  };
  f.render_widget(
    Paragraph::new(format!(" {message}")).style(
      Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD),
    ),
    area,
  );
}

// ─── Filter bar ───────────────────────────────────────────────────────────────

fn draw_filters(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Length(1)])
    .split(area);

  // Search line.
  let search = if app.search_active {
    format!(" Search: {}_", app.search)
  } else if app.search.is_empty() {
    " Search: (press / to search by name, department, school, keyword)".to_string()
  } else {
    format!(" Search: {}", app.search)
  };
  let search_style = if app.search_active {
    Style::default().fg(Color::Yellow)
  } else {
    Style::default().fg(Color::Gray)
  };
  f.render_widget(Paragraph::new(search).style(search_style), rows[0]);

  // School / department line.
  let school = app
    .selected_school()
    .unwrap_or_else(|| "All Schools".to_string());
  let department = app
    .selected_department()
    .unwrap_or_else(|| "All Departments".to_string());
  let line = Line::from(vec![
    Span::styled(" School: ", Style::default().fg(Color::Gray)),
    Span::styled(school, Style::default().fg(Color::Cyan)),
    Span::styled("   Department: ", Style::default().fg(Color::Gray)),
    Span::styled(department, Style::default().fg(Color::Cyan)),
  ]);
  f.render_widget(Paragraph::new(line), rows[1]);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  if app.screen == Screen::Download {
    checkout::draw_download(f, area, app);
    return;
  }

  // Split into project list (40%) and detail pane (60%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  storefront::draw_list(f, cols[0], app);
  storefront::draw_detail(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  // A gateway in flight pins the status bar until it resolves.
  if app.processing.is_some() {
    let line = Line::from(vec![
      Span::styled(
        " PAYMENT ",
        Style::default()
          .fg(Color::Black)
          .bg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        "  Waiting for the payment gateway — finish checkout in your browser.  Esc cancel",
        Style::default().fg(Color::Yellow),
      ),
    ]);
    f.render_widget(
      Paragraph::new(line).style(Style::default().bg(Color::Black)),
      area,
    );
    return;
  }

  let (mode_label, hints) = match app.screen {
    Screen::Storefront if app.search_active => {
      ("SEARCH", "Type to filter  Esc cancel  Enter apply")
    }
    Screen::Storefront => (
      "BROWSE",
      "↑↓/jk navigate  Enter buy/download  / search  s school  d dept  r retry  q quit",
    ),
    Screen::Purchase => ("CHECKOUT", "Type email  Enter pay  Esc cancel"),
    Screen::Download => ("DONE", "d download again  Esc back to store  q quit"),
  };

  // A fresh notice takes precedence over the hint text.
  let notice = app
    .notice
    .as_ref()
    .filter(|(_, at)| at.elapsed() < NOTICE_TTL);

  let (text, text_style) = match notice {
    Some((notice, _)) => {
      let color = match notice.kind {
        NoticeKind::Info => Color::Cyan,
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
      };
      (notice.text.clone(), Style::default().fg(color))
    }
    None => (hints.to_string(), Style::default().fg(Color::Gray)),
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {text}"), text_style),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
