//! Storefront panes — project list and detail.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;

/// Render the filtered project list into `area`.
pub fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_projects();
  let total = app.index.len();

  let title = if visible.len() == total {
    format!(" Projects ({total}) ")
  } else {
    format!(" Projects ({}/{total}) ", visible.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));

  let items: Vec<ListItem> = visible
    .iter()
    .enumerate()
    .map(|(i, project)| {
      let is_cursor = i == app.list_cursor;
      let style = if is_cursor {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };

      let badge = if app.processing.as_deref() == Some(project.id.as_str()) {
        Span::styled("⏳ ", Style::default().fg(Color::Yellow))
      } else if app.is_owned(&project.id) {
        Span::styled("✔ ", Style::default().fg(Color::Green))
      } else {
        Span::raw("  ")
      };

      ListItem::new(Line::from(vec![
        badge,
        Span::styled(project.name.clone(), style),
      ]))
    })
    .collect();

  let inner = block.inner(area);
  f.render_widget(block, area);

  if visible.is_empty() {
    let message = if app.catalog_error.is_some() {
      "Catalog unavailable."
    } else {
      "No projects found for this selection."
    };
    f.render_widget(
      Paragraph::new(message).style(Style::default().fg(Color::Gray)),
      inner,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor.min(visible.len() - 1)));

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    inner,
    &mut state,
  );
}

/// Render the selected project's detail into `area`.
pub fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(project) = app.cursor_project() else {
    f.render_widget(
      Paragraph::new("Select a project to see its details.")
        .style(Style::default().fg(Color::Gray)),
      inner,
    );
    return;
  };

  let owned = app.is_owned(&project.id);
  let processing = app.processing.as_deref() == Some(project.id.as_str());

  let status_line = if processing {
    Line::from(Span::styled(
      "Processing…",
      Style::default().fg(Color::Yellow),
    ))
  } else if owned {
    Line::from(Span::styled(
      "✔ Owned — Enter downloads again without paying",
      Style::default().fg(Color::Green),
    ))
  } else {
    Line::from(Span::styled(
      format!("₦{} — one-time payment, instant delivery", project.price),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
  };

  let mut lines = vec![
    Line::from(Span::styled(
      project.name.clone(),
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )),
    Line::default(),
    Line::from(vec![
      Span::styled("School:     ", Style::default().fg(Color::Gray)),
      Span::raw(project.school.clone()),
    ]),
    Line::from(vec![
      Span::styled("Department: ", Style::default().fg(Color::Gray)),
      Span::raw(project.department.clone()),
    ]),
    Line::default(),
  ];

  lines.push(Line::from(project.description.clone()));
  lines.push(Line::default());
  lines.push(status_line);

  if owned {
    lines.push(Line::from(vec![
      Span::styled("View online: ", Style::default().fg(Color::Gray)),
      Span::styled(project.view_url(), Style::default().fg(Color::Blue)),
    ]));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
