//! Rendering for the terminal interface panels and dialogs.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;
use std::collections::HashSet;

use crate::crud::Listing;
use crate::form::{FieldInput, FieldKind};
use crate::format::format_label;
use crate::schema::{TableId, ALL_TABLES};
use crate::ui::dialog::{ConfirmDialog, FormDialog};

/// Light/dark palette. The choice persists across runs.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub dark: bool,
}

impl Theme {
    pub fn text(&self) -> Color {
        if self.dark {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn muted(&self) -> Color {
        if self.dark {
            Color::DarkGray
        } else {
            Color::Gray
        }
    }

    pub fn accent(&self) -> Color {
        Color::Cyan
    }

    pub fn border(&self) -> Color {
        Color::Blue
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }
}

/// Sidebar with the fixed table list.
pub struct Sidebar;

impl Sidebar {
    pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, current: TableId) {
        let items: Vec<ListItem> = ALL_TABLES
            .iter()
            .map(|table| {
                let style = if *table == current {
                    theme.highlight()
                } else {
                    Style::default().fg(theme.text())
                };
                ListItem::new(Span::styled(format!(" {}", table.display_name()), style))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Inventory ")
            .border_style(Style::default().fg(theme.border()));

        frame.render_widget(List::new(items).block(block), area);
    }
}

/// Main listing: header row from introspected columns, one row per
/// formatted entry, selected row highlighted, key-performance cells
/// expandable per row.
pub struct ListingPanel;

impl ListingPanel {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        listing: &Listing,
        selected: usize,
        expanded: &HashSet<i64>,
    ) {
        let title = format!(
            " {} of {} entries · page {}/{} · {} per page ",
            listing.rows.len(),
            listing.total_count,
            listing.page,
            listing.total_pages,
            listing.page_size
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(theme.border()));

        if listing.rows.is_empty() {
            let empty = Paragraph::new(Span::styled(
                " No entries found",
                Style::default().fg(theme.muted()),
            ))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let kp_index = listing
            .columns
            .iter()
            .position(|c| c.name == "key_performance");

        let header = Row::new(
            listing
                .columns
                .iter()
                .map(|c| Cell::from(format_label(&c.name)))
                .collect::<Vec<_>>(),
        )
        .style(
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = listing
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut height = 1;
                let cells: Vec<Cell> = row
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(col_idx, cell)| {
                        let content = match (&row.kp, kp_index) {
                            (Some(kp), Some(kp_col)) if col_idx == kp_col => {
                                if expanded.contains(&row.id) {
                                    kp.expanded.clone()
                                } else {
                                    kp.collapsed.clone()
                                }
                            }
                            _ => cell.clone(),
                        };
                        height = height.max(content.lines().count().max(1) as u16);
                        Cell::from(Text::from(content))
                    })
                    .collect();

                let style = if idx == selected {
                    theme.highlight()
                } else {
                    Style::default().fg(theme.text())
                };
                Row::new(cells).height(height).style(style)
            })
            .collect();

        let widths: Vec<Constraint> = listing
            .columns
            .iter()
            .map(|c| match c.name.as_str() {
                "id" => Constraint::Length(6),
                "key_performance" => Constraint::Min(24),
                _ => Constraint::Min(12),
            })
            .collect();

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}

/// Notification severity for the status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Bottom status line: latest notification plus key hints.
pub struct StatusLine;

impl StatusLine {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        status: Option<&(StatusKind, String)>,
    ) {
        let hints = "Tab table · ←/→ page · n new · e edit · d delete · Enter expand · \
                     p page size · m dark mode · q quit";

        let line = match status {
            Some((kind, message)) => {
                let color = match kind {
                    StatusKind::Info => theme.text(),
                    StatusKind::Success => Color::Green,
                    StatusKind::Warning => Color::Yellow,
                    StatusKind::Error => Color::Red,
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", message), Style::default().fg(color)),
                    Span::styled(
                        format!("· {}", hints),
                        Style::default().fg(theme.muted()),
                    ),
                ])
            }
            None => Line::from(Span::styled(
                format!(" {}", hints),
                Style::default().fg(theme.muted()),
            )),
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Centered overlay rect, percentage-sized.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Render the create/edit form dialog as a centered overlay.
pub fn render_form_dialog(frame: &mut Frame, theme: &Theme, dialog: &FormDialog) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", dialog.title()))
        .border_style(Style::default().fg(theme.accent()));

    let mut lines: Vec<Line> = Vec::new();

    for (idx, field) in dialog.fields.iter().enumerate() {
        let focused = dialog.focus == idx;
        lines.push(field_line(theme, field, focused));
    }

    if dialog.table == TableId::Devices {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Key Performance Attributes",
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD),
        )));
        if dialog.kp_fields.is_empty() {
            lines.push(Line::from(Span::styled(
                " Select a device type to see attributes",
                Style::default().fg(theme.muted()),
            )));
        }
        for (idx, (name, value)) in dialog.kp_fields.iter().enumerate() {
            let focused = dialog.focus == dialog.fields.len() + idx;
            lines.push(input_line(theme, name, value, focused));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ↑/↓ field · ←/→ choose · Enter save · Esc cancel",
        Style::default().fg(theme.muted()),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(theme: &Theme, field: &crate::form::Field, focused: bool) -> Line<'static> {
    let marker = if focused { "›" } else { " " };
    let label_style = if focused {
        Style::default()
            .fg(theme.accent())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text())
    };

    match &field.kind {
        FieldKind::Select { options } => {
            let selected = field.selected_id();
            let shown = options
                .iter()
                .find(|(id, _)| *id == selected)
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| "(select)".to_string());
            Line::from(vec![
                Span::styled(format!("{} {}: ", marker, field.label), label_style),
                Span::styled(format!("‹ {} ›", shown), Style::default().fg(theme.text())),
            ])
        }
        FieldKind::Unavailable { message } => Line::from(vec![
            Span::styled(format!("{} ", marker), label_style),
            Span::styled(message.clone(), Style::default().fg(Color::Yellow)),
        ]),
        _ => {
            let text = match &field.input {
                FieldInput::Text(text) => text.clone(),
                FieldInput::Id(_) => String::new(),
            };
            Line::from(vec![
                Span::styled(format!("{} {}: ", marker, field.label), label_style),
                Span::styled(text, Style::default().fg(theme.text())),
                Span::styled(if focused { "▏" } else { "" }, label_style),
            ])
        }
    }
}

fn input_line(theme: &Theme, label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "›" } else { " " };
    let label_style = if focused {
        Style::default()
            .fg(theme.accent())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text())
    };
    Line::from(vec![
        Span::styled(format!("{} {}: ", marker, label), label_style),
        Span::styled(value.to_string(), Style::default().fg(theme.text())),
        Span::styled(if focused { "▏" } else { "" }, label_style),
    ])
}

/// Render the delete confirmation overlay.
pub fn render_confirm_dialog(frame: &mut Frame, theme: &Theme, dialog: &ConfirmDialog) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Delete Entry? ")
        .border_style(Style::default().fg(Color::Red));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", dialog.message()),
            Style::default().fg(theme.text()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Enter delete · Esc cancel",
            Style::default().fg(theme.muted()),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
