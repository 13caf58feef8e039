//! Picker views and rendering

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{App, InputMode};

/// Main render function
pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_main(app, frame, chunks[1]);
    render_footer(app, frame, chunks[2]);
}

/// Render the header bar
fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let filter_span = if app.mode == InputMode::Filter {
        Span::styled(
            format!("/{}_", app.filter),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else if !app.filter.is_empty() {
        Span::styled(format!("/{}", app.filter), Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Templib ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            format!("{} templates", app.results.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" │ "),
        filter_span,
    ])])
    .block(Block::default().borders(Borders::ALL).title(" Templates "));

    frame.render_widget(header, area);
}

/// Render the template list and preview side by side
fn render_main(app: &App, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_list(app, frame, chunks[0]);
    render_preview(app, frame, chunks[1]);
}

/// Render the template list
fn render_list(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let record = &result.template;
            let content = Line::from(vec![
                Span::styled(
                    format!("{:<18} ", record.id),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("[{:^7}] ", record.template_type()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(record.name.clone()),
                Span::styled(
                    format!("  ({})", record.repo_name),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            if i == app.selected {
                ListItem::new(content).style(Style::default().bg(Color::DarkGray).fg(Color::White))
            } else {
                ListItem::new(content)
            }
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Results "));

    frame.render_widget(list, area);
}

/// Render the preview pane for the selected template
fn render_preview(app: &App, frame: &mut Frame, area: Rect) {
    let content = if let Some(record) = app.selected_record() {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Id: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(record.id.clone()),
            ]),
            Line::from(vec![
                Span::styled("Name: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(record.name.clone()),
            ]),
            Line::from(vec![
                Span::styled("Type: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(record.template_type().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Repo: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(record.repo_name.clone()),
            ]),
        ];

        if !record.labels.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Labels: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(record.labels.join(", "), Style::default().fg(Color::Yellow)),
            ]));
        }
        if !record.summary.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Summary: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(record.summary.clone()),
            ]));
        }

        lines.push(Line::from(""));
        for body_line in record.body().lines().take(30) {
            lines.push(Line::from(body_line.to_string()));
        }

        lines
    } else {
        vec![Line::from("No template selected")]
    };

    let preview = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Preview "))
        .wrap(Wrap { trim: false });

    frame.render_widget(preview, area);
}

/// Render the footer bar
fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.mode == InputMode::Filter {
        vec![
            Span::styled(" Enter", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Apply "),
            Span::styled(" Esc", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Clear "),
        ]
    } else {
        vec![
            Span::styled(" q", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit "),
            Span::styled(" /", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Filter "),
            Span::styled(" ↑↓", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Navigate "),
            Span::styled(" Enter", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Pick "),
        ]
    };

    let footer = Paragraph::new(Line::from(hints)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
