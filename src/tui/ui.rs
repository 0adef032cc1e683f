//! UI rendering for the terminal browser

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::{App, Row, RowKind};
use crate::mount::MountOutcome;
use crate::toggle::Expansion;

/// Main draw function: header, tree, footer, and help overlay when open
pub fn draw(frame: &mut Frame, app: &mut App, show_help: bool) {
    let area = frame.area();

    let layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(3),    // Tree
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, app, layout[0]);
    draw_tree(frame, app, layout[1]);
    draw_footer(frame, app, layout[2]);

    if show_help {
        draw_help_overlay(frame, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.rows().len();
    let indicator = if app.recently_reloaded() {
        " [Updated]"
    } else {
        ""
    };
    let location = app
        .selected_row()
        .and_then(|r| r.path)
        .map(|p| format!(" │ {}", p))
        .unwrap_or_default();
    let text = format!(
        " sitetree │ {} │ {} visible{}{}",
        app.source(),
        rows,
        location,
        indicator
    );
    let header =
        Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White).bold());
    frame.render_widget(header, area);
}

fn draw_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Directory tree ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &app.outcome {
        MountOutcome::Failed(_) => {
            draw_error(frame, app, inner);
            return;
        }
        MountOutcome::ContainerMissing => {
            let empty = Paragraph::new("Nothing to show")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }
        MountOutcome::Rendered(_) => {}
    }

    let visible = inner.height as usize;
    app.update_scroll(visible);

    let lines: Vec<Line> = app
        .rows()
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(visible)
        .map(|(i, row)| row_line(row, i == app.selected))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn row_line(row: &Row, selected: bool) -> Line<'static> {
    let indent = Span::raw("  ".repeat(row.depth));
    let base = if selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default()
    };

    let mut spans = vec![indent];
    match &row.kind {
        RowKind::Directory { name, count, state } => {
            let glyph = match state {
                Some(Expansion::Expanded) => "▾ ",
                Some(Expansion::Collapsed) => "▸ ",
                None => "  ",
            };
            spans.push(Span::styled(glyph, Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(name.clone(), base.bold()));
            if let Some(count) = count {
                spans.push(Span::styled(
                    format!(" ({})", count),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if state.is_none() {
                spans.push(Span::styled(
                    "  (empty)",
                    Style::default().fg(Color::DarkGray).italic(),
                ));
            }
        }
        RowKind::File { label, meta, .. } => {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(label.clone(), base.fg(Color::Cyan)));
            if let Some(meta) = meta {
                spans.push(Span::styled(
                    format!("  {}", meta),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
    }
    Line::from(spans)
}

fn draw_error(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .error_lines()
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let style = if i == 0 {
                Style::default().fg(Color::Red).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::styled(text, style)
        })
        .collect();
    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status {
        Some(status) => format!(" {}", status),
        None => " j/k move │ Enter toggle/open │ h/l collapse/expand │ e/c all │ r reload │ ? help │ q quit"
            .to_string(),
    };
    let footer = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 46.min(area.width);
    let height = 14.min(area.height);
    let popup = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let help = vec![
        Line::from(" j / ↓        next row"),
        Line::from(" k / ↑        previous row"),
        Line::from(" g / G        top / bottom"),
        Line::from(" PgUp / PgDn  page"),
        Line::from(" Enter/Space  toggle directory, open link"),
        Line::from(" l / →        expand"),
        Line::from(" h / ←        collapse, then go to parent"),
        Line::from(" e / c        expand / collapse everything"),
        Line::from(" r            reload the tree"),
        Line::from(" q / Esc      quit"),
    ];
    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(help).block(block), popup);
}
