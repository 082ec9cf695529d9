//! Terminal UI rendering with ratatui

use crate::board::{Cell, BOARD_HEIGHT};
use crate::game::{Phase, Snapshot};
use crate::settings::Settings;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Playfield: 12 cells of 2 chars plus borders
const FIELD_WIDTH: u16 = 12 * 2 + 2;
/// Side panel: upcoming queue and score
const PANEL_WIDTH: u16 = 16;
const GAME_WIDTH: u16 = FIELD_WIDTH + PANEL_WIDTH;
const GAME_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;

/// Render one frame from the session snapshot
pub fn render(frame: &mut Frame, snapshot: &Snapshot, phase: Phase, settings: &Settings) {
    let area = center_rect(frame.area(), GAME_WIDTH, GAME_HEIGHT);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(FIELD_WIDTH),
            Constraint::Length(PANEL_WIDTH),
        ])
        .split(area);

    render_field(frame, columns[0], snapshot, settings);
    render_panel(frame, columns[1], snapshot);

    match phase {
        Phase::Idle => render_banner(
            frame,
            columns[0],
            vec![
                Line::styled("B L O C K F A L L", Style::default().fg(Color::Cyan).bold()),
                Line::raw(""),
                Line::styled("Press Enter to start", Style::default().fg(Color::Yellow)),
                Line::styled("q to quit", Style::default().fg(Color::DarkGray)),
            ],
        ),
        Phase::GameOver => render_banner(
            frame,
            columns[0],
            vec![
                Line::styled("GAME OVER", Style::default().fg(Color::Red).bold()),
                Line::raw(""),
                Line::styled(
                    format!("Score: {}", snapshot.score),
                    Style::default().fg(Color::White),
                ),
                Line::styled("Press Enter to restart", Style::default().fg(Color::Yellow)),
            ],
        ),
        Phase::Falling | Phase::Locking => {}
    }
}

/// The playfield: every cell as a two-character glyph
fn render_field(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let (filled_glyph, empty_glyph) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::with_capacity(snapshot.board.len());
    for row in &snapshot.board {
        let spans: Vec<Span> = row
            .iter()
            .map(|cell| match cell {
                Cell::Filled(kind) => Span::styled(filled_glyph, Style::default().fg(kind.color())),
                Cell::Empty => Span::styled(empty_glyph, Style::default().fg(Color::DarkGray)),
            })
            .collect();
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Upcoming queue and score
fn render_panel(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let next_block = Block::default()
        .borders(Borders::ALL)
        .title(" NEXT ")
        .border_style(Style::default().fg(Color::Gray));
    let next_inner = next_block.inner(rows[0]);
    frame.render_widget(next_block, rows[0]);

    let mut lines = Vec::new();
    for kind in &snapshot.upcoming {
        for shape_row in kind.base_shape().occupied_rows() {
            let spans: Vec<Span> = shape_row
                .iter()
                .map(|&set| {
                    if set {
                        Span::styled("██", Style::default().fg(kind.color()))
                    } else {
                        Span::raw("  ")
                    }
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
    }
    frame.render_widget(Paragraph::new(lines), next_inner);

    let score_block = Block::default()
        .borders(Borders::ALL)
        .title(" SCORE ")
        .border_style(Style::default().fg(Color::Gray));
    let score_inner = score_block.inner(rows[1]);
    frame.render_widget(score_block, rows[1]);
    frame.render_widget(
        Paragraph::new(Line::styled(
            format!("{}", snapshot.score),
            Style::default().fg(Color::White).bold(),
        ))
        .alignment(Alignment::Center),
        score_inner,
    );
}

/// Centered overlay box on top of the playfield
fn render_banner(frame: &mut Frame, field: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let area = center_rect(field, FIELD_WIDTH - 2, height);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

/// Center a width x height rect inside `area`, clamped to fit
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
