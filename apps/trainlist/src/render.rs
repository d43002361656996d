use std::io;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use client_core::{Column, ColumnSet, SortDirection, SortKey, TrainList, ViewObserver};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame, Terminal,
};
use tracing::warn;

/// Raw mode on the alternate screen for as long as the guard lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enter raw mode")?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(err).context("failed to enter alternate screen");
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!(error = %err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            warn!(error = %err, "failed to leave alternate screen");
        }
    }
}

/// Redraws the train list after any change to it.
pub struct Screen<B: Backend> {
    terminal: Terminal<B>,
    pending: bool,
}

impl<B: Backend> Screen<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            pending: true,
        }
    }

    fn draw(&mut self, list: &TrainList) -> io::Result<()> {
        self.terminal.draw(|frame| draw_list(frame, list))?;
        Ok(())
    }
}

impl<B: Backend> ViewObserver for Screen<B> {
    fn row_inserted(&mut self, _row: usize) {
        self.pending = true;
    }

    fn row_removed(&mut self, _row: usize) {
        self.pending = true;
    }

    fn cells_changed(&mut self, _row: usize, _columns: ColumnSet) {
        self.pending = true;
    }

    fn reset(&mut self) {
        self.pending = true;
    }

    fn clock_changed(&mut self, _time: DateTime<Utc>) {
        self.pending = true;
    }

    fn filter_changed(&mut self) {
        self.pending = true;
    }

    fn refresh(&mut self, list: &TrainList) {
        if !std::mem::take(&mut self.pending) {
            return;
        }
        if let Err(err) = self.draw(list) {
            warn!(error = %err, "failed to draw the train list");
        }
    }
}

/// Status line, the table of visible trains, and the key help with the territory filter.
pub fn draw_list(frame: &mut Frame, list: &TrainList) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    frame.render_widget(Paragraph::new(status_line(list)), areas[0]);
    frame.render_widget(train_table(list), areas[1]);
    frame.render_widget(
        Paragraph::new(help_lines(list)).block(Block::default().borders(Borders::TOP)),
        areas[2],
    );
}

fn status_line(list: &TrainList) -> Line<'static> {
    let sort = list.sort_key();
    let clock = list
        .simulation_time()
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string());
    let direction = match sort.direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    };
    Line::from(format!(
        "Simulation time {clock} | {} trains | sorted by {} ({direction})",
        list.len(),
        sort.column.title(),
    ))
}

fn header_title(column: Column, sort: SortKey) -> String {
    if column != sort.column {
        return column.title().to_string();
    }
    match sort.direction {
        SortDirection::Ascending => format!("{} ▲", column.title()),
        SortDirection::Descending => format!("{} ▼", column.title()),
    }
}

fn train_table(list: &TrainList) -> Table<'static> {
    let sort = list.sort_key();
    let header = Column::ALL.map(|column| header_title(column, sort));
    let rows = list.rows();

    let mut widths = header.each_ref().map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let widths = widths.map(|width| Constraint::Length(u16::try_from(width).unwrap_or(u16::MAX)));

    Table::new(rows.into_iter().map(Row::new), widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .column_spacing(2)
}

fn help_lines(list: &TrainList) -> Vec<Line<'static>> {
    let territories = list.gazetteer().territories();
    let filter = list.filter();
    let mut toggles = Vec::new();
    for (index, territory) in territories.known_territories().into_iter().enumerate() {
        let name = territories.territory_name(territory).unwrap_or_default();
        toggles.push(toggle(format!("F{} {name}", index + 1), filter.is_enabled(territory)));
        toggles.push(Span::raw("  "));
    }
    toggles.push(toggle("0 Unknown".to_string(), filter.unknown_enabled()));

    vec![
        Line::from("1-9 sort by column, again to reverse  |  q quit"),
        Line::from(toggles),
    ]
}

fn toggle(label: String, enabled: bool) -> Span<'static> {
    if enabled {
        Span::raw(format!("{label} [x]"))
    } else {
        Span::styled(
            format!("{label} [ ]"),
            Style::default().add_modifier(Modifier::DIM),
        )
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
