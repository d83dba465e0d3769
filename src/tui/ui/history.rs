//! Session history table.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::domain::{HistoryEntry, COLUMN_NAMES};
use crate::tui::styles::MedicalTheme;

use super::format_column_value;

/// Short headers for the 16 input columns.
const INPUT_HEADERS: [&str; 16] = [
    "Gender", "Age", "Height", "Weight", "FamHist", "FAVC", "FCVC", "NCP", "CAEC", "SMOKE",
    "CH2O", "SCC", "FAF", "TUE", "CALC", "MTRANS",
];

/// Render every prediction of this session, oldest first.
pub fn render_history(f: &mut Frame, area: Rect, entries: &[HistoryEntry], scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Session History", MedicalTheme::title()),
        Span::styled(
            format!(" │ {} predictions (not saved)", entries.len()),
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let block = Block::default()
        .title(Span::styled(" Predictions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if entries.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No predictions yet. Press [N] to start.",
            MedicalTheme::text_muted(),
        ))
        .block(block);
        f.render_widget(empty, chunks[1]);
    } else {
        let header_cells = ["#", "Time", "Predicted"]
            .into_iter()
            .chain(INPUT_HEADERS)
            .map(|h| Cell::from(h).style(MedicalTheme::subtitle()));
        let header_row = Row::new(header_cells).bottom_margin(1);

        let rows = entries
            .iter()
            .enumerate()
            .skip(scroll.min(entries.len().saturating_sub(1)))
            .map(|(i, entry)| {
                let mut cells = vec![
                    Cell::from((i + 1).to_string()),
                    Cell::from(entry.recorded_at.format("%H:%M:%S").to_string()),
                    Cell::from(entry.predicted_label.clone())
                        .style(MedicalTheme::obesity_level(&entry.predicted_label)),
                ];
                cells.extend(
                    entry
                        .record
                        .columns()
                        .iter()
                        .map(|(_, value)| Cell::from(format_column_value(*value))),
                );
                Row::new(cells).style(MedicalTheme::text())
            });

        let mut widths = vec![
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(19),
        ];
        widths.extend(COLUMN_NAMES.iter().zip(INPUT_HEADERS).map(|(name, short)| {
            match *name {
                "MTRANS" => Constraint::Length(21),
                _ => Constraint::Length(short.len().max(6) as u16),
            }
        }));

        let table = Table::new(rows, widths)
            .header(header_row)
            .block(block)
            .column_spacing(1);
        f.render_widget(table, chunks[1]);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Scroll ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Prediction ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Dashboard", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, chunks[2]);
}
