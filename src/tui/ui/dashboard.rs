//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{HistoryEntry, OBESITY_LEVELS};
use crate::tui::styles::MedicalTheme;

/// Session counts per predicted label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    /// `(label, count)` in class order, zero counts omitted
    pub by_label: Vec<(String, usize)>,
}

impl SessionSummary {
    /// Count the entries of a session history.
    #[must_use]
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut by_label: Vec<(String, usize)> = Vec::new();
        for entry in entries {
            match by_label
                .iter_mut()
                .find(|(label, _)| *label == entry.predicted_label)
            {
                Some((_, count)) => *count += 1,
                None => by_label.push((entry.predicted_label.clone(), 1)),
            }
        }
        // Known levels in their canonical order, anything else after them
        by_label.sort_by_key(|(label, _)| {
            OBESITY_LEVELS
                .iter()
                .position(|level| *level == label.as_str())
                .unwrap_or(OBESITY_LEVELS.len())
        });

        Self {
            total: entries.len(),
            by_label,
        }
    }
}

/// Dashboard state for rendering.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub show_guide: bool,
}

/// Render the main dashboard view.
pub fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    model_name: &str,
    summary: &SessionSummary,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Status and actions
            Constraint::Percentage(60), // Guide and summary
        ])
        .split(chunks[1]);

    render_status_panels(f, columns[0], model_name, summary.total);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if state.show_guide {
            [Constraint::Length(9), Constraint::Min(0)]
        } else {
            [Constraint::Length(3), Constraint::Min(0)]
        })
        .margin(1)
        .split(columns[1]);

    render_usage_guide(f, right[0], state.show_guide);
    render_session_summary(f, right[1], summary);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Obesense", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Obesity Level Estimation from Eating Habits and Physical Condition",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_status_panels(f: &mut Frame, area: Rect, model_name: &str, predictions: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // System status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let status_items = vec![
        Line::from(vec![
            Span::styled("  OK ", MedicalTheme::success()),
            Span::styled("Artifacts loaded", MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Model: ", MedicalTheme::text_secondary()),
            Span::styled(model_name.to_string(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Predictions: ", MedicalTheme::text_secondary()),
            Span::styled(predictions.to_string(), MedicalTheme::text()),
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" System Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Prediction", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[H] ", MedicalTheme::key_hint()),
            Span::styled("Session History", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[G] ", MedicalTheme::key_hint()),
            Span::styled("Toggle Usage Guide", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn render_usage_guide(f: &mut Frame, area: Rect, expanded: bool) {
    let block = Block::default()
        .title(Span::styled(" Usage Guide ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let lines = if expanded {
        vec![
            Line::from(Span::styled("1. Fill in the form.", MedicalTheme::text())),
            Line::from(Span::styled(
                "2. Numeric fields must be numbers.",
                MedicalTheme::text(),
            )),
            Line::from(Span::styled("3. Press Enter to predict.", MedicalTheme::text())),
            Line::from(""),
            Line::from(Span::styled(
                "Notes: the model only gives an estimate; consult a doctor for an official diagnosis.",
                MedicalTheme::text_muted(),
            )),
        ]
    } else {
        vec![Line::from(vec![
            Span::styled("Collapsed. Press ", MedicalTheme::text_muted()),
            Span::styled("[G]", MedicalTheme::key_hint()),
            Span::styled(" to expand.", MedicalTheme::text_muted()),
        ])]
    };

    let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn render_session_summary(f: &mut Frame, area: Rect, summary: &SessionSummary) {
    let block = Block::default()
        .title(Span::styled(" This Session ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if summary.total == 0 {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No predictions yet. Press [N] to start.",
            MedicalTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled(summary.total.to_string(), MedicalTheme::text()),
            Span::styled(" predictions", MedicalTheme::text_secondary()),
        ]),
        Line::from(""),
    ];
    lines.extend(summary.by_label.iter().map(|(label, count)| {
        Line::from(vec![
            Span::styled(format!("{label:<22}"), MedicalTheme::obesity_level(label)),
            Span::styled(count.to_string(), MedicalTheme::text()),
        ])
    }));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
