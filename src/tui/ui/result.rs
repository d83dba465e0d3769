//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::PredictionOutcome;
use crate::domain::ProbabilityDistribution;
use crate::tui::styles::MedicalTheme;

use super::format_column_value;

/// What the result screen shows.
#[derive(Debug, Clone)]
pub enum ResultState {
    Outcome(Box<PredictionOutcome>),
    /// Fatal request error; the session continues
    Failed { message: String },
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Outcome(outcome) => render_outcome(f, chunks[1], outcome),
        ResultState::Failed { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction Result", MedicalTheme::title()),
        Span::styled(" │ Estimated obesity level", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_outcome(f: &mut Frame, area: Rect, outcome: &PredictionOutcome) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let warning_rows = if outcome.warnings.is_empty() {
        0
    } else {
        outcome.warnings.len() as u16 + 2
    };

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),           // BMI banner
            Constraint::Length(4),           // Label banner
            Constraint::Length(4),           // Explanation
            Constraint::Length(warning_rows), // Unknown categories
            Constraint::Min(0),              // Probabilities
        ])
        .split(columns[0]);

    let result = &outcome.result;

    let bmi_style = MedicalTheme::bmi_category(result.bmi_category);
    let bmi = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("BMI ", MedicalTheme::text_secondary()),
            Span::styled(format!("{:.2}", result.bmi), bmi_style),
        ]),
        Line::from(Span::styled(result.bmi_category.label(), bmi_style)),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Body Mass Index ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(bmi, left[0]);

    let label = Paragraph::new(vec![
        Line::from(Span::styled(
            result.label.replace('_', " "),
            MedicalTheme::obesity_level(&result.label).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.label.as_str(),
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Predicted Level ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );
    f.render_widget(label, left[1]);

    let explanation = Paragraph::new(Span::styled(
        result.explanation.as_str(),
        MedicalTheme::text(),
    ))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Explanation ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(explanation, left[2]);

    if !outcome.warnings.is_empty() {
        let lines: Vec<Line> = outcome
            .warnings
            .iter()
            .map(|w| {
                Line::from(vec![
                    Span::styled("! ", MedicalTheme::warning()),
                    Span::styled(w.to_string(), MedicalTheme::text_secondary()),
                ])
            })
            .collect();
        let warnings = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(" Warnings ", MedicalTheme::warning()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(warnings, left[3]);
    }

    match &result.probabilities {
        Some(distribution) => render_probabilities(f, left[4], distribution),
        None => {
            let note = Paragraph::new(Span::styled(
                "This model does not provide probability estimates.",
                MedicalTheme::text_muted(),
            ))
            .block(
                Block::default()
                    .title(Span::styled(" Class Probabilities ", MedicalTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            );
            f.render_widget(note, left[4]);
        }
    }

    render_input_echo(f, columns[1], outcome);
}

fn render_probabilities(f: &mut Frame, area: Rect, distribution: &ProbabilityDistribution) {
    let bars: Vec<Bar> = distribution
        .iter()
        .map(|class| {
            let percent = (class.probability * 100.0).round() as u64;
            Bar::default()
                .value(percent)
                .label(Line::from(class.label.clone()))
                .text_value(format!("{:.1}%", class.probability * 100.0))
                .style(MedicalTheme::obesity_level(&class.label))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(" Class Probabilities ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .max(100)
        .value_style(MedicalTheme::text())
        .label_style(MedicalTheme::text_secondary());

    f.render_widget(chart, area);
}

fn render_input_echo(f: &mut Frame, area: Rect, outcome: &PredictionOutcome) {
    let lines: Vec<Line> = outcome
        .record
        .columns()
        .iter()
        .map(|(name, value)| {
            Line::from(vec![
                Span::styled(format!("{name:<31}"), MedicalTheme::text_secondary()),
                Span::styled(format_column_value(*value), MedicalTheme::text()),
            ])
        })
        .collect();

    let echo = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Submitted Input ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(echo, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Prediction failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled(
            "The session is still usable. Check the artifacts and the log file.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Error ", MedicalTheme::danger()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Prediction ", MedicalTheme::key_desc()),
        Span::styled("[E] ", MedicalTheme::key_hint()),
        Span::styled("Edit Input ", MedicalTheme::key_desc()),
        Span::styled("[H] ", MedicalTheme::key_hint()),
        Span::styled("History ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Dashboard", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
