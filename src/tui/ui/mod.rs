//! UI module: View components for the TUI.

pub mod dashboard;
pub mod history;
pub mod patient;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::ColumnValue;
use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "DISCLAIMER: The result is an estimate from a statistical model, not a diagnosis. Consult a doctor for an official assessment.",
        MedicalTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Display form of a raw column value.
fn format_column_value(value: ColumnValue) -> String {
    match value {
        ColumnValue::Numeric(x) => format!("{x}"),
        ColumnValue::Category(c) => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_value_formatting() {
        assert_eq!(format_column_value(ColumnValue::Numeric(1.8)), "1.8");
        assert_eq!(format_column_value(ColumnValue::Numeric(25.0)), "25");
        assert_eq!(
            format_column_value(ColumnValue::Category("Public_Transportation")),
            "Public_Transportation"
        );
    }
}
