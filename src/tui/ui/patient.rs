//! Patient survey form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{Categorical, NumericField, RawSubmission, ValidationError};
use crate::tui::styles::MedicalTheme;

/// Categorical questions on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceField {
    Gender,
    FamilyHistory,
    HighCalorieFood,
    Snacking,
    Smoking,
    CalorieMonitoring,
    Alcohol,
    Transport,
}

impl ChoiceField {
    fn label(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::FamilyHistory => "Family history of overweight",
            Self::HighCalorieFood => "Often eats high-calorie food",
            Self::Snacking => "Eats between meals",
            Self::Smoking => "Smokes",
            Self::CalorieMonitoring => "Monitors calorie intake",
            Self::Alcohol => "Alcohol consumption",
            Self::Transport => "Usual transport",
        }
    }
}

/// One row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Text(NumericField),
    Choice(ChoiceField),
}

/// Form rows in dataset column order.
pub const FORM_FIELDS: [FieldInput; 16] = [
    FieldInput::Choice(ChoiceField::Gender),
    FieldInput::Text(NumericField::Age),
    FieldInput::Text(NumericField::Height),
    FieldInput::Text(NumericField::Weight),
    FieldInput::Choice(ChoiceField::FamilyHistory),
    FieldInput::Choice(ChoiceField::HighCalorieFood),
    FieldInput::Text(NumericField::VegetableFrequency),
    FieldInput::Text(NumericField::MainMeals),
    FieldInput::Choice(ChoiceField::Snacking),
    FieldInput::Choice(ChoiceField::Smoking),
    FieldInput::Text(NumericField::WaterIntake),
    FieldInput::Choice(ChoiceField::CalorieMonitoring),
    FieldInput::Text(NumericField::PhysicalActivity),
    FieldInput::Text(NumericField::TechUse),
    FieldInput::Choice(ChoiceField::Alcohol),
    FieldInput::Choice(ChoiceField::Transport),
];

fn cycle<C: Categorical>(current: C, forward: bool) -> C {
    let len = C::OPTIONS.len();
    let step = if forward { 1 } else { len - 1 };
    C::from_index(current.index() + step)
}

/// Patient form state
#[derive(Debug, Default)]
pub struct PatientFormState {
    pub submission: RawSubmission,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl PatientFormState {
    #[must_use]
    pub fn current(&self) -> FieldInput {
        FORM_FIELDS[self.selected_field]
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % FORM_FIELDS.len();
    }

    pub fn prev_field(&mut self) {
        self.selected_field = (self.selected_field + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    /// Type into the focused numeric field.
    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Text(field) = self.current() {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                self.submission.text_mut(field).push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldInput::Text(field) = self.current() {
            self.submission.text_mut(field).pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let FieldInput::Text(field) = self.current() {
            self.submission.text_mut(field).clear();
        }
    }

    /// Move the focused selector to the next (or previous) option.
    pub fn cycle_choice(&mut self, forward: bool) {
        let FieldInput::Choice(choice) = self.current() else {
            return;
        };
        let s = &mut self.submission;
        match choice {
            ChoiceField::Gender => s.gender = cycle(s.gender, forward),
            ChoiceField::FamilyHistory => s.family_history = cycle(s.family_history, forward),
            ChoiceField::HighCalorieFood => {
                s.high_calorie_food = cycle(s.high_calorie_food, forward);
            }
            ChoiceField::Snacking => s.snacking = cycle(s.snacking, forward),
            ChoiceField::Smoking => s.smoking = cycle(s.smoking, forward),
            ChoiceField::CalorieMonitoring => {
                s.calorie_monitoring = cycle(s.calorie_monitoring, forward);
            }
            ChoiceField::Alcohol => s.alcohol = cycle(s.alcohol, forward),
            ChoiceField::Transport => s.transport = cycle(s.transport, forward),
        }
        self.error_message = None;
    }

    /// Show a validation error and focus the offending field.
    pub fn show_error(&mut self, err: &ValidationError) {
        if let Some(pos) = FORM_FIELDS
            .iter()
            .position(|f| *f == FieldInput::Text(err.field()))
        {
            self.selected_field = pos;
        }
        self.error_message = Some(err.to_string());
    }

    /// Wipe typed answers and return to the defaults.
    pub fn reset(&mut self) {
        for field in NumericField::ALL {
            self.submission.text_mut(field).zeroize();
        }
        *self = Self::default();
    }

    fn display_value(&self, input: FieldInput) -> (String, &'static str) {
        let s = &self.submission;
        match input {
            FieldInput::Text(field) => (s.text(field).to_string(), field.unit()),
            FieldInput::Choice(choice) => {
                let value = match choice {
                    ChoiceField::Gender => s.gender.as_str(),
                    ChoiceField::FamilyHistory => s.family_history.as_str(),
                    ChoiceField::HighCalorieFood => s.high_calorie_food.as_str(),
                    ChoiceField::Snacking => s.snacking.as_str(),
                    ChoiceField::Smoking => s.smoking.as_str(),
                    ChoiceField::CalorieMonitoring => s.calorie_monitoring.as_str(),
                    ChoiceField::Alcohol => s.alcohol.as_str(),
                    ChoiceField::Transport => s.transport.as_str(),
                };
                (format!("◂ {value} ▸"), "")
            }
        }
    }
}

fn field_title(input: FieldInput) -> String {
    match input {
        FieldInput::Text(field) => {
            let (min, max) = field.range();
            format!(" {} ({min}-{max}) ", field.label())
        }
        FieldInput::Choice(choice) => format!(" {} ", choice.label()),
    }
}

/// Render the patient survey form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Survey", MedicalTheme::title()),
        Span::styled(
            " │ Eating habits and physical condition",
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

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = FORM_FIELDS.len() / 2;
    render_field_column(f, columns[0], state, 0..mid);
    render_field_column(f, columns[1], state, mid..FORM_FIELDS.len());
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    rows: std::ops::Range<usize>,
) {
    let constraints: Vec<Constraint> = rows
        .clone()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, index) in rows.enumerate() {
        let input = FORM_FIELDS[index];
        let is_selected = index == state.selected_field;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(field_title(input), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let (value, unit) = state.display_value(input);
        let mut spans = vec![Span::raw(" "), Span::styled(value, MedicalTheme::text())];
        if is_selected && matches!(input, FieldInput::Text(_)) {
            spans.push(Span::styled("▌", MedicalTheme::cursor()));
        }
        if !unit.is_empty() {
            spans.push(Span::styled(format!(" {unit}"), MedicalTheme::text_muted()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[slot]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change option ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[Del] ", MedicalTheme::key_hint()),
            Span::styled("Clear ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
