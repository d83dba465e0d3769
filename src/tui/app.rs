//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Request dispatch to the prediction service

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::SessionHistory;
use crate::application::PredictionService;
use crate::ports::HistoryLog;
use crate::ObesenseError;

use super::ui::{
    dashboard::{render_dashboard, DashboardState, SessionSummary},
    history::render_history,
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Result,
    History,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Stateless request handler over the loaded artifacts
    service: PredictionService,

    /// Predictions made in this session; dropped on exit
    history: SessionHistory,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Patient form state
    patient_form_state: PatientFormState,

    /// Last request outcome
    result_state: Option<ResultState>,

    /// First visible history row
    history_scroll: usize,
}

impl App {
    /// Create the application around an already-built prediction service.
    #[must_use]
    pub fn new(service: PredictionService) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            service,
            history: SessionHistory::new(),
            dashboard_state: DashboardState::default(),
            patient_form_state: PatientFormState::default(),
            result_state: None,
            history_scroll: 0,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        tracing::info!("Session ended after {} predictions", self.history.len());
        self.patient_form_state.reset();

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => {
                        let summary = SessionSummary::from_entries(self.history.entries());
                        render_dashboard(
                            f,
                            content_area,
                            &self.dashboard_state,
                            self.service.model_name(),
                            &summary,
                        );
                    }
                    Screen::PatientForm => {
                        render_patient_form(f, content_area, &self.patient_form_state);
                    }
                    Screen::Result => {
                        if let Some(state) = &self.result_state {
                            render_result(f, content_area, state);
                        }
                    }
                    Screen::History => render_history(
                        f,
                        content_area,
                        self.history.entries(),
                        self.history_scroll,
                    ),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::History => self.handle_history_key(key),
        }
    }

    fn open_new_form(&mut self) {
        self.patient_form_state.reset();
        self.screen = Screen::PatientForm;
    }

    fn open_history(&mut self) {
        self.history_scroll = 0;
        self.screen = Screen::History;
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n' | 'N') => self.open_new_form(),
            KeyCode::Char('h' | 'H') => self.open_history(),
            KeyCode::Char('g' | 'G') => {
                self.dashboard_state.show_guide = !self.dashboard_state.show_guide;
            }
            KeyCode::Char('q' | 'Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        let form = &mut self.patient_form_state;
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Char('n' | 'N') => self.open_new_form(),
            KeyCode::Char('e' | 'E') => {
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('h' | 'H') => self.open_history(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.history_scroll + 1 < self.history.len() {
                    self.history_scroll += 1;
                }
            }
            KeyCode::Char('n' | 'N') => self.open_new_form(),
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let submission = &self.patient_form_state.submission;
        match self.service.submit(submission, &mut self.history) {
            Ok(outcome) => {
                self.patient_form_state.error_message = None;
                self.result_state = Some(ResultState::Outcome(Box::new(outcome)));
                self.screen = Screen::Result;
            }
            Err(ObesenseError::Input(err)) => {
                self.patient_form_state.show_error(&err);
            }
            Err(err) => {
                tracing::error!("Prediction request failed: {err}");
                self.result_state = Some(ResultState::Failed {
                    message: err.to_string(),
                });
                self.screen = Screen::Result;
            }
        }
    }
}
