//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Prediction requests against the loaded predictor

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::RandomForestModel;
use crate::application::chat::error_text;
use crate::application::DiseasePredictor;
use crate::config::Settings;
use crate::domain::PredictionOutcome;
use crate::ports::SymptomClassifier;
use crate::SymptriageError;

use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    input::{render_symptom_input, SymptomInputState},
    render_disclaimer,
    results::{render_results, ResultsState},
    symptoms::{render_symptom_browser, SymptomBrowserState},
};

/// Completions shown under the input field.
const MAX_HINTS: usize = 8;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    SymptomInput,
    Results,
    Symptoms,
}

/// Main application state
pub struct App<C = RandomForestModel>
where
    C: SymptomClassifier,
{
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Loaded model, vocabulary and reference data
    predictor: DiseasePredictor<C>,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Symptom input state
    input_state: SymptomInputState,

    /// Results state
    results_state: ResultsState,

    /// Symptom browser state
    browser_state: SymptomBrowserState,
}

impl App<RandomForestModel> {
    /// Create a new application, loading the predictor named by `settings`.
    ///
    /// This is a convenience method. For more control, use `with_dependencies()`.
    ///
    /// # Errors
    /// Returns error if the model or reference data cannot be loaded.
    pub fn new(settings: &Settings) -> Result<Self> {
        let predictor = DiseasePredictor::from_settings(settings).with_context(|| {
            format!(
                "Failed to load predictor from {:?}. Run train_model first or set SYMPTRIAGE_MODEL_DIR.",
                settings.model_dir
            )
        })?;
        Ok(Self::with_dependencies(predictor))
    }
}

impl<C> App<C>
where
    C: SymptomClassifier,
{
    /// Create the application around an already loaded predictor.
    #[must_use]
    pub fn with_dependencies(predictor: DiseasePredictor<C>) -> Self {
        let mut app = Self {
            screen: Screen::Dashboard,
            should_quit: false,
            predictor,
            dashboard_state: DashboardState::default(),
            input_state: SymptomInputState::default(),
            results_state: ResultsState::default(),
            browser_state: SymptomBrowserState::default(),
        };
        app.update_dashboard_state();
        app
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

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];
        let disclaimer_area = chunks[1];

        match self.screen {
            Screen::Dashboard => render_dashboard(f, content_area, &self.dashboard_state),
            Screen::SymptomInput => {
                let hints = self
                    .predictor
                    .matcher()
                    .completions(self.input_state.current_fragment(), MAX_HINTS);
                render_symptom_input(f, content_area, &self.input_state, &hints);
            }
            Screen::Results => render_results(f, content_area, &self.results_state),
            Screen::Symptoms => render_symptom_browser(
                f,
                content_area,
                &self.browser_state,
                self.predictor.symptoms(),
            ),
        }

        render_disclaimer(f, disclaimer_area);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::SymptomInput => self.handle_input_key(key, modifiers),
            Screen::Results => self.handle_results_key(key),
            Screen::Symptoms => self.handle_browser_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.input_state.clear_sensitive();
                self.screen = Screen::SymptomInput;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.browser_state = SymptomBrowserState::default();
                self.screen = Screen::Symptoms;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('w') => self.input_state.delete_phrase(),
                KeyCode::Char('u') => self.input_state.clear_sensitive(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc => {
                self.input_state.clear_sensitive();
                self.screen = Screen::Dashboard;
            }
            KeyCode::Tab => {
                let first = self
                    .predictor
                    .matcher()
                    .completions(self.input_state.current_fragment(), 1)
                    .first()
                    .map(|s| (*s).to_string());
                if let Some(symptom) = first {
                    self.input_state.accept_completion(&symptom);
                }
            }
            KeyCode::F(2) => {
                self.browser_state = SymptomBrowserState::default();
                self.screen = Screen::Symptoms;
            }
            KeyCode::Char(c) => self.input_state.input_char(c),
            KeyCode::Backspace => self.input_state.delete_char(),
            KeyCode::Enter => self.submit_symptoms(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.results_state.clear_sensitive();
                self.screen = Screen::Dashboard;
            }
            KeyCode::Enter => {
                // Retry path after a no-match or failure
                if !matches!(&self.results_state, ResultsState::Complete { outcome } if outcome.is_prediction())
                {
                    self.screen = Screen::SymptomInput;
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.results_state.clear_sensitive();
                self.screen = Screen::SymptomInput;
            }
            _ => {}
        }
    }

    fn handle_browser_key(&mut self, key: KeyCode) {
        let visible = self.browser_state.visible(self.predictor.symptoms()).len();
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => self.browser_state.prev(visible),
            KeyCode::Down | KeyCode::Tab => self.browser_state.next(visible),
            KeyCode::Enter => {
                if let Some(symptom) = self.browser_state.selection(self.predictor.symptoms()) {
                    self.input_state.append_symptom(symptom);
                    self.screen = Screen::SymptomInput;
                }
            }
            KeyCode::Char(c) => self.browser_state.input_char(c),
            KeyCode::Backspace => self.browser_state.delete_char(),
            _ => {}
        }
    }

    fn submit_symptoms(&mut self) {
        self.results_state.clear_sensitive();
        let session = &mut self.dashboard_state.session;
        match self.predictor.predict_and_info(&self.input_state.buffer) {
            Ok(outcome) => {
                session.requests += 1;
                match &outcome {
                    PredictionOutcome::Prediction(_) => session.predictions += 1,
                    PredictionOutcome::NoMatch(_) => session.no_match += 1,
                }
                self.results_state = ResultsState::Complete {
                    outcome: Box::new(outcome),
                };
                self.screen = Screen::Results;
                self.input_state.clear_sensitive();
            }
            Err(e @ SymptriageError::EmptyRequest) => {
                self.input_state.error_message = Some(error_text(&e));
            }
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                session.requests += 1;
                session.errors += 1;
                self.results_state = ResultsState::Error {
                    message: error_text(&e),
                };
                self.screen = Screen::Results;
                self.input_state.clear_sensitive();
            }
        }
    }

    fn update_dashboard_state(&mut self) {
        let reference = self.predictor.reference();
        self.dashboard_state.model_loaded = true;
        self.dashboard_state.symptom_count = self.predictor.symptoms().len();
        self.dashboard_state.disease_count = self.predictor.classes().len();
        self.dashboard_state.described_diseases = reference.disease_count();
        self.dashboard_state.severity_entries = reference.severity().len();
        self.dashboard_state.has_importance = self.predictor.has_feature_importance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::predictor::tests::fixture;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::with_dependencies(fixture())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| app.render(f)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_dashboard_reflects_predictor() {
        let app = app();
        assert_eq!(app.dashboard_state.symptom_count, 4);
        assert_eq!(app.dashboard_state.disease_count, 3);
        assert!(app.dashboard_state.has_importance);
        assert!(screen_text(&app).contains("Symptriage"));
    }

    #[test]
    fn test_submit_prediction() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::SymptomInput);

        type_text(&mut app, "chest pain, sweating");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::Results);
        assert!(app.input_state.buffer.is_empty());
        assert_eq!(app.dashboard_state.session.predictions, 1);
        match &app.results_state {
            ResultsState::Complete { outcome } => {
                let report = outcome.report().expect("prediction");
                assert_eq!(report.top_prediction.disease, "Heart attack");
            }
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(screen_text(&app).contains("Heart attack"));
    }

    #[test]
    fn test_empty_submit_stays_on_input() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, " , ");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::SymptomInput);
        assert_eq!(
            app.input_state.error_message.as_deref(),
            Some("No symptoms provided")
        );
        assert_eq!(app.dashboard_state.session.requests, 0);
    }

    #[test]
    fn test_no_match_then_edit() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, "sweaty palms");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::Results);
        assert_eq!(app.dashboard_state.session.no_match, 1);
        assert!(screen_text(&app).contains("sweating"));

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::SymptomInput);
    }

    #[test]
    fn test_leaving_results_drops_typed_phrases() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, "sweaty palms");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        match &app.results_state {
            ResultsState::Complete { outcome } => match outcome.as_ref() {
                PredictionOutcome::NoMatch(report) => assert_eq!(report.unmatched, ["sweaty palms"]),
                other => panic!("unexpected outcome: {other:?}"),
            },
            other => panic!("unexpected state: {other:?}"),
        }

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(matches!(app.results_state, ResultsState::Idle));
        assert!(!screen_text(&app).contains("sweaty palms"));
    }

    #[test]
    fn test_tab_completes_fragment() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, "high");
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.input_state.buffer, "high_fever, ");

        app.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(app.input_state.buffer, "");
    }

    #[test]
    fn test_browser_adds_symptom() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Symptoms);

        type_text(&mut app, "itch");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::SymptomInput);
        assert_eq!(app.input_state.buffer, "itching, ");
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        type_text(&mut app, "q");
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
