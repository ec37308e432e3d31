//! Symptom entry: a comma-separated text field with vocabulary hints.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::tui::styles::MedicalTheme;

/// Longest request the field accepts.
pub const MAX_INPUT_CHARS: usize = 512;

/// Symptom input state
#[derive(Debug, Default)]
pub struct SymptomInputState {
    pub buffer: String,
    pub error_message: Option<String>,
}

impl SymptomInputState {
    /// Add a character to the buffer
    pub fn input_char(&mut self, c: char) {
        if c.is_control() || self.buffer.chars().count() >= MAX_INPUT_CHARS {
            return;
        }
        self.buffer.push(c);
        self.error_message = None;
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.buffer.pop();
    }

    /// Drop the phrase being typed, up to and including the previous comma.
    pub fn delete_phrase(&mut self) {
        let trimmed = self.buffer.trim_end().trim_end_matches(',');
        let cut = trimmed.rfind(',').map_or(0, |i| i + 1);
        self.buffer.truncate(cut);
    }

    /// The phrase after the last comma, trimmed.
    #[must_use]
    pub fn current_fragment(&self) -> &str {
        let start = self.buffer.rfind(',').map_or(0, |i| i + 1);
        self.buffer[start..].trim()
    }

    /// Replace the phrase being typed with `symptom` and open a new one.
    pub fn accept_completion(&mut self, symptom: &str) {
        let start = self.buffer.rfind(',').map_or(0, |i| i + 1);
        self.buffer.truncate(start);
        if start > 0 {
            self.buffer.push(' ');
        }
        self.buffer.push_str(symptom);
        self.buffer.push_str(", ");
        self.error_message = None;
    }

    /// Append a whole symptom, e.g. one picked in the browser.
    pub fn append_symptom(&mut self, symptom: &str) {
        if !self.current_fragment().is_empty() {
            self.buffer.push_str(", ");
        } else if !self.buffer.is_empty() && !self.buffer.ends_with(' ') {
            self.buffer.push(' ');
        }
        self.buffer.push_str(symptom);
        self.buffer.push_str(", ");
    }

    /// Wipe the typed symptoms from memory.
    ///
    /// Called right after a request is submitted. Phrases echoed in the
    /// results are wiped by `ResultsState::clear_sensitive` when the results
    /// screen is left.
    pub fn clear_sensitive(&mut self) {
        self.buffer.zeroize();
        self.error_message = None;
    }
}

/// Render the symptom input screen. `hints` are completions for the current fragment.
pub fn render_symptom_input(f: &mut Frame, area: Rect, state: &SymptomInputState, hints: &[&str]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Input
            Constraint::Min(0),    // Hints
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_input_header(f, chunks[0]);
    render_input_field(f, chunks[1], state);
    render_hints(f, chunks[2], hints);
    render_input_footer(f, chunks[3], state);
}

fn render_input_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Describe Symptoms", MedicalTheme::title()),
        Span::styled(" │ separate with commas", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_input_field(f: &mut Frame, area: Rect, state: &SymptomInputState) {
    let block = Block::default()
        .title(Span::styled(" Symptoms ", MedicalTheme::focused()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let value = if state.buffer.is_empty() {
        Span::styled("e.g. chest pain, sweating, vomiting", MedicalTheme::text_muted())
    } else {
        Span::styled(state.buffer.as_str(), MedicalTheme::text())
    };

    let content = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        value,
        Span::styled("▌", MedicalTheme::cursor()),
    ]))
    .wrap(Wrap { trim: false })
    .block(block);

    f.render_widget(content, area);
}

fn render_hints(f: &mut Frame, area: Rect, hints: &[&str]) {
    let block = Block::default()
        .title(Span::styled(" Matching Symptoms ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let lines: Vec<Line> = if hints.is_empty() {
        vec![Line::from(Span::styled(
            "Start typing to see known symptoms.",
            MedicalTheme::text_muted(),
        ))]
    } else {
        hints
            .iter()
            .enumerate()
            .map(|(i, hint)| {
                let style = if i == 0 {
                    MedicalTheme::focused()
                } else {
                    MedicalTheme::text_secondary()
                };
                Line::from(vec![Span::raw("  "), Span::styled(*hint, style)])
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input_footer(f: &mut Frame, area: Rect, state: &SymptomInputState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[Tab] ", MedicalTheme::key_hint()),
            Span::styled("Complete ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl+W] ", MedicalTheme::key_hint()),
            Span::styled("Delete Phrase ", MedicalTheme::key_desc()),
            Span::styled("[F2] ", MedicalTheme::key_hint()),
            Span::styled("Browse ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> SymptomInputState {
        let mut state = SymptomInputState::default();
        for c in text.chars() {
            state.input_char(c);
        }
        state
    }

    #[test]
    fn test_current_fragment() {
        assert_eq!(typed("").current_fragment(), "");
        assert_eq!(typed("chest").current_fragment(), "chest");
        assert_eq!(typed("chest_pain,  sweat").current_fragment(), "sweat");
        assert_eq!(typed("chest_pain, ").current_fragment(), "");
    }

    #[test]
    fn test_accept_completion() {
        let mut state = typed("chest");
        state.accept_completion("chest_pain");
        assert_eq!(state.buffer, "chest_pain, ");

        for c in "swe".chars() {
            state.input_char(c);
        }
        state.accept_completion("sweating");
        assert_eq!(state.buffer, "chest_pain, sweating, ");
    }

    #[test]
    fn test_append_symptom() {
        let mut state = SymptomInputState::default();
        state.append_symptom("itching");
        assert_eq!(state.buffer, "itching, ");

        let mut state = typed("high fever");
        state.append_symptom("itching");
        assert_eq!(state.buffer, "high fever, itching, ");
    }

    #[test]
    fn test_delete_phrase() {
        let mut state = typed("itching, high fev");
        state.delete_phrase();
        assert_eq!(state.buffer, "itching,");

        let mut state = typed("itching, ");
        state.delete_phrase();
        assert_eq!(state.buffer, "");
    }

    #[test]
    fn test_control_chars_and_limit() {
        let mut state = typed("a\tb");
        assert_eq!(state.buffer, "ab");

        state.buffer = "x".repeat(MAX_INPUT_CHARS);
        state.input_char('y');
        assert_eq!(state.buffer.len(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_clear_sensitive() {
        let mut state = typed("chest pain");
        state.error_message = Some("boom".into());
        state.clear_sensitive();
        assert!(state.buffer.is_empty());
        assert!(state.error_message.is_none());
    }
}
