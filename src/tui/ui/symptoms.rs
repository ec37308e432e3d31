//! Symptom browser: filterable list of the model vocabulary.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::tui::styles::MedicalTheme;

/// Browser state
#[derive(Debug, Default)]
pub struct SymptomBrowserState {
    pub filter: String,
    pub selected: usize,
}

impl SymptomBrowserState {
    /// Indices into `symptoms` whose name contains the filter (case-insensitive;
    /// spaces match underscores).
    #[must_use]
    pub fn visible(&self, symptoms: &[String]) -> Vec<usize> {
        let needle = self.filter.trim().to_lowercase().replace(' ', "_");
        symptoms
            .iter()
            .enumerate()
            .filter(|(_, s)| needle.is_empty() || s.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.filter.push(c);
            self.selected = 0;
        }
    }

    pub fn delete_char(&mut self) {
        self.filter.pop();
        self.selected = 0;
    }

    pub fn next(&mut self, visible: usize) {
        if visible > 0 {
            self.selected = (self.selected + 1) % visible;
        }
    }

    pub fn prev(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            visible - 1
        } else {
            self.selected - 1
        };
    }

    /// Currently highlighted symptom, if the filter leaves any.
    #[must_use]
    pub fn selection<'a>(&self, symptoms: &'a [String]) -> Option<&'a str> {
        self.visible(symptoms)
            .get(self.selected)
            .map(|&i| symptoms[i].as_str())
    }
}

/// Render the symptom browser
pub fn render_symptom_browser(
    f: &mut Frame,
    area: Rect,
    state: &SymptomBrowserState,
    symptoms: &[String],
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filter
            Constraint::Min(0),    // List
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let visible = state.visible(symptoms);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Known Symptoms", MedicalTheme::title()),
        Span::styled(
            format!(" │ {} of {}", visible.len(), symptoms.len()),
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let filter = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(state.filter.as_str(), MedicalTheme::text()),
        Span::styled("▌", MedicalTheme::cursor()),
    ]))
    .block(
        Block::default()
            .title(Span::styled(" Filter ", MedicalTheme::focused()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );
    f.render_widget(filter, chunks[1]);

    let items: Vec<ListItem> = visible
        .iter()
        .map(|&i| ListItem::new(Span::styled(symptoms[i].as_str(), MedicalTheme::text())))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .highlight_style(MedicalTheme::selected())
        .highlight_symbol("› ");

    let mut list_state = ListState::default();
    if !visible.is_empty() {
        list_state.select(Some(state.selected.min(visible.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[2], &mut list_state);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Navigate ", MedicalTheme::key_desc()),
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("Add to Request ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptoms() -> Vec<String> {
        ["chest_pain", "high_fever", "mild_fever", "sweating"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    #[test]
    fn test_filter() {
        let symptoms = symptoms();
        let mut state = SymptomBrowserState::default();
        assert_eq!(state.visible(&symptoms).len(), 4);

        for c in "FEVER".chars() {
            state.input_char(c);
        }
        assert_eq!(state.visible(&symptoms), vec![1, 2]);

        state.filter = "chest p".into();
        assert_eq!(state.selection(&symptoms), Some("chest_pain"));

        state.filter = "zzz".into();
        assert_eq!(state.selection(&symptoms), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let symptoms = symptoms();
        let mut state = SymptomBrowserState::default();
        state.prev(4);
        assert_eq!(state.selection(&symptoms), Some("sweating"));
        state.next(4);
        assert_eq!(state.selection(&symptoms), Some("chest_pain"));

        state.next(0);
        state.prev(0);
        assert_eq!(state.selected, 0);
    }
}
