//! Results view: top prediction, alternatives and symptom severity.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::application::chat::format_severity;
use crate::domain::{NoMatchReport, PredictionOutcome, PredictionReport, SymptomSuggestion};
use crate::tui::styles::MedicalTheme;

/// Results state
#[derive(Debug, Clone, Default)]
pub enum ResultsState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Request answered (prediction or no match)
    Complete { outcome: Box<PredictionOutcome> },
    /// Request failed
    Error { message: String },
}

impl ResultsState {
    /// Wipe the phrases the user typed and return to `Idle`.
    ///
    /// Matched symptoms are vocabulary names and are dropped normally.
    pub fn clear_sensitive(&mut self) {
        match self {
            Self::Complete { outcome } => match outcome.as_mut() {
                PredictionOutcome::Prediction(report) => {
                    wipe_phrases(&mut report.unmatched_symptoms, &mut report.symptom_suggestions);
                }
                PredictionOutcome::NoMatch(no_match) => {
                    wipe_phrases(&mut no_match.unmatched, &mut no_match.suggestions);
                }
            },
            Self::Error { message } => message.zeroize(),
            Self::Idle => {}
        }
        *self = Self::Idle;
    }
}

fn wipe_phrases(unmatched: &mut Vec<String>, suggestions: &mut [SymptomSuggestion]) {
    for phrase in unmatched.iter_mut() {
        phrase.zeroize();
    }
    unmatched.clear();
    for suggestion in suggestions {
        suggestion.phrase.zeroize();
    }
}

/// Render the results screen
pub fn render_results(f: &mut Frame, area: Rect, state: &ResultsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_results_header(f, chunks[0]);
    match state {
        ResultsState::Idle => render_idle(f, chunks[1]),
        ResultsState::Complete { outcome } => match outcome.as_ref() {
            PredictionOutcome::Prediction(report) => render_report(f, chunks[1], report),
            PredictionOutcome::NoMatch(no_match) => render_no_match(f, chunks[1], no_match),
        },
        ResultsState::Error { message } => render_error(f, chunks[1], message),
    }
    render_results_footer(f, chunks[2], state);
}

fn render_results_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Triage Result", MedicalTheme::title()),
        Span::styled(" │ Random Forest Estimate", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No request yet", MedicalTheme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled(
            "Enter symptoms to begin",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_report(f: &mut Frame, area: Rect, report: &PredictionReport) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    render_top_prediction(f, rows[0], report);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_precautions_and_alternatives(f, columns[0], report);
    render_symptom_severity(f, columns[1], report);
}

fn render_top_prediction(f: &mut Frame, area: Rect, report: &PredictionReport) {
    let top = &report.top_prediction;
    let block = Block::default()
        .title(Span::styled(" Most Likely ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Disease
            Constraint::Length(3), // Probability
            Constraint::Min(0),    // Description
        ])
        .split(inner);

    let disease = Paragraph::new(Line::from(Span::styled(
        top.disease.as_str(),
        MedicalTheme::title(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(disease, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::confidence(top.probability))
        .ratio(top.probability.clamp(0.0, 1.0))
        .label(top.percent());
    f.render_widget(gauge, chunks[1]);

    let description = Paragraph::new(Span::styled(
        top.description.as_str(),
        MedicalTheme::text_secondary(),
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(description, chunks[2]);
}

fn render_precautions_and_alternatives(f: &mut Frame, area: Rect, report: &PredictionReport) {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled("Precautions", MedicalTheme::subtitle())));
    if report.top_prediction.precautions.is_empty() {
        lines.push(Line::from(Span::styled("  none listed", MedicalTheme::text_muted())));
    }
    for precaution in &report.top_prediction.precautions {
        lines.push(Line::from(vec![
            Span::styled("  • ", MedicalTheme::warning()),
            Span::styled(precaution.as_str(), MedicalTheme::text()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Alternatives", MedicalTheme::subtitle())));
    if report.alternative_predictions.is_empty() {
        lines.push(Line::from(Span::styled("  none", MedicalTheme::text_muted())));
    }
    for alt in &report.alternative_predictions {
        lines.push(Line::from(vec![
            Span::styled("  • ", MedicalTheme::info()),
            Span::styled(alt.disease.as_str(), MedicalTheme::text()),
            Span::styled(format!(" ({})", alt.percent()), MedicalTheme::text_secondary()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_symptom_severity(f: &mut Frame, area: Rect, report: &PredictionReport) {
    let mut lines = vec![Line::from(Span::styled(
        "Symptom Severity",
        MedicalTheme::subtitle(),
    ))];

    for detail in &report.symptom_details {
        lines.push(Line::from(vec![
            Span::styled("  • ", MedicalTheme::text_muted()),
            Span::styled(detail.symptom.as_str(), MedicalTheme::text()),
            Span::styled(": ", MedicalTheme::text_muted()),
            Span::styled(
                format!("{} out of 7", format_severity(detail.severity)),
                MedicalTheme::severity(detail.severity),
            ),
        ]));
    }

    if !report.unmatched_symptoms.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Not recognised: ", MedicalTheme::text_secondary()),
            Span::styled(report.unmatched_symptoms.join(", "), MedicalTheme::text_muted()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_no_match(f: &mut Frame, area: Rect, no_match: &NoMatchReport) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(no_match.error.as_str(), MedicalTheme::warning())),
        Line::from(""),
    ];

    if no_match.suggestions.is_empty() {
        lines.push(Line::from(Span::styled(
            "No similar symptoms found. Try [F2] to browse the list.",
            MedicalTheme::text_muted(),
        )));
    } else {
        lines.push(Line::from(Span::styled("Did you mean:", MedicalTheme::text_secondary())));
        for suggestion in &no_match.suggestions {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} → ", suggestion.phrase), MedicalTheme::text_muted()),
                Span::styled(suggestion.candidates.join(", "), MedicalTheme::focused()),
            ]));
        }
    }

    let content = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::warning()),
    );

    f.render_widget(content, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_results_footer(f: &mut Frame, area: Rect, state: &ResultsState) {
    let content = match state {
        ResultsState::Complete { outcome } if !outcome.is_prediction() => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Edit Symptoms ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard", MedicalTheme::key_desc()),
        ]),
        ResultsState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Retry ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Triage ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard", MedicalTheme::key_desc()),
        ]),
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

    #[test]
    fn test_wipe_phrases() {
        let mut unmatched = vec!["sweaty palms".to_string()];
        let mut suggestions = vec![SymptomSuggestion {
            phrase: "sweaty palms".into(),
            candidates: vec!["sweating".into()],
        }];
        wipe_phrases(&mut unmatched, &mut suggestions);
        assert!(unmatched.is_empty());
        assert!(suggestions[0].phrase.is_empty());
        assert_eq!(suggestions[0].candidates, vec!["sweating"]);
    }

    #[test]
    fn test_clear_sensitive_resets_to_idle() {
        let mut state = ResultsState::Complete {
            outcome: Box::new(PredictionOutcome::NoMatch(NoMatchReport::new(
                vec!["sweaty palms".into()],
                Vec::new(),
            ))),
        };
        state.clear_sensitive();
        assert!(matches!(state, ResultsState::Idle));

        let mut state = ResultsState::Error {
            message: "failed".into(),
        };
        state.clear_sensitive();
        assert!(matches!(state, ResultsState::Idle));
    }
}
