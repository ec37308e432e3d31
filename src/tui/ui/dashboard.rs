//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::styles::{MedicalTheme, APP_NAME};

/// Counts for this session only; nothing is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub requests: usize,
    pub predictions: usize,
    pub no_match: usize,
    pub errors: usize,
}

/// Dashboard state for rendering.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub model_loaded: bool,
    pub symptom_count: usize,
    pub disease_count: usize,
    pub described_diseases: usize,
    pub severity_entries: usize,
    pub has_importance: bool,
    pub session: SessionSummary,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_main_content(f, chunks[1], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled(APP_NAME, MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Symptom-Based Disease Triage", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_main_content(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Status panels
            Constraint::Percentage(60), // Session summary
        ])
        .split(area);

    render_status_panels(f, chunks[0], state);
    render_session_summary(f, chunks[1], state.session);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // System status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let status_items = vec![
        format_status_item("Model Loaded", state.model_loaded),
        format_status_item("Feature Importance", state.has_importance),
        format_count("Symptoms", state.symptom_count),
        format_count("Diseases", state.disease_count),
        format_count("Described", state.described_diseases),
        format_count("Severity Weights", state.severity_entries),
    ];

    let status_block = Block::default()
        .title(Span::styled(" System Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(status_items).block(status_block), chunks[0]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Triage", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Browse Symptoms", MedicalTheme::key_desc()),
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

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", MedicalTheme::success())
    } else {
        ("--", MedicalTheme::text_muted())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), MedicalTheme::text()),
    ])
}

fn format_count(label: &str, count: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), MedicalTheme::text_secondary()),
        Span::styled(count.to_string(), MedicalTheme::text()),
    ])
}

fn render_session_summary(f: &mut Frame, area: Rect, session: SessionSummary) {
    let block = Block::default()
        .title(Span::styled(" This Session ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if session.requests == 0 {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No requests yet. Press [N] to describe symptoms.",
            MedicalTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Requests: ", MedicalTheme::text_secondary()),
            Span::styled(session.requests.to_string(), MedicalTheme::text()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Predictions: ", MedicalTheme::text_secondary()),
            Span::styled(session.predictions.to_string(), MedicalTheme::success()),
            Span::styled("  ", MedicalTheme::text()),
            Span::styled("No match: ", MedicalTheme::text_secondary()),
            Span::styled(session.no_match.to_string(), MedicalTheme::warning()),
            Span::styled("  ", MedicalTheme::text()),
            Span::styled("Failed: ", MedicalTheme::text_secondary()),
            Span::styled(session.errors.to_string(), MedicalTheme::danger()),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Symptoms and results are not stored or logged.",
            MedicalTheme::text_muted(),
        )]),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
