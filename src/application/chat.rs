//! Chat rendering: turns a prediction outcome into typed message blocks.
//!
//! Block kinds: `text`, `prediction`, `precautions`, `alternatives`, `symptoms`.
//! A client renders them in order as chat bubbles.

use serde::{Deserialize, Serialize};

use crate::domain::{PredictionOutcome, PredictionReport};
use crate::SymptriageError;

/// Message shown when a request has no symptoms at all.
pub const EMPTY_REQUEST_MESSAGE: &str = "No symptoms provided";

/// One chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    Text {
        content: String,
    },
    Prediction {
        disease: String,
        /// Percentage with one decimal, e.g. `"87.5%"`.
        probability: String,
        description: String,
    },
    Precautions {
        content: String,
    },
    Alternatives {
        content: String,
    },
    Symptoms {
        content: String,
    },
}

impl ChatMessage {
    fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// Response body for a chat client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: String,
    pub messages: Vec<ChatMessage>,
    pub raw_results: PredictionOutcome,
}

impl ChatResponse {
    #[must_use]
    pub fn new(outcome: PredictionOutcome) -> Self {
        Self {
            status: "success".to_string(),
            messages: format_for_chat(&outcome),
            raw_results: outcome,
        }
    }
}

/// Severity as a bare number: whole weights without decimals, the mean fallback with two.
#[must_use]
pub fn format_severity(severity: f64) -> String {
    if severity.fract() == 0.0 {
        format!("{severity:.0}")
    } else {
        format!("{severity:.2}")
    }
}

/// Render an outcome as chat blocks.
#[must_use]
pub fn format_for_chat(outcome: &PredictionOutcome) -> Vec<ChatMessage> {
    match outcome {
        PredictionOutcome::NoMatch(no_match) => {
            let mut messages = vec![ChatMessage::text(format!("⚠️ {}", no_match.error))];
            if !no_match.suggestions.is_empty() {
                let mut text = String::from("Did you mean:\n");
                for suggestion in &no_match.suggestions {
                    text.push_str(&format!(
                        "• {} → {}\n",
                        suggestion.phrase,
                        suggestion.candidates.join(", ")
                    ));
                }
                messages.push(ChatMessage::text(text));
            }
            messages
        }
        PredictionOutcome::Prediction(report) => format_report(report),
    }
}

fn format_report(report: &PredictionReport) -> Vec<ChatMessage> {
    let top = &report.top_prediction;
    let mut messages = vec![ChatMessage::Prediction {
        disease: top.disease.clone(),
        probability: top.percent(),
        description: top.description.clone(),
    }];

    if !top.precautions.is_empty() {
        let mut content = String::from("⚠️ Recommended Precautions:\n");
        for precaution in &top.precautions {
            content.push_str(&format!("• {precaution}\n"));
        }
        messages.push(ChatMessage::Precautions { content });
    }

    if !report.alternative_predictions.is_empty() {
        let mut content = String::from("🔄 Alternative possibilities:\n");
        for alt in &report.alternative_predictions {
            content.push_str(&format!("• {} ({})\n", alt.disease, alt.percent()));
        }
        messages.push(ChatMessage::Alternatives { content });
    }

    let mut content = String::from("🩺 Symptom Severity Analysis:\n");
    for detail in &report.symptom_details {
        content.push_str(&format!(
            "• {}: {} out of 7\n",
            detail.symptom,
            format_severity(detail.severity)
        ));
    }
    messages.push(ChatMessage::Symptoms { content });

    messages
}

/// Client-facing text for a failed request.
#[must_use]
pub fn error_text(err: &SymptriageError) -> String {
    match err {
        SymptriageError::EmptyRequest => EMPTY_REQUEST_MESSAGE.to_string(),
        other => format!("Prediction failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DiseasePrediction, NoMatchReport, SymptomDetail, SymptomSuggestion, NO_MATCH_MESSAGE,
    };

    fn prediction(disease: &str, probability: f64, precautions: &[&str]) -> DiseasePrediction {
        DiseasePrediction {
            disease: disease.into(),
            probability,
            description: format!("About {disease}"),
            precautions: precautions.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    fn report() -> PredictionReport {
        PredictionReport {
            top_prediction: prediction("Heart attack", 0.8, &["call ambulance", "stay calm"]),
            alternative_predictions: vec![prediction("GERD", 0.125, &[])],
            matched_symptoms: vec!["chest_pain".into(), "sweating".into()],
            symptom_details: vec![
                SymptomDetail {
                    symptom: "chest_pain".into(),
                    severity: 7.0,
                    importance: None,
                },
                SymptomDetail {
                    symptom: "sweating".into(),
                    severity: 4.2345,
                    importance: None,
                },
            ],
            unmatched_symptoms: Vec::new(),
            symptom_suggestions: Vec::new(),
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_prediction_blocks() {
        let messages = format_for_chat(&PredictionOutcome::Prediction(report()));
        assert_eq!(messages.len(), 4);
        assert_eq!(
            messages[0],
            ChatMessage::Prediction {
                disease: "Heart attack".into(),
                probability: "80.0%".into(),
                description: "About Heart attack".into(),
            }
        );
        assert_eq!(
            messages[1],
            ChatMessage::Precautions {
                content: "⚠️ Recommended Precautions:\n• call ambulance\n• stay calm\n".into()
            }
        );
        assert_eq!(
            messages[2],
            ChatMessage::Alternatives {
                content: "🔄 Alternative possibilities:\n• GERD (12.5%)\n".into()
            }
        );
        assert_eq!(
            messages[3],
            ChatMessage::Symptoms {
                content: "🩺 Symptom Severity Analysis:\n• chest_pain: 7 out of 7\n• sweating: 4.23 out of 7\n"
                    .into()
            }
        );
    }

    #[test]
    fn test_optional_blocks_omitted() {
        let mut report = report();
        report.top_prediction.precautions.clear();
        report.alternative_predictions.clear();
        let messages = format_for_chat(&PredictionOutcome::Prediction(report));
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[1], ChatMessage::Symptoms { .. }));
    }

    #[test]
    fn test_no_match_blocks() {
        let outcome = PredictionOutcome::NoMatch(NoMatchReport::new(
            vec!["sweaty palms".into(), "qqq".into()],
            vec![SymptomSuggestion {
                phrase: "sweaty palms".into(),
                candidates: vec!["sweating".into()],
            }],
        ));
        let messages = format_for_chat(&outcome);
        assert_eq!(messages[0], ChatMessage::text(format!("⚠️ {NO_MATCH_MESSAGE}")));
        assert_eq!(
            messages[1],
            ChatMessage::text("Did you mean:\n• sweaty palms → sweating\n")
        );

        let bare = PredictionOutcome::NoMatch(NoMatchReport::new(vec!["qqq".into()], Vec::new()));
        assert_eq!(format_for_chat(&bare).len(), 1);
    }

    #[test]
    fn test_message_json_shape() {
        let json = serde_json::to_value(ChatMessage::text("hi")).expect("serialize");
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "hi");

        let response = ChatResponse::new(PredictionOutcome::Prediction(report()));
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["status"], "success");
        assert_eq!(json["messages"][0]["type"], "prediction");
        assert_eq!(json["raw_results"]["status"], "prediction");
        assert_eq!(json["raw_results"]["top_prediction"]["disease"], "Heart attack");
    }

    #[test]
    fn test_error_text() {
        assert_eq!(error_text(&SymptriageError::EmptyRequest), EMPTY_REQUEST_MESSAGE);
        let err = SymptriageError::Model(crate::ports::ModelError::DimensionMismatch {
            expected: 2,
            got: 3,
        });
        assert!(error_text(&err).starts_with("Prediction failed: "));
    }
}
