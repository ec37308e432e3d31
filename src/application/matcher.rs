//! Symptom matcher: maps free-text phrases onto the model vocabulary.

use std::collections::HashMap;

use crate::domain::similarity::close_matches;
use crate::domain::{ParsedSymptoms, SimilarityMetric, SymptomSuggestion, SymptomVocabulary};

/// Matching thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Minimum similarity for a phrase to be accepted as a symptom.
    pub match_cutoff: f64,
    /// Minimum similarity for an entry to be offered as a suggestion.
    pub suggest_cutoff: f64,
    /// Suggestions per unmatched phrase.
    pub max_suggestions: usize,
    pub metric: SimilarityMetric,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            match_cutoff: 0.6,
            suggest_cutoff: 0.4,
            max_suggestions: 3,
            metric: SimilarityMetric::Gestalt,
        }
    }
}

/// Split a request into trimmed, non-empty phrases.
#[must_use]
pub fn split_phrases(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fuzzy matcher over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct SymptomMatcher {
    config: MatcherConfig,
    /// Lowercased vocabulary entries, in vocabulary order.
    keys: Vec<String>,
    /// Canonical names, parallel to `keys`.
    names: Vec<String>,
    /// Lowercased entry -> position.
    index: HashMap<String, usize>,
}

impl SymptomMatcher {
    #[must_use]
    pub fn new(vocabulary: &SymptomVocabulary, config: MatcherConfig) -> Self {
        let mut keys = Vec::with_capacity(vocabulary.len());
        let mut names = Vec::with_capacity(vocabulary.len());
        let mut index = HashMap::with_capacity(vocabulary.len());
        for (key, name) in vocabulary.lowercase_entries() {
            index.insert(key.clone(), keys.len());
            keys.push(key);
            names.push(name.to_string());
        }
        Self {
            config,
            keys,
            names,
            index,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Canonical symptom for a single phrase: exact (case-insensitive) hit
    /// first, else the best candidate at or above the match cutoff.
    #[must_use]
    pub fn match_symptom(&self, phrase: &str) -> Option<&str> {
        let key = phrase.trim().to_lowercase();
        if let Some(&i) = self.index.get(&key) {
            return Some(self.names[i].as_str());
        }

        close_matches(self.config.metric, &key, &self.keys, 1, self.config.match_cutoff)
            .first()
            .map(|m| self.names[m.index].as_str())
    }

    /// Up to `max_suggestions` canonical names at or above the suggestion cutoff.
    #[must_use]
    pub fn suggest(&self, phrase: &str) -> Vec<String> {
        let key = phrase.trim().to_lowercase();
        close_matches(
            self.config.metric,
            &key,
            &self.keys,
            self.config.max_suggestions,
            self.config.suggest_cutoff,
        )
        .into_iter()
        .map(|m| self.names[m.index].clone())
        .collect()
    }

    /// Match every comma-separated phrase of a request.
    ///
    /// Matched names are deduplicated, keeping first-seen order. A phrase with
    /// no match is recorded as unmatched, and gets a suggestion entry only if
    /// at least one candidate clears the suggestion cutoff.
    #[must_use]
    pub fn parse_symptoms(&self, input: &str) -> ParsedSymptoms {
        let mut parsed = ParsedSymptoms::default();

        for phrase in split_phrases(input) {
            match self.match_symptom(phrase) {
                Some(name) => {
                    if !parsed.matched.iter().any(|m| m == name) {
                        parsed.matched.push(name.to_string());
                    }
                }
                None => {
                    parsed.unmatched.push(phrase.to_string());
                    let candidates = self.suggest(phrase);
                    if !candidates.is_empty() {
                        parsed.suggestions.push(SymptomSuggestion {
                            phrase: phrase.to_string(),
                            candidates,
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "Parsed request: {} matched, {} unmatched, {} with suggestions",
            parsed.matched.len(),
            parsed.unmatched.len(),
            parsed.suggestions.len()
        );
        parsed
    }

    /// Vocabulary entries starting with `prefix` (case-insensitive), for input hints.
    #[must_use]
    pub fn completions(&self, prefix: &str, limit: usize) -> Vec<&str> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.keys
            .iter()
            .zip(&self.names)
            .filter(|(k, _)| k.starts_with(&prefix) || k.replace('_', " ").starts_with(&prefix))
            .take(limit)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}
