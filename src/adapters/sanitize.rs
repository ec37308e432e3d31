//! Log sanitization for personal identifiers.
//!
//! Symptom text is health information, and users sometimes paste more than
//! symptoms into the input field. Formatted log lines pass through
//! [`SanitizingMakeWriter`], which redacts:
//! - Email addresses
//! - Phone numbers
//! - SSN-like numbers
//! - Medical record numbers (MRNs)
//! - Dates of birth (when labelled `DOB` / `born`)
//!
//! Input is capped at a configurable byte length before scanning
//! (`SYMPTRIAGE_SANITIZE_MAX_BYTES`, 16 KiB by default).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PII_PATTERNS: OnceLock<PiiPatterns> = OnceLock::new();

/// Default maximum number of bytes scanned per call.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct PiiPattern {
    regex: Regex,
    replacement: &'static str,
}

struct PiiPatterns {
    set: RegexSet,
    patterns: Vec<PiiPattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn get_patterns() -> &'static PiiPatterns {
    PII_PATTERNS.get_or_init(|| {
        // Order matters: labelled dates and SSNs go before the looser phone pattern.
        let rules: Vec<(&'static str, &'static str)> = vec![
            (
                r"(?i)\b(?:dob|date of birth|born(?: on)?)\s*[:=]?\s*\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}\b",
                "[REDACTED-DOB]",
            ),
            (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
            (r"(?i)\bMRN\s*[:#]?\s*\d{6,10}\b", "[REDACTED-MRN]"),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"(?:\+?\d{1,3}[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = rules
            .into_iter()
            .map(|(pattern, replacement)| PiiPattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        PiiPatterns { set, patterns }
    })
}

/// Redact identifiers, scanning at most [`DEFAULT_SANITIZE_MAX_BYTES`].
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, DEFAULT_SANITIZE_MAX_BYTES)
}

/// Redact identifiers in the first `max_bytes` of `input`.
///
/// Anything beyond the limit is dropped and replaced by ` [TRUNCATED]`.
#[must_use]
pub fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    // Fast path: one scan for "any match".
    if patterns.set.is_match(prefix) {
        for idx in patterns.set.matches(prefix).into_iter() {
            let pattern = &patterns.patterns[idx];
            result = pattern
                .regex
                .replace_all(&result, pattern.replacement)
                .to_string();
        }
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted log
/// line before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_max_bytes(inner, DEFAULT_SANITIZE_MAX_BYTES)
    }

    /// Wrap `inner`, scanning at most `max_bytes` per line (0 means the default).
    #[must_use]
    pub fn with_max_bytes(inner: M, max_bytes: usize) -> Self {
        let max_bytes = if max_bytes == 0 {
            DEFAULT_SANITIZE_MAX_BYTES
        } else {
            max_bytes
        };
        Self { inner, max_bytes }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    /// Sanitize and forward `bytes`, keeping a trailing newline that truncation cut off.
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let mut sanitized = sanitize_with_limit(&text, self.max_bytes);
        if text.ends_with('\n') && !sanitized.ends_with('\n') {
            sanitized.push('\n');
        }
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter writing one huge line without newlines must not buffer forever.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            if pending.last() != Some(&b'\n') {
                self.inner.write_all(b"\n")?;
            }
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
            max_bytes: self.max_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_ssn() {
        let sanitized = sanitize("SSN: 123-45-6789");
        assert!(sanitized.contains("[REDACTED-SSN]"));
        assert!(!sanitized.contains("123-45-6789"));
    }

    #[test]
    fn test_sanitize_mrn() {
        assert!(sanitize("MRN:12345678 found").contains("[REDACTED-MRN]"));
        assert!(sanitize("mrn # 0012345").contains("[REDACTED-MRN]"));
    }

    #[test]
    fn test_sanitize_email() {
        let sanitized = sanitize("Contact: patient@hospital.com");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(!sanitized.contains("hospital.com"));
    }

    #[test]
    fn test_sanitize_phone() {
        let sanitized = sanitize("call me at (555) 123-4567 please");
        assert!(sanitized.contains("[REDACTED-PHONE]"));
        assert!(!sanitized.contains("4567"));
    }

    #[test]
    fn test_sanitize_dob() {
        let sanitized = sanitize("headache, DOB: 04/12/1987, fever");
        assert!(sanitized.contains("[REDACTED-DOB]"));
        assert!(sanitized.contains("headache"));
        assert!(!sanitized.contains("1987"));
    }

    #[test]
    fn test_symptom_text_untouched() {
        let input = "Matched 3 symptoms: chest_pain, sweating, high_fever";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix ñññññ suffix", 9);
        assert!(sanitized.ends_with(" [TRUNCATED]"));
        assert!(sanitized.starts_with("prefix "));
    }

    #[test]
    fn test_writer_sanitizes_each_line() {
        let mut writer = SanitizingWriter {
            inner: Vec::new(),
            buffer: Vec::new(),
            max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        };
        writer
            .write_all(b"first user@example.org\nsecond line")
            .expect("write");
        assert_eq!(writer.inner, b"first [REDACTED-EMAIL]\n");
        writer.flush().expect("flush");
        assert_eq!(writer.inner, b"first [REDACTED-EMAIL]\nsecond line");
    }

    #[test]
    fn test_truncated_lines_stay_separate() {
        let mut writer = SanitizingWriter {
            inner: Vec::new(),
            buffer: Vec::new(),
            max_bytes: 12,
        };
        writer.write_all(b"0123456789abcdef\n").expect("write");
        writer.write_all(b"next\n").expect("write");
        assert_eq!(writer.inner, b"0123456789ab [TRUNCATED]\nnext\n");
    }
}
