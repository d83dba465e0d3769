//! Log sanitization for patient measurements and secrets.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`], which redacts:
//! - Body measurements written as `key=value` or `key: value` pairs
//!   (age, height, weight, BMI and the survey's numeric columns)
//! - Email addresses and UUIDs
//! - Key material (base64 seeds, long hex strings) next to a key-like name
//!
//! The primary protection is still to keep patient answers out of log calls;
//! this is a fallback for anything that slips through.
//!
//! # Performance
//!
//! `sanitize()` caps its input (see `OBESENSE_SANITIZE_MAX_BYTES`) and only
//! runs the replacements whose pattern matched in a single `RegexSet` scan.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Defaults to 16 KiB; overridden by `OBESENSE_SANITIZE_MAX_BYTES`.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Pattern>,
}

const RULES: [(&str, &str); 5] = [
    (
        r"(?i)\b(age|height|weight|bmi|fcvc|ncp|ch2o|faf|tue)(\s*[:=]\s*)-?[0-9]+(?:\.[0-9]+)?",
        "$1$2[REDACTED]",
    ),
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"(?i)\b(?:seed|secret|private[_-]?key|signing[_-]?key|key)\b\s*[:=]\s*[A-Za-z0-9+/]{32,}={0,2}",
        "[REDACTED-SECRET]",
    ),
    (r"\b[0-9a-fA-F]{64,}\b", "[REDACTED-KEY]"),
];

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("OBESENSE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<Pattern> = RULES
            .iter()
            .filter_map(|&(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| Pattern {
                    regex,
                    replacement,
                })
            })
            .collect();
        let set = RegexSet::new(rules.iter().map(|p| p.regex.as_str()))
            .unwrap_or_else(|_| RegexSet::empty());
        Patterns { set, rules }
    })
}

/// Redact measurements, identifiers and key material from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer that sanitizes each formatted line before
/// passing it on.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter writing one huge line without newlines must not grow the buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
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
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_measurements() {
        let out = sanitize("submitted age=25 height: 1.80 Weight=85.0 bmi = 26.2");
        assert_eq!(
            out,
            "submitted age=[REDACTED] height: [REDACTED] Weight=[REDACTED] bmi = [REDACTED]"
        );
    }

    #[test]
    fn test_leaves_plain_text_alone() {
        let line = "Artifacts loaded: model \"Random Forest\", 16 features, 7 classes";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_redacts_identifiers() {
        let out = sanitize("user 550e8400-e29b-41d4-a716-446655440000 mailed doc@clinic.org");
        assert!(out.contains("[REDACTED-UUID]"));
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(!out.contains("clinic.org"));
    }

    #[test]
    fn test_redacts_key_material() {
        let out = sanitize("seed=QWxhZGRpbjpvcGVuIHNlc2FtZSB3aXRoIGxvbmcgc2VjcmV0IHZhbHVl");
        assert!(out.contains("[REDACTED-SECRET]"));

        let digest = "ab".repeat(32);
        assert!(sanitize(&format!("digest {digest}")).contains("[REDACTED-KEY]"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let out = sanitize_with_limit("héllo wörld", 2);
        assert_eq!(out, "h [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer.write_all(b"weight=9").expect("write");
            writer.write_all(b"0 kg\nok\n").expect("write");
            writer.flush().expect("flush");
        }
        assert_eq!(
            String::from_utf8(sink).expect("utf8"),
            "weight=[REDACTED] kg\nok\n"
        );
    }
}
