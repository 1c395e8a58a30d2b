//! Quoted-speech extraction strategies.

use regex::Regex;
use std::sync::OnceLock;

/// Strategy for finding quoted speech in source text and deciding whether a
/// dialogue line covers it.
///
/// Implementations are heuristics. The validator only ever turns their output
/// into warnings, so an imprecise matcher degrades advice, never validity.
pub trait SpeechMatcher: Send + Sync {
    /// Extract the quoted spans from the source text, in order of appearance.
    fn quoted_spans(&self, source_text: &str) -> Vec<String>;

    /// Whether a dialogue line accounts for a quoted span.
    fn covers(&self, span: &str, dialogue_text: &str) -> bool;
}

/// Default matcher: regex extraction over ASCII, curly, and CJK corner
/// quotes; a dialogue covers a span when either string contains the other
/// after trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteHeuristic;

fn quote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""([^"]+)"|“([^”]+)”|「([^」]+)」"#).unwrap_or_else(|e| {
            unreachable!("invalid quote pattern: {e}");
        })
    })
}

impl SpeechMatcher for QuoteHeuristic {
    fn quoted_spans(&self, source_text: &str) -> Vec<String> {
        quote_pattern()
            .captures_iter(source_text)
            .filter_map(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().trim().to_string())
            })
            .filter(|span| !span.is_empty())
            .collect()
    }

    fn covers(&self, span: &str, dialogue_text: &str) -> bool {
        let span = span.trim();
        let dialogue = dialogue_text.trim();
        if span.is_empty() || dialogue.is_empty() {
            return false;
        }
        dialogue.contains(span) || span.contains(dialogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_quote_styles() {
        let heuristic = QuoteHeuristic;
        let source = r#"He said "hello there" and she answered “not now”. 「行くぞ」 he shouted."#;
        let spans = heuristic.quoted_spans(source);
        assert_eq!(spans, vec!["hello there", "not now", "行くぞ"]);
    }

    #[test]
    fn coverage_is_bidirectional_containment() {
        let heuristic = QuoteHeuristic;
        assert!(heuristic.covers("hello there", "Well, hello there, friend"));
        assert!(heuristic.covers("hello there, friend", "hello there"));
        assert!(!heuristic.covers("goodbye", "hello there"));
    }

    #[test]
    fn empty_spans_are_dropped() {
        let heuristic = QuoteHeuristic;
        assert!(heuristic.quoted_spans(r#"he paused: "  " and went on"#).is_empty());
    }
}
