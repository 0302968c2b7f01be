//! Punctuation helpers for phrase and sentence boundaries.
//!
//! Everything here looks at a single word. Closing quotes and brackets that
//! trail the punctuation are ignored, so `said,"` still ends a phrase.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_PHRASE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[,;:.!?…—–]["'”’)\]]*$"#).unwrap());
static RE_TERMINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.!?…]["'”’)\]]*$"#).unwrap());
static RE_LEADING_WRAPPERS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^["'“‘(\[]+"#).unwrap());

/// True when the word closes a phrase (comma, colon, dash, or any sentence
/// terminator).
pub fn ends_phrase(word: &str) -> bool {
    RE_PHRASE_END.is_match(word.trim_end())
}

/// True when the word ends in sentence-final punctuation and is not one of
/// the listed abbreviations. Quote state is applied separately.
pub fn has_terminal_punctuation(word: &str, abbreviations: &[String]) -> bool {
    let trimmed = word.trim();
    RE_TERMINAL.is_match(trimmed) && !is_abbreviation(trimmed, abbreviations)
}

/// Case-insensitive match against the abbreviation list, ignoring opening
/// quotes or brackets.
pub fn is_abbreviation(word: &str, abbreviations: &[String]) -> bool {
    let bare = RE_LEADING_WRAPPERS.replace(word.trim(), "");
    abbreviations
        .iter()
        .any(|abbr| abbr.trim().eq_ignore_ascii_case(&bare))
}

/// Quote state after a word, precomputed for both possible incoming states.
///
/// Straight double quotes toggle; curly quotes open or close explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTransition {
    from_closed: bool,
    from_open: bool,
}

impl QuoteTransition {
    pub fn of(word: &str) -> Self {
        Self {
            from_closed: scan_quotes(word, false),
            from_open: scan_quotes(word, true),
        }
    }

    pub fn apply(self, quote_open: bool) -> bool {
        if quote_open {
            self.from_open
        } else {
            self.from_closed
        }
    }
}

fn scan_quotes(word: &str, mut open: bool) -> bool {
    for ch in word.chars() {
        match ch {
            '“' => open = true,
            '”' => open = false,
            '"' => open = !open,
            _ => {}
        }
    }
    open
}
