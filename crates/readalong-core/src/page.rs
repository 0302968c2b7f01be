//! Page input: words, their audio timings, and the width to pack into.

use crate::config::EngineConfig;
use crate::measure::TextMeasurer;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use ts_rs::TS;
use unicode_normalization::UnicodeNormalization;

/// Audio interval of one word, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WordTiming {
    pub start: f64,
    pub end: f64,
}

impl WordTiming {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// One page as handed over by the content layer.
///
/// In JSON either `words` or a whitespace-separated `text` may be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPageSource")]
pub struct PageSource {
    pub words: Vec<String>,
    pub timestamps: Vec<WordTiming>,
    pub max_line_width: f32,
}

#[derive(Deserialize)]
struct RawPageSource {
    #[serde(default)]
    words: Vec<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    timestamps: Vec<WordTiming>,
    max_line_width: f32,
}

impl From<RawPageSource> for PageSource {
    fn from(raw: RawPageSource) -> Self {
        let words = match (raw.words.is_empty(), raw.text) {
            (true, Some(text)) => split_words(&text),
            (_, _) => raw.words,
        };
        Self {
            words,
            timestamps: raw.timestamps,
            max_line_width: raw.max_line_width,
        }
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

impl PageSource {
    pub fn new(words: Vec<String>, timestamps: Vec<WordTiming>, max_line_width: f32) -> Self {
        Self {
            words,
            timestamps,
            max_line_width,
        }
    }

    pub fn from_text(text: &str, timestamps: Vec<WordTiming>, max_line_width: f32) -> Self {
        Self::new(split_words(text), timestamps, max_line_width)
    }

    /// Give every word the same duration, back to back from zero. Useful when
    /// a page has no alignment yet.
    pub fn evenly_timed(text: &str, seconds_per_word: f64, max_line_width: f32) -> Self {
        let words = split_words(text);
        let step = seconds_per_word.max(0.0);
        let timestamps = (0..words.len())
            .map(|idx| WordTiming::new(idx as f64 * step, (idx + 1) as f64 * step))
            .collect();
        Self::new(words, timestamps, max_line_width)
    }

    /// Seconds until the last timed word ends.
    pub fn duration(&self) -> f64 {
        self.timestamps
            .iter()
            .take(self.words.len())
            .map(|timing| timing.end)
            .fold(0.0, f64::max)
    }
}

/// Recoverable input problem found while building tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum InputWarning {
    /// Word and timestamp counts differ; only the shared prefix is used.
    LengthMismatch { words: usize, timestamps: usize },
    /// A word ends before it starts; its end was raised to its start.
    InvertedTiming { index: usize },
    /// A timestamp is NaN or infinite; the word was dropped with everything after it.
    NonFiniteTiming { index: usize },
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::LengthMismatch { words, timestamps } => write!(
                f,
                "{words} words but {timestamps} timestamps; using the first {}",
                words.min(timestamps)
            ),
            InputWarning::InvertedTiming { index } => {
                write!(f, "word {index} ends before it starts")
            }
            InputWarning::NonFiniteTiming { index } => {
                write!(f, "word {index} has a non-finite timestamp")
            }
        }
    }
}

/// Turn a page source into tokens, measuring each word. The final token's
/// end trigger is pulled in by the configured clamp.
pub fn build_tokens(
    source: &PageSource,
    measurer: &dyn TextMeasurer,
    config: &EngineConfig,
) -> (Vec<Token>, Vec<InputWarning>) {
    let mut warnings = Vec::new();
    let words = source.words.len();
    let timestamps = source.timestamps.len();
    if words != timestamps {
        warn!(words, timestamps, "Word and timestamp counts differ");
        warnings.push(InputWarning::LengthMismatch { words, timestamps });
    }

    let mut tokens = Vec::with_capacity(words.min(timestamps));
    for (index, (word, timing)) in source.words.iter().zip(&source.timestamps).enumerate() {
        if !timing.start.is_finite() || !timing.end.is_finite() {
            warn!(index, "Stopping at non-finite timestamp");
            warnings.push(InputWarning::NonFiniteTiming { index });
            break;
        }
        if timing.end < timing.start {
            warn!(index, start = timing.start, end = timing.end, "Inverted word timing");
            warnings.push(InputWarning::InvertedTiming { index });
        }
        let text: String = word.trim().nfc().collect();
        let width = measurer.measure(&text);
        tokens.push(Token::new(
            index,
            text,
            timing.start,
            timing.end,
            width,
            &config.abbreviations,
        ));
    }
    if let Some(last) = tokens.last_mut() {
        last.clamp_trigger_end(config.last_token_trigger_clamp);
    }
    (tokens, warnings)
}
