use crate::text_utils::{QuoteTransition, ends_phrase, has_terminal_punctuation};

/// One word with its audio interval and measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub audio_start: f64,
    pub audio_end: f64,
    /// When the end-of-word trigger fires; equals `audio_end` except for the
    /// final word of a page.
    pub trigger_end: f64,
    pub width: f32,
    pub is_first_in_line: bool,
    pub(crate) ends_phrase: bool,
    pub(crate) terminal: bool,
    pub(crate) quotes: QuoteTransition,
}

impl Token {
    /// Build a token. `audio_end` is raised to `audio_start` if it lies before it.
    pub fn new(
        index: usize,
        text: impl Into<String>,
        audio_start: f64,
        audio_end: f64,
        width: f32,
        abbreviations: &[String],
    ) -> Self {
        let text = text.into();
        let audio_end = audio_end.max(audio_start);
        Self {
            index,
            ends_phrase: ends_phrase(&text),
            terminal: has_terminal_punctuation(&text, abbreviations),
            quotes: QuoteTransition::of(&text),
            text,
            audio_start,
            audio_end,
            trigger_end: audio_end,
            width,
            is_first_in_line: false,
        }
    }

    /// Pull the end trigger back by `clamp` seconds, never before `audio_start`.
    pub fn clamp_trigger_end(&mut self, clamp: f64) {
        self.trigger_end = (self.audio_end - clamp.max(0.0)).max(self.audio_start);
    }

    pub fn ends_phrase(&self) -> bool {
        self.ends_phrase
    }

    /// Whether this word closes a sentence given the quote state before it.
    pub fn ends_sentence(&self, quote_open_before: bool) -> bool {
        self.terminal && !self.quotes.apply(quote_open_before)
    }

    pub fn duration(&self) -> f64 {
        self.audio_end - self.audio_start
    }
}
