//! Line and sentence layout for one page.

mod line;
mod packer;

pub use line::{Line, Sentence};
pub use packer::LinePacker;

use crate::config::SwipeScope;
use crate::token::Token;

/// A packed, finalized page. All lookups return `None` for out-of-range
/// indices rather than panicking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    lines: Vec<Line>,
    sentences: Vec<Sentence>,
    max_width: f32,
    word_gap: f32,
}

impl PageLayout {
    /// Stamp sentence membership onto lines, derive sentence intervals, and
    /// keep only the leading line of each sentence swipeable.
    pub(crate) fn finalize(
        mut lines: Vec<Line>,
        mut sentences: Vec<Sentence>,
        max_width: f32,
        word_gap: f32,
    ) -> Self {
        for (sentence_idx, sentence) in sentences.iter_mut().enumerate() {
            let range = sentence.line_indices();
            for (position, line) in lines[range.clone()].iter_mut().enumerate() {
                line.sentence_index = sentence_idx;
                line.index_in_sentence = position;
                if position > 0 {
                    line.swipeable = false;
                }
            }
            if let Some(first) = lines.get(range.start) {
                sentence.start_time = first.start_time;
            }
            if let Some(last) = range.end.checked_sub(1).and_then(|idx| lines.get(idx)) {
                sentence.end_time = last.end_time;
            }
        }
        Self {
            lines,
            sentences,
            max_width,
            word_gap,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn word_gap(&self) -> f32 {
        self.word_gap
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    pub fn sentence(&self, idx: usize) -> Option<&Sentence> {
        self.sentences.get(idx)
    }

    pub fn sentence_lines(&self, idx: usize) -> Option<&[Line]> {
        let sentence = self.sentences.get(idx)?;
        self.lines.get(sentence.line_indices())
    }

    pub fn sentence_of_line(&self, line_idx: usize) -> Option<&Sentence> {
        let line = self.lines.get(line_idx)?;
        self.sentences.get(line.sentence_index)
    }

    pub fn line_text(&self, idx: usize) -> Option<String> {
        self.lines.get(idx).map(Line::text)
    }

    pub fn sentence_text(&self, idx: usize) -> Option<String> {
        let lines = self.sentence_lines(idx)?;
        Some(
            lines
                .iter()
                .map(Line::text)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// All tokens in reading order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.lines.iter().flat_map(|line| line.tokens.iter())
    }

    pub fn token_count(&self) -> usize {
        self.lines.iter().map(|line| line.tokens.len()).sum()
    }

    pub fn token(&self, token_index: usize) -> Option<&Token> {
        self.tokens().find(|token| token.index == token_index)
    }

    pub fn line_of_token(&self, token_index: usize) -> Option<usize> {
        self.lines.iter().position(|line| {
            matches!(
                (line.first_token_index(), line.last_token_index()),
                (Some(first), Some(last)) if (first..=last).contains(&token_index)
            )
        })
    }

    /// First line whose interval covers `time`.
    pub fn line_at_time(&self, time: f64) -> Option<usize> {
        self.lines.iter().position(|line| line.contains_time(time))
    }

    /// Token being spoken at `time`.
    pub fn token_at_time(&self, time: f64) -> Option<&Token> {
        self.tokens()
            .find(|token| time >= token.audio_start && time < token.audio_end)
    }

    pub fn sentence_at_time(&self, time: f64) -> Option<usize> {
        self.sentences
            .iter()
            .position(|sentence| time >= sentence.start_time && time <= sentence.end_time)
    }

    /// Playback interval for a swipe on `line_idx` under the given scope.
    pub fn swipe_interval(&self, line_idx: usize, scope: SwipeScope) -> Option<(f64, f64)> {
        let line = self.lines.get(line_idx)?;
        match scope {
            SwipeScope::Line => Some(line.swipe_interval()),
            SwipeScope::Sentence => {
                let sentence = self.sentences.get(line.sentence_index)?;
                Some((sentence.start_time, sentence.end_time))
            }
        }
    }
}
