use crate::token::Token;

/// One packed display row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub tokens: Vec<Token>,
    pub start_time: f64,
    pub end_time: f64,
    /// Where a phrase anchored on this line finishes, possibly on a later
    /// continuation line.
    pub phrase_end_time: f64,
    pub sentence_index: usize,
    pub index_in_sentence: usize,
    pub swipeable: bool,
}

impl Line {
    pub(crate) fn new(sentence_index: usize) -> Self {
        Self {
            tokens: Vec::new(),
            start_time: 0.0,
            end_time: 0.0,
            phrase_end_time: 0.0,
            sentence_index,
            index_in_sentence: 0,
            swipeable: false,
        }
    }

    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Words plus the gaps between them.
    pub fn width(&self, word_gap: f32) -> f32 {
        let words: f32 = self.tokens.iter().map(|token| token.width).sum();
        words + word_gap * self.tokens.len().saturating_sub(1) as f32
    }

    pub fn first_token_index(&self) -> Option<usize> {
        self.tokens.first().map(|token| token.index)
    }

    pub fn last_token_index(&self) -> Option<usize> {
        self.tokens.last().map(|token| token.index)
    }

    /// Interval an accepted swipe plays: the line itself, stretched over the
    /// remainder of a phrase that wrapped onto following lines.
    pub fn swipe_interval(&self) -> (f64, f64) {
        (self.start_time, self.end_time.max(self.phrase_end_time))
    }

    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// Consecutive lines ending at sentence-final punctuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub first_line: usize,
    pub line_count: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl Sentence {
    pub(crate) fn starting_at(first_line: usize) -> Self {
        Self {
            first_line,
            line_count: 0,
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    pub fn line_indices(&self) -> std::ops::Range<usize> {
        self.first_line..self.first_line + self.line_count
    }

    pub fn contains_line(&self, line_idx: usize) -> bool {
        self.line_indices().contains(&line_idx)
    }
}
