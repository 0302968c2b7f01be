//! Greedy line packing that keeps phrases together.
//!
//! Tokens arrive in reading order. A token that does not fit opens a new
//! line; if the line it overflowed ends with an unfinished phrase, that phrase
//! is lifted off and replayed on the new line so it is never split. The only
//! phrase that may be split is one that already fills a whole line by itself.
//!
//! Re-adding relocated tokens goes through a work queue rather than
//! recursion, so a page that is one long phrase cannot grow the stack.

use super::PageLayout;
use super::line::{Line, Sentence};
use crate::token::Token;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Packing state for one page.
#[derive(Debug, Clone)]
struct PackingState {
    remaining_width: f32,
    /// The current line began inside a phrase carried over from the line above.
    is_mid_phrase: bool,
    /// No phrase has closed on the current line yet.
    line_is_one_phrase: bool,
    prev_word_ends_phrase: bool,
    prev_word_ends_sentence: bool,
    quote_open: bool,
    /// Number of trailing tokens on the current line that belong to the open phrase.
    phrase_buffer: usize,
    quote_open_at_phrase_start: bool,
    /// Swipeable line whose interval covers the open phrase.
    anchor_line: Option<usize>,
}

impl PackingState {
    fn new() -> Self {
        Self {
            remaining_width: 0.0,
            is_mid_phrase: false,
            line_is_one_phrase: false,
            prev_word_ends_phrase: true,
            prev_word_ends_sentence: true,
            quote_open: false,
            phrase_buffer: 0,
            quote_open_at_phrase_start: false,
            anchor_line: None,
        }
    }
}

enum Placement {
    Placed,
    Requeue(Vec<Token>),
}

/// Packs one page of tokens into lines and sentences.
#[derive(Debug, Clone)]
pub struct LinePacker {
    max_width: f32,
    word_gap: f32,
    lines: Vec<Line>,
    sentences: Vec<Sentence>,
    state: PackingState,
}

impl LinePacker {
    pub fn new(max_width: f32, word_gap: f32) -> Self {
        Self {
            max_width,
            word_gap: word_gap.max(0.0),
            lines: Vec::new(),
            sentences: Vec::new(),
            state: PackingState::new(),
        }
    }

    /// Drop everything packed so far and start a fresh page.
    pub fn reset(&mut self, max_width: f32) {
        self.max_width = max_width;
        self.lines.clear();
        self.sentences.clear();
        self.state = PackingState::new();
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn add_tokens(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            self.add_token(token);
        }
    }

    pub fn add_token(&mut self, token: Token) {
        let mut pending = VecDeque::from([token]);
        while let Some(next) = pending.pop_front() {
            if let Placement::Requeue(tokens) = self.place(next) {
                for token in tokens.into_iter().rev() {
                    pending.push_front(token);
                }
            }
        }
    }

    /// Run sentence finalization and hand back the packed page.
    pub fn finish(self) -> PageLayout {
        PageLayout::finalize(self.lines, self.sentences, self.max_width, self.word_gap)
    }

    fn place(&mut self, token: Token) -> Placement {
        let fits = !self.state.prev_word_ends_sentence
            && self.lines.last().is_some_and(|line| {
                // A fresh line always takes its first word, even an over-wide one.
                line.tokens.is_empty() || token.width <= self.state.remaining_width
            });
        if fits {
            self.place_on_current_line(token);
            Placement::Placed
        } else {
            Placement::Requeue(self.break_line(token))
        }
    }

    fn place_on_current_line(&mut self, mut token: Token) {
        let line_idx = self.lines.len() - 1;
        let state = &mut self.state;
        let line = &mut self.lines[line_idx];

        state.remaining_width -= token.width + self.word_gap;
        if line.tokens.is_empty() {
            token.is_first_in_line = true;
            line.start_time = token.audio_start;
            state.line_is_one_phrase = true;
            if state.is_mid_phrase {
                line.swipeable = false;
            } else {
                line.swipeable = true;
                state.anchor_line = Some(line_idx);
            }
        }
        line.end_time = token.trigger_end;

        let quote_before = state.quote_open;
        state.quote_open = token.quotes.apply(quote_before);
        let ends_sentence = token.ends_sentence(quote_before);
        let closes_phrase = token.ends_phrase || ends_sentence;

        if closes_phrase {
            if let Some(anchor) = state.anchor_line {
                self.lines[anchor].phrase_end_time = token.trigger_end;
            }
            state.phrase_buffer = 0;
            state.is_mid_phrase = false;
            state.line_is_one_phrase = false;
        } else {
            if state.prev_word_ends_phrase {
                state.quote_open_at_phrase_start = quote_before;
            }
            state.phrase_buffer += 1;
        }
        state.prev_word_ends_phrase = closes_phrase;
        state.prev_word_ends_sentence = ends_sentence;

        trace!(
            token = token.index,
            line = line_idx,
            remaining = state.remaining_width,
            closes_phrase,
            ends_sentence,
            "Placed token"
        );
        self.lines[line_idx].tokens.push(token);
    }

    /// Open a new line for `token` and return the tokens to replay on it, in order.
    fn break_line(&mut self, token: Token) -> Vec<Token> {
        let starts_sentence = self.state.prev_word_ends_sentence;
        let mut replay = Vec::new();

        if let Some(line_idx) = self.lines.len().checked_sub(1) {
            let state = &mut self.state;
            if state.line_is_one_phrase && state.phrase_buffer > 0 {
                // The open phrase fills the whole line; it cannot move anywhere
                // better, so it continues on the next line.
                debug!(
                    token = token.index,
                    line = line_idx,
                    phrase_len = state.phrase_buffer,
                    "Phrase wider than a line; continuing mid-phrase"
                );
                state.is_mid_phrase = true;
                state.phrase_buffer = 0;
            } else if state.phrase_buffer > 0 {
                let line = &mut self.lines[line_idx];
                let split_at = line.tokens.len() - state.phrase_buffer;
                replay = line.tokens.split_off(split_at);
                let cut = replay[0].audio_start;
                line.end_time = cut;
                if let Some(anchor) = state.anchor_line {
                    self.lines[anchor].phrase_end_time = cut;
                }
                debug!(
                    token = token.index,
                    from_line = line_idx,
                    moved = replay.len(),
                    "Relocating open phrase to a new line"
                );
                state.quote_open = state.quote_open_at_phrase_start;
                state.prev_word_ends_phrase = true;
                state.phrase_buffer = 0;
            }
        }

        self.open_line(starts_sentence);
        replay.push(token);
        replay
    }

    fn open_line(&mut self, starts_sentence: bool) {
        if starts_sentence || self.sentences.is_empty() {
            self.sentences.push(Sentence::starting_at(self.lines.len()));
        }
        let sentence_index = self.sentences.len() - 1;
        self.lines.push(Line::new(sentence_index));
        if let Some(sentence) = self.sentences.last_mut() {
            sentence.line_count += 1;
        }
        self.state.remaining_width = self.max_width;
        self.state.prev_word_ends_sentence = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAP: f32 = 10.0;

    /// Tokens spaced a quarter second apart with the given widths.
    fn tokens(words: &[(&str, f32)]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(idx, (text, width))| {
                let start = idx as f64 * 0.25;
                Token::new(idx, *text, start, start + 0.25, *width, &[])
            })
            .collect()
    }

    fn pack(max_width: f32, words: &[(&str, f32)]) -> PageLayout {
        let mut packer = LinePacker::new(max_width, GAP);
        packer.add_tokens(tokens(words));
        packer.finish()
    }

    fn texts(layout: &PageLayout) -> Vec<String> {
        layout.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn the_toad_jumped_wraps_after_toad() {
        let mut words = vec![
            Token::new(0, "The", 0.0, 0.3, 40.0, &[]),
            Token::new(1, "toad", 0.3, 0.6, 50.0, &[]),
            Token::new(2, "jumped.", 0.6, 1.0, 70.0, &[]),
        ];
        words[2].clamp_trigger_end(0.0);
        let mut packer = LinePacker::new(100.0, GAP);
        packer.add_tokens(words);
        let layout = packer.finish();

        assert_eq!(texts(&layout), vec!["The toad", "jumped."]);
        let first = layout.line(0).expect("first line");
        let second = layout.line(1).expect("second line");
        assert_eq!((first.start_time, first.end_time), (0.0, 0.6));
        assert_eq!((second.start_time, second.end_time), (0.6, 1.0));
        assert!(first.swipeable);
        assert!(!second.swipeable, "second line continues the phrase");
        assert_eq!(first.swipe_interval(), (0.0, 1.0));
        assert_eq!(layout.sentence_count(), 1);
        assert!(first.tokens[0].is_first_in_line);
        assert!(second.tokens[0].is_first_in_line);
        assert!(!first.tokens[1].is_first_in_line);
    }

    #[test]
    fn exact_fit_counts_as_fitting() {
        let layout = pack(100.0, &[("aa", 45.0), ("bb", 45.0)]);
        assert_eq!(texts(&layout), vec!["aa bb"]);
    }

    #[test]
    fn open_phrase_moves_to_next_line_instead_of_splitting() {
        let layout = pack(
            100.0,
            &[("Hi,", 30.0), ("green", 30.0), ("frog", 40.0)],
        );
        assert_eq!(texts(&layout), vec!["Hi,", "green frog"]);

        let first = layout.line(0).expect("first line");
        assert_eq!(first.end_time, 0.25, "cut at the relocated phrase start");
        let second = layout.line(1).expect("second line");
        assert!(second.tokens[0].is_first_in_line);
        assert_eq!(second.start_time, 0.25);
    }

    #[test]
    fn sentence_end_forces_new_line_and_sentence() {
        let layout = pack(1000.0, &[("Hop.", 40.0), ("Skip!", 40.0), ("Jump", 40.0)]);
        assert_eq!(texts(&layout), vec!["Hop.", "Skip!", "Jump"]);
        assert_eq!(layout.sentence_count(), 3);
        for (idx, line) in layout.lines().iter().enumerate() {
            assert_eq!(line.sentence_index, idx);
            assert_eq!(line.index_in_sentence, 0);
            assert!(line.swipeable);
        }
    }

    #[test]
    fn quoted_sentence_breaks_after_closing_quote() {
        let layout = pack(
            1000.0,
            &[("“Run!", 40.0), ("Go!”", 40.0), ("said", 40.0), ("Toad.", 40.0)],
        );
        assert_eq!(texts(&layout), vec!["“Run! Go!”", "said Toad."]);
    }

    #[test]
    fn over_wide_word_sits_alone() {
        let layout = pack(100.0, &[("a.", 20.0), ("enormous", 250.0), ("b", 20.0)]);
        assert_eq!(texts(&layout), vec!["a.", "enormous", "b"]);
        assert_eq!(layout.sentence_count(), 2);
        let wide = layout.line(1).expect("wide line");
        assert_eq!(wide.tokens.len(), 1);
        assert!(wide.swipeable);
        assert!(!layout.line(2).expect("tail").swipeable);
    }

    #[test]
    fn long_phrase_splits_only_when_it_fills_a_line() {
        let words: Vec<(&str, f32)> = vec![
            ("one", 40.0),
            ("two", 40.0),
            ("three", 40.0),
            ("four", 40.0),
            ("five.", 40.0),
        ];
        let layout = pack(100.0, &words);
        assert_eq!(texts(&layout), vec!["one two", "three four", "five."]);
        assert!(layout.line(0).expect("line").swipeable);
        assert!(!layout.line(1).expect("line").swipeable);
        assert!(!layout.line(2).expect("line").swipeable);
        assert_eq!(layout.line(0).expect("line").swipe_interval().1, 1.25);
    }

    #[test]
    fn multi_line_sentence_keeps_only_leading_line_swipeable() {
        let layout = pack(
            100.0,
            &[("Frogs,", 60.0), ("toads,", 60.0), ("newts.", 60.0), ("Yes.", 30.0)],
        );
        assert_eq!(texts(&layout), vec!["Frogs,", "toads,", "newts.", "Yes."]);
        assert_eq!(layout.sentence_count(), 2);
        let sentence = layout.sentence(0).expect("sentence");
        assert_eq!(sentence.line_count, 3);
        assert_eq!(sentence.start_time, 0.0);
        assert_eq!(sentence.end_time, 0.75);
        let swipeable: Vec<bool> = layout.lines().iter().map(|line| line.swipeable).collect();
        assert_eq!(swipeable, vec![true, false, false, true]);
        assert_eq!(layout.line(2).expect("line").index_in_sentence, 2);
    }

    #[test]
    fn abbreviation_does_not_break_sentence() {
        let abbreviations = vec!["Mr.".to_string()];
        let mut packer = LinePacker::new(1000.0, GAP);
        packer.add_token(Token::new(0, "Mr.", 0.0, 0.2, 30.0, &abbreviations));
        packer.add_token(Token::new(1, "Toad.", 0.2, 0.5, 50.0, &abbreviations));
        let layout = packer.finish();
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.sentence_count(), 1);
    }

    #[test]
    fn reset_starts_a_clean_page() {
        let mut packer = LinePacker::new(100.0, GAP);
        packer.add_tokens(tokens(&[("One.", 40.0), ("Two.", 40.0)]));
        assert_eq!(packer.line_count(), 2);
        packer.reset(200.0);
        packer.add_tokens(tokens(&[("Three", 40.0)]));
        let layout = packer.finish();
        assert_eq!(texts(&layout), vec!["Three"]);
        assert_eq!(layout.max_width(), 200.0);
    }

    #[test]
    fn empty_page_has_no_lines() {
        let layout = LinePacker::new(100.0, GAP).finish();
        assert_eq!(layout.line_count(), 0);
        assert_eq!(layout.sentence_count(), 0);
    }

    /// Small deterministic generator so the sweep needs no extra crates.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    #[test]
    fn random_pages_terminate_and_respect_layout_properties() {
        let suffixes = ["", "", "", ",", ".", "!", "”", "\""];
        let max_width = 200.0;
        for seed in 0..300u64 {
            let mut rng = Lcg(seed);
            let count = 1 + rng.below(40) as usize;
            let mut words = Vec::with_capacity(count);
            for idx in 0..count {
                let suffix = suffixes[rng.below(suffixes.len() as u64) as usize];
                let text = format!("w{idx}{suffix}");
                // Occasionally wider than the whole line.
                let width = if rng.below(20) == 0 {
                    250.0
                } else {
                    10.0 + rng.below(90) as f32
                };
                let start = idx as f64 * 0.25;
                words.push(Token::new(idx, text, start, start + 0.25, width, &[]));
            }

            let mut packer = LinePacker::new(max_width, GAP);
            packer.add_tokens(words.clone());
            let layout = packer.finish();

            // Every token lands exactly once, in reading order.
            let placed: Vec<usize> = layout.tokens().map(|token| token.index).collect();
            assert_eq!(placed, (0..count).collect::<Vec<_>>(), "seed {seed}");

            for line in layout.lines() {
                assert!(!line.tokens.is_empty(), "seed {seed}");
                assert!(line.start_time <= line.end_time, "seed {seed}");
                assert!(line.tokens[0].is_first_in_line, "seed {seed}");
                if line.tokens.len() > 1 {
                    assert!(line.width(GAP) <= max_width + 1e-3, "seed {seed}");
                }
            }

            // A line may only start mid-phrase when the phrase could not fit
            // on the line above on its own.
            for pair in layout.lines().windows(2) {
                let above = &pair[0];
                let above_closed = above
                    .tokens
                    .last()
                    .is_some_and(|token| token.ends_phrase || token.terminal);
                if !above_closed {
                    let phrase_start = above
                        .tokens
                        .iter()
                        .rposition(|token| token.ends_phrase || token.terminal)
                        .map(|pos| pos + 1)
                        .unwrap_or(0);
                    assert_eq!(
                        phrase_start, 0,
                        "seed {seed}: split phrase did not fill its line"
                    );
                }
            }

            for sentence in layout.sentences() {
                let lines = &layout.lines()[sentence.line_indices()];
                assert_eq!(sentence.start_time, lines[0].start_time);
                assert_eq!(sentence.end_time, lines[lines.len() - 1].end_time);
            }
        }
    }
}
