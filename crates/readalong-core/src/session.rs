//! One page of read-along playback: layout, triggers, swipes, and observers.

use crate::config::{EngineConfig, SwipeScope};
use crate::gesture::{LineBounds, Point, SwipeRecognizer};
use crate::layout::{LinePacker, PageLayout};
use crate::measure::TextMeasurer;
use crate::page::{InputWarning, PageSource, WordTiming, build_tokens};
use crate::playback::{AudioClock, PlaybackState, TriggerScheduler};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum HighlightKind {
    Start,
    End,
}

/// A word's highlight turning on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HighlightEvent {
    pub kind: HighlightKind,
    pub token_index: usize,
    pub line_index: usize,
}

/// Receives highlight events in the order they fire.
pub trait HighlightObserver {
    fn on_highlight_start(&mut self, event: &HighlightEvent);
    fn on_highlight_end(&mut self, event: &HighlightEvent);
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct LineView {
    pub index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub sentence_index: usize,
    pub index_in_sentence: usize,
    pub swipeable: bool,
    /// Where a swipe on this line stops playing, past any wrapped phrase.
    pub swipe_end: f64,
    pub first_token: Option<usize>,
    pub token_count: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SentenceView {
    pub index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub first_line: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PageSnapshot {
    pub page_number: usize,
    pub lines: Vec<LineView>,
    pub sentences: Vec<SentenceView>,
    pub playback: PlaybackState,
    pub current_time: f64,
    pub active_token: Option<usize>,
    pub active_line: Option<usize>,
    pub key_count: usize,
    pub trigger_count: usize,
    pub warnings: Vec<String>,
}

/// Result of offering a press/release pair to a line.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[ts(export)]
pub enum SwipeOutcome {
    Played { line: usize, start: f64, end: f64 },
    /// Swipes are ignored while audio is playing.
    Busy,
    NotSwipeable,
    NoSuchLine,
    Rejected { reason: String },
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    GetSnapshot,
    PlayPage,
    PlayLine {
        line: usize,
    },
    PlaySentence {
        sentence: usize,
    },
    Pause,
    Resume,
    TogglePlayPause,
    Stop,
    Swipe {
        line: usize,
        down: Point,
        up: Point,
        bounds: LineBounds,
    },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "readalong_get_snapshot",
            Self::PlayPage => "readalong_play_page",
            Self::PlayLine { .. } => "readalong_play_line",
            Self::PlaySentence { .. } => "readalong_play_sentence",
            Self::Pause => "readalong_pause",
            Self::Resume => "readalong_resume",
            Self::TogglePlayPause => "readalong_toggle_play_pause",
            Self::Stop => "readalong_stop",
            Self::Swipe { .. } => "readalong_swipe",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub swipe: Option<SwipeOutcome>,
    pub snapshot: PageSnapshot,
}

pub struct PageSession<C> {
    config: EngineConfig,
    recognizer: SwipeRecognizer,
    scheduler: TriggerScheduler<C, HighlightEvent>,
    layout: PageLayout,
    observers: Vec<Box<dyn HighlightObserver>>,
    warnings: Vec<InputWarning>,
    active_token: Option<usize>,
    active_line: Option<usize>,
    /// Tokens whose start fired during the current run; an end only fires for these.
    highlighted: BTreeSet<usize>,
    page_number: usize,
}

impl<C: AudioClock> PageSession<C> {
    pub fn new(config: EngineConfig, clock: C) -> Self {
        Self {
            recognizer: SwipeRecognizer::from_config(&config),
            config,
            scheduler: TriggerScheduler::new(clock),
            layout: PageLayout::default(),
            observers: Vec::new(),
            warnings: Vec::new(),
            active_token: None,
            active_line: None,
            highlighted: BTreeSet::new(),
            page_number: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn scheduler(&self) -> &TriggerScheduler<C, HighlightEvent> {
        &self.scheduler
    }

    pub fn clock_mut(&mut self) -> &mut C {
        self.scheduler.clock_mut()
    }

    pub fn warnings(&self) -> &[InputWarning] {
        &self.warnings
    }

    /// Observers are notified in the order they were added.
    pub fn add_observer(&mut self, observer: Box<dyn HighlightObserver>) {
        self.observers.push(observer);
    }

    /// Replace the current page. Triggers from the previous page are dropped
    /// before anything new is registered.
    pub fn load_page(
        &mut self,
        source: &PageSource,
        measurer: &dyn TextMeasurer,
    ) -> Vec<InputWarning> {
        self.scheduler.clear();
        self.reset_highlights();

        let (tokens, warnings) = build_tokens(source, measurer, &self.config);
        let mut packer = LinePacker::new(source.max_line_width, self.config.word_gap);
        packer.add_tokens(tokens);
        self.layout = packer.finish();

        for (line_index, line) in self.layout.lines().iter().enumerate() {
            for token in &line.tokens {
                let start = HighlightEvent {
                    kind: HighlightKind::Start,
                    token_index: token.index,
                    line_index,
                };
                let end = HighlightEvent {
                    kind: HighlightKind::End,
                    ..start
                };
                self.scheduler.register(token.audio_start, start, true);
                self.scheduler.register(token.trigger_end, end, false);
            }
        }

        self.page_number += 1;
        info!(
            page = self.page_number,
            words = self.layout.token_count(),
            lines = self.layout.line_count(),
            sentences = self.layout.sentence_count(),
            warnings = warnings.len(),
            "Loaded page"
        );
        self.warnings = warnings.clone();
        warnings
    }

    /// Advance one frame and notify observers of everything that fired.
    ///
    /// An end whose start did not fire in the same run is dropped, so an
    /// interval that opens on a shared boundary does not end the word before it.
    pub fn tick(&mut self) -> Vec<HighlightEvent> {
        let mut fired = self.scheduler.tick();
        fired.retain(|event| match event.kind {
            HighlightKind::Start => {
                self.highlighted.insert(event.token_index);
                true
            }
            HighlightKind::End => self.highlighted.remove(&event.token_index),
        });
        for event in &fired {
            match event.kind {
                HighlightKind::Start => {
                    self.active_token = Some(event.token_index);
                    self.active_line = Some(event.line_index);
                }
                HighlightKind::End => {
                    if self.active_token == Some(event.token_index) {
                        self.active_token = None;
                    }
                }
            }
            for observer in &mut self.observers {
                match event.kind {
                    HighlightKind::Start => observer.on_highlight_start(event),
                    HighlightKind::End => observer.on_highlight_end(event),
                }
            }
        }
        fired
    }

    pub fn play_page(&mut self) -> bool {
        if self.layout.is_empty() {
            return false;
        }
        self.reset_highlights();
        self.scheduler.play();
        true
    }

    pub fn play_line(&mut self, line: usize) -> bool {
        let Some(found) = self.layout.line(line) else {
            return false;
        };
        let (start, end) = (found.start_time, found.end_time);
        self.play_interval(start, end);
        true
    }

    pub fn play_sentence(&mut self, sentence: usize) -> bool {
        let Some(found) = self.layout.sentence(sentence) else {
            return false;
        };
        let (start, end) = (found.start_time, found.end_time);
        self.play_interval(start, end);
        true
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    pub fn toggle_play_pause(&mut self) {
        match self.scheduler.state() {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {
                self.play_page();
            }
        }
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.reset_highlights();
    }

    fn play_interval(&mut self, start: f64, end: f64) {
        self.reset_highlights();
        self.scheduler.play_interval(start, end);
    }

    fn reset_highlights(&mut self) {
        self.highlighted.clear();
        self.active_token = None;
        self.active_line = None;
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Play the swiped line (or its sentence) if the gesture qualifies.
    pub fn handle_swipe(
        &mut self,
        line: usize,
        down: Point,
        up: Point,
        bounds: &LineBounds,
    ) -> SwipeOutcome {
        if self.is_playing() {
            return SwipeOutcome::Busy;
        }
        let Some(target) = self.layout.line(line) else {
            return SwipeOutcome::NoSuchLine;
        };
        if !target.swipeable {
            debug!(line, "Swipe on a non-swipeable line");
            return SwipeOutcome::NotSwipeable;
        }
        if let Err(reason) = self.recognizer.recognize(down, up, bounds) {
            debug!(line, %reason, "Swipe rejected");
            return SwipeOutcome::Rejected {
                reason: reason.to_string(),
            };
        }
        let Some((start, end)) = self.layout.swipe_interval(line, self.config.swipe_scope) else {
            return SwipeOutcome::NoSuchLine;
        };
        info!(line, start, end, scope = %self.config.swipe_scope, "Swipe accepted");
        self.play_interval(start, end);
        SwipeOutcome::Played { line, start, end }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let lines = self
            .layout
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| LineView {
                index,
                text: line.text(),
                start_time: line.start_time,
                end_time: line.end_time,
                sentence_index: line.sentence_index,
                index_in_sentence: line.index_in_sentence,
                swipeable: line.swipeable,
                swipe_end: line.swipe_interval().1,
                first_token: line.first_token_index(),
                token_count: line.tokens.len(),
            })
            .collect();
        let sentences = self
            .layout
            .sentences()
            .iter()
            .enumerate()
            .map(|(index, sentence)| SentenceView {
                index,
                text: self.layout.sentence_text(index).unwrap_or_default(),
                start_time: sentence.start_time,
                end_time: sentence.end_time,
                first_line: sentence.first_line,
                line_count: sentence.line_count,
            })
            .collect();
        PageSnapshot {
            page_number: self.page_number,
            lines,
            sentences,
            playback: self.scheduler.state(),
            current_time: self.scheduler.current_time(),
            active_token: self.active_token,
            active_line: self.active_line,
            key_count: self.scheduler.key_count(),
            trigger_count: self.scheduler.trigger_count(),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        let mut swipe = None;
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::PlayPage => {
                self.play_page();
            }
            SessionCommand::PlayLine { line } => {
                self.play_line(line);
            }
            SessionCommand::PlaySentence { sentence } => {
                self.play_sentence(sentence);
            }
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(),
            SessionCommand::TogglePlayPause => self.toggle_play_pause(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Swipe {
                line,
                down,
                up,
                bounds,
            } => swipe = Some(self.handle_swipe(line, down, up, &bounds)),
        }
        SessionEvent {
            action,
            swipe,
            snapshot: self.snapshot(),
        }
    }
}

/// Write TypeScript definitions for every type the presentation layer sees.
/// Stale `.ts` files in `out_dir` are removed first.
pub fn export_ts_bindings(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    for entry in
        fs::read_dir(out_dir).with_context(|| format!("Failed to list {}", out_dir.display()))?
    {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    PageSnapshot::export_all_to(out_dir).context("Failed to export PageSnapshot")?;
    HighlightEvent::export_all_to(out_dir).context("Failed to export HighlightEvent")?;
    SwipeOutcome::export_all_to(out_dir).context("Failed to export SwipeOutcome")?;
    Point::export_all_to(out_dir).context("Failed to export Point")?;
    LineBounds::export_all_to(out_dir).context("Failed to export LineBounds")?;
    WordTiming::export_all_to(out_dir).context("Failed to export WordTiming")?;
    SwipeScope::export_all_to(out_dir).context("Failed to export SwipeScope")?;
    Ok(())
}
