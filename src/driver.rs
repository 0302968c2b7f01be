//! Frame loop that plays a story script page by page.

use crate::cancellation::CancellationToken;
use crate::script::StoryScript;
use anyhow::{Context, Result};
use readalong_core::config::EngineConfig;
use readalong_core::gesture::{LineBounds, Point};
use readalong_core::measure::MonospaceMeasurer;
use readalong_core::playback::{AudioClock, ManualClock, WallClock};
use readalong_core::session::{HighlightEvent, HighlightObserver, PageSession, SwipeOutcome};
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    /// Sleep between frames instead of stepping a simulated clock.
    pub realtime: bool,
    /// Start each page with a synthetic swipe over this line instead of full playback.
    pub swipe_line: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoryReport {
    pub pages_played: usize,
    pub highlights_fired: usize,
    pub warnings: usize,
    pub cancelled: bool,
}

/// Clock the frame loop can drive.
pub trait FrameClock: AudioClock {
    fn set_clip_length(&mut self, length: Option<f64>);
    fn wait_frame(&mut self, dt: f64);
}

impl FrameClock for ManualClock {
    fn set_clip_length(&mut self, length: Option<f64>) {
        ManualClock::set_clip_length(self, length);
    }

    fn wait_frame(&mut self, dt: f64) {
        self.advance(dt);
    }
}

impl FrameClock for WallClock {
    fn set_clip_length(&mut self, length: Option<f64>) {
        WallClock::set_clip_length(self, length);
    }

    fn wait_frame(&mut self, dt: f64) {
        thread::sleep(Duration::from_secs_f64(dt));
    }
}

struct LogObserver;

impl HighlightObserver for LogObserver {
    fn on_highlight_start(&mut self, event: &HighlightEvent) {
        debug!(token = event.token_index, line = event.line_index, "Highlight on");
    }

    fn on_highlight_end(&mut self, event: &HighlightEvent) {
        debug!(token = event.token_index, line = event.line_index, "Highlight off");
    }
}

/// Box of line `idx` on a page whose first line's top edge sits at y = 0.
fn line_bounds(idx: usize, line_height: f32) -> LineBounds {
    let top_y = -(idx as f32) * line_height;
    LineBounds::new(0.0, top_y, top_y - line_height)
}

pub fn run_story(
    script: &StoryScript,
    config: &EngineConfig,
    options: &DriverOptions,
    cancel: &CancellationToken,
) -> Result<StoryReport> {
    if options.realtime {
        let session = PageSession::new(config.clone(), WallClock::new(None));
        play_story(session, script, options, cancel)
    } else {
        let session = PageSession::new(config.clone(), ManualClock::new());
        play_story(session, script, options, cancel)
    }
}

fn play_story<C: FrameClock>(
    mut session: PageSession<C>,
    script: &StoryScript,
    options: &DriverOptions,
    cancel: &CancellationToken,
) -> Result<StoryReport> {
    session.add_observer(Box::new(LogObserver));
    let measurer = MonospaceMeasurer::new(session.config().glyph_advance);
    let dt = session.config().tick_interval_secs();
    let mut report = StoryReport::default();

    for (page_idx, page) in script.pages.iter().enumerate() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        let duration = page.duration();
        session.clock_mut().set_clip_length(Some(duration));
        let warnings = session.load_page(page, &measurer);
        for warning in &warnings {
            warn!(page = page_idx, "{warning}");
        }
        report.warnings += warnings.len();

        if !start_page(&mut session, page_idx, options) {
            continue;
        }

        // Generous bound so a clock that never reports the clip end cannot spin forever.
        let max_frames = ((duration / dt).ceil() as usize + 1) * 2 + 16;
        let mut frames = 0;
        while session.is_playing() {
            if cancel.is_cancelled() {
                info!(page = page_idx, "Playback cancelled");
                session.stop();
                report.cancelled = true;
                break;
            }
            if frames >= max_frames {
                warn!(page = page_idx, frames, "Clock did not finish; stopping page");
                session.stop();
                break;
            }
            report.highlights_fired += session.tick().len();
            session.clock_mut().wait_frame(dt);
            frames += 1;
        }
        // Drain the final window reached by the last frame.
        report.highlights_fired += session.tick().len();

        let snapshot = session.snapshot();
        debug!(
            page = page_idx,
            snapshot = %serde_json::to_string(&snapshot).context("Failed to encode snapshot")?,
            "Page finished"
        );
        report.pages_played += 1;
        if report.cancelled {
            break;
        }
    }

    info!(
        pages = report.pages_played,
        highlights = report.highlights_fired,
        warnings = report.warnings,
        cancelled = report.cancelled,
        "Story finished"
    );
    Ok(report)
}

fn start_page<C: FrameClock>(
    session: &mut PageSession<C>,
    page_idx: usize,
    options: &DriverOptions,
) -> bool {
    let Some(line) = options.swipe_line else {
        return session.play_page();
    };
    let config = session.config();
    let bounds = line_bounds(line, config.line_height);
    let mid_y = bounds.bottom_y + config.line_height / 2.0;
    let reach = session
        .layout()
        .max_width()
        .clamp(config.min_swipe_length, config.max_swipe_length);
    let down = Point::new(bounds.left_x + 10.0, mid_y);
    let up = Point::new(down.x + reach, mid_y);
    match session.handle_swipe(line, down, up, &bounds) {
        SwipeOutcome::Played { start, end, .. } => {
            info!(page = page_idx, line, start, end, "Playing swiped line");
            true
        }
        other => {
            warn!(page = page_idx, line, outcome = ?other, "Swipe did not start playback");
            false
        }
    }
}
