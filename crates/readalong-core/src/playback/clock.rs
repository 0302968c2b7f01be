use std::time::{Duration, Instant};

/// Playback position source the scheduler reads once per tick.
pub trait AudioClock {
    /// Seconds from the start of the clip.
    fn current_time(&self) -> f64;
    fn seek(&mut self, time: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// Clock advanced explicitly by the caller. Stops by itself at the end of
/// the clip when a length is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualClock {
    time: f64,
    playing: bool,
    clip_length: Option<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip_length(length: f64) -> Self {
        Self {
            clip_length: Some(length.max(0.0)),
            ..Self::default()
        }
    }

    pub fn clip_length(&self) -> Option<f64> {
        self.clip_length
    }

    pub fn set_clip_length(&mut self, length: Option<f64>) {
        self.clip_length = length.map(|len| len.max(0.0));
    }

    /// Move forward by `dt` seconds if playing.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.time += dt.max(0.0);
        if let Some(length) = self.clip_length {
            if self.time >= length {
                self.time = length;
                self.playing = false;
            }
        }
    }

    /// Jump to an absolute position regardless of play state.
    pub fn set_time(&mut self, time: f64) {
        self.time = time.max(0.0);
    }
}

impl AudioClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn seek(&mut self, time: f64) {
        self.set_time(time);
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Real-time clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct WallClock {
    offset: Duration,
    started: Option<Instant>,
    clip_length: Option<f64>,
}

impl WallClock {
    pub fn new(clip_length: Option<f64>) -> Self {
        Self {
            offset: Duration::ZERO,
            started: None,
            clip_length,
        }
    }

    pub fn set_clip_length(&mut self, length: Option<f64>) {
        self.clip_length = length.map(|len| len.max(0.0));
    }

    fn elapsed(&self) -> f64 {
        let running = self.started.map(|at| at.elapsed()).unwrap_or_default();
        (self.offset + running).as_secs_f64()
    }
}

impl AudioClock for WallClock {
    fn current_time(&self) -> f64 {
        let time = self.elapsed();
        match self.clip_length {
            Some(length) => time.min(length),
            None => time,
        }
    }

    fn seek(&mut self, time: f64) {
        self.offset = Duration::from_secs_f64(time.max(0.0));
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        if let Some(at) = self.started.take() {
            self.offset += at.elapsed();
        }
    }

    fn is_playing(&self) -> bool {
        self.started.is_some()
            && self
                .clip_length
                .is_none_or(|length| self.elapsed() < length)
    }
}
