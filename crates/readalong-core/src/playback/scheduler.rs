//! Time-keyed triggers fired as the audio clock moves.
//!
//! Each `tick` reads the clock once and returns every event whose key lies
//! between the previous tick and now. Keys are whole milliseconds in a
//! `BTreeMap`, so a tick is one range query.

use super::clock::AudioClock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use tracing::{debug, info, warn};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

#[derive(Debug, Clone)]
struct Trigger<E> {
    disallow_past_stop: bool,
    event: E,
}

fn key_of(time: f64) -> i64 {
    (time * 1000.0).round() as i64
}

pub struct TriggerScheduler<C, E> {
    clock: C,
    triggers: BTreeMap<i64, Vec<Trigger<E>>>,
    state: PlaybackState,
    interval_start: f64,
    stop_time: f64,
    /// `None` until the first tick after play, so that tick includes its lower bound.
    last_time: Option<f64>,
}

impl<C: AudioClock, E: Clone> TriggerScheduler<C, E> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            triggers: BTreeMap::new(),
            state: PlaybackState::Stopped,
            interval_start: 0.0,
            stop_time: f64::INFINITY,
            last_time: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Add an event at `key_time`. Events sharing a key fire together in
    /// registration order. With `disallow_past_stop`, the event is skipped
    /// when the tick that reaches it has already run past the stop time.
    pub fn register(&mut self, key_time: f64, event: E, disallow_past_stop: bool) {
        if !key_time.is_finite() {
            warn!(key_time, "Ignoring trigger with non-finite time");
            return;
        }
        self.triggers
            .entry(key_of(key_time))
            .or_default()
            .push(Trigger {
                disallow_past_stop,
                event,
            });
    }

    pub fn play(&mut self) {
        self.play_interval(0.0, f64::INFINITY);
    }

    /// Play from `start` and stop once the clock passes `end`.
    pub fn play_interval(&mut self, start: f64, end: f64) {
        let start = start.max(0.0);
        info!(start, end, "Starting playback");
        self.clock.seek(start);
        self.clock.play();
        self.interval_start = start;
        self.stop_time = end;
        self.last_time = None;
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            debug!(at = self.clock.current_time(), "Pausing playback");
            self.clock.pause();
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            debug!(at = self.clock.current_time(), "Resuming playback");
            self.clock.play();
            self.state = PlaybackState::Playing;
        }
    }

    /// Halt playback and rewind. Registered triggers are kept.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Stopped {
            info!(at = self.clock.current_time(), "Stopping playback");
        }
        self.clock.pause();
        self.clock.seek(0.0);
        self.interval_start = 0.0;
        self.stop_time = f64::INFINITY;
        self.last_time = None;
        self.state = PlaybackState::Stopped;
    }

    /// Drop every trigger and stop.
    pub fn clear(&mut self) {
        self.triggers.clear();
        self.stop();
    }

    /// Fire everything between the previous tick and the clock's current time.
    pub fn tick(&mut self) -> Vec<E> {
        if self.state != PlaybackState::Playing {
            return Vec::new();
        }
        let current = self.clock.current_time();
        let fired = self.collect_window(current);

        if current > self.stop_time {
            debug!(current, stop_time = self.stop_time, "Passed stop time");
            self.stop();
            return fired;
        }
        self.last_time = Some(current);
        if !self.clock.is_playing() {
            debug!(current, "Clock finished");
            self.stop();
        }
        fired
    }

    fn collect_window(&self, current: f64) -> Vec<E> {
        let start_key = key_of(self.interval_start);
        let current_key = key_of(current);
        let (lower, lower_key) = match self.last_time {
            Some(last) if key_of(last) >= start_key => {
                (Bound::Excluded(key_of(last)), key_of(last))
            }
            _ => (Bound::Included(start_key), start_key),
        };
        let wrapped = self.last_time.is_some_and(|last| current < last);
        let upper = if wrapped {
            Bound::Unbounded
        } else if current_key < lower_key {
            return Vec::new();
        } else {
            Bound::Included(current_key)
        };

        let gate_open = current <= self.stop_time;
        self.triggers
            .range((lower, upper))
            .flat_map(|(_, entries)| entries.iter())
            .filter(|trigger| gate_open || !trigger.disallow_past_stop)
            .map(|trigger| trigger.event.clone())
            .collect()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn interval_start(&self) -> f64 {
        self.interval_start
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Distinct trigger times.
    pub fn key_count(&self) -> usize {
        self.triggers.len()
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.values().map(Vec::len).sum()
    }
}

impl<C: fmt::Debug, E> fmt::Debug for TriggerScheduler<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerScheduler")
            .field("clock", &self.clock)
            .field("keys", &self.triggers.len())
            .field("state", &self.state)
            .field("interval_start", &self.interval_start)
            .field("stop_time", &self.stop_time)
            .field("last_time", &self.last_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualClock;

    fn scheduler() -> TriggerScheduler<ManualClock, &'static str> {
        TriggerScheduler::new(ManualClock::new())
    }

    fn advance_and_tick(
        scheduler: &mut TriggerScheduler<ManualClock, &'static str>,
        dt: f64,
    ) -> Vec<&'static str> {
        scheduler.clock_mut().advance(dt);
        scheduler.tick()
    }

    #[test]
    fn stop_gate_suppresses_late_triggers() {
        let mut scheduler = scheduler();
        scheduler.register(1.0, "A", false);
        scheduler.register(2.0, "B", true);
        scheduler.play_interval(0.0, 1.5);

        assert!(advance_and_tick(&mut scheduler, 0.5).is_empty());
        assert_eq!(advance_and_tick(&mut scheduler, 0.7), vec!["A"]);
        assert!(advance_and_tick(&mut scheduler, 0.4).is_empty());
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.stop_time(), f64::INFINITY);

        // Stopped: the clock no longer reaches B.
        assert!(advance_and_tick(&mut scheduler, 1.0).is_empty());
    }

    #[test]
    fn ungated_trigger_still_fires_on_the_stopping_tick() {
        let mut scheduler = scheduler();
        scheduler.register(2.0, "end", false);
        scheduler.register(2.0, "start", true);
        scheduler.play_interval(0.0, 1.6);
        assert_eq!(advance_and_tick(&mut scheduler, 2.5), vec!["end"]);
        assert_eq!(scheduler.state(), PlaybackState::Stopped);
    }

    #[test]
    fn triggers_fire_once_in_time_then_registration_order() {
        let mut scheduler = scheduler();
        scheduler.register(0.5, "b", false);
        scheduler.register(0.25, "a", false);
        scheduler.register(0.5, "c", false);
        assert_eq!(scheduler.key_count(), 2);
        assert_eq!(scheduler.trigger_count(), 3);

        scheduler.play();
        assert_eq!(advance_and_tick(&mut scheduler, 0.3), vec!["a"]);
        assert_eq!(advance_and_tick(&mut scheduler, 0.2), vec!["b", "c"]);
        assert!(advance_and_tick(&mut scheduler, 0.5).is_empty());
        assert!(scheduler.tick().is_empty());
    }

    #[test]
    fn trigger_at_interval_start_fires_on_first_tick() {
        let mut scheduler = scheduler();
        scheduler.register(0.0, "page-start", false);
        scheduler.register(1.0, "line-start", true);

        scheduler.play();
        assert_eq!(scheduler.tick(), vec!["page-start"]);

        scheduler.play_interval(1.0, 2.0);
        assert_eq!(scheduler.tick(), vec!["line-start"]);
        assert!(scheduler.tick().is_empty());
    }

    #[test]
    fn interval_playback_skips_triggers_before_start() {
        let mut scheduler = scheduler();
        scheduler.register(0.5, "before", false);
        scheduler.register(1.5, "inside", false);
        scheduler.play_interval(1.0, 2.0);
        assert_eq!(advance_and_tick(&mut scheduler, 0.75), vec!["inside"]);
    }

    #[test]
    fn clock_wrap_fires_remaining_tail() {
        let mut scheduler = scheduler();
        scheduler.register(0.5, "early", false);
        scheduler.register(3.0, "late", false);
        scheduler.play();
        assert_eq!(advance_and_tick(&mut scheduler, 1.0), vec!["early"]);

        scheduler.clock_mut().set_time(0.2);
        assert_eq!(scheduler.tick(), vec!["late"]);
    }

    #[test]
    fn paused_scheduler_holds_until_resumed() {
        let mut scheduler = scheduler();
        scheduler.register(0.75, "x", false);
        scheduler.play();
        assert!(advance_and_tick(&mut scheduler, 0.5).is_empty());

        scheduler.pause();
        assert_eq!(scheduler.state(), PlaybackState::Paused);
        assert!(advance_and_tick(&mut scheduler, 1.0).is_empty());
        assert_eq!(scheduler.current_time(), 0.5);

        scheduler.resume();
        assert_eq!(advance_and_tick(&mut scheduler, 0.5), vec!["x"]);
    }

    #[test]
    fn clip_end_fires_last_window_then_stops() {
        let mut scheduler = TriggerScheduler::new(ManualClock::with_clip_length(1.0));
        scheduler.register(1.0, "last", false);
        scheduler.play();
        scheduler.clock_mut().advance(3.0);
        assert_eq!(scheduler.tick(), vec!["last"]);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn clear_drops_triggers_and_stops() {
        let mut scheduler = scheduler();
        scheduler.register(0.1, "x", false);
        scheduler.play();
        scheduler.clear();
        assert_eq!(scheduler.key_count(), 0);
        assert_eq!(scheduler.trigger_count(), 0);
        assert_eq!(scheduler.state(), PlaybackState::Stopped);
        assert_eq!(scheduler.current_time(), 0.0);
    }

    #[test]
    fn non_finite_keys_are_ignored() {
        let mut scheduler = scheduler();
        scheduler.register(f64::NAN, "nan", false);
        scheduler.register(f64::INFINITY, "inf", false);
        assert_eq!(scheduler.trigger_count(), 0);
    }
}
