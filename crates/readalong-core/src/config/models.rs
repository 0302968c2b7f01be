use serde::Deserialize;
use ts_rs::TS;

/// Engine configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct EngineConfig {
    /// Horizontal gap charged after every word placed on a line.
    #[serde(default = "crate::config::defaults::default_word_gap")]
    pub word_gap: f32,
    #[serde(default = "crate::config::defaults::default_glyph_advance")]
    pub glyph_advance: f32,
    #[serde(default = "crate::config::defaults::default_line_height")]
    pub line_height: f32,
    /// Words that end in a period without ending a sentence.
    #[serde(default = "crate::config::defaults::default_abbreviations")]
    pub abbreviations: Vec<String>,
    /// Seconds shaved off the final word's highlight so it does not hang past clip end.
    #[serde(default = "crate::config::defaults::default_last_token_trigger_clamp")]
    pub last_token_trigger_clamp: f64,
    #[serde(default = "crate::config::defaults::default_tick_hz")]
    pub tick_hz: f32,
    #[serde(default = "crate::config::defaults::default_swipe_scope")]
    pub swipe_scope: SwipeScope,
    #[serde(default = "crate::config::defaults::default_min_swipe_length")]
    pub min_swipe_length: f32,
    #[serde(default = "crate::config::defaults::default_max_swipe_length")]
    pub max_swipe_length: f32,
    #[serde(default = "crate::config::defaults::default_max_vertical_drift")]
    pub max_vertical_drift: f32,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            word_gap: crate::config::defaults::default_word_gap(),
            glyph_advance: crate::config::defaults::default_glyph_advance(),
            line_height: crate::config::defaults::default_line_height(),
            abbreviations: crate::config::defaults::default_abbreviations(),
            last_token_trigger_clamp: crate::config::defaults::default_last_token_trigger_clamp(),
            tick_hz: crate::config::defaults::default_tick_hz(),
            swipe_scope: crate::config::defaults::default_swipe_scope(),
            min_swipe_length: crate::config::defaults::default_min_swipe_length(),
            max_swipe_length: crate::config::defaults::default_max_swipe_length(),
            max_vertical_drift: crate::config::defaults::default_max_vertical_drift(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Frame length used by tick loops.
    pub fn tick_interval_secs(&self) -> f64 {
        1.0 / f64::from(self.tick_hz.max(1.0))
    }
}

/// What an accepted swipe plays back.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SwipeScope {
    /// The swiped line, extended through any phrase it carries onto the next lines.
    #[default]
    Line,
    /// The whole sentence led by the swiped line.
    Sentence,
}

impl std::fmt::Display for SwipeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SwipeScope::Line => "line",
            SwipeScope::Sentence => "sentence",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
