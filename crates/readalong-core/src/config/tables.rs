use super::defaults;
use super::models::{EngineConfig, LogLevel, SwipeScope};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    gesture: GestureConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for EngineConfig {
    fn from(tables: ConfigTables) -> Self {
        EngineConfig {
            word_gap: tables.layout.word_gap,
            glyph_advance: tables.layout.glyph_advance,
            line_height: tables.layout.line_height,
            abbreviations: tables.layout.abbreviations,
            last_token_trigger_clamp: tables.playback.last_token_trigger_clamp,
            tick_hz: tables.playback.tick_hz,
            swipe_scope: tables.playback.swipe_scope,
            min_swipe_length: tables.gesture.min_swipe_length,
            max_swipe_length: tables.gesture.max_swipe_length,
            max_vertical_drift: tables.gesture.max_vertical_drift,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&EngineConfig> for ConfigTables {
    fn from(config: &EngineConfig) -> Self {
        ConfigTables {
            layout: LayoutConfig {
                word_gap: config.word_gap,
                glyph_advance: config.glyph_advance,
                line_height: config.line_height,
                abbreviations: config.abbreviations.clone(),
            },
            playback: PlaybackConfig {
                last_token_trigger_clamp: config.last_token_trigger_clamp,
                tick_hz: config.tick_hz,
                swipe_scope: config.swipe_scope,
            },
            gesture: GestureConfig {
                min_swipe_length: config.min_swipe_length,
                max_swipe_length: config.max_swipe_length,
                max_vertical_drift: config.max_vertical_drift,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LayoutConfig {
    #[serde(default = "defaults::default_word_gap")]
    word_gap: f32,
    #[serde(default = "defaults::default_glyph_advance")]
    glyph_advance: f32,
    #[serde(default = "defaults::default_line_height")]
    line_height: f32,
    #[serde(default = "defaults::default_abbreviations")]
    abbreviations: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            word_gap: defaults::default_word_gap(),
            glyph_advance: defaults::default_glyph_advance(),
            line_height: defaults::default_line_height(),
            abbreviations: defaults::default_abbreviations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PlaybackConfig {
    #[serde(default = "defaults::default_last_token_trigger_clamp")]
    last_token_trigger_clamp: f64,
    #[serde(default = "defaults::default_tick_hz")]
    tick_hz: f32,
    #[serde(default = "defaults::default_swipe_scope")]
    swipe_scope: SwipeScope,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            last_token_trigger_clamp: defaults::default_last_token_trigger_clamp(),
            tick_hz: defaults::default_tick_hz(),
            swipe_scope: defaults::default_swipe_scope(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct GestureConfig {
    #[serde(default = "defaults::default_min_swipe_length")]
    min_swipe_length: f32,
    #[serde(default = "defaults::default_max_swipe_length")]
    max_swipe_length: f32,
    #[serde(default = "defaults::default_max_vertical_drift")]
    max_vertical_drift: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            min_swipe_length: defaults::default_min_swipe_length(),
            max_swipe_length: defaults::default_max_swipe_length(),
            max_vertical_drift: defaults::default_max_vertical_drift(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
