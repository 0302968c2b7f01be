pub(crate) fn default_word_gap() -> f32 {
    10.0
}

pub(crate) fn default_glyph_advance() -> f32 {
    18.0
}

pub(crate) fn default_line_height() -> f32 {
    100.0
}

pub(crate) fn default_abbreviations() -> Vec<String> {
    ["Mr.", "Mrs.", "Ms.", "Dr.", "St."]
        .iter()
        .map(|abbr| abbr.to_string())
        .collect()
}

pub(crate) fn default_last_token_trigger_clamp() -> f64 {
    0.05
}

pub(crate) fn default_tick_hz() -> f32 {
    60.0
}

pub(crate) fn default_swipe_scope() -> crate::config::SwipeScope {
    crate::config::SwipeScope::Line
}

pub(crate) fn default_min_swipe_length() -> f32 {
    150.0
}

pub(crate) fn default_max_swipe_length() -> f32 {
    800.0
}

pub(crate) fn default_max_vertical_drift() -> f32 {
    50.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
