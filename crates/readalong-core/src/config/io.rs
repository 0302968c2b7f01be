use super::models::EngineConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> EngineConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return EngineConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            EngineConfig::default()
        }
    }
}

/// Parse the sectioned TOML form (`[layout]`, `[playback]`, `[gesture]`, `[logging]`).
pub fn parse_config(contents: &str) -> Result<EngineConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Parsing config tables")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &EngineConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Serializing config tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, SwipeScope};

    #[test]
    fn empty_document_yields_defaults() {
        let parsed = parse_config("").expect("empty config should parse");
        assert_eq!(parsed, EngineConfig::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let parsed = parse_config(
            r#"
[gesture]
min_swipe_length = 90.0

[playback]
swipe_scope = "sentence"

[logging]
log_level = "warn"
"#,
        )
        .expect("partial config should parse");

        assert!((parsed.min_swipe_length - 90.0).abs() < f32::EPSILON);
        assert!((parsed.max_swipe_length - 800.0).abs() < f32::EPSILON);
        assert_eq!(parsed.swipe_scope, SwipeScope::Sentence);
        assert_eq!(parsed.log_level, LogLevel::Warn);
        assert_eq!(parsed.abbreviations.len(), 5);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = EngineConfig::default();
        config.word_gap = 6.5;
        config.abbreviations.push("Prof.".to_string());
        let text = serialize_config(&config).expect("config should serialize");
        assert!(text.contains("[layout]"));
        assert_eq!(parse_config(&text).expect("round trip"), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("readalong-missing-config-does-not-exist.toml");
        assert_eq!(load_config(&path), EngineConfig::default());
    }
}
