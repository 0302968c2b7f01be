//! Story scripts: a JSON list of pages to play in order.

use anyhow::{Context, Result};
use readalong_core::page::PageSource;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct StoryScript {
    pub pages: Vec<PageSource>,
    /// Duration given to each word of a page that has no timestamps.
    #[serde(default = "default_seconds_per_word")]
    pub seconds_per_word: f64,
}

fn default_seconds_per_word() -> f64 {
    0.35
}

impl StoryScript {
    /// Fill in even timings for pages that arrived without any.
    fn with_estimated_timings(mut self) -> Self {
        for (idx, page) in self.pages.iter_mut().enumerate() {
            if page.timestamps.is_empty() && !page.words.is_empty() {
                info!(page = idx, words = page.words.len(), "Estimating word timings");
                let text = page.words.join(" ");
                *page =
                    PageSource::evenly_timed(&text, self.seconds_per_word, page.max_line_width);
            }
        }
        self
    }
}

pub fn parse_script(contents: &str) -> Result<StoryScript> {
    let script: StoryScript =
        serde_json::from_str(contents).context("Failed to parse story script")?;
    if script.pages.is_empty() {
        warn!("Story script has no pages");
    }
    Ok(script.with_estimated_timings())
}

pub fn load_script(path: &Path) -> Result<StoryScript> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read story script {}", path.display()))?;
    let script = parse_script(&contents)?;
    info!(path = %path.display(), pages = script.pages.len(), "Loaded story script");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_without_timestamps_get_even_timing() {
        let script = parse_script(
            r#"{
                "seconds_per_word": 0.5,
                "pages": [
                    { "text": "The toad jumped.", "max_line_width": 300 },
                    { "words": ["Splash!"], "timestamps": [{"start": 0.0, "end": 0.8}], "max_line_width": 300 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.pages.len(), 2);
        assert_eq!(script.pages[0].timestamps.len(), 3);
        assert_eq!(script.pages[0].duration(), 1.5);
        assert_eq!(script.pages[1].duration(), 0.8);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_script("{ \"pages\": [ { \"text\": 3 } ] }").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse story script"));
    }
}
