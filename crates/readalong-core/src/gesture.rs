//! Horizontal swipe detection over a single line.
//!
//! Coordinates are y-up: a line box spans `bottom_y..=top_y`.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// On-screen box of one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineBounds {
    pub left_x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
}

impl LineBounds {
    pub fn new(left_x: f32, top_y: f32, bottom_y: f32) -> Self {
        Self {
            left_x,
            top_y,
            bottom_y,
        }
    }

    fn contains_y(&self, y: f32) -> bool {
        y >= self.bottom_y && y <= self.top_y
    }
}

/// Why a press/release pair was not a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeRejection {
    /// Non-finite coordinates or an inverted box.
    Degenerate,
    OutsideLine,
    VerticalDrift,
    TooShort,
    TooLong,
    EndsBeforeLine,
}

impl fmt::Display for SwipeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SwipeRejection::Degenerate => "degenerate geometry",
            SwipeRejection::OutsideLine => "outside line",
            SwipeRejection::VerticalDrift => "vertical drift",
            SwipeRejection::TooShort => "too short",
            SwipeRejection::TooLong => "too long",
            SwipeRejection::EndsBeforeLine => "ends before line",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRecognizer {
    pub min_swipe_length: f32,
    pub max_swipe_length: f32,
    pub max_vertical_drift: f32,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SwipeRecognizer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_swipe_length: config.min_swipe_length,
            max_swipe_length: config.max_swipe_length,
            max_vertical_drift: config.max_vertical_drift,
        }
    }

    /// Accept a left-to-right swipe that stays on the line.
    pub fn recognize(
        &self,
        down: Point,
        up: Point,
        bounds: &LineBounds,
    ) -> Result<(), SwipeRejection> {
        let bounds_ok = bounds.left_x.is_finite()
            && bounds.top_y.is_finite()
            && bounds.bottom_y.is_finite()
            && bounds.top_y >= bounds.bottom_y;
        if !down.is_finite() || !up.is_finite() || !bounds_ok {
            return Err(SwipeRejection::Degenerate);
        }
        if !bounds.contains_y(down.y) || !bounds.contains_y(up.y) {
            return Err(SwipeRejection::OutsideLine);
        }
        if (up.y - down.y).abs() > self.max_vertical_drift {
            return Err(SwipeRejection::VerticalDrift);
        }
        let length = up.x - down.x;
        if length < self.min_swipe_length {
            return Err(SwipeRejection::TooShort);
        }
        if length > self.max_swipe_length {
            return Err(SwipeRejection::TooLong);
        }
        if up.x < bounds.left_x {
            return Err(SwipeRejection::EndsBeforeLine);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_box() -> LineBounds {
        LineBounds::new(100.0, 500.0, 400.0)
    }

    #[test]
    fn straight_swipe_across_line_is_accepted() {
        let recognizer = SwipeRecognizer::default();
        let result = recognizer.recognize(
            Point::new(120.0, 450.0),
            Point::new(500.0, 460.0),
            &line_box(),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn each_rule_has_its_own_rejection() {
        let recognizer = SwipeRecognizer::default();
        let bounds = line_box();
        let cases = [
            ((120.0, 350.0), (500.0, 450.0), SwipeRejection::OutsideLine),
            ((120.0, 450.0), (500.0, 520.0), SwipeRejection::OutsideLine),
            ((120.0, 405.0), (500.0, 495.0), SwipeRejection::VerticalDrift),
            ((120.0, 450.0), (200.0, 450.0), SwipeRejection::TooShort),
            ((500.0, 450.0), (120.0, 450.0), SwipeRejection::TooShort),
            ((120.0, 450.0), (1000.0, 450.0), SwipeRejection::TooLong),
            ((-200.0, 450.0), (50.0, 450.0), SwipeRejection::EndsBeforeLine),
        ];
        for ((dx, dy), (ux, uy), expected) in cases {
            let result = recognizer.recognize(Point::new(dx, dy), Point::new(ux, uy), &bounds);
            assert_eq!(result, Err(expected), "down ({dx},{dy}) up ({ux},{uy})");
        }
    }

    #[test]
    fn length_limits_are_inclusive() {
        let recognizer = SwipeRecognizer::default();
        let bounds = line_box();
        let down = Point::new(100.0, 450.0);
        assert!(recognizer.recognize(down, Point::new(250.0, 450.0), &bounds).is_ok());
        assert!(recognizer.recognize(down, Point::new(900.0, 450.0), &bounds).is_ok());
    }

    #[test]
    fn broken_geometry_is_not_a_swipe() {
        let recognizer = SwipeRecognizer::default();
        let down = Point::new(120.0, 450.0);
        let up = Point::new(500.0, 460.0);
        assert_eq!(
            recognizer.recognize(Point::new(f32::NAN, 450.0), up, &line_box()),
            Err(SwipeRejection::Degenerate)
        );
        let inverted = LineBounds::new(100.0, 400.0, 500.0);
        assert_eq!(
            recognizer.recognize(down, up, &inverted),
            Err(SwipeRejection::Degenerate)
        );
    }
}
