//! Audio clocks and the trigger scheduler they drive.

mod clock;
mod scheduler;

pub use clock::{AudioClock, ManualClock, WallClock};
pub use scheduler::{PlaybackState, TriggerScheduler};
