//! Read-along engine: packs timed words into phrase-preserving lines, groups
//! them into sentences, and fires highlight triggers as an audio clock plays.

pub mod config;
pub mod gesture;
pub mod layout;
pub mod measure;
pub mod page;
pub mod playback;
pub mod session;
pub mod text_utils;
pub mod token;
