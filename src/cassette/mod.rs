//! Cassette format for recording and replaying model interactions.

pub mod format;
pub mod recorder;
pub mod replayer;
