//! CRT: half-block true-color video playback for terminals.
//!
//! A frame flows `source -> scale -> encode -> display`, paced by the
//! playback clock and gated by the cancellation token once per iteration.

pub mod cancel;
pub mod clock;
pub mod display;
pub mod encode;
pub mod player;
pub mod scale;
pub mod source;
pub mod terminal;
