pub mod cancellation;
pub mod constants;
pub mod diagnostics;
pub mod poll_clock;
pub mod timecode;
