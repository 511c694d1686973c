#[path = "clock_replacer.rs"]
mod inner;

pub use inner::{ClockReplacer, ClockReplacerBuilder, FrameId};
