//! Frame-paced playback.
//!
//! The [`Scheduler`] is polled from a single cooperative control loop. It
//! never sleeps: each [`Scheduler::update_display`] call either returns at
//! once because the frame interval has not elapsed, or pulls one frame and
//! the adjusted palette from a [`FrameSource`](crate::decoder::FrameSource)
//! and hands both to a [`DisplaySink`].

mod clock;
mod scheduler;
mod sink;
mod stats;

pub use clock::*;
pub use scheduler::*;
pub use sink::*;
pub use stats::*;
