//! Playback state machine and frame pacing.

use std::time::Duration;

use log::{trace, warn};

use super::{Clock, DisplaySink, MonotonicClock, PlaybackStats};
use crate::decoder::FrameSource;
use crate::format::AssetHeader;

/// Position and timing of a playing asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    /// Next frame to present.
    pub frame_index: usize,
    pub frame_count: usize,
    /// When the last frame was presented; `None` until the first present.
    pub last_update: Option<Duration>,
    pub frame_interval: Duration,
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No asset committed.
    #[default]
    Idle,
    Playing(Timeline),
}

/// Outcome of one [`Scheduler::update_display`] poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing is loaded.
    Idle,
    /// The frame interval has not elapsed yet.
    Waiting,
    /// Frame `frame` was handed to the sink.
    Presented { frame: usize },
    /// Reading or presenting the frame failed; it is retried next interval.
    Failed,
}

/// Advances frames at the asset's frame rate.
///
/// Usage:
/// ```ignore
/// let header = decoder.load(path)?;
/// scheduler.start(&header);
/// loop {
///     poll_ingestion();
///     scheduler.update_display(&mut decoder, &mut sink);
/// }
/// ```
#[derive(Debug)]
pub struct Scheduler<C: Clock = MonotonicClock> {
    clock: C,
    state: PlaybackState,
    stats: PlaybackStats,
}

impl Scheduler<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Scheduler<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: PlaybackState::Idle,
            stats: PlaybackStats::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing(_))
    }

    /// Next frame to present; zero while idle.
    pub fn frame_index(&self) -> usize {
        match &self.state {
            PlaybackState::Playing(t) => t.frame_index,
            PlaybackState::Idle => 0,
        }
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Enter playing state for a freshly committed asset, at frame zero
    /// with timing cleared.
    pub fn start(&mut self, header: &AssetHeader) {
        self.state = PlaybackState::Playing(Timeline {
            frame_index: 0,
            frame_count: header.frame_count as usize,
            last_update: None,
            frame_interval: header.frame_interval(),
        });
    }

    /// Return to idle, e.g. after the backend was switched or cleared.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
    }

    /// Present the next frame if its interval has elapsed.
    ///
    /// Cheap to call arbitrarily often. Never fails: read or sink errors
    /// are logged and reported as [`Tick::Failed`].
    pub fn update_display<S, D>(&mut self, source: &mut S, sink: &mut D) -> Tick
    where
        S: FrameSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        let PlaybackState::Playing(timeline) = &mut self.state else {
            return Tick::Idle;
        };

        let now = self.clock.now();
        if let Some(last) = timeline.last_update
            && now < last + timeline.frame_interval
        {
            trace!("Frame {} not due yet", timeline.frame_index);
            return Tick::Waiting;
        }
        timeline.last_update = Some(now);

        if timeline.frame_index >= timeline.frame_count {
            timeline.frame_index = 0;
        }
        let index = timeline.frame_index;

        let frame = match source.frame(index) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to read frame {}: {}", index, e);
                return Tick::Failed;
            }
        };
        let palette = match source.palette() {
            Ok(palette) => palette,
            Err(e) => {
                warn!("Failed to read palette: {}", e);
                return Tick::Failed;
            }
        };
        if let Err(e) = sink.present(palette, &frame) {
            warn!("Display sink rejected frame {}: {}", index, e);
            return Tick::Failed;
        }

        timeline.frame_index += 1;
        self.stats.record(self.clock.now().saturating_sub(now));

        Tick::Presented { frame: index }
    }
}
