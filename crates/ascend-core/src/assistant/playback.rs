//! Gapless playback scheduling for incoming audio chunks.

/// Placement of one chunk on the output timeline, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledChunk {
    pub start: f64,
    pub end: f64,
}

/// Queues chunks back-to-back on the playback clock.
///
/// Each chunk starts at `max(clock, previous end)`, so chunks never overlap
/// and, while audio keeps arriving ahead of the clock, leave no gap.
#[derive(Debug, Clone, Default)]
pub struct PlaybackScheduler {
    next_start: f64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `duration` seconds starting no earlier than `now`.
    pub fn schedule(&mut self, now: f64, duration: f64) -> ScheduledChunk {
        let start = self.next_start.max(now);
        let end = start + duration.max(0.0);
        self.next_start = end;
        ScheduledChunk { start, end }
    }

    /// End of the last scheduled chunk.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    /// Forgets queued audio (new session or barge-in).
    pub fn reset(&mut self) {
        self.next_start = 0.0;
    }
}
