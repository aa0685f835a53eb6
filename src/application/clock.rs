//! Frame timing.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The timing state of the frame loop, advanced once at the start of every frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameClock {
    frame_index: u64,
    last_frame_start_nanos: i64,
    step_millis: f32,
    blit_parity: bool,
    wall_clock: Option<SystemTime>,
    last_frame_timepoint: Option<Instant>,
    epoch: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        FrameClock::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock {
            frame_index: 0,
            last_frame_start_nanos: 0,
            step_millis: -1.0,
            blit_parity: false,
            wall_clock: None,
            last_frame_timepoint: None,
            epoch: Instant::now(),
        }
    }

    /// Starts a new frame now.
    #[inline]
    pub fn advance(&mut self) {
        self.advance_at(Instant::now(), SystemTime::now());
    }

    /// Starts a new frame at the given monotonic and wall-clock time points.
    pub fn advance_at(&mut self, now: Instant, wall_clock: SystemTime) {
        self.step_millis = match self.last_frame_timepoint {
            None => 0.0,
            Some(last) => millis(now.checked_duration_since(last).unwrap_or_default()),
        };

        let since_epoch = now.checked_duration_since(self.epoch).unwrap_or_default();
        self.last_frame_start_nanos = since_epoch.as_nanos() as i64;
        self.last_frame_timepoint = Some(now);
        self.wall_clock = Some(wall_clock);
        self.blit_parity = !self.blit_parity;
        self.frame_index += 1;
    }

    /// The number of frames started so far.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Monotonic start of the last frame, in nanoseconds since the clock was created.
    #[inline]
    pub fn last_frame_start_nanos(&self) -> i64 {
        self.last_frame_start_nanos
    }

    /// Milliseconds between the last two frames. `-1` before the first frame, and `0`
    /// during the first one.
    #[inline]
    pub fn step_millis(&self) -> f32 {
        self.step_millis
    }

    /// Same as `step_millis`, as a `Duration`. Zero before the first frame.
    #[inline]
    pub fn step(&self) -> Duration {
        if self.step_millis > 0.0 {
            Duration::from_nanos((f64::from(self.step_millis) * 1_000_000.0) as u64)
        } else {
            Duration::new(0, 0)
        }
    }

    /// Flips every frame, `true` during the first one.
    #[inline]
    pub fn blit_parity(&self) -> bool {
        self.blit_parity
    }

    /// Wall-clock start of the last frame, in milliseconds since the unix epoch.
    pub fn wall_clock_millis(&self) -> Option<u64> {
        self.wall_clock
            .and_then(|v| v.duration_since(UNIX_EPOCH).ok())
            .map(|v| v.as_millis() as u64)
    }
}

#[inline]
fn millis(d: Duration) -> f32 {
    (d.as_secs() as f64 * 1_000.0 + f64::from(d.subsec_nanos()) / 1_000_000.0) as f32
}
