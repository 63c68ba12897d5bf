use std::time::{Duration, Instant};

/// Longest frame step fed to movement, so a stalled window doesn't teleport the player.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

pub struct FrameClock {
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    /// Seconds since the previous tick, capped at [`MAX_FRAME_TIME`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = Self::capped(now.duration_since(self.last_tick));
        self.last_tick = now;
        dt.as_secs_f32()
    }

    #[inline]
    fn capped(dt: Duration) -> Duration {
        dt.min(MAX_FRAME_TIME)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame movement magnitudes derived from the frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSpeeds {
    pub move_speed: f32,
    pub rot_speed: f32,
}

impl FrameSpeeds {
    pub fn from_frame_time(dt: f32, move_per_sec: f32, rot_per_sec: f32) -> Self {
        Self {
            move_speed: dt * move_per_sec,
            rot_speed: dt * rot_per_sec,
        }
    }
}

/// Averages frames over one-second windows.
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
        }
    }

    /// Count a frame; returns the average FPS when a full second has elapsed.
    pub fn frame(&mut self) -> Option<f32> {
        self.frame_at(Instant::now())
    }

    fn frame_at(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start).as_secs_f32();
        if elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / elapsed;
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_frames_are_capped() {
        assert_eq!(FrameClock::capped(Duration::from_secs(3)), MAX_FRAME_TIME);
        assert_eq!(
            FrameClock::capped(Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn tick_never_exceeds_cap() {
        let mut clock = FrameClock::new();
        let dt = clock.tick();
        assert!((0.0..=MAX_FRAME_TIME.as_secs_f32()).contains(&dt));
    }

    #[test]
    fn speeds_scale_with_frame_time() {
        let s = FrameSpeeds::from_frame_time(0.02, 5.0, 3.0);
        assert!((s.move_speed - 0.1).abs() < 1e-6);
        assert!((s.rot_speed - 0.06).abs() < 1e-6);
    }

    #[test]
    fn fps_reported_once_per_second() {
        let mut fps = FpsCounter::new();
        let start = fps.window_start;
        assert_eq!(fps.frame_at(start + Duration::from_millis(500)), None);
        let reported = fps.frame_at(start + Duration::from_secs(2)).unwrap();
        assert!((reported - 1.0).abs() < 1e-6);
        assert_eq!(fps.frames, 0);
    }
}
