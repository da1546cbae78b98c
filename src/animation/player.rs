use serde::{Deserialize, Serialize};

use super::skinned_animation::SkinnedAnimation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWrapMode {
    #[default]
    Clamp,
    Repeat,
    PingPong,
}
impl TimeWrapMode {
    /// Maps an unbounded clock onto `[0, duration]`.
    pub fn wrap(&self, time: f32, duration: f32) -> f32 {
        if duration <= f32::EPSILON {
            return 0.0;
        }
        match self {
            TimeWrapMode::Clamp => time.clamp(0.0, duration),
            TimeWrapMode::Repeat => time.rem_euclid(duration),
            TimeWrapMode::PingPong => {
                let period = duration * 2.0;
                let t2 = time.rem_euclid(period);
                if t2 <= duration { t2 } else { period - t2 }
            }
        }
    }
}

/// Playback clock for one clip.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    /// seconds since playback started, scaled by `speed`
    time: f32,
    duration: f32,
    pub speed: f32,
    pub time_wrap: TimeWrapMode,
}
impl AnimationPlayer {
    pub fn new(duration: f32, time_wrap: TimeWrapMode) -> Self {
        Self {
            time: 0.0,
            duration: duration.max(0.0),
            speed: 1.0,
            time_wrap,
        }
    }

    pub fn for_animation(animation: &SkinnedAnimation, time_wrap: TimeWrapMode) -> Self {
        Self::new(animation.max_animation_time(), time_wrap)
    }

    /// Moves the clock by `dt` seconds and returns the time to sample at.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.time += dt * self.speed;
        self.sample_time()
    }

    pub fn sample_time(&self) -> f32 {
        self.time_wrap.wrap(self.time, self.duration)
    }

    pub fn seek(&mut self, time: f32) {
        self.time = time;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Only a clamped clip ever finishes.
    pub fn is_finished(&self) -> bool {
        self.time_wrap == TimeWrapMode::Clamp && self.time >= self.duration
    }
}
