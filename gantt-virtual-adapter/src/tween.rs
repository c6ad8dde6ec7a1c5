/// Both scroll offsets of the chart body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub x: u64,
    pub y: u64,
}

impl ScrollState {
    pub fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

/// Smooth scroll from one [`ScrollState`] to another, sampled by the host's clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from: ScrollState,
    pub to: ScrollState,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(
        from: ScrollState,
        to: ScrollState,
        start_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let t = now_ms.saturating_sub(self.start_ms) as f64 / self.duration_ms as f64;
        self.easing.apply(t.clamp(0.0, 1.0))
    }

    pub fn sample(&self, now_ms: u64) -> ScrollState {
        if self.is_done(now_ms) {
            return self.to;
        }
        let p = self.progress(now_ms);
        ScrollState {
            x: lerp(self.from.x, self.to.x, p),
            y: lerp(self.from.y, self.to.y, p),
        }
    }

    /// Restarts toward `to` from wherever the tween is at `now_ms`.
    pub fn retarget(&mut self, now_ms: u64, to: ScrollState, duration_ms: u64) {
        *self = Self::new(self.sample(now_ms), to, now_ms, duration_ms, self.easing);
    }
}

fn lerp(from: u64, to: u64, p: f64) -> u64 {
    let v = from as f64 + (to as f64 - from as f64) * p;
    if v <= 0.0 { 0 } else { (v + 0.5) as u64 }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutQuad,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}
