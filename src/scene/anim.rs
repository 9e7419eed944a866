use eframe::egui::{Vec2, vec2};

/// A tweened scalar attribute. Retargeting captures the current interpolated
/// value as the new starting point, so a transition that is still in flight
/// is superseded rather than queued.
#[derive(Clone, Copy, Debug)]
pub struct Anim {
    from: f32,
    to: f32,
    start: f64,
    duration: f64,
}

impl Anim {
    pub fn fixed(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
        }
    }

    /// Begins a transition toward `target` lasting `duration_ms`, starting
    /// from wherever the attribute currently is at `now` (seconds).
    pub fn set(&mut self, target: f32, duration_ms: f64, now: f64) {
        self.from = self.value_at(now);
        self.to = target;
        self.start = now;
        self.duration = duration_ms / 1000.0;
    }

    /// Snaps to `value` immediately (a zero-duration transition).
    pub fn jump(&mut self, value: f32) {
        self.from = value;
        self.to = value;
        self.duration = 0.0;
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn value_at(&self, now: f64) -> f32 {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = (now - self.start) / self.duration;
        self.from + ((self.to - self.from) * ease_cubic_in_out(t) as f32)
    }

    pub fn animating(&self, now: f64) -> bool {
        self.duration > 0.0 && now < self.start + self.duration
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
    }
}

/// A tweened position.
#[derive(Clone, Copy, Debug)]
pub struct AnimVec2 {
    pub x: Anim,
    pub y: Anim,
}

impl AnimVec2 {
    pub fn fixed(value: Vec2) -> Self {
        Self {
            x: Anim::fixed(value.x),
            y: Anim::fixed(value.y),
        }
    }

    pub fn set(&mut self, target: Vec2, duration_ms: f64, now: f64) {
        self.x.set(target.x, duration_ms, now);
        self.y.set(target.y, duration_ms, now);
    }

    pub fn jump(&mut self, value: Vec2) {
        self.x.jump(value.x);
        self.y.jump(value.y);
    }

    pub fn target(&self) -> Vec2 {
        vec2(self.x.target(), self.y.target())
    }

    pub fn value_at(&self, now: f64) -> Vec2 {
        vec2(self.x.value_at(now), self.y.value_at(now))
    }

    pub fn animating(&self, now: f64) -> bool {
        self.x.animating(now) || self.y.animating(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_the_target_when_the_duration_elapses() {
        let mut anim = Anim::fixed(0.0);
        anim.set(10.0, 600.0, 1.0);
        assert_eq!(anim.value_at(1.0), 0.0);
        assert_eq!(anim.value_at(1.6), 10.0);
        assert_eq!(anim.value_at(100.0), 10.0);
    }

    #[test]
    fn midpoint_is_halfway_under_symmetric_easing() {
        let mut anim = Anim::fixed(0.0);
        anim.set(10.0, 1000.0, 0.0);
        let mid = anim.value_at(0.5);
        assert!((mid - 5.0).abs() < 1e-4);
    }

    #[test]
    fn retargeting_supersedes_the_inflight_transition() {
        let mut anim = Anim::fixed(0.0);
        anim.set(10.0, 1000.0, 0.0);
        // Halfway through, redirect to 0; the tween restarts from ~5.
        let halfway = anim.value_at(0.5);
        anim.set(0.0, 1000.0, 0.5);
        assert_eq!(anim.value_at(0.5), halfway);
        assert_eq!(anim.target(), 0.0);
        assert_eq!(anim.value_at(2.0), 0.0);
    }

    #[test]
    fn zero_duration_snaps_immediately() {
        let mut anim = Anim::fixed(3.0);
        anim.set(7.0, 0.0, 2.0);
        assert_eq!(anim.value_at(2.0), 7.0);
        assert!(!anim.animating(2.0));
    }

    #[test]
    fn retargeting_to_the_same_value_keeps_the_target() {
        let mut anim = Anim::fixed(1.0);
        anim.set(1.0, 600.0, 0.0);
        assert_eq!(anim.target(), 1.0);
        assert_eq!(anim.value_at(0.3), 1.0);
    }

    #[test]
    fn vec2_components_tween_together() {
        let mut pos = AnimVec2::fixed(vec2(0.0, 0.0));
        pos.set(vec2(10.0, 20.0), 500.0, 0.0);
        assert!(pos.animating(0.25));
        assert_eq!(pos.value_at(1.0), vec2(10.0, 20.0));
    }
}
