/// Frame-rate throttle over a host frame clock.
///
/// This is not a fixed-timestep simulation: frames arriving sooner than the
/// target interval are skipped, and everything else renders.
#[derive(Clone, Debug)]
pub struct FrameThrottle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(target_fps: f32) -> Self {
        Self {
            interval_ms: 1000.0 / target_fps.max(1.0) as f64,
            last_ms: None,
        }
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Forget the previous frame; the next call to [`ready`](Self::ready) renders.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Returns the seconds since the previous rendered frame when a frame
    /// should be rendered at `now_ms`, or `None` to skip it.
    pub fn ready(&mut self, now_ms: f64) -> Option<f32> {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => None,
            Some(last) => {
                self.last_ms = Some(now_ms);
                Some(((now_ms - last) / 1000.0) as f32)
            }
            None => {
                self.last_ms = Some(now_ms);
                Some(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_always_renders() {
        let mut t = FrameThrottle::new(30.0);
        assert_eq!(t.ready(1234.0), Some(0.0));
    }

    #[test]
    fn skips_frames_inside_interval() {
        let mut t = FrameThrottle::new(30.0);
        t.ready(0.0);
        assert_eq!(t.ready(16.7), None);
        assert_eq!(t.ready(33.0), None);
        let dt = t.ready(33.4).unwrap();
        assert!((dt - 0.0334).abs() < 1e-4);
    }

    #[test]
    fn reset_renders_immediately() {
        let mut t = FrameThrottle::new(60.0);
        t.ready(100.0);
        t.reset();
        assert_eq!(t.ready(101.0), Some(0.0));
    }
}
