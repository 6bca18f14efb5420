//! One-shot "scene is ready" notification.

/// Fires once, when assets are loaded and the camera has settled, or when
/// the fallback delay has elapsed, whichever happens first.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    fallback_secs: f32,
    elapsed: f32,
    fired: bool,
}

impl ReadySignal {
    /// Creates a signal with the given fallback delay in seconds.
    pub fn new(fallback_secs: f32) -> Self {
        Self {
            fallback_secs: fallback_secs.max(0.0),
            elapsed: 0.0,
            fired: false,
        }
    }

    /// Advances mounted time. Returns true exactly once, on the tick that
    /// makes the viewer ready.
    pub fn tick(&mut self, dt: f32, assets_loaded: bool, settled: bool) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed += dt.max(0.0);
        if (assets_loaded && settled) || self.elapsed >= self.fallback_secs {
            self.fired = true;
            log::info!("viewer ready after {:.2}s", self.elapsed);
            return true;
        }
        false
    }

    /// True once the signal has fired.
    pub fn is_ready(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_loaded_and_settled() {
        let mut r = ReadySignal::new(1.5);
        assert!(!r.tick(0.1, false, true));
        assert!(!r.tick(0.1, true, false));
        assert!(r.tick(0.1, true, true));
        assert!(r.is_ready());
        assert!(!r.tick(0.1, true, true));
    }

    #[test]
    fn test_fallback_fires_once() {
        let mut r = ReadySignal::new(1.5);
        let fired: usize = (0..100)
            .map(|_| usize::from(r.tick(0.1, false, false)))
            .sum();
        assert_eq!(fired, 1);
        assert!(r.is_ready());
    }

    #[test]
    fn test_zero_fallback_fires_on_first_tick() {
        let mut r = ReadySignal::new(0.0);
        assert!(r.tick(0.0, false, false));
    }
}
