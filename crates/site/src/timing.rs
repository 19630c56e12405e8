//! Rate limiting for high-frequency page events.
//!
//! Both helpers are plain state over caller-supplied timestamps so they can
//! be driven by `requestAnimationFrame` time, `performance.now()` or a test.

/// Leading-edge throttle: the first call fires, calls inside the window are dropped.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: f64,
    blocked_until: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: u32) -> Self {
        Self {
            limit_ms: f64::from(limit_ms),
            blocked_until: None,
        }
    }

    /// Returns true when the callback should run at `now_ms`.
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if let Some(until) = self.blocked_until
            && now_ms < until
        {
            return false;
        }

        self.blocked_until = Some(now_ms + self.limit_ms);
        true
    }

    pub fn reset(&mut self) {
        self.blocked_until = None;
    }
}

/// Identifies one armed debounce; only the latest ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// Trailing-edge debounce: every call supersedes the previously armed one.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: u32,
    generation: u64,
}

impl Debounce {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            generation: 0,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Arms a new trailing call; the caller waits `delay_ms` and then checks the ticket.
    pub fn arm(&mut self) -> DebounceTicket {
        self.generation = self.generation.wrapping_add(1);
        DebounceTicket(self.generation)
    }

    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Invalidates any armed ticket.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_drops_calls_inside_window() {
        let mut throttle = Throttle::new(16);
        assert!(throttle.try_fire(0.0));
        assert!(!throttle.try_fire(5.0));
        assert!(!throttle.try_fire(15.9));
        assert!(throttle.try_fire(16.0));
        assert!(!throttle.try_fire(20.0));
    }

    #[test]
    fn throttle_reset_reopens_immediately() {
        let mut throttle = Throttle::new(250);
        assert!(throttle.try_fire(100.0));
        throttle.reset();
        assert!(throttle.try_fire(101.0));
    }

    #[test]
    fn only_latest_debounce_ticket_fires() {
        let mut debounce = Debounce::new(250);
        let first = debounce.arm();
        let second = debounce.arm();
        assert!(!debounce.is_current(first));
        assert!(debounce.is_current(second));

        debounce.cancel();
        assert!(!debounce.is_current(second));
    }
}
