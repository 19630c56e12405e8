//! Host seams for time and randomness.
//!
//! The browser binding supplies gloo timers and `Date.now()`; tests supply
//! deterministic fakes so every deferred path can be driven synchronously.

use futures::future::LocalBoxFuture;

/// Deferred wake-up after a fixed delay.
pub trait Sleeper {
    fn sleep(&self, duration_ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// Wall clock used to stamp messages and submissions.
pub trait Clock {
    fn now_unix_millis(&self) -> u64;
}

/// Uniform randomness.
pub trait Dice {
    /// Sample in `[0, 1)`.
    fn unit(&self) -> f64;

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn index(&self, len: usize) -> usize {
        let scaled = (self.unit() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// Dice backed by the platform entropy source (`crypto.getRandomValues` on wasm).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsDice;

impl Dice for OsDice {
    fn unit(&self) -> f64 {
        match getrandom::u32() {
            Ok(raw) => f64::from(raw) / (f64::from(u32::MAX) + 1.0),
            Err(error) => {
                tracing::warn!("entropy source unavailable: {}", error);
                0.0
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use futures::FutureExt;
    use futures::future::LocalBoxFuture;

    use super::{Clock, Dice, Sleeper};

    /// Resolves every sleep immediately and records the requested delays.
    #[derive(Default)]
    pub struct RecordingSleeper {
        pub requested: RefCell<Vec<u32>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration_ms: u32) -> LocalBoxFuture<'static, ()> {
            self.requested.borrow_mut().push(duration_ms);
            futures::future::ready(()).boxed_local()
        }
    }

    pub struct FixedClock(pub Cell<u64>);

    impl FixedClock {
        pub fn at(millis: u64) -> Self {
            Self(Cell::new(millis))
        }
    }

    impl Clock for FixedClock {
        fn now_unix_millis(&self) -> u64 {
            self.0.get()
        }
    }

    /// Replays scripted samples, repeating the last one when exhausted.
    pub struct ScriptedDice {
        samples: RefCell<VecDeque<f64>>,
        last: Cell<f64>,
    }

    impl ScriptedDice {
        pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
            Self {
                samples: RefCell::new(samples.into_iter().collect()),
                last: Cell::new(0.0),
            }
        }
    }

    impl Dice for ScriptedDice {
        fn unit(&self) -> f64 {
            if let Some(sample) = self.samples.borrow_mut().pop_front() {
                self.last.set(sample);
            }
            self.last.get()
        }
    }
}
