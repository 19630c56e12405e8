use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gloo::timers::future::TimeoutFuture;
use linebiz::{Clock, Sleeper};
use web_time::{SystemTime, UNIX_EPOCH};

/// Sleeps on `setTimeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooSleeper;

impl Sleeper for GlooSleeper {
    fn sleep(&self, duration_ms: u32) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(duration_ms).boxed_local()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_unix_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}
