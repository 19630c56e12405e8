use crate::easing::{self, Easing};

/// Parsed counter goal taken from the element's initial text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTarget {
    value: u64,
    percent: bool,
    grouped: bool,
    original: String,
}

impl CounterTarget {
    /// Parses texts such as `"1000"`, `"1,000"` or `"98%"`.
    ///
    /// Leading digits (thousands separators allowed) form the value; text without
    /// leading digits is not a counter.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let numeric = trimmed
            .chars()
            .take_while(|ch| ch.is_ascii_digit() || *ch == ',')
            .collect::<String>();
        let digits = numeric.replace(',', "");
        if digits.is_empty() {
            return None;
        }

        let value = digits.parse::<u64>().ok()?;
        Some(Self {
            value,
            percent: trimmed.contains('%'),
            grouped: numeric.contains(','),
            original: trimmed.to_string(),
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Renders an intermediate value in the target's own style.
    pub fn display(&self, current: u64) -> String {
        let mut text = if self.grouped {
            group_thousands(current)
        } else {
            current.to_string()
        };
        if self.percent {
            text.push('%');
        }
        text
    }
}

/// One rendered animation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFrame {
    pub value: u64,
    pub text: String,
    pub done: bool,
}

/// Frame-driven count-up from zero to a [`CounterTarget`].
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: CounterTarget,
    duration_ms: f64,
    easing: Easing,
    started_at: Option<f64>,
}

impl CounterAnimation {
    pub fn new(target: CounterTarget, duration_ms: u32, easing: Easing) -> Self {
        Self {
            target,
            duration_ms: f64::from(duration_ms),
            easing,
            started_at: None,
        }
    }

    pub fn target(&self) -> &CounterTarget {
        &self.target
    }

    /// Computes the frame for `now_ms`; the first call anchors the start time.
    pub fn frame(&mut self, now_ms: f64) -> CounterFrame {
        let started_at = *self.started_at.get_or_insert(now_ms);
        let progress = easing::progress(now_ms - started_at, self.duration_ms);

        if progress >= 1.0 {
            return CounterFrame {
                value: self.target.value,
                text: self.target.original.clone(),
                done: true,
            };
        }

        let eased = self.easing.apply(progress);
        let value = ((self.target.value as f64) * eased).floor() as u64;
        let value = value.min(self.target.value);
        CounterFrame {
            value,
            text: self.target.display(value),
            done: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterRun {
    Running,
    Finished,
}

/// Per-element guard so each counter animates at most once.
#[derive(Debug, Clone)]
pub struct CounterGuard<K> {
    runs: Vec<(K, CounterRun)>,
}

impl<K> Default for CounterGuard<K> {
    fn default() -> Self {
        Self { runs: Vec::new() }
    }
}

impl<K> CounterGuard<K>
where
    K: PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for a run. Returns false when it is running or already done.
    pub fn begin(&mut self, key: K) -> bool {
        if self.runs.iter().any(|(known, _)| *known == key) {
            return false;
        }
        self.runs.push((key, CounterRun::Running));
        true
    }

    pub fn finish(&mut self, key: &K) {
        if let Some((_, run)) = self.runs.iter_mut().find(|(known, _)| known == key) {
            *run = CounterRun::Finished;
        }
    }

    pub fn is_finished(&self, key: &K) -> bool {
        self.runs
            .iter()
            .any(|(known, run)| known == key && *run == CounterRun::Finished)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_to_end(mut animation: CounterAnimation, step_ms: f64) -> Vec<CounterFrame> {
        let mut frames = Vec::new();
        let mut now = 1_000.0;
        loop {
            let frame = animation.frame(now);
            let done = frame.done;
            frames.push(frame);
            if done {
                return frames;
            }
            now += step_ms;
        }
    }

    #[test]
    fn parses_plain_grouped_and_percent_targets() {
        let plain = CounterTarget::parse("1000").unwrap();
        assert_eq!(plain.value(), 1000);
        assert_eq!(plain.display(42), "42");

        let grouped = CounterTarget::parse(" 1,000 ").unwrap();
        assert_eq!(grouped.value(), 1000);
        assert_eq!(grouped.display(1234567), "1,234,567");

        let percent = CounterTarget::parse("98%").unwrap();
        assert_eq!(percent.value(), 98);
        assert_eq!(percent.display(40), "40%");

        assert_eq!(CounterTarget::parse("約100"), None);
        assert_eq!(CounterTarget::parse(""), None);
    }

    #[test]
    fn counts_up_to_exact_target_without_overshoot() {
        for (text, easing) in [
            ("1000", Easing::EaseOutCubic),
            ("1,000", Easing::EaseOutCubic),
            ("1000", Easing::EaseOutExpo),
        ] {
            let target = CounterTarget::parse(text).unwrap();
            let frames = run_to_end(CounterAnimation::new(target, 2000, easing), 16.0);

            assert!(frames.iter().all(|frame| frame.value <= 1000));
            assert!(frames.windows(2).all(|pair| pair[0].value <= pair[1].value));
            let last = frames.last().unwrap();
            assert_eq!(last.text, text);
            assert_eq!(last.value, 1000);
            assert!(frames[..frames.len() - 1].iter().all(|frame| !frame.done));
        }
    }

    #[test]
    fn first_frame_starts_at_zero_and_keeps_percent_suffix() {
        let target = CounterTarget::parse("95%").unwrap();
        let mut animation = CounterAnimation::new(target, 2000, Easing::EaseOutCubic);

        let first = animation.frame(500.0);
        assert_eq!(first.text, "0%");

        // Halfway through: floor(95 * (1 - 0.5^3)) = 83.
        let middle = animation.frame(1500.0);
        assert_eq!(middle.text, "83%");

        let last = animation.frame(2500.0);
        assert_eq!(last.text, "95%");
        assert!(last.done);
    }

    #[test]
    fn guard_blocks_rerun_while_running_and_after_finish() {
        let mut guard = CounterGuard::new();
        assert!(guard.begin("users"));
        assert!(!guard.begin("users"));
        assert!(!guard.is_finished(&"users"));

        guard.finish(&"users");
        assert!(guard.is_finished(&"users"));
        assert!(!guard.begin("users"));
        assert!(guard.begin("shops"));
    }

    #[test]
    fn grouping_handles_small_values() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
    }
}
