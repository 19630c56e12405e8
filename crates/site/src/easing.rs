use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseOutExpo,
    EaseInOutQuad,
}

impl Easing {
    pub fn apply(self, progress: f64) -> f64 {
        let p = clamp_progress(progress);
        match self {
            Self::Linear => p,
            Self::EaseOutCubic => ease_out_cubic(p),
            Self::EaseOutExpo => ease_out_expo(p),
            Self::EaseInOutQuad => ease_in_out_quad(p),
        }
    }
}

/// Normalized progress for `elapsed` out of `duration`, saturating at 1.
///
/// A zero duration completes immediately.
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    clamp_progress(elapsed_ms / duration_ms)
}

pub fn ease_out_cubic(p: f64) -> f64 {
    1.0 - (1.0 - p).powi(3)
}

pub fn ease_out_expo(p: f64) -> f64 {
    // 1 - 2^-10 is not 1, so the end point is pinned.
    if p >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * p)
    }
}

pub fn ease_in_out_quad(p: f64) -> f64 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        -1.0 + (4.0 - 2.0 * p) * p
    }
}

fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseOutCubic,
        Easing::EaseOutExpo,
        Easing::EaseInOutQuad,
    ];

    #[test]
    fn every_curve_is_pinned_at_both_ends() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn curves_are_monotonic_and_bounded() {
        for easing in ALL {
            let mut previous = 0.0;
            for step in 0..=200 {
                let value = easing.apply(f64::from(step) / 200.0);
                assert!(value >= previous, "{easing:?} decreased at step {step}");
                assert!((0.0..=1.0).contains(&value));
                previous = value;
            }
        }
    }

    #[test]
    fn in_out_quad_is_symmetric_around_midpoint() {
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-12);
        for step in 0..50 {
            let p = f64::from(step) / 100.0;
            let mirrored = 1.0 - ease_in_out_quad(1.0 - p);
            assert!((ease_in_out_quad(p) - mirrored).abs() < 1e-12);
        }
    }

    #[test]
    fn progress_saturates_and_handles_zero_duration() {
        assert_eq!(progress(500.0, 2000.0), 0.25);
        assert_eq!(progress(5000.0, 2000.0), 1.0);
        assert_eq!(progress(-10.0, 2000.0), 0.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Easing::EaseOutCubic.apply(3.0), 1.0);
        assert_eq!(Easing::EaseOutExpo.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(f64::NAN), 0.0);
    }
}
