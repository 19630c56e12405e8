use crate::easing::{self, Easing};

/// Scale applied to a pressed point item before it springs back.
pub const PRESS_SCALE: f64 = 0.95;
/// Sub-pixel remainder below which a scroll is considered already in place.
const SCROLL_DISTANCE_EPSILON: f64 = 0.5;

/// Returns the element id referenced by an in-page link.
///
/// Only `#id` hrefs qualify; a bare `#` or an empty fragment has no destination.
pub fn fragment_target(href: &str) -> Option<&str> {
    let fragment = href.trim().strip_prefix('#')?;
    if fragment.is_empty() {
        None
    } else {
        Some(fragment)
    }
}

/// Document offset to scroll to so the element clears the fixed header.
pub fn scroll_target(element_top: f64, header_height: f64, fixed_padding: f64) -> f64 {
    (element_top - (header_height + fixed_padding)).max(0.0)
}

/// One interpolated scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    pub position: f64,
    pub done: bool,
}

/// Frame-driven window scroll from the current offset to a target offset.
#[derive(Debug, Clone)]
pub struct ScrollAnimation {
    start: f64,
    distance: f64,
    duration_ms: f64,
    easing: Easing,
    started_at: Option<f64>,
}

impl ScrollAnimation {
    pub fn new(start: f64, target: f64, duration_ms: u32, easing: Easing) -> Self {
        Self {
            start,
            distance: target - start,
            duration_ms: f64::from(duration_ms),
            easing,
            started_at: None,
        }
    }

    pub fn target(&self) -> f64 {
        self.start + self.distance
    }

    /// True when there is nothing to animate.
    pub fn is_noop(&self) -> bool {
        self.distance.abs() < SCROLL_DISTANCE_EPSILON
    }

    /// Position for `now_ms`; the first call anchors the start time.
    pub fn frame(&mut self, now_ms: f64) -> ScrollFrame {
        let started_at = *self.started_at.get_or_insert(now_ms);
        let progress = easing::progress(now_ms - started_at, self.duration_ms);
        if progress >= 1.0 {
            return ScrollFrame {
                position: self.target(),
                done: true,
            };
        }

        ScrollFrame {
            position: self.start + self.distance * self.easing.apply(progress),
            done: false,
        }
    }
}

/// Class changes for scroll-dependent page chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeChange {
    pub scroll_top_visible: Option<bool>,
    pub header_condensed: Option<bool>,
}

impl ChromeChange {
    pub fn is_empty(&self) -> bool {
        self.scroll_top_visible.is_none() && self.header_condensed.is_none()
    }
}

/// Tracks the scroll-to-top button and condensed header so classes are only
/// touched when a threshold is crossed.
#[derive(Debug, Clone)]
pub struct ScrollChrome {
    scroll_top_threshold: f64,
    header_threshold: f64,
    scroll_top_visible: bool,
    header_condensed: bool,
}

impl ScrollChrome {
    pub fn new(scroll_top_threshold: f64, header_threshold: f64) -> Self {
        Self {
            scroll_top_threshold,
            header_threshold,
            scroll_top_visible: false,
            header_condensed: false,
        }
    }

    pub fn update(&mut self, scroll_y: f64) -> ChromeChange {
        let mut change = ChromeChange::default();

        let scroll_top_visible = scroll_y > self.scroll_top_threshold;
        if scroll_top_visible != self.scroll_top_visible {
            self.scroll_top_visible = scroll_top_visible;
            change.scroll_top_visible = Some(scroll_top_visible);
        }

        let header_condensed = scroll_y > self.header_threshold;
        if header_condensed != self.header_condensed {
            self.header_condensed = header_condensed;
            change.header_condensed = Some(header_condensed);
        }

        change
    }
}
