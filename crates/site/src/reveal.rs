/// One watched element and whether it has been revealed.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealTarget<K> {
    pub key: K,
    pub revealed: bool,
}

/// Result of feeding one intersection sample to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The target crossed the threshold and must receive the revealed class.
    Revealed,
    BelowThreshold,
    AlreadyRevealed,
    Untracked,
}

/// Tracks one-shot reveal state for a set of page elements.
///
/// Keys only need `PartialEq` so DOM handles can be used directly.
#[derive(Debug, Clone)]
pub struct RevealObserver<K> {
    threshold: f64,
    targets: Vec<RevealTarget<K>>,
}

// Browsers report the crossing ratio with float noise around the threshold.
const RATIO_EPSILON: f64 = 1e-6;

impl<K> RevealObserver<K>
where
    K: PartialEq,
{
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            targets: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Starts watching `key`. Returns false when it is already known.
    pub fn observe(&mut self, key: K) -> bool {
        if self.targets.iter().any(|target| target.key == key) {
            return false;
        }
        self.targets.push(RevealTarget {
            key,
            revealed: false,
        });
        true
    }

    /// Applies one intersection sample. Reveal is monotonic: once a target is
    /// revealed no later sample changes it.
    pub fn on_intersection(&mut self, key: &K, is_intersecting: bool, ratio: f64) -> RevealOutcome {
        let threshold = self.threshold;
        let Some(target) = self.targets.iter_mut().find(|target| target.key == *key) else {
            return RevealOutcome::Untracked;
        };
        if target.revealed {
            return RevealOutcome::AlreadyRevealed;
        }
        if !is_intersecting || ratio + RATIO_EPSILON < threshold {
            return RevealOutcome::BelowThreshold;
        }

        target.revealed = true;
        RevealOutcome::Revealed
    }

    pub fn is_revealed(&self, key: &K) -> bool {
        self.targets
            .iter()
            .any(|target| target.key == *key && target.revealed)
    }

    /// Targets still waiting for their first reveal.
    pub fn pending(&self) -> impl Iterator<Item = &K> {
        self.targets
            .iter()
            .filter(|target| !target.revealed)
            .map(|target| &target.key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// True when nothing is left to watch and the host observer can be dropped.
    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }

    pub fn targets(&self) -> &[RevealTarget<K>] {
        &self.targets
    }
}

/// Visible fraction of an element's box inside a viewport whose bottom edge is
/// shifted by `bottom_margin` (negative shrinks it, like a CSS root margin).
///
/// Used when the host has no `IntersectionObserver`.
pub fn intersection_ratio(top: f64, bottom: f64, viewport_height: f64, bottom_margin: f64) -> f64 {
    let height = bottom - top;
    if height <= 0.0 {
        return 0.0;
    }

    let viewport_bottom = viewport_height + bottom_margin;
    let visible = bottom.min(viewport_bottom) - top.max(0.0);
    (visible / height).clamp(0.0, 1.0)
}

/// Extracts the bottom component, in pixels, of a CSS margin shorthand such as
/// `"0px 0px -50px 0px"`. Unparseable input is treated as zero.
pub fn bottom_margin_px(root_margin: &str) -> f64 {
    let parts = root_margin.split_whitespace().collect::<Vec<_>>();
    let bottom = match parts.as_slice() {
        [all] => *all,
        [vertical, _] => *vertical,
        [_, _, bottom] | [_, _, bottom, _] => *bottom,
        _ => return 0.0,
    };

    bottom
        .trim_end_matches("px")
        .parse::<f64>()
        .unwrap_or(0.0)
}
