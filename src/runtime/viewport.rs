/// Identifies one tracked element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// One intersection report for an observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub element: ElementId,
    /// Fraction of the element's area inside the viewport, 0.0 to 1.0.
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// True when the entry counts as "visible" at the given threshold.
    pub fn meets(&self, threshold: f64) -> bool {
        self.is_intersecting && self.intersection_ratio >= threshold
    }
}

/// What an intersection callback wants after handling an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveControl {
    Continue,
    Unobserve,
}

pub type IntersectionCallback = Box<dyn FnMut(IntersectionEntry) -> ObserveControl + Send>;

/// Host primitive that reports when elements enter the viewport.
pub trait Viewport: Send + Sync {
    /// Starts observing `element`. The callback may run synchronously from
    /// inside this call if the host already knows the element's position.
    fn observe(
        &self,
        element: ElementId,
        threshold: f64,
        callback: IntersectionCallback,
    ) -> Box<dyn Observation>;
}

/// A live registration returned by [`Viewport::observe`].
pub trait Observation: Send {
    /// Releases the registration. Calling it more than once is harmless.
    fn disconnect(&mut self);
}

/// Clamps a threshold into `[0, 1]`; NaN maps to 0.
pub fn normalize_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_needs_intersection_and_ratio() {
        let entry = IntersectionEntry {
            element: ElementId(1),
            intersection_ratio: 0.25,
            is_intersecting: true,
        };
        assert!(entry.meets(0.1));
        assert!(entry.meets(0.25));
        assert!(!entry.meets(0.3));

        let outside = IntersectionEntry { is_intersecting: false, intersection_ratio: 0.0, ..entry };
        assert!(!outside.meets(0.0));
    }

    #[test]
    fn thresholds_are_clamped() {
        assert_eq!(normalize_threshold(-0.5), 0.0);
        assert_eq!(normalize_threshold(1.5), 1.0);
        assert_eq!(normalize_threshold(f64::NAN), 0.0);
        assert_eq!(normalize_threshold(0.3), 0.3);
    }
}
