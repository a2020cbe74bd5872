use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::runtime::frames::AnimationHost;
use crate::runtime::viewport::{
    normalize_threshold, ElementId, IntersectionCallback, ObserveControl, Observation, Viewport,
};

pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.15;
/// Threshold used by the section wrapper.
pub const SECTION_REVEAL_THRESHOLD: f64 = 0.1;
/// Delay added per item in a staggered grid.
pub const REVEAL_STAGGER_MS: u64 = 100;

/// Shared one-shot visibility flag. Starts false, flips to true once.
#[derive(Debug, Clone, Default)]
pub struct VisibilityFlag(Arc<AtomicBool>);

impl VisibilityFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns true only for the call that flipped the flag.
    fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

pub type VisibleCallback = Box<dyn FnOnce() + Send>;

/// Watches `element` until it first meets `threshold`, then raises `flag`,
/// runs `on_visible` and stops observing.
///
/// A missing element is not an error: nothing is observed and `None` comes back.
pub fn observe_once(
    viewport: &dyn Viewport,
    element: Option<ElementId>,
    threshold: f64,
    flag: VisibilityFlag,
    on_visible: Option<VisibleCallback>,
) -> Option<Box<dyn Observation>> {
    let element = element?;
    let threshold = normalize_threshold(threshold);
    let mut on_visible = on_visible;

    let callback: IntersectionCallback = Box::new(move |entry| {
        if !entry.meets(threshold) {
            return ObserveControl::Continue;
        }
        if flag.raise() {
            tracing::trace!("Element {:?} became visible at ratio {}", entry.element, entry.intersection_ratio);
            if let Some(notify) = on_visible.take() {
                notify();
            }
        }
        ObserveControl::Unobserve
    });

    Some(viewport.observe(element, threshold, callback))
}

/// Reveal state for one element. Dropping it releases the observation.
pub struct ScrollReveal {
    viewport: Arc<dyn Viewport>,
    element: Option<ElementId>,
    threshold: f64,
    flag: VisibilityFlag,
    observation: Option<Box<dyn Observation>>,
}

impl ScrollReveal {
    pub fn mount(host: &AnimationHost, element: Option<ElementId>, threshold: f64) -> Self {
        let mut reveal = Self {
            viewport: host.viewport.clone(),
            element,
            threshold: normalize_threshold(threshold),
            flag: VisibilityFlag::new(),
            observation: None,
        };
        reveal.subscribe();
        reveal
    }

    pub fn mount_default(host: &AnimationHost, element: Option<ElementId>) -> Self {
        Self::mount(host, element, DEFAULT_REVEAL_THRESHOLD)
    }

    pub fn is_visible(&self) -> bool {
        self.flag.get()
    }

    /// Handle that stays readable after the reveal is unmounted.
    pub fn flag(&self) -> VisibilityFlag {
        self.flag.clone()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Re-subscribes at a new threshold. Once visible, the flag stays set and
    /// nothing is observed again.
    pub fn set_threshold(&mut self, threshold: f64) {
        let threshold = normalize_threshold(threshold);
        if threshold == self.threshold {
            return;
        }
        self.threshold = threshold;
        self.release();
        if !self.flag.get() {
            self.subscribe();
        }
    }

    fn subscribe(&mut self) {
        self.observation = observe_once(
            self.viewport.as_ref(),
            self.element,
            self.threshold,
            self.flag.clone(),
            None,
        );
    }

    fn release(&mut self) {
        if let Some(mut observation) = self.observation.take() {
            observation.disconnect();
        }
    }
}

impl Drop for ScrollReveal {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStyle {
    Hidden,
    Revealed,
}

/// A page section that fades in once, optionally after a delay.
pub struct RevealSection {
    reveal: ScrollReveal,
    delay_ms: u64,
}

impl RevealSection {
    pub fn mount(host: &AnimationHost, element: Option<ElementId>, delay_ms: u64) -> Self {
        Self {
            reveal: ScrollReveal::mount(host, element, SECTION_REVEAL_THRESHOLD),
            delay_ms,
        }
    }

    /// Section at position `index` of a grid, delayed by [`REVEAL_STAGGER_MS`] per step.
    pub fn staggered(host: &AnimationHost, element: Option<ElementId>, index: usize) -> Self {
        Self::mount(host, element, index as u64 * REVEAL_STAGGER_MS)
    }

    pub fn style(&self) -> RevealStyle {
        if self.reveal.is_visible() {
            RevealStyle::Revealed
        } else {
            RevealStyle::Hidden
        }
    }

    pub fn transition_delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn is_visible(&self) -> bool {
        self.reveal.is_visible()
    }
}
