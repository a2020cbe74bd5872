//! Deterministic host capabilities.
//!
//! Time, frames and scrolling only move when the caller says so, which lets
//! page logic run without a rendering engine.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::runtime::frames::{AnimationHost, Clock, FrameCallback, FrameScheduler};
use crate::runtime::viewport::{
    ElementId, IntersectionCallback, IntersectionEntry, ObserveControl, Observation, Viewport,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now: Mutex::new(start_ms) }
    }

    pub fn set(&self, ms: f64) {
        *lock(&self.now) = ms;
    }

    pub fn advance(&self, ms: f64) -> f64 {
        let mut now = lock(&self.now);
        *now += ms;
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *lock(&self.now)
    }
}

/// Queues frame callbacks until [`ManualFrames::run_frame`] is called.
#[derive(Default)]
pub struct ManualFrames {
    queue: Mutex<Vec<FrameCallback>>,
    requested: Mutex<u64>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Total frames ever requested.
    pub fn requested(&self) -> u64 {
        *lock(&self.requested)
    }

    /// Runs the callbacks queued before this call. Frames they request wait
    /// for the next call.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        let due = std::mem::take(&mut *lock(&self.queue));
        let count = due.len();
        for callback in due {
            callback(timestamp);
        }
        count
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) {
        *lock(&self.requested) += 1;
        lock(&self.queue).push(callback);
    }
}

struct Registration {
    element: ElementId,
    threshold: f64,
    callback: Option<IntersectionCallback>,
}

#[derive(Default)]
struct ViewportState {
    next_id: u64,
    registrations: BTreeMap<u64, Registration>,
    ratios: HashMap<ElementId, f64>,
    delivered: u64,
}

/// A scripted viewport. Elements get a visible ratio through
/// [`ManualViewport::scroll_to`]; observers of that element are notified.
#[derive(Default)]
pub struct ManualViewport {
    state: Arc<Mutex<ViewportState>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `element` to the given visible ratio and notifies its observers.
    /// Returns how many callbacks ran.
    pub fn scroll_to(&self, element: ElementId, ratio: f64) -> usize {
        let ids: Vec<u64> = {
            let mut state = lock(&self.state);
            state.ratios.insert(element, ratio);
            state
                .registrations
                .iter()
                .filter(|(_, registration)| registration.element == element)
                .map(|(id, _)| *id)
                .collect()
        };

        let mut delivered = 0;
        for id in ids {
            let taken = {
                let mut state = lock(&self.state);
                state
                    .registrations
                    .get_mut(&id)
                    .and_then(|registration| registration.callback.take())
            };
            let Some(mut callback) = taken else { continue };

            let control = callback(entry_for(element, ratio));
            delivered += 1;

            // Dropped outside the lock; a callback may own observation handles
            let leftover = {
                let mut state = lock(&self.state);
                state.delivered += 1;
                match control {
                    ObserveControl::Continue => match state.registrations.get_mut(&id) {
                        Some(registration) => {
                            registration.callback = Some(callback);
                            None
                        }
                        None => Some(callback),
                    },
                    ObserveControl::Unobserve => {
                        let removed = state.registrations.remove(&id);
                        drop(removed);
                        Some(callback)
                    }
                }
            };
            drop(leftover);
        }
        delivered
    }

    /// Registrations still receiving entries.
    pub fn active_observations(&self) -> usize {
        lock(&self.state).registrations.len()
    }

    pub fn observers_of(&self, element: ElementId) -> usize {
        lock(&self.state)
            .registrations
            .values()
            .filter(|registration| registration.element == element)
            .count()
    }

    /// Thresholds currently registered for `element`, in registration order.
    pub fn thresholds_of(&self, element: ElementId) -> Vec<f64> {
        lock(&self.state)
            .registrations
            .values()
            .filter(|registration| registration.element == element)
            .map(|registration| registration.threshold)
            .collect()
    }

    /// Total callbacks delivered so far.
    pub fn delivered(&self) -> u64 {
        lock(&self.state).delivered
    }
}

fn entry_for(element: ElementId, ratio: f64) -> IntersectionEntry {
    IntersectionEntry {
        element,
        intersection_ratio: ratio,
        is_intersecting: ratio > 0.0,
    }
}

impl Viewport for ManualViewport {
    fn observe(
        &self,
        element: ElementId,
        threshold: f64,
        mut callback: IntersectionCallback,
    ) -> Box<dyn Observation> {
        let (id, known_ratio) = {
            let mut state = lock(&self.state);
            let id = state.next_id;
            state.next_id += 1;
            (id, state.ratios.get(&element).copied())
        };
        let handle = ManualObservation {
            id,
            state: Arc::downgrade(&self.state),
        };

        // Initial report for elements that already have a position
        if let Some(ratio) = known_ratio {
            let control = callback(entry_for(element, ratio));
            lock(&self.state).delivered += 1;
            if control == ObserveControl::Unobserve {
                return Box::new(handle);
            }
        }

        lock(&self.state).registrations.insert(
            id,
            Registration {
                element,
                threshold,
                callback: Some(callback),
            },
        );
        Box::new(handle)
    }
}

struct ManualObservation {
    id: u64,
    state: Weak<Mutex<ViewportState>>,
}

impl Observation for ManualObservation {
    fn disconnect(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let removed = lock(&state).registrations.remove(&self.id);
            drop(removed);
        }
    }
}

/// Manual clock, frames and viewport wired into one [`AnimationHost`].
pub struct ManualHost {
    pub clock: Arc<ManualClock>,
    pub frames: Arc<ManualFrames>,
    pub viewport: Arc<ManualViewport>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::new(0.0)),
            frames: Arc::new(ManualFrames::new()),
            viewport: Arc::new(ManualViewport::new()),
        }
    }

    pub fn host(&self) -> AnimationHost {
        AnimationHost::new(self.viewport.clone(), self.clock.clone(), self.frames.clone())
    }

    /// Advances the clock by `step_ms` and runs one frame at the new time.
    pub fn advance_frame(&self, step_ms: f64) -> usize {
        let now = self.clock.advance(step_ms);
        self.frames.run_frame(now)
    }

    /// Steps frames until none are pending or `max_frames` ran.
    pub fn run_until_idle(&self, step_ms: f64, max_frames: usize) -> usize {
        let mut ran = 0;
        while ran < max_frames && self.frames.pending() > 0 {
            self.advance_frame(step_ms);
            ran += 1;
        }
        ran
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}
