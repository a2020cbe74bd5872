use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::animation::easing;
use crate::animation::scroll_reveal::{observe_once, VisibilityFlag};
use crate::runtime::frames::{AnimationHost, Clock, FrameScheduler};
use crate::runtime::viewport::{ElementId, Observation};

/// Visibility needed before a gated counter starts. Observed separately from
/// any reveal on the same element.
pub const COUNT_UP_VISIBILITY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_COUNT_UP_DURATION_MS: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountUpOptions {
    pub target: u64,
    pub duration_ms: f64,
    /// Wait for the element to scroll into view before starting.
    pub start_on_visible: bool,
}

impl CountUpOptions {
    pub fn new(target: u64) -> Self {
        Self {
            target,
            duration_ms: DEFAULT_COUNT_UP_DURATION_MS,
            start_on_visible: true,
        }
    }

    pub fn duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn immediately(mut self) -> Self {
        self.start_on_visible = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountUpPhase {
    Idle,
    Running,
    Finished,
}

type ValueListener = Box<dyn FnMut(u64) + Send>;

struct CountUpState {
    target: u64,
    duration_ms: f64,
    value: u64,
    last_emitted: Option<u64>,
    phase: CountUpPhase,
    started_at: f64,
}

struct CountUpInner {
    state: Mutex<CountUpState>,
    clock: Arc<dyn Clock>,
    frames: Arc<dyn FrameScheduler>,
    listener: Mutex<Option<ValueListener>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CountUpInner {
    fn start(self: &Arc<Self>) {
        let settled = {
            let mut state = lock(&self.state);
            if state.phase != CountUpPhase::Idle {
                return;
            }
            if state.target == 0 {
                state.phase = CountUpPhase::Finished;
                Some(0)
            } else {
                state.started_at = self.clock.now();
                state.phase = CountUpPhase::Running;
                None
            }
        };

        match settled {
            // Nothing to animate
            Some(value) => self.emit(value),
            None => self.schedule(),
        }
    }

    fn schedule(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.frames.request_frame(Box::new(move |timestamp| {
            // Unmounted counters ignore frames that were already queued
            if let Some(inner) = weak.upgrade() {
                inner.step(timestamp);
            }
        }));
    }

    fn step(self: &Arc<Self>, timestamp: f64) {
        let (value, finished) = {
            let mut state = lock(&self.state);
            if state.phase != CountUpPhase::Running {
                return;
            }
            let elapsed = timestamp - state.started_at;
            let progress = easing::progress(elapsed, state.duration_ms);
            let value = easing::count_up_value(state.target, elapsed, state.duration_ms).max(state.value);
            state.value = value;
            if progress >= 1.0 {
                state.phase = CountUpPhase::Finished;
            }
            (value, state.phase == CountUpPhase::Finished)
        };

        self.emit(value);
        if !finished {
            self.schedule();
        }
    }

    fn emit(&self, value: u64) {
        {
            let mut state = lock(&self.state);
            if state.last_emitted == Some(value) {
                return;
            }
            state.last_emitted = Some(value);
        }
        if let Some(listener) = lock(&self.listener).as_mut() {
            listener(value);
        }
    }
}

/// Animated counter that eases from 0 to a target once, then stays put.
///
/// Dropping the counter releases its visibility gate and turns any frame
/// still queued with the host into a no-op.
pub struct CountUp {
    inner: Arc<CountUpInner>,
    gate: Option<Box<dyn Observation>>,
}

impl CountUp {
    pub fn mount(host: &AnimationHost, element: Option<ElementId>, options: CountUpOptions) -> Self {
        Self::build(host, element, options, None)
    }

    /// Like [`CountUp::mount`], with `listener` called for every change of the
    /// displayed value.
    pub fn mount_with_listener<F>(
        host: &AnimationHost,
        element: Option<ElementId>,
        options: CountUpOptions,
        listener: F,
    ) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        Self::build(host, element, options, Some(Box::new(listener)))
    }

    fn build(
        host: &AnimationHost,
        element: Option<ElementId>,
        options: CountUpOptions,
        listener: Option<ValueListener>,
    ) -> Self {
        let inner = Arc::new(CountUpInner {
            state: Mutex::new(CountUpState {
                target: options.target,
                duration_ms: options.duration_ms,
                value: 0,
                last_emitted: None,
                phase: CountUpPhase::Idle,
                started_at: 0.0,
            }),
            clock: host.clock.clone(),
            frames: host.frames.clone(),
            listener: Mutex::new(listener),
        });

        if !options.start_on_visible {
            inner.start();
            return Self { inner, gate: None };
        }

        let weak = Arc::downgrade(&inner);
        let gate = observe_once(
            host.viewport.as_ref(),
            element,
            COUNT_UP_VISIBILITY_THRESHOLD,
            VisibilityFlag::new(),
            Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.start();
                }
            })),
        );
        if gate.is_none() {
            tracing::debug!("Count-up towards {} has no element, it will not start", options.target);
        }

        Self { inner, gate }
    }

    /// Currently displayed value.
    pub fn value(&self) -> u64 {
        lock(&self.inner.state).value
    }

    pub fn target(&self) -> u64 {
        lock(&self.inner.state).target
    }

    pub fn phase(&self) -> CountUpPhase {
        lock(&self.inner.state).phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == CountUpPhase::Finished
    }
}

impl Drop for CountUp {
    fn drop(&mut self) {
        if let Some(mut gate) = self.gate.take() {
            gate.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::manual::ManualHost;

    const STAT: ElementId = ElementId(42);

    fn recorder() -> (Arc<Mutex<Vec<u64>>>, impl FnMut(u64) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value| sink.lock().unwrap().push(value))
    }

    #[test]
    fn immediate_counter_runs_to_target_and_stops() {
        let manual = ManualHost::new();
        let (seen, listener) = recorder();
        let counter = CountUp::mount_with_listener(
            &manual.host(),
            None,
            CountUpOptions::new(280).immediately(),
            listener,
        );
        assert_eq!(counter.phase(), CountUpPhase::Running);
        assert_eq!(manual.frames.pending(), 1);

        let frames = manual.run_until_idle(16.0, 1000);
        assert!(frames >= 2000 / 16);
        assert!(counter.is_finished());
        assert_eq!(counter.value(), 280);
        assert_eq!(manual.frames.pending(), 0);

        let seen = seen.lock().unwrap().clone();
        assert!(seen[0] > 0 && seen[0] < 280);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(seen.iter().filter(|v| **v == 280).count(), 1);
        assert_eq!(seen.last(), Some(&280));

        // Extra frames after the end change nothing
        let requested = manual.frames.requested();
        manual.advance_frame(16.0);
        assert_eq!(manual.frames.requested(), requested);
    }

    #[test]
    fn eased_values_follow_frame_timestamps() {
        let manual = ManualHost::new();
        manual.clock.set(1_000.0);
        let counter = CountUp::mount(&manual.host(), None, CountUpOptions::new(100).duration_ms(1000.0).immediately());

        manual.frames.run_frame(1_000.0);
        assert_eq!(counter.value(), 0);
        manual.frames.run_frame(1_500.0);
        assert_eq!(counter.value(), 87);
        manual.frames.run_frame(2_000.0);
        assert_eq!(counter.value(), 100);
        assert!(counter.is_finished());
    }

    #[test]
    fn zero_target_settles_without_frames() {
        let manual = ManualHost::new();
        let (seen, listener) = recorder();
        let counter = CountUp::mount_with_listener(&manual.host(), None, CountUpOptions::new(0).immediately(), listener);

        assert!(counter.is_finished());
        assert_eq!(counter.value(), 0);
        assert_eq!(manual.frames.requested(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn non_positive_duration_jumps_on_first_frame() {
        for duration in [0.0, -250.0] {
            let manual = ManualHost::new();
            let (seen, listener) = recorder();
            let counter = CountUp::mount_with_listener(
                &manual.host(),
                None,
                CountUpOptions::new(16).duration_ms(duration).immediately(),
                listener,
            );

            assert_eq!(manual.advance_frame(16.0), 1);
            assert!(counter.is_finished());
            assert_eq!(*seen.lock().unwrap(), vec![16]);
            assert_eq!(manual.frames.pending(), 0);
        }
    }

    #[test]
    fn gated_counter_waits_for_visibility() {
        let manual = ManualHost::new();
        let counter = CountUp::mount(&manual.host(), Some(STAT), CountUpOptions::new(13));
        assert_eq!(counter.phase(), CountUpPhase::Idle);
        assert_eq!(manual.frames.pending(), 0);

        manual.viewport.scroll_to(STAT, 0.2);
        assert_eq!(counter.phase(), CountUpPhase::Idle);

        manual.viewport.scroll_to(STAT, COUNT_UP_VISIBILITY_THRESHOLD);
        assert_eq!(counter.phase(), CountUpPhase::Running);
        assert_eq!(manual.viewport.observers_of(STAT), 0);

        manual.run_until_idle(16.0, 1000);
        assert_eq!(counter.value(), 13);
    }

    #[test]
    fn gated_counter_without_element_never_starts() {
        let manual = ManualHost::new();
        let counter = CountUp::mount(&manual.host(), None, CountUpOptions::new(13));
        assert_eq!(manual.viewport.active_observations(), 0);
        assert_eq!(counter.phase(), CountUpPhase::Idle);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn counter_does_not_restart_when_seen_again() {
        let manual = ManualHost::new();
        let counter = CountUp::mount(&manual.host(), Some(STAT), CountUpOptions::new(5).duration_ms(100.0));
        manual.viewport.scroll_to(STAT, 1.0);
        manual.run_until_idle(16.0, 100);
        let requested = manual.frames.requested();

        manual.viewport.scroll_to(STAT, 0.0);
        manual.viewport.scroll_to(STAT, 1.0);
        assert_eq!(manual.frames.requested(), requested);
        assert_eq!(counter.value(), 5);
    }

    #[test]
    fn unmount_mid_animation_stops_frames() {
        let manual = ManualHost::new();
        let (seen, listener) = recorder();
        let counter = CountUp::mount_with_listener(
            &manual.host(),
            None,
            CountUpOptions::new(1000).immediately(),
            listener,
        );
        manual.advance_frame(16.0);
        manual.advance_frame(16.0);
        let emitted = seen.lock().unwrap().len();

        drop(counter);
        assert_eq!(manual.frames.pending(), 1);
        manual.advance_frame(16.0);
        assert_eq!(manual.frames.pending(), 0);
        assert_eq!(seen.lock().unwrap().len(), emitted);
    }

    #[test]
    fn unmount_before_visible_releases_gate() {
        let manual = ManualHost::new();
        let counter = CountUp::mount(&manual.host(), Some(STAT), CountUpOptions::new(7));
        assert_eq!(manual.viewport.observers_of(STAT), 1);
        drop(counter);
        assert_eq!(manual.viewport.observers_of(STAT), 0);
    }
}
