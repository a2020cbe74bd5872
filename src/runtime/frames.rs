use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::{Handle, TryCurrentError};

use crate::config::LandingConfig;
use crate::runtime::viewport::Viewport;

/// Monotonic time source in milliseconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

pub type FrameCallback = Box<dyn FnOnce(f64) + Send>;

/// Schedules work for the next animation frame.
pub trait FrameScheduler: Send + Sync {
    /// Runs `callback` once with the frame timestamp in clock milliseconds.
    fn request_frame(&self, callback: FrameCallback);
}

/// Everything a page component needs from its host.
#[derive(Clone)]
pub struct AnimationHost {
    pub viewport: Arc<dyn Viewport>,
    pub clock: Arc<dyn Clock>,
    pub frames: Arc<dyn FrameScheduler>,
}

impl AnimationHost {
    pub fn new(
        viewport: Arc<dyn Viewport>,
        clock: Arc<dyn Clock>,
        frames: Arc<dyn FrameScheduler>,
    ) -> Self {
        Self { viewport, clock, frames }
    }

    /// Wires a monotonic clock and a tokio frame loop around the embedder's viewport.
    /// Fails when called outside a tokio runtime.
    pub fn tokio(viewport: Arc<dyn Viewport>, config: &LandingConfig) -> Result<Self, TryCurrentError> {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
        let frames = TokioFrameScheduler::current(clock.clone())?.with_interval(config.frame_interval);
        Ok(Self::new(viewport, clock, Arc::new(frames)))
    }
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Frame loop driven by tokio timers, one task per requested frame.
pub struct TokioFrameScheduler {
    handle: Handle,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl TokioFrameScheduler {
    pub fn new(handle: Handle, clock: Arc<dyn Clock>) -> Self {
        Self {
            handle,
            clock,
            interval: Duration::from_millis(crate::config::DEFAULT_FRAME_INTERVAL_MS),
        }
    }

    pub fn current(clock: Arc<dyn Clock>) -> Result<Self, TryCurrentError> {
        Ok(Self::new(Handle::try_current()?, clock))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl FrameScheduler for TokioFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let clock = self.clock.clone();
        let interval = self.interval;
        self.handle.spawn(async move {
            tokio::time::sleep(interval).await;
            callback(clock.now());
        });
    }
}
