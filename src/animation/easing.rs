/// Cubic ease-out: fast start, decelerating into the end value.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    1.0 - (1.0 - p).powi(3)
}

/// Fraction of the animation completed after `elapsed_ms`.
///
/// A non-positive or non-finite duration counts as already complete so the
/// first frame lands on the target.
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if !(duration_ms.is_finite() && duration_ms > 0.0) {
        return 1.0;
    }
    if elapsed_ms.is_nan() {
        return 0.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

/// Displayed counter value `elapsed_ms` into an animation towards `target`.
pub fn count_up_value(target: u64, elapsed_ms: f64, duration_ms: f64) -> u64 {
    let p = progress(elapsed_ms, duration_ms);
    if p >= 1.0 {
        return target;
    }
    let eased = (ease_out_cubic(p) * target as f64).floor();
    (eased as u64).min(target)
}
