//! Response curves and dead zones.

use oxboard_gesture_model::{InterpolationMode, ValueRange};

/// Apply a response curve to a value in [0, 1].
///
/// Every curve maps 0 to 0 and 1 to 1 and is non-decreasing in between.
pub fn apply_curve(mode: InterpolationMode, x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    match mode {
        InterpolationMode::Linear => x,
        InterpolationMode::Logarithmic => (9.0 * x + 1.0).log10(),
        InterpolationMode::Exponential => (10f64.powf(x) - 1.0) / 9.0,
        InterpolationMode::Quadratic => x * x,
        InterpolationMode::Cubic => x * x * x,
        InterpolationMode::Step => {
            if x >= 0.5 {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Map `value` from `input` into `output` through a curve.
///
/// The normalized value is clamped, so the result always lies in `output`.
pub fn interpolate(
    value: f64,
    input: &ValueRange,
    output: &ValueRange,
    mode: InterpolationMode,
    inverted: bool,
) -> f64 {
    let span = input.span();
    let normalized = if span > 0.0 {
        ((value - input.min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let normalized = if inverted { 1.0 - normalized } else { normalized };
    let curved = apply_curve(mode, normalized);
    (output.min + curved * output.span()).clamp(output.min, output.max)
}

/// Zero out `|value| < dead_zone` and rescale the rest so ±1 stays ±1.
pub fn apply_dead_zone(value: f64, dead_zone: f64) -> f64 {
    if dead_zone <= 0.0 {
        return value;
    }
    if dead_zone >= 1.0 {
        return 0.0;
    }
    let magnitude = value.abs();
    if magnitude < dead_zone {
        0.0
    } else {
        value.signum() * (magnitude - dead_zone) / (1.0 - dead_zone)
    }
}

/// Dead zone applied to a value already mapped into `output`.
///
/// When the range spans zero the zone is measured in units of its largest
/// magnitude around zero, so the range extreme maps to itself. Otherwise it
/// is measured from `output.min` across the span. The result stays in
/// `output` either way.
pub fn apply_dead_zone_in(value: f64, dead_zone: f64, output: &ValueRange) -> f64 {
    let zoned = if output.contains(0.0) {
        let scale = output.magnitude();
        if scale <= 0.0 {
            return value;
        }
        apply_dead_zone(value / scale, dead_zone) * scale
    } else {
        let span = output.span();
        if span <= 0.0 {
            return value;
        }
        output.min + apply_dead_zone((value - output.min) / span, dead_zone) * span
    };
    zoned.clamp(output.min, output.max)
}
