//! Per-argument input sanitization shared by every calculator operation.
//!
//! Each function resolves one argument independently:
//! - NaN or ±∞ becomes the argument's default.
//! - A negative value becomes the default (`0` for counts/offsets, [`crate::Defaults::item_height`] for
//!   heights).
//! - A value above the sanity ceiling is clamped to the ceiling.
//! - Anything else is used as-is.
//!
//! None of these functions panic, and every returned value is finite.

use crate::defaults::DEFAULTS;

#[inline]
fn resolve(value: f64, default: f64, ceiling: f64, _what: &'static str) -> f64 {
    let out = if !value.is_finite() || value < 0.0 {
        default
    } else if value > ceiling {
        ceiling
    } else {
        return value;
    };
    rtrace!(argument = _what, value, resolved = out, "sanitized input");
    out
}

/// Truncates a finite, non-negative value toward zero.
///
/// Valid for every value the sanitizers produce (all are far below `u64::MAX`).
#[inline]
pub(crate) fn floor_nonneg(value: f64) -> f64 {
    (value as u64) as f64
}

/// Scroll offset in pixels.
pub fn scroll_offset(value: f64) -> f64 {
    resolve(value, 0.0, DEFAULTS.max_offset, "scroll_offset")
}

/// Viewport height in pixels.
pub fn viewport_height(value: f64) -> f64 {
    resolve(value, 0.0, DEFAULTS.max_offset, "viewport_height")
}

/// Number of items, floored to a whole count.
pub fn item_count(value: f64) -> f64 {
    floor_nonneg(resolve(value, 0.0, DEFAULTS.max_item_count, "item_count"))
}

/// Item index, floored to a whole index.
pub fn index(value: f64) -> f64 {
    floor_nonneg(resolve(value, 0.0, DEFAULTS.max_item_count, "index"))
}

/// Overscan in items, floored to a whole count.
pub fn overscan(value: f64) -> f64 {
    floor_nonneg(resolve(
        value,
        DEFAULTS.overscan as f64,
        DEFAULTS.max_overscan,
        "overscan",
    ))
}

/// Item height in pixels.
///
/// Zero counts as non-positive and falls back to the default height. The result is *not* yet
/// floored at 1px; see [`effective_item_height`].
pub fn item_height(value: f64) -> f64 {
    let value = if value == 0.0 { f64::NAN } else { value };
    resolve(
        value,
        DEFAULTS.item_height,
        DEFAULTS.max_item_height,
        "item_height",
    )
}

/// The strictly positive height actually used in arithmetic.
pub fn effective_item_height(value: f64) -> f64 {
    item_height(value).max(1.0)
}

