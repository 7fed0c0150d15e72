//! Sensitivity dial → impact threshold mapping.
//!
//! The user-facing dial runs from 1 (least sensitive, needs a hard hit) to
//! 10 (most sensitive).  It maps linearly onto the impact threshold in g.
//! Out-of-range values are clamped, never rejected.

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f32 = 9.806_65;

pub const MIN_SENSITIVITY: i32 = 1;
pub const MAX_SENSITIVITY: i32 = 10;
pub const DEFAULT_SENSITIVITY: i32 = 5;

/// Impact threshold at sensitivity 1.
pub const LEAST_SENSITIVE_IMPACT_G: f32 = 9.0;
/// Impact threshold at sensitivity 10.
pub const MOST_SENSITIVE_IMPACT_G: f32 = 2.5;

/// Map a 1–10 sensitivity to an impact threshold in g.
pub fn to_impact_g(sensitivity: i32) -> f32 {
    let clamped = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    let t = (clamped - MIN_SENSITIVITY) as f32 / (MAX_SENSITIVITY - MIN_SENSITIVITY) as f32;
    LEAST_SENSITIVE_IMPACT_G - t * (LEAST_SENSITIVE_IMPACT_G - MOST_SENSITIVE_IMPACT_G)
}

/// Same threshold in m/s², for platforms reporting raw metric units.
pub fn to_impact_ms2(sensitivity: i32) -> f32 {
    to_impact_g(sensitivity) * STANDARD_GRAVITY
}
