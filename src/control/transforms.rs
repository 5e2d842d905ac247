// Angle helpers shared by the rectifier control loops

use core::f32::consts::{PI, TAU};
use libm::{cosf, fmodf, sinf};

// Enable idsp-based fast trigonometric functions
const USE_IDSP_COSSIN: bool = true;

/// Combined sine and cosine of an angle
///
/// # Arguments
/// * `theta` - Angle in radians, expected within [0, 2π]
///
/// # Returns
/// Tuple of (sin θ, cos θ)
///
/// # Implementation
/// Uses idsp::cossin() for fast trigonometric calculation (~40 cycles on
/// Cortex-M) compared to libm::cosf/sinf (~100-200 cycles). Can be switched
/// via USE_IDSP_COSSIN.
pub fn sin_cos(theta: f32) -> (f32, f32) {
    if USE_IDSP_COSSIN {
        sin_cos_idsp(theta)
    } else {
        sin_cos_libm(theta)
    }
}

/// sin/cos using idsp::cossin() (fast, ~40 cycles on Cortex-M)
#[inline]
fn sin_cos_idsp(theta: f32) -> (f32, f32) {
    // Convert theta (radians, 0 to 2π) to idsp phase format (i32, full scale)
    // idsp uses i32::MIN (-2^31) to i32::MAX (2^31-1) to represent -π to π
    // First normalize theta from [0, 2π] to [-π, π]
    let normalized_theta = if theta > PI { theta - TAU } else { theta };

    // Then scale to i32 range: phase = normalized_theta * (2^31 / π)
    const SCALE: f32 = 2147483648.0 / PI; // 2^31 / π
    let phase: i32 = (normalized_theta * SCALE) as i32;

    // cossin() returns (cos, sin) as (i32, i32) in range [-2^31, 2^31-1]
    let (cos_i32, sin_i32) = idsp::cossin(phase);

    // Convert i32 to f32 and normalize to [-1.0, 1.0]
    const I32_TO_F32: f32 = 1.0 / 2147483648.0; // 1 / 2^31
    (sin_i32 as f32 * I32_TO_F32, cos_i32 as f32 * I32_TO_F32)
}

/// sin/cos using libm (slower, ~100-200 cycles, but more familiar)
#[inline]
fn sin_cos_libm(theta: f32) -> (f32, f32) {
    (sinf(theta), cosf(theta))
}

/// Wrap an angle into [0, 2π) by true modulo
///
/// # Arguments
/// * `angle` - Angle in radians, any magnitude
///
/// # Returns
/// Equivalent angle in [0, 2π)
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = fmodf(angle, TAU);
    if wrapped < 0.0 {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Single-sided wrap of a reference phase toward [0, 2π].
///
/// Applies at most one correction: add 2π if negative, subtract 2π if above
/// 2π. Inputs further out than one turn keep their residual until the next
/// cycle recomputes them; that transient is accepted policy for the phase
/// references, not an error to hide.
pub fn wrap_phase(angle: f32) -> f32 {
    if angle < 0.0 {
        angle + TAU
    } else if angle > TAU {
        angle - TAU
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_sin_cos_matches_libm() {
        for theta in [0.0f32, 0.5, 1.0, core::f32::consts::FRAC_PI_2, 3.0, 5.5] {
            let (s, c) = sin_cos(theta);
            assert!(approx_eq(s, sinf(theta)));
            assert!(approx_eq(c, cosf(theta)));
        }
    }

    #[test]
    fn test_sin_cos_unit_magnitude() {
        let (s, c) = sin_cos(2.2);
        assert!(approx_eq(s * s + c * c, 1.0));
    }

    #[test]
    fn test_wrap_angle() {
        assert!(approx_eq(wrap_angle(0.0), 0.0));
        assert!(approx_eq(wrap_angle(7.0), 7.0 - TAU));
        assert!(approx_eq(wrap_angle(-1.0), TAU - 1.0));
        assert!(approx_eq(wrap_angle(TAU), 0.0));
        assert!(approx_eq(wrap_angle(3.0 * TAU + 0.25), 0.25));
    }

    #[test]
    fn test_wrap_phase_single_correction() {
        assert!(approx_eq(wrap_phase(1.0), 1.0));
        assert!(approx_eq(wrap_phase(-0.5), TAU - 0.5));
        assert!(approx_eq(wrap_phase(6.5), 6.5 - TAU));
        // One correction only: a value below -2π stays negative
        assert!(wrap_phase(-7.0) < 0.0);
    }
}
