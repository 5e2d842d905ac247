// Software phase-locked loop tracking the AC line
//
// Projects the three line-to-line voltages onto the quadrature axis of the
// tracked angle and drives that projection to zero with a discrete PI update
// on the angular frequency. For a balanced set of amplitude A the projection
// equals A*sin(line_phase - theta), so zero means lock.

use core::f32::consts::{FRAC_PI_6, PI};

use super::transforms::{sin_cos, wrap_angle, wrap_phase};

const SQRT3_OVER_3: f32 = 0.577_350_3; // sqrt(3) / 3
const TWO_THIRDS: f32 = 2.0 / 3.0;
const TWO_PI_OVER_3: f32 = 2.094_395_1; // 2π/3
const FOUR_PI_OVER_3: f32 = 4.188_790_2; // 4π/3

/// PLL tuning and timing parameters
pub struct PllConfig {
    /// Gain on the change of the quadrature error
    pub kp: f32,
    /// Gain on the quadrature error itself
    pub ki: f32,
    /// Lower clamp for the tracked angular frequency [rad/s]
    pub omega_min: f32,
    /// Upper clamp for the tracked angular frequency [rad/s]
    pub omega_max: f32,
    /// Angular frequency at startup [rad/s]
    pub omega_initial: f32,
    /// Control cycle rate [Hz]
    pub cycle_rate: f32,
    /// Fixed shift applied to all three reference phases [rad]
    pub phase_shift: f32,
}

impl Default for PllConfig {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 0.007,
            // 47.7 to 55.7 Hz around the 50 Hz line
            omega_min: 300.0,
            omega_max: 350.0,
            omega_initial: 100.0 * PI,
            cycle_rate: 10_000.0,
            phase_shift: 0.0,
        }
    }
}

/// Reference phase angles for the three legs, 120 degrees apart
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseReferences {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

/// Line voltages latched on a specific phase window, for offline inspection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineSnapshot {
    pub uab: f32,
    pub ubc: f32,
    pub uca: f32,
}

/// PLL state, updated once per control cycle
pub struct Pll {
    config: PllConfig,
    /// Tracked angle [rad], kept in [0, 2π)
    theta: f32,
    /// Tracked angular frequency [rad/s], kept in the clamp band
    omega: f32,
    /// Quadrature error of the previous cycle
    uq_prev: f32,
    snapshot_zero: LineSnapshot,
    snapshot_two_thirds: LineSnapshot,
}

impl Pll {
    pub fn new(config: PllConfig) -> Self {
        let omega = config.omega_initial;
        Self {
            config,
            theta: 0.0,
            omega,
            uq_prev: 0.0,
            snapshot_zero: LineSnapshot::default(),
            snapshot_two_thirds: LineSnapshot::default(),
        }
    }

    /// One tracking update from the calibrated line-to-line voltages.
    ///
    /// # Returns
    /// The three reference phases derived from the updated angle.
    pub fn update(&mut self, uab: f32, ubc: f32, uca: f32) -> PhaseReferences {
        let (sin_theta, cos_theta) = sin_cos(self.theta);

        // Quadrature-axis projection of the line voltages
        let uq = SQRT3_OVER_3 * (ubc - uca) * cos_theta
            - TWO_THIRDS * (uab - 0.5 * ubc - 0.5 * uca) * sin_theta;

        // Discrete PI on the frequency, clamped every cycle
        self.omega = (self.omega + self.config.kp * (uq - self.uq_prev) + self.config.ki * uq)
            .clamp(self.config.omega_min, self.config.omega_max);

        let step = self.omega / self.config.cycle_rate;
        self.theta = wrap_angle(self.theta + step);
        self.uq_prev = uq;

        // Latch the line voltages when the angle passes 0 and 2π/3, within
        // one cycle's step. Observation only, the loop never reads these.
        if self.theta <= step {
            self.snapshot_zero = LineSnapshot { uab, ubc, uca };
        }
        if (self.theta - TWO_PI_OVER_3).abs() <= step {
            self.snapshot_two_thirds = LineSnapshot { uab, ubc, uca };
        }

        let lead = self.theta - FRAC_PI_6 - self.config.phase_shift;
        PhaseReferences {
            a: wrap_phase(lead),
            b: wrap_phase(lead - TWO_PI_OVER_3),
            c: wrap_phase(lead - FOUR_PI_OVER_3),
        }
    }

    /// Tracked angle [rad], in [0, 2π)
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Tracked angular frequency [rad/s]
    pub fn omega(&self) -> f32 {
        self.omega
    }

    /// Line voltages last seen at the zero crossing of the tracked angle
    pub fn snapshot_at_zero(&self) -> LineSnapshot {
        self.snapshot_zero
    }

    /// Line voltages last seen when the tracked angle passed 2π/3
    pub fn snapshot_at_two_thirds(&self) -> LineSnapshot {
        self.snapshot_two_thirds
    }
}
