// Inner relay (bang-bang) current loop
//
// Three independent two-level comparators with a shared dead band. Inside
// the band the previous level holds; holding is the policy, not an omission.

use super::pll::PhaseReferences;
use super::transforms::sin_cos;

/// Relay parameters
pub struct RelayConfig {
    /// Half-width of the hold band around zero error [A]
    pub dead_band: f32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { dead_band: 0.1 }
    }
}

/// Two-level relay output for one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayLevel {
    /// Maximum-duty state
    High,
    /// Minimum-duty state
    Low,
}

/// Relay state for the three legs.
///
/// Levels start at `High`, matching the power-on compare value of the
/// actuator, and persist across cycles while the error sits in the band.
pub struct CurrentRelay {
    config: RelayConfig,
    levels: [RelayLevel; 3],
}

impl CurrentRelay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            levels: [RelayLevel::High; 3],
        }
    }

    /// One relay decision for all three legs.
    ///
    /// # Arguments
    /// * `istand` - Commanded current magnitude [A]
    /// * `phases` - Reference phases from the PLL
    /// * `currents` - Measured phase currents [A], order {Ia, Ib, Ic}
    ///
    /// # Returns
    /// The updated per-leg levels.
    pub fn update(
        &mut self,
        istand: f32,
        phases: &PhaseReferences,
        currents: [f32; 3],
    ) -> [RelayLevel; 3] {
        let refs = [phases.a, phases.b, phases.c];
        for i in 0..3 {
            let i_ref = istand * sin_cos(refs[i]).1;
            let err = i_ref - currents[i];
            if err > self.config.dead_band {
                self.levels[i] = RelayLevel::High;
            } else if err < -self.config.dead_band {
                self.levels[i] = RelayLevel::Low;
            }
            // Inside the dead band the previous level holds
        }
        self.levels
    }

    /// Current per-leg levels
    pub fn levels(&self) -> [RelayLevel; 3] {
        self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_phases() -> PhaseReferences {
        PhaseReferences {
            a: 0.0,
            b: 0.0,
            c: 0.0,
        }
    }

    #[test]
    fn test_initial_levels_high() {
        let relay = CurrentRelay::new(RelayConfig::default());
        assert_eq!(relay.levels(), [RelayLevel::High; 3]);
    }

    #[test]
    fn test_drives_low_on_negative_error() {
        let mut relay = CurrentRelay::new(RelayConfig::default());
        // Zero reference against positive measured currents
        let levels = relay.update(0.0, &zero_phases(), [1.0, 1.0, 1.0]);
        assert_eq!(levels, [RelayLevel::Low; 3]);
    }

    #[test]
    fn test_holds_inside_dead_band() {
        let mut relay = CurrentRelay::new(RelayConfig::default());
        relay.update(0.0, &zero_phases(), [1.0, 1.0, 1.0]);
        // Errors of -0.05, +0.05 and 0 all sit inside the band
        let levels = relay.update(0.0, &zero_phases(), [0.05, -0.05, 0.0]);
        assert_eq!(levels, [RelayLevel::Low; 3]);
    }

    #[test]
    fn test_band_edges_hold() {
        let mut relay = CurrentRelay::new(RelayConfig::default());
        relay.update(0.0, &zero_phases(), [1.0, 1.0, 1.0]);
        // err == +0.1 and err == -0.1 exactly: strict comparisons, so hold
        let levels = relay.update(0.0, &zero_phases(), [-0.1, 0.1, 0.0]);
        assert_eq!(levels, [RelayLevel::Low; 3]);
    }

    #[test]
    fn test_per_leg_reference_follows_phase() {
        let mut relay = CurrentRelay::new(RelayConfig::default());
        // cos(0) = 1 and cos(π) = -1: leg references of +2 A and -2 A
        let phases = PhaseReferences {
            a: 0.0,
            b: core::f32::consts::PI,
            c: 0.0,
        };
        let levels = relay.update(2.0, &phases, [0.0, 0.0, 0.0]);
        assert_eq!(levels[0], RelayLevel::High);
        assert_eq!(levels[1], RelayLevel::Low);
        assert_eq!(levels[2], RelayLevel::High);
    }

    #[test]
    fn test_legs_decide_independently() {
        let mut relay = CurrentRelay::new(RelayConfig::default());
        let levels = relay.update(0.0, &zero_phases(), [0.5, -0.5, 0.0]);
        assert_eq!(levels[0], RelayLevel::Low);
        assert_eq!(levels[1], RelayLevel::High);
        // Leg C held its initial level
        assert_eq!(levels[2], RelayLevel::High);
    }
}
