// Rectifier control laws
// Line tracking PLL, outer voltage loop, inner relay current loop

pub mod current_relay;
pub mod pll;
pub mod transforms;
pub mod voltage_loop;

// Re-export main types for easier access
pub use current_relay::{CurrentRelay, RelayConfig, RelayLevel};
pub use pll::{LineSnapshot, PhaseReferences, Pll, PllConfig};
pub use voltage_loop::{VoltageLoop, VoltageLoopConfig};

use crate::fmt::*;

/// Rectifier operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectifierMode {
    /// Passive rectification through the bridge diodes, legs held off
    Uncontrolled,
    /// Active PWM rectification, voltage and current loops engaged
    Active,
}

/// Mode switch parameters
pub struct ModeConfig {
    /// DC bus voltage at which active rectification engages [V]
    pub threshold: f32,
    /// Band below `threshold` that must be left before dropping back to
    /// uncontrolled [V]. Zero reproduces the plain threshold compare.
    pub hysteresis: f32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            threshold: 40.0,
            hysteresis: 0.0,
        }
    }
}

/// Mode selector, evaluated freshly every cycle.
///
/// The boundary is inclusive on the active side: `ud` equal to the threshold
/// selects active rectification.
pub struct ModeSelector {
    config: ModeConfig,
    mode: RectifierMode,
}

impl ModeSelector {
    pub fn new(config: ModeConfig) -> Self {
        Self {
            config,
            mode: RectifierMode::Uncontrolled,
        }
    }

    /// Decide the mode from the measured DC bus voltage
    pub fn update(&mut self, ud: f32) -> RectifierMode {
        let next = match self.mode {
            RectifierMode::Uncontrolled if ud >= self.config.threshold => RectifierMode::Active,
            RectifierMode::Active if ud < self.config.threshold - self.config.hysteresis => {
                RectifierMode::Uncontrolled
            }
            current => current,
        };
        if next != self.mode {
            match next {
                RectifierMode::Active => info!("rectifier mode: uncontrolled -> active, ud = {} V", ud),
                RectifierMode::Uncontrolled => {
                    info!("rectifier mode: active -> uncontrolled, ud = {} V", ud)
                }
            }
            self.mode = next;
        }
        self.mode
    }

    /// Currently selected mode
    pub fn mode(&self) -> RectifierMode {
        self.mode
    }
}
