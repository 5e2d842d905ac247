// Control cycle orchestrator
//
// Owns every piece of per-cycle state and runs the fixed step sequence:
// calibrate, track the line, pick the mode, run the active-mode loops,
// commit the gates, record history, rearm the sampler. The bridge trait is
// the only hardware contact, so the full cycle also runs on the host.

use crate::acquisition::{AcquisitionConfig, Measurements, RawSamples, SampleConverter};
use crate::bridge::{CycleOutput, GatePolarity, LegCommand, RectifierBridge};
use crate::control::{
    CurrentRelay, ModeConfig, ModeSelector, Pll, PllConfig, RectifierMode, RelayConfig, RelayLevel,
    VoltageLoop, VoltageLoopConfig,
};
use crate::history::{History, HISTORY_LEN};

/// Complete controller configuration, one section per component
#[derive(Default)]
pub struct RectifierConfig {
    pub acquisition: AcquisitionConfig,
    pub pll: PllConfig,
    pub voltage_loop: VoltageLoopConfig,
    pub relay: RelayConfig,
    pub mode: ModeConfig,
}

/// Top-level rectifier controller, stepped once per conversion sequence
pub struct RectifierController<const N: usize = HISTORY_LEN> {
    converter: SampleConverter,
    pll: Pll,
    voltage_loop: VoltageLoop,
    relay: CurrentRelay,
    mode: ModeSelector,
    history: History<N>,
    measurements: Measurements,
    output: CycleOutput,
}

impl<const N: usize> RectifierController<N> {
    pub fn new(config: RectifierConfig) -> Self {
        Self {
            converter: SampleConverter::new(config.acquisition),
            pll: Pll::new(config.pll),
            voltage_loop: VoltageLoop::new(config.voltage_loop),
            relay: CurrentRelay::new(config.relay),
            mode: ModeSelector::new(config.mode),
            history: History::new(),
            measurements: Measurements::default(),
            output: CycleOutput {
                polarity: GatePolarity::ActiveHigh,
                legs: [LegCommand::ForcedOff; 3],
            },
        }
    }

    /// Run one full control cycle from a raw conversion sequence.
    ///
    /// The PLL is updated in both modes so that active mode engages with the
    /// line already tracked. The voltage loop and the relay only advance
    /// while active; their state holds across uncontrolled stretches. The
    /// gate state, polarity included, is committed in a single call, and the
    /// sampler is rearmed exactly once, after the history update.
    ///
    /// # Arguments
    /// * `raw` - One conversion sequence in hardware channel order
    /// * `bridge` - Gate drive and sampler hooks
    ///
    /// # Returns
    /// The gate state committed this cycle.
    pub fn run_cycle(
        &mut self,
        raw: &RawSamples,
        bridge: &mut impl RectifierBridge,
    ) -> CycleOutput {
        self.measurements = self.converter.convert(raw);
        let m = self.measurements;

        let phases = self.pll.update(m.uab, m.ubc, m.uca);

        self.output = match self.mode.update(m.ud) {
            RectifierMode::Uncontrolled => CycleOutput {
                polarity: GatePolarity::ActiveHigh,
                legs: [LegCommand::ForcedOff; 3],
            },
            RectifierMode::Active => {
                let istand = self.voltage_loop.update(m.ud);
                let levels = self.relay.update(istand, &phases, [m.ia, m.ib, m.ic]);
                CycleOutput {
                    polarity: GatePolarity::ActiveLow,
                    legs: levels.map(|level| match level {
                        RelayLevel::High => LegCommand::MaxDuty,
                        RelayLevel::Low => LegCommand::MinDuty,
                    }),
                }
            }
        };

        bridge.commit(&self.output);
        self.history.record(&self.measurements);
        bridge.rearm_acquisition();

        self.output
    }

    /// History buffers recorded so far
    pub fn history(&self) -> &History<N> {
        &self.history
    }

    /// Cycle counter, shared with the history write index
    pub fn counter(&self) -> usize {
        self.history.counter()
    }

    /// Calibrated measurements of the last cycle
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Currently selected operating mode
    pub fn mode(&self) -> RectifierMode {
        self.mode.mode()
    }

    /// Commanded current magnitude of the voltage loop [A]
    pub fn istand(&self) -> f32 {
        self.voltage_loop.istand()
    }

    /// Check if the voltage loop is pinned at its clamp
    pub fn is_saturated(&self) -> bool {
        self.voltage_loop.is_saturated()
    }

    /// Line tracking state
    pub fn pll(&self) -> &Pll {
        &self.pll
    }

    /// Gate state committed on the last cycle
    pub fn last_output(&self) -> CycleOutput {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ChannelCalibration;
    use core::f32::consts::PI;
    use libm::roundf;

    /// Bridge double that records call order and the committed state
    struct RecordingBridge {
        commits: usize,
        rearms: usize,
        last: Option<CycleOutput>,
        commit_preceded: bool,
    }

    impl RecordingBridge {
        fn new() -> Self {
            Self {
                commits: 0,
                rearms: 0,
                last: None,
                commit_preceded: false,
            }
        }
    }

    impl RectifierBridge for RecordingBridge {
        fn commit(&mut self, output: &CycleOutput) {
            self.commits += 1;
            self.last = Some(*output);
        }

        fn rearm_acquisition(&mut self) {
            self.rearms += 1;
            self.commit_preceded = self.commits == self.rearms;
        }
    }

    /// Quiet sequence: mid-scale lines, low bus, zero-ampere currents
    fn quiet_raw(ud: u16) -> RawSamples {
        RawSamples::from_sequence([2048, 2048, 2048, ud, 2069, 2069, 2069])
    }

    #[test]
    fn test_cycle_commits_records_then_rearms() {
        let mut controller: RectifierController = RectifierController::new(RectifierConfig::default());
        let mut bridge = RecordingBridge::new();
        for _ in 0..3 {
            let output = controller.run_cycle(&quiet_raw(100), &mut bridge);
            assert!(bridge.commit_preceded);
            assert_eq!(bridge.last, Some(output));
        }
        assert_eq!(bridge.commits, 3);
        assert_eq!(bridge.rearms, 3);
        assert_eq!(controller.counter(), 3);
    }

    #[test]
    fn test_uncontrolled_holds_legs_off_and_loop_frozen() {
        let mut controller: RectifierController = RectifierController::new(RectifierConfig::default());
        let mut bridge = RecordingBridge::new();
        for _ in 0..50 {
            let output = controller.run_cycle(&quiet_raw(100), &mut bridge);
            assert_eq!(output.polarity, GatePolarity::ActiveHigh);
            assert_eq!(output.legs, [LegCommand::ForcedOff; 3]);
        }
        assert_eq!(controller.mode(), RectifierMode::Uncontrolled);
        // No voltage loop updates while uncontrolled
        assert_eq!(controller.istand(), 0.0);
        assert!(!controller.is_saturated());
    }

    #[test]
    fn test_mode_engages_once_and_atomically() {
        let mut controller: RectifierController = RectifierController::new(RectifierConfig::default());
        let mut bridge = RecordingBridge::new();
        let mut polarity_changes = 0;
        let mut previous = controller.last_output().polarity;
        // The bus calibration is monotone, so this ramp crosses the 40 V
        // threshold exactly once (near code 472)
        for ud in 0..=700u16 {
            let output = controller.run_cycle(&quiet_raw(ud), &mut bridge);
            if output.polarity != previous {
                polarity_changes += 1;
                // Legs switch in the same cycle as the polarity
                assert_eq!(output.polarity, GatePolarity::ActiveLow);
                assert!(output.legs.iter().all(|leg| *leg != LegCommand::ForcedOff));
                previous = output.polarity;
            }
        }
        assert_eq!(polarity_changes, 1);
        assert_eq!(controller.mode(), RectifierMode::Active);
    }

    #[test]
    fn test_active_branch_drives_both_levels() {
        let mut controller: RectifierController = RectifierController::new(RectifierConfig::default());
        let mut bridge = RecordingBridge::new();
        let mut saw_max = false;
        let mut saw_min = false;
        // Code 700 reads about 61 V, well past the threshold
        for _ in 0..200 {
            let output = controller.run_cycle(&quiet_raw(700), &mut bridge);
            assert_eq!(output.polarity, GatePolarity::ActiveLow);
            for leg in output.legs {
                match leg {
                    LegCommand::MaxDuty => saw_max = true,
                    LegCommand::MinDuty => saw_min = true,
                    LegCommand::ForcedOff => panic!("leg forced off while active"),
                }
            }
        }
        // 39 V of error pins the command at the clamp immediately
        assert!(controller.is_saturated());
        assert!((controller.istand() - 6.0).abs() < 1e-6);
        // The reference phases sweep a full turn in 200 cycles, so the relay
        // must have driven both levels against the zero-ampere currents
        assert!(saw_max);
        assert!(saw_min);
    }

    // Symmetric line channel mapping raw full scale onto [-450, 450] V,
    // with code 2048 at zero volts
    const LINE_SPAN: f32 = 450.0;

    fn line_code(volts: f32) -> u16 {
        let raw = roundf((volts + LINE_SPAN) / (2.0 * LINE_SPAN) * 4095.0);
        raw.clamp(0.0, 4095.0) as u16
    }

    #[test]
    fn test_pll_tracks_line_through_full_cycle() {
        let line = ChannelCalibration::new(2.0 * LINE_SPAN / 3.0, -LINE_SPAN, 1.0, 0.0);
        let config = RectifierConfig {
            acquisition: AcquisitionConfig {
                uab: line,
                ubc: line,
                uca: line,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut controller: RectifierController = RectifierController::new(config);
        let mut bridge = RecordingBridge::new();

        const AMPLITUDE: f32 = 300.0;
        const OMEGA_LINE: f32 = 100.0 * PI;
        const TWO_PI_OVER_3: f32 = 2.094_395_1;
        let cycles = 2000usize;
        for k in 0..cycles {
            let phase = OMEGA_LINE * k as f32 * 1e-4;
            // Line set whose quadrature projection vanishes at theta = phase
            let raw = RawSamples::from_sequence([
                line_code(AMPLITUDE * libm::cosf(phase)),
                line_code(AMPLITUDE * libm::cosf(phase - TWO_PI_OVER_3)),
                line_code(AMPLITUDE * libm::cosf(phase + TWO_PI_OVER_3)),
                0,
                2069,
                2069,
                2069,
            ]);
            controller.run_cycle(&raw, &mut bridge);
        }

        // After the next update theta leads the fed phase by one step
        let expected = OMEGA_LINE * cycles as f32 * 1e-4;
        let mut err = controller.pll().theta() - expected;
        while err > PI {
            err -= 2.0 * PI;
        }
        while err < -PI {
            err += 2.0 * PI;
        }
        assert!(err.abs() < 0.1, "phase error {} rad", err);
        assert!((controller.pll().omega() - OMEGA_LINE).abs() < 3.0);
        // 2000 records wrap the 200-deep history an exact number of times
        assert_eq!(controller.counter(), 0);
    }
}
