// Gate drive abstraction
//
// The control core decides one command per leg per cycle and hands the
// result to a bridge implementation. Keeping the hardware behind a trait
// lets the whole cycle run on the host in tests.

/// Effective gate polarity for the committed cycle.
///
/// `ActiveHigh` passes duty values through unchanged and is used while the
/// rectifier free-runs on its body diodes. `ActiveLow` inverts the duty
/// sense so the relay levels drive the low-side switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolarity {
    ActiveHigh,
    ActiveLow,
}

/// Per-leg drive command for one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegCommand {
    /// Outputs disabled, leg conducts through the diodes only
    ForcedOff,
    /// Drive at the carrier's maximum duty
    MaxDuty,
    /// Drive at the carrier's minimum duty
    MinDuty,
}

/// Complete gate state committed at the end of a control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutput {
    pub polarity: GatePolarity,
    pub legs: [LegCommand; 3],
}

/// Hardware hooks the controller drives once per cycle.
///
/// `commit` applies the full gate state in one call so polarity and leg
/// commands never straddle a carrier period. `rearm_acquisition` is called
/// exactly once per cycle, after the history update, and must leave the
/// sampler ready for the next trigger.
pub trait RectifierBridge {
    fn commit(&mut self, output: &CycleOutput);
    fn rearm_acquisition(&mut self);
}
