#![no_std]

//! Control core for a three-phase active PWM rectifier.
//!
//! Pure, host-testable control logic: sample calibration, software PLL line
//! tracking, the cascaded voltage/current loops, mode selection and cycle
//! history. No I/O happens here. The `firmware/` package owns the hardware
//! and drives [`RectifierController::run_cycle`] once per conversion batch
//! through the [`RectifierBridge`] seam.

mod fmt;

pub mod acquisition;
pub mod bridge;
pub mod control;
pub mod controller;
pub mod history;

// Re-export main types for easier access
pub use acquisition::{AcquisitionConfig, Measurements, RawSamples, SampleConverter};
pub use bridge::{CycleOutput, GatePolarity, LegCommand, RectifierBridge};
pub use control::{ModeConfig, ModeSelector, RectifierMode};
pub use controller::{RectifierConfig, RectifierController};
pub use history::{History, HISTORY_LEN};
