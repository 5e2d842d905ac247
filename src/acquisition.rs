// Sample acquisition and calibration
// Converts one raw conversion sequence into physical-unit measurements

use crate::fmt::*;

/// Largest raw code the 12-bit converter can produce
pub const RAW_FULL_SCALE: u16 = 4095;

/// One raw conversion sequence.
///
/// Channel order is fixed by the acquisition hardware:
/// `{Uab, Ubc, Uca, Ud, Ia, Ib, Ic}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSamples {
    pub uab: u16,
    pub ubc: u16,
    pub uca: u16,
    pub ud: u16,
    pub ia: u16,
    pub ib: u16,
    pub ic: u16,
}

impl RawSamples {
    /// Build from a conversion sequence in hardware channel order
    pub const fn from_sequence(seq: [u16; 7]) -> Self {
        Self {
            uab: seq[0],
            ubc: seq[1],
            uca: seq[2],
            ud: seq[3],
            ia: seq[4],
            ib: seq[5],
            ic: seq[6],
        }
    }
}

/// Calibrated measurements for one cycle.
///
/// Line-to-line voltages and the DC bus voltage in volts, phase currents in
/// amperes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Measurements {
    pub uab: f32,
    pub ubc: f32,
    pub uca: f32,
    pub ud: f32,
    pub ia: f32,
    pub ib: f32,
    pub ic: f32,
}

/// One affine calibration stage: `y = x * gain + offset`
#[derive(Debug, Clone, Copy)]
pub struct AffineStage {
    pub gain: f32,
    pub offset: f32,
}

impl AffineStage {
    pub const fn new(gain: f32, offset: f32) -> Self {
        Self { gain, offset }
    }

    #[inline]
    fn apply(&self, x: f32) -> f32 {
        x * self.gain + self.offset
    }
}

/// Two-stage calibration for one channel.
///
/// The initial stage maps converter input volts to engineering units from the
/// sensing network's nominal ratios; the correction stage is a second affine
/// fit taken against a reference meter on the assembled board.
#[derive(Debug, Clone, Copy)]
pub struct ChannelCalibration {
    pub initial: AffineStage,
    pub correction: AffineStage,
}

impl ChannelCalibration {
    pub const fn new(gain: f32, offset: f32, corr_gain: f32, corr_offset: f32) -> Self {
        Self {
            initial: AffineStage::new(gain, offset),
            correction: AffineStage::new(corr_gain, corr_offset),
        }
    }

    /// Apply both stages to a converter input voltage
    #[inline]
    pub fn apply(&self, input_volts: f32) -> f32 {
        self.correction.apply(self.initial.apply(input_volts))
    }
}

/// Acquisition parameters
pub struct AcquisitionConfig {
    /// Converter full-scale voltage [V]
    pub vref: f32,
    /// Largest valid raw code (12-bit)
    pub raw_max: u16,
    pub uab: ChannelCalibration,
    pub ubc: ChannelCalibration,
    pub uca: ChannelCalibration,
    pub ud: ChannelCalibration,
    pub ia: ChannelCalibration,
    pub ib: ChannelCalibration,
    pub ic: ChannelCalibration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            vref: 3.0,
            raw_max: RAW_FULL_SCALE,
            // Line-to-line voltage dividers (~±376 V full scale) and the
            // per-board correction fit
            uab: ChannelCalibration::new(244.0, -376.0, 1.0237, 3.486),
            ubc: ChannelCalibration::new(240.0, -371.0, 1.1448, 18.311),
            uca: ChannelCalibration::new(252.0, -394.8, 0.9481, 11.842),
            // DC bus divider (unipolar, ~187 V nominal full scale)
            ud: ChannelCalibration::new(62.5, 0.184, 2.0048, -3.6605),
            // Hall current sensors, inverting (~±8 A around mid-scale)
            ia: ChannelCalibration::new(-5.22, 7.99, -0.9937, 0.078),
            ib: ChannelCalibration::new(-5.16, 8.0, -0.9982, 0.0492),
            ic: ChannelCalibration::new(-5.12, 7.81, -1.02, -0.1608),
        }
    }
}

/// Converts raw sample batches into calibrated measurements
pub struct SampleConverter {
    config: AcquisitionConfig,
}

impl SampleConverter {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self { config }
    }

    /// Raw code to converter input volts.
    ///
    /// Codes above `raw_max` violate the input contract and are clamped to
    /// full scale rather than passed through uncalibrated.
    fn raw_to_volts(&self, raw: u16) -> f32 {
        let clamped = if raw > self.config.raw_max {
            warn!("raw sample {} above full scale, clamping", raw);
            self.config.raw_max
        } else {
            raw
        };
        clamped as f32 / self.config.raw_max as f32 * self.config.vref
    }

    /// Calibrate one conversion sequence
    pub fn convert(&self, raw: &RawSamples) -> Measurements {
        Measurements {
            uab: self.config.uab.apply(self.raw_to_volts(raw.uab)),
            ubc: self.config.ubc.apply(self.raw_to_volts(raw.ubc)),
            uca: self.config.uca.apply(self.raw_to_volts(raw.uca)),
            ud: self.config.ud.apply(self.raw_to_volts(raw.ud)),
            ia: self.config.ia.apply(self.raw_to_volts(raw.ia)),
            ib: self.config.ib.apply(self.raw_to_volts(raw.ib)),
            ic: self.config.ic.apply(self.raw_to_volts(raw.ic)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> SampleConverter {
        SampleConverter::new(AcquisitionConfig::default())
    }

    #[test]
    fn test_reference_values_at_midscale() {
        let m = converter().convert(&RawSamples::from_sequence([2048; 7]));
        // 2048 -> 1.5004 V input, then both affine stages
        assert!((m.ud - 184.704).abs() < 0.01);
        assert!((m.uab - (-6.6595)).abs() < 0.01);
    }

    #[test]
    fn test_current_zero_code() {
        // 2069 counts sits at the current sensors' zero-ampere point
        let m = converter().convert(&RawSamples::from_sequence([0, 0, 0, 0, 2069, 2069, 2069]));
        assert!(m.ia.abs() < 0.01);
    }

    #[test]
    fn test_channels_are_monotonic() {
        let c = converter();
        let lo = c.convert(&RawSamples::from_sequence([0; 7]));
        let hi = c.convert(&RawSamples::from_sequence([4095; 7]));
        assert!(hi.uab > lo.uab);
        assert!(hi.ubc > lo.ubc);
        assert!(hi.uca > lo.uca);
        assert!(hi.ud > lo.ud);
        // Two inverting stages compose to a positive slope
        assert!(hi.ia > lo.ia);
        assert!(hi.ib > lo.ib);
        assert!(hi.ic > lo.ic);
    }

    #[test]
    fn test_out_of_range_clamps_to_full_scale() {
        let c = converter();
        let clamped = c.convert(&RawSamples::from_sequence([4500; 7]));
        let full = c.convert(&RawSamples::from_sequence([4095; 7]));
        assert_eq!(clamped.ud.to_bits(), full.ud.to_bits());
        assert_eq!(clamped.ia.to_bits(), full.ia.to_bits());
    }

    #[test]
    fn test_affine_midpoint() {
        // Affine transform: value at the midpoint of two codes sits at the
        // midpoint of the two results
        let c = converter();
        let a = c.convert(&RawSamples::from_sequence([1000; 7])).uab;
        let b = c.convert(&RawSamples::from_sequence([3000; 7])).uab;
        let mid = c.convert(&RawSamples::from_sequence([2000; 7])).uab;
        assert!((mid - (a + b) / 2.0).abs() < 0.01);
    }
}
