// Cycle history for offline inspection
//
// Six fixed-length rings sharing one write index. The control loops never
// read these back; external tooling does.

use libm::sqrtf;

use crate::acquisition::Measurements;

/// Default ring length: 20 ms of samples at the 10 kHz cycle rate
pub const HISTORY_LEN: usize = 200;

/// History buffers for the three line voltages and three phase currents.
///
/// The cycle counter doubles as the write index: it advances after every
/// record and wraps at `N`, overwriting the oldest entry. `N` must be
/// nonzero.
pub struct History<const N: usize = HISTORY_LEN> {
    uab: [f32; N],
    ubc: [f32; N],
    uca: [f32; N],
    ia: [f32; N],
    ib: [f32; N],
    ic: [f32; N],
    counter: usize,
}

impl<const N: usize> History<N> {
    pub const fn new() -> Self {
        Self {
            uab: [0.0; N],
            ubc: [0.0; N],
            uca: [0.0; N],
            ia: [0.0; N],
            ib: [0.0; N],
            ic: [0.0; N],
            counter: 0,
        }
    }

    /// Append one cycle's voltages and currents, then advance the counter
    pub fn record(&mut self, m: &Measurements) {
        self.uab[self.counter] = m.uab;
        self.ubc[self.counter] = m.ubc;
        self.uca[self.counter] = m.uca;
        self.ia[self.counter] = m.ia;
        self.ib[self.counter] = m.ib;
        self.ic[self.counter] = m.ic;
        self.counter = (self.counter + 1) % N;
    }

    /// Cycle counter, equal to the next write index
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn uab(&self) -> &[f32; N] {
        &self.uab
    }

    pub fn ubc(&self) -> &[f32; N] {
        &self.ubc
    }

    pub fn uca(&self) -> &[f32; N] {
        &self.uca
    }

    pub fn ia(&self) -> &[f32; N] {
        &self.ia
    }

    pub fn ib(&self) -> &[f32; N] {
        &self.ib
    }

    pub fn ic(&self) -> &[f32; N] {
        &self.ic
    }
}

impl<const N: usize> Default for History<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Root-mean-square over one buffer window
pub fn rms(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for v in values {
        sum += v * v;
    }
    sqrtf(sum / values.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(value: f32) -> Measurements {
        Measurements {
            uab: value,
            ubc: value + 10.0,
            uca: value + 20.0,
            ia: -value,
            ..Default::default()
        }
    }

    #[test]
    fn test_counter_wraps_and_overwrites_oldest() {
        let mut history: History<4> = History::new();
        for k in 1..=5 {
            history.record(&sample(k as f32));
        }
        // The fifth record wrapped onto index 0
        assert_eq!(history.counter(), 1);
        assert_eq!(history.uab(), &[5.0, 2.0, 3.0, 4.0]);
        assert_eq!(history.ia(), &[-5.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_buffers_share_one_index() {
        let mut history: History<4> = History::new();
        history.record(&sample(7.0));
        assert_eq!(history.counter(), 1);
        assert_eq!(history.uab()[0], 7.0);
        assert_eq!(history.ubc()[0], 17.0);
        assert_eq!(history.uca()[0], 27.0);
    }

    #[test]
    fn test_rms_of_constant() {
        assert!((rms(&[3.0; 8]) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_alternating_unit() {
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_empty_slice() {
        assert_eq!(rms(&[]), 0.0);
    }
}
