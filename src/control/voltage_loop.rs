// Outer DC bus voltage loop
//
// Incremental (velocity form) PI: the gains act on the error and its change,
// and the accumulator is the commanded current magnitude itself. Clamping
// the accumulator therefore bounds the command directly.

/// Voltage loop parameters
pub struct VoltageLoopConfig {
    /// DC bus voltage setpoint [V]
    pub v_ref: f32,
    /// Gain on the change of the error
    pub kp: f32,
    /// Gain on the error itself
    pub ki: f32,
    /// Upper clamp for the commanded current magnitude [A]
    pub istand_max: f32,
}

impl Default for VoltageLoopConfig {
    fn default() -> Self {
        Self {
            v_ref: 100.0,
            kp: 10.0,
            ki: 0.001,
            istand_max: 6.0,
        }
    }
}

/// Voltage loop state, updated once per active-mode cycle
pub struct VoltageLoop {
    config: VoltageLoopConfig,
    /// Commanded current magnitude [A], kept in [0, istand_max]
    istand: f32,
    /// Tracking error of the previous update
    verr_prev: f32,
}

impl VoltageLoop {
    pub fn new(config: VoltageLoopConfig) -> Self {
        Self {
            config,
            istand: 0.0,
            verr_prev: 0.0,
        }
    }

    /// One PI update from the measured DC bus voltage.
    ///
    /// # Returns
    /// The commanded current magnitude, clamped to [0, istand_max].
    pub fn update(&mut self, ud: f32) -> f32 {
        let verr = self.config.v_ref - ud;
        let istand = self.istand + self.config.ki * verr + self.config.kp * (verr - self.verr_prev);
        self.istand = istand.clamp(0.0, self.config.istand_max);
        self.verr_prev = verr;
        self.istand
    }

    /// Clear the accumulator and the stored error
    pub fn reset(&mut self) {
        self.istand = 0.0;
        self.verr_prev = 0.0;
    }

    /// Current command magnitude [A]
    pub fn istand(&self) -> f32 {
        self.istand
    }

    /// Check if the command is pinned at its upper clamp
    pub fn is_saturated(&self) -> bool {
        self.istand >= self.config.istand_max
    }
}
