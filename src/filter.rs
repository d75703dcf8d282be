//! Driver-side low-pass filtering
//!
//! A second-order Butterworth low-pass filter per accelerometer axis, run
//! behind the on-chip anti-alias filter at the driver's sample rate.
//!
//! Reconfiguring a filter only recomputes its coefficients. The delay
//! elements carry over, so the first few outputs after a rate or cutoff
//! change contain a short transient.
//!
//! A cutoff at or above half the sample rate has no stable two-pole
//! realization. The filter passes samples through unchanged in that case and
//! resumes filtering once a later reconfiguration brings the cutoff back
//! below Nyquist.

/// Two-pole low-pass filter (direct form II)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowPassFilter2p {
    cutoff_hz: f32,
    active: bool,
    a1: f32,
    a2: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    delay_1: f32,
    delay_2: f32,
}

impl LowPassFilter2p {
    /// Create a filter for the given sample rate and cutoff
    ///
    /// A cutoff of zero or below disables filtering.
    #[must_use]
    pub fn new(sample_rate_hz: f32, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            cutoff_hz: 0.0,
            active: false,
            a1: 0.0,
            a2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            delay_1: 0.0,
            delay_2: 0.0,
        };
        filter.set_cutoff_frequency(sample_rate_hz, cutoff_hz);
        filter
    }

    /// Recompute coefficients for a new sample rate and cutoff
    ///
    /// The filter state is left untouched. The filter is bypassed unless
    /// `0 < cutoff_hz < sample_rate_hz / 2`.
    pub fn set_cutoff_frequency(&mut self, sample_rate_hz: f32, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.active = cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0;
        if !self.active {
            return;
        }

        let fr = sample_rate_hz / cutoff_hz;
        let ohm = libm::tanf(core::f32::consts::PI / fr);
        let cos_quarter = libm::cosf(core::f32::consts::FRAC_PI_4);
        let c = 1.0 + 2.0 * cos_quarter * ohm + ohm * ohm;

        self.b0 = ohm * ohm / c;
        self.b1 = 2.0 * self.b0;
        self.b2 = self.b0;
        self.a1 = 2.0 * (ohm * ohm - 1.0) / c;
        self.a2 = (1.0 - 2.0 * cos_quarter * ohm + ohm * ohm) / c;
    }

    /// Requested cutoff frequency in Hz
    #[must_use]
    pub const fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Whether the filter passes samples through unchanged
    #[must_use]
    pub const fn is_bypassed(&self) -> bool {
        !self.active
    }

    /// Filter one sample
    pub fn apply(&mut self, sample: f32) -> f32 {
        if self.is_bypassed() {
            return sample;
        }

        let mut delay_0 = sample - self.delay_1 * self.a1 - self.delay_2 * self.a2;
        if !delay_0.is_finite() {
            // don't let a single bad sample poison the filter
            delay_0 = sample;
        }

        let output = delay_0 * self.b0 + self.delay_1 * self.b1 + self.delay_2 * self.b2;

        self.delay_2 = self.delay_1;
        self.delay_1 = delay_0;

        output
    }
}

/// One low-pass filter per accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterBank {
    x: LowPassFilter2p,
    y: LowPassFilter2p,
    z: LowPassFilter2p,
}

impl FilterBank {
    /// Create three identical filters
    #[must_use]
    pub fn new(sample_rate_hz: f32, cutoff_hz: f32) -> Self {
        let filter = LowPassFilter2p::new(sample_rate_hz, cutoff_hz);
        Self {
            x: filter,
            y: filter,
            z: filter,
        }
    }

    /// Reconfigure all three filters; the running state carries over
    pub fn configure(&mut self, sample_rate_hz: f32, cutoff_hz: f32) {
        self.x.set_cutoff_frequency(sample_rate_hz, cutoff_hz);
        self.y.set_cutoff_frequency(sample_rate_hz, cutoff_hz);
        self.z.set_cutoff_frequency(sample_rate_hz, cutoff_hz);
    }

    /// Cutoff frequency shared by all axes
    #[must_use]
    pub const fn cutoff_hz(&self) -> f32 {
        self.x.cutoff_hz()
    }

    /// Filter one `[x, y, z]` sample
    pub fn apply(&mut self, sample: [f32; 3]) -> [f32; 3] {
        [
            self.x.apply(sample[0]),
            self.y.apply(sample[1]),
            self.z.apply(sample[2]),
        ]
    }
}
