//! High-level driver API for the LSM303D
//!
//! [`Lsm303dDriver`] owns the register port and all driver state. It combines
//! three roles:
//!
//! - configuration manager: maps requested ranges and rates onto the nearest
//!   supported hardware setting and keeps the derived scale factors
//! - sampling engine: one cycle per channel per timer tick, producing
//!   calibrated samples into a bounded queue
//! - recovery: re-initializes the device when a monitored control register
//!   no longer holds what the driver wrote
//!
//! Most callers go through the per-channel handles returned by
//! [`Lsm303dDriver::accel`] and [`Lsm303dDriver::mag`].

use device_driver::RegisterInterface;

use crate::channel::{Accelerometer, Magnetometer};
use crate::diagnostics::{Diagnostics, REGISTER_COUNT, REGISTER_MAP, RegisterDump};
use crate::filter::FilterBank;
use crate::platform::Platform;
use crate::registers::{RegisterDevice, addr, bits};
use crate::ring_buffer::{DEFAULT_QUEUE_DEPTH, SampleQueue};
use crate::self_test::{SelfTestOutcome, accel_self_test, mag_self_test};
use crate::sensors::{
    AccelBandwidth, AccelRange, AccelRate, Calibration, Channel, MagMode, MagRange, MagRate,
    RawSample, Sample,
};
use crate::watchdog::{Watchdog, WatchdogVerdict};
use crate::{Error, WHO_AM_I_VALUE};

/// Delay before re-running an accelerometer cycle that found no new data
pub const DATA_NOT_READY_RETRY_US: u32 = 100;

/// Delay from starting a channel's timer to its first cycle
pub const START_DELAY_US: u32 = 1000;

/// Shortest accelerometer polling interval (2 kHz)
pub const ACCEL_MIN_POLL_INTERVAL_US: u32 = 500;

/// Shortest magnetometer polling interval (1 kHz)
pub const MAG_MIN_POLL_INTERVAL_US: u32 = 1000;

/// Accelerometer polling rate selected by [`PollRate::Default`]
pub const ACCEL_DEFAULT_POLL_HZ: u32 = 800;

/// Accelerometer polling rate selected by [`PollRate::Max`]
pub const ACCEL_MAX_POLL_HZ: u32 = 1600;

/// Magnetometer polling rate selected by [`PollRate::Default`] and [`PollRate::Max`]
pub const MAG_POLL_HZ: u32 = 100;

/// Requested polling mode for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollRate {
    /// No timer; every read runs one cycle inline
    Manual,
    /// Sampling driven by an external signal (not supported)
    External,
    /// The channel's default rate
    Default,
    /// The channel's maximum rate
    Max,
    /// Explicit rate in Hz
    Hz(u32),
}

/// What one sampling cycle did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// A sample was queued and published
    Sampled(Sample),
    /// The accelerometer had no new data; the cycle was re-armed
    NotReady,
    /// A monitored register had drifted and the device was reset
    Recovered,
}

/// Settings applied at construction and re-applied by every reset
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Accelerometer full-scale range
    pub accel_range: AccelRange,
    /// Accelerometer output data rate
    pub accel_rate: AccelRate,
    /// On-chip anti-alias filter bandwidth
    pub accel_bandwidth: AccelBandwidth,
    /// Cutoff of the driver-side low-pass filter in Hz (zero disables it)
    pub lowpass_cutoff_hz: f32,
    /// Magnetometer full-scale range
    pub mag_range: MagRange,
    /// Magnetometer output data rate
    pub mag_rate: MagRate,
    /// Initial depth of both sample queues (only applied at construction)
    pub queue_depth: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            accel_range: AccelRange::G8,
            accel_rate: AccelRate::Hz800,
            accel_bandwidth: AccelBandwidth::Hz50,
            lowpass_cutoff_hz: 30.0,
            mag_range: MagRange::Ga2,
            mag_rate: MagRate::Hz100,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AccelState {
    range: AccelRange,
    rate: AccelRate,
    bandwidth: AccelBandwidth,
    calibration: Calibration,
    poll_interval_us: u32,
    reads_since_reset: u32,
}

#[derive(Debug, Clone, Copy)]
struct MagState {
    range: MagRange,
    rate: MagRate,
    calibration: Calibration,
    poll_interval_us: u32,
    reads_since_reset: u32,
}

/// Main driver for the LSM303D
pub struct Lsm303dDriver<I, P> {
    device: RegisterDevice<I>,
    platform: P,
    config: DriverConfig,
    accel: AccelState,
    mag: MagState,
    filter: FilterBank,
    watchdog: Watchdog,
    accel_queue: SampleQueue,
    mag_queue: SampleQueue,
    diagnostics: Diagnostics,
}

impl<I, P> Lsm303dDriver<I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: Platform,
{
    /// Create a new LSM303D driver with the default configuration
    ///
    /// Probes the device and resets it. Both channels start in manual
    /// polling mode.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The `WHO_AM_I` register contains an unexpected value
    pub fn new(interface: I, platform: P) -> Result<Self, Error<I::Error>> {
        Self::with_config(interface, platform, DriverConfig::default())
    }

    /// Create a new LSM303D driver with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `config.queue_depth` is outside `[1, 100]` ([`Error::InvalidConfig`])
    /// - Communication with the device fails
    /// - The `WHO_AM_I` register contains an unexpected value
    pub fn with_config(
        interface: I,
        platform: P,
        config: DriverConfig,
    ) -> Result<Self, Error<I::Error>> {
        let mut driver = Self {
            device: RegisterDevice::new(interface),
            platform,
            config,
            accel: AccelState {
                range: config.accel_range,
                rate: config.accel_rate,
                bandwidth: config.accel_bandwidth,
                calibration: Calibration::default(),
                poll_interval_us: 0,
                reads_since_reset: 0,
            },
            mag: MagState {
                range: config.mag_range,
                rate: config.mag_rate,
                calibration: Calibration::default(),
                poll_interval_us: 0,
                reads_since_reset: 0,
            },
            filter: FilterBank::new(config.accel_rate.hz(), config.lowpass_cutoff_hz),
            watchdog: Watchdog::new(),
            accel_queue: SampleQueue::new(),
            mag_queue: SampleQueue::new(),
            diagnostics: Diagnostics::default(),
        };

        driver.set_queue_depth(Channel::Accel, config.queue_depth)?;
        driver.set_queue_depth(Channel::Mag, config.queue_depth)?;

        driver.probe()?;
        driver.reset()?;

        Ok(driver)
    }

    /// Verify the device identity
    ///
    /// The first read is discarded; it only clears the sensor's serial state
    /// machine after power-up.
    fn probe(&mut self) -> Result<(), Error<I::Error>> {
        let _ = self.device.who_am_i().read()?;
        let who_am_i = self.device.who_am_i().read()?.who_am_i();

        if who_am_i != WHO_AM_I_VALUE {
            #[cfg(feature = "defmt")]
            defmt::error!("LSM303D WHO_AM_I mismatch: 0x{:02x}", who_am_i);

            return Err(Error::InvalidDevice(who_am_i));
        }

        Ok(())
    }

    /// Re-initialize the device
    ///
    /// Disables the I2C block, enables all accelerometer axes, puts the
    /// magnetometer in continuous mode, routes both data-ready signals and
    /// re-applies the [`DriverConfig`] settings. The expected values of the
    /// monitored registers are re-derived and the per-reset read counters
    /// cleared. Calibration, polling mode and queue depth are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset(&mut self) -> Result<(), Error<I::Error>> {
        self.disable_i2c()?;

        let ctrl1 = bits::CTRL1_XYZ_ENABLE
            | bits::CTRL1_BDU
            | (AccelRate::Hz800.bits() << bits::CTRL1_AODR_SHIFT);
        self.write_reg(addr::CTRL1, ctrl1)?;
        self.watchdog.set_expected(Channel::Accel, ctrl1);

        let ctrl7 = MagMode::Continuous.bits();
        self.write_reg(addr::CTRL7, ctrl7)?;
        self.watchdog.set_expected(Channel::Mag, ctrl7);

        self.write_reg(addr::CTRL5, bits::CTRL5_M_RES_HIGH)?;
        self.write_reg(addr::CTRL3, bits::CTRL3_DRDY_A_INT1)?;
        self.write_reg(addr::CTRL4, bits::CTRL4_DRDY_M_INT2)?;

        let config = self.config;
        self.apply_accel_range(config.accel_range)?;
        self.apply_accel_rate(config.accel_rate)?;
        self.set_driver_lowpass(config.accel_rate.hz(), config.lowpass_cutoff_hz);
        self.apply_accel_bandwidth(config.accel_bandwidth)?;
        self.apply_mag_range(config.mag_range)?;
        self.apply_mag_rate(config.mag_rate)?;

        self.accel.reads_since_reset = 0;
        self.mag.reads_since_reset = 0;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "LSM303D reset: CTRL1=0x{:02x} CTRL7=0x{:02x}",
            self.watchdog.expected(Channel::Accel),
            self.watchdog.expected(Channel::Mag)
        );

        Ok(())
    }

    /// Keep the sensor from interpreting other bus traffic as I2C
    fn disable_i2c(&mut self) -> Result<(), Error<I::Error>> {
        let value = self.read_reg(addr::I2C_CONTROL_1)?;
        self.write_reg(addr::I2C_CONTROL_1, value | bits::I2C1_DISABLE_SET)?;
        let value = self.read_reg(addr::I2C_CONTROL_1)?;
        self.write_reg(addr::I2C_CONTROL_1, value & bits::I2C1_DISABLE_KEEP)?;
        let value = self.read_reg(addr::I2C_CONTROL_2)?;
        self.write_reg(addr::I2C_CONTROL_2, value | bits::I2C2_DISABLE_SET)?;
        let value = self.read_reg(addr::I2C_CONTROL_1)?;
        self.write_reg(addr::I2C_CONTROL_1, value & bits::I2C1_DISABLE_FINAL_KEEP)?;
        Ok(())
    }

    fn read_reg(&mut self, address: u8) -> Result<u8, Error<I::Error>> {
        let mut value = [0u8; 1];
        self.device
            .interface
            .read_register(address, 8, &mut value)?;
        Ok(value[0])
    }

    fn write_reg(&mut self, address: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.device
            .interface
            .write_register(address, 8, &[value])?;
        Ok(())
    }

    /// Read a status byte and three little-endian counts in one burst
    fn read_output_block(&mut self, status_address: u8) -> Result<RawSample, Error<I::Error>> {
        let mut block = [0u8; 7];
        self.device
            .interface
            .read_register(status_address, 56, &mut block)?;
        Ok(RawSample::from_block(&block))
    }

    // ---------------------------------------------------------------------
    // Configuration manager
    // ---------------------------------------------------------------------

    fn apply_accel_range(&mut self, range: AccelRange) -> Result<(), Error<I::Error>> {
        self.device.ctrl_2().modify(|w| {
            w.set_afs(range.bits());
        })?;
        self.accel.range = range;
        Ok(())
    }

    fn apply_accel_rate(&mut self, rate: AccelRate) -> Result<(), Error<I::Error>> {
        self.device.ctrl_1().modify(|w| {
            w.set_aodr(rate.bits());
        })?;
        self.watchdog.set_accel_rate_bits(rate.bits());
        self.accel.rate = rate;
        Ok(())
    }

    fn apply_accel_bandwidth(&mut self, bandwidth: AccelBandwidth) -> Result<(), Error<I::Error>> {
        self.device.ctrl_2().modify(|w| {
            w.set_abw(bandwidth.bits());
        })?;
        self.accel.bandwidth = bandwidth;
        Ok(())
    }

    fn apply_mag_range(&mut self, range: MagRange) -> Result<(), Error<I::Error>> {
        self.device.ctrl_6().modify(|w| {
            w.set_mfs(range.bits());
        })?;
        self.mag.range = range;
        Ok(())
    }

    fn apply_mag_rate(&mut self, rate: MagRate) -> Result<(), Error<I::Error>> {
        self.device.ctrl_5().modify(|w| {
            w.set_m_odr(rate.bits());
        })?;
        self.mag.rate = rate;
        Ok(())
    }

    /// Set the accelerometer range to the smallest one covering `max_g`
    ///
    /// Zero selects the largest range (16 g).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `max_g` exceeds 16; the previous range
    /// stays active. Returns [`Error::Bus`] if communication fails.
    pub fn set_accel_range(&mut self, max_g: u32) -> Result<AccelRange, Error<I::Error>> {
        let range = AccelRange::select(max_g).ok_or(Error::OutOfRange)?;
        self.apply_accel_range(range)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Accel range {} g -> {}", max_g, range);

        Ok(range)
    }

    /// Set the accelerometer output data rate to the smallest one not below `hz`
    ///
    /// Zero selects 1600 Hz. The expected `CTRL1` value follows the new rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `hz` exceeds 1600; the previous rate
    /// stays active. Returns [`Error::Bus`] if communication fails.
    pub fn set_accel_rate(&mut self, hz: u32) -> Result<AccelRate, Error<I::Error>> {
        let rate = AccelRate::select(hz).ok_or(Error::OutOfRange)?;
        self.apply_accel_rate(rate)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Accel rate {} Hz -> {}", hz, rate);

        Ok(rate)
    }

    /// Set the on-chip anti-alias filter to the narrowest bandwidth not below `hz`
    ///
    /// Zero selects 773 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `hz` exceeds 773. Returns
    /// [`Error::Bus`] if communication fails.
    pub fn set_accel_onchip_bandwidth(
        &mut self,
        hz: u32,
    ) -> Result<AccelBandwidth, Error<I::Error>> {
        let bandwidth = AccelBandwidth::select(hz).ok_or(Error::OutOfRange)?;
        self.apply_accel_bandwidth(bandwidth)?;
        Ok(bandwidth)
    }

    /// Re-derive the driver-side low-pass filters
    ///
    /// A cutoff of zero or below passes samples through unchanged. The
    /// filter delay state is kept.
    pub fn set_driver_lowpass(&mut self, sample_rate_hz: f32, cutoff_hz: f32) {
        self.filter.configure(sample_rate_hz, cutoff_hz);

        #[cfg(feature = "defmt")]
        defmt::debug!("Accel lowpass {} Hz at {} Hz", cutoff_hz, sample_rate_hz);
    }

    /// Change the driver-side filter cutoff at the accelerometer's output data rate
    pub fn set_accel_lowpass(&mut self, cutoff_hz: f32) {
        self.set_driver_lowpass(self.accel.rate.hz(), cutoff_hz);
    }

    /// Set the magnetometer range to the smallest one covering `max_ga`
    ///
    /// Zero selects the largest range (12 Ga).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `max_ga` exceeds 12. Returns
    /// [`Error::Bus`] if communication fails.
    pub fn set_mag_range(&mut self, max_ga: u32) -> Result<MagRange, Error<I::Error>> {
        let range = MagRange::select(max_ga).ok_or(Error::OutOfRange)?;
        self.apply_mag_range(range)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Mag range {} Ga -> {}", max_ga, range);

        Ok(range)
    }

    /// Set the magnetometer output data rate to the smallest one not below `hz`
    ///
    /// Zero selects 100 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `hz` exceeds 100. Returns
    /// [`Error::Bus`] if communication fails.
    pub fn set_mag_rate(&mut self, hz: u32) -> Result<MagRate, Error<I::Error>> {
        let rate = MagRate::select(hz).ok_or(Error::OutOfRange)?;
        self.apply_mag_rate(rate)?;
        Ok(rate)
    }

    /// Replace the accelerometer calibration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] unless the three scale factors
    /// sum to a value strictly between 2 and 4.
    pub fn set_accel_calibration(
        &mut self,
        calibration: Calibration,
    ) -> Result<(), Error<I::Error>> {
        if !calibration.has_plausible_accel_scale() {
            return Err(Error::InvalidCalibration);
        }
        self.accel.calibration = calibration;
        Ok(())
    }

    /// Replace the magnetometer calibration
    pub fn set_mag_calibration(&mut self, calibration: Calibration) {
        self.mag.calibration = calibration;
    }

    // ---------------------------------------------------------------------
    // Getters
    // ---------------------------------------------------------------------

    /// Active accelerometer range
    pub const fn accel_range(&self) -> AccelRange {
        self.accel.range
    }

    /// Active accelerometer output data rate
    pub const fn accel_rate(&self) -> AccelRate {
        self.accel.rate
    }

    /// Active on-chip anti-alias bandwidth
    pub const fn accel_onchip_bandwidth(&self) -> AccelBandwidth {
        self.accel.bandwidth
    }

    /// Cutoff of the driver-side low-pass filter in Hz
    pub const fn accel_lowpass(&self) -> f32 {
        self.filter.cutoff_hz()
    }

    /// Accelerometer calibration
    pub const fn accel_calibration(&self) -> Calibration {
        self.accel.calibration
    }

    /// Active magnetometer range
    pub const fn mag_range(&self) -> MagRange {
        self.mag.range
    }

    /// Active magnetometer output data rate
    pub const fn mag_rate(&self) -> MagRate {
        self.mag.rate
    }

    /// Magnetometer calibration
    pub const fn mag_calibration(&self) -> Calibration {
        self.mag.calibration
    }

    /// Settings re-applied on reset
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Running counters
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Expected values of the monitored control registers
    pub const fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    /// Samples produced since the last reset
    pub const fn reads_since_reset(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Accel => self.accel.reads_since_reset,
            Channel::Mag => self.mag.reads_since_reset,
        }
    }

    /// Platform hooks
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Platform hooks, mutably
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    // ---------------------------------------------------------------------
    // Polling and queues
    // ---------------------------------------------------------------------

    const fn queue(&self, channel: Channel) -> &SampleQueue {
        match channel {
            Channel::Accel => &self.accel_queue,
            Channel::Mag => &self.mag_queue,
        }
    }

    const fn poll_interval(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Accel => self.accel.poll_interval_us,
            Channel::Mag => self.mag.poll_interval_us,
        }
    }

    fn set_poll_interval(&mut self, channel: Channel, interval_us: u32) {
        match channel {
            Channel::Accel => self.accel.poll_interval_us = interval_us,
            Channel::Mag => self.mag.poll_interval_us = interval_us,
        }
    }

    /// Whether a channel is sampled by its timer
    pub const fn is_auto_polling(&self, channel: Channel) -> bool {
        self.poll_interval(channel) > 0
    }

    /// Set how a channel is polled
    ///
    /// Switching to [`PollRate::Manual`] stops the channel's timer. The first
    /// switch from manual to a rate starts it; later rate changes adjust the
    /// running timer. Changing the accelerometer rate also re-derives the
    /// low-pass filter at the new rate with the current cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for [`PollRate::External`], a rate of
    /// zero, or a rate above 2000 Hz (accelerometer) / 1000 Hz (magnetometer).
    #[allow(clippy::cast_precision_loss)]
    pub fn set_poll_rate(
        &mut self,
        channel: Channel,
        rate: PollRate,
    ) -> Result<(), Error<I::Error>> {
        let hz = match rate {
            PollRate::Manual => {
                self.stop(channel);
                self.set_poll_interval(channel, 0);
                return Ok(());
            }
            PollRate::External | PollRate::Hz(0) => return Err(Error::InvalidConfig),
            PollRate::Max => match channel {
                Channel::Accel => ACCEL_MAX_POLL_HZ,
                Channel::Mag => MAG_POLL_HZ,
            },
            PollRate::Default => match channel {
                Channel::Accel => ACCEL_DEFAULT_POLL_HZ,
                Channel::Mag => MAG_POLL_HZ,
            },
            PollRate::Hz(hz) => hz,
        };

        let min_interval_us = match channel {
            Channel::Accel => ACCEL_MIN_POLL_INTERVAL_US,
            Channel::Mag => MAG_MIN_POLL_INTERVAL_US,
        };
        let interval_us = 1_000_000 / hz;
        if interval_us < min_interval_us {
            return Err(Error::InvalidConfig);
        }

        let want_start = !self.is_auto_polling(channel);

        if channel == Channel::Accel {
            self.set_driver_lowpass(hz as f32, self.filter.cutoff_hz());
        }

        self.set_poll_interval(channel, interval_us);

        if want_start {
            self.start(channel);
        } else {
            self.platform.set_interval(channel, interval_us);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("{} polling every {} us", channel, interval_us);

        Ok(())
    }

    /// Current polling mode: [`PollRate::Manual`] or [`PollRate::Hz`]
    pub const fn poll_rate(&self, channel: Channel) -> PollRate {
        match self.poll_interval(channel) {
            0 => PollRate::Manual,
            interval_us => PollRate::Hz(1_000_000 / interval_us),
        }
    }

    /// Restart a channel's timer at its polling interval
    ///
    /// Any queued samples of that channel are dropped.
    pub fn start(&mut self, channel: Channel) {
        self.stop(channel);
        self.queue(channel).flush();
        let interval_us = self.poll_interval(channel);
        self.platform
            .start_periodic(channel, START_DELAY_US, interval_us);
    }

    /// Stop a channel's timer
    pub fn stop(&mut self, channel: Channel) {
        self.platform.cancel(channel);
    }

    /// Change a channel's queue depth
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `depth` is outside `[1, 100]`;
    /// the queue is left untouched.
    pub fn set_queue_depth(
        &mut self,
        channel: Channel,
        depth: usize,
    ) -> Result<(), Error<I::Error>> {
        self.queue(channel)
            .resize(depth)
            .map_err(|_| Error::InvalidConfig)
    }

    /// A channel's queue depth
    pub fn queue_depth(&self, channel: Channel) -> usize {
        self.queue(channel).capacity()
    }

    /// Number of samples waiting in a channel's queue
    pub fn queued(&self, channel: Channel) -> usize {
        self.queue(channel).len()
    }

    /// Read samples of one channel
    ///
    /// With the channel's timer running, moves up to `out.len()` queued
    /// samples into `out`. In manual mode, drops anything queued, runs one
    /// cycle inline and returns its sample, if any.
    ///
    /// Returns the number of samples written.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooSmall`] if `out` is empty
    /// - [`Error::NoData`] if the timer is running but nothing is queued yet
    /// - [`Error::Bus`] if the inline cycle fails to communicate
    pub fn read(
        &mut self,
        channel: Channel,
        out: &mut [Sample],
    ) -> Result<usize, Error<I::Error>> {
        let Some(first) = out.first_mut() else {
            return Err(Error::BufferTooSmall);
        };

        if self.is_auto_polling(channel) {
            return match self.queue(channel).drain_into(out) {
                0 => Err(Error::NoData),
                count => Ok(count),
            };
        }

        self.queue(channel).flush();
        self.service(channel)?;

        match self.queue(channel).pop() {
            Some(sample) => {
                *first = sample;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    // ---------------------------------------------------------------------
    // Sampling engine
    // ---------------------------------------------------------------------

    /// Run one sampling cycle for a channel
    ///
    /// This is the body of each channel's timer callback.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn service(&mut self, channel: Channel) -> Result<CycleOutcome, Error<I::Error>> {
        match channel {
            Channel::Accel => self.accel_cycle(),
            Channel::Mag => self.mag_cycle(),
        }
    }

    /// Compare a monitored register and reset on drift
    ///
    /// Returns `true` if the register was intact.
    fn check_watchdog(&mut self, channel: Channel) -> Result<bool, Error<I::Error>> {
        let live = self.read_reg(Watchdog::monitored_register(channel))?;
        match self.watchdog.check(channel, live) {
            WatchdogVerdict::Intact => Ok(true),
            WatchdogVerdict::Drifted { expected, actual } => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "{} control register drifted: expected 0x{:02x}, read 0x{:02x}",
                    channel,
                    expected,
                    actual
                );
                #[cfg(not(feature = "defmt"))]
                let _ = (expected, actual);

                let counter = match channel {
                    Channel::Accel => &mut self.diagnostics.ctrl1_resets,
                    Channel::Mag => &mut self.diagnostics.ctrl7_resets,
                };
                *counter = counter.wrapping_add(1);
                self.reset()?;
                Ok(false)
            }
        }
    }

    fn accel_cycle(&mut self) -> Result<CycleOutcome, Error<I::Error>> {
        // reading before data-ready would return the previous sample twice
        if !self.platform.accel_data_ready() {
            if self.is_auto_polling(Channel::Accel) {
                self.diagnostics.accel_reschedules =
                    self.diagnostics.accel_reschedules.wrapping_add(1);
                self.platform
                    .delay_next(Channel::Accel, DATA_NOT_READY_RETRY_US);
            }

            #[cfg(feature = "defmt")]
            defmt::trace!("Accel data not ready, rescheduled");

            return Ok(CycleOutcome::NotReady);
        }

        if !self.check_watchdog(Channel::Accel)? {
            return Ok(CycleOutcome::Recovered);
        }

        let raw = self.read_output_block(addr::STATUS_A)?;
        let timestamp_us = self.platform.now_us();

        let scaling = self.accel.range.scale_m_s2();
        let calibrated = self.accel.calibration.apply(&raw, scaling);
        let [x, y, z] = self.filter.apply(calibrated);

        let sample = Sample {
            timestamp_us,
            x,
            y,
            z,
            x_raw: raw.x,
            y_raw: raw.y,
            z_raw: raw.z,
            scaling,
            range: self.accel.range.range_m_s2(),
        };

        self.accel_queue.push_overwrite(sample);
        self.platform.publish(Channel::Accel, &sample);

        self.accel.reads_since_reset = self.accel.reads_since_reset.wrapping_add(1);
        self.diagnostics.accel_reads = self.diagnostics.accel_reads.wrapping_add(1);

        Ok(CycleOutcome::Sampled(sample))
    }

    fn mag_cycle(&mut self) -> Result<CycleOutcome, Error<I::Error>> {
        if !self.check_watchdog(Channel::Mag)? {
            return Ok(CycleOutcome::Recovered);
        }

        let raw = self.read_output_block(addr::STATUS_M)?;
        let timestamp_us = self.platform.now_us();

        let scaling = self.mag.range.gauss_per_lsb();
        let [x, y, z] = self.mag.calibration.apply(&raw, scaling);

        let sample = Sample {
            timestamp_us,
            x,
            y,
            z,
            x_raw: raw.x,
            y_raw: raw.y,
            z_raw: raw.z,
            scaling,
            range: f32::from(self.mag.range.max_ga()),
        };

        self.mag_queue.push_overwrite(sample);
        self.platform.publish(Channel::Mag, &sample);

        self.mag.reads_since_reset = self.mag.reads_since_reset.wrapping_add(1);
        self.diagnostics.mag_reads = self.diagnostics.mag_reads.wrapping_add(1);

        Ok(CycleOutcome::Sampled(sample))
    }

    // ---------------------------------------------------------------------
    // Self-test and diagnostics
    // ---------------------------------------------------------------------

    /// Check that the accelerometer has sampled and is calibrated
    pub fn accel_self_test(&self) -> SelfTestOutcome {
        accel_self_test(self.accel.reads_since_reset, &self.accel.calibration)
    }

    /// Check that the magnetometer has sampled and is calibrated
    pub fn mag_self_test(&self) -> SelfTestOutcome {
        mag_self_test(self.mag.reads_since_reset, &self.mag.calibration)
    }

    /// Read back every documented register
    ///
    /// Compare the `CTRL_REG1` / `CTRL_REG7` entries against
    /// [`Watchdog::expected`] to see what a recovery would change.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn dump_registers(
        &mut self,
    ) -> Result<heapless::Vec<RegisterDump, REGISTER_COUNT>, Error<I::Error>> {
        let mut dump = heapless::Vec::new();
        for (address, name) in REGISTER_MAP {
            let value = self.read_reg(address)?;
            // REGISTER_MAP has exactly REGISTER_COUNT entries
            let _ = dump.push(RegisterDump {
                address,
                name,
                value,
            });
        }
        Ok(dump)
    }

    // ---------------------------------------------------------------------
    // Channel handles
    // ---------------------------------------------------------------------

    /// Accelerometer command surface
    pub fn accel(&mut self) -> Accelerometer<'_, I, P> {
        Accelerometer::new(self)
    }

    /// Magnetometer command surface
    pub fn mag(&mut self) -> Magnetometer<'_, I, P> {
        Magnetometer::new(self)
    }

    /// Stop both timers and return the bus interface and platform
    pub fn release(mut self) -> (I, P) {
        self.stop(Channel::Accel);
        self.stop(Channel::Mag);
        (self.device.interface, self.platform)
    }
}
