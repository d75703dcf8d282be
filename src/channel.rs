//! Per-channel command surface
//!
//! The accelerometer and the magnetometer share one register port, one
//! configuration manager and one watchdog, but callers address them
//! separately. [`Accelerometer`] and [`Magnetometer`] are short-lived views
//! over the driver that implement the common [`SensorChannel`] operations and
//! add what only one channel supports.
//!
//! ```ignore
//! let mut driver = Lsm303dDriver::new(interface, platform)?;
//! driver.accel().set_range(16)?;
//! driver.mag().set_poll_rate(PollRate::Default)?;
//! ```

use device_driver::RegisterInterface;

use crate::device::{Lsm303dDriver, PollRate};
use crate::platform::Platform;
use crate::self_test::SelfTestOutcome;
use crate::sensors::{AccelBandwidth, Calibration, Channel, Sample};
use crate::Error;

/// Operations common to both measurement channels
pub trait SensorChannel {
    /// Error type of the underlying bus
    type BusError;

    /// Which channel this is
    fn channel(&self) -> Channel;

    /// Read up to `out.len()` samples
    ///
    /// # Errors
    ///
    /// See [`Lsm303dDriver::read`].
    fn read(&mut self, out: &mut [Sample]) -> Result<usize, Error<Self::BusError>>;

    /// Change the polling mode
    ///
    /// # Errors
    ///
    /// See [`Lsm303dDriver::set_poll_rate`].
    fn set_poll_rate(&mut self, rate: PollRate) -> Result<(), Error<Self::BusError>>;

    /// Current polling mode
    fn poll_rate(&self) -> PollRate;

    /// Change the queue depth
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] outside `[1, 100]`.
    fn set_queue_depth(&mut self, depth: usize) -> Result<(), Error<Self::BusError>>;

    /// Current queue depth
    fn queue_depth(&self) -> usize;

    /// Select the smallest range covering `max` (g or gauss); zero selects the largest
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] above the largest range.
    fn set_range(&mut self, max: u32) -> Result<(), Error<Self::BusError>>;

    /// Active range in whole g or gauss
    fn range(&self) -> u32;

    /// Select the smallest output data rate not below `hz`; zero selects the fastest
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] above the fastest rate.
    fn set_sample_rate(&mut self, hz: u32) -> Result<(), Error<Self::BusError>>;

    /// Active output data rate in Hz
    fn sample_rate(&self) -> u32;

    /// Replace the calibration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] if the channel rejects it.
    fn set_calibration(&mut self, calibration: Calibration) -> Result<(), Error<Self::BusError>>;

    /// Current calibration
    fn calibration(&self) -> Calibration;

    /// Re-initialize the device (affects both channels)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    fn reset(&mut self) -> Result<(), Error<Self::BusError>>;

    /// Check that the channel has sampled and is calibrated
    fn self_test(&self) -> SelfTestOutcome;
}

/// Accelerometer view over the driver
pub struct Accelerometer<'a, I, P> {
    driver: &'a mut Lsm303dDriver<I, P>,
}

impl<'a, I, P> Accelerometer<'a, I, P> {
    pub(crate) fn new(driver: &'a mut Lsm303dDriver<I, P>) -> Self {
        Self { driver }
    }
}

impl<I, P> Accelerometer<'_, I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: Platform,
{
    /// Change the driver-side low-pass cutoff (zero disables filtering)
    pub fn set_lowpass(&mut self, cutoff_hz: f32) {
        self.driver.set_accel_lowpass(cutoff_hz);
    }

    /// Driver-side low-pass cutoff in Hz
    pub fn lowpass(&self) -> f32 {
        self.driver.accel_lowpass()
    }

    /// Select the on-chip anti-alias bandwidth
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] above 773 Hz.
    pub fn set_onchip_bandwidth(&mut self, hz: u32) -> Result<AccelBandwidth, Error<I::Error>> {
        self.driver.set_accel_onchip_bandwidth(hz)
    }

    /// Active on-chip anti-alias bandwidth
    pub fn onchip_bandwidth(&self) -> AccelBandwidth {
        self.driver.accel_onchip_bandwidth()
    }
}

impl<I, P> SensorChannel for Accelerometer<'_, I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: Platform,
{
    type BusError = I::Error;

    fn channel(&self) -> Channel {
        Channel::Accel
    }

    fn read(&mut self, out: &mut [Sample]) -> Result<usize, Error<I::Error>> {
        self.driver.read(Channel::Accel, out)
    }

    fn set_poll_rate(&mut self, rate: PollRate) -> Result<(), Error<I::Error>> {
        self.driver.set_poll_rate(Channel::Accel, rate)
    }

    fn poll_rate(&self) -> PollRate {
        self.driver.poll_rate(Channel::Accel)
    }

    fn set_queue_depth(&mut self, depth: usize) -> Result<(), Error<I::Error>> {
        self.driver.set_queue_depth(Channel::Accel, depth)
    }

    fn queue_depth(&self) -> usize {
        self.driver.queue_depth(Channel::Accel)
    }

    fn set_range(&mut self, max: u32) -> Result<(), Error<I::Error>> {
        self.driver.set_accel_range(max).map(|_| ())
    }

    fn range(&self) -> u32 {
        u32::from(self.driver.accel_range().max_g())
    }

    fn set_sample_rate(&mut self, hz: u32) -> Result<(), Error<I::Error>> {
        self.driver.set_accel_rate(hz).map(|_| ())
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn sample_rate(&self) -> u32 {
        self.driver.accel_rate().hz() as u32
    }

    fn set_calibration(&mut self, calibration: Calibration) -> Result<(), Error<I::Error>> {
        self.driver.set_accel_calibration(calibration)
    }

    fn calibration(&self) -> Calibration {
        self.driver.accel_calibration()
    }

    fn reset(&mut self) -> Result<(), Error<I::Error>> {
        self.driver.reset()
    }

    fn self_test(&self) -> SelfTestOutcome {
        self.driver.accel_self_test()
    }
}

/// Magnetometer view over the driver
pub struct Magnetometer<'a, I, P> {
    driver: &'a mut Lsm303dDriver<I, P>,
}

impl<'a, I, P> Magnetometer<'a, I, P> {
    pub(crate) fn new(driver: &'a mut Lsm303dDriver<I, P>) -> Self {
        Self { driver }
    }

    /// Whether the magnetometer sits on an external board
    ///
    /// Always `false`: it shares the package with the accelerometer.
    pub const fn is_external(&self) -> bool {
        false
    }
}

impl<I, P> SensorChannel for Magnetometer<'_, I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: Platform,
{
    type BusError = I::Error;

    fn channel(&self) -> Channel {
        Channel::Mag
    }

    fn read(&mut self, out: &mut [Sample]) -> Result<usize, Error<I::Error>> {
        self.driver.read(Channel::Mag, out)
    }

    fn set_poll_rate(&mut self, rate: PollRate) -> Result<(), Error<I::Error>> {
        self.driver.set_poll_rate(Channel::Mag, rate)
    }

    fn poll_rate(&self) -> PollRate {
        self.driver.poll_rate(Channel::Mag)
    }

    fn set_queue_depth(&mut self, depth: usize) -> Result<(), Error<I::Error>> {
        self.driver.set_queue_depth(Channel::Mag, depth)
    }

    fn queue_depth(&self) -> usize {
        self.driver.queue_depth(Channel::Mag)
    }

    fn set_range(&mut self, max: u32) -> Result<(), Error<I::Error>> {
        self.driver.set_mag_range(max).map(|_| ())
    }

    fn range(&self) -> u32 {
        u32::from(self.driver.mag_range().max_ga())
    }

    fn set_sample_rate(&mut self, hz: u32) -> Result<(), Error<I::Error>> {
        self.driver.set_mag_rate(hz).map(|_| ())
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn sample_rate(&self) -> u32 {
        self.driver.mag_rate().hz() as u32
    }

    fn set_calibration(&mut self, calibration: Calibration) -> Result<(), Error<I::Error>> {
        self.driver.set_mag_calibration(calibration);
        Ok(())
    }

    fn calibration(&self) -> Calibration {
        self.driver.mag_calibration()
    }

    fn reset(&mut self) -> Result<(), Error<I::Error>> {
        self.driver.reset()
    }

    fn self_test(&self) -> SelfTestOutcome {
        self.driver.mag_self_test()
    }
}
