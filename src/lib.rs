#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod channel;
pub mod device;
pub mod diagnostics;
pub mod filter;
pub mod interface;
pub mod platform;
pub mod registers;
pub mod ring_buffer;
pub mod sensors;
pub mod shared;
pub mod watchdog;

// Re-export main types
pub use channel::{Accelerometer, Magnetometer, SensorChannel};
pub use device::{CycleOutcome, DriverConfig, Lsm303dDriver, PollRate};
pub use diagnostics::{Diagnostics, RegisterDump};
pub use filter::{FilterBank, LowPassFilter2p};
pub use interface::{I2cInterface, SpiInterface};
pub use platform::Platform;
pub use ring_buffer::{RingBuffer, SampleQueue};
pub use self_test::{Axis, SelfTestOutcome};
pub use sensors::{
    AccelBandwidth, AccelRange, AccelRate, Calibration, Channel, MagMode, MagRange, MagRate,
    ONE_G, RawSample, Sample,
};
pub use shared::SharedDriver;
pub use watchdog::{Watchdog, WatchdogVerdict};

/// LSM303D I2C address when SA0 is high (default: 0x1D)
///
/// Use [`I2cInterface::default()`] for this configuration.
pub const I2C_ADDRESS_SA0_HIGH: u8 = interface::I2C_ADDRESS_SA0_HIGH;

/// LSM303D I2C address when SA0 is low (alternative: 0x1E)
///
/// Use [`I2cInterface::alternative()`] for this configuration.
pub const I2C_ADDRESS_SA0_LOW: u8 = interface::I2C_ADDRESS_SA0_LOW;

/// Expected value of `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0x49;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Invalid configuration parameter (polling rate, queue depth)
    InvalidConfig,
    /// Requested range, rate or bandwidth is above what the sensor supports
    OutOfRange,
    /// Calibration rejected (accelerometer scales must sum to between 2 and 4)
    InvalidCalibration,
    /// No sample queued yet; try again later
    NoData,
    /// Output buffer has no room for a single sample
    BufferTooSmall,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
