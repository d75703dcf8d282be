//! Configuration watchdog
//!
//! A supply brownout can reset the LSM303D's control registers while the host
//! keeps running. The chip keeps answering on the bus, but it samples at the
//! wrong rate, or not at all. Before every raw read the sampling engine
//! compares one live control register per channel against the value the
//! driver last wrote:
//!
//! - accelerometer: `CTRL1` (data rate, BDU, axis enables)
//! - magnetometer: `CTRL7` (conversion mode)
//!
//! Any difference triggers a full reset of the device.

use crate::registers::bits;
use crate::sensors::Channel;

/// Result of comparing a live control register with its expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogVerdict {
    /// Register matches
    Intact,
    /// Register differs; the device must be re-initialized
    Drifted {
        /// Value the driver expects
        expected: u8,
        /// Value read from the device
        actual: u8,
    },
}

/// Expected values of the two monitored control registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Watchdog {
    ctrl1: u8,
    ctrl7: u8,
}

impl Watchdog {
    /// Create a watchdog with both expectations cleared
    #[must_use]
    pub const fn new() -> Self {
        Self { ctrl1: 0, ctrl7: 0 }
    }

    /// Register address monitored for a channel
    #[must_use]
    pub const fn monitored_register(channel: Channel) -> u8 {
        match channel {
            Channel::Accel => crate::registers::addr::CTRL1,
            Channel::Mag => crate::registers::addr::CTRL7,
        }
    }

    /// Expected value for a channel's monitored register
    #[must_use]
    pub const fn expected(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Accel => self.ctrl1,
            Channel::Mag => self.ctrl7,
        }
    }

    /// Record the full value just written to a channel's monitored register
    pub fn set_expected(&mut self, channel: Channel, value: u8) {
        match channel {
            Channel::Accel => self.ctrl1 = value,
            Channel::Mag => self.ctrl7 = value,
        }
    }

    /// Replace the data rate field of the expected `CTRL1`
    pub fn set_accel_rate_bits(&mut self, rate_bits: u8) {
        self.ctrl1 = (self.ctrl1 & !bits::CTRL1_AODR_MASK)
            | ((rate_bits << bits::CTRL1_AODR_SHIFT) & bits::CTRL1_AODR_MASK);
    }

    /// Compare a live register value against the expectation
    #[must_use]
    pub const fn check(&self, channel: Channel, actual: u8) -> WatchdogVerdict {
        let expected = self.expected(channel);
        if expected == actual {
            WatchdogVerdict::Intact
        } else {
            WatchdogVerdict::Drifted { expected, actual }
        }
    }
}
