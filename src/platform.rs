//! Platform hooks used by the sampling engine
//!
//! The driver does not own a timer, a clock or an interrupt line. Everything it
//! needs from the surrounding system goes through [`Platform`]: a monotonic
//! microsecond clock, one periodic timer per channel, the accelerometer
//! data-ready line and a sink for fresh samples.
//!
//! Timer callbacks are expected to call back into the driver, usually through
//! [`crate::SharedDriver::service`].

use crate::sensors::{Channel, Sample};

/// Timer, clock and notification services for the driver
///
/// # Invariants
///
/// - `now_us` is monotonic
/// - Each channel has at most one armed timer; `start_periodic` replaces it
/// - `cancel` on an idle channel is a no-op
pub trait Platform {
    /// Current time in microseconds since boot
    fn now_us(&self) -> u64;

    /// Arm the channel's periodic timer
    ///
    /// The first callback fires after `first_delay_us`, then every
    /// `interval_us`.
    fn start_periodic(&mut self, channel: Channel, first_delay_us: u32, interval_us: u32);

    /// Disarm the channel's periodic timer
    fn cancel(&mut self, channel: Channel);

    /// Change the interval of a running periodic timer
    ///
    /// The default re-arms the timer, which also restarts its phase.
    fn set_interval(&mut self, channel: Channel, interval_us: u32) {
        self.start_periodic(channel, interval_us, interval_us);
    }

    /// Move the channel's next callback to `delay_us` from now
    ///
    /// Used when the accelerometer had no new data yet. The periodic
    /// interval is unchanged afterwards.
    fn delay_next(&mut self, channel: Channel, delay_us: u32);

    /// State of the accelerometer data-ready line
    ///
    /// Boards without the line wired report `true`, and the driver reads
    /// whatever the output registers hold.
    fn accel_data_ready(&mut self) -> bool {
        true
    }

    /// Hand a fresh sample to subscribers
    fn publish(&mut self, channel: Channel, sample: &Sample) {
        let _ = (channel, sample);
    }
}
