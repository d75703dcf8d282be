//! Driver access from timer callbacks
//!
//! Timer callbacks cannot borrow the driver from the code that configures it.
//! [`SharedDriver`] parks the driver behind a `critical_section::Mutex` so a
//! `static` can be reached from both sides:
//!
//! ```ignore
//! static LSM303D: SharedDriver<Spi, Board> = SharedDriver::new();
//!
//! LSM303D.init(Lsm303dDriver::new(interface, board)?);
//!
//! // in the accelerometer timer interrupt
//! let _ = LSM303D.service(Channel::Accel);
//! ```
//!
//! Each access holds the critical section for the full call, which for
//! [`SharedDriver::service`] is one register burst.

use core::cell::RefCell;

use critical_section::Mutex;
use device_driver::RegisterInterface;

use crate::Error;
use crate::device::{CycleOutcome, Lsm303dDriver};
use crate::platform::Platform;
use crate::sensors::Channel;

/// A driver slot shared between thread and interrupt context
pub struct SharedDriver<I, P> {
    slot: Mutex<RefCell<Option<Lsm303dDriver<I, P>>>>,
}

impl<I, P> SharedDriver<I, P> {
    /// Create an empty slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Place a driver in the slot, returning the previous one
    pub fn init(&self, driver: Lsm303dDriver<I, P>) -> Option<Lsm303dDriver<I, P>> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).replace(driver))
    }

    /// Take the driver out of the slot
    pub fn take(&self) -> Option<Lsm303dDriver<I, P>> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the driver inside a critical section
    ///
    /// Returns `None` if the slot is empty.
    pub fn with<R>(&self, f: impl FnOnce(&mut Lsm303dDriver<I, P>) -> R) -> Option<R> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<I, P> SharedDriver<I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: Platform,
{
    /// Run one sampling cycle; call this from the channel's timer callback
    ///
    /// Returns `None` if the slot is empty.
    pub fn service(&self, channel: Channel) -> Option<Result<CycleOutcome, Error<I::Error>>> {
        self.with(|driver| driver.service(channel))
    }
}

impl<I, P> Default for SharedDriver<I, P> {
    fn default() -> Self {
        Self::new()
    }
}
