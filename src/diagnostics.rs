//! Driver counters and register dumps

use crate::registers::addr;

/// Running counters kept by the sampling engine
///
/// Counters only grow; a device reset does not clear them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Accelerometer samples produced
    pub accel_reads: u32,
    /// Magnetometer samples produced
    pub mag_reads: u32,
    /// Accelerometer cycles re-armed because no new data was ready
    pub accel_reschedules: u32,
    /// Resets triggered by an unexpected `CTRL1`
    pub ctrl1_resets: u32,
    /// Resets triggered by an unexpected `CTRL7`
    pub ctrl7_resets: u32,
}

impl Diagnostics {
    /// Total number of watchdog-triggered resets
    #[must_use]
    pub const fn watchdog_resets(&self) -> u32 {
        self.ctrl1_resets.saturating_add(self.ctrl7_resets)
    }
}

/// One register as read back by [`crate::Lsm303dDriver::dump_registers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDump {
    /// Register address
    pub address: u8,
    /// Datasheet name
    pub name: &'static str,
    /// Value read from the device
    pub value: u8,
}

/// Number of registers in [`REGISTER_MAP`]
pub const REGISTER_COUNT: usize = 44;

/// Registers included in a dump, in the order they are read
pub const REGISTER_MAP: [(u8, &str); REGISTER_COUNT] = [
    (addr::WHO_AM_I, "WHO_AM_I"),
    (addr::I2C_CONTROL_1, "I2C_CONTROL1"),
    (addr::I2C_CONTROL_2, "I2C_CONTROL2"),
    (addr::STATUS_A, "STATUS_A"),
    (addr::STATUS_M, "STATUS_M"),
    (addr::CTRL0, "CTRL_REG0"),
    (addr::CTRL1, "CTRL_REG1"),
    (addr::CTRL2, "CTRL_REG2"),
    (addr::CTRL3, "CTRL_REG3"),
    (addr::CTRL4, "CTRL_REG4"),
    (addr::CTRL5, "CTRL_REG5"),
    (addr::CTRL6, "CTRL_REG6"),
    (addr::CTRL7, "CTRL_REG7"),
    (addr::OUT_TEMP_L, "TEMP_L"),
    (addr::OUT_TEMP_H, "TEMP_H"),
    (addr::INT_CTRL_M, "INT_CTRL_M"),
    (addr::INT_SRC_M, "INT_SRC_M"),
    (addr::REFERENCE_X, "REFERENCE_X"),
    (addr::REFERENCE_Y, "REFERENCE_Y"),
    (addr::REFERENCE_Z, "REFERENCE_Z"),
    (addr::OUT_X_L_A, "ACCEL_XL"),
    (addr::OUT_X_H_A, "ACCEL_XH"),
    (addr::OUT_Y_L_A, "ACCEL_YL"),
    (addr::OUT_Y_H_A, "ACCEL_YH"),
    (addr::OUT_Z_L_A, "ACCEL_ZL"),
    (addr::OUT_Z_H_A, "ACCEL_ZH"),
    (addr::FIFO_CTRL, "FIFO_CTRL"),
    (addr::FIFO_SRC, "FIFO_SRC"),
    (addr::IG_CFG1, "IG_CFG1"),
    (addr::IG_SRC1, "IG_SRC1"),
    (addr::IG_THS1, "IG_THS1"),
    (addr::IG_DUR1, "IG_DUR1"),
    (addr::IG_CFG2, "IG_CFG2"),
    (addr::IG_SRC2, "IG_SRC2"),
    (addr::IG_THS2, "IG_THS2"),
    (addr::IG_DUR2, "IG_DUR2"),
    (addr::CLICK_CFG, "CLICK_CFG"),
    (addr::CLICK_SRC, "CLICK_SRC"),
    (addr::CLICK_THS, "CLICK_THS"),
    (addr::TIME_LIMIT, "TIME_LIMIT"),
    (addr::TIME_LATENCY, "TIME_LATENCY"),
    (addr::TIME_WINDOW, "TIME_WINDOW"),
    (addr::ACT_THS, "ACT_THS"),
    (addr::ACT_DUR, "ACT_DUR"),
];
