//! Sensor modules for the LSM303D
//!
//! This module provides the discrete hardware settings for each measurement
//! channel and the types shared between them:
//! - Accelerometer (3-axis, m/s²)
//! - Magnetometer (3-axis, gauss)
//!
//! Every bit-packed register setting is a small closed enumeration with a
//! `bits()` / `from_bits()` pair, so that the configuration manager's mapping
//! tables can be tested without a device.

pub mod accelerometer;
pub mod magnetometer;

// Re-export main types
pub use accelerometer::{AccelBandwidth, AccelRange, AccelRate, ONE_G};
pub use magnetometer::{MagMode, MagRange, MagRate};

/// Pick the smallest supported setting that covers `requested`
///
/// `table` lists `(limit, setting)` pairs in ascending order of `limit`.
/// A request of zero selects the largest entry. Requests above the largest
/// limit are not supported and yield `None`.
#[must_use]
pub fn quantize<T: Copy>(requested: u32, table: &[(u32, T)]) -> Option<T> {
    let (_, max) = *table.last()?;
    if requested == 0 {
        return Some(max);
    }
    table
        .iter()
        .find(|(limit, _)| requested <= *limit)
        .map(|&(_, setting)| setting)
}

/// Measurement channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Accelerometer
    Accel,
    /// Magnetometer
    Mag,
}

/// Raw counts and status byte as read from one channel's output block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// `STATUS_A` or `STATUS_M`
    pub status: u8,
    /// X-axis (raw)
    pub x: i16,
    /// Y-axis (raw)
    pub y: i16,
    /// Z-axis (raw)
    pub z: i16,
}

impl RawSample {
    /// Decode a status byte followed by three little-endian words
    #[must_use]
    pub const fn from_block(block: &[u8; 7]) -> Self {
        Self {
            status: block[0],
            x: i16::from_le_bytes([block[1], block[2]]),
            y: i16::from_le_bytes([block[3], block[4]]),
            z: i16::from_le_bytes([block[5], block[6]]),
        }
    }
}

/// Offset and scale calibration for one channel
///
/// Applied after conversion to physical units:
/// `physical = (raw * range_scale - offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Offset for X-axis, in physical units (subtracted)
    pub offset_x: f32,
    /// Scale factor for X-axis (multiplied after offset)
    pub scale_x: f32,
    /// Offset for Y-axis, in physical units (subtracted)
    pub offset_y: f32,
    /// Scale factor for Y-axis (multiplied after offset)
    pub scale_y: f32,
    /// Offset for Z-axis, in physical units (subtracted)
    pub offset_z: f32,
    /// Scale factor for Z-axis (multiplied after offset)
    pub scale_z: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            scale_x: 1.0,
            offset_y: 0.0,
            scale_y: 1.0,
            offset_z: 0.0,
            scale_z: 1.0,
        }
    }
}

impl Calibration {
    /// Lower bound (exclusive) on the sum of accelerometer scale factors
    pub const ACCEL_SCALE_SUM_MIN: f32 = 2.0;

    /// Upper bound (exclusive) on the sum of accelerometer scale factors
    pub const ACCEL_SCALE_SUM_MAX: f32 = 4.0;

    /// Convert raw counts to calibrated physical units
    #[must_use]
    pub fn apply(&self, raw: &RawSample, range_scale: f32) -> [f32; 3] {
        [
            (f32::from(raw.x) * range_scale - self.offset_x) * self.scale_x,
            (f32::from(raw.y) * range_scale - self.offset_y) * self.scale_y,
            (f32::from(raw.z) * range_scale - self.offset_z) * self.scale_z,
        ]
    }

    /// Whether the three scale factors are plausible for an accelerometer
    #[must_use]
    pub fn has_plausible_accel_scale(&self) -> bool {
        let sum = self.scale_x + self.scale_y + self.scale_z;
        sum > Self::ACCEL_SCALE_SUM_MIN && sum < Self::ACCEL_SCALE_SUM_MAX
    }

    /// Offsets as an `[x, y, z]` array
    #[must_use]
    pub const fn offsets(&self) -> [f32; 3] {
        [self.offset_x, self.offset_y, self.offset_z]
    }

    /// Scale factors as an `[x, y, z]` array
    #[must_use]
    pub const fn scales(&self) -> [f32; 3] {
        [self.scale_x, self.scale_y, self.scale_z]
    }
}

/// Calibrated sample as stored in the report queue and handed to the publisher
///
/// Accelerometer samples are in m/s² (`range` in m/s²), magnetometer samples
/// in gauss (`range` in gauss).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Capture time in microseconds, from the platform clock
    pub timestamp_us: u64,
    /// X-axis in physical units
    pub x: f32,
    /// Y-axis in physical units
    pub y: f32,
    /// Z-axis in physical units
    pub z: f32,
    /// X-axis (raw counts)
    pub x_raw: i16,
    /// Y-axis (raw counts)
    pub y_raw: i16,
    /// Z-axis (raw counts)
    pub z_raw: i16,
    /// Physical units per count active at capture time
    pub scaling: f32,
    /// Full-scale range active at capture time
    pub range: f32,
}
