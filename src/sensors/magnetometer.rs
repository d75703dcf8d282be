//! Magnetometer settings
//!
//! Full-scale ranges, output data rates and conversion modes of the LSM303D
//! magnetometer, with the register encodings used in `CTRL5`, `CTRL6` and
//! `CTRL7`.

use super::quantize;

/// Magnetometer full-scale range (`CTRL6.MFS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagRange {
    /// ±2 gauss
    Ga2,
    /// ±4 gauss
    Ga4,
    /// ±8 gauss
    Ga8,
    /// ±12 gauss
    Ga12,
}

impl MagRange {
    const TABLE: [(u32, Self); 4] = [
        (2, Self::Ga2),
        (4, Self::Ga4),
        (8, Self::Ga8),
        (12, Self::Ga12),
    ];

    /// Smallest range covering `max_ga`; zero selects the maximum
    #[must_use]
    pub fn select(max_ga: u32) -> Option<Self> {
        quantize(max_ga, &Self::TABLE)
    }

    /// Register encoding for `CTRL6.MFS`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Ga2 => 0b00,
            Self::Ga4 => 0b01,
            Self::Ga8 => 0b10,
            Self::Ga12 => 0b11,
        }
    }

    /// Decode `CTRL6.MFS`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::Ga2),
            0b01 => Some(Self::Ga4),
            0b10 => Some(Self::Ga8),
            0b11 => Some(Self::Ga12),
            _ => None,
        }
    }

    /// Get the maximum value in gauss
    #[must_use]
    pub const fn max_ga(self) -> u8 {
        match self {
            Self::Ga2 => 2,
            Self::Ga4 => 4,
            Self::Ga8 => 8,
            Self::Ga12 => 12,
        }
    }

    /// Conversion factor from raw counts to gauss
    #[must_use]
    pub const fn gauss_per_lsb(self) -> f32 {
        match self {
            Self::Ga2 => 0.080e-3,
            Self::Ga4 => 0.160e-3,
            Self::Ga8 => 0.320e-3,
            Self::Ga12 => 0.479e-3,
        }
    }
}

/// Magnetometer output data rate (`CTRL5.M_ODR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagRate {
    /// 3.125 Hz
    Hz3_125,
    /// 6.25 Hz
    Hz6_25,
    /// 12.5 Hz
    Hz12_5,
    /// 25 Hz
    Hz25,
    /// 50 Hz
    Hz50,
    /// 100 Hz (only available with the accelerometer above 50 Hz)
    Hz100,
}

impl MagRate {
    const TABLE: [(u32, Self); 3] = [(25, Self::Hz25), (50, Self::Hz50), (100, Self::Hz100)];

    /// Smallest supported rate not below `hz`; zero selects the maximum
    #[must_use]
    pub fn select(hz: u32) -> Option<Self> {
        quantize(hz, &Self::TABLE)
    }

    /// Register encoding for `CTRL5.M_ODR`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Hz3_125 => 0b000,
            Self::Hz6_25 => 0b001,
            Self::Hz12_5 => 0b010,
            Self::Hz25 => 0b011,
            Self::Hz50 => 0b100,
            Self::Hz100 => 0b101,
        }
    }

    /// Decode `CTRL5.M_ODR` (0b110 is reserved, 0b111 unused)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::Hz3_125),
            0b001 => Some(Self::Hz6_25),
            0b010 => Some(Self::Hz12_5),
            0b011 => Some(Self::Hz25),
            0b100 => Some(Self::Hz50),
            0b101 => Some(Self::Hz100),
            _ => None,
        }
    }

    /// Get the sample rate in Hz
    #[must_use]
    pub const fn hz(self) -> f32 {
        match self {
            Self::Hz3_125 => 3.125,
            Self::Hz6_25 => 6.25,
            Self::Hz12_5 => 12.5,
            Self::Hz25 => 25.0,
            Self::Hz50 => 50.0,
            Self::Hz100 => 100.0,
        }
    }
}

/// Magnetometer conversion mode (`CTRL7.MD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
    /// Continuous-conversion mode
    Continuous,
    /// Single-conversion mode
    Single,
    /// Power-down mode
    PowerDown,
}

impl MagMode {
    /// Register encoding for `CTRL7.MD`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Continuous => 0b00,
            Self::Single => 0b01,
            Self::PowerDown => 0b10,
        }
    }

    /// Decode `CTRL7.MD` (0b11 is also power-down)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Continuous,
            0b01 => Self::Single,
            _ => Self::PowerDown,
        }
    }
}
