//! Accelerometer settings
//!
//! Full-scale ranges, output data rates and on-chip anti-alias bandwidths of
//! the LSM303D accelerometer, with the register encodings used in `CTRL1` and
//! `CTRL2`.

use super::quantize;

/// Standard gravity in m/s²
pub const ONE_G: f32 = 9.806_65;

/// Accelerometer full-scale range (`CTRL2.AFS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    /// ±2g range (most sensitive, least range)
    G2,
    /// ±4g range
    G4,
    /// ±6g range
    G6,
    /// ±8g range
    G8,
    /// ±16g range (least sensitive, most range)
    G16,
}

impl AccelRange {
    /// Selection table, ascending
    const TABLE: [(u32, Self); 5] = [
        (2, Self::G2),
        (4, Self::G4),
        (6, Self::G6),
        (8, Self::G8),
        (16, Self::G16),
    ];

    /// Smallest range covering `max_g`; zero selects the maximum
    #[must_use]
    pub fn select(max_g: u32) -> Option<Self> {
        quantize(max_g, &Self::TABLE)
    }

    /// Register encoding for `CTRL2.AFS`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::G2 => 0b000,
            Self::G4 => 0b001,
            Self::G6 => 0b010,
            Self::G8 => 0b011,
            Self::G16 => 0b100,
        }
    }

    /// Decode `CTRL2.AFS`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::G2),
            0b001 => Some(Self::G4),
            0b010 => Some(Self::G6),
            0b011 => Some(Self::G8),
            0b100 => Some(Self::G16),
            _ => None,
        }
    }

    /// Get the maximum value in g
    #[must_use]
    pub const fn max_g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G6 => 6,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Sensitivity in milli-g per LSB, from the datasheet
    #[must_use]
    pub const fn mg_per_lsb(self) -> f32 {
        match self {
            Self::G2 => 0.061,
            Self::G4 => 0.122,
            Self::G6 => 0.183,
            Self::G8 => 0.244,
            Self::G16 => 0.732,
        }
    }

    /// Conversion factor from raw counts to m/s²
    #[must_use]
    pub fn scale_m_s2(self) -> f32 {
        self.mg_per_lsb() * 1.0e-3 * ONE_G
    }

    /// Full-scale range in m/s²
    #[must_use]
    pub fn range_m_s2(self) -> f32 {
        f32::from(self.max_g()) * ONE_G
    }
}

/// Accelerometer output data rate (`CTRL1.AODR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRate {
    /// Accelerometer powered down
    PowerDown,
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
    /// 100 Hz
    Hz100,
    /// 200 Hz
    Hz200,
    /// 400 Hz
    Hz400,
    /// 800 Hz
    Hz800,
    /// 1600 Hz
    Hz1600,
}

impl AccelRate {
    /// Rates the driver selects from, ascending
    const TABLE: [(u32, Self); 5] = [
        (100, Self::Hz100),
        (200, Self::Hz200),
        (400, Self::Hz400),
        (800, Self::Hz800),
        (1600, Self::Hz1600),
    ];

    /// Smallest supported rate not below `hz`; zero selects the maximum
    ///
    /// Only 100 Hz and above are offered: slower rates alias against the
    /// driver-side low-pass filter.
    #[must_use]
    pub fn select(hz: u32) -> Option<Self> {
        quantize(hz, &Self::TABLE)
    }

    /// Register encoding for `CTRL1.AODR`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::PowerDown => 0b0000,
            Self::Hz3_125 => 0b0001,
            Self::Hz6_25 => 0b0010,
            Self::Hz12_5 => 0b0011,
            Self::Hz25 => 0b0100,
            Self::Hz50 => 0b0101,
            Self::Hz100 => 0b0110,
            Self::Hz200 => 0b0111,
            Self::Hz400 => 0b1000,
            Self::Hz800 => 0b1001,
            Self::Hz1600 => 0b1010,
        }
    }

    /// Decode `CTRL1.AODR`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b0000 => Some(Self::PowerDown),
            0b0001 => Some(Self::Hz3_125),
            0b0010 => Some(Self::Hz6_25),
            0b0011 => Some(Self::Hz12_5),
            0b0100 => Some(Self::Hz25),
            0b0101 => Some(Self::Hz50),
            0b0110 => Some(Self::Hz100),
            0b0111 => Some(Self::Hz200),
            0b1000 => Some(Self::Hz400),
            0b1001 => Some(Self::Hz800),
            0b1010 => Some(Self::Hz1600),
            _ => None,
        }
    }

    /// Get the sample rate in Hz
    #[must_use]
    pub const fn hz(self) -> f32 {
        match self {
            Self::PowerDown => 0.0,
            Self::Hz3_125 => 3.125,
            Self::Hz6_25 => 6.25,
            Self::Hz12_5 => 12.5,
            Self::Hz25 => 25.0,
            Self::Hz50 => 50.0,
            Self::Hz100 => 100.0,
            Self::Hz200 => 200.0,
            Self::Hz400 => 400.0,
            Self::Hz800 => 800.0,
            Self::Hz1600 => 1600.0,
        }
    }
}

/// Accelerometer anti-alias filter bandwidth (`CTRL2.ABW`)
///
/// This filter runs in the analog domain ahead of the ADC. The driver-side
/// two-pole filter is designed to operate behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelBandwidth {
    /// 773 Hz
    Hz773,
    /// 194 Hz
    Hz194,
    /// 362 Hz
    Hz362,
    /// 50 Hz
    Hz50,
}

impl AccelBandwidth {
    /// Selection table, ascending
    const TABLE: [(u32, Self); 4] = [
        (50, Self::Hz50),
        (194, Self::Hz194),
        (362, Self::Hz362),
        (773, Self::Hz773),
    ];

    /// Smallest bandwidth not below `hz`; zero selects the widest
    #[must_use]
    pub fn select(hz: u32) -> Option<Self> {
        quantize(hz, &Self::TABLE)
    }

    /// Register encoding for `CTRL2.ABW`
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Hz773 => 0b00,
            Self::Hz194 => 0b01,
            Self::Hz362 => 0b10,
            Self::Hz50 => 0b11,
        }
    }

    /// Decode `CTRL2.ABW`
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::Hz773),
            0b01 => Some(Self::Hz194),
            0b10 => Some(Self::Hz362),
            0b11 => Some(Self::Hz50),
            _ => None,
        }
    }

    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn hz(self) -> u16 {
        match self {
            Self::Hz773 => 773,
            Self::Hz194 => 194,
            Self::Hz362 => 362,
            Self::Hz50 => 50,
        }
    }
}
