//! Register definitions for the LSM303D
//!
//! The LSM303D exposes a single flat 7-bit register space shared by the
//! accelerometer, the magnetometer and the temperature sensor. Only the
//! control registers are described here as typed field sets; the output
//! blocks (`STATUS_x` followed by three little-endian counts) are read in one
//! auto-increment burst by the sampling engine and decoded by hand.
//!
//! Bit-packed settings that the configuration manager writes are modelled as
//! closed enumerations in [`crate::sensors`]; the field widths below match
//! those enumerations.

device_driver::create_device!(
    device_name: Lsm303d,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = LE;
        }

        /// WHO_AM_I - Device identification (0x0F)
        /// Expected value: 0x49
        register WhoAmI {
            const ADDRESS = 0x0F;
            const SIZE_BITS = 8;

            /// Device ID (should read 0x49)
            who_am_i: uint = 0..8,
        },

        /// CTRL0 - FIFO and high-pass configuration (0x1F)
        register Ctrl0 {
            const ADDRESS = 0x1F;
            const SIZE_BITS = 8;

            /// High-pass filter enabled for interrupt generator 2
            hpis_b: bool = 0,
            /// High-pass filter enabled for interrupt generator 1
            hpis_a: bool = 1,
            /// High-pass filter enabled for click detection
            hp_click: bool = 2,
            reserved_4_3: uint = 3..5,
            /// FIFO programmable threshold enable
            fth_en: bool = 5,
            /// FIFO enable
            fifo_en: bool = 6,
            /// Reboot memory content
            boot: bool = 7,
        },

        /// CTRL1 - Accelerometer data rate and axis enables (0x20)
        ///
        /// Monitored by the watchdog: a brownout clears this register.
        register Ctrl1 {
            const ADDRESS = 0x20;
            const SIZE_BITS = 8;

            /// X-axis enable
            axen: bool = 0,
            /// Y-axis enable
            ayen: bool = 1,
            /// Z-axis enable
            azen: bool = 2,
            /// Block data update (output registers not updated until MSB and LSB read)
            bdu: bool = 3,
            /// Accelerometer output data rate (see `AccelRate`)
            aodr: uint = 4..8,
        },

        /// CTRL2 - Accelerometer anti-alias bandwidth and full scale (0x21)
        register Ctrl2 {
            const ADDRESS = 0x21;
            const SIZE_BITS = 8;

            /// SPI serial interface mode (0 = 4-wire)
            sim: bool = 0,
            /// Accelerometer self-test enable
            ast: bool = 1,
            reserved_2: bool = 2,
            /// Accelerometer full-scale selection (see `AccelRange`)
            afs: uint = 3..6,
            /// Accelerometer anti-alias filter bandwidth (see `AccelBandwidth`)
            abw: uint = 6..8,
        },

        /// CTRL3 - INT1 routing (0x22)
        register Ctrl3 {
            const ADDRESS = 0x22;
            const SIZE_BITS = 8;

            /// Routing bits; 0x04 routes accelerometer data-ready to INT1
            int_one_routing: uint = 0..8,
        },

        /// CTRL4 - INT2 routing (0x23)
        register Ctrl4 {
            const ADDRESS = 0x23;
            const SIZE_BITS = 8;

            /// Routing bits; 0x04 routes magnetometer data-ready to INT2
            int_two_routing: uint = 0..8,
        },

        /// CTRL5 - Temperature sensor, magnetometer resolution and data rate (0x24)
        register Ctrl5 {
            const ADDRESS = 0x24;
            const SIZE_BITS = 8;

            /// Latch interrupt request on INT1_SRC
            lir_a: bool = 0,
            /// Latch interrupt request on INT2_SRC
            lir_b: bool = 1,
            /// Magnetometer output data rate (see `MagRate`)
            m_odr: uint = 2..5,
            /// Magnetometer resolution (0b11 = high)
            m_res: uint = 5..7,
            /// Temperature sensor enable
            temp_en: bool = 7,
        },

        /// CTRL6 - Magnetometer full scale (0x25)
        register Ctrl6 {
            const ADDRESS = 0x25;
            const SIZE_BITS = 8;

            reserved_4_0: uint = 0..5,
            /// Magnetometer full-scale selection (see `MagRange`)
            mfs: uint = 5..7,
            reserved_7: bool = 7,
        },

        /// CTRL7 - High-pass mode and magnetometer sensor mode (0x26)
        ///
        /// Monitored by the watchdog: a brownout moves the magnetometer out
        /// of continuous-conversion mode.
        register Ctrl7 {
            const ADDRESS = 0x26;
            const SIZE_BITS = 8;

            /// Magnetometer sensor mode (see `MagMode`)
            md: uint = 0..2,
            /// Magnetometer low-power mode
            mlp: bool = 2,
            reserved_3: bool = 3,
            /// Temperature-only mode
            t_only: bool = 4,
            /// Filtered acceleration data selection
            afds: bool = 5,
            /// High-pass filter mode for acceleration data
            ahpm: uint = 6..8,
        },

        /// STATUS_A - Accelerometer data status (0x27)
        register StatusA {
            const ADDRESS = 0x27;
            const SIZE_BITS = 8;

            /// X-axis new data available
            xada: bool = 0,
            /// Y-axis new data available
            yada: bool = 1,
            /// Z-axis new data available
            zada: bool = 2,
            /// X, Y and Z new data available
            zyxada: bool = 3,
            /// X-axis data overrun
            xaor: bool = 4,
            /// Y-axis data overrun
            yaor: bool = 5,
            /// Z-axis data overrun
            zaor: bool = 6,
            /// X, Y and Z data overrun
            zyxaor: bool = 7,
        },

        /// STATUS_M - Magnetometer data status (0x07)
        register StatusM {
            const ADDRESS = 0x07;
            const SIZE_BITS = 8;

            /// X-axis new data available
            xmda: bool = 0,
            /// Y-axis new data available
            ymda: bool = 1,
            /// Z-axis new data available
            zmda: bool = 2,
            /// X, Y and Z new data available
            zyxmda: bool = 3,
            /// X-axis data overrun
            xmor: bool = 4,
            /// Y-axis data overrun
            ymor: bool = 5,
            /// Z-axis data overrun
            zmor: bool = 6,
            /// X, Y and Z data overrun
            zyxmor: bool = 7,
        }
    }
);

// Re-export commonly used types for convenience
pub use Lsm303d as RegisterDevice;

/// Raw register addresses used outside the typed register map
pub mod addr {
    /// Undocumented interface control register used to disable I2C
    pub const I2C_CONTROL_1: u8 = 0x02;
    /// Magnetometer status, first byte of the magnetometer output block
    pub const STATUS_M: u8 = 0x07;
    /// Temperature output, low byte
    pub const OUT_TEMP_L: u8 = 0x05;
    /// Temperature output, high byte
    pub const OUT_TEMP_H: u8 = 0x06;
    /// Magnetometer X output, low byte
    pub const OUT_X_L_M: u8 = 0x08;
    /// Magnetometer Z output, high byte
    pub const OUT_Z_H_M: u8 = 0x0D;
    /// Device identification
    pub const WHO_AM_I: u8 = 0x0F;
    /// Magnetometer interrupt control
    pub const INT_CTRL_M: u8 = 0x12;
    /// Magnetometer interrupt source
    pub const INT_SRC_M: u8 = 0x13;
    /// Undocumented interface control register used to disable I2C
    pub const I2C_CONTROL_2: u8 = 0x15;
    /// Reference value X (high-pass)
    pub const REFERENCE_X: u8 = 0x1C;
    /// Reference value Y (high-pass)
    pub const REFERENCE_Y: u8 = 0x1D;
    /// Reference value Z (high-pass)
    pub const REFERENCE_Z: u8 = 0x1E;
    /// FIFO and high-pass configuration
    pub const CTRL0: u8 = 0x1F;
    /// Accelerometer data rate and axis enables
    pub const CTRL1: u8 = 0x20;
    /// Accelerometer bandwidth and full scale
    pub const CTRL2: u8 = 0x21;
    /// INT1 routing
    pub const CTRL3: u8 = 0x22;
    /// INT2 routing
    pub const CTRL4: u8 = 0x23;
    /// Temperature, magnetometer resolution and rate
    pub const CTRL5: u8 = 0x24;
    /// Magnetometer full scale
    pub const CTRL6: u8 = 0x25;
    /// Magnetometer mode
    pub const CTRL7: u8 = 0x26;
    /// Accelerometer status, first byte of the accelerometer output block
    pub const STATUS_A: u8 = 0x27;
    /// Accelerometer X output, low byte
    pub const OUT_X_L_A: u8 = 0x28;
    /// Accelerometer X output, high byte
    pub const OUT_X_H_A: u8 = 0x29;
    /// Accelerometer Y output, low byte
    pub const OUT_Y_L_A: u8 = 0x2A;
    /// Accelerometer Y output, high byte
    pub const OUT_Y_H_A: u8 = 0x2B;
    /// Accelerometer Z output, low byte
    pub const OUT_Z_L_A: u8 = 0x2C;
    /// Accelerometer Z output, high byte
    pub const OUT_Z_H_A: u8 = 0x2D;
    /// FIFO control
    pub const FIFO_CTRL: u8 = 0x2E;
    /// FIFO source
    pub const FIFO_SRC: u8 = 0x2F;
    /// Interrupt generator 1 configuration
    pub const IG_CFG1: u8 = 0x30;
    /// Interrupt generator 1 source
    pub const IG_SRC1: u8 = 0x31;
    /// Interrupt generator 1 threshold
    pub const IG_THS1: u8 = 0x32;
    /// Interrupt generator 1 duration
    pub const IG_DUR1: u8 = 0x33;
    /// Interrupt generator 2 configuration
    pub const IG_CFG2: u8 = 0x34;
    /// Interrupt generator 2 source
    pub const IG_SRC2: u8 = 0x35;
    /// Interrupt generator 2 threshold
    pub const IG_THS2: u8 = 0x36;
    /// Interrupt generator 2 duration
    pub const IG_DUR2: u8 = 0x37;
    /// Click configuration
    pub const CLICK_CFG: u8 = 0x38;
    /// Click source
    pub const CLICK_SRC: u8 = 0x39;
    /// Click threshold
    pub const CLICK_THS: u8 = 0x3A;
    /// Click time limit
    pub const TIME_LIMIT: u8 = 0x3B;
    /// Click time latency
    pub const TIME_LATENCY: u8 = 0x3C;
    /// Click time window
    pub const TIME_WINDOW: u8 = 0x3D;
    /// Sleep-to-wake activation threshold
    pub const ACT_THS: u8 = 0x3E;
    /// Sleep-to-wake activation duration
    pub const ACT_DUR: u8 = 0x3F;
}

/// Bit masks used when (re)initializing the device
pub mod bits {
    /// `I2C_CONTROL_1`: first bit set while disabling I2C
    pub const I2C1_DISABLE_SET: u8 = 0x10;
    /// `I2C_CONTROL_1`: bits kept on the second write
    pub const I2C1_DISABLE_KEEP: u8 = 0xF7;
    /// `I2C_CONTROL_2`: I2C disable bit
    pub const I2C2_DISABLE_SET: u8 = 0x80;
    /// `I2C_CONTROL_1`: bits kept on the final write
    pub const I2C1_DISABLE_FINAL_KEEP: u8 = 0xE7;
    /// CTRL1: X, Y and Z accelerometer axes enabled
    pub const CTRL1_XYZ_ENABLE: u8 = 0b0000_0111;
    /// CTRL1: block data update
    pub const CTRL1_BDU: u8 = 1 << 3;
    /// CTRL1: accelerometer output data rate field
    pub const CTRL1_AODR_MASK: u8 = 0b1111_0000;
    /// CTRL1: shift of the output data rate field
    pub const CTRL1_AODR_SHIFT: u8 = 4;
    /// CTRL3: accelerometer data-ready routed to INT1
    pub const CTRL3_DRDY_A_INT1: u8 = 0x04;
    /// CTRL4: magnetometer data-ready routed to INT2
    pub const CTRL4_DRDY_M_INT2: u8 = 0x04;
    /// CTRL5: high magnetometer resolution
    pub const CTRL5_M_RES_HIGH: u8 = 0b0110_0000;
    /// CTRL5: magnetometer data rate field
    pub const CTRL5_M_ODR_MASK: u8 = 0b0001_1100;
    /// CTRL7: magnetometer mode field
    pub const CTRL7_MD_MASK: u8 = 0b0000_0011;
}
