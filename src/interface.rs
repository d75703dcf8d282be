//! Bus interface implementations for the LSM303D
//!
//! This module provides implementations of the `device-driver` traits for
//! SPI and I2C communication with the LSM303D. Both interfaces serve as the
//! driver's register port: one blocking transfer at a time, no queuing.
//!
//! Multi-byte transfers set the protocol's auto-increment flag so that the
//! status byte and the three output words of a channel arrive in one burst.

use device_driver::RegisterInterface;

/// SPI read direction flag
const SPI_DIR_READ: u8 = 1 << 7;

/// SPI address auto-increment flag
const SPI_ADDR_INCREMENT: u8 = 1 << 6;

/// I2C sub-address auto-increment flag
const I2C_ADDR_INCREMENT: u8 = 1 << 7;

/// Register address bits
const ADDR_MASK: u8 = 0x3F;

/// SPI interface for the LSM303D
///
/// # Note on Chip Select
///
/// This interface uses the `SpiDevice` trait from `embedded-hal`, which manages
/// the chip select (CS) pin automatically. The LSM303D expects SPI mode 3 and
/// accepts clocks up to 10 MHz.
///
/// If using `embedded-hal-bus`, you would typically create an `SpiDevice` like:
/// ```ignore
/// let spi_device = embedded_hal_bus::spi::ExclusiveDevice::new(spi_bus, cs_pin, delay);
/// let interface = SpiInterface::new(spi_device);
/// ```
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Create a new SPI interface with the given SPI device
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the interface and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> RegisterInterface for SpiInterface<SPI>
where
    SPI: embedded_hal::spi::SpiDevice<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for SPI
        let mut command = (address & ADDR_MASK) | SPI_DIR_READ;
        if read_data.len() > 1 {
            command |= SPI_ADDR_INCREMENT;
        }

        let mut operations = [
            embedded_hal::spi::Operation::Write(&[command]),
            embedded_hal::spi::Operation::Read(read_data),
        ];

        self.spi.transaction(&mut operations)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len() for SPI
        let mut command = address & ADDR_MASK;
        if write_data.len() > 1 {
            command |= SPI_ADDR_INCREMENT;
        }

        let mut buffer = [0u8; 17];
        buffer[0] = command;
        let len = write_data.len().min(16);
        buffer[1..=len].copy_from_slice(&write_data[..len]);

        self.spi.write(&buffer[..=len])
    }
}

/// I2C address when SA0 is pulled high (default on most breakout boards)
pub const I2C_ADDRESS_SA0_HIGH: u8 = 0x1D;

/// I2C address when SA0 is pulled low
pub const I2C_ADDRESS_SA0_LOW: u8 = 0x1E;

/// I2C interface for the LSM303D
///
/// The driver disables the chip's I2C block on every reset so that SPI
/// traffic to other devices is not misread as I2C. Boards that talk to the
/// LSM303D over I2C should therefore only use this interface when the sensor
/// is alone on its bus and the CS pin is tied high.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface with the default address (0x1D, SA0 HIGH)
    pub const fn default(i2c: I2C) -> Self {
        Self {
            i2c,
            address: I2C_ADDRESS_SA0_HIGH,
        }
    }

    /// Create a new I2C interface with the alternative address (0x1E, SA0 LOW)
    pub const fn alternative(i2c: I2C) -> Self {
        Self {
            i2c,
            address: I2C_ADDRESS_SA0_LOW,
        }
    }

    /// Create a new I2C interface with a custom device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        let mut sub_address = address & ADDR_MASK;
        if read_data.len() > 1 {
            sub_address |= I2C_ADDR_INCREMENT;
        }
        self.i2c.write_read(self.address, &[sub_address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len() for I2C
        let mut sub_address = address & ADDR_MASK;
        if write_data.len() > 1 {
            sub_address |= I2C_ADDR_INCREMENT;
        }

        let mut buffer = [0u8; 17];
        buffer[0] = sub_address;
        let len = write_data.len().min(16);
        buffer[1..=len].copy_from_slice(&write_data[..len]);

        self.i2c.write(self.address, &buffer[..=len])
    }
}
