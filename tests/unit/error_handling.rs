//! Unit tests for error handling and recovery

use crate::common::{
    MockError, create_mock_driver, mock_interface::MockInterface, mock_platform::MockPlatform,
};
use lsm303d::{AccelRange, Channel, DriverConfig, Error, Lsm303dDriver, SensorChannel};

#[test]
fn test_wrong_who_am_i() {
    let interface = MockInterface::new();
    interface.set_who_am_i(0x33);

    let result = Lsm303dDriver::new(interface, MockPlatform::new());
    assert!(matches!(result, Err(Error::InvalidDevice(0x33))));
}

#[test]
fn test_probe_read_failure() {
    let interface = MockInterface::new();
    interface.fail_next_read();

    let result = Lsm303dDriver::new(interface, MockPlatform::new());
    assert!(matches!(result, Err(Error::Bus(MockError::Communication))));
}

#[test]
fn test_probe_discards_first_read() {
    let interface = MockInterface::new();

    Lsm303dDriver::new(interface.clone(), MockPlatform::new()).unwrap();

    let who_am_i_reads = interface
        .operations()
        .iter()
        .filter(|op| {
            matches!(
                op,
                crate::common::Operation::ReadRegister { address: 0x0F, .. }
            )
        })
        .count();
    assert_eq!(who_am_i_reads, 2);
}

#[test]
fn test_invalid_queue_depth_in_config() {
    let config = DriverConfig {
        queue_depth: 0,
        ..DriverConfig::default()
    };

    let result = Lsm303dDriver::with_config(MockInterface::new(), MockPlatform::new(), config);
    assert!(matches!(result, Err(Error::InvalidConfig)));
}

#[test]
fn test_queue_depth_from_config() {
    let config = DriverConfig {
        queue_depth: 16,
        ..DriverConfig::default()
    };

    let mut driver =
        Lsm303dDriver::with_config(MockInterface::new(), MockPlatform::new(), config).unwrap();
    assert_eq!(driver.accel().queue_depth(), 16);
    assert_eq!(driver.mag().queue_depth(), 16);
}

#[test]
fn test_cycle_read_failure() {
    let (mut driver, interface, platform) = create_mock_driver();

    interface.fail_next_read();

    let result = driver.service(Channel::Accel);
    assert!(matches!(result, Err(Error::Bus(MockError::Communication))));
    assert!(platform.published().is_empty());
    assert_eq!(driver.diagnostics().accel_reads, 0);
}

#[test]
fn test_cycle_recovers_after_single_failure() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_mag_data(1, 2, 3);

    interface.fail_next_read();
    assert!(driver.service(Channel::Mag).is_err());

    assert!(driver.service(Channel::Mag).is_ok());
    assert_eq!(driver.diagnostics().mag_reads, 1);
}

#[test]
fn test_write_failure_keeps_previous_range() {
    let (mut driver, interface, _) = create_mock_driver();

    // CTRL2 read-modify-write: the read passes, the write fails
    interface.fail_next_write();
    let result = driver.accel().set_range(16);

    assert!(matches!(result, Err(Error::Bus(MockError::Communication))));
    assert_eq!(driver.accel_range(), AccelRange::G8);
}

#[test]
fn test_write_failure_keeps_expected_ctrl1() {
    let (mut driver, interface, _) = create_mock_driver();

    interface.fail_next_write();
    assert!(driver.accel().set_sample_rate(1600).is_err());

    assert_eq!(driver.watchdog().expected(Channel::Accel), 0x97);
    assert_eq!(driver.accel().sample_rate(), 800);
}

#[test]
fn test_manual_read_propagates_bus_error() {
    let (mut driver, interface, _) = create_mock_driver();

    interface.fail_next_read();
    let mut out = [lsm303d::Sample::default(); 1];

    assert!(matches!(
        driver.accel().read(&mut out),
        Err(Error::Bus(MockError::Communication))
    ));
}

#[test]
fn test_reset_failure() {
    let (mut driver, interface, _) = create_mock_driver();

    interface.fail_next_write();
    assert!(driver.mag().reset().is_err());

    // A later reset completes
    driver.mag().reset().unwrap();
    assert_eq!(interface.get_register(0x26), 0x00);
}
