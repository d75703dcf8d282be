//! Integration tests for basic workflow scenarios

use crate::common::{
    TimerEvent, create_mock_driver, mock_interface::MockInterface, mock_platform::MockPlatform,
    test_utils::assert_float_eq,
};
use lsm303d::diagnostics::REGISTER_COUNT;
use lsm303d::{
    AccelRange, Channel, CycleOutcome, Error, ONE_G, PollRate, Sample, SensorChannel,
    SharedDriver,
};

#[test]
fn test_configure_then_stream() {
    let (mut driver, interface, platform) = create_mock_driver();

    // Range 0 selects the maximum, rates round up
    driver.accel().set_range(0).unwrap();
    driver.accel().set_sample_rate(150).unwrap();
    assert_eq!(driver.accel().range(), 16);
    assert_eq!(driver.accel().sample_rate(), 200);

    // Rejected requests leave the previous setting
    assert!(matches!(driver.accel().set_range(20), Err(Error::OutOfRange)));
    assert_eq!(driver.accel().range(), 16);

    driver.accel().set_poll_rate(PollRate::Hz(200)).unwrap();
    driver.accel().set_queue_depth(8).unwrap();
    assert!(platform
        .events()
        .contains(&TimerEvent::Start(Channel::Accel, 1000, 5000)));

    // Simulated timer ticks
    interface.set_accel_sequence(vec![[0, 0, 1366], [0, 0, 1366], [0, 0, 1367]]);
    for tick in 0..6u64 {
        platform.set_now_us(1000 + tick * 5000);
        driver.service(Channel::Accel).unwrap();
    }

    let mut out = [Sample::default(); 8];
    let count = driver.accel().read(&mut out).unwrap();
    assert_eq!(count, 6);

    let timestamps: Vec<u64> = out[..count].iter().map(|s| s.timestamp_us).collect();
    assert_eq!(timestamps, vec![1000, 6000, 11000, 16000, 21000, 26000]);
    for sample in &out[..count] {
        assert_float_eq(sample.scaling, AccelRange::G16.scale_m_s2(), 1e-9);
        assert_float_eq(sample.range, 16.0 * ONE_G, 1e-3);
    }

    // Drained
    assert!(matches!(driver.accel().read(&mut out), Err(Error::NoData)));
}

#[test]
fn test_brownout_during_streaming() {
    let (mut driver, interface, platform) = create_mock_driver();
    interface.set_accel_data(0, 0, 4096);
    interface.set_mag_data(100, 0, 0);

    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    driver.mag().set_poll_rate(PollRate::Default).unwrap();

    for _ in 0..4 {
        driver.service(Channel::Accel).unwrap();
    }
    driver.service(Channel::Mag).unwrap();

    interface.brownout();

    assert_eq!(
        driver.service(Channel::Accel).unwrap(),
        CycleOutcome::Recovered
    );
    assert!(matches!(
        driver.service(Channel::Mag).unwrap(),
        CycleOutcome::Sampled(_)
    ));
    assert!(matches!(
        driver.service(Channel::Accel).unwrap(),
        CycleOutcome::Sampled(_)
    ));

    assert_eq!(driver.diagnostics().watchdog_resets(), 1);
    assert_eq!(driver.diagnostics().accel_reads, 5);
    assert_eq!(driver.reads_since_reset(Channel::Accel), 1);
    assert_eq!(platform.published_count(Channel::Mag), 2);
}

#[test]
fn test_register_dump() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_register(0x3F, 0x5A);

    let dump = driver.dump_registers().unwrap();

    assert_eq!(dump.len(), REGISTER_COUNT);
    let who_am_i = dump.iter().find(|entry| entry.address == 0x0F).unwrap();
    assert_eq!(who_am_i.value, 0x49);
    let ctrl1 = dump.iter().find(|entry| entry.address == 0x20).unwrap();
    assert_eq!(ctrl1.value, driver.watchdog().expected(Channel::Accel));
    let act_dur = dump.iter().find(|entry| entry.address == 0x3F).unwrap();
    assert_eq!(act_dur.value, 0x5A);
}

#[test]
fn test_shared_driver_from_timer_callbacks() {
    let (driver, interface, platform) = create_mock_driver();
    interface.set_accel_data(10, 20, 30);
    interface.set_mag_data(40, 50, 60);

    let shared: SharedDriver<MockInterface, MockPlatform> = SharedDriver::new();
    assert!(shared.service(Channel::Accel).is_none());
    assert!(shared.init(driver).is_none());

    for _ in 0..3 {
        assert!(matches!(
            shared.service(Channel::Accel),
            Some(Ok(CycleOutcome::Sampled(_)))
        ));
    }
    assert!(matches!(
        shared.service(Channel::Mag),
        Some(Ok(CycleOutcome::Sampled(_)))
    ));

    let queued = shared.with(|driver| driver.queued(Channel::Accel));
    assert_eq!(queued, Some(2));
    assert_eq!(platform.published().len(), 4);

    let driver = shared.take().unwrap();
    assert_eq!(driver.diagnostics().accel_reads, 3);
    assert!(shared.take().is_none());
}

#[test]
fn test_release_stops_timers() {
    let (mut driver, _, platform) = create_mock_driver();
    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    driver.mag().set_poll_rate(PollRate::Default).unwrap();
    platform.clear_events();

    let (_interface, _platform) = driver.release();

    assert_eq!(
        platform.events(),
        vec![
            TimerEvent::Cancel(Channel::Accel),
            TimerEvent::Cancel(Channel::Mag)
        ]
    );
}

#[test]
fn test_magnetometer_is_internal() {
    let (mut driver, _, _) = create_mock_driver();
    assert!(!driver.mag().is_external());
    assert_eq!(driver.mag().channel(), Channel::Mag);
    assert_eq!(driver.accel().channel(), Channel::Accel);
}
