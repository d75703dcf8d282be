//! Unit tests for polling modes, queue depth and reads

use crate::common::{TimerEvent, create_mock_driver, test_utils::assert_float_eq};
use lsm303d::{AccelRange, Channel, CycleOutcome, Error, PollRate, Sample, SensorChannel};

fn sampled_z(outcome: CycleOutcome) -> f32 {
    match outcome {
        CycleOutcome::Sampled(sample) => sample.z,
        other => panic!("Expected a sample, got {:?}", other),
    }
}

#[test]
fn test_channels_start_manual() {
    let (mut driver, _, platform) = create_mock_driver();

    assert_eq!(driver.accel().poll_rate(), PollRate::Manual);
    assert_eq!(driver.mag().poll_rate(), PollRate::Manual);
    assert!(!driver.is_auto_polling(Channel::Accel));
    assert!(
        !platform
            .events()
            .iter()
            .any(|event| matches!(event, TimerEvent::Start(..)))
    );
}

#[test]
fn test_first_rate_starts_timer() {
    let (mut driver, _, platform) = create_mock_driver();

    driver.accel().set_poll_rate(PollRate::Hz(200)).unwrap();

    assert_eq!(
        platform.events(),
        vec![
            TimerEvent::Cancel(Channel::Accel),
            TimerEvent::Start(Channel::Accel, 1000, 5000),
        ]
    );
    assert_eq!(driver.accel().poll_rate(), PollRate::Hz(200));
}

#[test]
fn test_rate_change_while_running_adjusts_interval() {
    let (mut driver, _, platform) = create_mock_driver();
    driver.accel().set_poll_rate(PollRate::Hz(200)).unwrap();
    platform.clear_events();

    driver.accel().set_poll_rate(PollRate::Hz(400)).unwrap();

    assert_eq!(
        platform.events(),
        vec![TimerEvent::Interval(Channel::Accel, 2500)]
    );
}

#[test]
fn test_manual_stops_timer() {
    let (mut driver, _, platform) = create_mock_driver();
    driver.mag().set_poll_rate(PollRate::Default).unwrap();
    platform.clear_events();

    driver.mag().set_poll_rate(PollRate::Manual).unwrap();

    assert_eq!(platform.events(), vec![TimerEvent::Cancel(Channel::Mag)]);
    assert_eq!(driver.mag().poll_rate(), PollRate::Manual);
}

#[test]
fn test_channels_have_independent_timers() {
    let (mut driver, _, platform) = create_mock_driver();

    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    driver.mag().set_poll_rate(PollRate::Default).unwrap();
    platform.clear_events();

    driver.accel().set_poll_rate(PollRate::Manual).unwrap();

    assert_eq!(platform.events(), vec![TimerEvent::Cancel(Channel::Accel)]);
    assert!(driver.is_auto_polling(Channel::Mag));
}

#[test]
fn test_default_and_max_rates() {
    let (mut driver, _, _) = create_mock_driver();

    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    assert_eq!(driver.accel().poll_rate(), PollRate::Hz(800));

    driver.accel().set_poll_rate(PollRate::Max).unwrap();
    assert_eq!(driver.accel().poll_rate(), PollRate::Hz(1600));

    driver.mag().set_poll_rate(PollRate::Default).unwrap();
    assert_eq!(driver.mag().poll_rate(), PollRate::Hz(100));

    driver.mag().set_poll_rate(PollRate::Max).unwrap();
    assert_eq!(driver.mag().poll_rate(), PollRate::Hz(100));
}

#[test]
fn test_invalid_poll_rates() {
    let (mut driver, _, platform) = create_mock_driver();

    assert!(matches!(
        driver.accel().set_poll_rate(PollRate::External),
        Err(Error::InvalidConfig)
    ));
    assert!(matches!(
        driver.accel().set_poll_rate(PollRate::Hz(0)),
        Err(Error::InvalidConfig)
    ));
    // Faster than one cycle per 500 us
    assert!(matches!(
        driver.accel().set_poll_rate(PollRate::Hz(2001)),
        Err(Error::InvalidConfig)
    ));
    // Faster than one cycle per 1000 us
    assert!(matches!(
        driver.mag().set_poll_rate(PollRate::Hz(1001)),
        Err(Error::InvalidConfig)
    ));

    assert_eq!(driver.accel().poll_rate(), PollRate::Manual);
    assert_eq!(driver.mag().poll_rate(), PollRate::Manual);
    assert!(platform.events().is_empty());
}

#[test]
fn test_poll_rate_limits_accepted() {
    let (mut driver, _, _) = create_mock_driver();

    driver.accel().set_poll_rate(PollRate::Hz(2000)).unwrap();
    driver.mag().set_poll_rate(PollRate::Hz(1000)).unwrap();

    assert_eq!(driver.accel().poll_rate(), PollRate::Hz(2000));
    assert_eq!(driver.mag().poll_rate(), PollRate::Hz(1000));
}

#[test]
fn test_accel_poll_rate_keeps_lowpass_cutoff() {
    let (mut driver, _, _) = create_mock_driver();
    driver.accel().set_lowpass(20.0);

    driver.accel().set_poll_rate(PollRate::Hz(400)).unwrap();

    assert_float_eq(driver.accel().lowpass(), 20.0, 1e-6);
}

#[test]
fn test_slow_poll_rate_keeps_samples_bounded() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_accel_data(0, 0, 4096);
    let target = 4096.0 * AccelRange::G8.scale_m_s2();

    // 30 Hz cutoff is above Nyquist at 50 Hz
    driver.accel().set_poll_rate(PollRate::Hz(50)).unwrap();
    assert_float_eq(driver.accel().lowpass(), 30.0, 1e-6);

    for _ in 0..60 {
        let z = sampled_z(driver.service(Channel::Accel).unwrap());
        assert!(z.is_finite());
        assert!(z.abs() <= 1.01 * target, "output diverged: {}", z);
    }
    let z = sampled_z(driver.service(Channel::Accel).unwrap());
    assert_float_eq(z, target, 0.01 * target);
}

#[test]
fn test_filtering_resumes_at_faster_poll_rate() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_accel_data(0, 0, 4096);
    let target = 4096.0 * AccelRange::G8.scale_m_s2();

    driver.accel().set_poll_rate(PollRate::Hz(50)).unwrap();
    driver.service(Channel::Accel).unwrap();

    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    let mut z = 0.0;
    for _ in 0..400 {
        z = sampled_z(driver.service(Channel::Accel).unwrap());
        assert!(z.is_finite());
    }
    assert_float_eq(z, target, 0.01 * target);
}

#[test]
fn test_start_flushes_queue() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_accel_data(1, 2, 3);
    driver.accel().set_poll_rate(PollRate::Default).unwrap();
    driver.service(Channel::Accel).unwrap();
    assert_eq!(driver.queued(Channel::Accel), 1);

    driver.start(Channel::Accel);

    assert_eq!(driver.queued(Channel::Accel), 0);
}

#[test]
fn test_queue_depth() {
    let (mut driver, _, _) = create_mock_driver();

    assert_eq!(driver.accel().queue_depth(), 2);
    assert_eq!(driver.mag().queue_depth(), 2);

    driver.accel().set_queue_depth(1).unwrap();
    driver.mag().set_queue_depth(100).unwrap();
    assert_eq!(driver.accel().queue_depth(), 1);
    assert_eq!(driver.mag().queue_depth(), 100);

    assert!(matches!(
        driver.accel().set_queue_depth(0),
        Err(Error::InvalidConfig)
    ));
    assert!(matches!(
        driver.accel().set_queue_depth(101),
        Err(Error::InvalidConfig)
    ));
    assert_eq!(driver.accel().queue_depth(), 1);
}

#[test]
fn test_read_into_empty_buffer() {
    let (mut driver, _, _) = create_mock_driver();

    let mut out: [Sample; 0] = [];
    assert!(matches!(
        driver.accel().read(&mut out),
        Err(Error::BufferTooSmall)
    ));
}

#[test]
fn test_read_before_first_sample() {
    let (mut driver, _, _) = create_mock_driver();
    driver.accel().set_poll_rate(PollRate::Default).unwrap();

    let mut out = [Sample::default(); 2];
    assert!(matches!(driver.accel().read(&mut out), Err(Error::NoData)));
}

#[test]
fn test_read_limited_by_buffer() {
    let (mut driver, interface, _) = create_mock_driver();
    driver.mag().set_poll_rate(PollRate::Default).unwrap();
    driver.mag().set_queue_depth(10).unwrap();
    interface.set_mag_data(1, 2, 3);

    for _ in 0..5 {
        driver.service(Channel::Mag).unwrap();
    }

    let mut out = [Sample::default(); 2];
    assert_eq!(driver.mag().read(&mut out).unwrap(), 2);
    assert_eq!(driver.queued(Channel::Mag), 3);
}

#[test]
fn test_manual_read_samples_inline() {
    let (mut driver, interface, platform) = create_mock_driver();
    interface.set_mag_data(100, 200, 300);
    platform.set_now_us(500);

    let mut out = [Sample::default(); 4];
    let count = driver.mag().read(&mut out).unwrap();

    assert_eq!(count, 1);
    assert_eq!(out[0].x_raw, 100);
    assert_eq!(out[0].timestamp_us, 500);
    assert_eq!(driver.queued(Channel::Mag), 0);
}

#[test]
fn test_manual_read_returns_fresh_sample() {
    let (mut driver, interface, _) = create_mock_driver();
    interface.set_accel_data(1, 0, 0);
    driver.service(Channel::Accel).unwrap();
    driver.service(Channel::Accel).unwrap();

    interface.set_accel_data(7, 0, 0);
    let mut out = [Sample::default(); 4];
    let count = driver.accel().read(&mut out).unwrap();

    assert_eq!(count, 1);
    assert_eq!(out[0].x_raw, 7);
}

#[test]
fn test_manual_read_without_new_data() {
    let (mut driver, _, platform) = create_mock_driver();
    platform.set_data_ready(false);

    let mut out = [Sample::default(); 1];
    assert_eq!(driver.accel().read(&mut out).unwrap(), 0);
}
