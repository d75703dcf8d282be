//! Mock platform implementation for testing the sampling engine

use lsm303d::{Channel, Platform, Sample};
use std::cell::RefCell;
use std::rc::Rc;

/// Timer requests recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// `start_periodic(channel, first_delay_us, interval_us)`
    Start(Channel, u32, u32),
    /// `cancel(channel)`
    Cancel(Channel),
    /// `set_interval(channel, interval_us)`
    Interval(Channel, u32),
    /// `delay_next(channel, delay_us)`
    Delay(Channel, u32),
}

#[derive(Debug)]
struct PlatformState {
    now_us: u64,
    data_ready: bool,
    events: Vec<TimerEvent>,
    published: Vec<(Channel, Sample)>,
}

/// Mock platform: settable clock and data-ready line, recorded timer calls
#[derive(Clone)]
pub struct MockPlatform {
    state: Rc<RefCell<PlatformState>>,
}

impl MockPlatform {
    /// Create a platform at t = 0 with the data-ready line high
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(PlatformState {
                now_us: 0,
                data_ready: true,
                events: Vec::new(),
                published: Vec::new(),
            })),
        }
    }

    /// Set the clock
    pub fn set_now_us(&self, now_us: u64) {
        self.state.borrow_mut().now_us = now_us;
    }

    /// Drive the accelerometer data-ready line
    pub fn set_data_ready(&self, ready: bool) {
        self.state.borrow_mut().data_ready = ready;
    }

    /// Timer calls in order
    pub fn events(&self) -> Vec<TimerEvent> {
        self.state.borrow().events.clone()
    }

    /// Forget recorded timer calls
    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Samples handed to `publish`, in order
    pub fn published(&self) -> Vec<(Channel, Sample)> {
        self.state.borrow().published.clone()
    }

    /// Number of samples published on one channel
    #[allow(dead_code)]
    pub fn published_count(&self, channel: Channel) -> usize {
        self.state
            .borrow()
            .published
            .iter()
            .filter(|(c, _)| *c == channel)
            .count()
    }
}

impl Platform for MockPlatform {
    fn now_us(&self) -> u64 {
        self.state.borrow().now_us
    }

    fn start_periodic(&mut self, channel: Channel, first_delay_us: u32, interval_us: u32) {
        self.state
            .borrow_mut()
            .events
            .push(TimerEvent::Start(channel, first_delay_us, interval_us));
    }

    fn cancel(&mut self, channel: Channel) {
        self.state
            .borrow_mut()
            .events
            .push(TimerEvent::Cancel(channel));
    }

    fn set_interval(&mut self, channel: Channel, interval_us: u32) {
        self.state
            .borrow_mut()
            .events
            .push(TimerEvent::Interval(channel, interval_us));
    }

    fn delay_next(&mut self, channel: Channel, delay_us: u32) {
        self.state
            .borrow_mut()
            .events
            .push(TimerEvent::Delay(channel, delay_us));
    }

    fn accel_data_ready(&mut self) -> bool {
        self.state.borrow().data_ready
    }

    fn publish(&mut self, channel: Channel, sample: &Sample) {
        self.state
            .borrow_mut()
            .published
            .push((channel, *sample));
    }
}
