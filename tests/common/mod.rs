//! Common test utilities and mock implementations

pub mod mock_platform;

pub use mock_interface::{MockError, Operation};
pub use mock_platform::TimerEvent;
pub use test_utils::{create_mock_driver, create_mock_driver_with, create_unfiltered_driver};
