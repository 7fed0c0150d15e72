//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one layer against mock
//! adapters.  Everything runs on the host with no sensor hardware.

mod detector_scenario_tests;
mod mock_sensor;
mod service_tests;
