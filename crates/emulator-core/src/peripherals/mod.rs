//! Peripheral device implementations.

mod console;

pub use console::{ConsoleEntrySwitches, CONSOLE_DEVICE_CODE};
