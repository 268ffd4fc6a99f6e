//! Construction-time error taxonomy.
//!
//! The hot path never returns errors: an unknown opcode degrades to Wait,
//! a bad channel-command address degrades to a defined wrong decode, and
//! address arithmetic wraps. The only surfaced failures are configuration
//! mistakes caught before execution starts.

use thiserror::Error;

/// Errors reported for rejected machine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CoreError {
    /// Device code does not fit the 5-bit device address space.
    #[error("device code {0} is outside the 5-bit device address space")]
    DeviceCodeOutOfRange(u8),
    /// Another device already owns this device code.
    #[error("device code {0} is already registered")]
    DeviceCodeInUse(u8),
}
