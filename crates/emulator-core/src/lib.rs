//! Core CPU emulator for a 16-bit word-addressed minicomputer.
//!
//! The crate models the machine as plain owned state driven by a
//! synchronous `step` loop: fetch, decode, execute, with vectored
//! interrupt delivery checked between instructions. Hosts embed a
//! [`Cpu`], load a storage image, register peripheral devices, and step
//! or run it; there are no callbacks into the host during execution.

/// Core storage model.
pub mod memory;
pub use memory::{Memory, MemorySize};

/// Architectural register file primitives.
pub mod state;
pub use state::{IndexTag, Registers, INDEX_REGISTER_COUNT};

/// Opcode assignment table.
pub mod encoding;
pub use encoding::{Opcode, OPCODE_TABLE};

/// Instruction fetch and field extraction.
pub mod decoder;
pub use decoder::{encode_word, fetch_and_decode, DecodedInstruction};

/// Configuration error taxonomy.
pub mod error;
pub use error::CoreError;

/// Instruction execution engine.
pub mod execute;
pub use execute::{effective_address, execute_instruction};

/// Programmed I/O bus and vectored interrupt machinery.
pub mod io;
pub use io::{
    Device, InterruptController, InterruptSink, IoFunction, Iocc, DEVICE_SLOTS, INTERRUPT_LEVELS,
    INTERRUPT_VECTOR_BASE,
};

/// Peripheral device implementations.
pub mod peripherals;
pub use peripherals::{ConsoleEntrySwitches, CONSOLE_DEVICE_CODE};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_window, DisassemblyRow};

/// Host-facing machine container and driving surface.
pub mod api;
pub use api::{CoreSnapshot, Cpu, StepOutcome};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
