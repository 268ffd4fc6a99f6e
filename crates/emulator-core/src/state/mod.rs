//! Architectural CPU state model primitives.

mod registers;

pub use registers::{IndexTag, Registers, INDEX_REGISTER_COUNT};
