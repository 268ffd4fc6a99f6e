//! Deterministic 5-bit opcode classification table.
//!
//! The opcode space is fixed at machine design time. Values with no
//! assigned operation are not decode errors; dispatch resolves them to a
//! no-op that drops the machine into Wait, matching the hardware.

/// Operations assigned in the 5-bit opcode space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Opcode {
    /// Execute I/O: dispatch a two-word channel command to a device.
    Xio,
    /// Left shift family: SLA, SLCA, SLT, SLC by modifier bits.
    ShiftLeft,
    /// Right shift family: SRA, SRT, RTE by modifier bits.
    ShiftRight,
    /// Load status: set Carry and Overflow from the modifier byte.
    LoadStatus,
    /// Store status into a memory word, then reset both flags.
    StoreStatus,
    /// Set the wait flag.
    Wait,
    /// Branch and store the return address at the target.
    BranchStore,
    /// Branch or skip on condition; one modifier bit selects the
    /// interrupt-level-resetting variant.
    BranchSkip,
    /// Load an index register (tag 0 loads the instruction address).
    LoadIndex,
    /// Store an index register.
    StoreIndex,
    /// Modify index register or memory word and skip on zero/sign change.
    ModifyIndex,
    /// Add to the accumulator.
    Add,
    /// Double-precision add to Acc:Ext.
    AddDouble,
    /// Subtract from the accumulator.
    Subtract,
    /// Double-precision subtract from Acc:Ext.
    SubtractDouble,
    /// Signed multiply, 32-bit product into Acc:Ext.
    Multiply,
    /// Signed divide of Acc:Ext; quotient to Acc, remainder to Ext.
    Divide,
    /// Load the accumulator.
    Load,
    /// Double-precision load into Acc:Ext.
    LoadDouble,
    /// Store the accumulator.
    Store,
    /// Double-precision store from Acc:Ext.
    StoreDouble,
    /// Logical AND into the accumulator.
    And,
    /// Logical OR into the accumulator.
    Or,
    /// Logical exclusive OR into the accumulator.
    ExclusiveOr,
}

/// The full assigned opcode map: raw 5-bit value, operation, base mnemonic.
///
/// Shift opcodes list the plain-shift mnemonic; the disassembler refines
/// them by modifier bits.
pub const OPCODE_TABLE: [(u8, Opcode, &str); 24] = [
    (0x01, Opcode::Xio, "XIO"),
    (0x02, Opcode::ShiftLeft, "SLA"),
    (0x03, Opcode::ShiftRight, "SRA"),
    (0x04, Opcode::LoadStatus, "LDS"),
    (0x05, Opcode::StoreStatus, "STS"),
    (0x06, Opcode::Wait, "WAIT"),
    (0x08, Opcode::BranchStore, "BSI"),
    (0x09, Opcode::BranchSkip, "BSC"),
    (0x0C, Opcode::LoadIndex, "LDX"),
    (0x0D, Opcode::StoreIndex, "STX"),
    (0x0E, Opcode::ModifyIndex, "MDX"),
    (0x10, Opcode::Add, "A"),
    (0x11, Opcode::AddDouble, "AD"),
    (0x12, Opcode::Subtract, "S"),
    (0x13, Opcode::SubtractDouble, "SD"),
    (0x14, Opcode::Multiply, "M"),
    (0x15, Opcode::Divide, "D"),
    (0x18, Opcode::Load, "LD"),
    (0x19, Opcode::LoadDouble, "LDD"),
    (0x1A, Opcode::Store, "STO"),
    (0x1B, Opcode::StoreDouble, "STD"),
    (0x1C, Opcode::And, "AND"),
    (0x1D, Opcode::Or, "OR"),
    (0x1E, Opcode::ExclusiveOr, "EOR"),
];

impl Opcode {
    /// Classifies a raw 5-bit opcode value. `None` for unassigned values.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x1F {
            0x01 => Some(Self::Xio),
            0x02 => Some(Self::ShiftLeft),
            0x03 => Some(Self::ShiftRight),
            0x04 => Some(Self::LoadStatus),
            0x05 => Some(Self::StoreStatus),
            0x06 => Some(Self::Wait),
            0x08 => Some(Self::BranchStore),
            0x09 => Some(Self::BranchSkip),
            0x0C => Some(Self::LoadIndex),
            0x0D => Some(Self::StoreIndex),
            0x0E => Some(Self::ModifyIndex),
            0x10 => Some(Self::Add),
            0x11 => Some(Self::AddDouble),
            0x12 => Some(Self::Subtract),
            0x13 => Some(Self::SubtractDouble),
            0x14 => Some(Self::Multiply),
            0x15 => Some(Self::Divide),
            0x18 => Some(Self::Load),
            0x19 => Some(Self::LoadDouble),
            0x1A => Some(Self::Store),
            0x1B => Some(Self::StoreDouble),
            0x1C => Some(Self::And),
            0x1D => Some(Self::Or),
            0x1E => Some(Self::ExclusiveOr),
            _ => None,
        }
    }

    /// Raw 5-bit opcode value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Xio => 0x01,
            Self::ShiftLeft => 0x02,
            Self::ShiftRight => 0x03,
            Self::LoadStatus => 0x04,
            Self::StoreStatus => 0x05,
            Self::Wait => 0x06,
            Self::BranchStore => 0x08,
            Self::BranchSkip => 0x09,
            Self::LoadIndex => 0x0C,
            Self::StoreIndex => 0x0D,
            Self::ModifyIndex => 0x0E,
            Self::Add => 0x10,
            Self::AddDouble => 0x11,
            Self::Subtract => 0x12,
            Self::SubtractDouble => 0x13,
            Self::Multiply => 0x14,
            Self::Divide => 0x15,
            Self::Load => 0x18,
            Self::LoadDouble => 0x19,
            Self::Store => 0x1A,
            Self::StoreDouble => 0x1B,
            Self::And => 0x1C,
            Self::Or => 0x1D,
            Self::ExclusiveOr => 0x1E,
        }
    }

    /// Base mnemonic for listings and disassembly.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Xio => "XIO",
            Self::ShiftLeft => "SLA",
            Self::ShiftRight => "SRA",
            Self::LoadStatus => "LDS",
            Self::StoreStatus => "STS",
            Self::Wait => "WAIT",
            Self::BranchStore => "BSI",
            Self::BranchSkip => "BSC",
            Self::LoadIndex => "LDX",
            Self::StoreIndex => "STX",
            Self::ModifyIndex => "MDX",
            Self::Add => "A",
            Self::AddDouble => "AD",
            Self::Subtract => "S",
            Self::SubtractDouble => "SD",
            Self::Multiply => "M",
            Self::Divide => "D",
            Self::Load => "LD",
            Self::LoadDouble => "LDD",
            Self::Store => "STO",
            Self::StoreDouble => "STD",
            Self::And => "AND",
            Self::Or => "OR",
            Self::ExclusiveOr => "EOR",
        }
    }
}
