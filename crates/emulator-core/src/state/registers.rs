//! Architectural register file for the CPU core.

/// Number of real index registers (`XR1..XR3`). Tag 0 is not a register;
/// it aliases the instruction address register.
pub const INDEX_REGISTER_COUNT: usize = 3;

/// Two-bit index register tag from an instruction word.
///
/// `Tag0` names "no index register"; operations that write through tag 0
/// land in the instruction address register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum IndexTag {
    Tag0 = 0,
    Tag1 = 1,
    Tag2 = 2,
    Tag3 = 3,
}

impl IndexTag {
    /// Decodes a 2-bit tag field.
    #[must_use]
    pub const fn from_u2(bits: u8) -> Self {
        match bits & 0x3 {
            1 => Self::Tag1,
            2 => Self::Tag2,
            3 => Self::Tag3,
            _ => Self::Tag0,
        }
    }

    /// Raw 2-bit field value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// True when this tag selects a real index register.
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        !matches!(self, Self::Tag0)
    }
}

/// Full architectural register state: accumulator, extension, instruction
/// address register, index registers, and the status flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    acc: u16,
    ext: u16,
    iar: u16,
    xr: [u16; INDEX_REGISTER_COUNT],
    carry: bool,
    overflow: bool,
    wait: bool,
    instruction_count: u64,
}

impl Registers {
    /// Reads the accumulator.
    #[must_use]
    pub const fn acc(&self) -> u16 {
        self.acc
    }

    /// Writes the accumulator.
    pub const fn set_acc(&mut self, value: u16) {
        self.acc = value;
    }

    /// Reads the accumulator extension.
    #[must_use]
    pub const fn ext(&self) -> u16 {
        self.ext
    }

    /// Writes the accumulator extension.
    pub const fn set_ext(&mut self, value: u16) {
        self.ext = value;
    }

    /// The 32-bit Acc:Ext pair, Acc in the high half. There is no separate
    /// double register; this is always a view over the two halves.
    #[must_use]
    pub const fn acc_ext(&self) -> u32 {
        ((self.acc as u32) << 16) | self.ext as u32
    }

    /// Writes the 32-bit Acc:Ext pair.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn set_acc_ext(&mut self, value: u32) {
        self.acc = (value >> 16) as u16;
        self.ext = value as u16;
    }

    /// Reads the instruction address register.
    #[must_use]
    pub const fn iar(&self) -> u16 {
        self.iar
    }

    /// Writes the instruction address register.
    pub const fn set_iar(&mut self, value: u16) {
        self.iar = value;
    }

    /// Advances the instruction address register by `words`, wrapping.
    pub const fn advance_iar(&mut self, words: u16) {
        self.iar = self.iar.wrapping_add(words);
    }

    /// Reads the register named by `tag`. Tag 0 reads the instruction
    /// address register; the alias is computed here so it cannot drift.
    #[must_use]
    pub const fn xr(&self, tag: IndexTag) -> u16 {
        match tag {
            IndexTag::Tag0 => self.iar,
            IndexTag::Tag1 => self.xr[0],
            IndexTag::Tag2 => self.xr[1],
            IndexTag::Tag3 => self.xr[2],
        }
    }

    /// Writes the register named by `tag`. Tag 0 writes through to the
    /// instruction address register.
    pub const fn set_xr(&mut self, tag: IndexTag, value: u16) {
        match tag {
            IndexTag::Tag0 => self.iar = value,
            IndexTag::Tag1 => self.xr[0] = value,
            IndexTag::Tag2 => self.xr[1] = value,
            IndexTag::Tag3 => self.xr[2] = value,
        }
    }

    /// Reads the carry flag.
    #[must_use]
    pub const fn carry(&self) -> bool {
        self.carry
    }

    /// Writes the carry flag.
    pub const fn set_carry(&mut self, value: bool) {
        self.carry = value;
    }

    /// Reads the overflow flag.
    #[must_use]
    pub const fn overflow(&self) -> bool {
        self.overflow
    }

    /// Writes the overflow flag. Overflow is sticky: arithmetic call sites
    /// only invoke this with `true`, and the flag clears only via a status
    /// instruction or a branch test of the overflow condition.
    pub const fn set_overflow(&mut self, value: bool) {
        self.overflow = value;
    }

    /// Reads the wait flag.
    #[must_use]
    pub const fn wait(&self) -> bool {
        self.wait
    }

    /// Writes the wait flag.
    pub const fn set_wait(&mut self, value: bool) {
        self.wait = value;
    }

    /// Number of instructions executed since construction.
    #[must_use]
    pub const fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Counts one executed instruction.
    pub const fn record_instruction(&mut self) {
        self.instruction_count = self.instruction_count.wrapping_add(1);
    }
}
