//! Instruction fetch and field extraction.
//!
//! Word 1 of every instruction packs `opcode (5) | format (1) | tag (2) |
//! low byte (8)`. The low byte is a signed displacement in short format;
//! in long format each opcode family reinterprets it as an indirect flag,
//! a condition mask, or a shift modifier, and a second word carries the
//! absolute address. No validation happens here — an unassigned opcode is
//! carried through and resolved at dispatch time.

use crate::memory::Memory;
use crate::state::{IndexTag, Registers};
use crate::Opcode;

/// Format bit: set for two-word (long) instructions.
const FORMAT_LONG: u16 = 0x0400;

/// Indirect flag in the low byte of long-format memory references.
const LOW_INDIRECT: u8 = 0x80;

/// Interrupt-level-reset modifier bit in the branch family low byte.
const LOW_LEVEL_RESET: u8 = 0x40;

/// A fetched instruction with all raw fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Raw first instruction word.
    pub raw: u16,
    /// Raw 5-bit opcode field.
    pub opcode_bits: u8,
    /// Classified operation; `None` for unassigned opcode values.
    pub opcode: Option<Opcode>,
    /// True for the two-word long format.
    pub long: bool,
    /// Index register tag.
    pub tag: IndexTag,
    /// Low byte of word 1, before per-opcode reinterpretation.
    pub low_byte: u8,
    /// Absolute address word, present only in long format.
    pub address_word: Option<u16>,
}

impl DecodedInstruction {
    /// Decodes a raw instruction word pair without touching machine state.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_words(word: u16, address_word: Option<u16>) -> Self {
        let opcode_bits = (word >> 11) as u8;
        let long = word & FORMAT_LONG != 0;
        Self {
            raw: word,
            opcode_bits,
            opcode: Opcode::from_bits(opcode_bits),
            long,
            tag: IndexTag::from_u2((word >> 8) as u8),
            low_byte: word as u8,
            address_word: if long { address_word } else { None },
        }
    }

    /// Signed 8-bit displacement view of the low byte (short format).
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn displacement(self) -> i8 {
        self.low_byte as i8
    }

    /// Displacement sign-extended to address width.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn displacement_ext(self) -> u16 {
        self.displacement() as i16 as u16
    }

    /// Indirect addressing flag. Only long-format memory references carry
    /// it; short format has no room for indirection.
    #[must_use]
    pub const fn indirect(self) -> bool {
        self.long && self.low_byte & LOW_INDIRECT != 0
    }

    /// Condition mask view of the low byte (branch family).
    #[must_use]
    pub const fn condition_mask(self) -> u8 {
        self.low_byte & 0x3F
    }

    /// Interrupt-level-reset modifier (branch family).
    #[must_use]
    pub const fn resets_interrupt_level(self) -> bool {
        self.low_byte & LOW_LEVEL_RESET != 0
    }

    /// Shift sub-mode selector, bits 6-7 of the low byte (shift family).
    #[must_use]
    pub const fn shift_mode(self) -> u8 {
        (self.low_byte >> 6) & 0x3
    }

    /// Shift count field, low 6 bits of the low byte (shift family,
    /// tag 0 only — an indexed shift takes its count from the register).
    #[must_use]
    pub const fn shift_count_field(self) -> u8 {
        self.low_byte & 0x3F
    }

    /// Instruction length in words.
    #[must_use]
    pub const fn word_len(self) -> u16 {
        if self.long {
            2
        } else {
            1
        }
    }
}

/// Reads the instruction at Iar, advances Iar past it, and extracts all
/// fields. Long format consumes a second word for the absolute address.
pub fn fetch_and_decode(mem: &Memory, regs: &mut Registers) -> DecodedInstruction {
    let word = mem.read(regs.iar());
    regs.advance_iar(1);

    let long = word & FORMAT_LONG != 0;
    let address_word = if long {
        let aw = mem.read(regs.iar());
        regs.advance_iar(1);
        Some(aw)
    } else {
        None
    };

    DecodedInstruction::from_words(word, address_word)
}

/// Assembles a raw instruction word from its fields. Test and tooling
/// helper; the core itself only decodes.
#[must_use]
pub const fn encode_word(opcode: u8, long: bool, tag: IndexTag, low_byte: u8) -> u16 {
    let mut word = ((opcode & 0x1F) as u16) << 11;
    if long {
        word |= FORMAT_LONG;
    }
    word |= (tag.bits() as u16) << 8;
    word | low_byte as u16
}
