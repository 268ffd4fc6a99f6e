//! Effective address resolution.
//!
//! The matrix has three dimensions: format (short/long), indexing
//! (tag 0 vs. 1-3), and indirection (long only). Short format is relative
//! to Iar only when no index register is named; an indexed short address
//! is relative to the register alone. All arithmetic wraps; there is no
//! bounds check.

use crate::decoder::DecodedInstruction;
use crate::memory::Memory;
use crate::state::Registers;

/// Resolves the effective address for a memory-reference instruction.
///
/// Iar has already been advanced past the instruction words, so the
/// short-format base is the address of the next instruction. Indirection
/// fetches the target once; the fetched word is used as-is and is never
/// re-indexed.
#[must_use]
pub fn effective_address(instr: &DecodedInstruction, regs: &Registers, mem: &Memory) -> u16 {
    let base = if instr.long {
        let address_word = instr.address_word.unwrap_or(0);
        if instr.tag.is_indexed() {
            address_word.wrapping_add(regs.xr(instr.tag))
        } else {
            address_word
        }
    } else if instr.tag.is_indexed() {
        regs.xr(instr.tag).wrapping_add(instr.displacement_ext())
    } else {
        regs.iar().wrapping_add(instr.displacement_ext())
    };

    if instr.indirect() {
        mem.read(base)
    } else {
        base
    }
}
