//! Instruction disassembly.
//!
//! Converts raw instruction words into listing-style rows for front-panel
//! and debugger displays. Every word decodes to something: an unassigned
//! opcode renders as a `DC` (define constant) row rather than an error.

use crate::decoder::DecodedInstruction;
use crate::execute::branch::{
    COND_CARRY_OFF, COND_EVEN, COND_MINUS, COND_OVERFLOW_OFF, COND_PLUS, COND_ZERO,
};
use crate::memory::Memory;
use crate::Opcode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Word address of the instruction.
    pub addr: u16,
    /// Length in words (1 short, 2 long).
    pub word_len: u16,
    /// Raw instruction words, word 1 in the low half.
    pub raw_words: u32,
    /// Listing mnemonic, including shift sub-mnemonics and `BOSC`.
    pub mnemonic: String,
    /// Formatted operand field.
    pub operands: String,
    /// True when the opcode value is unassigned.
    pub is_unassigned: bool,
}

/// Disassembles one instruction at `addr`.
#[must_use]
pub fn disassemble_one(mem: &Memory, addr: u16) -> DisassemblyRow {
    let word = mem.read(addr);
    let long = DecodedInstruction::from_words(word, None).long;
    let address_word = if long {
        Some(mem.read(addr.wrapping_add(1)))
    } else {
        None
    };
    let instr = DecodedInstruction::from_words(word, address_word);

    let mut raw_words = u32::from(word);
    if let Some(aw) = instr.address_word {
        raw_words |= u32::from(aw) << 16;
    }

    let Some(opcode) = instr.opcode else {
        return DisassemblyRow {
            addr,
            word_len: 1,
            raw_words: u32::from(word),
            mnemonic: "DC".to_string(),
            operands: format!("/{word:04X}"),
            is_unassigned: true,
        };
    };

    DisassemblyRow {
        addr,
        word_len: instr.word_len(),
        raw_words,
        mnemonic: format_mnemonic(opcode, &instr),
        operands: format_operands(opcode, &instr),
        is_unassigned: false,
    }
}

/// Disassembles a window of instructions around `center`.
///
/// Produces up to `before` rows preceding the center instruction and
/// `after` rows following it. The backward scan is heuristic: a word
/// whose format bit happens to be set looks like the second half of a
/// long instruction, so rows before the center are best-effort.
#[must_use]
pub fn disassemble_window(
    mem: &Memory,
    center: u16,
    before: usize,
    after: usize,
) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(before + 1 + after);

    let mut found_before: Vec<DisassemblyRow> = Vec::new();
    let mut scan_addr = center;
    while scan_addr > 0 && found_before.len() < before {
        let mut found_one = false;
        for len in [2u16, 1u16] {
            if scan_addr < len {
                continue;
            }
            let try_addr = scan_addr - len;
            let row = disassemble_one(mem, try_addr);
            if row.word_len == len {
                scan_addr = try_addr;
                found_before.push(row);
                found_one = true;
                break;
            }
        }
        if !found_one {
            scan_addr = scan_addr.wrapping_sub(1);
        }
    }
    found_before.reverse();
    rows.extend(found_before);

    let mut addr = center;
    for _ in 0..=after {
        let row = disassemble_one(mem, addr);
        addr = addr.wrapping_add(row.word_len);
        rows.push(row);
    }

    rows
}

fn format_mnemonic(opcode: Opcode, instr: &DecodedInstruction) -> String {
    let name = match opcode {
        Opcode::ShiftLeft => match instr.shift_mode() {
            1 => "SLCA",
            2 => "SLT",
            3 => "SLC",
            _ => "SLA",
        },
        Opcode::ShiftRight => match instr.shift_mode() {
            2 => "SRT",
            3 => "RTE",
            _ => "SRA",
        },
        Opcode::BranchSkip if instr.resets_interrupt_level() => "BOSC",
        other => other.mnemonic(),
    };
    name.to_string()
}

fn format_operands(opcode: Opcode, instr: &DecodedInstruction) -> String {
    match opcode {
        Opcode::Wait => String::new(),
        Opcode::LoadStatus => format!("{}", instr.low_byte & 0x3),
        Opcode::ShiftLeft | Opcode::ShiftRight => {
            if instr.tag.is_indexed() {
                format!("X{}", instr.tag.bits())
            } else {
                format!("{}", instr.shift_count_field())
            }
        }
        Opcode::BranchSkip | Opcode::BranchStore => {
            let conditions = format_conditions(instr.condition_mask());
            if instr.long {
                let target = format_memory_ref(instr);
                if conditions.is_empty() {
                    target
                } else {
                    format!("{target},{conditions}")
                }
            } else if opcode == Opcode::BranchSkip {
                conditions
            } else {
                format_memory_ref(instr)
            }
        }
        _ => format_memory_ref(instr),
    }
}

/// Renders the address field the way a listing would: `L /0500` for long,
/// `I /0500` for long indirect, `*+16` for Iar-relative short, with the
/// index tag appended as `,1`.
fn format_memory_ref(instr: &DecodedInstruction) -> String {
    let mut out = if instr.long {
        let aw = instr.address_word.unwrap_or(0);
        if instr.indirect() {
            format!("I /{aw:04X}")
        } else {
            format!("L /{aw:04X}")
        }
    } else if instr.tag.is_indexed() {
        format!("{:+}", instr.displacement())
    } else {
        format!("*{:+}", instr.displacement())
    };

    if instr.tag.is_indexed() {
        out.push(',');
        out.push(char::from(b'0' + instr.tag.bits()));
    }
    out
}

/// Condition letters in fixed listing order.
fn format_conditions(mask: u8) -> String {
    let mut out = String::new();
    for (bit, ch) in [
        (COND_PLUS, '+'),
        (COND_MINUS, '-'),
        (COND_ZERO, 'Z'),
        (COND_EVEN, 'E'),
        (COND_CARRY_OFF, 'C'),
        (COND_OVERFLOW_OFF, 'O'),
    ] {
        if mask & bit != 0 {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{disassemble_one, disassemble_window};
    use crate::decoder::encode_word;
    use crate::memory::{Memory, MemorySize};
    use crate::state::IndexTag;

    fn mem_with(words: &[u16]) -> Memory {
        let mut mem = Memory::new(MemorySize::Words4K);
        mem.load(0x0100, words);
        mem
    }

    #[test]
    fn long_load_renders_the_absolute_address() {
        let mem = mem_with(&[encode_word(0x18, true, IndexTag::Tag0, 0x00), 0x0500]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "LD");
        assert_eq!(row.operands, "L /0500");
        assert_eq!(row.word_len, 2);
        assert!(!row.is_unassigned);
    }

    #[test]
    fn indirect_and_indexed_references_are_marked() {
        let mem = mem_with(&[encode_word(0x1A, true, IndexTag::Tag2, 0x80), 0x0500]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "STO");
        assert_eq!(row.operands, "I /0500,2");
    }

    #[test]
    fn short_references_render_relative_displacements() {
        let mem = mem_with(&[encode_word(0x10, false, IndexTag::Tag0, 0xF0)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "A");
        assert_eq!(row.operands, "*-16");

        let mem = mem_with(&[encode_word(0x10, false, IndexTag::Tag1, 0x10)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.operands, "+16,1");
    }

    #[test]
    fn shift_sub_mnemonics_follow_the_mode_bits() {
        let mem = mem_with(&[encode_word(0x02, false, IndexTag::Tag0, 0x90)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "SLT");
        assert_eq!(row.operands, "16");

        let mem = mem_with(&[encode_word(0x03, false, IndexTag::Tag1, 0xC0)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "RTE");
        assert_eq!(row.operands, "X1");
    }

    #[test]
    fn branch_conditions_render_as_letters() {
        let mem = mem_with(&[encode_word(0x09, true, IndexTag::Tag0, 0x28), 0x0200]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "BSC");
        assert_eq!(row.operands, "L /0200,+Z");

        let mem = mem_with(&[encode_word(0x09, false, IndexTag::Tag0, 0x03)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.operands, "CO");
    }

    #[test]
    fn level_reset_branch_renders_as_bosc() {
        let mem = mem_with(&[encode_word(0x09, true, IndexTag::Tag0, 0x40), 0x0200]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "BOSC");
        assert_eq!(row.operands, "L /0200");
    }

    #[test]
    fn unassigned_opcode_renders_as_a_constant() {
        let mem = mem_with(&[0xF812]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "DC");
        assert_eq!(row.operands, "/F812");
        assert_eq!(row.word_len, 1);
        assert!(row.is_unassigned);
    }

    #[test]
    fn wait_has_no_operand_field() {
        let mem = mem_with(&[encode_word(0x06, false, IndexTag::Tag0, 0x00)]);
        let row = disassemble_one(&mem, 0x0100);
        assert_eq!(row.mnemonic, "WAIT");
        assert_eq!(row.operands, "");
    }

    #[test]
    fn window_walks_forward_across_mixed_lengths() {
        let mem = mem_with(&[
            encode_word(0x18, true, IndexTag::Tag0, 0x00),
            0x0500,
            encode_word(0x10, false, IndexTag::Tag0, 0x01),
            encode_word(0x06, false, IndexTag::Tag0, 0x00),
        ]);
        let rows = disassemble_window(&mem, 0x0100, 0, 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].addr, 0x0100);
        assert_eq!(rows[0].mnemonic, "LD");
        assert_eq!(rows[1].addr, 0x0102);
        assert_eq!(rows[1].mnemonic, "A");
        assert_eq!(rows[2].addr, 0x0103);
        assert_eq!(rows[2].mnemonic, "WAIT");
    }

    #[test]
    fn window_scans_backward_from_the_center() {
        let mem = mem_with(&[
            encode_word(0x10, false, IndexTag::Tag0, 0x01),
            encode_word(0x06, false, IndexTag::Tag0, 0x00),
        ]);
        let rows = disassemble_window(&mem, 0x0101, 1, 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].addr, 0x0100);
        assert_eq!(rows[0].mnemonic, "A");
        assert_eq!(rows[1].addr, 0x0101);
        assert_eq!(rows[1].mnemonic, "WAIT");
    }
}
