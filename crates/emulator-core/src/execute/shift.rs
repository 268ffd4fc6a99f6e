//! Shift/rotate unit for the two shift opcodes.
//!
//! The count comes from the low 6 bits of the named index register when
//! the tag is nonzero, else from the low 6 bits of the displacement byte.
//! Two modifier bits pick the sub-mode. Counts beyond the operand width
//! shift everything out: the result is zero (or sign fill on the right)
//! and carry reflects the last bit that left, if any.

use crate::state::{IndexTag, Registers};

/// Left-shift sub-modes selected by the two modifier bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LeftShiftMode {
    /// Plain arithmetic shift of Acc.
    Acc = 0,
    /// Shift Acc while scanning for a set high bit, counting down the
    /// index register (normalization aid).
    AccAndCount = 1,
    /// Shift the full Acc:Ext pair.
    Together = 2,
    /// Scan-and-count over the full pair.
    TogetherAndCount = 3,
}

/// Right-shift sub-modes. The `01` encoding is unassigned and behaves as
/// a plain Acc shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RightShiftMode {
    /// Arithmetic (sign-filling) shift of Acc.
    Acc = 0,
    /// Arithmetic shift of the full Acc:Ext pair.
    Together = 2,
    /// Rotate the pair right; a count of 16 swaps Acc and Ext.
    RotateExt = 3,
}

impl LeftShiftMode {
    /// Decodes the two modifier bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            1 => Self::AccAndCount,
            2 => Self::Together,
            3 => Self::TogetherAndCount,
            _ => Self::Acc,
        }
    }
}

impl RightShiftMode {
    /// Decodes the two modifier bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            2 => Self::Together,
            3 => Self::RotateExt,
            _ => Self::Acc,
        }
    }
}

/// Resolves the shift count: index register low 6 bits for a nonzero tag,
/// displacement field low 6 bits otherwise.
#[must_use]
pub fn shift_count(regs: &Registers, tag: IndexTag, count_field: u8) -> u32 {
    if tag.is_indexed() {
        u32::from(regs.xr(tag) & 0x3F)
    } else {
        u32::from(count_field & 0x3F)
    }
}

/// Executes one left-shift instruction against the register file.
pub fn shift_left(regs: &mut Registers, mode: LeftShiftMode, tag: IndexTag, count_field: u8) {
    let count = shift_count(regs, tag, count_field);
    match mode {
        LeftShiftMode::Acc => shift_left_acc(regs, count),
        LeftShiftMode::Together => shift_left_pair(regs, count),
        LeftShiftMode::AccAndCount => {
            if tag.is_indexed() {
                scan_left_acc(regs, tag);
            } else {
                // No count register to decrement; degrades to the plain shift.
                shift_left_acc(regs, count);
            }
        }
        LeftShiftMode::TogetherAndCount => {
            if tag.is_indexed() {
                scan_left_pair(regs, tag);
            } else {
                shift_left_pair(regs, count);
            }
        }
    }
}

/// Executes one right-shift instruction against the register file. Right
/// shifts discard bits without touching carry.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn shift_right(regs: &mut Registers, mode: RightShiftMode, tag: IndexTag, count_field: u8) {
    let count = shift_count(regs, tag, count_field);
    if count == 0 {
        return;
    }
    match mode {
        RightShiftMode::Acc => {
            let acc = regs.acc();
            let shifted = if count >= 16 {
                if acc & 0x8000 != 0 {
                    0xFFFF
                } else {
                    0x0000
                }
            } else {
                ((acc as i16) >> count) as u16
            };
            regs.set_acc(shifted);
        }
        RightShiftMode::Together => {
            let pair = regs.acc_ext();
            let shifted = if count >= 32 {
                if pair & 0x8000_0000 != 0 {
                    0xFFFF_FFFF
                } else {
                    0x0000_0000
                }
            } else {
                ((pair as i32) >> count) as u32
            };
            regs.set_acc_ext(shifted);
        }
        RightShiftMode::RotateExt => {
            let pair = regs.acc_ext();
            regs.set_acc_ext(pair.rotate_right(count % 32));
        }
    }
}

fn shift_left_acc(regs: &mut Registers, count: u32) {
    if count == 0 {
        return;
    }
    let acc = regs.acc();
    let carry = count <= 16 && (acc >> (16 - count)) & 1 != 0;
    let shifted = if count >= 16 { 0 } else { acc << count };
    regs.set_acc(shifted);
    regs.set_carry(carry);
}

fn shift_left_pair(regs: &mut Registers, count: u32) {
    if count == 0 {
        return;
    }
    let pair = regs.acc_ext();
    let carry = count <= 32 && (u64::from(pair) >> (32 - count)) & 1 != 0;
    let shifted = if count >= 32 { 0 } else { pair << count };
    regs.set_acc_ext(shifted);
    regs.set_carry(carry);
}

/// Shift Acc left until its high bit is set or the count register runs
/// out. The register ends up holding the unused count, so the distance
/// traveled is the original count minus it. Carry reports an early stop.
fn scan_left_acc(regs: &mut Registers, tag: IndexTag) {
    let mut count = regs.xr(tag) & 0x3F;
    let mut acc = regs.acc();
    while count > 0 && acc & 0x8000 == 0 {
        acc <<= 1;
        count -= 1;
    }
    regs.set_acc(acc);
    regs.set_xr(tag, count);
    regs.set_carry(count != 0);
}

fn scan_left_pair(regs: &mut Registers, tag: IndexTag) {
    let mut count = regs.xr(tag) & 0x3F;
    let mut pair = regs.acc_ext();
    while count > 0 && pair & 0x8000_0000 == 0 {
        pair <<= 1;
        count -= 1;
    }
    regs.set_acc_ext(pair);
    regs.set_xr(tag, count);
    regs.set_carry(count != 0);
}

#[cfg(test)]
mod tests {
    use super::{shift_left, shift_right, LeftShiftMode, RightShiftMode};
    use crate::state::{IndexTag, Registers};

    #[test]
    fn plain_left_shift_moves_the_top_bit_into_carry() {
        let mut regs = Registers::default();
        regs.set_acc(0x4001);
        shift_left(&mut regs, LeftShiftMode::Acc, IndexTag::Tag0, 2);
        assert_eq!(regs.acc(), 0x0004);
        assert!(regs.carry());
    }

    #[test]
    fn left_shift_count_zero_leaves_everything_alone() {
        let mut regs = Registers::default();
        regs.set_acc(0x8001);
        regs.set_carry(true);
        shift_left(&mut regs, LeftShiftMode::Acc, IndexTag::Tag0, 0);
        assert_eq!(regs.acc(), 0x8001);
        assert!(regs.carry());
    }

    #[test]
    fn left_shift_saturates_past_the_register_width() {
        let mut regs = Registers::default();
        regs.set_acc(0xFFFF);
        shift_left(&mut regs, LeftShiftMode::Acc, IndexTag::Tag0, 20);
        assert_eq!(regs.acc(), 0);
        assert!(!regs.carry());

        regs.set_acc(0xFFFF);
        shift_left(&mut regs, LeftShiftMode::Acc, IndexTag::Tag0, 16);
        assert_eq!(regs.acc(), 0);
        assert!(regs.carry());
    }

    #[test]
    fn together_shift_carries_out_of_the_pair_high_end() {
        let mut regs = Registers::default();
        regs.set_acc_ext(0x8000_0000);
        shift_left(&mut regs, LeftShiftMode::Together, IndexTag::Tag0, 1);
        assert_eq!(regs.acc_ext(), 0);
        assert!(regs.carry());
    }

    #[test]
    fn indexed_count_comes_from_the_register_low_six_bits() {
        let mut regs = Registers::default();
        regs.set_acc(0x0001);
        regs.set_xr(IndexTag::Tag2, 0x0044); // low 6 bits = 4
        shift_left(&mut regs, LeftShiftMode::Acc, IndexTag::Tag2, 0x3F);
        assert_eq!(regs.acc(), 0x0010);
    }

    #[test]
    fn scan_mode_stops_at_the_first_set_bit_and_reports_distance() {
        let mut regs = Registers::default();
        regs.set_acc(0x0100); // seven shifts to reach the top bit
        regs.set_xr(IndexTag::Tag1, 16);
        shift_left(&mut regs, LeftShiftMode::AccAndCount, IndexTag::Tag1, 0);
        assert_eq!(regs.acc(), 0x8000);
        assert_eq!(regs.xr(IndexTag::Tag1), 9);
        assert!(regs.carry());
    }

    #[test]
    fn scan_mode_exhausts_the_count_without_finding_a_bit() {
        let mut regs = Registers::default();
        regs.set_acc(0x0000);
        regs.set_xr(IndexTag::Tag1, 5);
        shift_left(&mut regs, LeftShiftMode::AccAndCount, IndexTag::Tag1, 0);
        assert_eq!(regs.xr(IndexTag::Tag1), 0);
        assert!(!regs.carry());
    }

    #[test]
    fn right_shift_fills_with_sign_and_preserves_carry() {
        let mut regs = Registers::default();
        regs.set_acc(0x8004);
        regs.set_carry(true);
        shift_right(&mut regs, RightShiftMode::Acc, IndexTag::Tag0, 2);
        assert_eq!(regs.acc(), 0xE001);
        assert!(regs.carry());

        shift_right(&mut regs, RightShiftMode::Acc, IndexTag::Tag0, 20);
        assert_eq!(regs.acc(), 0xFFFF);
    }

    #[test]
    fn pair_right_shift_crosses_the_register_boundary() {
        let mut regs = Registers::default();
        regs.set_acc_ext(0x0001_0000);
        shift_right(&mut regs, RightShiftMode::Together, IndexTag::Tag0, 1);
        assert_eq!(regs.acc_ext(), 0x0000_8000);
    }

    #[test]
    fn rotate_by_sixteen_swaps_acc_and_ext() {
        let mut regs = Registers::default();
        regs.set_acc(0x1234);
        regs.set_ext(0xABCD);
        shift_right(&mut regs, RightShiftMode::RotateExt, IndexTag::Tag0, 16);
        assert_eq!(regs.acc(), 0xABCD);
        assert_eq!(regs.ext(), 0x1234);
    }

    #[test]
    fn rotate_wraps_low_bits_into_the_top() {
        let mut regs = Registers::default();
        regs.set_acc_ext(0x0000_0001);
        shift_right(&mut regs, RightShiftMode::RotateExt, IndexTag::Tag0, 1);
        assert_eq!(regs.acc_ext(), 0x8000_0000);
    }

    #[test]
    fn mode_decoding_matches_the_modifier_bits() {
        assert_eq!(LeftShiftMode::from_bits(0), LeftShiftMode::Acc);
        assert_eq!(LeftShiftMode::from_bits(1), LeftShiftMode::AccAndCount);
        assert_eq!(LeftShiftMode::from_bits(2), LeftShiftMode::Together);
        assert_eq!(LeftShiftMode::from_bits(3), LeftShiftMode::TogetherAndCount);
        assert_eq!(RightShiftMode::from_bits(0), RightShiftMode::Acc);
        assert_eq!(RightShiftMode::from_bits(1), RightShiftMode::Acc);
        assert_eq!(RightShiftMode::from_bits(2), RightShiftMode::Together);
        assert_eq!(RightShiftMode::from_bits(3), RightShiftMode::RotateExt);
    }
}
