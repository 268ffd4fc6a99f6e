//! Condition evaluation for the branch/skip family.
//!
//! Conditions combine as a logical OR: any satisfied bit triggers the
//! action. Testing the overflow condition clears Overflow whether or not
//! the condition held — the reset is a side effect of the test itself.

use crate::state::Registers;

/// Condition bit: overflow flag is off.
pub const COND_OVERFLOW_OFF: u8 = 0x01;
/// Condition bit: carry flag is off.
pub const COND_CARRY_OFF: u8 = 0x02;
/// Condition bit: accumulator is even.
pub const COND_EVEN: u8 = 0x04;
/// Condition bit: accumulator is strictly positive.
pub const COND_PLUS: u8 = 0x08;
/// Condition bit: accumulator is negative.
pub const COND_MINUS: u8 = 0x10;
/// Condition bit: accumulator is zero.
pub const COND_ZERO: u8 = 0x20;

/// Tests a condition mask against the accumulator and flags.
///
/// Returns true when any selected condition holds. When the mask names
/// the overflow condition, Overflow is cleared unconditionally.
pub fn any_condition_met(regs: &mut Registers, mask: u8) -> bool {
    let acc = regs.acc();
    let mut met = false;

    if mask & COND_ZERO != 0 && acc == 0 {
        met = true;
    }
    if mask & COND_MINUS != 0 && acc & 0x8000 != 0 {
        met = true;
    }
    if mask & COND_PLUS != 0 && acc != 0 && acc & 0x8000 == 0 {
        met = true;
    }
    if mask & COND_EVEN != 0 && acc & 1 == 0 {
        met = true;
    }
    if mask & COND_CARRY_OFF != 0 && !regs.carry() {
        met = true;
    }
    if mask & COND_OVERFLOW_OFF != 0 {
        if !regs.overflow() {
            met = true;
        }
        regs.set_overflow(false);
    }

    met
}

#[cfg(test)]
mod tests {
    use super::{
        any_condition_met, COND_CARRY_OFF, COND_EVEN, COND_MINUS, COND_OVERFLOW_OFF, COND_PLUS,
        COND_ZERO,
    };
    use crate::state::Registers;

    #[test]
    fn sign_conditions_partition_every_accumulator_value() {
        let mask = COND_PLUS | COND_MINUS | COND_ZERO;
        for acc in [0x0000u16, 0x0001, 0x7FFF, 0x8000, 0xFFFF] {
            let mut regs = Registers::default();
            regs.set_acc(acc);
            assert!(any_condition_met(&mut regs, mask), "acc {acc:#06X}");
        }
    }

    #[test]
    fn plus_excludes_zero_and_negative() {
        let mut regs = Registers::default();
        regs.set_acc(0);
        assert!(!any_condition_met(&mut regs, COND_PLUS));
        regs.set_acc(0x8001);
        assert!(!any_condition_met(&mut regs, COND_PLUS));
        regs.set_acc(1);
        assert!(any_condition_met(&mut regs, COND_PLUS));
    }

    #[test]
    fn even_tests_the_low_bit() {
        let mut regs = Registers::default();
        regs.set_acc(0x1234);
        assert!(any_condition_met(&mut regs, COND_EVEN));
        regs.set_acc(0x1235);
        assert!(!any_condition_met(&mut regs, COND_EVEN));
    }

    #[test]
    fn carry_condition_fires_when_carry_is_clear() {
        let mut regs = Registers::default();
        assert!(any_condition_met(&mut regs, COND_CARRY_OFF));
        regs.set_carry(true);
        assert!(!any_condition_met(&mut regs, COND_CARRY_OFF));
        // The carry test has no reset side effect.
        assert!(regs.carry());
    }

    #[test]
    fn testing_overflow_clears_it_win_or_lose() {
        let mut regs = Registers::default();
        regs.set_overflow(true);
        assert!(!any_condition_met(&mut regs, COND_OVERFLOW_OFF));
        assert!(!regs.overflow());

        // Second test: condition now holds, flag stays clear.
        assert!(any_condition_met(&mut regs, COND_OVERFLOW_OFF));
        assert!(!regs.overflow());
    }

    #[test]
    fn untested_overflow_is_left_alone() {
        let mut regs = Registers::default();
        regs.set_overflow(true);
        regs.set_acc(0);
        assert!(any_condition_met(&mut regs, COND_ZERO));
        assert!(regs.overflow());
    }

    #[test]
    fn empty_mask_never_fires() {
        let mut regs = Registers::default();
        regs.set_acc(0);
        assert!(!any_condition_met(&mut regs, 0));
    }
}
