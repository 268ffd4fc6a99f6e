//! Shared carry/overflow arithmetic for the add/subtract families.
//!
//! Carry is the unsigned carry out of the top bit. Overflow follows the
//! two's-complement rule: set when both operands share a sign and the
//! result's sign differs. Subtraction is an add of the two's complement,
//! so "no borrow" reports as carry set. The sticky-Overflow policy lives
//! at the call sites: they only ever assert the flag, never clear it.

/// 16-bit add: `(result, carry_out, overflow)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn add_with_flags(a: u16, b: u16) -> (u16, bool, bool) {
    let wide = a as u32 + b as u32;
    let result = wide as u16;
    let carry = wide > 0xFFFF;
    let overflow = (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0;
    (result, carry, overflow)
}

/// 16-bit subtract via two's-complement add. Carry set means no borrow
/// (`a >= b` unsigned). Overflow set when the operands' signs differ and
/// the result's sign differs from the minuend's.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn sub_with_flags(a: u16, b: u16) -> (u16, bool, bool) {
    let wide = a as u32 + (!b) as u32 + 1;
    let result = wide as u16;
    let carry = wide > 0xFFFF;
    let overflow = (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0;
    (result, carry, overflow)
}

/// 32-bit add over the Acc:Ext pair, same flag rules at bit 31/32.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn add_double_with_flags(a: u32, b: u32) -> (u32, bool, bool) {
    let wide = a as u64 + b as u64;
    let result = wide as u32;
    let carry = wide > 0xFFFF_FFFF;
    let overflow = (a ^ b) & 0x8000_0000 == 0 && (a ^ result) & 0x8000_0000 != 0;
    (result, carry, overflow)
}

/// 32-bit subtract over the Acc:Ext pair.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn sub_double_with_flags(a: u32, b: u32) -> (u32, bool, bool) {
    let wide = a as u64 + (!b) as u64 + 1;
    let result = wide as u32;
    let carry = wide > 0xFFFF_FFFF;
    let overflow = (a ^ b) & 0x8000_0000 != 0 && (a ^ result) & 0x8000_0000 != 0;
    (result, carry, overflow)
}
