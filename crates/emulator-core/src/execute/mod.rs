//! Instruction execution engine.
//!
//! One `step` is: deliver an eligible interrupt, else honor Wait, else
//! fetch, decode, and run a single instruction to completion. There are
//! no suspension points inside an instruction and no faulting paths —
//! the failure modes are architectural states (Wait, wrong-but-defined
//! I/O decode), not errors.

pub mod alu;
pub mod branch;
pub mod helpers;
pub mod shift;

pub use helpers::effective_address;

use crate::decoder::{fetch_and_decode, DecodedInstruction};
use crate::io::{IoFunction, Iocc, INTERRUPT_VECTOR_BASE};
use crate::{Cpu, Opcode, StepOutcome};
use shift::{LeftShiftMode, RightShiftMode};

/// Executes one machine step against `cpu`.
pub fn step(cpu: &mut Cpu) -> StepOutcome {
    if let Some(level) = cpu.interrupts.eligible_level() {
        enter_interrupt(cpu, level);
        return StepOutcome::InterruptEntered { level };
    }

    if cpu.regs.wait() {
        return StepOutcome::Waiting;
    }

    let instr = fetch_and_decode(&cpu.mem, &mut cpu.regs);
    execute_instruction(cpu, &instr);
    cpu.regs.record_instruction();
    StepOutcome::Executed {
        opcode: instr.opcode,
    }
}

/// Forced branch-and-store through the level's vector word: the old Iar
/// lands at the handler address and execution resumes one word past it.
fn enter_interrupt(cpu: &mut Cpu, level: usize) {
    #[allow(clippy::cast_possible_truncation)]
    let vector = INTERRUPT_VECTOR_BASE.wrapping_add(level as u16);
    let target = cpu.mem.read(vector);
    cpu.mem.write(target, cpu.regs.iar());
    cpu.regs.set_iar(target.wrapping_add(1));
    cpu.interrupts.acknowledge(level);
    cpu.regs.set_wait(false);
}

/// Runs one decoded instruction. An unassigned opcode is the no-op that
/// drops the machine into Wait; Iar stays where the fetch left it.
pub fn execute_instruction(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let Some(opcode) = instr.opcode else {
        cpu.regs.set_wait(true);
        return;
    };

    match opcode {
        Opcode::Load => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let value = cpu.mem.read(ea);
            cpu.regs.set_acc(value);
        }
        Opcode::LoadDouble => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let high = cpu.mem.read(ea);
            let low = cpu.mem.read(ea | 1);
            cpu.regs.set_acc(high);
            cpu.regs.set_ext(low);
        }
        Opcode::Store => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            cpu.mem.write(ea, cpu.regs.acc());
        }
        Opcode::StoreDouble => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            cpu.mem.write(ea, cpu.regs.acc());
            cpu.mem.write(ea | 1, cpu.regs.ext());
        }
        Opcode::Add => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let (result, carry, overflow) = alu::add_with_flags(cpu.regs.acc(), cpu.mem.read(ea));
            cpu.regs.set_acc(result);
            apply_arithmetic_flags(cpu, carry, overflow);
        }
        Opcode::AddDouble => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let operand = read_double(cpu, ea);
            let (result, carry, overflow) = alu::add_double_with_flags(cpu.regs.acc_ext(), operand);
            cpu.regs.set_acc_ext(result);
            apply_arithmetic_flags(cpu, carry, overflow);
        }
        Opcode::Subtract => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let (result, carry, overflow) = alu::sub_with_flags(cpu.regs.acc(), cpu.mem.read(ea));
            cpu.regs.set_acc(result);
            apply_arithmetic_flags(cpu, carry, overflow);
        }
        Opcode::SubtractDouble => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let operand = read_double(cpu, ea);
            let (result, carry, overflow) = alu::sub_double_with_flags(cpu.regs.acc_ext(), operand);
            cpu.regs.set_acc_ext(result);
            apply_arithmetic_flags(cpu, carry, overflow);
        }
        Opcode::Multiply => execute_multiply(cpu, instr),
        Opcode::Divide => execute_divide(cpu, instr),
        Opcode::And => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let value = cpu.regs.acc() & cpu.mem.read(ea);
            cpu.regs.set_acc(value);
        }
        Opcode::Or => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let value = cpu.regs.acc() | cpu.mem.read(ea);
            cpu.regs.set_acc(value);
        }
        Opcode::ExclusiveOr => {
            let ea = effective_address(instr, &cpu.regs, &cpu.mem);
            let value = cpu.regs.acc() ^ cpu.mem.read(ea);
            cpu.regs.set_acc(value);
        }
        Opcode::LoadStatus => {
            cpu.regs.set_carry(instr.low_byte & 0x02 != 0);
            cpu.regs.set_overflow(instr.low_byte & 0x01 != 0);
        }
        Opcode::StoreStatus => execute_store_status(cpu, instr),
        Opcode::Wait => cpu.regs.set_wait(true),
        Opcode::LoadIndex => execute_load_index(cpu, instr),
        Opcode::StoreIndex => execute_store_index(cpu, instr),
        Opcode::ModifyIndex => execute_modify_index(cpu, instr),
        Opcode::BranchSkip => execute_branch_skip(cpu, instr),
        Opcode::BranchStore => execute_branch_store(cpu, instr),
        Opcode::ShiftLeft => shift::shift_left(
            &mut cpu.regs,
            LeftShiftMode::from_bits(instr.shift_mode()),
            instr.tag,
            instr.shift_count_field(),
        ),
        Opcode::ShiftRight => shift::shift_right(
            &mut cpu.regs,
            RightShiftMode::from_bits(instr.shift_mode()),
            instr.tag,
            instr.shift_count_field(),
        ),
        Opcode::Xio => execute_xio(cpu, instr),
    }
}

/// Carry is always overwritten; Overflow only ever asserted, so a stale
/// set flag survives non-overflowing arithmetic.
fn apply_arithmetic_flags(cpu: &mut Cpu, carry: bool, overflow: bool) {
    cpu.regs.set_carry(carry);
    if overflow {
        cpu.regs.set_overflow(true);
    }
}

fn read_double(cpu: &Cpu, ea: u16) -> u32 {
    (u32::from(cpu.mem.read(ea)) << 16) | u32::from(cpu.mem.read(ea | 1))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn execute_multiply(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let ea = effective_address(instr, &cpu.regs, &cpu.mem);
    let product =
        i32::from(cpu.regs.acc() as i16).wrapping_mul(i32::from(cpu.mem.read(ea) as i16));
    cpu.regs.set_acc_ext(product as u32);
}

/// Divide check (zero divisor or quotient overflow) asserts Overflow and
/// leaves Acc:Ext unchanged.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn execute_divide(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let ea = effective_address(instr, &cpu.regs, &cpu.mem);
    let divisor = i32::from(cpu.mem.read(ea) as i16);
    if divisor == 0 {
        cpu.regs.set_overflow(true);
        return;
    }
    let dividend = cpu.regs.acc_ext() as i32;
    let quotient = dividend.wrapping_div(divisor);
    if i16::try_from(quotient).is_err() {
        cpu.regs.set_overflow(true);
        return;
    }
    let remainder = dividend.wrapping_rem(divisor);
    cpu.regs.set_acc(quotient as u16);
    cpu.regs.set_ext(remainder as u16);
}

/// Stores Carry into bit 1 and Overflow into bit 0 of the target word,
/// leaving the rest of the word alone, then resets both flags.
fn execute_store_status(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let ea = effective_address(instr, &cpu.regs, &cpu.mem);
    let mut word = cpu.mem.read(ea) & !0x0003;
    if cpu.regs.carry() {
        word |= 0x0002;
    }
    if cpu.regs.overflow() {
        word |= 0x0001;
    }
    cpu.mem.write(ea, word);
    cpu.regs.set_carry(false);
    cpu.regs.set_overflow(false);
}

/// The loaded value is immediate: the address word itself (or one
/// dereference of it), never indexed. Tag 0 loads the instruction
/// address register, making this a branch.
fn execute_load_index(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let value = if instr.long {
        let address_word = instr.address_word.unwrap_or(0);
        if instr.indirect() {
            cpu.mem.read(address_word)
        } else {
            address_word
        }
    } else {
        instr.displacement_ext()
    };
    cpu.regs.set_xr(instr.tag, value);
}

/// The tag names the register being stored, so the short-format target
/// is always Iar-relative and the long-format target is never indexed.
fn execute_store_index(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let ea = if instr.long {
        let address_word = instr.address_word.unwrap_or(0);
        if instr.indirect() {
            cpu.mem.read(address_word)
        } else {
            address_word
        }
    } else {
        cpu.regs.iar().wrapping_add(instr.displacement_ext())
    };
    cpu.mem.write(ea, cpu.regs.xr(instr.tag));
}

const fn modify_skips(old: u16, new: u16) -> bool {
    new == 0 || (old ^ new) & 0x8000 != 0
}

fn execute_modify_index(cpu: &mut Cpu, instr: &DecodedInstruction) {
    if instr.long {
        if instr.tag.is_indexed() {
            let address_word = instr.address_word.unwrap_or(0);
            let delta = if instr.indirect() {
                cpu.mem.read(address_word)
            } else {
                address_word
            };
            let old = cpu.regs.xr(instr.tag);
            let new = old.wrapping_add(delta);
            cpu.regs.set_xr(instr.tag, new);
            if modify_skips(old, new) {
                cpu.regs.advance_iar(1);
            }
        } else {
            // Tag 0 long form modifies a memory word by the low byte; the
            // whole byte is the increment, so no indirect bit exists here.
            let target = instr.address_word.unwrap_or(0);
            let old = cpu.mem.read(target);
            let new = old.wrapping_add(instr.displacement_ext());
            cpu.mem.write(target, new);
            if modify_skips(old, new) {
                cpu.regs.advance_iar(1);
            }
        }
    } else if instr.tag.is_indexed() {
        let old = cpu.regs.xr(instr.tag);
        let new = old.wrapping_add(instr.displacement_ext());
        cpu.regs.set_xr(instr.tag, new);
        if modify_skips(old, new) {
            cpu.regs.advance_iar(1);
        }
    } else {
        // Short, no tag: a plain Iar-relative jump, no skip test.
        let target = cpu.regs.iar().wrapping_add(instr.displacement_ext());
        cpu.regs.set_iar(target);
    }
}

/// Short format skips the next word when any condition holds; long
/// format branches to the target. The level-reset variant additionally
/// pops the current interrupt level, taken or not.
fn execute_branch_skip(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let met = branch::any_condition_met(&mut cpu.regs, instr.condition_mask());

    if instr.resets_interrupt_level() {
        cpu.interrupts.reset_current();
    }

    if instr.long {
        if met {
            let target = effective_address(instr, &cpu.regs, &cpu.mem);
            cpu.regs.set_iar(target);
        }
    } else if met {
        cpu.regs.advance_iar(1);
    }
}

/// Inverted polarity: no condition bits means branch unconditionally; a
/// satisfied condition suppresses the branch. The return address (the
/// word past this instruction) is stored at the target and execution
/// resumes at target + 1.
fn execute_branch_store(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let taken = if instr.long && instr.condition_mask() != 0 {
        !branch::any_condition_met(&mut cpu.regs, instr.condition_mask())
    } else {
        true
    };

    if taken {
        let target = effective_address(instr, &cpu.regs, &cpu.mem);
        cpu.mem.write(target, cpu.regs.iar());
        cpu.regs.set_iar(target.wrapping_add(1));
    }
}

/// Sense-interrupt is answered by the interrupt controller; everything
/// else routes to the device named in the channel command. An unknown
/// device code is a no-op.
fn execute_xio(cpu: &mut Cpu, instr: &DecodedInstruction) {
    let ea = effective_address(instr, &cpu.regs, &cpu.mem);
    let iocc = Iocc::fetch(&cpu.mem, ea);

    match iocc.function() {
        Some(IoFunction::SenseInterrupt) => {
            let status = cpu.interrupts.sense_interrupt();
            cpu.regs.set_acc(status);
        }
        Some(_) => {
            if let Some(mut device) = cpu.take_device(iocc.device_code) {
                device.execute_iocc(cpu, &iocc);
                cpu.restore_device(device);
            }
        }
        None => {}
    }
}
