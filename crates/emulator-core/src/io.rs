//! Programmed I/O bus and vectored interrupt machinery.
//!
//! An I/O instruction names a two-word channel command (IOCC) in memory:
//! word one is the data transfer address, word two packs the device code,
//! function, and modifier. Devices are registered by device code and
//! called synchronously on dispatch; asynchronous completion is modeled
//! by a host-driven polling hook. Interrupt requests flow back through a
//! narrow sink trait so devices never hold a reference to the CPU.

use crate::memory::Memory;
use crate::Cpu;

/// Size of the device table; device codes are 5 bits.
pub const DEVICE_SLOTS: usize = 32;

/// Number of interrupt levels, 0 the highest priority.
pub const INTERRUPT_LEVELS: usize = 6;

/// Memory word holding the level-0 interrupt vector; level `n` vectors
/// through word `INTERRUPT_VECTOR_BASE + n`.
pub const INTERRUPT_VECTOR_BASE: u16 = 0x0008;

/// Three-bit function field of an IOCC control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoFunction {
    /// Transfer one word from memory to the device.
    Write,
    /// Transfer one word from the device to memory.
    Read,
    /// Load the interrupt level status word into the accumulator.
    SenseInterrupt,
    /// Device-specific control command.
    Control,
    /// Start a cycle-stealing write transfer.
    InitiateWrite,
    /// Start a cycle-stealing read transfer.
    InitiateRead,
    /// Load the device status word into the accumulator.
    SenseDevice,
}

impl IoFunction {
    /// Decodes the 3-bit function field. Zero is unassigned and yields
    /// `None`; dispatch treats it as a no-op.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x7 {
            1 => Some(Self::Write),
            2 => Some(Self::Read),
            3 => Some(Self::SenseInterrupt),
            4 => Some(Self::Control),
            5 => Some(Self::InitiateWrite),
            6 => Some(Self::InitiateRead),
            7 => Some(Self::SenseDevice),
            _ => None,
        }
    }
}

/// A decoded two-word I/O channel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iocc {
    /// Data transfer address (word one).
    pub address: u16,
    /// Five-bit device code from the control word.
    pub device_code: u8,
    /// Raw 3-bit function field.
    pub function_bits: u8,
    /// Modifier byte, interpreted by the device.
    pub modifier: u8,
}

impl Iocc {
    /// Reads the descriptor at `descriptor_addr`.
    ///
    /// The hardware selects the two words by the address low bit: the
    /// transfer address comes from the given address and the control word
    /// from its low-bit complement. An even address therefore reads words
    /// 0 and 1 of the pair; an odd address swaps the two roles, producing
    /// a defined but wrong decode instead of an error.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn fetch(mem: &Memory, descriptor_addr: u16) -> Self {
        let address = mem.read(descriptor_addr);
        let control = mem.read(descriptor_addr ^ 1);
        Self {
            address,
            device_code: (control >> 11) as u8,
            function_bits: ((control >> 8) & 0x7) as u8,
            modifier: control as u8,
        }
    }

    /// Classified function field.
    #[must_use]
    pub const fn function(&self) -> Option<IoFunction> {
        IoFunction::from_bits(self.function_bits)
    }
}

/// Interrupt request surface offered to devices.
///
/// Implemented by the CPU and injected at each device call, so a device
/// needs no back-reference to raise or withdraw a request.
pub trait InterruptSink {
    /// ORs `ilsw_bits` into the level's status word and requests service.
    fn activate_interrupt(&mut self, level: usize, ilsw_bits: u16);

    /// Clears `ilsw_bits` from the level's status word; the request drops
    /// once no device bits remain. The caller passes the same bits it
    /// activated — the controller cannot know which bits were whose.
    fn deactivate_interrupt(&mut self, level: usize, ilsw_bits: u16);
}

/// Contract implemented by peripheral devices.
pub trait Device {
    /// Fixed 5-bit device code this device answers to.
    fn device_code(&self) -> u8;

    /// Executes one channel command synchronously.
    fn execute_iocc(&mut self, cpu: &mut Cpu, iocc: &Iocc);

    /// Polling hook for devices that finish work across host ticks.
    fn run(&mut self, cpu: &mut Cpu) {
        let _ = cpu;
    }
}

/// Per-level interrupt request bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InterruptController {
    ilsw: [u16; INTERRUPT_LEVELS],
    in_service: [bool; INTERRUPT_LEVELS],
}

impl InterruptController {
    /// Interrupt level status word for `level`.
    #[must_use]
    pub fn ilsw(&self, level: usize) -> u16 {
        self.ilsw.get(level).copied().unwrap_or(0)
    }

    /// True while any device bit is raised on `level`.
    #[must_use]
    pub fn request_pending(&self, level: usize) -> bool {
        self.ilsw(level) != 0
    }

    /// Highest-priority level with a pending request.
    #[must_use]
    pub fn highest_pending(&self) -> Option<usize> {
        (0..INTERRUPT_LEVELS).find(|&level| self.ilsw[level] != 0)
    }

    /// Highest-priority level currently being serviced.
    #[must_use]
    pub fn current_level(&self) -> Option<usize> {
        (0..INTERRUPT_LEVELS).find(|&level| self.in_service[level])
    }

    /// Level that should be entered now: the highest pending request, but
    /// only if it outranks every level already in service. Equal or
    /// lower-priority requests wait until the current level resets.
    #[must_use]
    pub fn eligible_level(&self) -> Option<usize> {
        let pending = self.highest_pending()?;
        if self.in_service[pending] {
            return None;
        }
        match self.current_level() {
            Some(current) if pending >= current => None,
            _ => Some(pending),
        }
    }

    /// Marks `level` as entered.
    pub fn acknowledge(&mut self, level: usize) {
        if level < INTERRUPT_LEVELS {
            self.in_service[level] = true;
        }
    }

    /// Returns the highest-priority in-service level to inactive. Used by
    /// the level-resetting branch variant on handler exit.
    pub fn reset_current(&mut self) {
        if let Some(level) = self.current_level() {
            self.in_service[level] = false;
        }
    }

    /// ORs device bits into the level status word.
    pub fn activate(&mut self, level: usize, ilsw_bits: u16) {
        if level < INTERRUPT_LEVELS {
            self.ilsw[level] |= ilsw_bits;
        }
    }

    /// Clears device bits from the level status word.
    pub fn deactivate(&mut self, level: usize, ilsw_bits: u16) {
        if level < INTERRUPT_LEVELS {
            self.ilsw[level] &= !ilsw_bits;
        }
    }

    /// Status word presented by a sense-interrupt command: the level in
    /// service if any, else the highest pending request, else zero.
    #[must_use]
    pub fn sense_interrupt(&self) -> u16 {
        self.current_level()
            .or_else(|| self.highest_pending())
            .map_or(0, |level| self.ilsw[level])
    }
}
