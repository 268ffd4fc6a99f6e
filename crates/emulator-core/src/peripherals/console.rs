//! Front-panel console entry switches.
//!
//! The sixteen toggle switches are the simplest device on the bus: no
//! state of their own, no interrupts, no timing. A read transfers the
//! current switch value into memory; a sense loads it into the
//! accumulator. The value itself lives on the [`Cpu`] so hosts can flip
//! switches without holding the device.

use crate::io::{Device, IoFunction, Iocc};
use crate::Cpu;

/// Device code the console switches answer to.
pub const CONSOLE_DEVICE_CODE: u8 = 0x07;

/// The console entry switch bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEntrySwitches;

impl ConsoleEntrySwitches {
    /// Creates the switch device.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Device for ConsoleEntrySwitches {
    fn device_code(&self) -> u8 {
        CONSOLE_DEVICE_CODE
    }

    fn execute_iocc(&mut self, cpu: &mut Cpu, iocc: &Iocc) {
        match iocc.function() {
            Some(IoFunction::Read) => {
                cpu.mem.write(iocc.address, cpu.console_switches());
            }
            Some(IoFunction::SenseDevice) => {
                cpu.regs.set_acc(cpu.console_switches());
            }
            // Switches accept no other commands.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsoleEntrySwitches, CONSOLE_DEVICE_CODE};
    use crate::decoder::encode_word;
    use crate::memory::MemorySize;
    use crate::state::IndexTag;
    use crate::Cpu;

    fn cpu_with_xio(control: u16) -> Cpu {
        let mut cpu = Cpu::new(MemorySize::Words4K);
        cpu.mem
            .load(0x0100, &[encode_word(0x01, true, IndexTag::Tag0, 0x00), 0x0200]);
        cpu.mem.write(0x0200, 0x0300);
        cpu.mem.write(0x0201, control);
        cpu.regs.set_iar(0x0100);
        cpu.register_device(Box::new(ConsoleEntrySwitches::new()))
            .unwrap();
        cpu
    }

    #[test]
    fn read_transfers_the_switches_into_memory() {
        let control = (u16::from(CONSOLE_DEVICE_CODE) << 11) | (0x2 << 8);
        let mut cpu = cpu_with_xio(control);
        cpu.set_console_switches(0xA5A5);

        cpu.step();
        assert_eq!(cpu.mem.read(0x0300), 0xA5A5);
    }

    #[test]
    fn sense_loads_the_switches_into_the_accumulator() {
        let control = (u16::from(CONSOLE_DEVICE_CODE) << 11) | (0x7 << 8);
        let mut cpu = cpu_with_xio(control);
        cpu.set_console_switches(0x0042);

        cpu.step();
        assert_eq!(cpu.regs.acc(), 0x0042);
    }

    #[test]
    fn unsupported_functions_are_ignored() {
        // Write (function 1) is not meaningful for input-only switches.
        let control = (u16::from(CONSOLE_DEVICE_CODE) << 11) | (0x1 << 8);
        let mut cpu = cpu_with_xio(control);
        cpu.set_console_switches(0x1234);

        cpu.step();
        assert_eq!(cpu.mem.read(0x0300), 0);
        assert_eq!(cpu.regs.acc(), 0);
    }
}
