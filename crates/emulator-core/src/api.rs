//! Host-facing machine container and driving surface.

use crate::error::CoreError;
use crate::io::{Device, InterruptController, InterruptSink, DEVICE_SLOTS};
use crate::memory::{Memory, MemorySize};
use crate::state::Registers;
use crate::Opcode;

/// One complete machine instance: storage, register file, interrupt
/// controller, and the device table. Each instance owns its state
/// exclusively; hosts running several machines create one `Cpu` apiece.
pub struct Cpu {
    /// Core storage.
    pub mem: Memory,
    /// Architectural register file.
    pub regs: Registers,
    /// Interrupt request bookkeeping.
    pub interrupts: InterruptController,
    devices: Vec<Option<Box<dyn Device>>>,
    console_switches: u16,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(MemorySize::default())
    }
}

impl Cpu {
    /// Creates a machine with zeroed storage of the given size.
    #[must_use]
    pub fn new(size: MemorySize) -> Self {
        Self {
            mem: Memory::new(size),
            regs: Registers::default(),
            interrupts: InterruptController::default(),
            devices: (0..DEVICE_SLOTS).map(|_| None).collect(),
            console_switches: 0,
        }
    }

    /// Executes one machine step: interrupt delivery, Wait, or one
    /// instruction. See [`crate::execute::step`].
    pub fn step(&mut self) -> StepOutcome {
        crate::execute::step(self)
    }

    /// Runs until the wait flag is set or `max_steps` is exhausted,
    /// returning the number of steps taken. The step limit is the host's
    /// guard against runaway programs; the core has no timeout of its own.
    pub fn run(&mut self, max_steps: u64) -> u64 {
        let mut steps = 0;
        while steps < max_steps {
            if matches!(self.step(), StepOutcome::Waiting) {
                break;
            }
            steps += 1;
        }
        steps
    }

    /// Registers a device under its own device code.
    ///
    /// # Errors
    ///
    /// Rejects codes outside the 5-bit device space and codes already
    /// taken — configuration mistakes surface here, never mid-program.
    pub fn register_device(&mut self, device: Box<dyn Device>) -> Result<(), CoreError> {
        let code = device.device_code();
        let slot = usize::from(code);
        if slot >= DEVICE_SLOTS {
            return Err(CoreError::DeviceCodeOutOfRange(code));
        }
        if self.devices[slot].is_some() {
            return Err(CoreError::DeviceCodeInUse(code));
        }
        self.devices[slot] = Some(device);
        Ok(())
    }

    /// Removes and returns the device at `code`, if any. Devices mount
    /// and unmount independently of CPU state.
    pub fn unregister_device(&mut self, code: u8) -> Option<Box<dyn Device>> {
        self.devices.get_mut(usize::from(code))?.take()
    }

    /// True when a device answers at `code`.
    #[must_use]
    pub fn has_device(&self, code: u8) -> bool {
        self.devices
            .get(usize::from(code))
            .is_some_and(Option::is_some)
    }

    /// Takes a device out of its slot for a call that also needs the CPU.
    /// The caller must put it back with [`Cpu::restore_device`].
    pub(crate) fn take_device(&mut self, code: u8) -> Option<Box<dyn Device>> {
        self.devices.get_mut(usize::from(code))?.take()
    }

    /// Returns a device taken with [`Cpu::take_device`] to its slot.
    pub(crate) fn restore_device(&mut self, device: Box<dyn Device>) {
        let slot = usize::from(device.device_code());
        if slot < DEVICE_SLOTS {
            self.devices[slot] = Some(device);
        }
    }

    /// One polling pass: invokes every registered device's `run` hook.
    /// Devices that complete asynchronous work do it here, between
    /// instructions — never while one is executing.
    pub fn tick_devices(&mut self) {
        for code in 0..DEVICE_SLOTS {
            #[allow(clippy::cast_possible_truncation)]
            let code = code as u8;
            if let Some(mut device) = self.take_device(code) {
                device.run(self);
                self.restore_device(device);
            }
        }
    }

    /// Current front-panel toggle switch value.
    #[must_use]
    pub const fn console_switches(&self) -> u16 {
        self.console_switches
    }

    /// Sets the front-panel toggle switches.
    pub const fn set_console_switches(&mut self, value: u16) {
        self.console_switches = value;
    }

    /// Captures the architectural state for save/restore.
    #[must_use]
    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            regs: self.regs.clone(),
            mem: self.mem.clone(),
            interrupts: self.interrupts.clone(),
            console_switches: self.console_switches,
        }
    }

    /// Restores a previously captured snapshot. The device table is not
    /// part of the architectural state and is left as-is.
    pub fn restore(&mut self, snapshot: CoreSnapshot) {
        self.regs = snapshot.regs;
        self.mem = snapshot.mem;
        self.interrupts = snapshot.interrupts;
        self.console_switches = snapshot.console_switches;
    }
}

impl InterruptSink for Cpu {
    fn activate_interrupt(&mut self, level: usize, ilsw_bits: u16) {
        self.interrupts.activate(level, ilsw_bits);
    }

    fn deactivate_interrupt(&mut self, level: usize, ilsw_bits: u16) {
        self.interrupts.deactivate(level, ilsw_bits);
    }
}

/// Serializable architectural state: everything a host needs to suspend
/// and resume a machine, excluding the device table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreSnapshot {
    /// Register file.
    pub regs: Registers,
    /// Full storage image.
    pub mem: Memory,
    /// Interrupt controller state.
    pub interrupts: InterruptController,
    /// Front-panel switch value.
    pub console_switches: u16,
}

/// Result of one machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction was fetched and executed. `opcode` is `None` when
    /// the value was unassigned and the machine dropped into Wait.
    Executed {
        /// Operation that ran, if the opcode value is assigned.
        opcode: Option<Opcode>,
    },
    /// An interrupt was delivered instead of fetching an instruction.
    InterruptEntered {
        /// Level entered.
        level: usize,
    },
    /// The wait flag is set and no interrupt is deliverable.
    Waiting,
}

#[cfg(test)]
mod tests {
    use super::{Cpu, StepOutcome};
    use crate::error::CoreError;
    use crate::io::{Device, Iocc};
    use crate::memory::MemorySize;

    struct NamedDevice(u8);

    impl Device for NamedDevice {
        fn device_code(&self) -> u8 {
            self.0
        }

        fn execute_iocc(&mut self, _cpu: &mut Cpu, _iocc: &Iocc) {}
    }

    #[test]
    fn registration_rejects_bad_and_duplicate_codes() {
        let mut cpu = Cpu::new(MemorySize::Words4K);

        assert_eq!(
            cpu.register_device(Box::new(NamedDevice(40))),
            Err(CoreError::DeviceCodeOutOfRange(40))
        );

        assert!(cpu.register_device(Box::new(NamedDevice(9))).is_ok());
        assert_eq!(
            cpu.register_device(Box::new(NamedDevice(9))),
            Err(CoreError::DeviceCodeInUse(9))
        );
        assert!(cpu.has_device(9));
    }

    #[test]
    fn unregister_frees_the_slot() {
        let mut cpu = Cpu::new(MemorySize::Words4K);
        cpu.register_device(Box::new(NamedDevice(5))).unwrap();

        let device = cpu.unregister_device(5).expect("device was registered");
        assert_eq!(device.device_code(), 5);
        assert!(!cpu.has_device(5));
        assert!(cpu.register_device(Box::new(NamedDevice(5))).is_ok());
    }

    #[test]
    fn run_stops_on_wait_or_step_limit() {
        let mut cpu = Cpu::new(MemorySize::Words4K);
        // Word 0 is an unassigned opcode: one step into Wait.
        assert_eq!(cpu.run(100), 1);
        assert!(cpu.regs.wait());
        assert!(matches!(cpu.step(), StepOutcome::Waiting));
    }

    #[test]
    fn snapshot_roundtrip_restores_architectural_state() {
        let mut cpu = Cpu::new(MemorySize::Words4K);
        cpu.regs.set_acc(0x1234);
        cpu.mem.write(0x0040, 0xBEEF);
        cpu.set_console_switches(0x00FF);
        let snapshot = cpu.snapshot();

        cpu.regs.set_acc(0);
        cpu.mem.write(0x0040, 0);
        cpu.set_console_switches(0);
        cpu.restore(snapshot);

        assert_eq!(cpu.regs.acc(), 0x1234);
        assert_eq!(cpu.mem.read(0x0040), 0xBEEF);
        assert_eq!(cpu.console_switches(), 0x00FF);
    }
}
