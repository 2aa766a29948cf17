/*!
core::Cpu - the 6502 execution engine.

Timing model
============
The CPU executes a whole instruction in the first cycle it is clocked and then idles
for the rest of the instruction's cycle budget:

- `clock()` with `cycles == 0` fetches the opcode at `pc`, forces the U flag, looks the
  opcode up in [`INSTRUCTIONS`], loads the base cycle count and runs the addressing-mode
  resolver followed by the operation.
- Both the resolver and the operation may ask for one extra cycle. The extra cycle is
  only granted when both ask (page-crossing reads), so stores and read-modify-write
  instructions keep their fixed cost.
- Every call ends by decrementing `cycles`.

`complete()` reports an instruction boundary, which is how hosts single-step.

Interrupts
==========
`reset`, `irq` and `nmi` are requested by the host or the bus and take effect
immediately, overwriting the remaining cycle budget with their own cost.
*/

use crate::bus::interfaces::CpuBus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::state::{
    BREAK, CpuState, IRQ_DISABLE, IRQ_VECTOR, NEGATIVE, NMI_VECTOR, RESET_VECTOR, STACK_BASE,
    UNUSED, ZERO,
};
use crate::cpu::table::INSTRUCTIONS;

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,

    // Scratch state shared between the resolver and the operation of one instruction.
    pub(crate) fetched: u8,
    pub(crate) addr_abs: u16,
    pub(crate) addr_rel: u16,
    pub(crate) opcode: u8,
    pub(crate) cycles: u8,
    clock_count: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the architectural registers.
    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
        }
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    #[inline]
    pub fn get_flag(&self, mask: u8) -> bool {
        self.status & mask != 0
    }

    #[inline]
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    #[inline]
    pub(crate) fn update_zn(&mut self, value: u8) {
        self.set_flag(ZERO, value == 0);
        self.set_flag(NEGATIVE, value & 0x80 != 0);
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Advance one CPU cycle.
    pub fn clock(&mut self, bus: &mut dyn CpuBus) {
        if self.cycles == 0 {
            self.opcode = bus.cpu_read(self.pc, false);
            self.set_flag(UNUSED, true);
            self.pc = self.pc.wrapping_add(1);

            let ins = &INSTRUCTIONS[self.opcode as usize];
            self.cycles = ins.cycles;
            let mode_extra = self.resolve_address(ins.mode, bus);
            let op_extra = (ins.operate)(self, bus);
            self.cycles += mode_extra & op_extra;

            self.set_flag(UNUSED, true);
        }

        self.clock_count += 1;
        self.cycles = self.cycles.saturating_sub(1);
    }

    /// True at an instruction boundary.
    #[inline]
    pub fn complete(&self) -> bool {
        self.cycles == 0
    }

    /// CPU cycles clocked since construction.
    pub fn total_cycles(&self) -> u64 {
        self.clock_count
    }

    /// Addressing mode of the instruction currently executing.
    #[inline]
    pub(crate) fn mode(&self) -> AddrMode {
        INSTRUCTIONS[self.opcode as usize].mode
    }

    /// Operand of the current instruction: the accumulator for implied mode,
    /// otherwise the byte at `addr_abs`.
    pub(crate) fn fetch(&mut self, bus: &mut dyn CpuBus) -> u8 {
        if self.mode() != AddrMode::Imp {
            self.fetched = bus.cpu_read(self.addr_abs, false);
        }
        self.fetched
    }

    // ---------------------------------------------------------------------
    // Interrupts
    // ---------------------------------------------------------------------

    /// Load the reset vector and put registers in their reset state. Costs 8 cycles.
    pub fn reset(&mut self, bus: &mut dyn CpuBus) {
        self.pc = read_word(bus, RESET_VECTOR);
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.status = UNUSED;

        self.addr_rel = 0;
        self.addr_abs = 0;
        self.fetched = 0;
        self.cycles = 8;
    }

    /// Maskable interrupt request; ignored while I is set. Costs 7 cycles.
    pub fn irq(&mut self, bus: &mut dyn CpuBus) {
        if self.get_flag(IRQ_DISABLE) {
            return;
        }
        self.interrupt(bus, IRQ_VECTOR);
        self.cycles = 7;
    }

    /// Non-maskable interrupt. Costs 8 cycles.
    pub fn nmi(&mut self, bus: &mut dyn CpuBus) {
        self.interrupt(bus, NMI_VECTOR);
        self.cycles = 8;
    }

    fn interrupt(&mut self, bus: &mut dyn CpuBus, vector: u16) {
        self.push_word(bus, self.pc);
        self.set_flag(BREAK, false);
        self.set_flag(UNUSED, true);
        self.set_flag(IRQ_DISABLE, true);
        self.push(bus, self.status);
        self.pc = read_word(bus, vector);
    }

    // ---------------------------------------------------------------------
    // Stack
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn push(&mut self, bus: &mut dyn CpuBus, value: u8) {
        bus.cpu_write(STACK_BASE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub(crate) fn pop(&mut self, bus: &mut dyn CpuBus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.cpu_read(STACK_BASE + self.sp as u16, false)
    }

    /// High byte first, as the 6502 does.
    pub(crate) fn push_word(&mut self, bus: &mut dyn CpuBus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    pub(crate) fn pop_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.pop(bus) as u16;
        let hi = self.pop(bus) as u16;
        (hi << 8) | lo
    }
}

/// Little-endian word at `addr`.
#[inline]
pub(crate) fn read_word(bus: &mut dyn CpuBus, addr: u16) -> u16 {
    let lo = bus.cpu_read(addr, false) as u16;
    let hi = bus.cpu_read(addr.wrapping_add(1), false) as u16;
    (hi << 8) | lo
}
