/*!
state.rs - 6502 status flag masks and a copyable register snapshot.

6502 Status Register Bit Layout
===============================
Bit: 7 6 5 4 3 2 1 0
     N V U B D I Z C
Where:
  N = NEGATIVE
  V = OVERFLOW
  U = UNUSED (forced to 1 after every opcode fetch and in pushed copies)
  B = BREAK (only meaningful in the copy BRK/PHP push)
  D = DECIMAL (no effect on the NES, still settable)
  I = IRQ_DISABLE
  Z = ZERO
  C = CARRY
*/

use std::fmt;

/// Processor status flag bit masks.
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000;
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Base address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Interrupt vectors.
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Architectural registers at one point in time, for debuggers and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
}

impl CpuState {
    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        self.status & mask != 0
    }

    /// Status as "NV-BDIZC", set flags upper case and clear flags as '.'.
    pub fn flags_string(&self) -> String {
        const NAMES: [(u8, char); 8] = [
            (NEGATIVE, 'N'),
            (OVERFLOW, 'V'),
            (UNUSED, '-'),
            (BREAK, 'B'),
            (DECIMAL, 'D'),
            (IRQ_DISABLE, 'I'),
            (ZERO, 'Z'),
            (CARRY, 'C'),
        ];
        NAMES
            .iter()
            .map(|&(mask, c)| if self.flag(mask) { c } else { '.' })
            .collect()
    }
}

impl fmt::Display for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} [{}] SP:{:02X} PC:{:04X}",
            self.a,
            self.x,
            self.y,
            self.status,
            self.flags_string(),
            self.sp,
            self.pc
        )
    }
}
