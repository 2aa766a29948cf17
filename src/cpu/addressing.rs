/*!
Addressing modes and operand resolution.

Each mode advances `pc` past its operand bytes and leaves the effective address in
`addr_abs` (or the sign-extended branch offset in `addr_rel`). The resolver returns 1
when indexing crossed a page, which the table dispatcher ANDs with the operation's
own request before charging the extra cycle.

Notable quirks:
- Zero-page indexed and indexed-indirect pointers wrap inside page 0.
- Indirect (JMP only) reproduces the page-wrap bug: a pointer at $xxFF fetches its
  high byte from $xx00, not from the next page.
*/

use crate::bus::interfaces::CpuBus;
use crate::cpu::core::{Cpu, read_word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Implied / accumulator.
    Imp,
    Imm,
    Zp0,
    Zpx,
    Zpy,
    Rel,
    Abs,
    Abx,
    Aby,
    Ind,
    Izx,
    Izy,
}

impl AddrMode {
    /// Bytes of operand following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddrMode::Imp => 0,
            AddrMode::Imm
            | AddrMode::Zp0
            | AddrMode::Zpx
            | AddrMode::Zpy
            | AddrMode::Rel
            | AddrMode::Izx
            | AddrMode::Izy => 1,
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind => 2,
        }
    }

    /// Three-letter tag used in disassembly listings.
    pub const fn tag(self) -> &'static str {
        match self {
            AddrMode::Imp => "IMP",
            AddrMode::Imm => "IMM",
            AddrMode::Zp0 => "ZP0",
            AddrMode::Zpx => "ZPX",
            AddrMode::Zpy => "ZPY",
            AddrMode::Rel => "REL",
            AddrMode::Abs => "ABS",
            AddrMode::Abx => "ABX",
            AddrMode::Aby => "ABY",
            AddrMode::Ind => "IND",
            AddrMode::Izx => "IZX",
            AddrMode::Izy => "IZY",
        }
    }
}

#[inline]
fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl Cpu {
    #[inline]
    fn next_byte(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let b = bus.cpu_read(self.pc, false);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    #[inline]
    fn next_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.next_byte(bus) as u16;
        let hi = self.next_byte(bus) as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand address for `mode`. Returns 1 if an extra cycle may apply.
    pub(crate) fn resolve_address(&mut self, mode: AddrMode, bus: &mut dyn CpuBus) -> u8 {
        match mode {
            AddrMode::Imp => {
                self.fetched = self.a;
                0
            }
            AddrMode::Imm => {
                self.addr_abs = self.pc;
                self.pc = self.pc.wrapping_add(1);
                0
            }
            AddrMode::Zp0 => {
                self.addr_abs = self.next_byte(bus) as u16;
                0
            }
            AddrMode::Zpx => {
                self.addr_abs = self.next_byte(bus).wrapping_add(self.x) as u16;
                0
            }
            AddrMode::Zpy => {
                self.addr_abs = self.next_byte(bus).wrapping_add(self.y) as u16;
                0
            }
            AddrMode::Rel => {
                self.addr_rel = self.next_byte(bus) as i8 as u16;
                0
            }
            AddrMode::Abs => {
                self.addr_abs = self.next_word(bus);
                0
            }
            AddrMode::Abx => {
                let base = self.next_word(bus);
                self.addr_abs = base.wrapping_add(self.x as u16);
                page_crossed(base, self.addr_abs) as u8
            }
            AddrMode::Aby => {
                let base = self.next_word(bus);
                self.addr_abs = base.wrapping_add(self.y as u16);
                page_crossed(base, self.addr_abs) as u8
            }
            AddrMode::Ind => {
                let ptr = self.next_word(bus);
                self.addr_abs = read_word_indirect_bug(bus, ptr);
                0
            }
            AddrMode::Izx => {
                let zp = self.next_byte(bus).wrapping_add(self.x);
                self.addr_abs = read_word_zp(bus, zp);
                0
            }
            AddrMode::Izy => {
                let zp = self.next_byte(bus);
                let base = read_word_zp(bus, zp);
                self.addr_abs = base.wrapping_add(self.y as u16);
                page_crossed(base, self.addr_abs) as u8
            }
        }
    }
}

/// Word from zero page with the pointer wrapping at $FF -> $00.
#[inline]
pub(crate) fn read_word_zp(bus: &mut dyn CpuBus, zp: u8) -> u16 {
    let lo = bus.cpu_read(zp as u16, false) as u16;
    let hi = bus.cpu_read(zp.wrapping_add(1) as u16, false) as u16;
    (hi << 8) | lo
}

/// Word at `ptr`, except that a pointer ending in $FF takes its high byte from the
/// start of the same page.
#[inline]
pub(crate) fn read_word_indirect_bug(bus: &mut dyn CpuBus, ptr: u16) -> u16 {
    if ptr & 0x00FF == 0x00FF {
        let lo = bus.cpu_read(ptr, false) as u16;
        let hi = bus.cpu_read(ptr & 0xFF00, false) as u16;
        (hi << 8) | lo
    } else {
        read_word(bus, ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FlatBus;

    #[test]
    fn indirect_pointer_wraps_within_page() {
        let mut bus = FlatBus::new();
        bus.mem[0x30FF] = 0x80;
        bus.mem[0x3000] = 0x00;
        bus.mem[0x3100] = 0x12;
        assert_eq!(read_word_indirect_bug(&mut bus, 0x30FF), 0x0080);

        bus.mem[0x3010] = 0x34;
        bus.mem[0x3011] = 0x12;
        assert_eq!(read_word_indirect_bug(&mut bus, 0x3010), 0x1234);
    }

    #[test]
    fn ind_mode_with_operand_30ff() {
        let mut bus = FlatBus::new();
        bus.load(0x0200, &[0xFF, 0x30]);
        bus.mem[0x30FF] = 0x80;
        bus.mem[0x3000] = 0x00;
        bus.mem[0x3100] = 0x40;
        let mut cpu = Cpu::new();
        cpu.pc = 0x0200;
        assert_eq!(cpu.resolve_address(AddrMode::Ind, &mut bus), 0);
        assert_eq!(cpu.addr_abs, 0x0080);
        assert_eq!(cpu.pc, 0x0202);
    }

    #[test]
    fn abs_x_page_cross_detection() {
        let mut bus = FlatBus::new();
        bus.load(0x0200, &[0xFF, 0x10, 0x00, 0x10]);
        let mut cpu = Cpu::new();
        cpu.pc = 0x0200;
        cpu.x = 1;
        assert_eq!(cpu.resolve_address(AddrMode::Abx, &mut bus), 1);
        assert_eq!(cpu.addr_abs, 0x1100);
        assert_eq!(cpu.resolve_address(AddrMode::Abx, &mut bus), 0);
        assert_eq!(cpu.addr_abs, 0x1001);
    }

    #[test]
    fn relative_offset_is_sign_extended() {
        let mut bus = FlatBus::new();
        bus.load(0x0200, &[0x80, 0x7F]);
        let mut cpu = Cpu::new();
        cpu.pc = 0x0200;
        cpu.resolve_address(AddrMode::Rel, &mut bus);
        assert_eq!(cpu.addr_rel, 0xFF80);
        cpu.resolve_address(AddrMode::Rel, &mut bus);
        assert_eq!(cpu.addr_rel, 0x007F);
    }

    #[test]
    fn implied_latches_accumulator() {
        let mut bus = FlatBus::new();
        let mut cpu = Cpu::new();
        cpu.a = 0x5C;
        cpu.resolve_address(AddrMode::Imp, &mut bus);
        assert_eq!(cpu.fetched, 0x5C);
        assert_eq!(cpu.pc, 0);
    }
}
