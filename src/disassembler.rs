/*!
disassembler - turn a range of CPU address space into readable listings.

Lines are keyed by instruction address and look like:

```text
    $8000: LDA #$0A {IMM}
    $8010: BNE $FA [$800C] {REL}
```

All reads go through `CpuBus::cpu_read` with `read_only = true`, so listing a range
that covers PPU or controller registers does not disturb them.
*/

use std::collections::BTreeMap;

use crate::bus::interfaces::CpuBus;
use crate::cpu::{AddrMode, INSTRUCTIONS};

/// Disassemble every instruction starting in `start..=stop`.
///
/// An instruction whose operand runs past $FFFF ends the listing.
pub fn disassemble<B: CpuBus + ?Sized>(bus: &mut B, start: u16, stop: u16) -> BTreeMap<u16, String> {
    let mut lines = BTreeMap::new();
    let mut addr = start as u32;

    while addr <= stop as u32 {
        let line_addr = addr as u16;
        let ins = &INSTRUCTIONS[bus.cpu_read(line_addr, true) as usize];
        let len = ins.mode.operand_len() as u32;
        if addr + len > 0xFFFF {
            break;
        }

        let byte = |bus: &mut B, off: u32| bus.cpu_read((addr + off) as u16, true);
        let lo = if len >= 1 { byte(bus, 1) } else { 0 };
        let hi = if len >= 2 { byte(bus, 2) } else { 0 };
        let word = u16::from_le_bytes([lo, hi]);
        let next = addr + 1 + len;

        let operand = match ins.mode {
            AddrMode::Imp => String::new(),
            AddrMode::Imm => format!("#${lo:02X}"),
            AddrMode::Zp0 => format!("${lo:02X}"),
            AddrMode::Zpx => format!("${lo:02X}, X"),
            AddrMode::Zpy => format!("${lo:02X}, Y"),
            AddrMode::Izx => format!("(${lo:02X}, X)"),
            AddrMode::Izy => format!("(${lo:02X}), Y"),
            AddrMode::Abs => format!("${word:04X}"),
            AddrMode::Abx => format!("${word:04X}, X"),
            AddrMode::Aby => format!("${word:04X}, Y"),
            AddrMode::Ind => format!("(${word:04X})"),
            AddrMode::Rel => {
                let target = (next as u16).wrapping_add(lo as i8 as u16);
                format!("${lo:02X} [${target:04X}]")
            }
        };

        let text = if operand.is_empty() {
            format!("${line_addr:04X}: {} {{{}}}", ins.name, ins.mode.tag())
        } else {
            format!("${line_addr:04X}: {} {operand} {{{}}}", ins.name, ins.mode.tag())
        };
        lines.insert(line_addr, text);
        addr = next;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FlatBus;

    #[test]
    fn formats_each_addressing_mode() {
        let mut bus = FlatBus::new();
        bus.load(
            0x8000,
            &[
                0xA9, 0x0A, // LDA #$0A
                0x8E, 0x00, 0x02, // STX $0200
                0xB5, 0x10, // LDA $10, X
                0xB1, 0x20, // LDA ($20), Y
                0x6C, 0xFF, 0x30, // JMP ($30FF)
                0x18, // CLC
                0xD0, 0xFA, // BNE -6
            ],
        );
        let lines = disassemble(&mut bus, 0x8000, 0x800E);
        assert_eq!(lines[&0x8000], "$8000: LDA #$0A {IMM}");
        assert_eq!(lines[&0x8002], "$8002: STX $0200 {ABS}");
        assert_eq!(lines[&0x8005], "$8005: LDA $10, X {ZPX}");
        assert_eq!(lines[&0x8007], "$8007: LDA ($20), Y {IZY}");
        assert_eq!(lines[&0x8009], "$8009: JMP ($30FF) {IND}");
        assert_eq!(lines[&0x800C], "$800C: CLC {IMP}");
        assert_eq!(lines[&0x800D], "$800D: BNE $FA [$8009] {REL}");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn illegal_opcodes_are_listed_as_unknown() {
        let mut bus = FlatBus::new();
        bus.load(0x0300, &[0x02]);
        let lines = disassemble(&mut bus, 0x0300, 0x0300);
        assert_eq!(lines[&0x0300], "$0300: ??? {IMP}");
    }

    #[test]
    fn stops_at_top_of_address_space() {
        let mut bus = FlatBus::new();
        bus.mem[0xFFFE] = 0xEA;
        bus.mem[0xFFFF] = 0xAD; // LDA abs with no room for its operand
        let lines = disassemble(&mut bus, 0xFFFE, 0xFFFF);
        assert_eq!(lines.len(), 1);
        assert!(lines[&0xFFFE].starts_with("$FFFE: NOP"));
    }
}
