/*!
table.rs - The 256-entry opcode table.

Each row carries the mnemonic, the addressing mode, the operation and the base cycle
count. The dispatcher in `core` charges one extra cycle only when both the addressing
mode and the operation ask for it (page-crossing reads and taken branches).

Opcodes with no modelled behaviour map to `xxx` under the name "???". Unofficial NOPs
keep their real addressing modes so they consume their operand bytes.
*/

use crate::bus::interfaces::CpuBus;
use crate::cpu::addressing::AddrMode::{self, *};
use crate::cpu::core::Cpu;
use crate::cpu::execute::*;

/// Operation body. Returns 1 if it may take the addressing mode's extra cycle.
pub type Operation = fn(&mut Cpu, &mut dyn CpuBus) -> u8;

#[derive(Clone, Copy)]
pub struct Instruction {
    pub name: &'static str,
    pub mode: AddrMode,
    pub operate: Operation,
    pub cycles: u8,
}

impl Instruction {
    const fn new(name: &'static str, operate: Operation, mode: AddrMode, cycles: u8) -> Self {
        Self {
            name,
            mode,
            operate,
            cycles,
        }
    }
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instruction")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("cycles", &self.cycles)
            .finish()
    }
}

const fn op(name: &'static str, operate: Operation, mode: AddrMode, cycles: u8) -> Instruction {
    Instruction::new(name, operate, mode, cycles)
}

const fn ill(cycles: u8) -> Instruction {
    Instruction::new("???", xxx, Imp, cycles)
}

#[rustfmt::skip]
pub static INSTRUCTIONS: [Instruction; 256] = [
    // 0x00
    op("BRK", brk, Imp, 7), op("ORA", ora, Izx, 6), ill(2), ill(8),
    op("NOP", nop, Zp0, 3), op("ORA", ora, Zp0, 3), op("ASL", asl, Zp0, 5), ill(5),
    op("PHP", php, Imp, 3), op("ORA", ora, Imm, 2), op("ASL", asl, Imp, 2), ill(2),
    op("NOP", nop, Abs, 4), op("ORA", ora, Abs, 4), op("ASL", asl, Abs, 6), ill(6),
    // 0x10
    op("BPL", bpl, Rel, 2), op("ORA", ora, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("ORA", ora, Zpx, 4), op("ASL", asl, Zpx, 6), ill(6),
    op("CLC", clc, Imp, 2), op("ORA", ora, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("ORA", ora, Abx, 4), op("ASL", asl, Abx, 7), ill(7),
    // 0x20
    op("JSR", jsr, Abs, 6), op("AND", and, Izx, 6), ill(2), ill(8),
    op("BIT", bit, Zp0, 3), op("AND", and, Zp0, 3), op("ROL", rol, Zp0, 5), ill(5),
    op("PLP", plp, Imp, 4), op("AND", and, Imm, 2), op("ROL", rol, Imp, 2), ill(2),
    op("BIT", bit, Abs, 4), op("AND", and, Abs, 4), op("ROL", rol, Abs, 6), ill(6),
    // 0x30
    op("BMI", bmi, Rel, 2), op("AND", and, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("AND", and, Zpx, 4), op("ROL", rol, Zpx, 6), ill(6),
    op("SEC", sec, Imp, 2), op("AND", and, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("AND", and, Abx, 4), op("ROL", rol, Abx, 7), ill(7),
    // 0x40
    op("RTI", rti, Imp, 6), op("EOR", eor, Izx, 6), ill(2), ill(8),
    op("NOP", nop, Zp0, 3), op("EOR", eor, Zp0, 3), op("LSR", lsr, Zp0, 5), ill(5),
    op("PHA", pha, Imp, 3), op("EOR", eor, Imm, 2), op("LSR", lsr, Imp, 2), ill(2),
    op("JMP", jmp, Abs, 3), op("EOR", eor, Abs, 4), op("LSR", lsr, Abs, 6), ill(6),
    // 0x50
    op("BVC", bvc, Rel, 2), op("EOR", eor, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("EOR", eor, Zpx, 4), op("LSR", lsr, Zpx, 6), ill(6),
    op("CLI", cli, Imp, 2), op("EOR", eor, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("EOR", eor, Abx, 4), op("LSR", lsr, Abx, 7), ill(7),
    // 0x60
    op("RTS", rts, Imp, 6), op("ADC", adc, Izx, 6), ill(2), ill(8),
    op("NOP", nop, Zp0, 3), op("ADC", adc, Zp0, 3), op("ROR", ror, Zp0, 5), ill(5),
    op("PLA", pla, Imp, 4), op("ADC", adc, Imm, 2), op("ROR", ror, Imp, 2), ill(2),
    op("JMP", jmp, Ind, 5), op("ADC", adc, Abs, 4), op("ROR", ror, Abs, 6), ill(6),
    // 0x70
    op("BVS", bvs, Rel, 2), op("ADC", adc, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("ADC", adc, Zpx, 4), op("ROR", ror, Zpx, 6), ill(6),
    op("SEI", sei, Imp, 2), op("ADC", adc, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("ADC", adc, Abx, 4), op("ROR", ror, Abx, 7), ill(7),
    // 0x80
    op("NOP", nop, Imm, 2), op("STA", sta, Izx, 6), op("NOP", nop, Imm, 2), ill(6),
    op("STY", sty, Zp0, 3), op("STA", sta, Zp0, 3), op("STX", stx, Zp0, 3), ill(3),
    op("DEY", dey, Imp, 2), op("NOP", nop, Imm, 2), op("TXA", txa, Imp, 2), ill(2),
    op("STY", sty, Abs, 4), op("STA", sta, Abs, 4), op("STX", stx, Abs, 4), ill(4),
    // 0x90
    op("BCC", bcc, Rel, 2), op("STA", sta, Izy, 6), ill(2), ill(6),
    op("STY", sty, Zpx, 4), op("STA", sta, Zpx, 4), op("STX", stx, Zpy, 4), ill(4),
    op("TYA", tya, Imp, 2), op("STA", sta, Aby, 5), op("TXS", txs, Imp, 2), ill(5),
    ill(5), op("STA", sta, Abx, 5), ill(5), ill(5),
    // 0xA0
    op("LDY", ldy, Imm, 2), op("LDA", lda, Izx, 6), op("LDX", ldx, Imm, 2), ill(6),
    op("LDY", ldy, Zp0, 3), op("LDA", lda, Zp0, 3), op("LDX", ldx, Zp0, 3), ill(3),
    op("TAY", tay, Imp, 2), op("LDA", lda, Imm, 2), op("TAX", tax, Imp, 2), ill(2),
    op("LDY", ldy, Abs, 4), op("LDA", lda, Abs, 4), op("LDX", ldx, Abs, 4), ill(4),
    // 0xB0
    op("BCS", bcs, Rel, 2), op("LDA", lda, Izy, 5), ill(2), ill(5),
    op("LDY", ldy, Zpx, 4), op("LDA", lda, Zpx, 4), op("LDX", ldx, Zpy, 4), ill(4),
    op("CLV", clv, Imp, 2), op("LDA", lda, Aby, 4), op("TSX", tsx, Imp, 2), ill(4),
    op("LDY", ldy, Abx, 4), op("LDA", lda, Abx, 4), op("LDX", ldx, Aby, 4), ill(4),
    // 0xC0
    op("CPY", cpy, Imm, 2), op("CMP", cmp, Izx, 6), op("NOP", nop, Imm, 2), ill(8),
    op("CPY", cpy, Zp0, 3), op("CMP", cmp, Zp0, 3), op("DEC", dec, Zp0, 5), ill(5),
    op("INY", iny, Imp, 2), op("CMP", cmp, Imm, 2), op("DEX", dex, Imp, 2), ill(2),
    op("CPY", cpy, Abs, 4), op("CMP", cmp, Abs, 4), op("DEC", dec, Abs, 6), ill(6),
    // 0xD0
    op("BNE", bne, Rel, 2), op("CMP", cmp, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("CMP", cmp, Zpx, 4), op("DEC", dec, Zpx, 6), ill(6),
    op("CLD", cld, Imp, 2), op("CMP", cmp, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("CMP", cmp, Abx, 4), op("DEC", dec, Abx, 7), ill(7),
    // 0xE0
    op("CPX", cpx, Imm, 2), op("SBC", sbc, Izx, 6), op("NOP", nop, Imm, 2), ill(8),
    op("CPX", cpx, Zp0, 3), op("SBC", sbc, Zp0, 3), op("INC", inc, Zp0, 5), ill(5),
    op("INX", inx, Imp, 2), op("SBC", sbc, Imm, 2), op("NOP", nop, Imp, 2), op("???", sbc, Imm, 2),
    op("CPX", cpx, Abs, 4), op("SBC", sbc, Abs, 4), op("INC", inc, Abs, 6), ill(6),
    // 0xF0
    op("BEQ", beq, Rel, 2), op("SBC", sbc, Izy, 5), ill(2), ill(8),
    op("NOP", nop, Zpx, 4), op("SBC", sbc, Zpx, 4), op("INC", inc, Zpx, 6), ill(6),
    op("SED", sed, Imp, 2), op("SBC", sbc, Aby, 4), op("NOP", nop, Imp, 2), ill(7),
    op("NOP", nop, Abx, 4), op("SBC", sbc, Abx, 4), op("INC", inc, Abx, 7), ill(7),
];
