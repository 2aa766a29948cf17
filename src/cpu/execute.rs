/*!
execute.rs - 6502 operation routines.

Every routine has the [`Operation`](crate::cpu::table::Operation) signature so the opcode
table can point at it directly. Addressing has already run, so operands come from
`Cpu::fetch` (accumulator in implied mode) and destinations from `addr_abs`.

The return value is the operation's half of the extra-cycle handshake: 1 for the
read-type instructions whose cost grows when indexing crosses a page, 0 otherwise.
Branches add their own cycles directly.
*/

use crate::bus::interfaces::CpuBus;
use crate::cpu::addressing::AddrMode;
use crate::cpu::core::{Cpu, read_word};
use crate::cpu::state::{
    BREAK, CARRY, DECIMAL, IRQ_DISABLE, IRQ_VECTOR, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};

// ---------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------

/// Binary add with carry shared by ADC and SBC.
#[inline]
fn add_with_carry(cpu: &mut Cpu, value: u8) {
    let a = cpu.a as u16;
    let m = value as u16;
    let sum = a + m + cpu.get_flag(CARRY) as u16;
    cpu.set_flag(CARRY, sum > 0x00FF);
    cpu.set_flag(OVERFLOW, (!(a ^ m) & (a ^ sum)) & 0x0080 != 0);
    cpu.a = sum as u8;
    cpu.update_zn(cpu.a);
}

/// Store a read-modify-write result to A (implied) or memory.
#[inline]
fn write_back(cpu: &mut Cpu, bus: &mut dyn CpuBus, value: u8) {
    if cpu.mode() == AddrMode::Imp {
        cpu.a = value;
    } else {
        bus.cpu_write(cpu.addr_abs, value);
    }
}

#[inline]
fn branch_if(cpu: &mut Cpu, cond: bool) -> u8 {
    if cond {
        cpu.cycles += 1;
        cpu.addr_abs = cpu.pc.wrapping_add(cpu.addr_rel);
        if cpu.addr_abs & 0xFF00 != cpu.pc & 0xFF00 {
            cpu.cycles += 1;
        }
        cpu.pc = cpu.addr_abs;
    }
    0
}

#[inline]
fn compare(cpu: &mut Cpu, bus: &mut dyn CpuBus, reg: u8) {
    let m = cpu.fetch(bus);
    cpu.set_flag(CARRY, reg >= m);
    cpu.update_zn(reg.wrapping_sub(m));
}

// ---------------------------------------------------------------------
// Arithmetic and logic
// ---------------------------------------------------------------------

pub fn adc(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    add_with_carry(cpu, m);
    1
}

pub fn sbc(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    add_with_carry(cpu, m ^ 0xFF);
    1
}

pub fn and(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    cpu.a &= m;
    cpu.update_zn(cpu.a);
    1
}

pub fn ora(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    cpu.a |= m;
    cpu.update_zn(cpu.a);
    1
}

pub fn eor(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    cpu.a ^= m;
    cpu.update_zn(cpu.a);
    1
}

pub fn bit(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    cpu.set_flag(ZERO, cpu.a & m == 0);
    cpu.set_flag(NEGATIVE, m & 0x80 != 0);
    cpu.set_flag(OVERFLOW, m & 0x40 != 0);
    0
}

pub fn cmp(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let reg = cpu.a;
    compare(cpu, bus, reg);
    1
}

pub fn cpx(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let reg = cpu.x;
    compare(cpu, bus, reg);
    0
}

pub fn cpy(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let reg = cpu.y;
    compare(cpu, bus, reg);
    0
}

// ---------------------------------------------------------------------
// Shifts and rotates
// ---------------------------------------------------------------------

pub fn asl(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    let r = m << 1;
    cpu.set_flag(CARRY, m & 0x80 != 0);
    cpu.update_zn(r);
    write_back(cpu, bus, r);
    0
}

pub fn lsr(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    let r = m >> 1;
    cpu.set_flag(CARRY, m & 0x01 != 0);
    cpu.update_zn(r);
    write_back(cpu, bus, r);
    0
}

pub fn rol(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    let r = (m << 1) | cpu.get_flag(CARRY) as u8;
    cpu.set_flag(CARRY, m & 0x80 != 0);
    cpu.update_zn(r);
    write_back(cpu, bus, r);
    0
}

pub fn ror(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let m = cpu.fetch(bus);
    let r = ((cpu.get_flag(CARRY) as u8) << 7) | (m >> 1);
    cpu.set_flag(CARRY, m & 0x01 != 0);
    cpu.update_zn(r);
    write_back(cpu, bus, r);
    0
}

// ---------------------------------------------------------------------
// Increments and decrements
// ---------------------------------------------------------------------

pub fn inc(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let r = cpu.fetch(bus).wrapping_add(1);
    bus.cpu_write(cpu.addr_abs, r);
    cpu.update_zn(r);
    0
}

pub fn dec(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    let r = cpu.fetch(bus).wrapping_sub(1);
    bus.cpu_write(cpu.addr_abs, r);
    cpu.update_zn(r);
    0
}

pub fn inx(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zn(cpu.x);
    0
}

pub fn iny(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zn(cpu.y);
    0
}

pub fn dex(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zn(cpu.x);
    0
}

pub fn dey(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zn(cpu.y);
    0
}

// ---------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------

pub fn bcc(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = !cpu.get_flag(CARRY);
    branch_if(cpu, taken)
}

pub fn bcs(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = cpu.get_flag(CARRY);
    branch_if(cpu, taken)
}

pub fn beq(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = cpu.get_flag(ZERO);
    branch_if(cpu, taken)
}

pub fn bne(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = !cpu.get_flag(ZERO);
    branch_if(cpu, taken)
}

pub fn bmi(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = cpu.get_flag(NEGATIVE);
    branch_if(cpu, taken)
}

pub fn bpl(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = !cpu.get_flag(NEGATIVE);
    branch_if(cpu, taken)
}

pub fn bvc(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = !cpu.get_flag(OVERFLOW);
    branch_if(cpu, taken)
}

pub fn bvs(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    let taken = cpu.get_flag(OVERFLOW);
    branch_if(cpu, taken)
}

// ---------------------------------------------------------------------
// Jumps, subroutines and interrupts
// ---------------------------------------------------------------------

pub fn jmp(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.pc = cpu.addr_abs;
    0
}

pub fn jsr(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.push_word(bus, cpu.pc.wrapping_sub(1));
    cpu.pc = cpu.addr_abs;
    0
}

pub fn rts(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.pc = cpu.pop_word(bus).wrapping_add(1);
    0
}

pub fn brk(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    // Skip the padding byte after the opcode.
    cpu.pc = cpu.pc.wrapping_add(1);
    cpu.set_flag(IRQ_DISABLE, true);
    cpu.push_word(bus, cpu.pc);
    cpu.push(bus, cpu.status | BREAK | UNUSED);
    cpu.set_flag(BREAK, false);
    cpu.pc = read_word(bus, IRQ_VECTOR);
    0
}

pub fn rti(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.status = cpu.pop(bus) & !(BREAK | UNUSED);
    cpu.pc = cpu.pop_word(bus);
    0
}

// ---------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------

pub fn pha(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.push(bus, cpu.a);
    0
}

pub fn php(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.push(bus, cpu.status | BREAK | UNUSED);
    0
}

pub fn pla(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.a = cpu.pop(bus);
    cpu.update_zn(cpu.a);
    0
}

pub fn plp(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.status = cpu.pop(bus) | UNUSED;
    0
}

// ---------------------------------------------------------------------
// Loads, stores and transfers
// ---------------------------------------------------------------------

pub fn lda(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.a = cpu.fetch(bus);
    cpu.update_zn(cpu.a);
    1
}

pub fn ldx(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.x = cpu.fetch(bus);
    cpu.update_zn(cpu.x);
    1
}

pub fn ldy(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    cpu.y = cpu.fetch(bus);
    cpu.update_zn(cpu.y);
    1
}

pub fn sta(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    bus.cpu_write(cpu.addr_abs, cpu.a);
    0
}

pub fn stx(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    bus.cpu_write(cpu.addr_abs, cpu.x);
    0
}

pub fn sty(cpu: &mut Cpu, bus: &mut dyn CpuBus) -> u8 {
    bus.cpu_write(cpu.addr_abs, cpu.y);
    0
}

pub fn tax(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.x = cpu.a;
    cpu.update_zn(cpu.x);
    0
}

pub fn tay(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.y = cpu.a;
    cpu.update_zn(cpu.y);
    0
}

pub fn tsx(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.x = cpu.sp;
    cpu.update_zn(cpu.x);
    0
}

pub fn txa(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.a = cpu.x;
    cpu.update_zn(cpu.a);
    0
}

/// Only transfer that leaves the flags alone.
pub fn txs(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.sp = cpu.x;
    0
}

pub fn tya(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.a = cpu.y;
    cpu.update_zn(cpu.a);
    0
}

// ---------------------------------------------------------------------
// Flag set/clear
// ---------------------------------------------------------------------

pub fn clc(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(CARRY, false);
    0
}

pub fn cld(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(DECIMAL, false);
    0
}

pub fn cli(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(IRQ_DISABLE, false);
    0
}

pub fn clv(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(OVERFLOW, false);
    0
}

pub fn sec(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(CARRY, true);
    0
}

pub fn sed(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(DECIMAL, true);
    0
}

pub fn sei(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    cpu.set_flag(IRQ_DISABLE, true);
    0
}

// ---------------------------------------------------------------------
// No-ops
// ---------------------------------------------------------------------

/// Official and unofficial NOPs. The absolute,X forms pay for page crossings.
pub fn nop(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    matches!(cpu.opcode, 0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC) as u8
}

/// Filler for opcodes with no modelled behaviour.
pub fn xxx(cpu: &mut Cpu, _bus: &mut dyn CpuBus) -> u8 {
    log::trace!(
        "illegal opcode ${:02X} at ${:04X}",
        cpu.opcode,
        cpu.pc.wrapping_sub(1)
    );
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FlatBus;

    fn cpu_at(opcode: u8, mode_addr: u16) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.opcode = opcode;
        cpu.addr_abs = mode_addr;
        cpu.status = UNUSED;
        cpu.sp = 0xFD;
        cpu
    }

    #[test]
    fn compare_sets_carry_zero_negative() {
        let mut bus = FlatBus::new();
        bus.mem[0x10] = 0x40;
        // CMP zp
        let mut cpu = cpu_at(0xC5, 0x10);
        cpu.a = 0x40;
        assert_eq!(cmp(&mut cpu, &mut bus), 1);
        assert!(cpu.get_flag(CARRY) && cpu.get_flag(ZERO));

        cpu.a = 0x30;
        cmp(&mut cpu, &mut bus);
        assert!(!cpu.get_flag(CARRY));
        assert!(cpu.get_flag(NEGATIVE));

        // CPX zp never requests the extra cycle
        let mut cpu = cpu_at(0xE4, 0x10);
        cpu.x = 0x41;
        assert_eq!(cpx(&mut cpu, &mut bus), 0);
        assert!(cpu.get_flag(CARRY) && !cpu.get_flag(ZERO));
    }

    #[test]
    fn bit_copies_operand_high_bits() {
        let mut bus = FlatBus::new();
        bus.mem[0x20] = 0xC0;
        let mut cpu = cpu_at(0x24, 0x20);
        cpu.a = 0x01;
        bit(&mut cpu, &mut bus);
        assert!(cpu.get_flag(ZERO));
        assert!(cpu.get_flag(NEGATIVE));
        assert!(cpu.get_flag(OVERFLOW));
    }

    #[test]
    fn inc_dec_memory_wrap() {
        let mut bus = FlatBus::new();
        bus.mem[0x30] = 0xFF;
        let mut cpu = cpu_at(0xE6, 0x30);
        inc(&mut cpu, &mut bus);
        assert_eq!(bus.mem[0x30], 0x00);
        assert!(cpu.get_flag(ZERO));
        dec(&mut cpu, &mut bus);
        assert_eq!(bus.mem[0x30], 0xFF);
        assert!(cpu.get_flag(NEGATIVE));
    }

    #[test]
    fn stack_push_pull_accumulator_and_status() {
        let mut bus = FlatBus::new();
        let mut cpu = cpu_at(0x48, 0);
        cpu.a = 0x80;
        pha(&mut cpu, &mut bus);
        assert_eq!(cpu.sp, 0xFC);
        cpu.a = 0;
        pla(&mut cpu, &mut bus);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.get_flag(NEGATIVE));

        bus.mem[0x01FE] = 0x00;
        plp(&mut cpu, &mut bus);
        assert_eq!(cpu.status, UNUSED);
    }

    #[test]
    fn transfers_update_flags_except_txs() {
        let mut bus = FlatBus::new();
        let mut cpu = cpu_at(0xAA, 0);
        cpu.a = 0;
        tax(&mut cpu, &mut bus);
        assert!(cpu.get_flag(ZERO));

        cpu.x = 0x80;
        cpu.status = UNUSED;
        txs(&mut cpu, &mut bus);
        assert_eq!(cpu.sp, 0x80);
        assert_eq!(cpu.status, UNUSED);

        tsx(&mut cpu, &mut bus);
        assert!(cpu.get_flag(NEGATIVE));
    }

    #[test]
    fn nop_extra_cycle_subset() {
        let mut bus = FlatBus::new();
        for op in [0x1C, 0x3C, 0x5C, 0x7C, 0xDC, 0xFC] {
            assert_eq!(nop(&mut cpu_at(op, 0), &mut bus), 1, "${op:02X}");
        }
        for op in [0xEA, 0x1A, 0x04, 0x0C, 0x80] {
            assert_eq!(nop(&mut cpu_at(op, 0), &mut bus), 0, "${op:02X}");
        }
    }
}
