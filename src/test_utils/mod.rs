//! Shared test utilities: minimal iNES (v1) image builders and a flat CPU bus.
//!
//! Notes on iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => loader allocates 8 KiB CHR RAM)
//! - byte 6 = mapper1 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = mapper2 (NES 2.0 marker, mapper high nibble)
//! - byte 8 = PRG RAM size in 8 KiB units
//! - bytes 9..15 = TV system bytes and padding
//!
//! Vectors:
//! - For 16 KiB PRG (NROM-128): vectors are at PRG offset 0x3FFA..=0x3FFF
//! - For 32 KiB PRG (NROM-256): vectors are at PRG offset 0x7FFA..=0x7FFF

#![allow(dead_code)]

use crate::bus::interfaces::CpuBus;

/// Build a minimal iNES (v1) image. PRG is filled with 0xAA and CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * 16 * 1024));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * 8 * 1024));
    bytes
}

/// Build an NROM-128 image with `prg` at $8000 and the given (reset, nmi, irq) vectors,
/// all defaulting to $8000. `chr_8k == 0` gives a CHR RAM cartridge.
pub fn build_nrom_with_prg(prg: &[u8], chr_8k: usize, vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(
        prg.len() <= 16 * 1024 - 6,
        "Program must fit below the vectors of a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, chr_8k, 0, 0, 0, None);
    let prg_start = 16;
    let prg_end = prg_start + 16 * 1024;
    let bank = &mut rom[prg_start..prg_end];
    bank.fill(0xEA); // NOP sled
    bank[..prg.len()].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(bank, reset, nmi, irq);
    rom
}

/// Write CPU vectors (NMI, RESET, IRQ/BRK) into a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!(
            "Unsupported PRG length for vector placement: {} bytes (expected 16 KiB or 32 KiB)",
            other
        ),
    };
    prg[base..base + 2].copy_from_slice(&nmi.to_le_bytes());
    prg[base + 2..base + 4].copy_from_slice(&reset.to_le_bytes());
    prg[base + 4..base + 6].copy_from_slice(&irq.to_le_bytes());
}

/// 64 KiB of flat RAM behind the [`CpuBus`] interface, for CPU tests that need
/// arbitrary addresses to be plain memory.
pub struct FlatBus {
    pub mem: Vec<u8>,
}

impl FlatBus {
    pub fn new() -> Self {
        Self {
            mem: vec![0; 0x1_0000],
        }
    }

    /// Copy `program` to `origin` and point the reset vector at it.
    pub fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.load(origin, program);
        bus.load(0xFFFC, &origin.to_le_bytes());
        bus
    }

    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl CpuBus for FlatBus {
    fn cpu_read(&mut self, addr: u16, _read_only: bool) -> u8 {
        self.mem[addr as usize]
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom[8], 1);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_32k_prg() {
        let mut prg = vec![0u8; 32 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x7FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn builds_nrom_with_prg_and_vectors() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], 1, Some((0x8000, 0x9000, 0xA000)));
        assert_eq!(rom[16], 0xA9);
        assert_eq!(rom[18], 0xEA);
        assert_eq!(&rom[16 + 0x3FFA..16 + 0x4000], &[0x00, 0x90, 0x00, 0x80, 0x00, 0xA0]);
    }
}
