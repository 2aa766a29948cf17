#![doc = r#"
Bus module: composition root for the emulated console.

Overview
- `Bus` owns every device: CPU, PPU, 2 KiB work RAM, the optional cartridge, both
  controllers and the OAM DMA engine. Hosts construct one `Bus`, insert a cartridge,
  reset, then drive it with `clock()` or the step helpers.
- The CPU never sees `Bus` directly. It is handed a `CpuBusView` that borrows the
  other fields, so the CPU can live inside the bus without aliasing.

CPU address map
- $0000-$1FFF: work RAM, mirrored every 2 KiB
- $2000-$3FFF: PPU registers, mirrored every 8 bytes
- $4014: OAM DMA trigger
- $4016/$4017: controller ports
- $6000-$FFFF: cartridge (mapper-dependent); the cartridge is asked first for every address
- anything else reads 0 and ignores writes

Modules
- ram: work RAM with mirroring.
- dma: OAM DMA state machine.
- clock: master clock divider, DMA servicing, NMI forwarding and the step helpers.
- interfaces: `CpuBus`/`OamWriter` traits and the split-borrow `CpuBusView`.
"#]

pub mod clock;
pub mod dma;
pub mod interfaces;
pub mod ram;

use std::collections::BTreeMap;

use crate::cartridge::{Cartridge, CartridgeError};
use crate::controller::Controller;
use crate::cpu::Cpu;
use crate::disassembler;
use crate::ppu::Ppu;
use dma::DmaController;
use interfaces::{CpuBus, CpuBusView};
use ram::Ram;

pub struct Bus {
    pub cpu: Cpu,
    pub ppu: Ppu,
    ram: Ram,
    cartridge: Option<Cartridge>,
    controllers: [Controller; 2],
    dma: DmaController,
    system_clock: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            ram: Ram::new(),
            cartridge: None,
            controllers: [Controller::new(), Controller::new()],
            dma: DmaController::new(),
            system_clock: 0,
        }
    }

    // -------------- Structure --------------

    /// Attach a cartridge, replacing any previous one. Call `reset` afterwards.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    /// Parse an iNES image and insert it. On error the current cartridge stays attached.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::from_ines_bytes(bytes)?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Reset the whole system: cartridge, CPU and PPU, plus clock and DMA state.
    /// Work RAM keeps its contents, as on hardware.
    pub fn reset(&mut self) {
        log::debug!("system reset");
        if let Some(cart) = self.cartridge.as_mut() {
            cart.reset();
        }
        self.dma.reset();
        self.system_clock = 0;
        self.ppu.reset();
        let (cpu, mut view) = self.split();
        cpu.reset(&mut view);
    }

    // -------------- CPU address space --------------

    pub fn cpu_read(&mut self, addr: u16, read_only: bool) -> u8 {
        self.view().cpu_read(addr, read_only)
    }

    pub fn cpu_write(&mut self, addr: u16, data: u8) {
        self.view().cpu_write(addr, data);
    }

    // -------------- Host helpers --------------

    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        &mut self.controllers[port & 1]
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Master clock ticks since the last reset.
    pub fn system_clock(&self) -> u64 {
        self.system_clock
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_active()
    }

    /// Disassemble `[start, stop]` without disturbing device state.
    pub fn disassemble(&mut self, start: u16, stop: u16) -> BTreeMap<u16, String> {
        disassembler::disassemble(self, start, stop)
    }

    // -------------- Borrow plumbing --------------

    #[inline]
    fn view(&mut self) -> CpuBusView<'_> {
        self.split().1
    }

    /// Split the CPU from a view over the rest of the bus.
    #[inline]
    fn split(&mut self) -> (&mut Cpu, CpuBusView<'_>) {
        let view = CpuBusView::from_parts(
            &mut self.ram,
            &mut self.ppu,
            self.cartridge.as_mut(),
            &mut self.controllers,
            &mut self.dma,
        );
        (&mut self.cpu, view)
    }
}

impl CpuBus for Bus {
    fn cpu_read(&mut self, addr: u16, read_only: bool) -> u8 {
        Bus::cpu_read(self, addr, read_only)
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        Bus::cpu_write(self, addr, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_ines, build_nrom_with_prg};

    fn bus_with(rom: &[u8]) -> Bus {
        let mut bus = Bus::new();
        bus.load_rom(rom).expect("load");
        bus.reset();
        bus
    }

    #[test]
    fn ram_mirrors_across_8k_window() {
        let mut bus = Bus::new();
        for addr in (0x0000u16..=0x1FFF).step_by(7) {
            let value = addr as u8 ^ 0x5A;
            bus.cpu_write(addr, value);
            for k in 0..4u16 {
                let mirror = (addr & 0x07FF) | (k << 11);
                assert_eq!(bus.cpu_read(mirror, false), value, "${addr:04X} via ${mirror:04X}");
            }
        }
    }

    #[test]
    fn reset_vector_is_loaded() {
        let rom = build_nrom_with_prg(&[], 1, Some((0x9234, 0x8000, 0x8000)));
        let bus = bus_with(&rom);
        assert_eq!(bus.cpu.pc, 0x9234);
        assert_eq!(bus.cpu.sp, 0xFD);
    }

    #[test]
    fn cartridge_is_consulted_first() {
        let rom = build_ines(1, 1, 0, 0, 1, None);
        let mut bus = bus_with(&rom);
        assert_eq!(bus.cpu_read(0x8000, false), 0xAA);
        assert_eq!(bus.cpu_read(0xC000, true), 0xAA);
        bus.cpu_write(0x6000, 0x77);
        assert_eq!(bus.cpu_read(0x6000, false), 0x77);
    }

    #[test]
    fn failed_load_keeps_previous_cartridge() {
        let mut bus = bus_with(&build_ines(1, 1, 0, 0, 0, None));
        assert!(bus.load_rom(b"not a rom").is_err());
        assert!(bus.cartridge().is_some());
        assert!(bus.load_rom(&build_ines(1, 1, 0x40, 0, 0, None)).is_err());
        assert_eq!(bus.cartridge().map(|c| c.mapper_id()), Some(0));
    }

    #[test]
    fn read_only_status_read_keeps_vblank() {
        let mut bus = Bus::new();
        bus.ppu.force_vblank_for_test();
        assert_eq!(bus.cpu_read(0x2002, true) & 0x80, 0x80);
        assert_eq!(bus.cpu_read(0x200A, false) & 0x80, 0x80);
        assert_eq!(bus.cpu_read(0x2002, false) & 0x80, 0x00);
    }

    #[test]
    fn reset_clears_clock_and_dma_but_keeps_ram() {
        let rom = build_nrom_with_prg(&[], 1, None);
        let mut bus = bus_with(&rom);
        for _ in 0..30 {
            bus.clock();
        }
        bus.cpu_write(0x0123, 0x5A);
        bus.cpu_write(0x4014, 0x02);
        assert!(bus.dma_active());
        bus.reset();
        assert!(!bus.dma_active());
        assert_eq!(bus.system_clock(), 0);
        assert_eq!(bus.cpu_read(0x0123, true), 0x5A, "work RAM survives reset");
    }
}
