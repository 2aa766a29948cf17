#![doc = r#"
famicore library crate.

NES emulator core: the 6502 CPU, the 2C02 PPU, the system bus and NROM cartridges.

Modules:
- bus: `Bus`, the composition root. Owns CPU, PPU, RAM, cartridge, controllers and OAM DMA,
  and drives the master clock.
- cartridge: iNES loader and cartridge storage; constructs a mapper from the header
- controller: standard pad shift register
- cpu: 6502 core (state + addressing + execute + opcode table)
- disassembler: readable listings of CPU address space
- mapper: `Mapper` trait and NROM (mapper 0)
- ppu: registers, PPU bus, background and sprite pipelines, framebuffer
- screenshot (feature `screenshot`): PNG export of the framebuffer

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod disassembler;
pub mod mapper;
pub mod ppu;
#[cfg(feature = "screenshot")]
pub mod screenshot;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError, Mirroring};
pub use controller::{Button, Controller};
pub use cpu::{Cpu, CpuState};
pub use ppu::Ppu;

#[cfg(test)]
pub mod test_utils;
