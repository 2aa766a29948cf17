/*!
interfaces: the narrow traits that decouple the CPU and DMA engine from the concrete `Bus`.

- [`CpuBus`] is everything the CPU (and the disassembler) needs: byte reads and writes on
  the CPU address space. `read_only` reads must leave device state untouched so debuggers
  can inspect memory without consuming PPU or controller side effects.
- [`OamWriter`] is the one PPU capability OAM DMA needs.

`CpuBusView` implements both by borrowing the bus sub-fields separately, which lets the
bus hand the CPU a memory view while the CPU itself is also a bus field.
*/

use crate::bus::dma::DmaController;
use crate::bus::ram::Ram;
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::ppu::Ppu;

/// CPU-visible address space.
pub trait CpuBus {
    fn cpu_read(&mut self, addr: u16, read_only: bool) -> u8;
    fn cpu_write(&mut self, addr: u16, data: u8);
}

/// Direct write into PPU object attribute memory.
pub trait OamWriter {
    fn write_oam(&mut self, index: u8, value: u8);
}

/// Mutable view over the bus sub-fields the CPU address decoder touches.
pub(in crate::bus) struct CpuBusView<'a> {
    ram: &'a mut Ram,
    ppu: &'a mut Ppu,
    cartridge: Option<&'a mut Cartridge>,
    controllers: &'a mut [Controller; 2],
    dma: &'a mut DmaController,
}

impl<'a> CpuBusView<'a> {
    #[inline]
    pub(in crate::bus) fn from_parts(
        ram: &'a mut Ram,
        ppu: &'a mut Ppu,
        cartridge: Option<&'a mut Cartridge>,
        controllers: &'a mut [Controller; 2],
        dma: &'a mut DmaController,
    ) -> Self {
        Self {
            ram,
            ppu,
            cartridge,
            controllers,
            dma,
        }
    }
}

impl CpuBus for CpuBusView<'_> {
    fn cpu_read(&mut self, addr: u16, read_only: bool) -> u8 {
        // The cartridge may claim any address before the fixed map is consulted.
        if let Some(data) = self.cartridge.as_deref().and_then(|c| c.cpu_read(addr)) {
            return data;
        }
        match addr {
            0x0000..=0x1FFF => self.ram.read(addr),
            0x2000..=0x3FFF => {
                self.ppu
                    .cpu_read(addr & 0x0007, read_only, self.cartridge.as_deref())
            }
            0x4016 | 0x4017 => {
                let pad = &mut self.controllers[(addr & 1) as usize];
                if read_only { pad.peek() } else { pad.read() }
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        if let Some(cart) = self.cartridge.as_deref_mut() {
            if cart.cpu_write(addr, data) {
                return;
            }
        }
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, data),
            0x2000..=0x3FFF => {
                self.ppu
                    .cpu_write(addr & 0x0007, data, self.cartridge.as_deref_mut())
            }
            0x4014 => self.dma.start(data),
            0x4016 | 0x4017 => self.controllers[(addr & 1) as usize].latch(),
            _ => {}
        }
    }
}

impl OamWriter for CpuBusView<'_> {
    #[inline]
    fn write_oam(&mut self, index: u8, value: u8) {
        self.ppu.write_oam(index, value);
    }
}
