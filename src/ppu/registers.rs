#![doc = r#"
PPU registers module

Purpose
- Flag types for PPUCTRL/PPUMASK/PPUSTATUS and the 15-bit loopy scroll register.
- CPU-visible register semantics for the eight ports at $2000..$2007.

Notes
- The bus passes `addr & 7`; mirroring across $2000..=$3FFF happens there.
- PPUSTATUS returns the flags in bits 7..5 and stale `data_buffer` bits below them.
  Reading it clears vblank and the write latch.
- PPUSCROLL and PPUADDR share one write latch.
- PPUDATA reads below $3F00 are one access behind; palette reads are not.
- A `read_only` read has no side effects and is what debuggers use.
"#]

use bitflags::bitflags;

use super::Ppu;
use crate::cartridge::Cartridge;

bitflags! {
    /// $2000 PPUCTRL.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Control: u8 {
        const NAMETABLE_X        = 0b0000_0001;
        const NAMETABLE_Y        = 0b0000_0010;
        const INCREMENT_MODE     = 0b0000_0100;
        const PATTERN_SPRITE     = 0b0000_1000;
        const PATTERN_BACKGROUND = 0b0001_0000;
        const SPRITE_SIZE        = 0b0010_0000;
        const SLAVE_MODE         = 0b0100_0000;
        const ENABLE_NMI         = 0b1000_0000;
    }
}

bitflags! {
    /// $2001 PPUMASK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mask: u8 {
        const GRAYSCALE              = 0b0000_0001;
        const RENDER_BACKGROUND_LEFT = 0b0000_0010;
        const RENDER_SPRITES_LEFT    = 0b0000_0100;
        const RENDER_BACKGROUND      = 0b0000_1000;
        const RENDER_SPRITES         = 0b0001_0000;
        const ENHANCE_RED            = 0b0010_0000;
        const ENHANCE_GREEN          = 0b0100_0000;
        const ENHANCE_BLUE           = 0b1000_0000;
    }
}

bitflags! {
    /// $2002 PPUSTATUS. Only the top three bits are real.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VERTICAL_BLANK  = 0b1000_0000;
    }
}

/// Loopy scroll/address register.
///
/// ```text
/// yyy NN YYYYY XXXXX
/// ||| || ||||| +++++-- coarse X
/// ||| || +++++-------- coarse Y
/// ||| |+-------------- nametable X
/// ||| +--------------- nametable Y
/// +++----------------- fine Y
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopyRegister(pub u16);

impl LoopyRegister {
    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & 0x001F) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, v: u8) {
        self.0 = (self.0 & !0x001F) | (v as u16 & 0x1F);
    }

    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 >> 5) & 0x1F) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, v: u8) {
        self.0 = (self.0 & !0x03E0) | ((v as u16 & 0x1F) << 5);
    }

    #[inline]
    pub fn nametable_x(self) -> u8 {
        ((self.0 >> 10) & 1) as u8
    }

    #[inline]
    pub fn set_nametable_x(&mut self, v: u8) {
        self.0 = (self.0 & !0x0400) | ((v as u16 & 1) << 10);
    }

    #[inline]
    pub fn nametable_y(self) -> u8 {
        ((self.0 >> 11) & 1) as u8
    }

    #[inline]
    pub fn set_nametable_y(&mut self, v: u8) {
        self.0 = (self.0 & !0x0800) | ((v as u16 & 1) << 11);
    }

    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 >> 12) & 0x07) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, v: u8) {
        self.0 = (self.0 & !0x7000) | ((v as u16 & 0x07) << 12);
    }
}

impl Ppu {
    #[inline]
    fn status_byte(&self) -> u8 {
        (self.status.bits() & 0xE0) | (self.data_buffer & 0x1F)
    }

    #[inline]
    fn vram_increment(&self) -> u16 {
        if self.control.contains(Control::INCREMENT_MODE) {
            32
        } else {
            1
        }
    }

    /// CPU read of port `reg` (0..=7).
    pub fn cpu_read(&mut self, reg: u16, read_only: bool, cart: Option<&Cartridge>) -> u8 {
        if read_only {
            return match reg & 7 {
                0 => self.control.bits(),
                1 => self.mask.bits(),
                2 => self.status_byte(),
                4 => self.oam[self.oam_addr as usize],
                7 => self.data_buffer,
                _ => 0,
            };
        }

        match reg & 7 {
            2 => {
                let data = self.status_byte();
                self.status.remove(Status::VERTICAL_BLANK);
                self.address_latch = false;
                data
            }
            4 => self.oam[self.oam_addr as usize],
            7 => {
                let addr = self.vram_addr.0;
                let mut data = self.data_buffer;
                self.data_buffer = self.ppu_read(addr, cart);
                if (addr & 0x3FFF) >= 0x3F00 {
                    data = self.data_buffer;
                }
                self.vram_addr.0 = addr.wrapping_add(self.vram_increment());
                data
            }
            // Control, mask, OAM address, scroll and address are write-only.
            _ => 0,
        }
    }

    /// CPU write of port `reg` (0..=7).
    pub fn cpu_write(&mut self, reg: u16, data: u8, cart: Option<&mut Cartridge>) {
        match reg & 7 {
            0 => {
                self.control = Control::from_bits_retain(data);
                self.tram_addr
                    .set_nametable_x(self.control.contains(Control::NAMETABLE_X) as u8);
                self.tram_addr
                    .set_nametable_y(self.control.contains(Control::NAMETABLE_Y) as u8);
            }
            1 => self.mask = Mask::from_bits_retain(data),
            2 => {}
            3 => self.oam_addr = data,
            4 => {
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.address_latch {
                    self.fine_x = data & 0x07;
                    self.tram_addr.set_coarse_x(data >> 3);
                } else {
                    self.tram_addr.set_fine_y(data & 0x07);
                    self.tram_addr.set_coarse_y(data >> 3);
                }
                self.address_latch = !self.address_latch;
            }
            6 => {
                if !self.address_latch {
                    self.tram_addr.0 = ((data as u16 & 0x3F) << 8) | (self.tram_addr.0 & 0x00FF);
                } else {
                    self.tram_addr.0 = (self.tram_addr.0 & 0xFF00) | data as u16;
                    self.vram_addr = self.tram_addr;
                }
                self.address_latch = !self.address_latch;
            }
            _ => {
                let addr = self.vram_addr.0;
                self.ppu_write(addr, data, cart);
                self.vram_addr.0 = addr.wrapping_add(self.vram_increment());
            }
        }
    }
}
