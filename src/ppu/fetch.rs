#![doc = r#"
PPU fetch helpers

Responsibilities
- The 8-dot background fetch sequence: nametable byte, attribute byte, pattern low,
  pattern high, then a coarse X increment.
- 16-bit pattern and attribute shifters, reloaded every tile and shifted every dot.
- Loopy scroll increments and the tram -> vram transfers at the end of each line and
  during the pre-render line.
- The background pixel/palette pair for the current dot, selected by fine X.

Increments and transfers only happen while background or sprite rendering is enabled.
"#]

use super::{Control, Mask, Ppu};
use crate::cartridge::Cartridge;

/// Latches filled by the fetch sequence and the shifters they feed.
#[derive(Debug, Clone, Default)]
pub(crate) struct BackgroundShifters {
    pub(crate) next_tile_id: u8,
    pub(crate) next_tile_attrib: u8,
    pub(crate) next_tile_lsb: u8,
    pub(crate) next_tile_msb: u8,

    pub(crate) pattern_lo: u16,
    pub(crate) pattern_hi: u16,
    pub(crate) attrib_lo: u16,
    pub(crate) attrib_hi: u16,
}

impl Ppu {
    /// Coarse X step; wraps at 31 into the neighbouring horizontal nametable.
    pub(in crate::ppu) fn increment_scroll_x(&mut self) {
        if !self.rendering_enabled() {
            return;
        }
        if self.vram_addr.coarse_x() == 31 {
            self.vram_addr.set_coarse_x(0);
            self.vram_addr.set_nametable_x(self.vram_addr.nametable_x() ^ 1);
        } else {
            self.vram_addr.set_coarse_x(self.vram_addr.coarse_x() + 1);
        }
    }

    /// Fine Y step, carrying into coarse Y.
    ///
    /// Coarse Y wraps at 29 into the other vertical nametable. Rows 30 and 31 hold
    /// attribute data; if scrolled into them, coarse Y wraps at 31 without switching.
    pub(in crate::ppu) fn increment_scroll_y(&mut self) {
        if !self.rendering_enabled() {
            return;
        }
        let fine_y = self.vram_addr.fine_y();
        if fine_y < 7 {
            self.vram_addr.set_fine_y(fine_y + 1);
            return;
        }
        self.vram_addr.set_fine_y(0);
        match self.vram_addr.coarse_y() {
            29 => {
                self.vram_addr.set_coarse_y(0);
                self.vram_addr.set_nametable_y(self.vram_addr.nametable_y() ^ 1);
            }
            31 => self.vram_addr.set_coarse_y(0),
            y => self.vram_addr.set_coarse_y(y + 1),
        }
    }

    pub(in crate::ppu) fn transfer_address_x(&mut self) {
        if !self.rendering_enabled() {
            return;
        }
        self.vram_addr.set_nametable_x(self.tram_addr.nametable_x());
        self.vram_addr.set_coarse_x(self.tram_addr.coarse_x());
    }

    pub(in crate::ppu) fn transfer_address_y(&mut self) {
        if !self.rendering_enabled() {
            return;
        }
        self.vram_addr.set_fine_y(self.tram_addr.fine_y());
        self.vram_addr.set_nametable_y(self.tram_addr.nametable_y());
        self.vram_addr.set_coarse_y(self.tram_addr.coarse_y());
    }

    /// Move the fetched tile into the low byte of each shifter. Attribute bits are
    /// stretched to a full byte so they shift in step with the pattern bits.
    pub(in crate::ppu) fn load_background_shifters(&mut self) {
        let bg = &mut self.bg;
        bg.pattern_lo = (bg.pattern_lo & 0xFF00) | bg.next_tile_lsb as u16;
        bg.pattern_hi = (bg.pattern_hi & 0xFF00) | bg.next_tile_msb as u16;
        bg.attrib_lo =
            (bg.attrib_lo & 0xFF00) | if bg.next_tile_attrib & 0b01 != 0 { 0xFF } else { 0x00 };
        bg.attrib_hi =
            (bg.attrib_hi & 0xFF00) | if bg.next_tile_attrib & 0b10 != 0 { 0xFF } else { 0x00 };
    }

    pub(in crate::ppu) fn update_shifters(&mut self) {
        if self.mask.contains(Mask::RENDER_BACKGROUND) {
            self.bg.pattern_lo <<= 1;
            self.bg.pattern_hi <<= 1;
            self.bg.attrib_lo <<= 1;
            self.bg.attrib_hi <<= 1;
        }
        if self.mask.contains(Mask::RENDER_SPRITES) && (1..258).contains(&self.cycle) {
            self.sprites.shift();
        }
    }

    /// One step of the 8-dot fetch sequence, keyed on `(cycle - 1) % 8`.
    pub(in crate::ppu) fn fetch_background(&mut self, cart: Option<&Cartridge>) {
        let v = self.vram_addr;
        match (self.cycle - 1) % 8 {
            0 => {
                self.load_background_shifters();
                self.bg.next_tile_id = self.ppu_read(0x2000 | (v.0 & 0x0FFF), cart);
            }
            2 => {
                let addr = 0x23C0
                    | ((v.nametable_y() as u16) << 11)
                    | ((v.nametable_x() as u16) << 10)
                    | (((v.coarse_y() >> 2) as u16) << 3)
                    | (v.coarse_x() >> 2) as u16;
                let mut attrib = self.ppu_read(addr, cart);
                if v.coarse_y() & 0x02 != 0 {
                    attrib >>= 4;
                }
                if v.coarse_x() & 0x02 != 0 {
                    attrib >>= 2;
                }
                self.bg.next_tile_attrib = attrib & 0x03;
            }
            4 => {
                let addr = self.background_pattern_addr();
                self.bg.next_tile_lsb = self.ppu_read(addr, cart);
            }
            6 => {
                let addr = self.background_pattern_addr() + 8;
                self.bg.next_tile_msb = self.ppu_read(addr, cart);
            }
            7 => self.increment_scroll_x(),
            _ => {}
        }
    }

    #[inline]
    fn background_pattern_addr(&self) -> u16 {
        let table = self.control.contains(Control::PATTERN_BACKGROUND) as u16;
        (table << 12) + ((self.bg.next_tile_id as u16) << 4) + self.vram_addr.fine_y() as u16
    }

    /// (pixel, palette) of the background at the current dot. Pixel 0 is transparent.
    pub(in crate::ppu) fn background_pixel(&self) -> (u8, u8) {
        if !self.mask.contains(Mask::RENDER_BACKGROUND) {
            return (0, 0);
        }
        if !self.mask.contains(Mask::RENDER_BACKGROUND_LEFT) && self.cycle <= 8 {
            return (0, 0);
        }
        let mux = 0x8000u16 >> self.fine_x;
        let p0 = (self.bg.pattern_lo & mux != 0) as u8;
        let p1 = (self.bg.pattern_hi & mux != 0) as u8;
        let a0 = (self.bg.attrib_lo & mux != 0) as u8;
        let a1 = (self.bg.attrib_hi & mux != 0) as u8;
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }
}
