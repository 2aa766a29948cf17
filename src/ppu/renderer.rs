#![doc = r#"
PPU renderer module

Responsibilities
- `Ppu::clock`: advance one dot of the 341 x 262 raster and run whatever the
  (scanline, cycle) position calls for.
- Pixel composition of background and sprite layers, including sprite-zero hit.
- Debug views: palette colours, whole pattern tables and nametables as RGBA images.

Timing (scanline -1 is the pre-render line)
- -1..=239, cycles 2..=257 and 321..=337: shift, then one step of the background fetch.
- cycle 256: fine/coarse Y increment. cycle 257: reload shifters, copy X from tram,
  evaluate sprites. cycles 338 and 340: dummy nametable reads. cycle 340: sprite patterns.
- pre-render cycle 1: clear vblank, sprite-zero hit and overflow.
- pre-render cycles 280..=304: copy Y from tram.
- 241 cycle 1: set vblank and raise NMI when enabled.
- Odd frames drop dot 0 of scanline 0 while background rendering is on.
"#]

use super::palette;
use super::{Control, Mask, NES_HEIGHT, NES_WIDTH, Ppu, Status};
use super::{CYCLES_PER_SCANLINE, LAST_SCANLINE};
use crate::cartridge::Cartridge;

impl Ppu {
    /// Advance one PPU dot.
    pub fn clock(&mut self, cart: Option<&Cartridge>) {
        if self.scanline >= -1 && self.scanline < 240 {
            if self.scanline == 0
                && self.cycle == 0
                && self.odd_frame
                && self.mask.contains(Mask::RENDER_BACKGROUND)
            {
                self.cycle = 1;
            }

            if self.scanline == -1 && self.cycle == 1 {
                self.status.remove(
                    Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
                );
                self.sprites.shifter_lo = [0; 8];
                self.sprites.shifter_hi = [0; 8];
            }

            if (2..258).contains(&self.cycle) || (321..338).contains(&self.cycle) {
                self.update_shifters();
                self.fetch_background(cart);
            }

            if self.cycle == 256 {
                self.increment_scroll_y();
            }

            if self.cycle == 257 {
                self.load_background_shifters();
                self.transfer_address_x();
                self.evaluate_sprites();
            }

            if self.cycle == 338 || self.cycle == 340 {
                self.bg.next_tile_id = self.ppu_read(0x2000 | (self.vram_addr.0 & 0x0FFF), cart);
            }

            if self.scanline == -1 && (280..305).contains(&self.cycle) {
                self.transfer_address_y();
            }

            if self.cycle == 340 {
                self.fetch_sprite_patterns(cart);
            }
        }

        if self.scanline == 241 && self.cycle == 1 {
            self.status.insert(Status::VERTICAL_BLANK);
            if self.control.contains(Control::ENABLE_NMI) {
                self.nmi = true;
            }
        }

        self.compose_pixel();

        self.cycle += 1;
        if self.cycle >= CYCLES_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = -1;
                self.frame_complete = true;
                self.odd_frame = !self.odd_frame;
            }
        }
    }

    /// Resolve the visible dot from both layers and store it in the framebuffer.
    fn compose_pixel(&mut self) {
        let x = self.cycle as usize;
        if x == 0 || x > NES_WIDTH || !(0..NES_HEIGHT as i16).contains(&self.scanline) {
            return;
        }
        let x = x - 1;
        let y = self.scanline as usize;

        let (bg_pixel, bg_palette) = self.background_pixel();
        let (fg_pixel, fg_palette, fg_in_front, fg_is_zero) = self.foreground_pixel();

        let (pixel, palette) = match (bg_pixel, fg_pixel) {
            (0, 0) => (0, 0),
            (0, _) => (fg_pixel, fg_palette),
            (_, 0) => (bg_pixel, bg_palette),
            _ => {
                // Both opaque. The left-column masks already blanked x < 8 when set,
                // and hardware never reports a hit on the last column.
                if fg_is_zero && x < NES_WIDTH - 1 {
                    self.status.insert(Status::SPRITE_ZERO_HIT);
                }
                if fg_in_front {
                    (fg_pixel, fg_palette)
                } else {
                    (bg_pixel, bg_palette)
                }
            }
        };

        let [r, g, b] = self.colour_from_palette_ram(palette, pixel);
        let i = (y * NES_WIDTH + x) * 4;
        self.frame[i..i + 4].copy_from_slice(&[r, g, b, 0xFF]);
    }

    /// RGB of `pixel` (0..=3) in `palette` (0..=7, 4..=7 are sprite palettes).
    pub fn colour_from_palette_ram(&self, palette: u8, pixel: u8) -> [u8; 3] {
        let addr = 0x3F00 + ((palette as u16 & 0x07) << 2) + (pixel as u16 & 0x03);
        palette::rgb(self.palette_read(addr))
    }

    /// Pattern table `index` (0 or 1) as a 128x128 RGBA image coloured with `palette`.
    pub fn pattern_table(&self, index: u8, palette: u8, cart: Option<&Cartridge>) -> Vec<u8> {
        const SIDE: usize = 128;
        let mut out = vec![0u8; SIDE * SIDE * 4];
        let base = (index as u16 & 1) * 0x1000;

        for tile_y in 0..16u16 {
            for tile_x in 0..16u16 {
                let offset = tile_y * 256 + tile_x * 16;
                for row in 0..8u16 {
                    let mut lo = self.ppu_read(base + offset + row, cart);
                    let mut hi = self.ppu_read(base + offset + row + 8, cart);
                    for col in 0..8u16 {
                        let pixel = ((hi & 0x01) << 1) | (lo & 0x01);
                        lo >>= 1;
                        hi >>= 1;
                        let px = (tile_x * 8 + (7 - col)) as usize;
                        let py = (tile_y * 8 + row) as usize;
                        let [r, g, b] = self.colour_from_palette_ram(palette, pixel);
                        let i = (py * SIDE + px) * 4;
                        out[i..i + 4].copy_from_slice(&[r, g, b, 0xFF]);
                    }
                }
            }
        }
        out
    }

    /// Physical nametable `index` (0 or 1) as a 256x240 RGBA image, drawn with the
    /// background pattern table and the nametable's own attribute bytes.
    pub fn nametable(&self, index: u8, cart: Option<&Cartridge>) -> Vec<u8> {
        let table = &self.tbl_name[(index & 1) as usize];
        let base = (self.control.contains(Control::PATTERN_BACKGROUND) as u16) << 12;
        let mut out = vec![0u8; NES_WIDTH * NES_HEIGHT * 4];

        for tile_y in 0..30usize {
            for tile_x in 0..32usize {
                let tile = table[tile_y * 32 + tile_x] as u16;
                let mut attrib = table[0x3C0 + (tile_y / 4) * 8 + tile_x / 4];
                if tile_y & 0x02 != 0 {
                    attrib >>= 4;
                }
                if tile_x & 0x02 != 0 {
                    attrib >>= 2;
                }
                let palette = attrib & 0x03;

                for row in 0..8usize {
                    let addr = base + (tile << 4) + row as u16;
                    let lo = self.ppu_read(addr, cart);
                    let hi = self.ppu_read(addr + 8, cart);
                    for col in 0..8usize {
                        let bit = 7 - col;
                        let pixel = (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01);
                        let [r, g, b] = self.colour_from_palette_ram(palette, pixel);
                        let i = ((tile_y * 8 + row) * NES_WIDTH + tile_x * 8 + col) * 4;
                        out[i..i + 4].copy_from_slice(&[r, g, b, 0xFF]);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::palette::SYSTEM_PALETTE;

    const DOTS_PER_FRAME: usize = 341 * 262;

    #[test]
    fn one_frame_of_clocks_completes_once_and_wraps_counters() {
        let mut ppu = Ppu::new();
        ppu.reset();
        let mut completions = 0;
        for _ in 0..DOTS_PER_FRAME {
            ppu.clock(None);
            if ppu.take_frame_complete() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!((ppu.scanline(), ppu.cycle()), (-1, 0));
    }

    #[test]
    fn vblank_and_nmi_at_241_1() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(0, Control::ENABLE_NMI.bits(), None);
        while !(ppu.scanline == 241 && ppu.cycle == 1) {
            ppu.clock(None);
            assert!(!ppu.take_nmi(), "early NMI at {},{}", ppu.scanline, ppu.cycle);
        }
        ppu.clock(None);
        assert!(ppu.status.contains(Status::VERTICAL_BLANK));
        assert!(ppu.take_nmi());
        assert!(!ppu.take_nmi());
    }

    #[test]
    fn no_nmi_when_disabled_but_vblank_still_sets() {
        let mut ppu = Ppu::new();
        for _ in 0..(242 * 341 + 2) {
            ppu.clock(None);
        }
        assert!(ppu.status.contains(Status::VERTICAL_BLANK));
        assert!(!ppu.take_nmi());
    }

    #[test]
    fn pre_render_line_clears_flags() {
        let mut ppu = Ppu::new();
        ppu.status = Status::all();
        ppu.clock(None);
        ppu.clock(None);
        assert_eq!(ppu.status, Status::empty());
    }

    #[test]
    fn odd_frames_skip_a_dot_only_when_rendering() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::RENDER_BACKGROUND;
        for _ in 0..DOTS_PER_FRAME {
            ppu.clock(None);
        }
        // Second frame is odd: it is one dot shorter.
        for _ in 0..DOTS_PER_FRAME - 1 {
            ppu.clock(None);
        }
        assert_eq!((ppu.scanline(), ppu.cycle()), (-1, 0));

        let mut idle = Ppu::new();
        for _ in 0..2 * DOTS_PER_FRAME {
            idle.clock(None);
        }
        assert_eq!((idle.scanline(), idle.cycle()), (-1, 0));
    }

    fn solid_scene(bg_tile: u8) -> Ppu {
        let mut ppu = Ppu::new();
        // Tile 1: every pixel colour 1. Tile 0 stays transparent.
        for row in 0..8 {
            ppu.ppu_write(0x0010 + row, 0xFF, None);
        }
        for addr in 0x2000..0x23C0 {
            ppu.ppu_write(addr, bg_tile, None);
        }
        ppu.ppu_write(0x3F00, 0x0F, None);
        ppu.ppu_write(0x3F01, 0x16, None);
        ppu.ppu_write(0x3F11, 0x2A, None);
        ppu.oam.fill(0xFF);
        ppu.oam[..4].copy_from_slice(&[40, 1, 0, 64]);
        ppu.mask = Mask::RENDER_BACKGROUND
            | Mask::RENDER_SPRITES
            | Mask::RENDER_BACKGROUND_LEFT
            | Mask::RENDER_SPRITES_LEFT;
        ppu
    }

    fn pixel(ppu: &Ppu, x: usize, y: usize) -> [u8; 3] {
        let i = (y * NES_WIDTH + x) * 4;
        [ppu.frame[i], ppu.frame[i + 1], ppu.frame[i + 2]]
    }

    #[test]
    fn sprite_zero_hit_over_opaque_background() {
        let mut ppu = solid_scene(1);
        for _ in 0..DOTS_PER_FRAME {
            ppu.clock(None);
        }
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
        // Sprite in front of the background.
        assert_eq!(pixel(&ppu, 66, 45), SYSTEM_PALETTE[0x2A]);
        assert_eq!(pixel(&ppu, 10, 10), SYSTEM_PALETTE[0x16]);
    }

    #[test]
    fn no_sprite_zero_hit_over_transparent_background() {
        let mut ppu = solid_scene(0);
        for _ in 0..DOTS_PER_FRAME {
            ppu.clock(None);
        }
        assert!(!ppu.status.contains(Status::SPRITE_ZERO_HIT));
        assert_eq!(pixel(&ppu, 10, 10), SYSTEM_PALETTE[0x0F]);
        assert_eq!(pixel(&ppu, 66, 45), SYSTEM_PALETTE[0x2A]);
    }

    #[test]
    fn behind_background_priority() {
        let mut ppu = solid_scene(1);
        ppu.oam[2] = ATTR_BEHIND;
        for _ in 0..DOTS_PER_FRAME {
            ppu.clock(None);
        }
        assert_eq!(pixel(&ppu, 66, 45), SYSTEM_PALETTE[0x16]);
        // Priority does not affect the hit.
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
    }

    const ATTR_BEHIND: u8 = crate::ppu::sprite::ATTR_BEHIND_BACKGROUND;

    fn scrolled_scene(fine_x: u8, fine_y: u8) -> Ppu {
        let mut ppu = Ppu::new();
        for row in 0..8 {
            ppu.ppu_write(0x0010 + row, 0xFF, None);
        }
        ppu.ppu_write(0x3F00, 0x0F, None);
        ppu.ppu_write(0x3F01, 0x16, None);
        // Solid tiles at (column 1, row 0) and (column 4, row 2).
        ppu.ppu_write(0x2001, 1, None);
        ppu.ppu_write(0x2044, 1, None);
        ppu.oam.fill(0xFF);
        ppu.mask = Mask::RENDER_BACKGROUND | Mask::RENDER_BACKGROUND_LEFT;
        ppu.cpu_write(0x2005, fine_x, None);
        ppu.cpu_write(0x2005, fine_y, None);
        for _ in 0..2 * DOTS_PER_FRAME {
            ppu.clock(None);
        }
        ppu
    }

    #[test]
    fn unscrolled_tiles_land_on_their_grid() {
        let ppu = scrolled_scene(0, 0);
        let solid = SYSTEM_PALETTE[0x16];
        let backdrop = SYSTEM_PALETTE[0x0F];
        assert_eq!(pixel(&ppu, 7, 0), backdrop);
        assert_eq!(pixel(&ppu, 8, 0), solid);
        assert_eq!(pixel(&ppu, 15, 7), solid);
        assert_eq!(pixel(&ppu, 16, 0), backdrop);
        assert_eq!(pixel(&ppu, 32, 16), solid);
        assert_eq!(pixel(&ppu, 32, 15), backdrop);
    }

    #[test]
    fn fine_scroll_shifts_tiles_left_and_up() {
        let ppu = scrolled_scene(3, 2);
        let solid = SYSTEM_PALETTE[0x16];
        let backdrop = SYSTEM_PALETTE[0x0F];

        // Column 1 row 0 now covers x 5..=12 and y 0..=5.
        assert_eq!(pixel(&ppu, 4, 0), backdrop);
        assert_eq!(pixel(&ppu, 5, 0), solid);
        assert_eq!(pixel(&ppu, 12, 0), solid);
        assert_eq!(pixel(&ppu, 13, 0), backdrop);
        assert_eq!(pixel(&ppu, 5, 5), solid);
        assert_eq!(pixel(&ppu, 5, 6), backdrop);

        // Column 4 row 2 now covers x 29..=36 and y 14..=21; y comes from the
        // pre-render vertical transfer.
        assert_eq!(pixel(&ppu, 29, 13), backdrop);
        assert_eq!(pixel(&ppu, 29, 14), solid);
        assert_eq!(pixel(&ppu, 36, 21), solid);
        assert_eq!(pixel(&ppu, 36, 22), backdrop);
        assert_eq!(pixel(&ppu, 28, 14), backdrop);
        assert_eq!(pixel(&ppu, 37, 21), backdrop);
    }

    #[test]
    fn palette_colour_lookup() {
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x3F00 + 4 * 2 + 3, 0x21, None);
        assert_eq!(ppu.colour_from_palette_ram(2, 3), SYSTEM_PALETTE[0x21]);
    }

    #[test]
    fn pattern_table_view_places_tiles() {
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x3F01, 0x30, None);
        // Tile 17 (row 1, column 1), top row: leftmost pixel set.
        ppu.ppu_write(17 * 16, 0b1000_0000, None);
        let img = ppu.pattern_table(0, 0, None);
        assert_eq!(img.len(), 128 * 128 * 4);
        let at = |x: usize, y: usize| {
            let i = (y * 128 + x) * 4;
            [img[i], img[i + 1], img[i + 2]]
        };
        assert_eq!(at(8, 8), SYSTEM_PALETTE[0x30]);
        assert_eq!(at(9, 8), SYSTEM_PALETTE[0x00]);
    }

    #[test]
    fn nametable_view_uses_tiles_and_attributes() {
        let mut ppu = Ppu::new();
        for row in 0..8 {
            ppu.ppu_write(0x0010 + row, 0xFF, None);
        }
        ppu.ppu_write(0x3F01, 0x16, None);
        ppu.ppu_write(0x3F05, 0x2A, None);
        ppu.ppu_write(0x2000, 1, None);
        ppu.ppu_write(0x2002, 1, None);
        // Top-right quadrant of the first attribute block selects palette 1.
        ppu.ppu_write(0x23C0, 0b00_00_01_00, None);

        let img = ppu.nametable(0, None);
        assert_eq!(img.len(), NES_WIDTH * NES_HEIGHT * 4);
        let at = |x: usize, y: usize| {
            let i = (y * NES_WIDTH + x) * 4;
            [img[i], img[i + 1], img[i + 2]]
        };
        assert_eq!(at(0, 0), SYSTEM_PALETTE[0x16]);
        assert_eq!(at(7, 7), SYSTEM_PALETTE[0x16]);
        assert_eq!(at(8, 0), SYSTEM_PALETTE[0x00]);
        assert_eq!(at(16, 3), SYSTEM_PALETTE[0x2A]);
    }
}
