#![doc = r#"
PPU sprite helpers

Responsibilities
- `ObjectAttributeEntry`: one decoded 4-byte OAM record.
- Evaluation at dot 257: pick up to 8 sprites for the next line from OAM, in OAM order,
  and raise sprite overflow when a ninth one is in range.
- Pattern fetch at dot 340: one row per selected sprite into 8-bit shifters, for 8x8
  and 8x16 sprites, with horizontal and vertical flip.
- The foreground pixel for the current dot, and whether it came from sprite 0.

Integration
- Implemented as inherent methods on `Ppu`; the per-line state lives in `SpriteLine`.
"#]

use super::{Control, Mask, Ppu, Status};
use crate::cartridge::Cartridge;

/// Sprites the hardware can show on one scanline.
pub const MAX_SPRITES_PER_LINE: usize = 8;

/// Attribute byte bits.
pub const ATTR_PALETTE: u8 = 0x03;
pub const ATTR_BEHIND_BACKGROUND: u8 = 0x20;
pub const ATTR_FLIP_H: u8 = 0x40;
pub const ATTR_FLIP_V: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectAttributeEntry {
    pub y: u8,
    pub id: u8,
    pub attribute: u8,
    pub x: u8,
}

impl ObjectAttributeEntry {
    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            y: b[0],
            id: b[1],
            attribute: b[2],
            x: b[3],
        }
    }

    #[inline]
    pub fn palette(&self) -> u8 {
        (self.attribute & ATTR_PALETTE) + 4
    }

    #[inline]
    pub fn in_front(&self) -> bool {
        self.attribute & ATTR_BEHIND_BACKGROUND == 0
    }
}

/// Sprites selected for the line being drawn.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpriteLine {
    pub(crate) entries: [ObjectAttributeEntry; MAX_SPRITES_PER_LINE],
    pub(crate) count: usize,
    pub(crate) shifter_lo: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) shifter_hi: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) zero_hit_possible: bool,
}

impl SpriteLine {
    /// Count down X until a sprite is reached, then shift its pattern out.
    pub(crate) fn shift(&mut self) {
        for i in 0..self.count {
            let e = &mut self.entries[i];
            if e.x > 0 {
                e.x -= 1;
            } else {
                self.shifter_lo[i] <<= 1;
                self.shifter_hi[i] <<= 1;
            }
        }
    }
}

impl Ppu {
    #[inline]
    fn sprite_height(&self) -> i16 {
        if self.control.contains(Control::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }

    /// Select the sprites whose rows cover `scanline - y`.
    pub(in crate::ppu) fn evaluate_sprites(&mut self) {
        let height = self.sprite_height();
        let mut line = SpriteLine::default();

        for index in 0..64 {
            let entry = self.oam_entry(index);
            let diff = self.scanline - entry.y as i16;
            if !(0..height).contains(&diff) {
                continue;
            }
            if line.count == MAX_SPRITES_PER_LINE {
                self.status.insert(Status::SPRITE_OVERFLOW);
                break;
            }
            if index == 0 {
                line.zero_hit_possible = true;
            }
            line.entries[line.count] = entry;
            line.count += 1;
        }

        self.sprites = line;
    }

    /// Load one pattern row for each selected sprite.
    pub(in crate::ppu) fn fetch_sprite_patterns(&mut self, cart: Option<&Cartridge>) {
        let tall = self.control.contains(Control::SPRITE_SIZE);
        for i in 0..self.sprites.count {
            let e = self.sprites.entries[i];
            let row = (self.scanline - e.y as i16) as u16;
            let flip_v = e.attribute & ATTR_FLIP_V != 0;

            let addr = if !tall {
                let table = self.control.contains(Control::PATTERN_SPRITE) as u16;
                let r = if flip_v { 7 - row } else { row };
                (table << 12) | ((e.id as u16) << 4) | r
            } else {
                let table = (e.id & 0x01) as u16;
                let top = (e.id & 0xFE) as u16;
                // Flipping swaps the two tiles as well as the rows within them.
                let (tile, r) = match (row < 8, flip_v) {
                    (true, false) => (top, row),
                    (false, false) => (top + 1, row - 8),
                    (true, true) => (top + 1, 7 - row),
                    (false, true) => (top, 7 - (row - 8)),
                };
                (table << 12) | (tile << 4) | r
            };

            let mut lo = self.ppu_read(addr, cart);
            let mut hi = self.ppu_read(addr + 8, cart);
            if e.attribute & ATTR_FLIP_H != 0 {
                lo = lo.reverse_bits();
                hi = hi.reverse_bits();
            }
            self.sprites.shifter_lo[i] = lo;
            self.sprites.shifter_hi[i] = hi;
        }
    }

    /// (pixel, palette, in_front, is_sprite_zero) of the frontmost opaque sprite.
    pub(in crate::ppu) fn foreground_pixel(&self) -> (u8, u8, bool, bool) {
        if !self.mask.contains(Mask::RENDER_SPRITES) {
            return (0, 0, false, false);
        }
        if !self.mask.contains(Mask::RENDER_SPRITES_LEFT) && self.cycle <= 8 {
            return (0, 0, false, false);
        }
        let line = &self.sprites;
        for i in 0..line.count {
            let e = &line.entries[i];
            if e.x != 0 {
                continue;
            }
            let p0 = (line.shifter_lo[i] & 0x80 != 0) as u8;
            let p1 = (line.shifter_hi[i] & 0x80 != 0) as u8;
            let pixel = (p1 << 1) | p0;
            if pixel != 0 {
                return (pixel, e.palette(), e.in_front(), i == 0 && line.zero_hit_possible);
            }
        }
        (0, 0, false, false)
    }
}
