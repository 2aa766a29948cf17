#![doc = r#"
PPU memory submodule

Responsibilities
- The PPU's own 14-bit bus as inherent methods on `Ppu`: `ppu_read` / `ppu_write`.
- Nametable mirroring and palette folding.

Address map
- $0000-$1FFF: cartridge CHR first; on a miss the two internal 4 KiB pattern tables.
- $2000-$3EFF: 2 KiB of nametable RAM, mirrored per the cartridge's `Mirroring`.
- $3F00-$3FFF: 32 bytes of palette RAM. $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C.
  Reads are masked to the grey column when PPUMASK grayscale is set.

With no cartridge inserted nametables use horizontal mirroring.
"#]

use super::{Mask, Ppu};
use crate::cartridge::{Cartridge, Mirroring};

/// Physical (bank, offset) of a nametable address.
#[inline]
pub(crate) fn nametable_slot(addr: u16, mirroring: Mirroring) -> (usize, usize) {
    let a = addr & 0x0FFF;
    let bank = match mirroring {
        Mirroring::Vertical => (a >> 10) & 1,
        Mirroring::Horizontal => (a >> 11) & 1,
        Mirroring::OneScreenLo => 0,
        Mirroring::OneScreenHi => 1,
    };
    (bank as usize, (a & 0x03FF) as usize)
}

/// Index into palette RAM with the background-colour aliases folded.
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let i = addr & 0x001F;
    if i & 0x13 == 0x10 {
        (i & !0x10) as usize
    } else {
        i as usize
    }
}

impl Ppu {
    pub fn ppu_read(&self, addr: u16, cart: Option<&Cartridge>) -> u8 {
        let addr = addr & 0x3FFF;
        if let Some(data) = cart.and_then(|c| c.ppu_read(addr)) {
            return data;
        }
        match addr {
            0x0000..=0x1FFF => {
                self.tbl_pattern[((addr & 0x1000) >> 12) as usize][(addr & 0x0FFF) as usize]
            }
            0x2000..=0x3EFF => {
                let mirroring = cart.map(Cartridge::mirroring).unwrap_or_default();
                let (bank, off) = nametable_slot(addr, mirroring);
                self.tbl_name[bank][off]
            }
            _ => self.palette_read(addr),
        }
    }

    pub fn ppu_write(&mut self, addr: u16, data: u8, cart: Option<&mut Cartridge>) {
        let addr = addr & 0x3FFF;
        let mirroring = cart
            .as_deref()
            .map(Cartridge::mirroring)
            .unwrap_or_default();
        if let Some(c) = cart {
            if c.ppu_write(addr, data) {
                return;
            }
        }
        match addr {
            0x0000..=0x1FFF => {
                self.tbl_pattern[((addr & 0x1000) >> 12) as usize][(addr & 0x0FFF) as usize] =
                    data;
            }
            0x2000..=0x3EFF => {
                let (bank, off) = nametable_slot(addr, mirroring);
                self.tbl_name[bank][off] = data;
            }
            _ => self.tbl_palette[palette_index(addr)] = data,
        }
    }

    #[inline]
    pub(in crate::ppu) fn palette_read(&self, addr: u16) -> u8 {
        let v = self.tbl_palette[palette_index(addr)];
        if self.mask.contains(Mask::GRAYSCALE) {
            v & 0x30
        } else {
            v
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_ines;

    fn cart(flags6: u8) -> Cartridge {
        Cartridge::from_ines_bytes(&build_ines(1, 1, flags6, 0, 0, None)).expect("cart")
    }

    #[test]
    fn horizontal_mirroring_shares_top_pair() {
        let mut c = cart(0x00);
        assert_eq!(c.mirroring(), Mirroring::Horizontal);
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x2000, 0x5A, Some(&mut c));
        assert_eq!(ppu.ppu_read(0x2400, Some(&c)), 0x5A);
        assert_eq!(ppu.ppu_read(0x2800, Some(&c)), 0x00);
        ppu.ppu_write(0x2C05, 0x77, Some(&mut c));
        assert_eq!(ppu.ppu_read(0x2805, Some(&c)), 0x77);
        assert_eq!(ppu.tbl_name[1][5], 0x77);
    }

    #[test]
    fn vertical_mirroring_shares_columns() {
        let mut c = cart(0x01);
        assert_eq!(c.mirroring(), Mirroring::Vertical);
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x2000, 0xA5, Some(&mut c));
        assert_eq!(ppu.ppu_read(0x2800, Some(&c)), 0xA5);
        assert_eq!(ppu.ppu_read(0x2400, Some(&c)), 0x00);
        ppu.ppu_write(0x2410, 0x33, Some(&mut c));
        assert_eq!(ppu.ppu_read(0x2C10, Some(&c)), 0x33);
    }

    #[test]
    fn nametables_mirror_into_3000_range() {
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x2123, 0x42, None);
        assert_eq!(ppu.ppu_read(0x3123, None), 0x42);
    }

    #[test]
    fn one_screen_modes_use_a_single_bank() {
        for addr in [0x2000u16, 0x2400, 0x2800, 0x2C00] {
            assert_eq!(nametable_slot(addr, Mirroring::OneScreenLo), (0, 0));
            assert_eq!(nametable_slot(addr, Mirroring::OneScreenHi), (1, 0));
        }
    }

    #[test]
    fn palette_background_aliases_fold() {
        let mut ppu = Ppu::new();
        for (alias, base) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            ppu.ppu_write(alias, 0x15, None);
            assert_eq!(ppu.ppu_read(base, None), 0x15);
        }
        // Sprite palette entries other than the aliases are distinct.
        ppu.ppu_write(0x3F11, 0x01, None);
        assert_eq!(ppu.ppu_read(0x3F01, None), 0x00);
        // $3F20-$3FFF mirror the 32 bytes.
        assert_eq!(ppu.ppu_read(0x3F31, None), 0x01);
    }

    #[test]
    fn grayscale_masks_palette_reads() {
        let mut ppu = Ppu::new();
        ppu.ppu_write(0x3F00, 0x2D, None);
        ppu.mask = Mask::GRAYSCALE;
        assert_eq!(ppu.ppu_read(0x3F00, None), 0x20);
        ppu.mask = Mask::empty();
        assert_eq!(ppu.ppu_read(0x3F00, None), 0x2D);
    }

    #[test]
    fn cartridge_chr_takes_pattern_reads() {
        let c = cart(0x00);
        let ppu = Ppu::new();
        assert_eq!(ppu.ppu_read(0x0123, Some(&c)), 0xCC);
        assert_eq!(ppu.ppu_read(0x0123, None), 0x00);
    }
}
