/*!
Cartridge with iNES (v1) loader and mapper integration.

Features:
- Parse the 16-byte iNES header from bytes or a file path
- Skip the optional 512-byte trainer
- Extract PRG ROM and CHR (ROM, or 8 KiB of CHR RAM when the header declares none)
- Determine mirroring and mapper id, then build the matching [`MapperKind`]
- Expose hit/miss access for the CPU and PPU buses

Notes:
- Load failures are distinct [`CartridgeError`] values. A `Cartridge` only exists once
  its image parsed cleanly, so the bus can never attach a broken one.
- PRG RAM allocation policy:
  - If header byte 8 (PRG-RAM size in 8 KiB units) is 0, allocate 8 KiB by convention.
  - Otherwise allocate size_in_units * 8 KiB.
- CPU writes that a mapper maps into PRG ROM are claimed but do not modify ROM.
*/

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::mapper::{CpuTarget, Mapper, MapperKind};

pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_BANK_LEN: usize = 16 * 1024;
pub const CHR_BANK_LEN: usize = 8 * 1024;
const MAGIC: &[u8; 4] = b"NES\x1A";

/// Nametable arrangement a cartridge wires the PPU's 2 KiB of VRAM into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mirroring {
    #[default]
    Horizontal,
    Vertical,
    OneScreenLo,
    OneScreenHi,
}

/// Reasons an image can be refused at load time.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("invalid iNES header magic (expected NES<1A>)")]
    BadMagic,
    #[error("image truncated in {section}: need {expected} bytes, have {actual}")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported mapper id: {0}")]
    UnsupportedMapper(u8),
    #[error("failed to read iNES file: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded iNES header fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub prg_banks: u8,
    pub chr_banks: u8,
    pub mapper1: u8,
    pub mapper2: u8,
    pub prg_ram_size: u8,
    pub tv_system1: u8,
    pub tv_system2: u8,
}

impl Header {
    /// Parse the first 16 bytes of an image.
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                section: "header",
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(CartridgeError::BadMagic);
        }
        // Bytes 11..16 are unused padding.
        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            mapper1: data[6],
            mapper2: data[7],
            prg_ram_size: data[8],
            tv_system1: data[9],
            tv_system2: data[10],
        })
    }

    /// Mapper id from the high nibbles of the two flag bytes.
    pub fn mapper_id(&self) -> u8 {
        ((self.mapper2 >> 4) << 4) | (self.mapper1 >> 4)
    }

    pub fn has_trainer(&self) -> bool {
        self.mapper1 & 0b0000_0100 != 0
    }

    pub fn four_screen(&self) -> bool {
        self.mapper1 & 0b0000_1000 != 0
    }

    pub fn is_nes2(&self) -> bool {
        self.mapper2 & 0x0C == 0x08
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.mapper1 & 0b0000_0001 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

pub struct Cartridge {
    header: Header,
    mapper: MapperKind,
    mirroring: Mirroring,
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
}

// Debug implemented manually so the byte buffers are not dumped.
impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper_id", &self.mapper_id())
            .field("mirroring", &self.mirroring)
            .field("prg_rom_len", &self.prg_rom.len())
            .field("chr_len", &self.chr.len())
            .field("prg_ram_len", &self.prg_ram.len())
            .field("chr_is_ram", &self.chr_is_ram())
            .finish()
    }
}

fn take<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    data.get(offset..offset + len)
        .ok_or(CartridgeError::Truncated {
            section,
            expected: offset + len,
            actual: data.len(),
        })
}

impl Cartridge {
    // -------------- Construction --------------

    /// Load a cartridge from raw iNES bytes.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(data)?;

        let mut offset = HEADER_LEN;
        if header.has_trainer() {
            take(data, offset, TRAINER_LEN, "trainer")?;
            log::warn!("iNES trainer present; skipping {TRAINER_LEN} bytes");
            offset += TRAINER_LEN;
        }
        if header.is_nes2() {
            log::warn!("NES 2.0 header; extended fields are ignored");
        }

        let prg_len = header.prg_banks as usize * PRG_BANK_LEN;
        let prg_rom = take(data, offset, prg_len, "PRG ROM")?.to_vec();
        offset += prg_len;

        let chr = if header.chr_banks == 0 {
            vec![0; CHR_BANK_LEN]
        } else {
            let chr_len = header.chr_banks as usize * CHR_BANK_LEN;
            take(data, offset, chr_len, "CHR ROM")?.to_vec()
        };

        let prg_ram_len = match header.prg_ram_size {
            0 => 8 * 1024,
            units => units as usize * 8 * 1024,
        };

        let mapper_id = header.mapper_id();
        let mapper =
            MapperKind::from_id(mapper_id, header.prg_banks, header.chr_banks, prg_ram_len)
                .ok_or(CartridgeError::UnsupportedMapper(mapper_id))?;

        if header.four_screen() {
            log::warn!("four-screen VRAM requested; falling back to header mirroring bit");
        }
        let mirroring = header.mirroring();

        log::info!(
            "cartridge loaded: mapper {}, PRG {} KiB, CHR {} KiB{}, {:?} mirroring",
            mapper_id,
            prg_rom.len() / 1024,
            chr.len() / 1024,
            if header.chr_banks == 0 { " (RAM)" } else { "" },
            mirroring
        );

        Ok(Self {
            header,
            mapper,
            mirroring,
            prg_rom,
            prg_ram: vec![0; prg_ram_len],
            chr,
        })
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    // -------------- Bus access --------------

    /// CPU read; `None` if the cartridge does not claim `addr`.
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        match self.mapper.cpu_map_read(addr)? {
            CpuTarget::PrgRom(off) => self.prg_rom.get(off).copied(),
            CpuTarget::PrgRam(off) => self.prg_ram.get(off).copied(),
        }
    }

    /// CPU write; returns whether the cartridge claimed `addr`.
    pub fn cpu_write(&mut self, addr: u16, data: u8) -> bool {
        match self.mapper.cpu_map_write(addr, data) {
            Some(CpuTarget::PrgRam(off)) => {
                if let Some(b) = self.prg_ram.get_mut(off) {
                    *b = data;
                }
                true
            }
            Some(CpuTarget::PrgRom(_)) => true,
            None => false,
        }
    }

    /// PPU read from pattern space; `None` on a miss.
    pub fn ppu_read(&self, addr: u16) -> Option<u8> {
        let off = self.mapper.ppu_map_read(addr)?;
        self.chr.get(off).copied()
    }

    /// PPU write; returns whether the cartridge accepted it.
    pub fn ppu_write(&mut self, addr: u16, data: u8) -> bool {
        match self.mapper.ppu_map_write(addr) {
            Some(off) => match self.chr.get_mut(off) {
                Some(b) => {
                    *b = data;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    // -------------- Accessors --------------

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper.mapper_id()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn chr_is_ram(&self) -> bool {
        self.header.chr_banks == 0
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom.len()
    }

    pub fn chr_len(&self) -> usize {
        self.chr.len()
    }

    pub fn prg_ram_len(&self) -> usize {
        self.prg_ram.len()
    }
}
