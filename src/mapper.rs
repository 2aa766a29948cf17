/*!
Mapper subsystem: address-translation trait, NROM (mapper 0) and the closed set of mapper kinds.

Purpose:
- Decouple cartridge storage from the banking logic that decides which byte of PRG/CHR
  a CPU or PPU address selects.
- Keep the translation contract stable so new mapper variants are additive: a variant
  implements [`Mapper`] and gets a [`MapperKind`] arm plus a line in [`MapperKind::from_id`].

Contract:
- Translation methods take full, unmasked CPU or PPU addresses.
- `None` means "not mine": the caller falls through to its own handlers.
- `Some(target)` claims the access; the cartridge then performs the buffer access.
- Mappers never own PRG/CHR bytes. They only see bank counts.
*/

/// Where a CPU access claimed by a mapper lands inside the cartridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CpuTarget {
    /// Offset into PRG ROM.
    PrgRom(usize),
    /// Offset into cartridge work RAM ($6000..=$7FFF on boards that have it).
    PrgRam(usize),
}

/// Common interface all cartridge mappers implement.
pub trait Mapper {
    /// Mapper numeric identifier as stored in the iNES header (0 for NROM).
    fn mapper_id(&self) -> u8;

    /// Translate a CPU read.
    fn cpu_map_read(&self, addr: u16) -> Option<CpuTarget>;

    /// Translate a CPU write. Bank-switching mappers latch registers from `data` here.
    fn cpu_map_write(&mut self, addr: u16, data: u8) -> Option<CpuTarget>;

    /// Translate a PPU read in pattern space into a CHR offset.
    fn ppu_map_read(&self, addr: u16) -> Option<usize>;

    /// Translate a PPU write. Only succeeds when CHR is writable.
    fn ppu_map_write(&mut self, addr: u16) -> Option<usize>;

    /// Reset/power-on mapper state (bank registers etc).
    fn reset(&mut self) {}
}

/// NROM (mapper 0).
///
/// - PRG: 16 KiB (NROM-128) mirrored across $8000..=$FFFF, or 32 KiB (NROM-256) mapped directly.
/// - PRG RAM: optional work RAM at $6000..=$7FFF.
/// - CHR: 8 KiB at PPU $0000..=$1FFF; writable only when the header declared no CHR banks.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_banks: u8,
    chr_banks: u8,
    prg_ram_len: usize,
}

impl Nrom {
    pub fn new(prg_banks: u8, chr_banks: u8, prg_ram_len: usize) -> Self {
        Self {
            prg_banks,
            chr_banks,
            prg_ram_len,
        }
    }

    #[inline]
    fn prg_mask(&self) -> u16 {
        if self.prg_banks > 1 { 0x7FFF } else { 0x3FFF }
    }

    #[inline]
    fn prg_ram_offset(&self, addr: u16) -> Option<CpuTarget> {
        if self.prg_ram_len == 0 {
            return None;
        }
        Some(CpuTarget::PrgRam((addr as usize - 0x6000) % self.prg_ram_len))
    }

    /// Returns true if CHR is RAM (writable).
    pub fn chr_is_ram(&self) -> bool {
        self.chr_banks == 0
    }
}

impl Mapper for Nrom {
    #[inline]
    fn mapper_id(&self) -> u8 {
        0
    }

    fn cpu_map_read(&self, addr: u16) -> Option<CpuTarget> {
        match addr {
            0x6000..=0x7FFF => self.prg_ram_offset(addr),
            0x8000..=0xFFFF => Some(CpuTarget::PrgRom((addr & self.prg_mask()) as usize)),
            _ => None,
        }
    }

    fn cpu_map_write(&mut self, addr: u16, _data: u8) -> Option<CpuTarget> {
        // No registers on NROM: writes into ROM space are claimed and dropped by the cartridge.
        self.cpu_map_read(addr)
    }

    fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        match addr {
            0x0000..=0x1FFF => Some(addr as usize),
            _ => None,
        }
    }

    fn ppu_map_write(&mut self, addr: u16) -> Option<usize> {
        match addr {
            0x0000..=0x1FFF if self.chr_is_ram() => Some(addr as usize),
            _ => None,
        }
    }
}

/// Closed set of supported mappers, selected once from the header id.
/// New mappers are added as variants.
#[derive(Clone, Debug)]
pub enum MapperKind {
    Nrom(Nrom),
}

impl MapperKind {
    /// Build the mapper for `id`, or `None` if the id is not supported.
    pub fn from_id(id: u8, prg_banks: u8, chr_banks: u8, prg_ram_len: usize) -> Option<Self> {
        match id {
            0 => Some(MapperKind::Nrom(Nrom::new(prg_banks, chr_banks, prg_ram_len))),
            _ => None,
        }
    }
}

impl Mapper for MapperKind {
    fn mapper_id(&self) -> u8 {
        match self {
            MapperKind::Nrom(m) => m.mapper_id(),
        }
    }

    #[inline]
    fn cpu_map_read(&self, addr: u16) -> Option<CpuTarget> {
        match self {
            MapperKind::Nrom(m) => m.cpu_map_read(addr),
        }
    }

    #[inline]
    fn cpu_map_write(&mut self, addr: u16, data: u8) -> Option<CpuTarget> {
        match self {
            MapperKind::Nrom(m) => m.cpu_map_write(addr, data),
        }
    }

    #[inline]
    fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        match self {
            MapperKind::Nrom(m) => m.ppu_map_read(addr),
        }
    }

    #[inline]
    fn ppu_map_write(&mut self, addr: u16) -> Option<usize> {
        match self {
            MapperKind::Nrom(m) => m.ppu_map_write(addr),
        }
    }

    fn reset(&mut self) {
        match self {
            MapperKind::Nrom(m) => m.reset(),
        }
    }
}
