/*!
PPU (2C02) providing:
- CPU-visible register interface ($2000..$2007, mirrored every 8 bytes up to $3FFF)
- The PPU's own 14-bit bus: pattern tables, mirrored nametables, palette RAM
- A dot-stepped raster loop over 341 cycles x 262 scanlines
- Background shifters with loopy scroll registers and fine X
- Per-scanline sprite evaluation (8 per line), sprite shifters, priority and sprite-zero hit
- An RGBA framebuffer plus debug views of pattern tables and palettes

STRUCTURE:
- `Ppu` holds all state. Child modules add inherent methods and read the private fields.
- `registers.rs` - `Control`/`Mask`/`Status` flags, `LoopyRegister`, CPU port reads/writes
- `memory.rs`    - PPU bus reads/writes, nametable mirroring, palette folding
- `fetch.rs`     - background fetch sequence, shifters, scroll increments/transfers
- `sprite.rs`    - OAM entries, evaluation, sprite pattern fetch, foreground pixel
- `renderer.rs`  - `clock`, pixel composition and the debug views
- `palette.rs`   - the 64-colour master palette

The cartridge is not owned here. Every entry point that touches pattern memory takes
it as an argument, so the bus can lend it for one call.
*/

pub(crate) mod fetch;
pub(crate) mod memory;
pub(crate) mod palette;
pub(crate) mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

pub use registers::{Control, LoopyRegister, Mask, Status};
pub use sprite::ObjectAttributeEntry;

use fetch::BackgroundShifters;
use sprite::SpriteLine;

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Dots per scanline.
pub const CYCLES_PER_SCANLINE: u16 = 341;
/// Last scanline before the counter wraps back to the pre-render line.
pub const LAST_SCANLINE: i16 = 260;

pub struct Ppu {
    control: Control,
    mask: Mask,
    status: Status,

    // Loopy registers, fine X and the shared $2005/$2006 write latch.
    vram_addr: LoopyRegister,
    tram_addr: LoopyRegister,
    fine_x: u8,
    address_latch: bool,
    data_buffer: u8,

    oam_addr: u8,
    oam: [u8; 256],

    tbl_name: [[u8; 1024]; 2],
    tbl_pattern: [[u8; 4096]; 2],
    tbl_palette: [u8; 32],

    scanline: i16,
    cycle: u16,
    odd_frame: bool,
    frame_complete: bool,
    nmi: bool,

    bg: BackgroundShifters,
    sprites: SpriteLine,

    frame: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ppu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ppu")
            .field("control", &self.control)
            .field("mask", &self.mask)
            .field("status", &self.status)
            .field("vram_addr", &self.vram_addr)
            .field("tram_addr", &self.tram_addr)
            .field("scanline", &self.scanline)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            control: Control::empty(),
            mask: Mask::empty(),
            status: Status::empty(),
            vram_addr: LoopyRegister::default(),
            tram_addr: LoopyRegister::default(),
            fine_x: 0,
            address_latch: false,
            data_buffer: 0,
            oam_addr: 0,
            oam: [0; 256],
            tbl_name: [[0; 1024]; 2],
            tbl_pattern: [[0; 4096]; 2],
            tbl_palette: [0; 32],
            scanline: -1,
            cycle: 0,
            odd_frame: false,
            frame_complete: false,
            nmi: false,
            bg: BackgroundShifters::default(),
            sprites: SpriteLine::default(),
            frame: vec![0; NES_WIDTH * NES_HEIGHT * BYTES_PER_PIXEL],
        }
    }

    /// Return registers and raster counters to power-on state. VRAM, palette and OAM
    /// contents survive.
    pub fn reset(&mut self) {
        self.control = Control::empty();
        self.mask = Mask::empty();
        self.status = Status::empty();
        self.vram_addr = LoopyRegister::default();
        self.tram_addr = LoopyRegister::default();
        self.fine_x = 0;
        self.address_latch = false;
        self.data_buffer = 0;
        self.oam_addr = 0;
        self.scanline = -1;
        self.cycle = 0;
        self.odd_frame = false;
        self.frame_complete = false;
        self.nmi = false;
        self.bg = BackgroundShifters::default();
        self.sprites = SpriteLine::default();
    }

    /// RGBA8 framebuffer, `NES_WIDTH * NES_HEIGHT` pixels row-major.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn vram_addr(&self) -> LoopyRegister {
        self.vram_addr
    }

    pub fn tram_addr(&self) -> LoopyRegister {
        self.tram_addr
    }

    /// Set once the raster wraps past the last scanline; cleared by `take_frame_complete`.
    pub fn frame_complete(&self) -> bool {
        self.frame_complete
    }

    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Consume a pending vblank NMI.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Raw object attribute memory.
    pub fn oam(&self) -> &[u8; 256] {
        &self.oam
    }

    /// Sprite `index` (0..64) decoded from OAM.
    pub fn oam_entry(&self, index: usize) -> ObjectAttributeEntry {
        let base = (index & 0x3F) * 4;
        ObjectAttributeEntry::from_bytes(&self.oam[base..base + 4])
    }

    /// Direct OAM store used by DMA; leaves `oam_addr` alone.
    pub fn write_oam(&mut self, index: u8, value: u8) {
        self.oam[index as usize] = value;
    }

    #[inline]
    fn rendering_enabled(&self) -> bool {
        self.mask
            .intersects(Mask::RENDER_BACKGROUND | Mask::RENDER_SPRITES)
    }

    #[cfg(test)]
    pub(crate) fn force_vblank_for_test(&mut self) {
        self.status.insert(Status::VERTICAL_BLANK);
    }
}
