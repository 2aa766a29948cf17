/*!
DmaController: OAM DMA state machine.

Behavioral model
- A CPU write to $4014 latches the source page and arms the transfer; from then on the
  bus hands every CPU clock slot to DMA instead of the CPU.
- The transfer opens with a dummy alignment phase that lasts until the first odd clock
  slot (one or two slots depending on where the write landed).
- After alignment, even slots read one byte from `page << 8 | index` over the CPU bus and
  odd slots write the latched byte into OAM at `index`, then advance `index`.
- When `index` wraps back to 0 the transfer ends and the CPU resumes on the next slot.
- Total cost: 513 or 514 CPU slots.
*/

use crate::bus::interfaces::{CpuBus, OamWriter};

#[derive(Debug, Default)]
pub struct DmaController {
    active: bool,
    // Still waiting for an odd slot.
    dummy: bool,
    page: u8,
    index: u8,
    latch: u8,
}

impl DmaController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to idle state with no active DMA.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Arm a transfer from `page << 8`.
    pub fn start(&mut self, page: u8) {
        log::debug!("OAM DMA from ${:02X}00", page);
        self.active = true;
        self.dummy = true;
        self.page = page;
        self.index = 0;
        self.latch = 0;
    }

    /// Returns true if a DMA transfer is currently in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Perform the micro-step for one CPU clock slot. `slot` is the running clock count
    /// whose parity selects alignment, read or write.
    pub fn step_one_cycle<M>(&mut self, slot: u64, mem: &mut M)
    where
        M: CpuBus + OamWriter,
    {
        if !self.active {
            return;
        }

        if self.dummy {
            if slot % 2 == 1 {
                self.dummy = false;
            }
            return;
        }

        if slot % 2 == 0 {
            let addr = (self.page as u16) << 8 | self.index as u16;
            self.latch = mem.cpu_read(addr, false);
        } else {
            mem.write_oam(self.index, self.latch);
            self.index = self.index.wrapping_add(1);
            if self.index == 0 {
                self.active = false;
                self.dummy = true;
            }
        }
    }
}
