/*!
Master clock for the Bus.

One `clock()` call is one PPU dot:
- The PPU advances on every tick.
- Every third tick is a CPU slot. The slot goes to the CPU, or to the DMA engine while
  an OAM transfer is running (the CPU is suspended for the whole transfer).
- After both devices have run, a pending PPU NMI is consumed and delivered to the CPU.

The step helpers compose `clock()` into the units a debugger wants.
*/

use crate::bus::Bus;
use crate::bus::interfaces::CpuBusView;

impl Bus {
    /// Advance the system by one master clock tick.
    pub fn clock(&mut self) {
        self.ppu.clock(self.cartridge.as_ref());

        if self.system_clock % 3 == 0 {
            if self.dma.is_active() {
                let slot = self.system_clock;
                let mut dma = std::mem::take(&mut self.dma);
                {
                    let mut view = CpuBusView::from_parts(
                        &mut self.ram,
                        &mut self.ppu,
                        self.cartridge.as_mut(),
                        &mut self.controllers,
                        &mut self.dma,
                    );
                    dma.step_one_cycle(slot, &mut view);
                }
                self.dma = dma;
            } else {
                let (cpu, mut view) = self.split();
                cpu.clock(&mut view);
            }
        }

        if self.ppu.take_nmi() {
            let (cpu, mut view) = self.split();
            cpu.nmi(&mut view);
        }

        self.system_clock = self.system_clock.wrapping_add(1);
    }

    /// Run until the current instruction retires and the next one has executed.
    pub fn step_instruction(&mut self) {
        loop {
            self.clock();
            if self.cpu.complete() {
                break;
            }
        }
        // Drain the idle PPU ticks until the CPU picks up its next opcode.
        while self.cpu.complete() {
            self.clock();
        }
    }

    /// Run until the PPU finishes a frame, then let the CPU finish its instruction.
    pub fn step_frame(&mut self) {
        while !self.ppu.frame_complete() {
            self.clock();
        }
        while !self.cpu.complete() {
            self.clock();
        }
        self.ppu.take_frame_complete();
    }
}
