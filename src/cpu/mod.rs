/*!
cpu - the 2A03's 6502 core.

```text
    state.rs       - Status flag masks, vectors and the `CpuState` snapshot.
    addressing.rs  - Addressing modes and operand resolution.
    execute.rs     - One function per operation (ALU, stack, branches, RMW).
    table.rs       - The 256-entry opcode table tying modes to operations.
    core/          - `Cpu` itself: clocking, interrupts and stack helpers.
```

The CPU never owns memory. Every access goes through `CpuBus`, which the system bus
implements with a split borrow of its other components.
*/

pub mod addressing;
pub mod core;
pub mod execute;
pub mod state;
pub mod table;

pub use crate::cpu::addressing::AddrMode;
pub use crate::cpu::core::Cpu;
pub use crate::cpu::state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};
pub use crate::cpu::table::{INSTRUCTIONS, Instruction};
