/*!
Controller abstraction for NES-style serial input via $4016/$4017.

Behavior:
- Buttons are a bitmask ordered the way the CPU shifts them out, most significant bit first:
  A, B, Select, Start, Up, Down, Left, Right  (bit 7 through bit 0)
- Any CPU write to the port latches a snapshot of the live button state.
- Each CPU read returns bit 7 of the snapshot and shifts it left by one, so after eight
  reads the port returns 0 until the next latch.
- Read-only (inspection) reads peek at the next bit without shifting.
*/

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    #[inline]
    fn mask(self) -> u8 {
        match self {
            Button::A => 0x80,
            Button::B => 0x40,
            Button::Select => 0x20,
            Button::Start => 0x10,
            Button::Up => 0x08,
            Button::Down => 0x04,
            Button::Left => 0x02,
            Button::Right => 0x01,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    // Live button states. Bit set = pressed.
    buttons: u8,
    // Snapshot being shifted out to the CPU.
    shift: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub fn press(&mut self, button: Button) {
        self.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set_button(button, false);
    }

    /// Replace the entire live state. Bit layout matches [`Button`] ordering.
    pub fn set_state_mask(&mut self, mask: u8) {
        self.buttons = mask;
    }

    pub fn state_mask(&self) -> u8 {
        self.buttons
    }

    /// CPU write to the port: snapshot the live buttons.
    pub fn latch(&mut self) {
        self.shift = self.buttons;
    }

    /// CPU read from the port. Only bit 0 of the result is meaningful.
    pub fn read(&mut self) -> u8 {
        let bit = self.peek();
        self.shift <<= 1;
        bit
    }

    /// Next bit without consuming it.
    pub fn peek(&self) -> u8 {
        (self.shift & 0x80 != 0) as u8
    }
}
