/// NES Controller Button
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

/// NES Standard Controller (Joypad)
///
/// The controller is an 8-bit parallel-to-serial shift register. Writing 1 to
/// the strobe bit latches the current button snapshot and holds the read
/// position at button A; once strobe goes low, each read shifts out one
/// button in the order A, B, Select, Start, Up, Down, Left, Right.
pub struct Joypad {
    strobe: bool,
    button_index: u8,
    /// Live button state, updated by the host input layer
    button_states: u8,
    /// Snapshot taken when strobe was last written high
    latched_states: u8,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            strobe: false,
            button_index: 0,
            button_states: 0,
            latched_states: 0,
        }
    }

    /// Write to the strobe register ($4016 bit 0)
    ///
    /// While strobe is high the shift register continuously reloads from the
    /// live button state and the read position stays at button A.
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 0x01 != 0;

        if self.strobe {
            self.latched_states = self.button_states;
            self.button_index = 0;
        }
    }

    /// Read one bit from the shift register ($4016/$4017)
    ///
    /// Returns the current button state in bit 0 and advances to the next
    /// button unless strobe is held high. Reads past the 8th bit return 1.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            // Register keeps reloading, so reads always see button A
            self.latched_states = self.button_states;
            return self.latched_states & 0x01;
        }

        if self.button_index >= 8 {
            return 1;
        }

        let response = (self.latched_states >> self.button_index) & 0x01;
        self.button_index += 1;
        response
    }

    /// Non-destructive read for debuggers: same value as `read`, but the
    /// shift position does not advance.
    pub fn peek(&self) -> u8 {
        if self.strobe {
            return self.button_states & 0x01;
        }
        if self.button_index >= 8 {
            return 1;
        }
        (self.latched_states >> self.button_index) & 0x01
    }

    /// Set the live state of a button
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = button as u8;
        if pressed {
            self.button_states |= 1 << bit;
        } else {
            self.button_states &= !(1 << bit);
        }
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latch(joypad: &mut Joypad) {
        joypad.write_strobe(1);
        joypad.write_strobe(0);
    }

    #[test]
    fn test_sequential_button_reading() {
        let mut joypad = Joypad::new();

        joypad.set_button(Button::A, true);
        joypad.set_button(Button::Start, true);
        joypad.set_button(Button::Right, true);
        latch(&mut joypad);

        // A, B, Select, Start, Up, Down, Left, Right
        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 1);
    }

    #[test]
    fn test_ninth_read_returns_one() {
        let mut joypad = Joypad::new();
        latch(&mut joypad);

        for _ in 0..8 {
            joypad.read();
        }

        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.read(), 1);
    }

    #[test]
    fn test_strobe_holds_button_a() {
        let mut joypad = Joypad::new();
        joypad.set_button(Button::B, true);
        joypad.write_strobe(1);

        // Reading while strobe is high keeps returning button A
        assert_eq!(joypad.read(), 0);
        assert_eq!(joypad.read(), 0);

        joypad.write_strobe(0);

        assert_eq!(joypad.read(), 0); // A
        assert_eq!(joypad.read(), 1); // B
    }

    #[test]
    fn test_strobe_relatch() {
        let mut joypad = Joypad::new();

        joypad.set_button(Button::A, true);
        latch(&mut joypad);
        assert_eq!(joypad.read(), 1);

        // Change buttons and re-latch
        joypad.set_button(Button::A, false);
        joypad.set_button(Button::B, true);
        latch(&mut joypad);

        assert_eq!(joypad.read(), 0); // A released
        assert_eq!(joypad.read(), 1); // B pressed
    }

    #[test]
    fn test_button_change_without_strobe_is_invisible() {
        let mut joypad = Joypad::new();
        latch(&mut joypad);

        // Pressing after the latch does not affect the current shift-out
        joypad.set_button(Button::A, true);
        assert_eq!(joypad.read(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut joypad = Joypad::new();
        joypad.set_button(Button::A, true);
        latch(&mut joypad);

        assert_eq!(joypad.peek(), 1);
        assert_eq!(joypad.peek(), 1);
        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.peek(), 0); // now at B
    }
}
