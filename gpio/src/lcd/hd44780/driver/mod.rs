mod gpio;

use crate::{GpioError, GpioResult};
pub use gpio::*;
use std::fmt::Debug;

/// Low-level command interface of an HD44780 controller.
///
/// Every command is a single byte built from flags; implementations only have to provide
/// [Self::init], [Self::send_command] and [Self::send_data]. Reading the busy flag is not part
/// of the interface: implementations wait a fixed time after each transfer instead.
pub trait HD44780Driver: Debug {
    /// Initializes the controller: function set, display on with cursor off, clear, entry mode
    /// moving right, and the cursor at the home address.
    fn init(&mut self, two_lines: bool) -> GpioResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.send_command(0b00000001)
    }

    /// Sets the cursor to the home position and undoes any display shift.
    fn return_home(&mut self) -> GpioResult<()> {
        self.send_command(0b00000010)
    }

    /// Sets the direction the cursor moves after each character and whether the display shifts.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> GpioResult<()> {
        let mut command = 0b00000100;
        if cursor_direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> GpioResult<()> {
        let mut command = 0b00001000;
        if display_on {
            command |= 0b00000100;
        }
        if cursor_on {
            command |= 0b00000010;
        }
        if blink_on {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Moves the cursor one position without writing anything.
    fn shift_cursor(&mut self, direction: CursorDirection) -> GpioResult<()> {
        self.send_command(0b00010000 | direction.shift_bit())
    }

    /// Shifts the whole display one position. The cursor follows the text.
    fn shift_display(&mut self, direction: CursorDirection) -> GpioResult<()> {
        self.send_command(0b00011000 | direction.shift_bit())
    }

    /// Sets the bus width (`eight_bit`), the line count and the 5x10 font.
    fn function_set(&mut self, eight_bit: bool, two_lines: bool, tall_font: bool) -> GpioResult<()> {
        let mut command = 0b00100000;
        if eight_bit {
            command |= 0b00010000;
        }
        if two_lines {
            command |= 0b00001000;
        }
        if tall_font {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets the CGRAM address, for defining custom glyphs with [Self::send_data].
    fn set_cgram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b00111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(0b01000000 | address)
    }

    /// Sets the DDRAM address, which is where the next character lands.
    fn set_ddram_address(&mut self, address: u8) -> GpioResult<()> {
        if address > 0b01111111 {
            return Err(GpioError::InvalidArgument);
        }
        self.send_command(0b10000000 | address)
    }

    /// Sends a command byte (RS low).
    fn send_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends a data byte (RS high), usually a character code.
    fn send_data(&mut self, data: u8) -> GpioResult<()>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

impl CursorDirection {
    fn shift_bit(self) -> u8 {
        match self {
            CursorDirection::Left => 0,
            CursorDirection::Right => 0b00000100,
        }
    }
}
