//! HD44780 character LCD module.
//!
//! The appliance uses a 16x2 HD44780-compatible module wired with an 8-bit data bus, an enable
//! (E) line, a register-select (RS) line and a read/write (RW) line that is held low. A 4-bit
//! data bus works too, for boards that are short on lines.
//!
//! See [driver::HD44780Driver] for the command set and [driver::GpioHD44780Driver] for the
//! GPIO implementation.

pub mod driver;

/// Number of character columns per line.
pub const COLUMNS: usize = 16;
/// Number of lines.
pub const LINES: usize = 2;
/// DDRAM address of the first character of each line.
pub const LINE_ADDRESSES: [u8; LINES] = [0x00, 0x40];
