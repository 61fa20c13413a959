//! Where the dispatcher's side effects end up: the character display and the output lines.

use log::{trace, warn};
use remote_gpio::lcd::hd44780::driver::HD44780Driver;
use remote_gpio::lcd::hd44780::{COLUMNS, LINES, LINE_ADDRESSES};
use remote_gpio::motor::{MotorCode, MotorDriver};
use remote_gpio::{GpioError, GpioOutput, GpioResult};
use crate::utils::WithinExt;

/// A text display with a cursor.
pub trait DisplaySink {
    /// Writes `text` at the cursor.
    fn show_text(&mut self, text: &str) -> GpioResult<()>;
    /// Clears the display and moves the cursor home.
    fn clear(&mut self) -> GpioResult<()>;
    fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()>;
}

impl<T: ?Sized + HD44780Driver> DisplaySink for T {
    fn show_text(&mut self, text: &str) -> GpioResult<()> {
        for c in text.chars() {
            if c.is_ascii() {
                self.send_data(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.send_data(b'?')?;
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> GpioResult<()> {
        self.clear_display()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> GpioResult<()> {
        if !row.within(0..LINES) || !col.within(0..COLUMNS) {
            return Err(GpioError::InvalidArgument);
        }
        self.set_ddram_address(LINE_ADDRESSES[row] + col as u8)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Led {
    Led1,
    Led2,
}

/// The actuators: two LEDs and the fan motor driver.
pub trait OutputSink {
    fn set_binary_output(&mut self, led: Led, on: bool) -> GpioResult<()>;
    fn set_motor_control(&mut self, code: MotorCode) -> GpioResult<()>;
}

/// [OutputSink] over GPIO lines.
#[derive(Debug)]
pub struct GpioOutputs<'a> {
    led1: &'a dyn GpioOutput,
    led2: &'a dyn GpioOutput,
    motor: &'a mut dyn MotorDriver,
}

impl<'a> GpioOutputs<'a> {
    pub fn new(
        led1: &'a dyn GpioOutput,
        led2: &'a dyn GpioOutput,
        motor: &'a mut dyn MotorDriver,
    ) -> Self {
        GpioOutputs { led1, led2, motor }
    }
}

impl OutputSink for GpioOutputs<'_> {
    fn set_binary_output(&mut self, led: Led, on: bool) -> GpioResult<()> {
        trace!("{:?} <- {}", led, on);
        match led {
            Led::Led1 => self.led1.write(on),
            Led::Led2 => self.led2.write(on),
        }
    }

    fn set_motor_control(&mut self, code: MotorCode) -> GpioResult<()> {
        self.motor.set_control(code)
    }
}
