use crate::lcd::hd44780::driver::{CursorDirection, HD44780Driver};
use crate::{GpioBusOutput, GpioOutput, GpioResult};
use log::trace;
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug)]
pub enum GpioHD44780Bus<'a> {
    Bus8Bit(&'a dyn GpioBusOutput<8>),
    /// Lines D4..D7 of the controller.
    Bus4Bit(&'a dyn GpioBusOutput<4>),
}

impl GpioHD44780Bus<'_> {
    pub fn is_8bit(&self) -> bool {
        matches!(self, GpioHD44780Bus::Bus8Bit(_))
    }
}

/// Fixed delays used instead of polling the busy flag.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HD44780Timing {
    /// Wait before the first command after power-on.
    pub power_on: Duration,
    /// Width of the enable pulse.
    pub enable_pulse: Duration,
    /// Wait after a command. Clearing the display is the slowest, at about 1.5 ms.
    pub command_settle: Duration,
    /// Wait after a data byte.
    pub data_settle: Duration,
}

impl HD44780Timing {
    /// No waiting at all, for controllers that aren't real hardware.
    pub const NONE: HD44780Timing = HD44780Timing {
        power_on: Duration::ZERO,
        enable_pulse: Duration::ZERO,
        command_settle: Duration::ZERO,
        data_settle: Duration::ZERO,
    };
}

impl Default for HD44780Timing {
    fn default() -> Self {
        HD44780Timing {
            power_on: Duration::from_millis(20),
            enable_pulse: Duration::from_micros(1),
            command_settle: Duration::from_millis(3),
            data_settle: Duration::from_millis(1),
        }
    }
}

#[derive(Debug)]
pub struct GpioHD44780Driver<'a> {
    pin_e: &'a dyn GpioOutput,
    pin_rw: Option<&'a dyn GpioOutput>,
    pin_rs: &'a dyn GpioOutput,
    data_bus: GpioHD44780Bus<'a>,
    timing: HD44780Timing,
}

impl<'a> GpioHD44780Driver<'a> {
    pub fn new_4bit(
        pin_e: &'a dyn GpioOutput,
        pin_rw: Option<&'a dyn GpioOutput>,
        pin_rs: &'a dyn GpioOutput,
        data_bus: &'a dyn GpioBusOutput<4>,
    ) -> Self {
        GpioHD44780Driver {
            pin_e,
            pin_rw,
            pin_rs,
            data_bus: GpioHD44780Bus::Bus4Bit(data_bus),
            timing: HD44780Timing::default(),
        }
    }

    pub fn new_8bit(
        pin_e: &'a dyn GpioOutput,
        pin_rw: Option<&'a dyn GpioOutput>,
        pin_rs: &'a dyn GpioOutput,
        data_bus: &'a dyn GpioBusOutput<8>,
    ) -> Self {
        GpioHD44780Driver {
            pin_e,
            pin_rw,
            pin_rs,
            data_bus: GpioHD44780Bus::Bus8Bit(data_bus),
            timing: HD44780Timing::default(),
        }
    }

    pub fn with_timing(mut self, timing: HD44780Timing) -> Self {
        self.timing = timing;
        self
    }

    fn pulse_e(&self) -> GpioResult<()> {
        self.pin_e.write(true)?;
        sleep(self.timing.enable_pulse);
        self.pin_e.write(false)?;
        Ok(())
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        self.pin_rs.write(rs)?;

        // Only ever writing
        if let Some(rw) = self.pin_rw {
            rw.write(false)?;
        }

        match self.data_bus {
            GpioHD44780Bus::Bus8Bit(bus) => {
                bus.write_byte(data)?;
                self.pulse_e()?;
            }
            GpioHD44780Bus::Bus4Bit(bus) => {
                bus.write_nibble(data >> 4)?;
                self.pulse_e()?;
                bus.write_nibble(data & 0x0F)?;
                self.pulse_e()?;
            }
        }

        sleep(if rs { self.timing.data_settle } else { self.timing.command_settle });
        Ok(())
    }
}

impl HD44780Driver for GpioHD44780Driver<'_> {
    fn init(&mut self, two_lines: bool) -> GpioResult<()> {
        self.pin_e.write(false)?;
        sleep(self.timing.power_on);

        // Synchronize into 4-bit mode: the controller sees 3, 3, 3, 2 on its upper data lines.
        if !self.data_bus.is_8bit() {
            self.send(0b00110011, false)?;
            self.send(0b00110010, false)?;
        }
        self.function_set(self.data_bus.is_8bit(), two_lines, false)?;
        self.set_display_control(true, false, false)?;
        self.clear_display()?;
        self.set_entry_mode(CursorDirection::Right, false)?;
        self.set_ddram_address(0)?;
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }
}
