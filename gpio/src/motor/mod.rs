//! Motor driver control lines.
//!
//! The fan motor hangs off an H-bridge driver with two control inputs. The appliance only ever
//! spins it one way, so the control code is either "stop" or "forward".

use std::fmt::Debug;
use log::trace;
use crate::{GpioBusOutput, GpioResult};

/// Two-bit control code for the motor driver inputs. Bit 0 goes to input 1, bit 1 to input 2.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum MotorCode {
    /// Both inputs low.
    #[default]
    Stop = 0b00,
    /// Input 1 high, input 2 low.
    Forward = 0b01,
}

impl MotorCode {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

pub trait MotorDriver: Debug {
    fn set_control(&mut self, code: MotorCode) -> GpioResult<()>;
}

/// A [MotorDriver] over two GPIO output lines.
#[derive(Debug)]
pub struct GpioMotor<'a> {
    lines: &'a dyn GpioBusOutput<2>,
}

impl<'a> GpioMotor<'a> {
    pub fn new(lines: &'a dyn GpioBusOutput<2>) -> Self {
        GpioMotor { lines }
    }
}

impl MotorDriver for GpioMotor<'_> {
    fn set_control(&mut self, code: MotorCode) -> GpioResult<()> {
        let bits = code.bits();
        trace!("Motor control: {:02b}", bits);
        self.lines.write(&[bits & 0b01 != 0, bits & 0b10 != 0])
    }
}
