pub mod gpiod;
pub mod keypad;
pub mod lcd;
pub mod motor;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("line already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO lines available.
    fn count(&self) -> GpioResult<usize>;

    /// Claims the GPIO line at the given index.
    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>>;

    /// Claims the GPIO lines at the given indices as a single bus.
    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>>;
}

/// Specifies the active level of a GPIO line.
///
/// By default, the active level is high. With [GpioActiveLevel::Low], writing `true` drives the
/// line low and a low line reads as `true`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

/// Specifies the bias of a GPIO line.
///
/// The keypad column lines rely on [GpioBias::PullUp] to idle high.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioBias {
    #[default] None,
    PullUp,
    PullDown,
}

/// A claimed GPIO line that is not yet configured as input or output.
pub trait GpioPin: Debug {
    /// Requests the line as an input.
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioInput + '_>>;
    /// Requests the line as an output.
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>>;

    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    /// Sets the active level used when the line is requested.
    ///
    /// # Errors
    /// - `GpioError::NotSupported` if the backend can't invert the line.
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }

    fn bias(&self) -> GpioBias {
        GpioBias::None
    }
    /// Sets the bias used when the line is requested.
    ///
    /// # Errors
    /// - `GpioError::NotSupported` if the backend has no bias control.
    fn set_bias(&mut self, _bias: GpioBias) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioInput: Debug {
    /// Reads the logical state of the line.
    fn read(&self) -> GpioResult<bool>;
}

pub trait GpioOutput: Debug {
    /// Writes the logical state of the line.
    fn write(&self, value: bool) -> GpioResult<()>;
}

/// A group of `N` claimed lines that are requested and accessed together.
pub trait GpioBus<const N: usize>: Debug {
    fn as_input(&mut self) -> GpioResult<Box<dyn GpioBusInput<N> + '_>>;
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>>;

    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }

    fn bias(&self) -> GpioBias {
        GpioBias::None
    }
    fn set_bias(&mut self, _bias: GpioBias) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioBusInput<const N: usize>: Debug {
    fn read(&self) -> GpioResult<[bool; N]>;
}

impl dyn GpioBusInput<4> + '_ {
    /// Reads the bus as a nibble, LSb first (line 0 is bit 0).
    pub fn read_nibble(&self) -> GpioResult<u8> {
        let values = self.read()?;
        Ok(values
            .iter()
            .enumerate()
            .fold(0u8, |nibble, (i, &high)| if high { nibble | 1 << i } else { nibble }))
    }
}

pub trait GpioBusOutput<const N: usize>: Debug {
    fn write(&self, values: &[bool; N]) -> GpioResult<()>;
}

impl dyn GpioBusOutput<8> + '_ {
    /// Writes a byte to the bus, LSb first (bit 0 goes to line 0).
    pub fn write_byte(&self, value: u8) -> GpioResult<()> {
        let values: [bool; 8] = std::array::from_fn(|i| value & (1 << i) != 0);
        self.write(&values)
    }
}

impl dyn GpioBusOutput<4> + '_ {
    /// Writes a nibble to the bus, LSb first (bit 0 goes to line 0).
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if the value doesn't fit in four bits.
    pub fn write_nibble(&self, value: u8) -> GpioResult<()> {
        if value > 0b1111 {
            return Err(GpioError::InvalidArgument);
        }

        let values: [bool; 4] = std::array::from_fn(|i| value & (1 << i) != 0);
        self.write(&values)
    }
}
