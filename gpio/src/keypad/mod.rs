mod gpio;

use std::fmt::Debug;
use std::str::FromStr;
use crate::{GpioError, GpioResult};
pub use gpio::*;

/// The `Keypad` trait defines the interface for keypad input devices.
pub trait Keypad: Debug {
    type Key;

    /// Runs a single scan pass. Returns `None` if no key is pressed.
    fn poll(&self) -> GpioResult<Option<Self::Key>>;

    /// Blocks until a key is pressed and returns it.
    ///
    /// There is no timeout: if no key is ever pressed, this never returns.
    fn wait_key(&self) -> GpioResult<Self::Key> {
        loop {
            if let Some(key) = self.poll()? {
                return Ok(key);
            }
            std::hint::spin_loop();
        }
    }
}

/// Fixed table resolving a (row, column) position of the matrix to its key character.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyMap([[char; 4]; 4]);

impl KeyMap {
    /// The legend printed on the appliance's keypad.
    pub const APPLIANCE: KeyMap = KeyMap([
        ['.', '-', '=', '/'],
        ['1', '4', '7', '*'],
        ['2', '5', '8', '0'],
        ['3', '6', '9', '#'],
    ]);

    pub const fn new(keys: [[char; 4]; 4]) -> Self {
        KeyMap(keys)
    }

    /// Gets the key at the given position, or `None` if it's outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.0.get(row)?.get(col).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        KeyMap::APPLIANCE
    }
}

/// Column levels sampled while a single row was driven low.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScanResult {
    /// The driven row.
    pub row: usize,
    /// Column levels, bit `n` for column line `n`. Active-low, so `0b1111` means nothing pressed.
    pub columns: u8,
}

impl ScanResult {
    pub const IDLE: u8 = 0b1111;

    /// Whether any column line reads active.
    pub fn is_active(&self) -> bool {
        self.columns & Self::IDLE != Self::IDLE
    }

    /// Resolves the single active column.
    ///
    /// Returns `None` for an idle pattern, and for patterns with several active columns unless
    /// `policy` is [ColumnPolicy::Compatible].
    pub fn column(&self, policy: ColumnPolicy) -> Option<usize> {
        match self.columns & Self::IDLE {
            0b1110 => Some(0),
            0b1101 => Some(1),
            0b1011 => Some(2),
            0b0111 => Some(3),
            Self::IDLE => None,
            _ => match policy {
                ColumnPolicy::Strict => None,
                ColumnPolicy::Compatible => Some(3),
            },
        }
    }
}

/// How a scan with more than one active column in the matched row is treated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ColumnPolicy {
    /// Ambiguous scans are rejected and scanning continues.
    #[default]
    Strict,
    /// Ambiguous scans resolve to the last column, like the appliance's stock firmware.
    Compatible,
}

impl FromStr for ColumnPolicy {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ColumnPolicy::Strict),
            "compatible" => Ok(ColumnPolicy::Compatible),
            _ => Err(GpioError::Other(format!("unknown column policy {s:?}"))),
        }
    }
}
