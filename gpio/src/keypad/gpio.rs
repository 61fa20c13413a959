use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::Duration;
use log::{debug, trace};
use crate::{GpioBusInput, GpioBusOutput, GpioResult};
use crate::keypad::{ColumnPolicy, KeyMap, Keypad, ScanResult};

/// The `GpioKeypad` struct represents a GPIO-based 4x4 matrix keypad.
///
/// Rows are push-pull outputs idling high; one row at a time is driven low.
/// Columns are inputs with pull-ups, so a pressed key pulls its column low while its row is driven.
/// Both buses are used at their physical levels (active level high).
pub struct GpioKeypad<'a> {
    rows: &'a dyn GpioBusOutput<4>,
    cols: &'a dyn GpioBusInput<4>,
    key_map: KeyMap,
    policy: ColumnPolicy,
    debounce: Option<Duration>,
    idle: Option<Duration>,
}

impl Debug for GpioKeypad<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioKeypad({:?}, {:?}, {:?})", self.rows, self.cols, self.policy)
    }
}

impl<'a> GpioKeypad<'a> {
    /// Creates a new `GpioKeypad` over the given row outputs and column inputs, using
    /// [KeyMap::APPLIANCE] and [ColumnPolicy::Strict].
    pub fn new(rows: &'a dyn GpioBusOutput<4>, cols: &'a dyn GpioBusInput<4>) -> Self {
        GpioKeypad {
            rows,
            cols,
            key_map: KeyMap::default(),
            policy: ColumnPolicy::default(),
            debounce: None,
            idle: None,
        }
    }

    pub fn with_key_map(mut self, key_map: KeyMap) -> Self {
        self.key_map = key_map;
        self
    }

    pub fn with_policy(mut self, policy: ColumnPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Requires a press to read the same column pattern again after `debounce` before it is
    /// accepted. A zero duration disables the check.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = (!debounce.is_zero()).then_some(debounce);
        self
    }

    /// Sleeps `idle` between scan passes in [Keypad::wait_key] instead of spinning.
    /// A zero duration keeps the busy-wait.
    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = (!idle.is_zero()).then_some(idle);
        self
    }

    /// Drives each row low in order and returns the first row that reads an active column.
    pub fn scan(&self) -> GpioResult<Option<ScanResult>> {
        for row in 0..4 {
            let drive = ScanResult::IDLE & !(1 << row);
            trace!("Driving rows: {:04b}", drive);
            self.rows.write_nibble(drive)?;

            let scan = ScanResult { row, columns: self.cols.read_nibble()? };
            if !scan.is_active() {
                continue;
            }

            if let Some(debounce) = self.debounce {
                sleep(debounce);
                let columns = self.cols.read_nibble()?;
                if columns != scan.columns {
                    debug!("Row {} bounced: {:04b} -> {:04b}", row, scan.columns, columns);
                    return Ok(None);
                }
            }

            return Ok(Some(scan));
        }

        Ok(None)
    }
}

impl Keypad for GpioKeypad<'_> {
    type Key = char;

    fn poll(&self) -> GpioResult<Option<char>> {
        let Some(scan) = self.scan()? else {
            return Ok(None);
        };

        let Some(col) = scan.column(self.policy) else {
            debug!("Rejected ambiguous scan in row {}: {:04b}", scan.row, scan.columns);
            return Ok(None);
        };

        let key = self.key_map.get(scan.row, col);
        if let Some(key) = key {
            debug!("Key {:?} at ({}, {})", key, scan.row, col);
        }
        Ok(key)
    }

    fn wait_key(&self) -> GpioResult<char> {
        loop {
            if let Some(key) = self.poll()? {
                return Ok(key);
            }
            match self.idle {
                Some(idle) => sleep(idle),
                None => std::hint::spin_loop(),
            }
        }
    }
}
