//! In-memory GPIO lines for unit tests.

use crate::{GpioBusInput, GpioBusOutput, GpioOutput, GpioResult};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Levels of `N` simulated lines, shared between the fixtures that drive and sense them.
#[derive(Clone, Debug)]
pub struct SharedLevels<const N: usize>(Rc<Cell<[bool; N]>>);

impl<const N: usize> Default for SharedLevels<N> {
    fn default() -> Self {
        SharedLevels(Rc::new(Cell::new([false; N])))
    }
}

impl<const N: usize> SharedLevels<N> {
    pub fn get(&self) -> [bool; N] {
        self.0.get()
    }

    pub fn set(&self, values: [bool; N]) {
        self.0.set(values)
    }
}

#[derive(Debug)]
pub struct SimBusInput<const N: usize> {
    levels: SharedLevels<N>,
}

impl<const N: usize> SimBusInput<N> {
    pub fn new(levels: SharedLevels<N>) -> Self {
        SimBusInput { levels }
    }
}

impl<const N: usize> GpioBusInput<N> for SimBusInput<N> {
    fn read(&self) -> GpioResult<[bool; N]> {
        Ok(self.levels.get())
    }
}

/// Output bus that keeps every written value.
#[derive(Debug)]
pub struct SimBusOutput<const N: usize> {
    levels: SharedLevels<N>,
    pub history: RefCell<Vec<[bool; N]>>,
}

impl<const N: usize> SimBusOutput<N> {
    pub fn new(levels: SharedLevels<N>) -> Self {
        SimBusOutput { levels, history: RefCell::new(Vec::new()) }
    }
}

impl<const N: usize> GpioBusOutput<N> for SimBusOutput<N> {
    fn write(&self, values: &[bool; N]) -> GpioResult<()> {
        self.levels.set(*values);
        self.history.borrow_mut().push(*values);
        Ok(())
    }
}

/// Output line that keeps every written value.
#[derive(Debug, Default)]
pub struct SimOutput {
    pub history: RefCell<Vec<bool>>,
}

impl SimOutput {
    pub fn level(&self) -> Option<bool> {
        self.history.borrow().last().copied()
    }
}

impl GpioOutput for SimOutput {
    fn write(&self, value: bool) -> GpioResult<()> {
        self.history.borrow_mut().push(value);
        Ok(())
    }
}

#[derive(Debug)]
struct SimKey {
    row: usize,
    col: usize,
    hidden_reads: usize,
    remaining_reads: Option<usize>,
}

/// A 4x4 switch matrix. Rows are driven through [SimMatrix::rows], columns are sensed through
/// the matrix itself. Columns idle high (pull-up) and read low while a pressed key connects them
/// to a row that is driven low.
#[derive(Debug, Default)]
pub struct SimMatrix {
    rows: SharedLevels<4>,
    keys: RefCell<Vec<SimKey>>,
    pub reads: Cell<usize>,
}

impl SimMatrix {
    pub fn new() -> Self {
        let matrix = SimMatrix::default();
        matrix.rows.set([true; 4]);
        matrix
    }

    pub fn rows(&self) -> SimBusOutput<4> {
        SimBusOutput::new(self.rows.clone())
    }

    pub fn press(&self, row: usize, col: usize) {
        self.keys.borrow_mut().push(SimKey { row, col, hidden_reads: 0, remaining_reads: None });
    }

    /// Presses a key once `reads` column samples have passed.
    pub fn press_after_reads(&self, row: usize, col: usize, reads: usize) {
        self.keys.borrow_mut().push(SimKey { row, col, hidden_reads: reads, remaining_reads: None });
    }

    /// Presses a key that bounces away after it was seen by `reads` column samples.
    pub fn press_for_reads(&self, row: usize, col: usize, reads: usize) {
        self.keys.borrow_mut().push(SimKey { row, col, hidden_reads: 0, remaining_reads: Some(reads) });
    }
}

impl GpioBusInput<4> for SimMatrix {
    fn read(&self) -> GpioResult<[bool; 4]> {
        self.reads.set(self.reads.get() + 1);
        let rows = self.rows.get();
        let mut cols = [true; 4];
        let mut keys = self.keys.borrow_mut();
        for key in keys.iter_mut() {
            if key.hidden_reads > 0 {
                key.hidden_reads -= 1;
                continue;
            }
            if !rows[key.row] {
                cols[key.col] = false;
            }
            if let Some(remaining) = key.remaining_reads.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
        }
        keys.retain(|key| key.remaining_reads != Some(0));
        Ok(cols)
    }
}
