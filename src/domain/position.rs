//! Open position and closed trade records.

/// An open long position of one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_price: f64,
}

impl Position {
    /// Close at `exit_index` / `exit_price`, consuming the position.
    pub fn close(self, exit_index: usize, exit_price: f64) -> Trade {
        Trade {
            entry_index: self.entry_index,
            exit_index,
            entry_price: self.entry_price,
            exit_price,
            pnl: exit_price - self.entry_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    /// Bars held, counting the exit bar but not the entry bar.
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
