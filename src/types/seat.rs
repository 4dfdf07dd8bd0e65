//! Seat grid types for the train booking engine
//!
//! A `SeatGrid` is the fixed-size occupancy matrix owned by a train. Every
//! state change goes through one of two bounds-checked primitives:
//! `try_occupy` (Free → Booked) and `release` (Booked → Free).
//!
//! On disk the grid is stored as rows of `0` (free) and `1` (booked).

use super::error::BookingError;
use serde::{Deserialize, Serialize};

/// Occupancy of a single seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupancyState {
    Free,
    Booked,
}

impl OccupancyState {
    /// Numeric form used in persisted records and the seat map display
    pub fn as_digit(self) -> u8 {
        match self {
            OccupancyState::Free => 0,
            OccupancyState::Booked => 1,
        }
    }
}

/// Fixed-size 2-D seat occupancy matrix
///
/// Cells are stored row-major. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct SeatGrid {
    rows: usize,
    cols: usize,
    cells: Vec<OccupancyState>,
}

impl SeatGrid {
    /// Create a grid with every seat free
    pub fn new(rows: usize, cols: usize) -> Self {
        SeatGrid {
            rows,
            cols,
            cells: vec![OccupancyState::Free; rows * cols],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of seats per row
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Map `(row, col)` to a cell index, rejecting anything outside the grid
    fn index(&self, row: usize, col: usize) -> Result<usize, BookingError> {
        if row >= self.rows || col >= self.cols {
            return Err(BookingError::out_of_bounds(row, col, self.rows, self.cols));
        }
        Ok(row * self.cols + col)
    }

    /// Read the occupancy of one seat
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if `row` or `col` lies outside the grid.
    pub fn occupancy_at(&self, row: usize, col: usize) -> Result<OccupancyState, BookingError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx])
    }

    /// Attempt to book one seat
    ///
    /// This is the only way a cell moves from Free to Booked.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the seat was free and is now booked
    /// * `Ok(false)` - the seat was already booked, nothing changed
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for invalid indices, without mutating the grid.
    pub fn try_occupy(&mut self, row: usize, col: usize) -> Result<bool, BookingError> {
        let idx = self.index(row, col)?;
        match self.cells[idx] {
            OccupancyState::Free => {
                self.cells[idx] = OccupancyState::Booked;
                Ok(true)
            }
            OccupancyState::Booked => Ok(false),
        }
    }

    /// Free one seat
    ///
    /// Releasing a seat that is already free is a no-op that returns
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for invalid indices, without mutating the grid.
    pub fn release(&mut self, row: usize, col: usize) -> Result<bool, BookingError> {
        let idx = self.index(row, col)?;
        match self.cells[idx] {
            OccupancyState::Booked => {
                self.cells[idx] = OccupancyState::Free;
                Ok(true)
            }
            OccupancyState::Free => Ok(false),
        }
    }

    /// Copy of the grid as ordered rows, for display
    pub fn snapshot(&self) -> Vec<Vec<OccupancyState>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(<[_]>::to_vec).collect()
    }

    /// Number of booked seats
    pub fn booked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == OccupancyState::Booked)
            .count()
    }

    /// Number of free seats
    pub fn free_count(&self) -> usize {
        self.cells.len() - self.booked_count()
    }

    /// Iterate over the `(row, col)` coordinates of every booked seat
    pub fn booked_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == OccupancyState::Booked)
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }
}

impl TryFrom<Vec<Vec<u8>>> for SeatGrid {
    type Error = String;

    fn try_from(raw: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        let rows = raw.len();
        let cols = raw.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows * cols);

        for (r, row) in raw.into_iter().enumerate() {
            if row.len() != cols {
                return Err(format!(
                    "seat row {} has {} seats, expected {}",
                    r,
                    row.len(),
                    cols
                ));
            }
            for (c, value) in row.into_iter().enumerate() {
                let state = match value {
                    0 => OccupancyState::Free,
                    1 => OccupancyState::Booked,
                    other => {
                        return Err(format!(
                            "seat ({}, {}) has occupancy {}, expected 0 or 1",
                            r, c, other
                        ))
                    }
                };
                cells.push(state);
            }
        }

        Ok(SeatGrid { rows, cols, cells })
    }
}

impl From<SeatGrid> for Vec<Vec<u8>> {
    fn from(grid: SeatGrid) -> Self {
        grid.snapshot()
            .into_iter()
            .map(|row| row.into_iter().map(OccupancyState::as_digit).collect())
            .collect()
    }
}
