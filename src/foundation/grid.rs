use crate::foundation::error::{FractalError, FractalResult};

/// Row-major 2D array of cells.
///
/// Used both for block grids (`Grid<ImageBuffer>`) and Atom grids (`Grid<Atom>`).
/// The shape is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a grid from row-major cells. `cells.len()` must equal `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> FractalResult<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| FractalError::parameter("grid shape overflows usize"))?;
        if cells.len() != expected {
            return Err(FractalError::parameter(format!(
                "grid {rows}x{cols} expects {expected} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Build a grid by evaluating `f(y, x)` for every cell in row-major order.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for y in 0..rows {
            for x in 0..cols {
                cells.push(f(y, x));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at row `y`, column `x`, or `None` when out of bounds.
    pub fn get(&self, y: usize, x: usize) -> Option<&T> {
        if y >= self.rows || x >= self.cols {
            return None;
        }
        self.cells.get(y * self.cols + x)
    }

    /// One row of cells.
    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.cols..(y + 1) * self.cols]
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Cells with their `(y, x)` position, row-major.
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / cols, i % cols), cell))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }

    /// Apply `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (y, x): (usize, usize)) -> &T {
        assert!(
            y < self.rows && x < self.cols,
            "grid index ({y}, {x}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        &self.cells[y * self.cols + x]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/grid.rs"]
mod tests;
