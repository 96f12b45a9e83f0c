//! Minimum-cost assignment (Kuhn–Munkres).
//!
//! `CostMatrix` is a flat row-major buffer. `Munkres` runs the classic
//! star/prime/cover method on a square matrix, one named pass at a time, so
//! each pass can be driven and inspected on its own. `solve_assignment` pads
//! rectangular input with dummy cells and strips dummy pairs from the result.

use std::fmt;

/// Values within this distance of zero count as zero.
pub const ZERO_TOLERANCE: f64 = 1e-4;

/// Substituted for missing or non-finite cells.
pub const INVALID_COST: f64 = 0.5;

/// Cost of every cell in a padding row or column.
pub const DUMMY_COST: f64 = 1.0;

fn sanitize(value: f64) -> f64 {
    if !value.is_finite() {
        INVALID_COST
    } else {
        value.max(0.0)
    }
}

fn is_zero(value: f64) -> bool {
    value.abs() < ZERO_TOLERANCE
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    pub fn new(rows: usize, cols: usize, fill: f64) -> CostMatrix {
        CostMatrix {
            rows,
            cols,
            data: vec![sanitize(fill); rows * cols],
        }
    }

    /// Builds a matrix from ragged rows. The width is the longest row; short
    /// rows are filled with `INVALID_COST`, as are non-finite cells.
    pub fn from_rows(rows: &[Vec<f64>]) -> CostMatrix {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut matrix = CostMatrix::new(rows.len(), cols, INVALID_COST);
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                matrix.set(r, c, value);
            }
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = sanitize(value);
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn add(&mut self, row: usize, col: usize, delta: f64) {
        self.data[row * self.cols + col] += delta;
    }

    /// Square copy; new rows/columns are filled with `DUMMY_COST`.
    pub fn padded_to_square(&self) -> CostMatrix {
        let n = self.rows.max(self.cols);
        let mut square = CostMatrix::new(n, n, DUMMY_COST);
        for r in 0..self.rows {
            square.data[r * n..r * n + self.cols].copy_from_slice(self.row(r));
        }
        square
    }
}

impl fmt::Display for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let cells: Vec<String> = self.row(r).iter().map(|v| format!("{:.3}", v)).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

/// Solver state over a square reduced-cost matrix.
pub struct Munkres {
    cost: CostMatrix,
    star_in_row: Vec<Option<usize>>,
    star_in_col: Vec<Option<usize>>,
    prime_in_row: Vec<Option<usize>>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
}

impl Munkres {
    /// `cost` must be square; use `CostMatrix::padded_to_square` first.
    pub fn new(cost: CostMatrix) -> Munkres {
        debug_assert!(cost.is_square());
        let n = cost.rows();
        Munkres {
            cost,
            star_in_row: vec![None; n],
            star_in_col: vec![None; n],
            prime_in_row: vec![None; n],
            row_covered: vec![false; n],
            col_covered: vec![false; n],
        }
    }

    fn size(&self) -> usize {
        self.cost.rows()
    }

    pub fn reduced(&self) -> &CostMatrix {
        &self.cost
    }

    pub fn is_col_covered(&self, col: usize) -> bool {
        self.col_covered[col]
    }

    pub fn is_row_covered(&self, row: usize) -> bool {
        self.row_covered[row]
    }

    pub fn star_in_row(&self, row: usize) -> Option<usize> {
        self.star_in_row[row]
    }

    /// Subtract each row's minimum from that row.
    pub fn reduce_rows(&mut self) {
        for r in 0..self.size() {
            let min = self.cost.row(r).iter().copied().fold(f64::INFINITY, f64::min);
            if min.is_finite() {
                for c in 0..self.size() {
                    self.cost.add(r, c, -min);
                }
            }
        }
    }

    /// Subtract each column's minimum from that column.
    pub fn reduce_columns(&mut self) {
        let n = self.size();
        for c in 0..n {
            let min = (0..n).map(|r| self.cost.get(r, c)).fold(f64::INFINITY, f64::min);
            if min.is_finite() {
                for r in 0..n {
                    self.cost.add(r, c, -min);
                }
            }
        }
    }

    /// Greedily star zeros that share no row or column with another star.
    pub fn star_independent_zeros(&mut self) {
        let n = self.size();
        for r in 0..n {
            for c in 0..n {
                if self.star_in_row[r].is_none()
                    && self.star_in_col[c].is_none()
                    && is_zero(self.cost.get(r, c))
                {
                    self.star_in_row[r] = Some(c);
                    self.star_in_col[c] = Some(r);
                }
            }
        }
    }

    /// Clear all covers, then cover every column holding a star.
    /// Returns the number of covered columns.
    pub fn cover_starred_columns(&mut self) -> usize {
        self.row_covered.fill(false);
        for (c, covered) in self.col_covered.iter_mut().enumerate() {
            *covered = self.star_in_col[c].is_some();
        }
        self.col_covered.iter().filter(|&&c| c).count()
    }

    pub fn all_columns_covered(&self) -> bool {
        self.col_covered.iter().all(|&c| c)
    }

    /// First zero (row-major) in an uncovered row and column.
    pub fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        let n = self.size();
        (0..n)
            .filter(|&r| !self.row_covered[r])
            .flat_map(|r| (0..n).map(move |c| (r, c)))
            .find(|&(r, c)| !self.col_covered[c] && is_zero(self.cost.get(r, c)))
    }

    /// Add the smallest uncovered value to covered rows and subtract it from
    /// uncovered columns. Returns `false` when nothing is uncovered.
    pub fn adjust_by_min_uncovered(&mut self) -> bool {
        let n = self.size();
        let mut min = f64::INFINITY;
        for r in (0..n).filter(|&r| !self.row_covered[r]) {
            for c in (0..n).filter(|&c| !self.col_covered[c]) {
                min = min.min(self.cost.get(r, c));
            }
        }
        if !min.is_finite() {
            return false;
        }
        for r in 0..n {
            for c in 0..n {
                if self.row_covered[r] {
                    self.cost.add(r, c, min);
                }
                if !self.col_covered[c] {
                    self.cost.add(r, c, -min);
                }
            }
        }
        true
    }

    /// Prime the zero at (`row`, `col`). If its row has a star, cover the
    /// row and uncover the star's column; otherwise augment along the
    /// alternating prime/star path and re-cover starred columns.
    pub fn prime(&mut self, row: usize, col: usize) {
        self.prime_in_row[row] = Some(col);
        match self.star_in_row[row] {
            Some(star_col) => {
                self.row_covered[row] = true;
                self.col_covered[star_col] = false;
            }
            None => {
                self.augment_from(row, col);
                self.cover_starred_columns();
            }
        }
    }

    fn augment_from(&mut self, row: usize, col: usize) {
        let mut path = vec![(row, col)];
        loop {
            let (_, c) = path[path.len() - 1];
            let Some(star_row) = self.star_in_col[c] else {
                break;
            };
            path.push((star_row, c));
            let Some(prime_col) = self.prime_in_row[star_row] else {
                break;
            };
            path.push((star_row, prime_col));
        }

        // Odd positions are stars, even positions primes.
        for &(r, c) in path.iter().skip(1).step_by(2) {
            if self.star_in_row[r] == Some(c) {
                self.star_in_row[r] = None;
            }
            if self.star_in_col[c] == Some(r) {
                self.star_in_col[c] = None;
            }
        }
        for &(r, c) in path.iter().step_by(2) {
            self.star_in_row[r] = Some(c);
            self.star_in_col[c] = Some(r);
        }

        self.prime_in_row.fill(None);
    }

    /// Starred cells as `(row, col)`, in row order.
    pub fn starred(&self) -> Vec<(usize, usize)> {
        self.star_in_row
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| (r, c)))
            .collect()
    }

    pub fn run(mut self) -> Vec<(usize, usize)> {
        self.reduce_rows();
        self.reduce_columns();
        self.star_independent_zeros();
        self.cover_starred_columns();

        while !self.all_columns_covered() {
            match self.find_uncovered_zero() {
                Some((row, col)) => self.prime(row, col),
                None => {
                    if !self.adjust_by_min_uncovered() {
                        break;
                    }
                }
            }
        }
        self.starred()
    }
}

/// Minimum-cost one-to-one pairing of rows to columns.
///
/// Rectangular input is padded with dummy rows or columns; pairs touching a
/// dummy index are dropped, so every returned index is in bounds of
/// `matrix`. An empty matrix yields an empty assignment.
pub fn solve_assignment(matrix: &CostMatrix) -> Vec<(usize, usize)> {
    if matrix.is_empty() {
        return Vec::new();
    }
    Munkres::new(matrix.padded_to_square())
        .run()
        .into_iter()
        .filter(|&(r, c)| r < matrix.rows() && c < matrix.cols())
        .collect()
}

pub fn assignment_cost(matrix: &CostMatrix, pairs: &[(usize, usize)]) -> f64 {
    pairs.iter().map(|&(r, c)| matrix.get(r, c)).sum()
}
