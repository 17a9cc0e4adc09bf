use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use crate::traits::Scalar;

use super::vector::Vector;
use super::Matrix;

// ── Map / transpose ─────────────────────────────────────────────────

impl<T: Copy> Matrix<T> {
    /// Apply a function to every element, producing a new matrix.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, 4.0, 9.0, 16.0]);
    /// let r = m.map(|x: f64| x.sqrt());
    /// assert_eq!(r[(0, 0)], 1.0);
    /// assert_eq!(r[(1, 1)], 4.0);
    /// ```
    pub fn map<U>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        let data: Vec<U> = self.data.iter().map(|&x| f(x)).collect();
        Matrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    /// Transpose: (M×N) → (N×M).
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let a = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = a.transpose();
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t[(2, 0)], 3.0);
    /// ```
    pub fn transpose(&self) -> Self {
        let n = self.ncols;
        Matrix::from_fn(self.ncols, self.nrows, |i, j| self.data[j * n + i])
    }

    /// Swap two columns in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a != b {
            for i in 0..self.nrows {
                let base = i * self.ncols;
                self.data.swap(base + a, base + b);
            }
        }
    }
}

impl<T> Matrix<T> {
    /// Swap two rows in place.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let mut m = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// m.swap_rows(0, 1);
    /// assert_eq!(m[(0, 0)], 3.0);
    /// assert_eq!(m[(1, 0)], 1.0);
    /// ```
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a != b {
            let n = self.ncols;
            for j in 0..n {
                self.data.swap(a * n + j, b * n + j);
            }
        }
    }
}

// ── Row / Column access ─────────────────────────────────────────────

impl<T: Scalar> Matrix<T> {
    /// Extract row `i` as a `Vector`.
    pub fn row(&self, i: usize) -> Vector<T> {
        assert!(i < self.nrows, "row {} out of range for {} rows", i, self.nrows);
        Vector::from_slice(&self.data[i * self.ncols..(i + 1) * self.ncols])
    }

    /// Extract column `j` as a `Vector`.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// let c = m.col(1);
    /// assert_eq!(c.as_slice(), &[2.0, 4.0]);
    /// ```
    pub fn col(&self, j: usize) -> Vector<T> {
        assert!(j < self.ncols, "column {} out of range for {} columns", j, self.ncols);
        let data = (0..self.nrows).map(|i| self.data[i * self.ncols + j]).collect();
        Vector::from_vec(data)
    }

    /// Set row `i` from a `Vector`.
    pub fn set_row(&mut self, i: usize, v: &Vector<T>) {
        assert_eq!(v.len(), self.ncols, "vector length mismatch");
        self.data[i * self.ncols..(i + 1) * self.ncols].copy_from_slice(v.as_slice());
    }

    /// Set column `j` from a `Vector`.
    pub fn set_col(&mut self, j: usize, v: &Vector<T>) {
        assert_eq!(v.len(), self.nrows, "vector length mismatch");
        for i in 0..self.nrows {
            self[(i, j)] = v[i];
        }
    }

    /// Copy of the block `rows × cols` starting at `(row0, col0)`.
    pub fn submatrix(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> Self {
        assert!(
            row0 + rows <= self.nrows && col0 + cols <= self.ncols,
            "block {}x{} at ({}, {}) exceeds {}x{} matrix",
            rows,
            cols,
            row0,
            col0,
            self.nrows,
            self.ncols,
        );
        Matrix::from_fn(rows, cols, |i, j| self[(row0 + i, col0 + j)])
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.nrows;
        let n = self.ncols;

        let mut widths: Vec<usize> = alloc::vec![0; n];
        for i in 0..m {
            for (j, w) in widths.iter_mut().enumerate() {
                let len = WriteCounting::count(|wc| write!(wc, "{}", self[(i, j)]));
                *w = (*w).max(len);
            }
        }

        for i in 0..m {
            write!(f, "│")?;
            for j in 0..n {
                if j > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:>width$}", self[(i, j)], width = widths[j])?;
            }
            write!(f, "│")?;
            if i + 1 < m {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

struct WriteCounting {
    count: usize,
}

impl WriteCounting {
    fn count(f: impl FnOnce(&mut Self) -> fmt::Result) -> usize {
        let mut wc = WriteCounting { count: 0 };
        let _ = f(&mut wc);
        wc.count
    }
}

impl fmt::Write for WriteCounting {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.count += s.chars().count();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn map_type_change() {
        let m = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let rounded = m.map(|x| x as i32);
        assert_eq!(rounded[(0, 0)], 1);
        assert_eq!(rounded[(1, 1)], 4);
    }

    #[test]
    fn transpose_roundtrip() {
        let a = Matrix::from_fn(3, 5, |i, j| (i * 10 + j) as f64);
        let t = a.transpose();
        assert_eq!(t.shape(), (5, 3));
        assert_eq!(t[(4, 2)], a[(2, 4)]);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn swap_cols() {
        let mut m = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        m.swap_cols(0, 2);
        assert_eq!(m.as_slice(), &[3.0, 2.0, 1.0, 6.0, 5.0, 4.0]);
    }

    #[test]
    fn row_col() {
        let m = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(1).as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.col(1).as_slice(), &[2.0, 5.0]);
    }

    #[test]
    fn set_row_col() {
        let mut m = Matrix::zeros(2, 2, 0.0_f64);
        m.set_row(0, &Vector::from_slice(&[1.0, 2.0]));
        m.set_col(1, &Vector::from_slice(&[7.0, 8.0]));
        assert_eq!(m.as_slice(), &[1.0, 7.0, 0.0, 8.0]);
    }

    #[test]
    fn submatrix() {
        let m = Matrix::from_fn(4, 4, |i, j| (i * 4 + j) as f64);
        let s = m.submatrix(1, 2, 2, 2);
        assert_eq!(s.as_slice(), &[6.0, 7.0, 10.0, 11.0]);
    }

    #[test]
    fn display_alignment() {
        let m = Matrix::from_rows(2, 2, &[1.0, 100.0, 1000.0, 2.0]);
        let s = format!("{}", m);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }
}
