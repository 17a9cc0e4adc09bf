use crate::traits::{FloatScalar, Scalar};

use super::vector::Vector;
use super::Matrix;

impl<T: Scalar> Matrix<T> {
    /// Sum of diagonal elements.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(m.trace(), 5.0);
    /// ```
    pub fn trace(&self) -> T {
        let n = self.nrows.min(self.ncols);
        let mut sum = T::zero();
        for i in 0..n {
            sum = sum + self[(i, i)];
        }
        sum
    }

    /// Extract the diagonal as a `Vector`.
    pub fn diag(&self) -> Vector<T> {
        let n = self.nrows.min(self.ncols);
        Vector::from_vec((0..n).map(|i| self[(i, i)]).collect())
    }

    /// Create a square diagonal matrix from a slice.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_diag(&[2.0, 3.0]);
    /// assert_eq!(m[(0, 0)], 2.0);
    /// assert_eq!(m[(1, 1)], 3.0);
    /// assert_eq!(m[(0, 1)], 0.0);
    /// ```
    pub fn from_diag(d: &[T]) -> Self {
        let n = d.len();
        let mut m = Self::zeros(n, n, T::zero());
        for (i, &x) in d.iter().enumerate() {
            m[(i, i)] = x;
        }
        m
    }

    /// Exact symmetry test: `a[i][j] == a[j][i]` for every pair.
    ///
    /// Non-square matrices are never symmetric.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let sym = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 3.0]);
    /// assert!(sym.is_symmetric());
    /// ```
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.nrows;
        for i in 0..n {
            for j in (i + 1)..n {
                if self[(i, j)] != self[(j, i)] {
                    return false;
                }
            }
        }
        true
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Symmetry test with a relative tolerance:
    /// `|a[i][j] - a[j][i]| <= tol * max(1, |a[i][j]|, |a[j][i]|)`.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[1.0_f64, 0.1 + 0.2, 0.3, 1.0]);
    /// assert!(!a.is_symmetric());
    /// assert!(a.is_symmetric_within(1e-12));
    /// ```
    pub fn is_symmetric_within(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        let n = self.nrows;
        for i in 0..n {
            for j in (i + 1)..n {
                let a = self[(i, j)];
                let b = self[(j, i)];
                let scale = T::one().max(a.abs()).max(b.abs());
                if !((a - b).abs() <= tol * scale) {
                    return false;
                }
            }
        }
        true
    }
}
