use crate::numeric::hypot;
use crate::traits::FloatScalar;

use super::vector::Vector;
use super::Matrix;

// ── Vector norms ────────────────────────────────────────────────────

impl<T: FloatScalar> Vector<T> {
    /// L2 (Euclidean) norm, accumulated with [`hypot`] so it cannot overflow.
    ///
    /// ```
    /// use densedecomp::Vector;
    /// let v = Vector::from_slice(&[3.0_f64, 4.0]);
    /// assert!((v.norm() - 5.0).abs() < 1e-12);
    /// ```
    pub fn norm(&self) -> T {
        self.iter().fold(T::zero(), |acc, &x| hypot(acc, x))
    }

    /// L1 norm (sum of absolute values).
    pub fn norm_l1(&self) -> T {
        self.iter().fold(T::zero(), |acc, &x| acc + x.abs())
    }

    /// Largest absolute entry (0 for an empty vector).
    pub fn norm_max(&self) -> T {
        self.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }
}

// ── Matrix norms ────────────────────────────────────────────────────

impl<T: FloatScalar> Matrix<T> {
    /// Frobenius norm.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
    /// assert!((m.frobenius_norm() - 30.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| hypot(acc, x))
    }

    /// Infinity norm (maximum absolute row sum).
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0_f64, -2.0, 3.0, 4.0]);
    /// assert!((m.norm_inf() - 7.0).abs() < 1e-12);
    /// ```
    pub fn norm_inf(&self) -> T {
        let mut max = T::zero();
        for i in 0..self.nrows {
            let row = &self.data[i * self.ncols..(i + 1) * self.ncols];
            let row_sum = row.iter().fold(T::zero(), |acc, &x| acc + x.abs());
            max = max.max(row_sum);
        }
        max
    }

    /// One norm (maximum absolute column sum).
    pub fn norm_one(&self) -> T {
        let mut max = T::zero();
        for j in 0..self.ncols {
            let mut col_sum = T::zero();
            for i in 0..self.nrows {
                col_sum = col_sum + self[(i, j)].abs();
            }
            max = max.max(col_sum);
        }
        max
    }

    /// Largest absolute entry.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_norms() {
        let v = Vector::from_slice(&[1.0_f64, -2.0, 2.0]);
        assert!((v.norm() - 3.0).abs() < 1e-12);
        assert!((v.norm_l1() - 5.0).abs() < 1e-12);
        assert_eq!(v.norm_max(), 2.0);
    }

    #[test]
    fn norm_does_not_overflow() {
        let v = Vector::from_slice(&[1e200_f64, 1e200]);
        assert!(v.norm().is_finite());
    }

    #[test]
    fn matrix_norms() {
        let m = Matrix::from_rows(2, 2, &[1.0_f64, -2.0, 3.0, 4.0]);
        assert!((m.norm_inf() - 7.0).abs() < 1e-12);
        assert!((m.norm_one() - 6.0).abs() < 1e-12);
        assert_eq!(m.max_abs(), 4.0);
    }

    #[test]
    fn empty_norms() {
        let m = Matrix::zeros(0, 0, 0.0_f64);
        assert_eq!(m.frobenius_norm(), 0.0);
        assert_eq!(m.norm_inf(), 0.0);
    }
}
