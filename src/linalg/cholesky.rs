use alloc::vec;

use crate::linalg::LinalgError;
use crate::matrix::vector::Vector;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

/// Cholesky decomposition in place: A = L * L^T.
///
/// Row-by-row (Cholesky–Banachiewicz) so every inner product runs over two
/// contiguous row prefixes. On return, the lower triangle of `a` (including
/// diagonal) contains L. The strict upper triangle is left unchanged.
///
/// Returns an error if the matrix is not positive definite. Only the lower
/// triangle is read.
pub fn cholesky_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), LinalgError> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "Cholesky decomposition requires a square matrix");

    for i in 0..n {
        for j in 0..=i {
            let dot = {
                let ri = &a.row_as_slice(i, 0)[..j];
                let rj = &a.row_as_slice(j, 0)[..j];
                ri.iter().zip(rj).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
            };
            let sum = *a.get(i, j) - dot;

            if i == j {
                // `!(sum > 0)` also rejects NaN.
                if !(sum > T::zero()) {
                    return Err(LinalgError::NotPositiveDefinite);
                }
                *a.get_mut(i, i) = sum.sqrt();
            } else {
                *a.get_mut(i, j) = sum / *a.get(j, j);
            }
        }
    }

    Ok(())
}

/// Solve L*x = b by forward substitution, where L is lower triangular.
#[inline]
pub fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let row = l.row_as_slice(i, 0);
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - row[j] * x[j];
        }
        x[i] = sum / row[i];
    }
}

/// Solve L^T * x = b by back substitution, where L is lower triangular.
#[inline]
pub fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// # Example
///
/// ```
/// use densedecomp::{Matrix, Vector};
///
/// let a = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let chol = a.cholesky().unwrap();
///
/// let b = Vector::from_slice(&[8.0, 7.0]);
/// let x = chol.solve(&b);
/// assert!((x[0] - 1.25).abs() < 1e-12);
/// assert!((chol.det() - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Cholesky<T> {
    /// Lower triangle holds L; the strict upper triangle is the input's.
    l: Matrix<T>,
}

impl<T: FloatScalar> Cholesky<T> {
    /// Decompose a symmetric positive-definite matrix.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut l = a.clone();
        cholesky_in_place(&mut l)?;
        Ok(Self { l })
    }

    /// Packed factor: L in the lower triangle, untouched input above it.
    pub fn l(&self) -> &Matrix<T> {
        &self.l
    }

    /// Lower triangular factor with zeros above the diagonal.
    pub fn l_full(&self) -> Matrix<T> {
        let n = self.l.nrows();
        Matrix::from_fn(n, n, |i, j| if j <= i { self.l[(i, j)] } else { T::zero() })
    }

    /// Solve A*x = b for x, where A = L·L^T.
    pub fn solve(&self, b: &Vector<T>) -> Vector<T> {
        let n = self.l.nrows();
        assert_eq!(b.len(), n, "rhs length mismatch");
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];
        forward_substitute(&self.l, b.as_slice(), &mut y);
        back_substitute_lt(&self.l, &y, &mut x);
        Vector::from_vec(x)
    }

    /// det(A) = (Π L[i,i])².
    pub fn det(&self) -> T {
        let prod = (0..self.l.nrows()).fold(T::one(), |acc, i| acc * self.l[(i, i)]);
        prod * prod
    }

    /// ln(det(A)) = 2 · Σ ln(L[i,i]); stays finite where `det` would overflow.
    pub fn ln_det(&self) -> T {
        let sum = (0..self.l.nrows()).fold(T::zero(), |acc, i| acc + self.l[(i, i)].ln());
        sum + sum
    }

    /// Matrix inverse from the factorization.
    pub fn inverse(&self) -> Matrix<T> {
        let n = self.l.nrows();
        let mut inv = Matrix::zeros(n, n, T::zero());
        let mut e = vec![T::zero(); n];
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();

            forward_substitute(&self.l, &e, &mut y);
            back_substitute_lt(&self.l, &y, &mut x);

            for (row, &v) in x.iter().enumerate() {
                inv[(row, col)] = v;
            }
        }

        inv
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Cholesky decomposition (`A = L * L^T`).
    ///
    /// Panics if the matrix is not square.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let spd = Matrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
    /// let l = spd.cholesky().unwrap().l_full();
    /// let reconstructed = &l * &l.transpose();
    /// assert!((reconstructed[(0, 1)] - 2.0).abs() < 1e-12);
    /// ```
    pub fn cholesky(&self) -> Result<Cholesky<T>, LinalgError> {
        Cholesky::new(self)
    }
}
