use alloc::vec;
use alloc::vec::Vec;

use crate::linalg::{g, singular_threshold, LinalgError};
use crate::matrix::vector::Vector;
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// QR decomposition in place using Householder reflections.
///
/// On return, `a` contains the packed QR factorization:
/// - Upper triangle (including diagonal): R
/// - Lower triangle (excluding diagonal): Householder vectors (scaled so the
///   leading entry is an implicit 1)
///
/// `tau` is filled with the Householder scalar factors (length N).
///
/// Works on rectangular matrices (M >= N).
/// Returns `LinalgError::Singular` if a column's remaining norm falls to
/// `max(m, n) * eps * max|a_ij|` or below.
pub fn qr_in_place<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    tau: &mut [T],
) -> Result<(), LinalgError> {
    let m = a.nrows();
    let n = a.ncols();
    assert!(m >= n, "QR decomposition requires M >= N");
    assert_eq!(tau.len(), n, "tau length must equal the column count");

    let tol = singular_threshold(a);

    for col in 0..n {
        let mut norm_sq = T::zero();
        for i in col..m {
            let v = g(a, i, col);
            norm_sq = norm_sq + v * v;
        }

        let norm = norm_sq.sqrt();
        if norm <= tol {
            return Err(LinalgError::Singular);
        }

        // sigma = sign(a[col,col]) * ||x|| keeps v0 = a + sigma free of cancellation.
        let a_cc = g(a, col, col);
        let sigma = if a_cc < T::zero() { -norm } else { norm };

        let v0 = a_cc + sigma;
        let tau_val = v0 / sigma;
        tau[col] = tau_val;

        for i in (col + 1)..m {
            *a.get_mut(i, col) = g(a, i, col) / v0;
        }

        // A[col:m, col+1:n] -= tau * v * (v^T A)
        for j in (col + 1)..n {
            let mut dot = g(a, col, j);
            for i in (col + 1)..m {
                dot = dot + g(a, i, col) * g(a, i, j);
            }
            dot = dot * tau_val;

            *a.get_mut(col, j) = g(a, col, j) - dot;
            for i in (col + 1)..m {
                *a.get_mut(i, j) = g(a, i, j) - dot * g(a, i, col);
            }
        }

        *a.get_mut(col, col) = -sigma;
    }

    Ok(())
}

/// Householder QR decomposition of an `M × N` matrix with `M >= N`.
///
/// # Example
///
/// ```
/// use densedecomp::{Matrix, Vector};
///
/// // Least-squares fit: y = c0 + c1*x to points (0,1), (1,2), (2,4)
/// let a = Matrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
/// let b = Vector::from_slice(&[1.0, 2.0, 4.0]);
/// let x = a.qr().unwrap().solve(&b);
/// assert!((x[0] - 5.0 / 6.0).abs() < 1e-10);
/// assert!((x[1] - 3.0 / 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Qr<T> {
    qr: Matrix<T>,
    tau: Vec<T>,
}

impl<T: FloatScalar> Qr<T> {
    /// Decompose a matrix. Returns an error if a column is rank-deficient.
    ///
    /// Panics if `a` has fewer rows than columns.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        assert!(a.nrows() >= a.ncols(), "QR decomposition requires M >= N");
        let mut qr = a.clone();
        let mut tau = vec![T::zero(); a.ncols()];
        qr_in_place(&mut qr, &mut tau)?;
        Ok(Self { qr, tau })
    }

    /// Upper-triangular R factor (N × N).
    pub fn r(&self) -> Matrix<T> {
        let n = self.qr.ncols();
        Matrix::from_fn(n, n, |i, j| if i <= j { self.qr[(i, j)] } else { T::zero() })
    }

    /// Thin Q factor (M × N, orthonormal columns).
    ///
    /// Applies the reflections in reverse to the first N columns of the
    /// identity.
    pub fn q(&self) -> Matrix<T> {
        let m = self.qr.nrows();
        let n = self.qr.ncols();
        let mut q = Matrix::zeros(m, n, T::zero());
        for i in 0..n {
            q[(i, i)] = T::one();
        }

        for col in (0..n).rev() {
            let tau_val = self.tau[col];
            for j in col..n {
                let mut dot = q[(col, j)];
                for i in (col + 1)..m {
                    dot = dot + self.qr[(i, col)] * q[(i, j)];
                }
                dot = dot * tau_val;

                q[(col, j)] = q[(col, j)] - dot;
                for i in (col + 1)..m {
                    q[(i, j)] = q[(i, j)] - dot * self.qr[(i, col)];
                }
            }
        }

        q
    }

    /// Least-squares solution of `min ||Ax - b||`: `x = R^{-1} Q^T b`.
    ///
    /// Panics if `b.len() != M`.
    pub fn solve(&self, b: &Vector<T>) -> Vector<T> {
        let m = self.qr.nrows();
        let n = self.qr.ncols();
        assert_eq!(b.len(), m, "rhs length mismatch");
        let mut qtb = b.as_slice().to_vec();

        for col in 0..n {
            let tau_val = self.tau[col];
            let mut dot = qtb[col];
            for i in (col + 1)..m {
                dot = dot + self.qr[(i, col)] * qtb[i];
            }
            dot = dot * tau_val;

            qtb[col] = qtb[col] - dot;
            for i in (col + 1)..m {
                qtb[i] = qtb[i] - dot * self.qr[(i, col)];
            }
        }

        let mut x = vec![T::zero(); n];
        for i in (0..n).rev() {
            let mut sum = qtb[i];
            for j in (i + 1)..n {
                sum = sum - self.qr[(i, j)] * x[j];
            }
            x[i] = sum / self.qr[(i, i)];
        }

        Vector::from_vec(x)
    }

    /// Determinant of the original matrix (square only).
    ///
    /// Each stored reflection contributes a factor of `-1`.
    pub fn det(&self) -> T {
        let n = self.qr.ncols();
        assert_eq!(self.qr.nrows(), n, "determinant requires a square matrix");
        let mut d = if n % 2 == 0 { T::one() } else { -T::one() };
        for i in 0..n {
            d = d * self.qr[(i, i)];
        }
        d
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// QR decomposition using Householder reflections.
    pub fn qr(&self) -> Result<Qr<T>, LinalgError> {
        Qr::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    const TOL: f64 = 1e-10;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    #[test]
    fn qr_square_3x3() {
        let a = Matrix::from_rows(3, 3, &[12.0_f64, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0]);
        let qr = a.qr().unwrap();
        let q = qr.q();
        let r = qr.r();

        let prod = &q * &r;
        let qtq = &q.transpose() * &q;
        for i in 0..3 {
            for j in 0..3 {
                assert_near(prod[(i, j)], a[(i, j)], TOL, &format!("QR[({},{})]", i, j));
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_near(qtq[(i, j)], expected, TOL, &format!("QtQ[({},{})]", i, j));
            }
        }
    }

    #[test]
    fn qr_rectangular_4x3() {
        let a = Matrix::from_rows(
            4,
            3,
            &[1.0_f64, -1.0, 4.0, 1.0, 4.0, -2.0, 1.0, 4.0, 2.0, 1.0, -1.0, 0.0],
        );
        let qr = a.qr().unwrap();
        let q = qr.q();
        assert_eq!(q.shape(), (4, 3));
        let prod = &q * &qr.r();
        for i in 0..4 {
            for j in 0..3 {
                assert_near(prod[(i, j)], a[(i, j)], TOL, &format!("QR[({},{})]", i, j));
            }
        }
    }

    #[test]
    fn qr_least_squares_residual_orthogonal() {
        let a = Matrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = Vector::from_slice(&[1.0, 2.0, 4.0]);
        let x = a.qr().unwrap().solve(&b);

        let ax = a.mul_vec(&x);
        let r = Vector::from_vec((0..3).map(|i| b[i] - ax[i]).collect());
        let atr = a.transpose().mul_vec(&r);
        for i in 0..2 {
            assert_near(atr[i], 0.0, TOL, &format!("A^T r[{}]", i));
        }
    }

    #[test]
    fn qr_det_matches_lu() {
        let a = Matrix::from_rows(3, 3, &[6.0_f64, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0]);
        assert_near(a.qr().unwrap().det(), a.det(), TOL, "det");

        let b = Matrix::from_rows(2, 2, &[3.0_f64, 8.0, 4.0, 6.0]);
        assert_near(b.qr().unwrap().det(), -14.0, TOL, "det 2x2");
    }

    #[test]
    fn qr_rank_deficient() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 0.0, 0.0, 0.0]);
        assert_eq!(a.qr().unwrap_err(), LinalgError::Singular);
    }

    #[test]
    fn qr_small_but_well_conditioned() {
        // Column norms of 1e-9 are far below epsilon squared, yet the matrix
        // is perfectly conditioned.
        let a = Matrix::from_rows(3, 2, &[1e-9_f64, 0.0, 0.0, 1e-9, 0.0, 0.0]);
        let b = Vector::from_slice(&[1e-9, 1e-9, 0.0]);
        let x = a.qr().unwrap().solve(&b);
        assert_near(x[0], 1.0, TOL, "x0");
        assert_near(x[1], 1.0, TOL, "x1");

        let tiny = Matrix::from_rows(2, 2, &[1e-200_f64, 0.0, 0.0, 1e-200]);
        assert!(tiny.qr().is_ok());
    }

    #[test]
    fn qr_parallel_small_columns() {
        let a = Matrix::from_rows(3, 2, &[1e-9_f64, 3e-9, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(a.qr().unwrap_err(), LinalgError::Singular);
    }

    #[test]
    #[should_panic(expected = "M >= N")]
    fn qr_wide_panics() {
        let _ = Matrix::zeros(2, 3, 0.0_f64).qr();
    }
}
