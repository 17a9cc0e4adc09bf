use alloc::vec;

use crate::linalg::{g, IterationBudget, LinalgError, Sweeps};
use crate::matrix::vector::Vector;
use crate::numeric::{hypot, relative_accuracy, with_sign_of};
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// Householder tridiagonalization of a symmetric matrix.
///
/// On entry `v` holds the matrix; only its lower triangle is read. On return:
/// - `d[0..n]` is the diagonal of the tridiagonal matrix
/// - `e[1..n]` is the sub-diagonal (`e[i]` couples `d[i-1]` and `d[i]`),
///   `e[0] = 0`
/// - `v` holds the orthogonal transform Q with `Qᵀ A Q = T`
///
/// Each Householder vector is built from the row scaled by the sum of its
/// absolute values, so tiny or huge entries neither underflow nor overflow.
pub fn tred2<T: FloatScalar>(v: &mut impl MatrixMut<T>, d: &mut [T], e: &mut [T]) {
    let n = v.nrows();
    assert_eq!(n, v.ncols(), "tred2 requires a square matrix");
    assert_eq!(d.len(), n, "d length must equal the matrix order");
    assert_eq!(e.len(), n, "e length must equal the matrix order");
    if n == 0 {
        return;
    }

    for j in 0..n {
        d[j] = g(v, n - 1, j);
    }

    for i in (1..n).rev() {
        let mut scale = T::zero();
        let mut h = T::zero();
        for &dk in &d[..i] {
            scale = scale + dk.abs();
        }

        if scale == T::zero() {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = g(v, i - 1, j);
                *v.get_mut(i, j) = T::zero();
                *v.get_mut(j, i) = T::zero();
            }
        } else {
            for dk in &mut d[..i] {
                *dk = *dk / scale;
                h = h + *dk * *dk;
            }
            let f = d[i - 1];
            let mut gg = h.sqrt();
            if f > T::zero() {
                gg = -gg;
            }
            e[i] = scale * gg;
            h = h - f * gg;
            d[i - 1] = f - gg;
            for ej in &mut e[..i] {
                *ej = T::zero();
            }

            // e = A·u over the active block, using the lower triangle only.
            for j in 0..i {
                let f = d[j];
                *v.get_mut(j, i) = f;
                let mut gj = e[j] + g(v, j, j) * f;
                for k in (j + 1)..i {
                    gj = gj + g(v, k, j) * d[k];
                    e[k] = e[k] + g(v, k, j) * f;
                }
                e[j] = gj;
            }

            let mut f = T::zero();
            for j in 0..i {
                e[j] = e[j] / h;
                f = f + e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] = e[j] - hh * d[j];
            }

            for j in 0..i {
                let f = d[j];
                let gj = e[j];
                for k in j..i {
                    *v.get_mut(k, j) = g(v, k, j) - (f * e[k] + gj * d[k]);
                }
                d[j] = g(v, i - 1, j);
                *v.get_mut(i, j) = T::zero();
            }
        }
        d[i] = h;
    }

    // Accumulate the transformations.
    for i in 0..(n - 1) {
        *v.get_mut(n - 1, i) = g(v, i, i);
        *v.get_mut(i, i) = T::one();
        let h = d[i + 1];
        if h != T::zero() {
            for k in 0..=i {
                d[k] = g(v, k, i + 1) / h;
            }
            for j in 0..=i {
                let mut s = T::zero();
                for k in 0..=i {
                    s = s + g(v, k, i + 1) * g(v, k, j);
                }
                for k in 0..=i {
                    *v.get_mut(k, j) = g(v, k, j) - s * d[k];
                }
            }
        }
        for k in 0..=i {
            *v.get_mut(k, i + 1) = T::zero();
        }
    }
    for j in 0..n {
        d[j] = g(v, n - 1, j);
        *v.get_mut(n - 1, j) = T::zero();
    }
    *v.get_mut(n - 1, n - 1) = T::one();
    e[0] = T::zero();
}

/// Implicit QL iteration on a symmetric tridiagonal matrix.
///
/// Takes `d` / `e` in the layout produced by [`tred2`] and the transform
/// accumulated so far in `v`. On success `d` holds the eigenvalues in
/// ascending order, the columns of `v` the matching eigenvectors, and `e` is
/// zeroed.
///
/// Each implicit QL sweep counts against `budget`.
pub fn tql2<T: FloatScalar>(
    d: &mut [T],
    e: &mut [T],
    v: &mut impl MatrixMut<T>,
    budget: IterationBudget,
) -> Result<(), LinalgError> {
    let n = d.len();
    assert_eq!(e.len(), n, "e length must equal d length");
    assert_eq!(v.ncols(), n, "v must have one column per eigenvalue");
    if n == 0 {
        return Ok(());
    }
    let rows = v.nrows();
    let eps = relative_accuracy::<T>();
    let two = T::one() + T::one();
    let mut sweeps = Sweeps::new(budget, n, "tql2");

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = T::zero();

    let mut f = T::zero();
    let mut tst1 = T::zero();
    for l in 0..n {
        // Find a negligible sub-diagonal element.
        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut m = l;
        while m < n - 1 && !(e[m].abs() <= eps * tst1) {
            m += 1;
        }

        if m > l {
            loop {
                sweeps.step()?;

                // Shift from the leading 2×2.
                let gl = d[l];
                let mut p = (d[l + 1] - gl) / (two * e[l]);
                let mut r = with_sign_of(hypot(p, T::one()), p);
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let h = gl - d[l];
                for di in &mut d[(l + 2)..] {
                    *di = *di - h;
                }
                f = f + h;

                // Implicit QL sweep.
                p = d[m];
                let mut c = T::one();
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = T::zero();
                let mut s2 = T::zero();
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    let gi = c * e[i];
                    let hi = c * p;
                    r = hypot(p, e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * gi;
                    d[i + 1] = hi + s * (c * gi + s * d[i]);

                    for k in 0..rows {
                        let vk = g(v, k, i + 1);
                        *v.get_mut(k, i + 1) = s * g(v, k, i) + c * vk;
                        *v.get_mut(k, i) = c * g(v, k, i) - s * vk;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if !(e[l].abs() > eps * tst1) {
                    break;
                }
            }
        }
        d[l] = d[l] + f;
        e[l] = T::zero();
    }

    sort_eigen_with_vecs(d, v);
    Ok(())
}

/// Sort eigenvalues ascending and permute eigenvector columns.
fn sort_eigen_with_vecs<T: FloatScalar>(d: &mut [T], v: &mut impl MatrixMut<T>) {
    let n = d.len();
    let rows = v.nrows();
    for i in 0..n {
        let mut min_idx = i;
        for j in (i + 1)..n {
            if d[j] < d[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            d.swap(i, min_idx);
            for row in 0..rows {
                let tmp = g(v, row, i);
                *v.get_mut(row, i) = g(v, row, min_idx);
                *v.get_mut(row, min_idx) = tmp;
            }
        }
    }
}

/// Eigen-decomposition of a real symmetric matrix: `A = V diag(λ) Vᵀ`.
///
/// Eigenvalues are ascending and `V` is orthogonal.
///
/// # Example
///
/// ```
/// use densedecomp::Matrix;
/// use densedecomp::linalg::{IterationBudget, SymmetricEigen};
///
/// let a = Matrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let eig = SymmetricEigen::new(&a, IterationBudget::default()).unwrap();
/// assert!((eig.eigenvalues()[0] - 1.0).abs() < 1e-12);
/// assert!((eig.eigenvalues()[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricEigen<T> {
    eigenvalues: Vector<T>,
    eigenvectors: Matrix<T>,
}

impl<T: FloatScalar> SymmetricEigen<T> {
    /// Decompose a symmetric matrix. Only the lower triangle is read.
    ///
    /// Panics if `a` is not square.
    pub fn new(a: &Matrix<T>, budget: IterationBudget) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "symmetric eigen-decomposition requires a square matrix");
        let n = a.nrows();
        let mut v = a.clone();
        let mut d = vec![T::zero(); n];
        let mut e = vec![T::zero(); n];
        tred2(&mut v, &mut d, &mut e);
        tql2(&mut d, &mut e, &mut v, budget)?;
        Ok(Self {
            eigenvalues: Vector::from_vec(d),
            eigenvectors: v,
        })
    }

    /// Decompose a symmetric tridiagonal matrix given its diagonal `d` and
    /// sub-diagonal `e`, where `e[i]` couples `d[i-1]` and `d[i]` and `e[0]`
    /// is ignored.
    ///
    /// ```
    /// use densedecomp::linalg::{IterationBudget, SymmetricEigen};
    ///
    /// // [[2, 1], [1, 2]]
    /// let eig = SymmetricEigen::from_tridiagonal(&[2.0_f64, 2.0], &[0.0, 1.0], IterationBudget::default())
    ///     .unwrap();
    /// assert!((eig.eigenvalues()[1] - 3.0).abs() < 1e-12);
    /// ```
    pub fn from_tridiagonal(d: &[T], e: &[T], budget: IterationBudget) -> Result<Self, LinalgError> {
        let n = d.len();
        assert_eq!(e.len(), n, "sub-diagonal length must equal diagonal length");
        let mut d = d.to_vec();
        let mut e = e.to_vec();
        if n > 0 {
            e[0] = T::zero();
        }
        let mut v = Matrix::eye(n, T::zero());
        tql2(&mut d, &mut e, &mut v, budget)?;
        Ok(Self {
            eigenvalues: Vector::from_vec(d),
            eigenvectors: v,
        })
    }

    /// Eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> &Vector<T> {
        &self.eigenvalues
    }

    /// Orthonormal eigenvectors, one per column, in eigenvalue order.
    pub fn eigenvectors(&self) -> &Matrix<T> {
        &self.eigenvectors
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Symmetric eigen-decomposition with the default iteration budget.
    ///
    /// The matrix is assumed symmetric; only its lower triangle is read.
    pub fn eig_symmetric(&self) -> Result<SymmetricEigen<T>, LinalgError> {
        SymmetricEigen::new(self, IterationBudget::default())
    }
}
