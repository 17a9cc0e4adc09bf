use alloc::vec;
use alloc::vec::Vec;

use crate::linalg::{g, IterationBudget, LinalgError, Sweeps};
use crate::matrix::vector::Vector;
use crate::numeric::{hypot, relative_accuracy, tiny};
use crate::traits::{FloatScalar, MatrixMut};
use crate::Matrix;

/// Apply the plane rotation `[c, s; -s, c]` to columns `j` and `k`:
/// `col_j ← c·col_j + s·col_k`, `col_k ← c·col_k − s·col_j`.
#[inline]
fn rotate_cols<T: FloatScalar>(m: &mut impl MatrixMut<T>, j: usize, k: usize, c: T, s: T) {
    for i in 0..m.nrows() {
        let t = c * g(m, i, j) + s * g(m, i, k);
        *m.get_mut(i, k) = c * g(m, i, k) - s * g(m, i, j);
        *m.get_mut(i, j) = t;
    }
}

#[inline]
fn swap_cols<T: FloatScalar>(m: &mut impl MatrixMut<T>, j: usize, k: usize) {
    for i in 0..m.nrows() {
        let t = g(m, i, j);
        *m.get_mut(i, j) = g(m, i, k);
        *m.get_mut(i, k) = t;
    }
}

/// Golub–Kahan SVD of a tall matrix (`m >= n`), consuming `a` as workspace.
///
/// Returns `(U, σ, V)` with `U` m×n, `σ` of length n (non-negative,
/// descending) and `V` n×n.
fn svd_tall<T: FloatScalar>(
    mut a: Matrix<T>,
    budget: IterationBudget,
) -> Result<(Matrix<T>, Vec<T>, Matrix<T>), LinalgError> {
    let m = a.nrows();
    let n = a.ncols();
    debug_assert!(m >= n);

    let mut s = vec![T::zero(); n];
    let mut e = vec![T::zero(); n];
    let mut work = vec![T::zero(); m];
    let mut u = Matrix::zeros(m, n, T::zero());
    let mut v = Matrix::zeros(n, n, T::zero());
    if n == 0 {
        return Ok((u, s, v));
    }

    // ── Bidiagonalization ───────────────────────────────────────────
    //
    // Householder reflections from the left zero the sub-diagonal part of
    // each column (into U); from the right they zero each row beyond the
    // super-diagonal (into V).

    let nct = (m - 1).min(n);
    let nrt = n.saturating_sub(2);
    for k in 0..nct.max(nrt) {
        if k < nct {
            s[k] = T::zero();
            for i in k..m {
                s[k] = hypot(s[k], a[(i, k)]);
            }
            if s[k] != T::zero() {
                if a[(k, k)] < T::zero() {
                    s[k] = -s[k];
                }
                for i in k..m {
                    a[(i, k)] = a[(i, k)] / s[k];
                }
                a[(k, k)] = a[(k, k)] + T::one();
            }
            s[k] = -s[k];
        }
        for j in (k + 1)..n {
            if k < nct && s[k] != T::zero() {
                let mut t = T::zero();
                for i in k..m {
                    t = t + a[(i, k)] * a[(i, j)];
                }
                t = -t / a[(k, k)];
                for i in k..m {
                    a[(i, j)] = a[(i, j)] + t * a[(i, k)];
                }
            }
            // Row k of A, to be reduced by the right reflector.
            e[j] = a[(k, j)];
        }
        if k < nct {
            for i in k..m {
                u[(i, k)] = a[(i, k)];
            }
        }
        if k < nrt {
            e[k] = T::zero();
            for i in (k + 1)..n {
                e[k] = hypot(e[k], e[i]);
            }
            if e[k] != T::zero() {
                if e[k + 1] < T::zero() {
                    e[k] = -e[k];
                }
                let ek = e[k];
                for ei in &mut e[(k + 1)..] {
                    *ei = *ei / ek;
                }
                e[k + 1] = e[k + 1] + T::one();
            }
            e[k] = -e[k];
            if k + 1 < m && e[k] != T::zero() {
                for wi in &mut work[(k + 1)..] {
                    *wi = T::zero();
                }
                for j in (k + 1)..n {
                    for i in (k + 1)..m {
                        work[i] = work[i] + e[j] * a[(i, j)];
                    }
                }
                for j in (k + 1)..n {
                    let t = -e[j] / e[k + 1];
                    for i in (k + 1)..m {
                        a[(i, j)] = a[(i, j)] + t * work[i];
                    }
                }
            }
            for i in (k + 1)..n {
                v[(i, k)] = e[i];
            }
        }
    }

    // Final bidiagonal matrix of order p = n.
    let mut p = n;
    if nct < n {
        s[nct] = a[(nct, nct)];
    }
    if nrt + 1 < p {
        e[nrt] = a[(nrt, p - 1)];
    }
    e[p - 1] = T::zero();

    // Generate U.
    for j in nct..n {
        for i in 0..m {
            u[(i, j)] = T::zero();
        }
        u[(j, j)] = T::one();
    }
    for k in (0..nct).rev() {
        if s[k] != T::zero() {
            for j in (k + 1)..n {
                let mut t = T::zero();
                for i in k..m {
                    t = t + u[(i, k)] * u[(i, j)];
                }
                t = -t / u[(k, k)];
                for i in k..m {
                    u[(i, j)] = u[(i, j)] + t * u[(i, k)];
                }
            }
            for i in k..m {
                u[(i, k)] = -u[(i, k)];
            }
            u[(k, k)] = T::one() + u[(k, k)];
            for i in 0..k {
                u[(i, k)] = T::zero();
            }
        } else {
            for i in 0..m {
                u[(i, k)] = T::zero();
            }
            u[(k, k)] = T::one();
        }
    }

    // Generate V.
    for k in (0..n).rev() {
        if k < nrt && e[k] != T::zero() {
            for j in (k + 1)..n {
                let mut t = T::zero();
                for i in (k + 1)..n {
                    t = t + v[(i, k)] * v[(i, j)];
                }
                t = -t / v[(k + 1, k)];
                for i in (k + 1)..n {
                    v[(i, j)] = v[(i, j)] + t * v[(i, k)];
                }
            }
        }
        for i in 0..n {
            v[(i, k)] = T::zero();
        }
        v[(k, k)] = T::one();
    }

    // ── Implicit-shift QR on the bidiagonal ─────────────────────────

    let eps = relative_accuracy::<T>();
    let tiny = tiny::<T>();
    let two = T::one() + T::one();
    let mut sweeps = Sweeps::new(budget, n, "svd");

    while p > 0 {
        // Find the lowest negligible super-diagonal element above s[p-1]:
        // after the search e[kk-1] is negligible (or kk == 0).
        let mut kk = p - 1;
        while kk > 0 {
            let j = kk - 1;
            if e[j].abs() <= tiny + eps * (s[j].abs() + s[j + 1].abs()) {
                e[j] = T::zero();
                break;
            }
            kk -= 1;
        }

        if kk == p - 1 {
            // s[p-1] has converged: make it non-negative and order it.
            let mut k = kk;
            if s[k] <= T::zero() {
                s[k] = if s[k] < T::zero() { -s[k] } else { T::zero() };
                for i in 0..n {
                    v[(i, k)] = -v[(i, k)];
                }
            }
            while k + 1 < n && s[k] < s[k + 1] {
                s.swap(k, k + 1);
                swap_cols(&mut v, k, k + 1);
                swap_cols(&mut u, k, k + 1);
                k += 1;
            }
            p -= 1;
            continue;
        }

        // Look for a negligible diagonal element in s[kk..p].
        let mut split = None;
        for ks in (kk..p).rev() {
            let mut t = e[ks].abs();
            if ks != kk {
                t = t + e[ks - 1].abs();
            }
            if s[ks].abs() <= tiny + eps * t {
                s[ks] = T::zero();
                split = Some(ks);
                break;
            }
        }

        match split {
            Some(ks) if ks == p - 1 => {
                // Negligible s[p-1]: chase e[p-2] out through V.
                let k = kk;
                let mut f = e[p - 2];
                e[p - 2] = T::zero();
                for j in (k..=(p - 2)).rev() {
                    let t = hypot(s[j], f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] = cs * e[j - 1];
                    }
                    rotate_cols(&mut v, j, p - 1, cs, sn);
                }
            }
            Some(ks) => {
                // Negligible s[ks]: split, chasing e[ks] out through U.
                let k = ks + 1;
                let mut f = e[k - 1];
                e[k - 1] = T::zero();
                for j in k..p {
                    let t = hypot(s[j], f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] = cs * e[j];
                    rotate_cols(&mut u, j, k - 1, cs, sn);
                }
            }
            None => {
                sweeps.step()?;
                let k = kk;

                // Shift from the trailing 2×2 of BᵀB, computed on scaled values.
                let scale = s[p - 1]
                    .abs()
                    .max(s[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(s[k].abs())
                    .max(e[k].abs());
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / two;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = T::zero();
                if b != T::zero() || c != T::zero() {
                    shift = (b * b + c).sqrt();
                    if b < T::zero() {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut gg = sk * ek;

                // Chase the bulge down the bidiagonal.
                for j in k..(p - 1) {
                    let t = hypot(f, gg);
                    let cs = f / t;
                    let sn = gg / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    gg = sn * s[j + 1];
                    s[j + 1] = cs * s[j + 1];
                    rotate_cols(&mut v, j, j + 1, cs, sn);

                    let t = hypot(f, gg);
                    let cs = f / t;
                    let sn = gg / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    gg = sn * e[j + 1];
                    e[j + 1] = cs * e[j + 1];
                    rotate_cols(&mut u, j, j + 1, cs, sn);
                }
                e[p - 2] = f;
            }
        }
    }

    Ok((u, s, v))
}

/// Singular value decomposition `A = U Σ Vᵀ` of an `m × n` matrix.
///
/// With `p = min(m, n)`: `U` is `m × p` with orthonormal columns, `Σ` holds
/// `p` non-negative singular values in descending order, and `V` is `n × n`
/// when `m ≥ n` or `n × p` when `m < n`. Wide inputs are decomposed through
/// their transpose.
///
/// # Example
///
/// ```
/// use densedecomp::Matrix;
///
/// let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// let svd = a.svd().unwrap();
/// assert!((svd.singular_values()[0] - 5.0).abs() < 1e-12);
/// assert!(svd.singular_values()[1].abs() < 1e-12);
/// assert_eq!(svd.rank(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Svd<T> {
    u: Matrix<T>,
    sigma: Vector<T>,
    v: Matrix<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: FloatScalar> Svd<T> {
    /// Decompose with the default iteration budget.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        Self::with_budget(a, IterationBudget::default())
    }

    /// Decompose with an explicit cap on the number of QR steps.
    pub fn with_budget(a: &Matrix<T>, budget: IterationBudget) -> Result<Self, LinalgError> {
        let (nrows, ncols) = a.shape();
        let (u, sigma, v) = if nrows >= ncols {
            svd_tall(a.clone(), budget)?
        } else {
            let (ut, sigma, vt) = svd_tall(a.transpose(), budget)?;
            (vt, sigma, ut)
        };
        Ok(Self {
            u,
            sigma: Vector::from_vec(sigma),
            v,
            nrows,
            ncols,
        })
    }

    /// Singular values, non-negative and descending.
    pub fn singular_values(&self) -> &Vector<T> {
        &self.sigma
    }

    /// Left singular vectors `U` (`m × p`).
    pub fn u(&self) -> &Matrix<T> {
        &self.u
    }

    /// Alias for [`u`](Self::u).
    pub fn left_singular_vectors(&self) -> &Matrix<T> {
        &self.u
    }

    /// Right singular vectors `V`.
    pub fn v(&self) -> &Matrix<T> {
        &self.v
    }

    /// Alias for [`v`](Self::v).
    pub fn right_singular_vectors(&self) -> &Matrix<T> {
        &self.v
    }

    /// `Σ` as a `p × p` diagonal matrix.
    pub fn s(&self) -> Matrix<T> {
        Matrix::from_diag(self.sigma.as_slice())
    }

    /// Two-norm: the largest singular value (0 for an empty matrix).
    pub fn norm2(&self) -> T {
        if self.sigma.is_empty() {
            T::zero()
        } else {
            self.sigma[0]
        }
    }

    /// Two-norm condition number `σ_max / σ_min`.
    ///
    /// Infinite when the smallest singular value is zero; 1 for an empty
    /// matrix.
    pub fn condition(&self) -> T {
        let p = self.sigma.len();
        if p == 0 {
            return T::one();
        }
        let smin = self.sigma[p - 1];
        if smin == T::zero() {
            T::infinity()
        } else {
            self.sigma[0] / smin
        }
    }

    /// Effective numerical rank: singular values above
    /// `max(m, n) · σ_max · ε`.
    pub fn rank(&self) -> usize {
        let dim = T::from(self.nrows.max(self.ncols)).unwrap_or_else(T::infinity);
        self.rank_with_tolerance(dim * self.norm2() * relative_accuracy::<T>())
    }

    /// Number of singular values strictly greater than `tol`.
    pub fn rank_with_tolerance(&self, tol: T) -> usize {
        self.sigma.iter().filter(|&&s| s > tol).count()
    }
}

impl<T: FloatScalar> Matrix<T> {
    /// Singular value decomposition with the default iteration budget.
    pub fn svd(&self) -> Result<Svd<T>, LinalgError> {
        Svd::new(self)
    }

    /// Singular values only.
    pub fn singular_values(&self) -> Result<Vector<T>, LinalgError> {
        Ok(Svd::new(self)?.sigma)
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

    fn assert_orthonormal_cols(q: &Matrix<f64>, what: &str) {
        let qtq = &q.transpose() * q;
        for i in 0..q.ncols() {
            for j in 0..q.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_near(qtq[(i, j)], expected, TOL, &format!("{}ᵀ{}[({},{})]", what, what, i, j));
            }
        }
    }

    fn verify(a: &Matrix<f64>) -> Svd<f64> {
        let (m, n) = a.shape();
        let p = m.min(n);
        let svd = a.svd().unwrap();
        assert_eq!(svd.u().shape(), (m, p));
        assert_eq!(svd.singular_values().len(), p);
        assert_orthonormal_cols(svd.u(), "U");
        assert_orthonormal_cols(svd.v(), "V");

        for i in 1..p {
            assert!(svd.singular_values()[i - 1] >= svd.singular_values()[i]);
        }
        assert!(svd.singular_values().iter().all(|&s| s >= 0.0));

        // A = U Σ Vᵀ over the first p columns of V.
        let vp = svd.v().submatrix(0, 0, n, p);
        let recon = &(svd.u() * &svd.s()) * &vp.transpose();
        for i in 0..m {
            for j in 0..n {
                assert_near(recon[(i, j)], a[(i, j)], 1e-9, &format!("UΣVᵀ[({},{})]", i, j));
            }
        }
        svd
    }

    #[test]
    fn rank_one() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
        let svd = verify(&a);
        assert_near(svd.singular_values()[0], 5.0, TOL, "σ0");
        assert_near(svd.singular_values()[1], 0.0, TOL, "σ1");
        assert_eq!(svd.rank(), 1);
        assert!(svd.condition() > 1e14);
        assert_near(svd.norm2(), 5.0, TOL, "norm2");
    }

    #[test]
    fn diagonal_sorted() {
        let a = Matrix::from_diag(&[1.0_f64, -3.0, 2.0]);
        let svd = verify(&a);
        assert_eq!(svd.singular_values().as_slice(), &[3.0, 2.0, 1.0]);
        assert_near(svd.condition(), 3.0, TOL, "cond");
        assert_eq!(svd.rank(), 3);
    }

    #[test]
    fn tall_4x3() {
        let a = Matrix::from_rows(
            4,
            3,
            &[1.0_f64, -1.0, 4.0, 1.0, 4.0, -2.0, 1.0, 4.0, 2.0, 1.0, -1.0, 0.0],
        );
        let svd = verify(&a);
        assert_eq!(svd.v().shape(), (3, 3));
        let fro: f64 = svd.singular_values().iter().map(|s| s * s).sum();
        assert_near(fro.sqrt(), a.frobenius_norm(), 1e-9, "Σσ² = ‖A‖F²");
    }

    #[test]
    fn wide_2x4() {
        let a = Matrix::from_rows(2, 4, &[1.0_f64, 2.0, 0.0, -1.0, 3.0, -1.0, 2.0, 1.0]);
        let svd = verify(&a);
        assert_eq!(svd.v().shape(), (4, 2));

        let svd_t = a.transpose().svd().unwrap();
        for i in 0..2 {
            assert_near(svd.singular_values()[i], svd_t.singular_values()[i], TOL, "σ(A) = σ(Aᵀ)");
        }
    }

    #[test]
    fn single_column_and_row() {
        let col = Matrix::from_rows(3, 1, &[3.0_f64, 0.0, -4.0]);
        let svd = verify(&col);
        assert_near(svd.singular_values()[0], 5.0, TOL, "σ col");

        let row = col.transpose();
        let svd = verify(&row);
        assert_near(svd.singular_values()[0], 5.0, TOL, "σ row");
    }

    #[test]
    fn one_by_one_negative() {
        let svd = verify(&Matrix::from_rows(1, 1, &[-2.5_f64]));
        assert_eq!(svd.singular_values()[0], 2.5);
        assert_eq!(svd.u()[(0, 0)] * svd.v()[(0, 0)], -1.0);
    }

    #[test]
    fn empty_shapes() {
        let svd = Matrix::zeros(0, 0, 0.0_f64).svd().unwrap();
        assert!(svd.singular_values().is_empty());
        assert_eq!(svd.norm2(), 0.0);
        assert_eq!(svd.condition(), 1.0);
        assert_eq!(svd.rank(), 0);

        let svd = Matrix::zeros(3, 0, 0.0_f64).svd().unwrap();
        assert_eq!(svd.u().shape(), (3, 0));
        assert_eq!(svd.v().shape(), (0, 0));

        let svd = Matrix::zeros(0, 3, 0.0_f64).svd().unwrap();
        assert_eq!(svd.u().shape(), (0, 0));
        assert_eq!(svd.v().shape(), (3, 0));
    }

    #[test]
    fn zero_matrix() {
        let svd = verify(&Matrix::zeros(3, 2, 0.0_f64));
        assert_eq!(svd.rank(), 0);
        assert!(svd.condition().is_infinite());
    }

    #[test]
    fn exhausted_budget() {
        let a = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let err = Svd::with_budget(&a, IterationBudget::PerValue(0)).unwrap_err();
        assert_eq!(err, LinalgError::ConvergenceFailure);
    }

    #[test]
    fn f32_support() {
        let a = Matrix::from_rows(2, 2, &[3.0_f32, 0.0, 4.0, 5.0]);
        let sv = a.singular_values().unwrap();
        // σ² are the eigenvalues of AᵀA = [[25, 20], [20, 25]]
        assert!((sv[0] - 45.0_f32.sqrt()).abs() < 1e-4);
        assert!((sv[1] - 5.0_f32.sqrt()).abs() < 1e-4);
    }
}
