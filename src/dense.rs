//! A matrix that remembers its decompositions.
//!
//! [`DenseMatrix`] owns a [`Matrix`] together with one [`OnDemand`] slot per
//! decomposition. Slots are keyed by a generation counter that every
//! mutation bumps, so a decomposition is computed at most once per matrix
//! value and never served stale.

use alloc::sync::Arc;
use core::fmt;
use core::ops::{Index, IndexMut};

use log::{debug, trace};

use crate::cache::OnDemand;
use crate::linalg::{Cholesky, EigenDecomposition, EigenOptions, LinalgError, Lu, Qr, Svd};
use crate::matrix::vector::Vector;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

/// Log target for cache hits and recomputations.
pub(crate) const CACHE_TARGET: &str = "densedecomp_cache";

type Slot<D> = OnDemand<Result<Arc<D>, LinalgError>>;

/// The cached quantities of a [`DenseMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decomposition {
    Lu,
    Qr,
    Cholesky,
    Svd,
    Eigen,
    Trace,
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decomposition::Lu => "LU",
            Decomposition::Qr => "QR",
            Decomposition::Cholesky => "Cholesky",
            Decomposition::Svd => "SVD",
            Decomposition::Eigen => "eigen",
            Decomposition::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Dense real matrix with lazily computed, automatically invalidated
/// decompositions.
///
/// Each decomposition accessor returns `Result<Arc<D>, LinalgError>`. The
/// first call computes it from a copy of the current data; later calls return
/// the same `Arc` until the matrix is mutated. Failures are cached as well.
///
/// Every mutating entry point ([`set`](Self::set),
/// [`replace_data`](Self::replace_data), [`update`](Self::update),
/// [`set_options`](Self::set_options), `IndexMut`, and
/// [`MatrixMut::get_mut`]) advances the generation, which makes every cached
/// value stale. [`invalidate`](Self::invalidate) also frees them.
///
/// `DenseMatrix` is `Send` but not `Sync`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use densedecomp::{DenseMatrix, Matrix};
///
/// let mut a = DenseMatrix::new(Matrix::from_rows(2, 2, &[4.0_f64, 1.0, 1.0, 3.0]));
///
/// let first = a.eigen().unwrap();
/// let again = a.eigen().unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
///
/// a.set(0, 0, 5.0);
/// let fresh = a.eigen().unwrap();
/// assert!(!Arc::ptr_eq(&first, &fresh));
/// ```
#[derive(Debug)]
pub struct DenseMatrix<T> {
    matrix: Matrix<T>,
    generation: u64,
    options: EigenOptions<T>,
    lu: Slot<Lu<T>>,
    qr: Slot<Qr<T>>,
    cholesky: Slot<Cholesky<T>>,
    svd: Slot<Svd<T>>,
    eigen: Slot<EigenDecomposition<T>>,
    trace: OnDemand<Result<T, LinalgError>>,
}

// ── Construction and access ─────────────────────────────────────────

impl<T: FloatScalar> DenseMatrix<T> {
    /// Wrap a matrix with default eigen options and empty caches.
    pub fn new(matrix: Matrix<T>) -> Self {
        Self::with_options(matrix, EigenOptions::default())
    }

    /// Wrap a matrix with an explicit symmetry policy and iteration budget.
    pub fn with_options(matrix: Matrix<T>, options: EigenOptions<T>) -> Self {
        Self {
            matrix,
            generation: 0,
            options,
            lu: OnDemand::new(),
            qr: OnDemand::new(),
            cholesky: OnDemand::new(),
            svd: OnDemand::new(),
            eigen: OnDemand::new(),
            trace: OnDemand::new(),
        }
    }

    /// Row-major constructor, as [`Matrix::from_rows`].
    pub fn from_rows(nrows: usize, ncols: usize, row_major: &[T]) -> Self {
        Self::new(Matrix::from_rows(nrows, ncols, row_major))
    }
}

impl<T> DenseMatrix<T> {
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    pub fn is_square(&self) -> bool {
        self.matrix.is_square()
    }

    /// The current value.
    pub fn matrix(&self) -> &Matrix<T> {
        &self.matrix
    }

    /// Unwrap into the plain matrix, dropping all caches.
    pub fn into_inner(self) -> Matrix<T> {
        self.matrix
    }

    /// Mutation counter. Cached values are valid only for the generation
    /// they were computed at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn options(&self) -> &EigenOptions<T> {
        &self.options
    }

    /// Change the eigen/SVD policy. Invalidates cached values.
    pub fn set_options(&mut self, options: EigenOptions<T>) {
        self.options = options;
        self.touch();
    }

    /// Set one element. Invalidates cached values.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.matrix[(row, col)] = value;
        self.touch();
    }

    /// Replace the row-major backing data, returning the old buffer.
    /// Invalidates cached values.
    ///
    /// Panics if `data` does not have `nrows * ncols` elements.
    pub fn replace_data(&mut self, data: alloc::vec::Vec<T>) -> alloc::vec::Vec<T> {
        let (nrows, ncols) = self.shape();
        assert_eq!(data.len(), nrows * ncols, "replacement data has the wrong length");
        let old = core::mem::replace(&mut self.matrix, Matrix::from_vec(nrows, ncols, data));
        self.touch();
        old.into_vec()
    }

    /// Mutate the matrix in place through a closure. Invalidates cached
    /// values.
    ///
    /// ```
    /// use densedecomp::DenseMatrix;
    /// let mut a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 0.0, 0.0, 1.0]);
    /// let g = a.generation();
    /// a.update(|m| m.swap_rows(0, 1));
    /// assert!(a.generation() > g);
    /// assert_eq!(a[(0, 1)], 1.0);
    /// ```
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Matrix<T>) -> R) -> R {
        let out = f(&mut self.matrix);
        self.touch();
        out
    }

    /// Drop every cached value and advance the generation.
    pub fn invalidate(&mut self) {
        self.lu.reset();
        self.qr.reset();
        self.cholesky.reset();
        self.svd.reset();
        self.eigen.reset();
        self.trace.reset();
        self.touch();
    }

    /// Whether `which` is cached for the current value.
    pub fn is_cached(&self, which: Decomposition) -> bool {
        let g = self.generation;
        match which {
            Decomposition::Lu => self.lu.is_cached(g),
            Decomposition::Qr => self.qr.is_cached(g),
            Decomposition::Cholesky => self.cholesky.is_cached(g),
            Decomposition::Svd => self.svd.is_cached(g),
            Decomposition::Eigen => self.eigen.is_cached(g),
            Decomposition::Trace => self.trace.is_cached(g),
        }
    }

    #[inline]
    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn require_square(&self) -> Result<(), LinalgError> {
        if self.is_square() {
            Ok(())
        } else {
            Err(LinalgError::NotSquare {
                rows: self.nrows(),
                cols: self.ncols(),
            })
        }
    }

    /// Serve `slot` for the current generation, computing it with `factory`
    /// on a miss.
    fn cached<D: Clone>(&self, slot: &OnDemand<D>, which: Decomposition, factory: impl FnOnce() -> D) -> D {
        let generation = self.generation;
        if slot.is_cached(generation) {
            trace!(target: CACHE_TARGET, "{} cache hit at generation {}", which, generation);
        }
        slot.compute(generation, || {
            debug!(
                target: CACHE_TARGET,
                "computing {} of {}x{} matrix at generation {}",
                which,
                self.nrows(),
                self.ncols(),
                generation
            );
            factory()
        })
    }
}

// ── Cached decompositions ───────────────────────────────────────────

impl<T: FloatScalar> DenseMatrix<T> {
    /// LU decomposition with partial pivoting.
    ///
    /// Fails with `NotSquare` for rectangular matrices and `Singular` for a
    /// (numerically) singular one.
    pub fn lu(&self) -> Result<Arc<Lu<T>>, LinalgError> {
        self.cached(&self.lu, Decomposition::Lu, || {
            self.require_square()?;
            Ok(Arc::new(Lu::new(&self.matrix)?))
        })
    }

    /// Householder QR. Fails with `NotSquare` when the matrix has fewer rows
    /// than columns.
    pub fn qr(&self) -> Result<Arc<Qr<T>>, LinalgError> {
        self.cached(&self.qr, Decomposition::Qr, || {
            if self.nrows() < self.ncols() {
                return Err(LinalgError::NotSquare {
                    rows: self.nrows(),
                    cols: self.ncols(),
                });
            }
            Ok(Arc::new(Qr::new(&self.matrix)?))
        })
    }

    /// Cholesky decomposition of a symmetric positive-definite matrix.
    pub fn cholesky(&self) -> Result<Arc<Cholesky<T>>, LinalgError> {
        self.cached(&self.cholesky, Decomposition::Cholesky, || {
            self.require_square()?;
            Ok(Arc::new(Cholesky::new(&self.matrix)?))
        })
    }

    /// Singular value decomposition, bounded by the configured iteration
    /// budget.
    pub fn svd(&self) -> Result<Arc<Svd<T>>, LinalgError> {
        self.cached(&self.svd, Decomposition::Svd, || {
            Ok(Arc::new(Svd::with_budget(&self.matrix, self.options.budget)?))
        })
    }

    /// Eigen-decomposition under the configured [`EigenOptions`].
    pub fn eigen(&self) -> Result<Arc<EigenDecomposition<T>>, LinalgError> {
        self.cached(&self.eigen, Decomposition::Eigen, || {
            self.require_square()?;
            Ok(Arc::new(EigenDecomposition::with_options(&self.matrix, &self.options)?))
        })
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> Result<T, LinalgError> {
        self.cached(&self.trace, Decomposition::Trace, || {
            self.require_square()?;
            Ok(self.matrix.trace())
        })
    }
}

// ── Derived operations ──────────────────────────────────────────────

impl<T: FloatScalar> DenseMatrix<T> {
    /// Solve `A x = b`: through the cached LU for square `A`, or as a
    /// least-squares problem through the cached QR when `A` has more rows
    /// than columns.
    ///
    /// ```
    /// use densedecomp::{DenseMatrix, Vector};
    /// // Fit y = c0 + c1*x to (0,1), (1,2), (2,4)
    /// let a = DenseMatrix::from_rows(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]);
    /// let x = a.solve(&Vector::from_slice(&[1.0, 2.0, 4.0])).unwrap();
    /// assert!((x[1] - 1.5).abs() < 1e-12);
    /// ```
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>, LinalgError> {
        if b.len() != self.nrows() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.nrows(),
                got: b.len(),
            });
        }
        if self.is_square() {
            Ok(self.lu()?.solve(b))
        } else {
            Ok(self.qr()?.solve(b))
        }
    }

    /// Inverse through the cached LU.
    pub fn inverse(&self) -> Result<Matrix<T>, LinalgError> {
        Ok(self.lu()?.inverse())
    }

    /// Determinant through the cached LU; a singular matrix yields 0.
    pub fn determinant(&self) -> Result<T, LinalgError> {
        match self.lu() {
            Ok(lu) => Ok(lu.det()),
            Err(LinalgError::Singular) => Ok(T::zero()),
            Err(e) => Err(e),
        }
    }

    /// Effective numerical rank from the cached SVD.
    pub fn rank(&self) -> Result<usize, LinalgError> {
        Ok(self.svd()?.rank())
    }

    /// Two-norm condition number from the cached SVD.
    pub fn condition(&self) -> Result<T, LinalgError> {
        Ok(self.svd()?.condition())
    }

    /// Two-norm (largest singular value) from the cached SVD.
    pub fn norm2(&self) -> Result<T, LinalgError> {
        Ok(self.svd()?.norm2())
    }
}

// ── Trait impls ─────────────────────────────────────────────────────

impl<T: FloatScalar> From<Matrix<T>> for DenseMatrix<T> {
    fn from(matrix: Matrix<T>) -> Self {
        Self::new(matrix)
    }
}

impl<T: FloatScalar> Clone for DenseMatrix<T> {
    /// Copies the value and options; the clone starts with empty caches.
    fn clone(&self) -> Self {
        Self::with_options(self.matrix.clone(), self.options)
    }
}

impl<T: PartialEq> PartialEq for DenseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
    }
}

impl<T: fmt::Display> fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.matrix, f)
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.matrix[idx]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        self.touch();
        &mut self.matrix[idx]
    }
}

impl<T> MatrixRef<T> for DenseMatrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        &self.matrix[(row, col)]
    }

    #[inline]
    fn row_as_slice(&self, row: usize, col_start: usize) -> &[T] {
        self.matrix.row_as_slice(row, col_start)
    }
}

impl<T> MatrixMut<T> for DenseMatrix<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        self.touch();
        &mut self.matrix[(row, col)]
    }

    #[inline]
    fn row_as_mut_slice(&mut self, row: usize, col_start: usize) -> &mut [T] {
        self.touch();
        self.matrix.row_as_mut_slice(row, col_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DenseMatrix<f64> {
        DenseMatrix::from_rows(3, 3, &[4.0, 1.0, 2.0, 1.0, 3.0, 0.0, 2.0, 0.0, 5.0])
    }

    #[test]
    fn decompositions_are_computed_once() {
        let a = sample();
        assert!(!a.is_cached(Decomposition::Lu));
        let lu1 = a.lu().unwrap();
        assert!(a.is_cached(Decomposition::Lu));
        let lu2 = a.lu().unwrap();
        assert!(Arc::ptr_eq(&lu1, &lu2));

        let s1 = a.svd().unwrap();
        let s2 = a.svd().unwrap();
        assert!(Arc::ptr_eq(&s1, &s2));
        assert!(!a.is_cached(Decomposition::Eigen));
    }

    fn check(a: &mut DenseMatrix<f64>, mutate: &dyn Fn(&mut DenseMatrix<f64>)) {
        a.eigen().unwrap();
        a.trace().unwrap();
        assert!(a.is_cached(Decomposition::Eigen));
        mutate(a);
        assert!(!a.is_cached(Decomposition::Eigen));
        assert!(!a.is_cached(Decomposition::Trace));
    }

    #[test]
    fn every_mutation_path_invalidates() {
        let mut a = sample();
        check(&mut a, &|m| m.set(0, 0, 4.0));
        check(&mut a, &|m| m[(1, 1)] = 3.0);
        check(&mut a, &|m| *m.get_mut(2, 2) = 5.0);
        check(&mut a, &|m| m.row_as_mut_slice(0, 0)[0] = 4.0);
        check(&mut a, &|m| m.update(|_| ()));
        check(&mut a, &|m| {
            m.replace_data(alloc::vec![4.0, 1.0, 2.0, 1.0, 3.0, 0.0, 2.0, 0.0, 5.0]);
        });
        check(&mut a, &|m| m.set_options(EigenOptions::default()));
        check(&mut a, &|m| m.invalidate());
    }

    #[test]
    fn results_follow_mutation() {
        let mut a = sample();
        assert_eq!(a.trace().unwrap(), 12.0);
        a.set(2, 2, 10.0);
        assert_eq!(a.trace().unwrap(), 17.0);
    }

    #[test]
    fn failures_are_cached() {
        let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
        assert_eq!(a.cholesky().unwrap_err(), LinalgError::NotPositiveDefinite);
        assert!(a.is_cached(Decomposition::Cholesky));
        assert_eq!(a.cholesky().unwrap_err(), LinalgError::NotPositiveDefinite);
    }

    #[test]
    fn shape_errors() {
        let a = DenseMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let not_square = LinalgError::NotSquare { rows: 2, cols: 3 };
        assert_eq!(a.lu().unwrap_err(), not_square);
        assert_eq!(a.eigen().unwrap_err(), not_square);
        assert_eq!(a.trace().unwrap_err(), not_square);
        assert_eq!(a.determinant().unwrap_err(), not_square);
        assert_eq!(a.qr().unwrap_err(), not_square);
        assert_eq!(a.rank().unwrap(), 2);

        let b = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(
            a.solve(&b).unwrap_err(),
            LinalgError::DimensionMismatch { expected: 2, got: 3 }
        );
    }

    #[test]
    fn singular_determinant_is_zero() {
        let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
        assert_eq!(a.determinant().unwrap(), 0.0);
        assert_eq!(a.inverse().unwrap_err(), LinalgError::Singular);
        assert_eq!(a.rank().unwrap(), 1);
    }

    #[test]
    fn clone_starts_cold() {
        let a = sample();
        a.lu().unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert!(a.is_cached(Decomposition::Lu));
        assert!(!b.is_cached(Decomposition::Lu));
    }

    #[test]
    fn dense_matrix_is_send() {
        fn assert_send<S: Send>() {}
        assert_send::<DenseMatrix<f64>>();
    }
}
