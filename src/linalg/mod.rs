//! Dense decompositions of real matrices.
//!
//! Each decomposition is available two ways: an in-place free function that
//! works on any [`MatrixMut`] (for callers managing their own storage), and a
//! wrapper struct that copies its input and owns the result ([`Lu`], [`Qr`],
//! [`Cholesky`], [`SymmetricEigen`], [`EigenDecomposition`], [`Svd`]).
//!
//! Iterative decompositions (symmetric and general eigen, SVD) take an
//! [`IterationBudget`]; when it runs out they return
//! [`LinalgError::ConvergenceFailure`] instead of looping forever.

pub(crate) mod cholesky;
pub(crate) mod eigen;
pub(crate) mod hessenberg;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod schur;
pub(crate) mod svd;
pub(crate) mod symmetric_eigen;

pub use cholesky::{cholesky_in_place, Cholesky};
pub use eigen::EigenDecomposition;
pub use hessenberg::orthes;
pub use lu::{lu_in_place, lu_solve, Lu};
pub use qr::{qr_in_place, Qr};
pub use schur::{cdiv, hqr2};
pub use svd::Svd;
pub use symmetric_eigen::{tql2, tred2, SymmetricEigen};

use crate::numeric::relative_accuracy;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// Log target for iteration-budget exhaustion.
pub(crate) const CONVERGENCE_TARGET: &str = "densedecomp_convergence";

/// Read an element by value.
#[inline]
pub(crate) fn g<T: Copy>(m: &impl MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Pivot magnitude at or below which a factorization of `a` is treated as
/// singular: `max(m, n) * eps * max|a_ij|`.
///
/// Scaling by the largest entry keeps the test invariant under a uniform
/// rescaling of the matrix.
pub(crate) fn singular_threshold<T: FloatScalar>(a: &impl MatrixRef<T>) -> T {
    let mut max_abs = T::zero();
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            max_abs = max_abs.max(g(a, i, j).abs());
        }
    }
    let dim = T::from(a.nrows().max(a.ncols())).unwrap_or_else(T::one);
    dim * relative_accuracy::<T>() * max_abs
}

/// Get mutable references to sub-row slices of two different rows
/// simultaneously. Requires `row_a != row_b`.
///
/// Returns `(a_slice, b_slice)` where:
/// - `a_slice = &mut m[row_a, col_start..ncols]`
/// - `b_slice = &mut m[row_b, col_start..ncols]`
#[inline]
pub(crate) fn split_two_row_slices<'a, T>(
    m: &'a mut impl MatrixMut<T>,
    row_a: usize,
    row_b: usize,
    col_start: usize,
) -> (&'a mut [T], &'a mut [T]) {
    assert_ne!(row_a, row_b);
    // Safety: distinct rows of a row-major matrix never overlap, and
    // MatrixMut guarantees row slices are contiguous.
    let ptr: *mut _ = m;
    let a = unsafe { &mut *ptr }.row_as_mut_slice(row_a, col_start);
    let b = unsafe { &mut *ptr }.row_as_mut_slice(row_b, col_start);
    (a, b)
}

/// Errors from linear algebra operations.
///
/// ```
/// use densedecomp::Matrix;
/// use densedecomp::linalg::LinalgError;
///
/// let singular = Matrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(singular.lu().unwrap_err(), LinalgError::Singular);
///
/// let not_pd = Matrix::from_rows(2, 2, &[1.0_f64, 5.0, 5.0, 1.0]);
/// assert_eq!(not_pd.cholesky().unwrap_err(), LinalgError::NotPositiveDefinite);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// Matrix is singular or nearly singular.
    Singular,
    /// Matrix is not positive definite (required for Cholesky).
    NotPositiveDefinite,
    /// Iterative algorithm did not converge within the iteration budget.
    ConvergenceFailure,
    /// Operation requires a square matrix.
    NotSquare { rows: usize, cols: usize },
    /// Right-hand side length does not match the matrix.
    DimensionMismatch { expected: usize, got: usize },
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular"),
            LinalgError::NotPositiveDefinite => write!(f, "matrix is not positive definite"),
            LinalgError::ConvergenceFailure => write!(f, "iterative algorithm did not converge"),
            LinalgError::NotSquare { rows, cols } => {
                write!(f, "operation requires a square matrix, got {}x{}", rows, cols)
            }
            LinalgError::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected length {}, got {}", expected, got)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}

/// How a square matrix is classified as symmetric before choosing an
/// eigen-decomposition pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Symmetry<T> {
    /// Bitwise comparison `a[i][j] == a[j][i]`.
    #[default]
    Exact,
    /// `|a[i][j] - a[j][i]| <= tol * max(1, |a[i][j]|, |a[j][i]|)`.
    ///
    /// The symmetric pipeline then reads only the lower triangle.
    Within(T),
}

impl<T: FloatScalar> Symmetry<T> {
    /// Apply the policy to a matrix.
    pub fn test(&self, a: &crate::Matrix<T>) -> bool {
        match *self {
            Symmetry::Exact => a.is_symmetric(),
            Symmetry::Within(tol) => a.is_symmetric_within(tol),
        }
    }
}

/// Cap on the number of iterations of an iterative decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationBudget {
    /// At most `k * max(n, 1)` sweeps in total for an `n`-sized problem.
    PerValue(usize),
    /// Iterate until convergence, however long that takes.
    Unbounded,
}

impl Default for IterationBudget {
    fn default() -> Self {
        IterationBudget::PerValue(100)
    }
}

impl IterationBudget {
    /// Total sweep limit for a problem of size `n`, or `None` when unbounded.
    pub fn limit(&self, n: usize) -> Option<usize> {
        match *self {
            IterationBudget::PerValue(k) => Some(k.saturating_mul(n.max(1))),
            IterationBudget::Unbounded => None,
        }
    }
}

/// Runtime policy for eigen and singular value decompositions.
///
/// ```
/// use densedecomp::linalg::{EigenOptions, IterationBudget, Symmetry};
///
/// let opts = EigenOptions::default()
///     .with_symmetry(Symmetry::Within(1e-12_f64))
///     .with_budget(IterationBudget::Unbounded);
/// assert_eq!(opts.budget, IterationBudget::Unbounded);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenOptions<T> {
    pub symmetry: Symmetry<T>,
    pub budget: IterationBudget,
}

impl<T> Default for EigenOptions<T> {
    fn default() -> Self {
        Self {
            symmetry: Symmetry::Exact,
            budget: IterationBudget::default(),
        }
    }
}

impl<T> EigenOptions<T> {
    pub fn with_symmetry(mut self, symmetry: Symmetry<T>) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn with_budget(mut self, budget: IterationBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// Counts sweeps of an iterative kernel against its budget.
pub(crate) struct Sweeps {
    taken: usize,
    limit: Option<usize>,
    kernel: &'static str,
}

impl Sweeps {
    pub(crate) fn new(budget: IterationBudget, n: usize, kernel: &'static str) -> Self {
        Self {
            taken: 0,
            limit: budget.limit(n),
            kernel,
        }
    }

    /// Record one sweep; fails once the budget is exceeded.
    pub(crate) fn step(&mut self) -> Result<(), LinalgError> {
        self.taken += 1;
        match self.limit {
            Some(limit) if self.taken > limit => {
                log::warn!(
                    target: CONVERGENCE_TARGET,
                    "{} did not converge within {} sweeps",
                    self.kernel,
                    limit
                );
                Err(LinalgError::ConvergenceFailure)
            }
            _ => Ok(()),
        }
    }
}
