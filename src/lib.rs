//! # densedecomp
//!
//! Dense real-matrix decompositions with a lazy, invalidation-aware cache.
//! Pure Rust, no-std compatible (requires `alloc`).
//!
//! ## Quick start
//!
//! ```
//! use densedecomp::{DenseMatrix, Vector};
//!
//! let mut a = DenseMatrix::from_rows(3, 3, &[
//!     2.0_f64, 1.0, 0.0,
//!     1.0, 3.0, 1.0,
//!     0.0, 1.0, 4.0,
//! ]);
//!
//! // Computed on first request, shared afterwards.
//! let eig = a.eigen().unwrap();
//! assert!(eig.is_symmetric());
//! assert!(std::sync::Arc::ptr_eq(&eig, &a.eigen().unwrap()));
//!
//! // Any mutation drops every cached result.
//! a[(0, 0)] = 5.0;
//! assert!(!a.is_cached(densedecomp::Decomposition::Eigen));
//!
//! let x = a.solve(&Vector::from_slice(&[6.0, 5.0, 5.0])).unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: Heap-allocated, row-major `Matrix<T>` with runtime
//!   dimensions, plus [`Vector<T>`]. Arithmetic, indexing, norms, transpose,
//!   sub-matrix extraction.
//!
//! - [`linalg`]: Decompositions. Free functions (`tred2`, `tql2`, `orthes`,
//!   `hqr2`, `lu_in_place`, `qr_in_place`, `cholesky_in_place`) work in place on
//!   any `&mut impl MatrixMut<T>`; wrapper structs ([`EigenDecomposition`],
//!   [`Svd`], [`Lu`], [`Qr`], [`Cholesky`]) own their results. Iterative
//!   solvers honour an [`IterationBudget`] and report
//!   [`LinalgError::ConvergenceFailure`] when it runs out.
//!
//! - [`dense`]: [`DenseMatrix<T>`], a matrix that computes each
//!   decomposition at most once per state of its data and forgets them all
//!   when the data changes.
//!
//! - [`cache`]: [`cache::OnDemand`], the generation-stamped single-value slot
//!   the dense wrapper is built from.
//!
//! - [`numeric`]: Floating-point helpers: overflow-safe `hypot`, machine
//!   epsilon and the smallest safe divisor.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`]: real floats (`Scalar + Float`), used by every decomposition
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for algorithms
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade under two
//! targets: `densedecomp_cache` (computations and cache hits) and
//! `densedecomp_convergence` (exhausted iteration budgets).
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Hardware FPU via system libm |
//! | `libm`    | baseline | Pure-Rust software float fallback |
//! | `complex` | no       | `Complex<T>` view of eigenvalues via `num-complex` |
//! | `all`     | no       | All features: `std` + `complex` |

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cache;
pub mod dense;
pub mod linalg;
pub mod matrix;
pub mod numeric;
pub mod traits;

pub use dense::{Decomposition, DenseMatrix};
pub use linalg::{
    Cholesky, EigenDecomposition, EigenOptions, IterationBudget, LinalgError, Lu, Qr, Svd,
    SymmetricEigen, Symmetry,
};
pub use matrix::{Matrix, Vector};
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

#[cfg(feature = "complex")]
pub use num_complex::Complex;
