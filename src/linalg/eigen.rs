use alloc::vec;
#[cfg(feature = "complex")]
use alloc::vec::Vec;

use crate::linalg::hessenberg::orthes;
use crate::linalg::schur::hqr2;
use crate::linalg::symmetric_eigen::{tql2, tred2};
use crate::linalg::{EigenOptions, LinalgError};
use crate::matrix::vector::Vector;
use num_traits::ToPrimitive;

use crate::traits::FloatScalar;
use crate::Matrix;

/// Eigenvalues and eigenvectors of a real square matrix.
///
/// Symmetric input (as judged by [`EigenOptions::symmetry`]) goes through
/// Householder tridiagonalization and implicit QL: eigenvalues are real and
/// ascending, `V` is orthogonal and `A = V D Vᵀ`.
///
/// Otherwise the matrix is reduced to Hessenberg form and then to real Schur
/// form by the Francis double-shift QR iteration. `A V = V D` holds, where
/// `D` is block diagonal ([`block_diagonal`](Self::block_diagonal)):
/// real eigenvalues are 1×1 blocks, a complex pair `λ ± iμ` is the 2×2
/// block `[[λ, μ], [-μ, λ]]`. The columns of `V` for that pair hold the real
/// and imaginary parts of the eigenvector. `V` may be badly conditioned or
/// even singular for defective matrices.
///
/// # Example
///
/// ```
/// use densedecomp::Matrix;
///
/// // 90° rotation: eigenvalues ±i
/// let rot = Matrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
/// let eig = rot.eigen().unwrap();
/// assert!(!eig.is_symmetric());
/// let (re, im) = eig.eigenvalues();
/// assert!(re[0].abs() < 1e-12 && re[1].abs() < 1e-12);
/// assert!((im[0] - 1.0).abs() < 1e-12);
/// assert!((im[1] + 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct EigenDecomposition<T> {
    symmetric: bool,
    real: Vector<T>,
    imag: Vector<T>,
    vectors: Matrix<T>,
}

impl<T: FloatScalar> EigenDecomposition<T> {
    /// Decompose with the default options: exact symmetry test and the
    /// default iteration budget.
    ///
    /// Panics if `a` is not square.
    pub fn new(a: &Matrix<T>) -> Result<Self, LinalgError> {
        Self::with_options(a, &EigenOptions::default())
    }

    /// Decompose with an explicit symmetry policy and iteration budget.
    ///
    /// Panics if `a` is not square.
    pub fn with_options(a: &Matrix<T>, options: &EigenOptions<T>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "eigen-decomposition requires a square matrix");
        let n = a.nrows();
        let symmetric = options.symmetry.test(a);

        let mut d = vec![T::zero(); n];
        let mut e = vec![T::zero(); n];
        let vectors = if symmetric {
            let mut v = a.clone();
            tred2(&mut v, &mut d, &mut e);
            tql2(&mut d, &mut e, &mut v, options.budget)?;
            v
        } else {
            // The double-shift step squares entries of H, so bring the
            // largest entry near 1 first. A power of two scales exactly.
            let scale = unit_scale(a);
            let mut h = match scale {
                Some(s) => a * (T::one() / s),
                None => a.clone(),
            };
            let mut v = Matrix::zeros(n, n, T::zero());
            orthes(&mut h, &mut v);
            hqr2(&mut d, &mut e, &mut h, &mut v, options.budget)?;
            if let Some(s) = scale {
                d.iter_mut().chain(e.iter_mut()).for_each(|x| *x = *x * s);
            }
            v
        };

        Ok(Self {
            symmetric,
            real: Vector::from_vec(d),
            imag: Vector::from_vec(e),
            vectors,
        })
    }

    /// Whether the symmetric pipeline was used.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn real_eigenvalues(&self) -> &Vector<T> {
        &self.real
    }

    /// Imaginary parts; all zero on the symmetric path.
    pub fn imag_eigenvalues(&self) -> &Vector<T> {
        &self.imag
    }

    /// `(real parts, imaginary parts)`.
    pub fn eigenvalues(&self) -> (&Vector<T>, &Vector<T>) {
        (&self.real, &self.imag)
    }

    /// Eigenvector matrix `V`.
    pub fn eigenvectors(&self) -> &Matrix<T> {
        &self.vectors
    }

    /// Block diagonal eigenvalue matrix `D`.
    ///
    /// ```
    /// use densedecomp::Matrix;
    /// let rot = Matrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
    /// let d = rot.eigen().unwrap().block_diagonal();
    /// assert!((d[(0, 1)] - 1.0).abs() < 1e-12);
    /// assert!((d[(1, 0)] + 1.0).abs() < 1e-12);
    /// ```
    pub fn block_diagonal(&self) -> Matrix<T> {
        let n = self.real.len();
        let mut d = Matrix::zeros(n, n, T::zero());
        for i in 0..n {
            d[(i, i)] = self.real[i];
            let mu = self.imag[i];
            if mu > T::zero() {
                d[(i, i + 1)] = mu;
            } else if mu < T::zero() {
                d[(i, i - 1)] = mu;
            }
        }
        d
    }

    /// Eigenvalues as complex numbers, in the same order as
    /// [`eigenvalues`](Self::eigenvalues).
    #[cfg(feature = "complex")]
    pub fn eigenvalues_complex(&self) -> Vec<num_complex::Complex<T>> {
        self.real
            .iter()
            .zip(self.imag.iter())
            .map(|(&re, &im)| num_complex::Complex::new(re, im))
            .collect()
    }
}

/// Power of two nearest `max|a_ij|`, when rescaling by it is both needed
/// and exact.
fn unit_scale<T: FloatScalar>(a: &Matrix<T>) -> Option<T> {
    let max_abs = a.max_abs();
    if !(max_abs > T::zero()) || !max_abs.is_finite() {
        return None;
    }
    let exp = max_abs.log2().round().to_i32()?;
    if exp == 0 {
        return None;
    }
    let two = T::one() + T::one();
    let scale = two.powi(exp);
    let inverse = two.powi(-exp);
    (scale.is_normal() && inverse.is_normal()).then_some(scale)
}

impl<T: FloatScalar> Matrix<T> {
    /// Eigen-decomposition with default options. Recomputed on every call;
    /// [`DenseMatrix`](crate::DenseMatrix) caches it.
    pub fn eigen(&self) -> Result<EigenDecomposition<T>, LinalgError> {
        EigenDecomposition::new(self)
    }

    /// Eigen-decomposition with explicit options.
    pub fn eigen_with(&self, options: &EigenOptions<T>) -> Result<EigenDecomposition<T>, LinalgError> {
        EigenDecomposition::with_options(self, options)
    }
}
