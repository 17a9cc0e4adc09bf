#![cfg(feature = "complex")]

use densedecomp::{Complex, DenseMatrix, Matrix};

type C = Complex<f64>;

fn c(re: f64, im: f64) -> C {
    Complex::new(re, im)
}

const TOL: f64 = 1e-10;

fn assert_complex_near(a: C, b: C, tol: f64, msg: &str) {
    assert!(
        (a.re - b.re).abs() < tol && (a.im - b.im).abs() < tol,
        "{}: {:?} vs {:?}",
        msg,
        a,
        b
    );
}

/// Multiply a real matrix by a complex vector.
fn apply(a: &Matrix<f64>, x: &[C]) -> Vec<C> {
    (0..a.nrows())
        .map(|i| (0..a.ncols()).fold(C::default(), |acc, j| acc + x[j] * a[(i, j)]))
        .collect()
}

/// Complex eigenvectors assembled from the real/imaginary column pairs.
fn complex_eigenvectors(v: &Matrix<f64>, im: &[f64]) -> Vec<Vec<C>> {
    let n = v.nrows();
    let mut out = Vec::with_capacity(n);
    let mut j = 0;
    while j < n {
        if im[j] == 0.0 {
            out.push((0..n).map(|i| c(v[(i, j)], 0.0)).collect());
            j += 1;
        } else {
            out.push((0..n).map(|i| c(v[(i, j)], v[(i, j + 1)])).collect());
            out.push((0..n).map(|i| c(v[(i, j)], -v[(i, j + 1)])).collect());
            j += 2;
        }
    }
    out
}

#[test]
fn rotation_eigenvalues_are_plus_minus_i() {
    let rot = Matrix::from_rows(2, 2, &[0.0, -1.0, 1.0, 0.0]);
    let lambda = rot.eigen().unwrap().eigenvalues_complex();
    assert_complex_near(lambda[0], c(0.0, 1.0), TOL, "lambda0");
    assert_complex_near(lambda[1], c(0.0, -1.0), TOL, "lambda1");
}

#[test]
fn scaled_rotation_with_real_part() {
    // [[a, -b], [b, a]] has eigenvalues a ± ib.
    let a = Matrix::from_rows(2, 2, &[1.5, -2.0, 2.0, 1.5]);
    let lambda = a.eigen().unwrap().eigenvalues_complex();
    assert_complex_near(lambda[0], c(1.5, 2.0), TOL, "lambda0");
    assert_complex_near(lambda[1], c(1.5, -2.0), TOL, "lambda1");
}

#[test]
fn complex_eigenpairs_satisfy_av_eq_lambda_v() {
    let a = Matrix::from_rows(
        4,
        4,
        &[
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 0.0,
        ],
    );
    let dense = DenseMatrix::new(a.clone());
    let eig = dense.eigen().unwrap();
    let lambda = eig.eigenvalues_complex();
    let vectors = complex_eigenvectors(eig.eigenvectors(), eig.imag_eigenvalues().as_slice());

    // Fourth roots of unity.
    let mut found = [false; 4];
    for l in &lambda {
        for (k, root) in [c(1.0, 0.0), c(-1.0, 0.0), c(0.0, 1.0), c(0.0, -1.0)].iter().enumerate() {
            if (l - root).norm() < 1e-9 {
                found[k] = true;
            }
        }
    }
    assert!(found.iter().all(|&f| f), "missing root: {:?}", lambda);

    for (k, (l, x)) in lambda.iter().zip(&vectors).enumerate() {
        let ax = apply(&a, x);
        for i in 0..4 {
            assert_complex_near(ax[i], l * x[i], 1e-9, &format!("pair {} row {}", k, i));
        }
    }
}

#[test]
fn symmetric_view_has_zero_imaginary_parts() {
    let a = Matrix::from_rows(3, 3, &[2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0]);
    let lambda = a.eigen().unwrap().eigenvalues_complex();
    let s = 2.0_f64.sqrt();
    let expected = [2.0 - s, 2.0, 2.0 + s];
    for (l, e) in lambda.iter().zip(expected) {
        assert_complex_near(*l, c(e, 0.0), TOL, "lambda");
    }
}
