use densedecomp::{EigenOptions, IterationBudget, LinalgError, Matrix, Symmetry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-9;

fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
    assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
}

fn random_matrix(rng: &mut StdRng, nrows: usize, ncols: usize) -> Matrix<f64> {
    let data = (0..nrows * ncols).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Matrix::from_vec(nrows, ncols, data)
}

fn random_symmetric(rng: &mut StdRng, n: usize) -> Matrix<f64> {
    let a = random_matrix(rng, n, n);
    let at = a.transpose();
    Matrix::from_fn(n, n, |i, j| 0.5 * (a[(i, j)] + at[(i, j)]))
}

fn assert_orthonormal_columns(q: &Matrix<f64>, msg: &str) {
    let qtq = &q.transpose() * q;
    for i in 0..qtq.nrows() {
        for j in 0..qtq.ncols() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_near(qtq[(i, j)], expected, TOL, &format!("{} QtQ[({},{})]", msg, i, j));
        }
    }
}

fn assert_matrix_near(a: &Matrix<f64>, b: &Matrix<f64>, tol: f64, msg: &str) {
    assert_eq!(a.shape(), b.shape(), "{}: shape", msg);
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            assert_near(a[(i, j)], b[(i, j)], tol, &format!("{}[({},{})]", msg, i, j));
        }
    }
}

// ── Symmetric eigen ─────────────────────────────────────────────────

#[test]
fn symmetric_eigen_reconstructs() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 2, 3, 5, 8, 13] {
        let a = random_symmetric(&mut rng, n);
        let eig = a.eigen().unwrap();
        assert!(eig.is_symmetric(), "n={}", n);

        let v = eig.eigenvectors();
        assert_orthonormal_columns(v, &format!("n={}", n));

        let d = eig.block_diagonal();
        let back = &(v * &d) * &v.transpose();
        assert_matrix_near(&back, &a, TOL, &format!("VDVt n={}", n));

        let re = eig.real_eigenvalues();
        for i in 1..n {
            assert!(re[i - 1] <= re[i], "n={} not ascending at {}", n, i);
        }
        assert!(eig.imag_eigenvalues().iter().all(|&x| x == 0.0));
        assert_near(re.iter().sum::<f64>(), a.trace(), TOL, "trace");
    }
}

#[test]
fn symmetric_eigen_matches_standalone_solver() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_symmetric(&mut rng, 6);
    let full = a.eigen().unwrap();
    let sym = a.eig_symmetric().unwrap();
    for i in 0..6 {
        assert_near(full.real_eigenvalues()[i], sym.eigenvalues()[i], 1e-12, "eigenvalue");
    }
}

// ── General eigen ───────────────────────────────────────────────────

#[test]
fn general_eigen_satisfies_av_eq_vd() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [1, 2, 3, 4, 6, 9, 12] {
        let a = random_matrix(&mut rng, n, n);
        let eig = a.eigen().unwrap();
        assert!(!eig.is_symmetric() || n == 1, "n={}", n);

        let v = eig.eigenvectors();
        let d = eig.block_diagonal();
        let av = &a * v;
        let vd = v * &d;
        assert_matrix_near(&av, &vd, 1e-8, &format!("AV=VD n={}", n));

        let (re, im) = eig.eigenvalues();
        assert_near(re.iter().sum::<f64>(), a.trace(), 1e-8, "trace");

        // Complex eigenvalues come in adjacent conjugate pairs, positive part first.
        let mut i = 0;
        while i < n {
            if im[i] != 0.0 {
                assert!(im[i] > 0.0, "n={} pair at {} starts negative", n, i);
                assert_near(re[i], re[i + 1], 1e-12, "pair real part");
                assert_near(im[i], -im[i + 1], 1e-12, "pair imaginary part");
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

#[test]
fn nearly_symmetric_with_tolerance() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut a = random_symmetric(&mut rng, 5);
    a[(1, 3)] += 1e-13;

    let exact = a.eigen().unwrap();
    assert!(!exact.is_symmetric());

    let opts = EigenOptions::default().with_symmetry(Symmetry::Within(1e-12));
    let loose = a.eigen_with(&opts).unwrap();
    assert!(loose.is_symmetric());

    // Both paths agree on the spectrum.
    let mut general: Vec<f64> = exact.real_eigenvalues().iter().copied().collect();
    general.sort_by(|x, y| x.partial_cmp(y).unwrap());
    for (i, g) in general.iter().enumerate() {
        assert_near(*g, loose.real_eigenvalues()[i], 1e-9, "eigenvalue");
    }
}

#[test]
fn zero_budget_fails_on_nontrivial_input() {
    let mut rng = StdRng::seed_from_u64(5);
    let opts = EigenOptions::default().with_budget(IterationBudget::PerValue(0));

    let sym = random_symmetric(&mut rng, 4);
    assert_eq!(sym.eigen_with(&opts).unwrap_err(), LinalgError::ConvergenceFailure);

    let general = random_matrix(&mut rng, 4, 4);
    assert_eq!(general.eigen_with(&opts).unwrap_err(), LinalgError::ConvergenceFailure);

    let unbounded = EigenOptions::default().with_budget(IterationBudget::Unbounded);
    assert!(general.eigen_with(&unbounded).is_ok());
}

// ── SVD ─────────────────────────────────────────────────────────────

fn check_svd(a: &Matrix<f64>, msg: &str) {
    let (m, n) = a.shape();
    let p = m.min(n);
    let svd = a.svd().unwrap();
    let u = svd.u();
    let v = svd.v();
    let s = svd.singular_values();

    assert_eq!(u.shape(), (m, p), "{}: U shape", msg);
    assert_eq!(v.shape(), (n, p), "{}: V shape", msg);
    assert_eq!(s.len(), p, "{}: sigma length", msg);

    assert_orthonormal_columns(u, &format!("{} U", msg));
    assert_orthonormal_columns(v, &format!("{} V", msg));

    for i in 0..p {
        assert!(s[i] >= 0.0, "{}: negative sigma", msg);
        if i > 0 {
            assert!(s[i - 1] >= s[i], "{}: sigma not descending", msg);
        }
    }

    let back = &(u * &svd.s()) * &v.transpose();
    assert_matrix_near(&back, a, TOL, &format!("{} USVt", msg));
}

#[test]
fn svd_tall_square_and_wide() {
    let mut rng = StdRng::seed_from_u64(99);
    for (m, n) in [(1, 1), (3, 3), (6, 4), (10, 3), (4, 6), (2, 9), (7, 7)] {
        let a = random_matrix(&mut rng, m, n);
        check_svd(&a, &format!("{}x{}", m, n));
    }
}

#[test]
fn svd_transpose_swaps_u_and_v() {
    let mut rng = StdRng::seed_from_u64(1234);
    let a = random_matrix(&mut rng, 5, 3);
    let s = a.singular_values().unwrap();
    let st = a.transpose().singular_values().unwrap();
    assert_eq!(s.len(), st.len());
    for i in 0..s.len() {
        assert_near(s[i], st[i], 1e-12, "sigma(A) vs sigma(At)");
    }

    // U and V trade places, up to the sign of each singular pair.
    let svd = a.svd().unwrap();
    let svd_t = a.transpose().svd().unwrap();
    let cross = [
        (&svd.u().transpose() * svd_t.v(), "Ut(A) V(At)"),
        (&svd.v().transpose() * svd_t.u(), "Vt(A) U(At)"),
    ];
    for (m, msg) in &cross {
        assert_eq!(m.shape(), (3, 3), "{}: shape", msg);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_near(m[(i, j)].abs(), expected, 1e-9, &format!("{}[({},{})]", msg, i, j));
            }
        }
    }
}

#[test]
fn svd_norms_agree_with_frobenius() {
    let mut rng = StdRng::seed_from_u64(8);
    let a = random_matrix(&mut rng, 6, 5);
    let svd = a.svd().unwrap();
    let sum_sq: f64 = svd.singular_values().iter().map(|s| s * s).sum();
    assert_near(sum_sq.sqrt(), a.frobenius_norm(), 1e-12, "frobenius");
    assert_eq!(svd.norm2(), svd.singular_values()[0]);
    assert!(svd.norm2() <= a.frobenius_norm() + 1e-12);
}

#[test]
fn svd_rank_of_low_rank_product() {
    let mut rng = StdRng::seed_from_u64(21);
    let left = random_matrix(&mut rng, 7, 2);
    let right = random_matrix(&mut rng, 2, 5);
    let a = &left * &right;
    let svd = a.svd().unwrap();
    assert_eq!(svd.rank(), 2);
    assert!(svd.condition().is_infinite() || svd.condition() > 1e12);
}

#[test]
fn symmetric_psd_singular_values_are_eigenvalues() {
    let mut rng = StdRng::seed_from_u64(77);
    let b = random_matrix(&mut rng, 5, 5);
    let a = &b.transpose() * &b;

    let mut eig: Vec<f64> = a.eigen().unwrap().real_eigenvalues().iter().copied().collect();
    eig.reverse();
    let s = a.singular_values().unwrap();
    for i in 0..5 {
        assert_near(s[i], eig[i], 1e-9, "sigma vs lambda");
    }
}
