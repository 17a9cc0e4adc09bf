use crate::linalg::{g, IterationBudget, LinalgError, Sweeps};
use crate::numeric::{constant, relative_accuracy};
use crate::traits::{FloatScalar, MatrixMut};

/// Complex scalar division `(xr + i·xi) / (yr + i·yi)`, returned as
/// `(re, im)`.
///
/// Scales by the larger of `|yr|`, `|yi|` so the intermediate products stay
/// in range.
///
/// ```
/// use densedecomp::linalg::cdiv;
/// // (1 + 2i) / (3 + 4i) = (11 + 2i) / 25
/// let (re, im) = cdiv(1.0_f64, 2.0, 3.0, 4.0);
/// assert!((re - 0.44).abs() < 1e-15);
/// assert!((im - 0.08).abs() < 1e-15);
/// ```
#[inline]
pub fn cdiv<T: FloatScalar>(xr: T, xi: T, yr: T, yi: T) -> (T, T) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Francis double-shift QR iteration on an upper Hessenberg matrix, followed
/// by back-substitution for the eigenvectors.
///
/// On entry `h` is upper Hessenberg and `v` the transform that produced it
/// (identity if `h` is the original matrix). On success:
/// - `d[i] + i·e[i]` are the eigenvalues; a conjugate pair occupies two
///   consecutive slots with `e[k] > 0`, `e[k+1] = -e[k]`
/// - `v` holds the eigenvectors of the original matrix. For a conjugate pair
///   at `(k, k+1)`, column `k` is the real part and column `k+1` the
///   imaginary part of the vector for `d[k] + i·e[k]`
/// - `h` is consumed as workspace
///
/// A zero `h` returns at once with every eigenvalue 0 and `v` left as given
/// instead of zeroed; its columns remain valid eigenvectors.
///
/// Each double-shift QR step counts against `budget`. The shift squares
/// entries of `h`, so magnitudes near the ends of the exponent range can
/// overflow and exhaust it; [`EigenDecomposition`](crate::EigenDecomposition)
/// rescales by a power of two before calling.
pub fn hqr2<T: FloatScalar>(
    d: &mut [T],
    e: &mut [T],
    h: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    budget: IterationBudget,
) -> Result<(), LinalgError> {
    let nn = h.nrows();
    assert_eq!(nn, h.ncols(), "hqr2 requires a square matrix");
    assert!(v.nrows() == nn && v.ncols() == nn, "v must match the matrix order");
    assert!(d.len() == nn && e.len() == nn, "d and e must have one slot per eigenvalue");

    let eps = relative_accuracy::<T>();
    let two = T::one() + T::one();
    let mut sweeps = Sweeps::new(budget, nn, "hqr2");

    let mut norm = T::zero();
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm = norm + g(h, i, j).abs();
        }
    }
    if norm == T::zero() {
        // Zero matrix: every eigenvalue is 0 and `v` is left as given.
        d.iter_mut().chain(e.iter_mut()).for_each(|x| *x = T::zero());
        return Ok(());
    }

    // ── Reduction to real Schur form ────────────────────────────────

    let mut exshift = T::zero();
    let mut iter = 0usize;
    let mut hi = nn;
    while hi > 0 {
        let n = hi - 1;

        // Look for a single small sub-diagonal element.
        let mut l = n;
        while l > 0 {
            let mut s = g(h, l - 1, l - 1).abs() + g(h, l, l).abs();
            if s == T::zero() {
                s = norm;
            }
            if g(h, l, l - 1).abs() < eps * s {
                break;
            }
            l -= 1;
        }

        if l == n {
            // One root.
            *h.get_mut(n, n) = g(h, n, n) + exshift;
            d[n] = g(h, n, n);
            e[n] = T::zero();
            hi -= 1;
            iter = 0;
        } else if l + 1 == n {
            // Two roots from the trailing 2×2 block.
            let w = g(h, n, n - 1) * g(h, n - 1, n);
            let p = (g(h, n - 1, n - 1) - g(h, n, n)) / two;
            let q = p * p + w;
            let mut z = q.abs().sqrt();
            *h.get_mut(n, n) = g(h, n, n) + exshift;
            *h.get_mut(n - 1, n - 1) = g(h, n - 1, n - 1) + exshift;
            let x = g(h, n, n);

            if q >= T::zero() {
                // Real pair: rotate the block to upper triangular.
                z = if p >= T::zero() { p + z } else { p - z };
                d[n - 1] = x + z;
                d[n] = d[n - 1];
                if z != T::zero() {
                    d[n] = x - w / z;
                }
                e[n - 1] = T::zero();
                e[n] = T::zero();

                let x = g(h, n, n - 1);
                let s = x.abs() + z.abs();
                let mut p = x / s;
                let mut q = z / s;
                let r = (p * p + q * q).sqrt();
                p = p / r;
                q = q / r;

                for j in (n - 1)..nn {
                    let z = g(h, n - 1, j);
                    *h.get_mut(n - 1, j) = q * z + p * g(h, n, j);
                    *h.get_mut(n, j) = q * g(h, n, j) - p * z;
                }
                for i in 0..=n {
                    let z = g(h, i, n - 1);
                    *h.get_mut(i, n - 1) = q * z + p * g(h, i, n);
                    *h.get_mut(i, n) = q * g(h, i, n) - p * z;
                }
                for i in 0..nn {
                    let z = g(v, i, n - 1);
                    *v.get_mut(i, n - 1) = q * z + p * g(v, i, n);
                    *v.get_mut(i, n) = q * g(v, i, n) - p * z;
                }
            } else {
                d[n - 1] = x + p;
                d[n] = x + p;
                e[n - 1] = z;
                e[n] = -z;
            }
            hi -= 2;
            iter = 0;
        } else {
            sweeps.step()?;

            // Form shift.
            let mut x = g(h, n, n);
            let mut y = g(h, n - 1, n - 1);
            let mut w = g(h, n, n - 1) * g(h, n - 1, n);

            // Wilkinson's original ad hoc shift.
            if iter == 10 {
                exshift = exshift + x;
                for i in 0..=n {
                    *h.get_mut(i, i) = g(h, i, i) - x;
                }
                let s = g(h, n, n - 1).abs() + g(h, n - 1, n - 2).abs();
                x = constant::<T>(0.75) * s;
                y = x;
                w = constant::<T>(-0.4375) * s * s;
            }

            // MATLAB's ad hoc shift.
            if iter == 30 {
                let half = (y - x) / two;
                let mut s = half * half + w;
                if s > T::zero() {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / (half + s);
                    for i in 0..=n {
                        *h.get_mut(i, i) = g(h, i, i) - s;
                    }
                    exshift = exshift + s;
                    x = constant(0.964);
                    y = x;
                    w = x;
                }
            }

            iter += 1;

            // Look for two consecutive small sub-diagonal elements.
            let mut m = n - 2;
            let (mut p, mut q, mut r);
            loop {
                let z = g(h, m, m);
                let rr = x - z;
                let ss = y - z;
                p = (rr * ss - w) / g(h, m + 1, m) + g(h, m, m + 1);
                q = g(h, m + 1, m + 1) - z - rr - ss;
                r = g(h, m + 2, m + 1);
                let s = p.abs() + q.abs() + r.abs();
                p = p / s;
                q = q / s;
                r = r / s;
                if m == l {
                    break;
                }
                let lhs = g(h, m, m - 1).abs() * (q.abs() + r.abs());
                let rhs = eps
                    * (p.abs() * (g(h, m - 1, m - 1).abs() + z.abs() + g(h, m + 1, m + 1).abs()));
                if lhs < rhs {
                    break;
                }
                m -= 1;
            }

            for i in (m + 2)..=n {
                *h.get_mut(i, i - 2) = T::zero();
                if i > m + 2 {
                    *h.get_mut(i, i - 3) = T::zero();
                }
            }

            // Double QR step over rows l..=n and columns m..=n.
            for k in m..n {
                let notlast = k != n - 1;
                let mut scale = T::zero();
                if k != m {
                    p = g(h, k, k - 1);
                    q = g(h, k + 1, k - 1);
                    r = if notlast { g(h, k + 2, k - 1) } else { T::zero() };
                    scale = p.abs() + q.abs() + r.abs();
                    if scale == T::zero() {
                        continue;
                    }
                    p = p / scale;
                    q = q / scale;
                    r = r / scale;
                }

                let mut s = (p * p + q * q + r * r).sqrt();
                if p < T::zero() {
                    s = -s;
                }
                if s == T::zero() {
                    continue;
                }
                if k != m {
                    *h.get_mut(k, k - 1) = -s * scale;
                } else if l != m {
                    *h.get_mut(k, k - 1) = -g(h, k, k - 1);
                }
                p = p + s;
                let x = p / s;
                let y = q / s;
                let z = r / s;
                q = q / p;
                r = r / p;

                // Row modification.
                for j in k..nn {
                    let mut t = g(h, k, j) + q * g(h, k + 1, j);
                    if notlast {
                        t = t + r * g(h, k + 2, j);
                        *h.get_mut(k + 2, j) = g(h, k + 2, j) - t * z;
                    }
                    *h.get_mut(k, j) = g(h, k, j) - t * x;
                    *h.get_mut(k + 1, j) = g(h, k + 1, j) - t * y;
                }

                // Column modification.
                for i in 0..=n.min(k + 3) {
                    let mut t = x * g(h, i, k) + y * g(h, i, k + 1);
                    if notlast {
                        t = t + z * g(h, i, k + 2);
                        *h.get_mut(i, k + 2) = g(h, i, k + 2) - t * r;
                    }
                    *h.get_mut(i, k) = g(h, i, k) - t;
                    *h.get_mut(i, k + 1) = g(h, i, k + 1) - t * q;
                }

                // Accumulate transformations.
                for i in 0..nn {
                    let mut t = x * g(v, i, k) + y * g(v, i, k + 1);
                    if notlast {
                        t = t + z * g(v, i, k + 2);
                        *v.get_mut(i, k + 2) = g(v, i, k + 2) - t * r;
                    }
                    *v.get_mut(i, k) = g(v, i, k) - t;
                    *v.get_mut(i, k + 1) = g(v, i, k + 1) - t * q;
                }
            }
        }
    }

    // ── Back-substitution on the quasi-triangular form ──────────────

    for n in (0..nn).rev() {
        let p = d[n];
        let q = e[n];

        if q == T::zero() {
            // Real vector.
            let mut l = n;
            let mut z = T::zero();
            let mut s = T::zero();
            *h.get_mut(n, n) = T::one();
            for i in (0..n).rev() {
                let w = g(h, i, i) - p;
                let mut r = T::zero();
                for j in l..=n {
                    r = r + g(h, i, j) * g(h, j, n);
                }
                if e[i] < T::zero() {
                    z = w;
                    s = r;
                    continue;
                }
                l = i;
                if e[i] == T::zero() {
                    *h.get_mut(i, n) = if w != T::zero() { -r / w } else { -r / (eps * norm) };
                } else {
                    // Solve the real 2×2 system.
                    let x = g(h, i, i + 1);
                    let y = g(h, i + 1, i);
                    let q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                    let t = (x * s - z * r) / q;
                    *h.get_mut(i, n) = t;
                    *h.get_mut(i + 1, n) = if x.abs() > z.abs() {
                        (-r - w * t) / x
                    } else {
                        (-s - y * t) / z
                    };
                }

                // Overflow control.
                let t = g(h, i, n).abs();
                if (eps * t) * t > T::one() {
                    for j in i..=n {
                        *h.get_mut(j, n) = g(h, j, n) / t;
                    }
                }
            }
        } else if q < T::zero() {
            // Complex vector for the pair at (n-1, n).
            let mut l = n - 1;
            let mut z = T::zero();
            let mut r = T::zero();
            let mut s = T::zero();

            // The last vector component is imaginary, so the block is triangular.
            if g(h, n, n - 1).abs() > g(h, n - 1, n).abs() {
                *h.get_mut(n - 1, n - 1) = q / g(h, n, n - 1);
                *h.get_mut(n - 1, n) = -(g(h, n, n) - p) / g(h, n, n - 1);
            } else {
                let (cr, ci) = cdiv(T::zero(), -g(h, n - 1, n), g(h, n - 1, n - 1) - p, q);
                *h.get_mut(n - 1, n - 1) = cr;
                *h.get_mut(n - 1, n) = ci;
            }
            *h.get_mut(n, n - 1) = T::zero();
            *h.get_mut(n, n) = T::one();

            for i in (0..(n - 1)).rev() {
                let mut ra = T::zero();
                let mut sa = T::zero();
                for j in l..=n {
                    ra = ra + g(h, i, j) * g(h, j, n - 1);
                    sa = sa + g(h, i, j) * g(h, j, n);
                }
                let w = g(h, i, i) - p;

                if e[i] < T::zero() {
                    z = w;
                    r = ra;
                    s = sa;
                    continue;
                }
                l = i;
                if e[i] == T::zero() {
                    let (cr, ci) = cdiv(-ra, -sa, w, q);
                    *h.get_mut(i, n - 1) = cr;
                    *h.get_mut(i, n) = ci;
                } else {
                    // Solve the complex 2×2 system.
                    let x = g(h, i, i + 1);
                    let y = g(h, i + 1, i);
                    let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                    let vi = (d[i] - p) * two * q;
                    if vr == T::zero() && vi == T::zero() {
                        vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                    }
                    let (cr, ci) =
                        cdiv(x * r - z * ra + q * sa, x * s - z * sa - q * ra, vr, vi);
                    *h.get_mut(i, n - 1) = cr;
                    *h.get_mut(i, n) = ci;
                    if x.abs() > z.abs() + q.abs() {
                        *h.get_mut(i + 1, n - 1) = (-ra - w * cr + q * ci) / x;
                        *h.get_mut(i + 1, n) = (-sa - w * ci - q * cr) / x;
                    } else {
                        let (cr1, ci1) = cdiv(-r - y * cr, -s - y * ci, z, q);
                        *h.get_mut(i + 1, n - 1) = cr1;
                        *h.get_mut(i + 1, n) = ci1;
                    }
                }

                // Overflow control.
                let t = g(h, i, n - 1).abs().max(g(h, i, n).abs());
                if (eps * t) * t > T::one() {
                    for j in i..=n {
                        *h.get_mut(j, n - 1) = g(h, j, n - 1) / t;
                        *h.get_mut(j, n) = g(h, j, n) / t;
                    }
                }
            }
        }
    }

    // Back-transform: V ← V·X, last column first so X stays upper triangular.
    for j in (0..nn).rev() {
        for i in 0..nn {
            let mut z = T::zero();
            for k in 0..=j {
                z = z + g(v, i, k) * g(h, k, j);
            }
            *v.get_mut(i, j) = z;
        }
    }

    Ok(())
}
