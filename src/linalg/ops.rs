// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Elementary matrix operations on `Array2<Complex64>`.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;

/// d × d identity matrix.
pub fn identity(d: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(d, Complex64::new(1.0, 0.0))
}

/// Conjugate transpose A†.
pub fn dagger(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|x| x.conj())
}

/// Trace of a square matrix.
pub fn trace(a: &Array2<Complex64>) -> Complex64 {
    a.diag().sum()
}

/// Real trace inner product Re Tr(A† B).
pub fn inner_product(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x.conj() * y).re).sum()
}

/// Kronecker product A ⊗ B.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();
    let mut out = Array2::zeros((m * p, n * q));
    for ((i, j), &aij) in a.indexed_iter() {
        if aij == Complex64::new(0.0, 0.0) {
            continue;
        }
        out.slice_mut(s![i * p..(i + 1) * p, j * q..(j + 1) * q])
            .assign(&b.mapv(|x| aij * x));
    }
    out
}

/// Rank-one operator |v⟩⟨v|.
pub fn outer(v: &Array1<Complex64>) -> Array2<Complex64> {
    let n = v.len();
    Array2::from_shape_fn((n, n), |(i, j)| v[i] * v[j].conj())
}

/// Hermitian part (A + A†)/2.
pub fn hermitize(a: &Array2<Complex64>) -> Array2<Complex64> {
    (a + &dagger(a)).mapv(|x| x * 0.5)
}

/// Check A = A† entrywise within `tol`.
pub fn is_hermitian(a: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = a.dim();
    if rows != cols {
        return false;
    }
    for i in 0..rows {
        for j in i..cols {
            if (a[[i, j]] - a[[j, i]].conj()).norm() > tol {
                return false;
            }
        }
    }
    true
}

/// Integer square root of `n`, if `n` is a perfect square.
pub fn perfect_sqrt(n: usize) -> Option<usize> {
    let r = (n as f64).sqrt().round() as usize;
    (r * r == n).then_some(r)
}

/// Real symmetric embedding of a complex matrix X = A + iB:
///
/// ```text
/// lift(X) = [[A, -B],
///            [B,  A]]
/// ```
///
/// For Hermitian X the result is symmetric, and X ⪰ 0 iff lift(X) ⪰ 0.
/// Every eigenvalue of X appears twice in the spectrum of lift(X).
pub fn lift_hermitian(x: &Array2<Complex64>) -> Array2<f64> {
    let (rows, cols) = x.dim();
    let mut out = Array2::zeros((2 * rows, 2 * cols));
    for ((i, j), z) in x.indexed_iter() {
        out[[i, j]] = z.re;
        out[[i + rows, j + cols]] = z.re;
        out[[i, j + cols]] = -z.im;
        out[[i + rows, j]] = z.im;
    }
    out
}

/// Adjoint of [`lift_hermitian`] with respect to the real Frobenius product:
/// returns Λ with ⟨Z, lift(X)⟩ = Re Tr(Λ† X) for every X.
///
/// For Z = lift(H) this gives 2H.
pub fn unlift_hermitian(z: &Array2<f64>) -> Array2<Complex64> {
    let n = z.nrows() / 2;
    Array2::from_shape_fn((n, n), |(i, j)| {
        Complex64::new(
            z[[i, j]] + z[[i + n, j + n]],
            z[[i + n, j]] - z[[i, j + n]],
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn sample_hermitian() -> Array2<Complex64> {
        ndarray::array![[c(2.0, 0.0), c(1.0, -1.0)], [c(1.0, 1.0), c(3.0, 0.0)]]
    }

    #[test]
    fn test_kron_identity_block_structure() {
        let a = sample_hermitian();
        let k = kron(&identity(2), &a);
        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 1]], a[[0, 1]]);
        assert_eq!(k[[2, 3]], a[[0, 1]]);
        assert_eq!(k[[0, 2]], c(0.0, 0.0));
    }

    #[test]
    fn test_kron_dimensions_rectangular() {
        let a = Array2::from_elem((2, 3), c(1.0, 0.0));
        let b = Array2::from_elem((4, 1), c(2.0, 0.0));
        let k = kron(&a, &b);
        assert_eq!(k.dim(), (8, 3));
        assert!(k.iter().all(|&z| z == c(2.0, 0.0)));
    }

    #[test]
    fn test_dagger_and_is_hermitian() {
        let h = sample_hermitian();
        assert!(is_hermitian(&h, 1e-12));
        assert_eq!(dagger(&h), h);

        let mut not_h = h.clone();
        not_h[[0, 1]] = c(5.0, 0.0);
        assert!(!is_hermitian(&not_h, 1e-12));
        assert!(is_hermitian(&hermitize(&not_h), 1e-12));
    }

    #[test]
    fn test_trace_and_inner_product() {
        let h = sample_hermitian();
        assert_eq!(trace(&h), c(5.0, 0.0));
        // Re Tr(I† H) = Tr H
        assert_relative_eq!(inner_product(&identity(2), &h), 5.0);
        // Re Tr(H† H) = ‖H‖_F²
        assert_relative_eq!(inner_product(&h, &h), 4.0 + 9.0 + 2.0 + 2.0);
    }

    #[test]
    fn test_outer_is_projector_for_unit_vector() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let v = ndarray::array![c(s, 0.0), c(0.0, s)];
        let p = outer(&v);
        let p2 = p.dot(&p);
        for (a, b) in p.iter().zip(p2.iter()) {
            assert!((*a - *b).norm() < 1e-12);
        }
        assert_relative_eq!(trace(&p).re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_perfect_sqrt() {
        assert_eq!(perfect_sqrt(16), Some(4));
        assert_eq!(perfect_sqrt(1), Some(1));
        assert_eq!(perfect_sqrt(0), Some(0));
        assert_eq!(perfect_sqrt(8), None);
    }

    #[test]
    fn test_lift_is_symmetric_and_unlift_is_adjoint() {
        let h = sample_hermitian();
        let l = lift_hermitian(&h);
        assert_eq!(l.dim(), (4, 4));
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(l[[i, j]], l[[j, i]]);
            }
        }
        // unlift(lift(H)) = 2H
        let back = unlift_hermitian(&l);
        for (a, b) in back.iter().zip(h.iter()) {
            assert!((*a - *b * 2.0).norm() < 1e-12);
        }
        // ⟨lift(G), lift(H)⟩ = 2 Re Tr(G† H)
        let g = hermitize(&Array2::from_shape_fn((2, 2), |(i, j)| c(i as f64, j as f64)));
        let lhs: f64 = lift_hermitian(&g)
            .iter()
            .zip(l.iter())
            .map(|(a, b)| a * b)
            .sum();
        assert_relative_eq!(lhs, 2.0 * inner_product(&g, &h), epsilon = 1e-12);
    }
}
