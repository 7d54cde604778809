use super::direct::PIVOT_TOLERANCE;
use crate::error::{NumericError, NumericResult};

/// Solves a tridiagonal system with the Thomas algorithm.
///
/// All four slices have length `n`. `sub[0]` and `sup[n - 1]` are ignored.
pub fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> NumericResult<Vec<f64>> {
    let n = rhs.len();
    if n == 0 {
        return Err(NumericError::InvalidInput(
            "tridiagonal system must have at least one row.".to_string(),
        ));
    }
    for (name, band) in [("sub-diagonal", sub), ("diagonal", diag), ("super-diagonal", sup)] {
        if band.len() != n {
            return Err(NumericError::DimensionMismatch(format!(
                "{name} has length {}, expected {n}.",
                band.len()
            )));
        }
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if diag[0].abs() < PIVOT_TOLERANCE {
        return Err(NumericError::SingularMatrix { column: 0 });
    }
    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];

    for i in 1..n {
        let den = diag[i] - sub[i] * c_prime[i - 1];
        if den.abs() < PIVOT_TOLERANCE {
            return Err(NumericError::SingularMatrix { column: i });
        }
        if i < n - 1 {
            c_prime[i] = sup[i] / den;
        }
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / den;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_discrete_laplacian() {
        // [ 2 -1  0  0]       [1]
        // [-1  2 -1  0] x  =  [0]
        // [ 0 -1  2 -1]       [0]
        // [ 0  0 -1  2]       [1]
        let sub = [0.0, -1.0, -1.0, -1.0];
        let diag = [2.0; 4];
        let sup = [-1.0, -1.0, -1.0, 0.0];
        let x = solve_tridiagonal(&sub, &diag, &sup, &[1.0, 0.0, 0.0, 1.0]).expect("solve");
        for xi in x {
            assert!((xi - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn single_row_is_division() {
        let x = solve_tridiagonal(&[0.0], &[4.0], &[0.0], &[2.0]).expect("solve");
        assert_eq!(x, vec![0.5]);
    }

    #[test]
    fn zero_pivot_is_singular() {
        let err = solve_tridiagonal(&[0.0, 1.0], &[1.0, 1.0], &[1.0, 0.0], &[1.0, 1.0])
            .expect_err("singular");
        assert_eq!(err, NumericError::SingularMatrix { column: 1 });
    }

    #[test]
    fn band_lengths_must_match() {
        let err = solve_tridiagonal(&[0.0], &[1.0, 1.0], &[0.0, 0.0], &[1.0, 1.0])
            .expect_err("short band");
        assert!(format!("{err}").contains("sub-diagonal has length 1"));
    }
}
