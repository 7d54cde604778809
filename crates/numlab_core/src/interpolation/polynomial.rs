use super::{ensure_distinct, validate_points, DataPoint, InterpolationDetail, InterpolationResult};
use crate::error::{ensure_finite, NumericResult};

/// Lagrange interpolation by direct summation of the basis polynomials, O(n²).
pub fn lagrange(points: &[DataPoint], x: f64) -> NumericResult<InterpolationResult> {
    validate_points(points, 1)?;
    ensure_distinct(points)?;
    ensure_finite("x", x)?;

    let basis: Vec<f64> = points
        .iter()
        .enumerate()
        .map(|(i, pi)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, pj)| (x - pj.x) / (pi.x - pj.x))
                .product()
        })
        .collect();
    let value = basis.iter().zip(points).map(|(l, p)| l * p.y).sum();

    Ok(InterpolationResult {
        value,
        detail: InterpolationDetail::Lagrange { basis },
    })
}

/// Divided-difference table: `table[i][k] = f[x_i, …, x_{i+k}]`, so row `i`
/// has `n - i` entries.
pub fn divided_differences(points: &[DataPoint]) -> NumericResult<Vec<Vec<f64>>> {
    validate_points(points, 1)?;
    ensure_distinct(points)?;

    let n = points.len();
    let mut table: Vec<Vec<f64>> = points.iter().map(|p| vec![p.y]).collect();
    for k in 1..n {
        for i in 0..n - k {
            let value = (table[i + 1][k - 1] - table[i][k - 1]) / (points[i + k].x - points[i].x);
            table[i].push(value);
        }
    }
    Ok(table)
}

/// Newton's divided-difference polynomial evaluated by nested multiplication.
pub fn newton_divided_difference(
    points: &[DataPoint],
    x: f64,
) -> NumericResult<InterpolationResult> {
    ensure_finite("x", x)?;
    let table = divided_differences(points)?;
    let coefficients = table[0].clone();

    let n = coefficients.len();
    let mut value = coefficients[n - 1];
    for k in (0..n - 1).rev() {
        value = value * (x - points[k].x) + coefficients[k];
    }

    Ok(InterpolationResult {
        value,
        detail: InterpolationDetail::DividedDifference {
            table,
            coefficients,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumericError;

    fn pts(data: &[(f64, f64)]) -> Vec<DataPoint> {
        data.iter().copied().map(DataPoint::from).collect()
    }

    #[test]
    fn lagrange_reproduces_quadratic() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
        let result = lagrange(&points, 1.5).expect("lagrange");
        assert!((result.value - 2.25).abs() < 1e-12);
        match result.detail {
            InterpolationDetail::Lagrange { basis } => {
                assert_eq!(basis.len(), 3);
                assert!((basis.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn lagrange_accepts_unsorted_nodes_and_rejects_duplicates() {
        let points = pts(&[(2.0, 4.0), (0.0, 0.0), (1.0, 1.0)]);
        let result = lagrange(&points, 3.0).expect("lagrange");
        assert!((result.value - 9.0).abs() < 1e-12);

        let dup = pts(&[(1.0, 1.0), (2.0, 4.0), (1.0, 3.0)]);
        assert_eq!(
            lagrange(&dup, 0.5).expect_err("duplicate"),
            NumericError::DuplicateNode { x: 1.0 }
        );
    }

    #[test]
    fn single_node_is_constant() {
        let result = lagrange(&pts(&[(3.0, 7.0)]), 10.0).expect("lagrange");
        assert_eq!(result.value, 7.0);
        let result = newton_divided_difference(&pts(&[(3.0, 7.0)]), 10.0).expect("newton");
        assert_eq!(result.value, 7.0);
    }

    #[test]
    fn divided_difference_table_is_triangular() {
        // f(x) = x²: f[x0,x1] = x0 + x1, f[x0,x1,x2] = 1.
        let points = pts(&[(1.0, 1.0), (2.0, 4.0), (4.0, 16.0)]);
        let table = divided_differences(&points).expect("table");
        assert_eq!(table[0], vec![1.0, 3.0, 1.0]);
        assert_eq!(table[1], vec![4.0, 6.0]);
        assert_eq!(table[2], vec![16.0]);
    }

    #[test]
    fn newton_matches_lagrange() {
        let points = pts(&[(-1.0, 2.0), (0.5, -1.0), (2.0, 3.5), (3.0, 0.25)]);
        for x in [-2.0, 0.0, 1.3, 2.7] {
            let a = lagrange(&points, x).expect("lagrange").value;
            let b = newton_divided_difference(&points, x).expect("newton").value;
            assert!((a - b).abs() < 1e-10, "x = {x}: {a} vs {b}");
        }
    }
}
