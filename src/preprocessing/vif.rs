//! Variance inflation factor computation and iterative pruning

use ndarray::{Array1, Array2, Axis};

/// VIF of every column against all others in the matrix.
///
/// VIF_i = 1 / (1 - R²_i), where R²_i is the uncentered R² of an
/// ordinary-least-squares fit of column i on the remaining columns.
/// Degenerate columns (zero sum of squares, singular normal equations,
/// or an exact linear combination of the others) report +inf so the
/// pruning loop drops them instead of erroring.
pub fn compute_vif(x: &Array2<f64>) -> Vec<f64> {
    (0..x.ncols()).map(|i| vif_for_column(x, i)).collect()
}

/// Iteratively drop the highest-VIF column until the maximum VIF is at or
/// below `threshold`, or fewer than two columns remain. The full VIF set
/// is recomputed from scratch after every drop. Ties on the maximum drop
/// the column encountered last in the current ordering.
///
/// Returns `(retained, dropped)` as indices into the original column order.
pub fn prune_by_vif(x: &Array2<f64>, threshold: f64) -> (Vec<usize>, Vec<usize>) {
    let mut retained: Vec<usize> = (0..x.ncols()).collect();
    let mut dropped = Vec::new();

    while retained.len() >= 2 {
        let subset = x.select(Axis(1), &retained);
        let vifs = compute_vif(&subset);

        let mut max_pos = 0;
        let mut max_vif = f64::NEG_INFINITY;
        for (pos, &vif) in vifs.iter().enumerate() {
            if vif >= max_vif {
                max_vif = vif;
                max_pos = pos;
            }
        }

        if max_vif > threshold {
            dropped.push(retained.remove(max_pos));
        } else {
            break;
        }
    }

    (retained, dropped)
}

fn vif_for_column(x: &Array2<f64>, idx: usize) -> f64 {
    let y = x.column(idx).to_owned();
    let others: Vec<usize> = (0..x.ncols()).filter(|&j| j != idx).collect();
    if others.is_empty() {
        return 1.0;
    }
    let z = x.select(Axis(1), &others);

    // Uncentered total sum of squares; an all-zero column is degenerate.
    let ss_tot: f64 = y.iter().map(|v| v * v).sum();
    if ss_tot <= f64::EPSILON {
        return f64::INFINITY;
    }

    // Normal equations: (Z^T Z) beta = Z^T y
    let zt_z = z.t().dot(&z);
    let zt_y = z.t().dot(&y);
    let beta = match cholesky_solve(&zt_z, &zt_y).or_else(|| gauss_jordan_solve(&zt_z, &zt_y)) {
        Some(beta) => beta,
        None => return f64::INFINITY,
    };

    let fitted = z.dot(&beta);
    let ss_res: f64 = y
        .iter()
        .zip(fitted.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum();

    let r_squared = 1.0 - ss_res / ss_tot;
    let denom = 1.0 - r_squared;
    if denom <= 1e-12 {
        f64::INFINITY
    } else {
        1.0 / denom
    }
}

/// Solve symmetric positive-definite system Ax = b via Cholesky.
/// Retries once with a small ridge term if the matrix is near-singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    match cholesky_solve_inner(a, b) {
        Some(x) => Some(x),
        None => {
            let n = a.nrows();
            let mut a_reg = a.clone();
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_solve_inner(&a_reg, b)
        }
    }
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Cholesky decomposition: A = L * L^T
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan solve as fallback for matrices Cholesky rejects.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Augmented matrix [A | b]
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        // Partial pivoting
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(Array1::from_iter((0..n).map(|i| aug[[i, n]])))
}
