//! Semidefinite programs.
//!
//! Symmetric matrix variables are stored as their packed upper triangle in
//! column-major order. PSD cone rows use the scaled form where off-diagonal
//! entries carry a factor of √2.

use super::{normal, normal_vec, seeded, uniform};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;
use std::f64::consts::SQRT_2;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "sdp/max_cut_small",
        &["sdp", "small"],
        "Max-cut SDP relaxation (20 nodes)",
        max_cut_small,
    )?;
    registry.register(
        "sdp/nearest_correlation_small",
        &["sdp", "small"],
        "Nearest correlation matrix repair (n=30, Higham 2002)",
        nearest_correlation_small,
    )?;
    Ok(())
}

/// Offset of `X[i][j]` (`i ≤ j`) in the packed triangle.
fn packed(i: usize, j: usize) -> usize {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    j * (j + 1) / 2 + i
}

/// Declare a symmetric `n × n` variable constrained to the PSD cone.
/// Returns the index of its first packed entry.
fn psd_variable(m: &mut ModelBuilder, n: usize) -> usize {
    let vars = m.variables(n * (n + 1) / 2);
    let base = vars.start;
    let mut rows = Vec::with_capacity(vars.len());
    for j in 0..n {
        for i in 0..=j {
            let scale = if i == j { 1.0 } else { SQRT_2 };
            rows.push(Row::expr(vec![(base + packed(i, j), scale)], 0.0));
        }
    }
    m.constraint(Cone::PsdTriangle(n), rows);
    base
}

/// Fix the diagonal of the matrix at `base` to one.
fn unit_diagonal(m: &mut ModelBuilder, base: usize, n: usize) {
    let rows = (0..n)
        .map(|i| Row::eq(vec![(base + packed(i, i), 1.0)], 1.0))
        .collect();
    m.constraint(Cone::Zero(n), rows);
}

fn max_cut_small(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let n = 20;
    let mut weights = vec![vec![0.0; n]; n];
    for row in weights.iter_mut() {
        for w in row.iter_mut() {
            *w = uniform(&mut rng, 0.0, 1.0);
        }
    }
    // Symmetrise, no self-loops
    for i in 0..n {
        for j in 0..i {
            let avg = (weights[i][j] + weights[j][i]) / 2.0;
            weights[i][j] = avg;
            weights[j][i] = avg;
        }
        weights[i][i] = 0.0;
    }

    let mut m = ModelBuilder::new();
    m.maximize();
    let base = psd_variable(&mut m, n);
    unit_diagonal(&mut m, base, n);

    // ¼ tr(L X) with L = diag(W1) - W
    for i in 0..n {
        let degree: f64 = weights[i].iter().sum();
        m.linear_cost(base + packed(i, i), 0.25 * degree);
        for j in (i + 1)..n {
            m.linear_cost(base + packed(i, j), -0.5 * weights[i][j]);
        }
    }
    m.build()
}

fn nearest_correlation_small(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let n = 30;
    let a: Vec<Vec<f64>> = (0..n).map(|_| normal_vec(&mut rng, n, 1.0)).collect();
    // Gram matrix AᵀA normalised to unit diagonal
    let mut gram = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            gram[i][j] = (0..n).map(|k| a[k][i] * a[k][j]).sum();
        }
    }
    let d: Vec<f64> = (0..n)
        .map(|i| {
            let v = gram[i][i].sqrt();
            if v == 0.0 {
                1.0
            } else {
                v
            }
        })
        .collect();
    let mut target = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in 0..i {
            let noise = 0.2 * (normal(&mut rng) + normal(&mut rng)) / 2.0;
            let value = gram[i][j] / (d[i] * d[j]) + noise;
            target[i][j] = value;
            target[j][i] = value;
        }
    }

    // minimize ‖X - G‖²_F
    let mut m = ModelBuilder::new();
    let base = psd_variable(&mut m, n);
    unit_diagonal(&mut m, base, n);
    for j in 0..n {
        for i in 0..=j {
            let weight = if i == j { 1.0 } else { 2.0 };
            let var = base + packed(i, j);
            m.quadratic_cost(var, var, weight);
            m.linear_cost(var, -2.0 * weight * target[i][j]);
            m.constant_cost(weight * target[i][j] * target[i][j]);
        }
    }
    m.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProblemInstance;

    #[test]
    fn test_packed_index() {
        assert_eq!(packed(0, 0), 0);
        assert_eq!(packed(0, 1), 1);
        assert_eq!(packed(1, 1), 2);
        assert_eq!(packed(2, 0), 3);
    }

    #[test]
    fn test_max_cut_sizes() {
        let model = max_cut_small(0);
        let metrics = model.size_metrics();
        assert_eq!(metrics.num_scalar_variables, 210);
        assert_eq!(metrics.num_scalar_eq_constr, 20);
        assert_eq!(model.cones[0], Cone::PsdTriangle(20));
    }

    #[test]
    fn test_nearest_correlation_is_quadratic_sdp() {
        let model = nearest_correlation_small(0);
        assert!(model.structure().quadratic_objective);
        model.validate().unwrap();
    }
}
