//! Exponential cone programs.

use super::{dot, normal, normal_vec, seeded, sum_of, uniform};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "ecp/logistic_small",
        &["ecp", "small"],
        "L1-regularised logistic regression on synthetic data (m=200, n=20)",
        logistic_small,
    )?;
    registry.register(
        "ecp/entropy_max",
        &["ecp", "small"],
        "Entropy maximisation over the simplex with 10 moment constraints (n=50)",
        entropy_max,
    )?;
    Ok(())
}

/// `t ≥ log(1 + exp(u))` as `exp(-t) + exp(u - t) ≤ 1`, where `u` is given
/// as an affine expression.
fn softplus(m: &mut ModelBuilder, t: usize, u: Vec<(usize, f64)>) {
    let aux = m.variables(2);
    let (a, b) = (aux.start, aux.start + 1);
    // (-t, 1, a) ∈ K_exp  ⇔  a ≥ exp(-t)
    m.constraint(
        Cone::Exponential,
        vec![Row::expr(vec![(t, -1.0)], 0.0), Row::constant(1.0), Row::var(a)],
    );
    // (u - t, 1, b) ∈ K_exp  ⇔  b ≥ exp(u - t)
    let mut shifted = u;
    shifted.push((t, -1.0));
    m.constraint(
        Cone::Exponential,
        vec![Row::expr(shifted, 0.0), Row::constant(1.0), Row::var(b)],
    );
    m.constraint(Cone::Nonnegative(1), vec![Row::le(vec![(a, 1.0), (b, 1.0)], 1.0)]);
}

fn logistic_small(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (samples, features) = (200, 20);
    let w_true = normal_vec(&mut rng, features, 1.0);
    let data: Vec<Vec<f64>> = (0..samples)
        .map(|_| normal_vec(&mut rng, features, 1.0))
        .collect();
    let labels: Vec<f64> = data
        .iter()
        .map(|row| {
            let margin: f64 = row.iter().zip(&w_true).map(|(a, w)| a * w).sum();
            if margin + 0.5 * normal(&mut rng) >= 0.0 {
                1.0
            } else {
                -1.0
            }
        })
        .collect();
    let lambda = 0.1;

    let mut m = ModelBuilder::new();
    let w = m.variables(features);
    let t = m.variables(samples);
    let s = m.variables(features);
    for i in t.clone() {
        m.linear_cost(i, 1.0 / samples as f64);
    }
    for j in s.clone() {
        m.linear_cost(j, lambda);
    }

    for (ti, (row, y)) in t.zip(data.iter().zip(&labels)) {
        let scaled: Vec<f64> = row.iter().map(|a| -y * a).collect();
        softplus(&mut m, ti, dot(w.clone(), &scaled));
    }

    let bounds: Vec<Row> = w
        .zip(s)
        .flat_map(|(wj, sj)| {
            [
                Row::le(vec![(wj, 1.0), (sj, -1.0)], 0.0),
                Row::le(vec![(wj, -1.0), (sj, -1.0)], 0.0),
            ]
        })
        .collect();
    m.constraint(Cone::Nonnegative(bounds.len()), bounds);
    m.build()
}

/// `maximize Σ -x log x` subject to `Ax = b`, `Σx = 1`.
fn entropy_max(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (n, moments) = (50, 10);
    let a: Vec<Vec<f64>> = (0..moments)
        .map(|_| (0..n).map(|_| uniform(&mut rng, 0.0, 1.0)).collect())
        .collect();
    // b from a strictly feasible interior point
    let raw: Vec<f64> = (0..n).map(|_| uniform(&mut rng, 0.1, 1.0)).collect();
    let total: f64 = raw.iter().sum();
    let x0: Vec<f64> = raw.iter().map(|v| v / total).collect();
    let b: Vec<f64> = a
        .iter()
        .map(|row| row.iter().zip(&x0).map(|(a, x)| a * x).sum())
        .collect();

    let mut m = ModelBuilder::new();
    m.maximize();
    let x = m.variables(n);
    let t = m.variables(n);
    for j in t.clone() {
        m.linear_cost(j, 1.0);
    }

    let mut eq = vec![Row::eq(sum_of(x.clone()), 1.0)];
    eq.extend(a.iter().zip(&b).map(|(row, bi)| Row::eq(dot(x.clone(), row), *bi)));
    m.constraint(Cone::Zero(eq.len()), eq);

    let nonneg: Vec<Row> = x.clone().map(Row::var).collect();
    m.constraint(Cone::Nonnegative(n), nonneg);

    // (t, x, 1) ∈ K_exp  ⇔  x·exp(t/x) ≤ 1  ⇔  t ≤ -x log x
    for (xj, tj) in x.zip(t) {
        m.constraint(
            Cone::Exponential,
            vec![Row::var(tj), Row::var(xj), Row::constant(1.0)],
        );
    }
    m.build()
}
