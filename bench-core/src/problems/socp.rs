//! Second-order cone programs.

use super::{dot, normal_vec, seeded, sum_of};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;
use std::f64::consts::PI;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "socp/robust_portfolio",
        &["socp", "medium"],
        "Robust portfolio with SOC uncertainty (100 assets)",
        robust_portfolio,
    )?;
    registry.register(
        "socp/antenna_array",
        &["socp", "medium"],
        "Antenna array weight design (40 elements)",
        antenna_array,
    )?;
    Ok(())
}

fn robust_portfolio(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (n, factors) = (100, 20);
    let mu = normal_vec(&mut rng, n, 0.05);
    let loadings: Vec<Vec<f64>> = (0..n).map(|_| normal_vec(&mut rng, factors, 0.1)).collect();
    let kappa = 0.1;

    let mut m = ModelBuilder::new();
    m.maximize();
    let x = m.variables(n);
    for (j, r) in x.clone().zip(&mu) {
        m.linear_cost(j, *r);
    }

    m.constraint(Cone::Zero(1), vec![Row::eq(sum_of(x.clone()), 1.0)]);
    let nonneg: Vec<Row> = x.clone().map(Row::var).collect();
    m.constraint(Cone::Nonnegative(n), nonneg);

    // risk budget ‖Fᵀx‖ ≤ 0.2
    let mut risk = vec![Row::constant(0.2)];
    for f in 0..factors {
        let column: Vec<f64> = loadings.iter().map(|row| row[f]).collect();
        risk.push(Row::expr(dot(x.clone(), &column), 0.0));
    }
    m.constraint(Cone::SecondOrder(risk.len()), risk);

    // robust return μᵀx - κ‖x‖ ≥ 0.01, i.e. ‖x‖ ≤ (μᵀx - 0.01) / κ
    let scaled: Vec<f64> = mu.iter().map(|r| r / kappa).collect();
    let mut robust = vec![Row::expr(dot(x.clone(), &scaled), -0.01 / kappa)];
    robust.extend(x.map(Row::var));
    m.constraint(Cone::SecondOrder(robust.len()), robust);
    m.build()
}

/// Minimise side-lobe magnitude subject to unit broadside response.
///
/// The data is fully determined by the geometry; the seed is unused.
fn antenna_array(_seed: u64) -> ConicModel {
    let (n, looks) = (40, 100);
    let spacing = 0.5;
    let broadside = looks / 2;
    let steering = |k: usize, i: usize| -> (f64, f64) {
        let theta = -PI / 2.0 + PI * i as f64 / (looks - 1) as f64;
        let phase = 2.0 * PI * spacing * k as f64 * theta.sin();
        (phase.cos(), phase.sin())
    };

    let mut m = ModelBuilder::new();
    let w_re = m.variables(n);
    let w_im = m.variables(n);
    let t = m.variables(looks);
    for j in t.clone() {
        m.linear_cost(j, 1.0);
    }

    // Real and imaginary parts of Σ a_k w_k for look direction i.
    let response = |i: usize| -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
        let mut re = Vec::with_capacity(2 * n);
        let mut im = Vec::with_capacity(2 * n);
        for k in 0..n {
            let (a_re, a_im) = steering(k, i);
            re.push((w_re.start + k, a_re));
            re.push((w_im.start + k, -a_im));
            im.push((w_im.start + k, a_re));
            im.push((w_re.start + k, a_im));
        }
        (re, im)
    };

    let (re, im) = response(broadside);
    m.constraint(Cone::Zero(2), vec![Row::eq(re, 1.0), Row::eq(im, 0.0)]);

    let nonneg: Vec<Row> = t.clone().map(Row::var).collect();
    m.constraint(Cone::Nonnegative(looks), nonneg);

    for i in (0..looks).filter(|&i| i != broadside) {
        let (re, im) = response(i);
        m.constraint(
            Cone::SecondOrder(3),
            vec![Row::var(t.start + i), Row::expr(re, 0.0), Row::expr(im, 0.0)],
        );
    }
    m.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConeKind, ProblemInstance};

    #[test]
    fn test_robust_portfolio_cones() {
        let model = robust_portfolio(0);
        let soc: Vec<_> = model
            .cones
            .iter()
            .filter(|c| c.kind() == ConeKind::SecondOrder)
            .collect();
        assert_eq!(soc.len(), 2);
        assert_eq!(soc[0].dim(), 21);
        assert_eq!(soc[1].dim(), 101);
    }

    #[test]
    fn test_antenna_ignores_seed() {
        assert_eq!(antenna_array(0), antenna_array(42));
        assert_eq!(antenna_array(0).size_metrics().num_scalar_variables, 180);
    }
}
