//! Quadratic programs.

use super::{dot, normal_vec, seeded, sum_of};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "qp/portfolio_small",
        &["qp", "small"],
        "Small portfolio optimization (50 assets)",
        |seed| portfolio(seed, 50, 10),
    )?;
    registry.register(
        "qp/portfolio_medium",
        &["qp", "medium"],
        "Medium portfolio optimization (500 assets)",
        |seed| portfolio(seed, 500, 30),
    )?;
    registry.register(
        "qp/lasso_medium",
        &["qp", "medium"],
        "Lasso regression (m=200, n=500)",
        lasso_medium,
    )?;
    Ok(())
}

/// Mean-variance portfolio with a factor risk model.
///
/// `minimize -μᵀx + γ‖Fᵀx‖²` over the simplex, with `y = Fᵀx` as auxiliary
/// variables so the quadratic term stays diagonal.
fn portfolio(seed: u64, assets: usize, factors: usize) -> ConicModel {
    let mut rng = seeded(seed);
    let mu = normal_vec(&mut rng, assets, 0.05);
    let loadings: Vec<Vec<f64>> = (0..assets)
        .map(|_| normal_vec(&mut rng, factors, 0.1))
        .collect();
    let gamma = 1.0;

    let mut m = ModelBuilder::new();
    let x = m.variables(assets);
    let y = m.variables(factors);
    for (j, r) in x.clone().zip(&mu) {
        m.linear_cost(j, -r);
    }
    for k in y.clone() {
        m.quadratic_cost(k, k, gamma);
    }

    let mut eq = vec![Row::eq(sum_of(x.clone()), 1.0)];
    for (f, yk) in y.enumerate() {
        let mut coeffs: Vec<(usize, f64)> = x
            .clone()
            .zip(&loadings)
            .map(|(j, row)| (j, row[f]))
            .collect();
        coeffs.push((yk, -1.0));
        eq.push(Row::eq(coeffs, 0.0));
    }
    m.constraint(Cone::Zero(eq.len()), eq);

    let nonneg: Vec<Row> = x.map(Row::var).collect();
    m.constraint(Cone::Nonnegative(nonneg.len()), nonneg);
    m.build()
}

/// `minimize ‖Ax - b‖² + λ‖x‖₁` with residual and epigraph variables.
fn lasso_medium(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (rows_a, n) = (200, 500);
    let a: Vec<Vec<f64>> = (0..rows_a).map(|_| normal_vec(&mut rng, n, 1.0)).collect();
    let b = normal_vec(&mut rng, rows_a, 1.0);
    let lambda = 0.1;

    let mut m = ModelBuilder::new();
    let x = m.variables(n);
    let r = m.variables(rows_a);
    let t = m.variables(n);
    for i in r.clone() {
        m.quadratic_cost(i, i, 1.0);
    }
    for j in t.clone() {
        m.linear_cost(j, lambda);
    }

    // r = Ax - b
    let eq: Vec<Row> = r
        .zip(a.iter().zip(&b))
        .map(|(ri, (row, bi))| {
            let mut coeffs = dot(x.clone(), row);
            coeffs.push((ri, -1.0));
            Row::eq(coeffs, *bi)
        })
        .collect();
    m.constraint(Cone::Zero(eq.len()), eq);

    let bounds: Vec<Row> = x
        .zip(t)
        .flat_map(|(xj, tj)| {
            [
                Row::le(vec![(xj, 1.0), (tj, -1.0)], 0.0),
                Row::le(vec![(xj, -1.0), (tj, -1.0)], 0.0),
            ]
        })
        .collect();
    m.constraint(Cone::Nonnegative(bounds.len()), bounds);
    m.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProblemInstance;

    #[test]
    fn test_portfolio_structure() {
        let model = portfolio(0, 50, 10);
        let metrics = model.size_metrics();
        assert_eq!(metrics.num_scalar_variables, 60);
        assert_eq!(metrics.num_scalar_eq_constr, 11);
        assert_eq!(metrics.num_scalar_leq_constr, 50);
        assert!(model.structure().quadratic_objective);
    }

    #[test]
    fn test_lasso_has_no_constraint_on_residual_sign() {
        let model = lasso_medium(0);
        assert_eq!(model.size_metrics().num_scalar_eq_constr, 200);
        assert_eq!(model.size_metrics().num_scalar_leq_constr, 1000);
    }
}
