//! Linear programs.

use super::{dot, normal, normal_vec, seeded, sum_of, uniform};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "lp/diet_small",
        &["lp", "small"],
        "Small diet problem (20 foods, 10 nutrients)",
        diet_small,
    )?;
    registry.register(
        "lp/transportation_medium",
        &["lp", "medium"],
        "Transportation problem (50 sources, 100 sinks)",
        transportation_medium,
    )?;
    registry.register(
        "lp/basis_pursuit_large",
        &["lp", "large"],
        "Basis pursuit via LP (m=200, n=1000)",
        basis_pursuit_large,
    )?;
    Ok(())
}

fn diet_small(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (n_foods, n_nutrients) = (20, 10);
    let costs: Vec<f64> = (0..n_foods).map(|_| uniform(&mut rng, 1.0, 10.0)).collect();
    let content: Vec<Vec<f64>> = (0..n_nutrients)
        .map(|_| (0..n_foods).map(|_| uniform(&mut rng, 0.0, 1.0)).collect())
        .collect();
    let low: Vec<f64> = (0..n_nutrients).map(|_| uniform(&mut rng, 1.0, 3.0)).collect();
    let high: Vec<f64> = low
        .iter()
        .map(|l| l + uniform(&mut rng, 1.0, 5.0))
        .collect();

    let mut m = ModelBuilder::new();
    let x = m.variables(n_foods);
    for (j, c) in x.clone().zip(&costs) {
        m.linear_cost(j, *c);
    }

    let mut rows: Vec<Row> = x.clone().map(|j| Row::ge(vec![(j, 1.0)], 0.0)).collect();
    for (k, row) in content.iter().enumerate() {
        rows.push(Row::ge(dot(x.clone(), row), low[k]));
        rows.push(Row::le(dot(x.clone(), row), high[k]));
    }
    rows.extend(x.map(|j| Row::le(vec![(j, 1.0)], 10.0)));
    m.constraint(Cone::Nonnegative(rows.len()), rows);
    m.build()
}

fn transportation_medium(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (sources, sinks) = (50, 100);
    let costs: Vec<f64> = (0..sources * sinks)
        .map(|_| uniform(&mut rng, 1.0, 20.0))
        .collect();
    let supply: Vec<f64> = (0..sources).map(|_| uniform(&mut rng, 10.0, 50.0)).collect();
    let raw_demand: Vec<f64> = (0..sinks).map(|_| uniform(&mut rng, 1.0, 10.0)).collect();
    let scale = supply.iter().sum::<f64>() / raw_demand.iter().sum::<f64>();
    let demand: Vec<f64> = raw_demand.iter().map(|d| d * scale).collect();

    let mut m = ModelBuilder::new();
    // Row-major flows: x[i * sinks + j] ships from source i to sink j.
    let x = m.variables(sources * sinks);
    for (j, c) in x.clone().zip(&costs) {
        m.linear_cost(j, *c);
    }

    let mut rows: Vec<Row> = x.clone().map(Row::var).collect();
    for (i, s) in supply.iter().enumerate() {
        let start = x.start + i * sinks;
        rows.push(Row::le(sum_of(start..start + sinks), *s));
    }
    for (j, d) in demand.iter().enumerate() {
        let column = (0..sources).map(|i| (x.start + i * sinks + j, 1.0)).collect();
        rows.push(Row::ge(column, *d));
    }
    m.constraint(Cone::Nonnegative(rows.len()), rows);
    m.build()
}

fn basis_pursuit_large(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (rows_a, n) = (200, 1000);
    let a: Vec<Vec<f64>> = (0..rows_a).map(|_| normal_vec(&mut rng, n, 1.0)).collect();
    let x_true: Vec<f64> = (0..n)
        .map(|_| {
            let v = normal(&mut rng);
            // ~90% sparse
            if uniform(&mut rng, 0.0, 1.0) > 0.1 {
                0.0
            } else {
                v
            }
        })
        .collect();
    let b: Vec<f64> = a
        .iter()
        .map(|row| row.iter().zip(&x_true).map(|(a, x)| a * x).sum())
        .collect();

    // minimize ‖x‖₁ through the epigraph -t ≤ x ≤ t
    let mut m = ModelBuilder::new();
    let x = m.variables(n);
    let t = m.variables(n);
    for j in t.clone() {
        m.linear_cost(j, 1.0);
    }

    let eq: Vec<Row> = a
        .iter()
        .zip(&b)
        .map(|(row, bi)| Row::eq(dot(x.clone(), row), *bi))
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
    fn test_diet_sizes() {
        let model = diet_small(0);
        let metrics = model.size_metrics();
        assert_eq!(metrics.num_scalar_variables, 20);
        assert_eq!(metrics.num_scalar_eq_constr, 0);
        assert_eq!(metrics.num_scalar_leq_constr, 60);
    }

    #[test]
    fn test_transportation_demand_matches_supply() {
        let model = transportation_medium(3);
        let metrics = model.size_metrics();
        assert_eq!(metrics.num_scalar_variables, 5000);
        assert_eq!(metrics.num_scalar_leq_constr, 5000 + 50 + 100);
    }

    #[test]
    fn test_basis_pursuit_is_deterministic() {
        assert_eq!(basis_pursuit_large(0), basis_pursuit_large(0));
    }
}
