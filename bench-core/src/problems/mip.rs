//! Mixed-integer programs.

use super::{dot, seeded, sum_of, uniform};
use crate::error::BenchResult;
use crate::model::{Cone, ConicModel, ModelBuilder, Row};
use crate::registry::ProblemRegistry;

pub fn register(registry: &mut ProblemRegistry) -> BenchResult<()> {
    registry.register(
        "mip/knapsack_small",
        &["mip", "small"],
        "0-1 knapsack (30 items)",
        knapsack_small,
    )?;
    registry.register(
        "mip/facility_location",
        &["mip", "medium"],
        "Facility location (10 facilities, 50 customers)",
        facility_location,
    )?;
    Ok(())
}

fn knapsack_small(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let n = 30;
    let values: Vec<f64> = (0..n).map(|_| uniform(&mut rng, 1.0, 100.0)).collect();
    let weights: Vec<f64> = (0..n).map(|_| uniform(&mut rng, 1.0, 50.0)).collect();
    let capacity = weights.iter().sum::<f64>() * 0.4;

    let mut m = ModelBuilder::new();
    m.maximize();
    let x = m.variables(n);
    m.boolean(x.clone());
    for (j, v) in x.clone().zip(&values) {
        m.linear_cost(j, *v);
    }
    m.constraint(
        Cone::Nonnegative(1),
        vec![Row::le(dot(x, &weights), capacity)],
    );
    m.build()
}

fn facility_location(seed: u64) -> ConicModel {
    let mut rng = seeded(seed);
    let (facilities, customers) = (10, 50);
    let fixed: Vec<f64> = (0..facilities)
        .map(|_| uniform(&mut rng, 100.0, 500.0))
        .collect();
    let transport: Vec<f64> = (0..facilities * customers)
        .map(|_| uniform(&mut rng, 1.0, 20.0))
        .collect();
    let demand: Vec<f64> = (0..customers).map(|_| uniform(&mut rng, 1.0, 10.0)).collect();
    let capacity: Vec<f64> = (0..facilities)
        .map(|_| uniform(&mut rng, 50.0, 150.0))
        .collect();

    let mut m = ModelBuilder::new();
    let open = m.variables(facilities);
    m.boolean(open.clone());
    // x[i * customers + j]: amount facility i serves customer j
    let x = m.variables(facilities * customers);
    for (i, c) in open.clone().zip(&fixed) {
        m.linear_cost(i, *c);
    }
    for (j, c) in x.clone().zip(&transport) {
        m.linear_cost(j, *c);
    }

    let mut rows: Vec<Row> = x.clone().map(Row::var).collect();
    for (j, d) in demand.iter().enumerate() {
        let served = (0..facilities)
            .map(|i| (x.start + i * customers + j, 1.0))
            .collect();
        rows.push(Row::ge(served, *d));
    }
    for (i, cap) in capacity.iter().enumerate() {
        let start = x.start + i * customers;
        let mut coeffs = sum_of(start..start + customers);
        coeffs.push((open.start + i, -cap));
        rows.push(Row::le(coeffs, 0.0));
    }
    m.constraint(Cone::Nonnegative(rows.len()), rows);
    m.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProblemInstance;

    #[test]
    fn test_knapsack_is_boolean() {
        let model = knapsack_small(0);
        assert_eq!(model.integer_vars.len(), 30);
        // two bounds per item plus the capacity row
        assert_eq!(model.size_metrics().num_scalar_leq_constr, 61);
    }

    #[test]
    fn test_facility_location_integrality_only_on_open() {
        let model = facility_location(0);
        assert_eq!(model.integer_vars, (0..10).collect::<Vec<_>>());
        assert_eq!(model.size_metrics().num_scalar_variables, 510);
    }
}
