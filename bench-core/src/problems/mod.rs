//! Built-in benchmark problem collections.
//!
//! Each submodule registers one problem family. Factories draw all data from
//! a `StdRng` seeded with the requested seed, so the same seed always yields
//! the same model.

pub mod ecp;
pub mod lp;
pub mod mip;
pub mod qp;
pub mod sdp;
pub mod socp;

use crate::error::BenchResult;
use crate::registry::ProblemRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::ops::Range;

/// Registration function exposed by every collection.
pub type Collection = fn(&mut ProblemRegistry) -> BenchResult<()>;

/// All built-in collections, in discovery order.
pub const COLLECTIONS: &[Collection] = &[
    lp::register,
    qp::register,
    socp::register,
    ecp::register,
    sdp::register,
    mip::register,
];

pub(crate) fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub(crate) fn uniform(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    rng.gen_range(lo..hi)
}

pub(crate) fn normal(rng: &mut StdRng) -> f64 {
    rng.sample(StandardNormal)
}

pub(crate) fn normal_vec(rng: &mut StdRng, n: usize, scale: f64) -> Vec<f64> {
    (0..n).map(|_| normal(rng) * scale).collect()
}

/// Coefficient list `Σ x[j]` over a variable range.
pub(crate) fn sum_of(vars: Range<usize>) -> Vec<(usize, f64)> {
    vars.map(|j| (j, 1.0)).collect()
}

/// Dot product coefficients `Σ w[k] · x[vars.start + k]`.
pub(crate) fn dot(vars: Range<usize>, weights: &[f64]) -> Vec<(usize, f64)> {
    vars.zip(weights.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ProblemType};
    use crate::model::ProblemInstance;

    #[test]
    fn test_every_factory_builds_a_valid_model() {
        let registry = ProblemRegistry::builtin().unwrap();
        for spec in registry.list(None) {
            let model = spec.instantiate(0);
            model
                .validate()
                .unwrap_or_else(|e| panic!("{} produced an invalid model: {e}", spec.name));
        }
    }

    #[test]
    fn test_classification_matches_name_prefix() {
        let registry = ProblemRegistry::builtin().unwrap();
        for spec in registry.list(None) {
            let expected: ProblemType = spec.type_prefix().unwrap().parse().unwrap();
            assert_eq!(
                classify(&spec.instantiate(0)),
                expected,
                "{} classified unexpectedly",
                spec.name
            );
        }
    }

    #[test]
    fn test_seed_changes_data_not_size() {
        let registry = ProblemRegistry::builtin().unwrap();
        let spec = registry.get("lp/diet_small").unwrap();
        let a = spec.instantiate(0);
        let b = spec.instantiate(1);
        assert_eq!(a.size_metrics(), b.size_metrics());
        assert_ne!(a.objective.q, b.objective.q);
    }

    #[test]
    fn test_normal_draws_are_standard() {
        let mut rng = seeded(7);
        let draws: Vec<f64> = (0..4000).map(|_| normal(&mut rng)).collect();
        assert!(draws.iter().all(|v| v.is_finite()));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.15, "variance {var}");
    }
}
