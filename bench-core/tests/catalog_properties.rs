//! Property tests over the built-in problem catalog.

use bench_core::{ProblemInstance, ProblemRegistry};
use std::collections::HashSet;

const TYPE_TAGS: [&str; 6] = ["lp", "qp", "socp", "ecp", "sdp", "mip"];

#[test]
fn test_every_problem_is_well_formed() {
    let registry = ProblemRegistry::builtin().unwrap();
    assert!(!registry.is_empty());

    for spec in registry.list(None) {
        assert!(!spec.name.is_empty());
        assert!(!spec.description.is_empty(), "{} lacks a description", spec.name);
        assert!(!spec.tags.is_empty(), "{} has no tags", spec.name);

        let prefix = spec
            .type_prefix()
            .unwrap_or_else(|| panic!("{} has no type prefix", spec.name));
        assert!(TYPE_TAGS.contains(&prefix), "{} has unknown prefix", spec.name);
        assert!(spec.has_tag(prefix), "{} is not tagged {prefix}", spec.name);
    }
}

#[test]
fn test_names_are_unique() {
    let registry = ProblemRegistry::builtin().unwrap();
    let names: HashSet<_> = registry.list(None).iter().map(|s| s.name.clone()).collect();
    assert_eq!(names.len(), registry.len());
}

#[test]
fn test_factories_are_deterministic() {
    let registry = ProblemRegistry::builtin().unwrap();
    for spec in registry.list(None) {
        let a = spec.instantiate(7);
        let b = spec.instantiate(7);
        assert_eq!(a, b, "{} differs across calls with the same seed", spec.name);
        assert_eq!(a.size_metrics(), spec.instantiate(8).size_metrics());
    }
}

#[test]
fn test_tag_listing_is_subset() {
    let registry = ProblemRegistry::builtin().unwrap();
    for tag in TYPE_TAGS {
        let tagged = registry.list(Some(tag));
        assert!(!tagged.is_empty(), "no problems tagged {tag}");
        assert!(tagged.iter().all(|s| s.has_tag(tag)));
    }
    assert!(registry.list(Some("no-such-tag")).is_empty());
}
