//! Problem Registry: catalog of benchmark problems
//!
//! Maps unique problem names (`<type>/<identifier>`) to seeded factories plus
//! descriptive tags. The registry is an explicit object: the composition root
//! builds one with [`ProblemRegistry::builtin`], tests build their own.

use crate::error::{BenchError, BenchResult};
use crate::model::ConicModel;
use crate::problems;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Seeded problem constructor. Equal seeds must produce identical data.
pub type ProblemFactory = Arc<dyn Fn(u64) -> ConicModel + Send + Sync>;

/// A registered benchmark problem
#[derive(Clone)]
pub struct ProblemSpec {
    /// Unique name, `<type>/<identifier>` by convention
    pub name: String,
    /// Descriptive tags (type tag, size tag, ...)
    pub tags: BTreeSet<String>,
    /// Human-readable description
    pub description: String,
    factory: ProblemFactory,
}

impl ProblemSpec {
    /// Build a fresh instance from `seed`.
    pub fn instantiate(&self, seed: u64) -> ConicModel {
        (self.factory)(seed)
    }

    /// Check whether the problem carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The `<type>` part of the name, if the name follows the convention
    pub fn type_prefix(&self) -> Option<&str> {
        self.name.split_once('/').map(|(prefix, _)| prefix)
    }
}

fn check_name(name: &str) -> BenchResult<()> {
    let invalid = |reason: &str| Err(BenchError::invalid_problem_name(name, reason));
    if name.trim().is_empty() {
        return invalid("name is empty");
    }
    if name.chars().any(char::is_whitespace) {
        return invalid("name contains whitespace");
    }
    match name.split_once('/') {
        Some((kind, ident)) if !kind.is_empty() && !ident.is_empty() && !ident.contains('/') => {
            Ok(())
        }
        _ => invalid("expected <type>/<identifier>"),
    }
}

impl fmt::Debug for ProblemSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemSpec")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Which problems a batch should run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProblemSelection {
    /// Every registered problem
    #[default]
    All,
    /// Explicit names, each must exist
    Names(Vec<String>),
    /// Union of problems carrying any of these tags
    Tags(Vec<String>),
}

impl ProblemSelection {
    /// Build a selection with names taking precedence over tags.
    ///
    /// Empty lists count as absent.
    pub fn from_args(names: Option<Vec<String>>, tags: Option<Vec<String>>) -> Self {
        match (names, tags) {
            (Some(names), _) if !names.is_empty() => Self::Names(names),
            (_, Some(tags)) if !tags.is_empty() => Self::Tags(tags),
            _ => Self::All,
        }
    }
}

/// Catalog of benchmark problems, sorted by name
#[derive(Debug, Default)]
pub struct ProblemRegistry {
    specs: BTreeMap<String, ProblemSpec>,
    discovered: bool,
}

impl ProblemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in problem collection
    pub fn builtin() -> BenchResult<Self> {
        let mut registry = Self::new();
        registry.discover()?;
        Ok(registry)
    }

    /// Populate from the built-in problem collections.
    ///
    /// Runs once; later calls are no-ops. Registration only stores factories,
    /// so no problem data is generated here.
    pub fn discover(&mut self) -> BenchResult<()> {
        if self.discovered {
            return Ok(());
        }
        for register in problems::COLLECTIONS {
            register(self)?;
        }
        self.discovered = true;
        debug!(count = self.specs.len(), "Problem catalog discovered");
        Ok(())
    }

    /// Register a problem factory.
    ///
    /// Names must read `<type>/<identifier>`. Fails with
    /// [`BenchError::DuplicateProblem`] if the name is taken.
    pub fn register<F>(
        &mut self,
        name: &str,
        tags: &[&str],
        description: &str,
        factory: F,
    ) -> BenchResult<()>
    where
        F: Fn(u64) -> ConicModel + Send + Sync + 'static,
    {
        check_name(name)?;
        if self.specs.contains_key(name) {
            return Err(BenchError::duplicate_problem(name));
        }
        let spec = ProblemSpec {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: description.to_string(),
            factory: Arc::new(factory),
        };
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// List problems sorted by name, optionally filtered by tag
    pub fn list(&self, tag: Option<&str>) -> Vec<&ProblemSpec> {
        self.specs
            .values()
            .filter(|s| tag.map_or(true, |t| s.has_tag(t)))
            .collect()
    }

    /// Look up a problem by name
    pub fn get(&self, name: &str) -> BenchResult<&ProblemSpec> {
        self.specs
            .get(name)
            .ok_or_else(|| BenchError::problem_not_found(name))
    }

    /// Resolve a selection to an ordered list of problems.
    ///
    /// Names keep their given order and fail fast on the first unknown one.
    /// Both names and tag matches are de-duplicated in first-seen order.
    pub fn select(&self, selection: &ProblemSelection) -> BenchResult<Vec<&ProblemSpec>> {
        let mut seen = HashSet::new();
        match selection {
            ProblemSelection::All => Ok(self.list(None)),
            ProblemSelection::Names(names) => names
                .iter()
                .filter(|n| seen.insert(n.to_string()))
                .map(|n| self.get(n))
                .collect(),
            ProblemSelection::Tags(tags) => {
                Ok(tags
                    .iter()
                    .flat_map(|t| self.list(Some(t)))
                    .filter(|s| seen.insert(s.name.clone()))
                    .collect())
            }
        }
    }

    /// Number of registered problems
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
