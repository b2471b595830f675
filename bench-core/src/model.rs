//! Conic problem model shared by problem factories and solver backends.
//!
//! Problems are expressed in standard conic form:
//!
//! ```text
//! minimize    ½ xᵀ P x + qᵀ x + c
//! subject to  A x + s = b,   s ∈ K₁ × … × Kₘ
//! ```
//!
//! `P` is stored as its upper triangle. A `Maximize` sense negates nothing in
//! the stored data; backends apply it when solving.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// A cone block of the constraint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dim", rename_all = "snake_case")]
pub enum Cone {
    /// `s = 0` (equality rows)
    Zero(usize),
    /// `s ≥ 0` (inequality rows)
    Nonnegative(usize),
    /// `‖s[1..]‖₂ ≤ s[0]`
    SecondOrder(usize),
    /// Exponential cone, always three rows
    Exponential,
    /// Positive semidefinite cone of an `n × n` matrix, packed upper triangle
    PsdTriangle(usize),
}

impl Cone {
    /// Number of rows this block occupies in `A` and `b`.
    pub fn dim(&self) -> usize {
        match *self {
            Self::Zero(n) | Self::Nonnegative(n) | Self::SecondOrder(n) => n,
            Self::Exponential => 3,
            Self::PsdTriangle(n) => n * (n + 1) / 2,
        }
    }

    pub fn kind(&self) -> ConeKind {
        match self {
            Self::Zero(_) => ConeKind::Zero,
            Self::Nonnegative(_) => ConeKind::Nonnegative,
            Self::SecondOrder(_) => ConeKind::SecondOrder,
            Self::Exponential => ConeKind::Exponential,
            Self::PsdTriangle(_) => ConeKind::Psd,
        }
    }
}

/// Cone family without dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConeKind {
    Zero,
    Nonnegative,
    SecondOrder,
    Exponential,
    Psd,
}

/// Sparse matrix in coordinate form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    pub nrows: usize,
    pub ncols: usize,
    /// `(row, col, value)` triplets; duplicates are summed by consumers.
    pub entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            entries: Vec::new(),
        }
    }

    /// Number of stored nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.iter().filter(|(_, _, v)| *v != 0.0).count()
    }
}

/// Objective direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

/// Quadratic objective `½ xᵀ P x + qᵀ x + constant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub sense: Sense,
    /// Upper triangle of `P`
    pub p: SparseMatrix,
    pub q: Vec<f64>,
    pub constant: f64,
}

impl Objective {
    /// True when the objective has a nonzero quadratic term.
    pub fn is_quadratic(&self) -> bool {
        self.p.nnz() > 0
    }
}

/// A complete problem instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConicModel {
    pub num_vars: usize,
    /// Indices of integer-constrained variables (booleans carry explicit bounds)
    pub integer_vars: Vec<usize>,
    pub objective: Objective,
    pub a: SparseMatrix,
    pub b: Vec<f64>,
    pub cones: Vec<Cone>,
}

impl ConicModel {
    /// Check that every dimension lines up.
    pub fn validate(&self) -> BenchResult<()> {
        let cone_rows: usize = self.cones.iter().map(Cone::dim).sum();
        if cone_rows != self.a.nrows || cone_rows != self.b.len() {
            return Err(BenchError::invalid_model(format!(
                "cone rows {} do not match A rows {} / b length {}",
                cone_rows,
                self.a.nrows,
                self.b.len()
            )));
        }
        if self.a.ncols != self.num_vars || self.objective.q.len() != self.num_vars {
            return Err(BenchError::invalid_model(format!(
                "variable count {} does not match A columns {} / q length {}",
                self.num_vars,
                self.a.ncols,
                self.objective.q.len()
            )));
        }
        if let Some((r, c, _)) = self
            .a
            .entries
            .iter()
            .find(|(r, c, _)| *r >= self.a.nrows || *c >= self.num_vars)
        {
            return Err(BenchError::invalid_model(format!(
                "A entry ({r}, {c}) out of bounds"
            )));
        }
        if let Some((i, j, _)) = self
            .objective
            .p
            .entries
            .iter()
            .find(|(i, j, _)| i > j || *j >= self.num_vars)
        {
            return Err(BenchError::invalid_model(format!(
                "P entry ({i}, {j}) outside the upper triangle"
            )));
        }
        if let Some(idx) = self.integer_vars.iter().find(|&&i| i >= self.num_vars) {
            return Err(BenchError::invalid_model(format!(
                "integer variable {idx} out of range"
            )));
        }
        Ok(())
    }
}

/// Structural features used for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemStructure {
    pub has_integer_vars: bool,
    pub cone_kinds: BTreeSet<ConeKind>,
    /// Objective is quadratic and not merely affine
    pub quadratic_objective: bool,
}

/// Scalar size counts recorded with every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMetrics {
    pub num_scalar_variables: usize,
    pub num_scalar_eq_constr: usize,
    pub num_scalar_leq_constr: usize,
}

/// What the runner needs from a problem before solving it.
pub trait ProblemInstance {
    fn structure(&self) -> ProblemStructure;
    fn size_metrics(&self) -> SizeMetrics;
}

impl ProblemInstance for ConicModel {
    fn structure(&self) -> ProblemStructure {
        ProblemStructure {
            has_integer_vars: !self.integer_vars.is_empty(),
            cone_kinds: self.cones.iter().map(Cone::kind).collect(),
            quadratic_objective: self.objective.is_quadratic(),
        }
    }

    fn size_metrics(&self) -> SizeMetrics {
        let rows_of = |kind: ConeKind| -> usize {
            self.cones
                .iter()
                .filter(|c| c.kind() == kind)
                .map(Cone::dim)
                .sum()
        };
        SizeMetrics {
            num_scalar_variables: self.num_vars,
            num_scalar_eq_constr: rows_of(ConeKind::Zero),
            num_scalar_leq_constr: rows_of(ConeKind::Nonnegative),
        }
    }
}

/// One constraint row: `s = rhs - coeffs·x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub coeffs: Vec<(usize, f64)>,
    pub rhs: f64,
}

impl Row {
    /// `coeffs·x ≤ rhs` in a nonnegative block.
    pub fn le(coeffs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coeffs, rhs }
    }

    /// `coeffs·x ≥ lo` in a nonnegative block.
    pub fn ge(coeffs: Vec<(usize, f64)>, lo: f64) -> Self {
        Self::expr(coeffs, -lo)
    }

    /// `coeffs·x = rhs` in a zero block.
    pub fn eq(coeffs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coeffs, rhs }
    }

    /// Slack equal to the affine expression `constant + coeffs·x`.
    pub fn expr(coeffs: Vec<(usize, f64)>, constant: f64) -> Self {
        Self {
            coeffs: coeffs.into_iter().map(|(j, v)| (j, -v)).collect(),
            rhs: constant,
        }
    }

    /// Slack equal to a single variable.
    pub fn var(j: usize) -> Self {
        Self::expr(vec![(j, 1.0)], 0.0)
    }

    /// Slack equal to a constant.
    pub fn constant(value: f64) -> Self {
        Self::expr(Vec::new(), value)
    }
}

/// Incremental builder used by problem factories.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    num_vars: usize,
    integer_vars: Vec<usize>,
    sense: Sense,
    q: Vec<f64>,
    p_entries: Vec<(usize, usize, f64)>,
    constant: f64,
    a_entries: Vec<(usize, usize, f64)>,
    b: Vec<f64>,
    cones: Vec<Cone>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `n` new variables and return their index range.
    pub fn variables(&mut self, n: usize) -> Range<usize> {
        let start = self.num_vars;
        self.num_vars += n;
        self.q.resize(self.num_vars, 0.0);
        start..self.num_vars
    }

    /// Mark variables as integer-constrained.
    pub fn integer(&mut self, vars: Range<usize>) {
        self.integer_vars.extend(vars);
    }

    /// Mark variables as boolean: integer with `0 ≤ x ≤ 1`.
    pub fn boolean(&mut self, vars: Range<usize>) {
        let rows: Vec<Row> = vars
            .clone()
            .flat_map(|j| [Row::ge(vec![(j, 1.0)], 0.0), Row::le(vec![(j, 1.0)], 1.0)])
            .collect();
        self.constraint(Cone::Nonnegative(rows.len()), rows);
        self.integer(vars);
    }

    pub fn minimize(&mut self) {
        self.sense = Sense::Minimize;
    }

    pub fn maximize(&mut self) {
        self.sense = Sense::Maximize;
    }

    /// Add `coeff · x[var]` to the linear cost.
    pub fn linear_cost(&mut self, var: usize, coeff: f64) {
        self.q[var] += coeff;
    }

    /// Add `coeff · x[i] · x[j]` to the quadratic part (stored in `P` as the upper triangle).
    pub fn quadratic_cost(&mut self, i: usize, j: usize, coeff: f64) {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        // ½ P_ii x_i² = coeff x_i² needs P_ii = 2 coeff; the off-diagonal
        // pair (i, j) and (j, i) together contribute P_ij x_i x_j.
        let value = if i == j { 2.0 * coeff } else { coeff };
        self.p_entries.push((i, j, value));
    }

    pub fn constant_cost(&mut self, value: f64) {
        self.constant += value;
    }

    /// Append a cone block; `rows.len()` must equal `cone.dim()`.
    pub fn constraint(&mut self, cone: Cone, rows: Vec<Row>) {
        debug_assert_eq!(cone.dim(), rows.len(), "cone dimension mismatch");
        for row in rows {
            let r = self.b.len();
            self.a_entries
                .extend(row.coeffs.into_iter().filter(|(_, v)| *v != 0.0).map(|(j, v)| (r, j, v)));
            self.b.push(row.rhs);
        }
        self.cones.push(cone);
    }

    pub fn build(self) -> ConicModel {
        let nrows = self.b.len();
        ConicModel {
            num_vars: self.num_vars,
            integer_vars: self.integer_vars,
            objective: Objective {
                sense: self.sense,
                p: SparseMatrix {
                    nrows: self.num_vars,
                    ncols: self.num_vars,
                    entries: self.p_entries,
                },
                q: self.q,
                constant: self.constant,
            },
            a: SparseMatrix {
                nrows,
                ncols: self.num_vars,
                entries: self.a_entries,
            },
            b: self.b,
            cones: self.cones,
        }
    }
}
