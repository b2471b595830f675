//! Problem classification by the most expressive structural feature present.

use crate::error::BenchError;
use crate::model::{ConeKind, ProblemInstance};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Category label recorded in every benchmark result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProblemType {
    Mip,
    Sdp,
    Ecp,
    Socp,
    Qp,
    Lp,
}

impl ProblemType {
    pub const ALL: [ProblemType; 6] = [
        Self::Mip,
        Self::Sdp,
        Self::Ecp,
        Self::Socp,
        Self::Qp,
        Self::Lp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mip => "MIP",
            Self::Sdp => "SDP",
            Self::Ecp => "ECP",
            Self::Socp => "SOCP",
            Self::Qp => "QP",
            Self::Lp => "LP",
        }
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemType {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BenchError::UnknownProblemType { name: s.to_string() })
    }
}

/// Classify a problem instance.
///
/// First match wins: integrality, then PSD, exponential, and second-order
/// cones, then a quadratic objective. A MIP with SDP constraints is a MIP.
pub fn classify(instance: &impl ProblemInstance) -> ProblemType {
    let structure = instance.structure();

    if structure.has_integer_vars {
        return ProblemType::Mip;
    }
    if structure.cone_kinds.contains(&ConeKind::Psd) {
        return ProblemType::Sdp;
    }
    if structure.cone_kinds.contains(&ConeKind::Exponential) {
        return ProblemType::Ecp;
    }
    if structure.cone_kinds.contains(&ConeKind::SecondOrder) {
        return ProblemType::Socp;
    }
    if structure.quadratic_objective {
        return ProblemType::Qp;
    }
    ProblemType::Lp
}
