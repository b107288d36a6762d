use std::collections::BTreeMap;

use crate::error::{EvalError, EvalErrorKind};

/// Pre-order index of a node in an expression tree.
///
/// The root is `NodeId(0)`; a node's children follow it left to right, so the
/// id is stable for a given tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One physical die thrown during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    /// The dice term that threw it.
    pub term: NodeId,
    pub sides: u32,
    pub value: u32,
    /// Whether the value counts toward the term's total.
    pub kept: bool,
    /// Trail index of the die this one replaced.
    pub rerolled_from: Option<usize>,
    /// Trail index of the die whose explosion added this one.
    pub exploded_from: Option<usize>,
}

impl RollOutcome {
    pub fn new(term: NodeId, sides: u32, value: u32) -> Self {
        Self {
            term,
            sides,
            value,
            kept: true,
            rerolled_from: None,
            exploded_from: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub(crate) total: i64,
    pub(crate) trail: Vec<RollOutcome>,
    pub(crate) sub_totals: BTreeMap<NodeId, i64>,
}

impl EvaluationResult {
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Every die thrown, in the order it was thrown.
    pub fn trail(&self) -> &[RollOutcome] {
        &self.trail
    }

    pub fn sub_totals(&self) -> &BTreeMap<NodeId, i64> {
        &self.sub_totals
    }

    pub fn sub_total(&self, node: NodeId) -> Option<i64> {
        self.sub_totals.get(&node).copied()
    }

    /// The outcomes that count toward the total.
    pub fn kept(&self) -> impl Iterator<Item = &RollOutcome> {
        self.trail.iter().filter(|outcome| outcome.kept)
    }

    /// The outcomes a single dice term threw, with their trail indices.
    pub fn outcomes_for(&self, term: NodeId) -> impl Iterator<Item = (usize, &RollOutcome)> {
        self.trail
            .iter()
            .enumerate()
            .filter(move |(_, outcome)| outcome.term == term)
    }
}

/// Looks up a trail entry the evaluator itself created.
pub(crate) fn trail_entry(trail: &[RollOutcome], index: usize) -> Result<&RollOutcome, EvalError> {
    trail
        .get(index)
        .ok_or_else(|| missing_entry(index, trail.len()))
}

pub(crate) fn trail_entry_mut(
    trail: &mut [RollOutcome],
    index: usize,
) -> Result<&mut RollOutcome, EvalError> {
    let len = trail.len();
    trail.get_mut(index).ok_or_else(|| missing_entry(index, len))
}

fn missing_entry(index: usize, len: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::Internal,
        format!("roll {index} is missing from a trail of {len}"),
    )
}
