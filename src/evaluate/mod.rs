mod dice_roll;
mod expression;
mod roll;
mod source;

pub use dice_roll::to_notations;
pub use expression::{evaluate, evaluate_with, RolledExpression};
pub use roll::{EvaluationResult, NodeId, RollOutcome};
pub use source::{EntropySource, RandomnessSource, RngSource, ScriptedSource, SeededSource};
