//! Lex, parse and roll dice notation such as `3d6 + 2`, `4d6 keep 3` or `2d20 adv`.
//!
//! ```rust
//! # use kismet::{evaluate, roll_with, Expression, NodeId, ScriptedSource, SeededSource};
//! #
//! # fn main() -> Result<(), kismet::Error> {
//! // Roll with faces of your choosing, handy for tests.
//! let rolled = roll_with("4d6kh3", &mut ScriptedSource::new([1, 4, 6, 2]))?;
//! println!("{rolled}"); // 4d6kh3 [1d, 4, 6, 2] = 12
//!
//! // Or parse once and roll the tree as often as you like.
//! let expression = Expression::parse("2d6 + 3")?;
//! let mut source = SeededSource::seeded(1);
//! let result = evaluate(&expression, &mut source)?;
//! assert_eq!(result.trail().len(), 2);
//! assert_eq!(result.sub_total(NodeId(2)), Some(3));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod evaluate;
mod parse;

pub use config::{Limits, Syntax};
pub use error::{Error, EvalError, EvalErrorKind, LexError, ParseError};
pub use evaluate::{
    evaluate, evaluate_with, to_notations, EntropySource, EvaluationResult, NodeId,
    RandomnessSource, RngSource, RolledExpression, RollOutcome, ScriptedSource, SeededSource,
};
pub use parse::{
    parse, tokenize, tokenize_with, CompareOp, Condition, DiceTerm, Expression, Keyword, Lexer,
    Modifier, Operator, Token, TokenKind,
};

/// Parses the notation and rolls it with fresh entropy.
pub fn roll(notation: &str) -> Result<RolledExpression, Error> {
    roll_with(notation, &mut EntropySource::entropy())
}

/// Same as `roll()` but draws the faces from the source you pass in.
pub fn roll_with<S>(notation: &str, source: &mut S) -> Result<RolledExpression, Error>
where
    S: RandomnessSource + ?Sized,
{
    let expression = Expression::parse(notation)?;
    let result = evaluate(&expression, source)?;
    Ok(RolledExpression::new(expression, result))
}
