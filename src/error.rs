use std::fmt::Display;

/// Failure to turn the input line into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character {character:?} at position {position}")]
    UnexpectedCharacter { position: usize, character: char },

    #[error("number {digits} at position {position} is too large")]
    NumberTooLarge { position: usize, digits: String },
}

impl LexError {
    /// Byte offset of the offending input.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::NumberTooLarge { position, .. } => *position,
        }
    }
}

/// The token sequence does not match the dice grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} at position {position}, found {found}")]
pub struct ParseError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(position: usize, expected: impl Into<String>, found: impl Display) -> Self {
        Self {
            position,
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalErrorKind {
    InvalidDieCount,
    InvalidDieSides,
    KeepDropCountExceedsDieCount,
    InfiniteReroll,
    DivisionByZero,
    ArithmeticOverflow,
    BudgetExceeded,
    /// The evaluator broke one of its own invariants. Never caused by input.
    Internal,
}

impl Display for EvalErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            EvalErrorKind::InvalidDieCount => "invalid die count",
            EvalErrorKind::InvalidDieSides => "invalid die sides",
            EvalErrorKind::KeepDropCountExceedsDieCount => "keep/drop count exceeds die count",
            EvalErrorKind::InfiniteReroll => "infinite reroll",
            EvalErrorKind::DivisionByZero => "division by zero",
            EvalErrorKind::ArithmeticOverflow => "arithmetic overflow",
            EvalErrorKind::BudgetExceeded => "budget exceeded",
            EvalErrorKind::Internal => "internal error",
        };
        write!(f, "{str}")
    }
}

/// A well formed expression that could not be rolled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub detail: String,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> EvalErrorKind {
        self.kind
    }

    /// True when the error points at a bug in the evaluator rather than at the input.
    pub fn is_defect(&self) -> bool {
        self.kind == EvalErrorKind::Internal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("lex error - {0}")]
    Lex(#[from] LexError),

    #[error("parse error - {0}")]
    Parse(#[from] ParseError),

    #[error("roll error - {0}")]
    Eval(#[from] EvalError),
}

impl Error {
    /// Position in the input line, for errors that have one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Lex(err) => Some(err.position()),
            Error::Parse(err) => Some(err.position),
            Error::Eval(_) => None,
        }
    }

    pub fn is_defect(&self) -> bool {
        matches!(self, Error::Eval(err) if err.is_defect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::new(5, "a number, dice term or '('", "end of input");
        assert_eq!(
            err.to_string(),
            "expected a number, dice term or '(' at position 5, found end of input"
        );
    }

    #[test]
    fn test_error_position() {
        let err: Error = LexError::UnexpectedCharacter {
            position: 3,
            character: '$',
        }
        .into();
        assert_eq!(err.position(), Some(3));

        let err: Error = EvalError::new(EvalErrorKind::DivisionByZero, "3 / 0").into();
        assert_eq!(err.position(), None);
        assert!(!err.is_defect());
    }

    #[test]
    fn test_internal_is_defect() {
        let err = EvalError::new(EvalErrorKind::Internal, "missing roll 7");
        assert!(err.is_defect());
        assert_eq!(err.to_string(), "internal error: missing roll 7");
    }
}
