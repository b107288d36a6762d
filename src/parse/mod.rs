mod dice;
mod expression;
mod lexer;

pub use expression::parse;
pub use lexer::{tokenize, tokenize_with, Keyword, Lexer, Token, TokenKind};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceTerm {
    pub(crate) count: u32,
    pub(crate) sides: u32,
    pub(crate) modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// =
    Equal,
    /// <>
    NotEqual,
    /// <
    Less,
    /// \>
    Greater,
    /// <=
    LessOrEqual,
    /// \>=
    GreaterOrEqual,
}

/// A test against a single rolled face, such as `=1` or `>=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub compare: CompareOp,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Modifiers follow a dice term and are applied in the order they were written.
pub enum Modifier {
    /// `kh{amount}`, `k{amount}`, `keep {amount}`, `keep highest {amount}` or `adv`\
    /// Drops every die except the highest `{amount}`.
    KeepHighest(u32),
    /// `kl{amount}`, `keep lowest {amount}` or `dis`\
    /// Drops every die except the lowest `{amount}`.
    KeepLowest(u32),
    /// `dh{amount}` or `drop highest {amount}`\
    /// Drops the highest `{amount}` dice.
    DropHighest(u32),
    /// `dl{amount}`, `drop {amount}` or `drop lowest {amount}`\
    /// Drops the lowest `{amount}` dice.
    DropLowest(u32),
    /// `r` or `r{condition}`\
    /// Replaces a die matching the condition (the lowest face if none is given)
    /// until it no longer matches.
    Reroll(Option<Condition>),
    /// `ro` or `ro{condition}`\
    /// Like `Reroll` but replaces each die at most once.
    RerollOnce(Option<Condition>),
    /// `!` or `!{condition}`\
    /// Adds another die whenever a die matches the condition (the highest face
    /// if none is given). Added dice can explode too.
    Explode(Option<Condition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(i64),
    Dice(DiceTerm),
    BinaryOp(Operator, Box<Expression>, Box<Expression>),
    Grouping(Box<Expression>),
    Negate(Box<Expression>),
}

impl DiceTerm {
    pub fn new(count: u32, sides: u32, modifiers: Vec<Modifier>) -> Self {
        Self {
            count,
            sides,
            modifiers,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
    pub fn sides(&self) -> u32 {
        self.sides
    }
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}

impl Condition {
    pub fn new(compare: CompareOp, value: i64) -> Self {
        Self { compare, value }
    }

    pub fn equal(value: i64) -> Self {
        Self::new(CompareOp::Equal, value)
    }

    pub fn matches(self, face: u32) -> bool {
        let face = i64::from(face);
        match self.compare {
            CompareOp::Equal => face == self.value,
            CompareOp::NotEqual => face != self.value,
            CompareOp::Less => face < self.value,
            CompareOp::Greater => face > self.value,
            CompareOp::LessOrEqual => face <= self.value,
            CompareOp::GreaterOrEqual => face >= self.value,
        }
    }

    /// Whether any face of a die with `sides` sides passes.
    pub fn can_match(self, sides: u32) -> bool {
        let (min, max) = (1, i64::from(sides));
        match self.compare {
            CompareOp::Equal => min <= self.value && self.value <= max,
            CompareOp::NotEqual => max > min || self.value != min,
            CompareOp::Less => self.value > min,
            CompareOp::Greater => self.value < max,
            CompareOp::LessOrEqual => self.value >= min,
            CompareOp::GreaterOrEqual => self.value <= max,
        }
    }
}

impl Expression {
    /// Lexes and parses the notation with the standard keyword spellings.
    pub fn parse(notation: &str) -> Result<Expression, Error> {
        let tokens = tokenize(notation)?;
        Ok(parse(&tokens)?)
    }

    /// Number of nodes in the tree, which is also one past the largest node id.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            match node {
                Expression::Literal(_) | Expression::Dice(_) => {}
                Expression::BinaryOp(_, lhs, rhs) => pending.extend([&**lhs, &**rhs]),
                Expression::Grouping(inner) | Expression::Negate(inner) => pending.push(inner),
            }
        }
        count
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(val) => write!(f, "{val}"),
            Expression::Dice(term) => write!(f, "{term}"),
            Expression::BinaryOp(op, lhs, rhs) => write!(f, "{lhs} {op} {rhs}"),
            Expression::Grouping(inner) => write!(f, "({inner})"),
            Expression::Negate(inner) => write!(f, "-{inner}"),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        };
        write!(f, "{str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_matches() {
        assert!(Condition::equal(1).matches(1));
        assert!(!Condition::equal(1).matches(2));
        assert!(Condition::new(CompareOp::Less, 3).matches(2));
        assert!(!Condition::new(CompareOp::Less, 3).matches(3));
        assert!(Condition::new(CompareOp::GreaterOrEqual, 5).matches(5));
        assert!(Condition::new(CompareOp::NotEqual, 5).matches(6));
    }

    #[test]
    fn test_condition_can_match() {
        assert!(Condition::equal(6).can_match(6));
        assert!(!Condition::equal(7).can_match(6));
        assert!(!Condition::new(CompareOp::Greater, 6).can_match(6));
        assert!(!Condition::new(CompareOp::Less, 1).can_match(6));
        assert!(Condition::new(CompareOp::LessOrEqual, 1).can_match(6));
        assert!(!Condition::new(CompareOp::NotEqual, 1).can_match(1));
        assert!(Condition::new(CompareOp::NotEqual, 1).can_match(2));
    }

    #[test]
    fn test_node_count() {
        let expression = Expression::parse("(2d6 + 3) * -4").unwrap();
        assert_eq!(expression.node_count(), 7);
    }
}
