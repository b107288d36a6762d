use super::{Expression, Operator, Token, TokenKind};
use crate::error::ParseError;

const MAX_NESTING: usize = 128;
const MAX_NODES: usize = 10_000;
const EXPECTED_TERM: &str = "a number, dice term or '('";

/// Builds the expression tree for one line of tokens.
///
/// The tokens are expected to end with [`TokenKind::EndOfInput`], as produced
/// by [`tokenize`](super::tokenize); a slice that stops early is treated as if
/// it did.
pub fn parse(tokens: &[Token]) -> Result<Expression, ParseError> {
    let mut parser = Parser::new(tokens);
    let expression = parser.parse_expr()?;
    parser.expect_end()?;

    log::debug!("parsed {expression}");
    Ok(expression)
}

pub(super) struct Parser<'t> {
    tokens: &'t [Token],
    cursor: usize,
    depth: usize,
    nodes: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
            nodes: 0,
        }
    }

    pub(super) fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.cursor).map(|token| &token.kind)
    }

    pub(super) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(super) fn position(&self) -> usize {
        match self.tokens.get(self.cursor) {
            Some(token) => token.offset,
            None => self.tokens.last().map_or(0, |token| token.offset),
        }
    }

    pub(super) fn error(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(kind) => ParseError::new(self.position(), expected, kind),
            None => ParseError::new(self.position(), expected, TokenKind::EndOfInput),
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.peek() == Some(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    /// Converts a number token into the type the grammar needs at this spot.
    pub(super) fn number_as<T: TryFrom<u64>>(
        &self,
        number: u64,
        expected: &str,
    ) -> Result<T, ParseError> {
        T::try_from(number)
            .map_err(|_| ParseError::new(self.position(), expected, TokenKind::Number(number)))
    }

    /// Counts a node that is about to be built, failing once the tree gets too large.
    pub(super) fn add_node(&mut self) -> Result<(), ParseError> {
        if self.nodes >= MAX_NODES {
            return Err(self.error("an expression of at most 10000 nodes"));
        }
        self.nodes += 1;
        Ok(())
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None | Some(TokenKind::EndOfInput) => Ok(()),
            Some(kind) if kind.starts_modifier() => {
                Err(self.error("a dice term before the modifier"))
            }
            Some(_) => Err(self.error("an operator or end of input")),
        }
    }

    fn parse_expr(&mut self) -> Result<Expression, ParseError> {
        let mut acc = self.parse_term()?;

        while let Some(op) = self.low_precedence_operator() {
            self.add_node()?;
            let rhs = self.parse_term()?;
            acc = Expression::BinaryOp(op, Box::new(acc), Box::new(rhs));
        }
        Ok(acc)
    }

    fn parse_term(&mut self) -> Result<Expression, ParseError> {
        let mut acc = self.parse_factor()?;

        while let Some(op) = self.high_precedence_operator() {
            self.add_node()?;
            let rhs = self.parse_factor()?;
            acc = Expression::BinaryOp(op, Box::new(acc), Box::new(rhs));
        }
        Ok(acc)
    }

    fn parse_factor(&mut self) -> Result<Expression, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("an expression nested less deeply"));
        }

        self.depth += 1;
        let factor = self.parse_nested_factor();
        self.depth -= 1;
        factor
    }

    fn parse_nested_factor(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                self.add_node()?;
                self.advance();
                let inner = self.parse_factor()?;
                Ok(Expression::Negate(Box::new(inner)))
            }
            Some(TokenKind::LParen) => self.parse_parens(),
            Some(TokenKind::DieOp) => self.parse_dice(1),
            Some(TokenKind::Number(number)) => {
                let number = *number;
                if self.tokens.get(self.cursor + 1).map(|t| &t.kind) == Some(&TokenKind::DieOp) {
                    let count = self.die_count(number)?;
                    self.advance();
                    return self.parse_dice(count);
                }

                let value = self.number_as(number, "a number no larger than 9223372036854775807")?;
                self.add_node()?;
                self.advance();
                Ok(Expression::Literal(value))
            }
            Some(kind) if kind.starts_modifier() => {
                Err(self.error("a dice term before the modifier"))
            }
            _ => Err(self.error(EXPECTED_TERM)),
        }
    }

    fn parse_parens(&mut self) -> Result<Expression, ParseError> {
        self.add_node()?;
        self.expect(TokenKind::LParen, "'('")?;
        let inner = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;

        Ok(Expression::Grouping(Box::new(inner)))
    }

    fn die_count(&self, number: u64) -> Result<u32, ParseError> {
        if number == 0 {
            return Err(ParseError::new(
                self.position(),
                "a die count of at least 1",
                TokenKind::Number(number),
            ));
        }
        self.number_as(number, "a die count no larger than 4294967295")
    }

    fn low_precedence_operator(&mut self) -> Option<Operator> {
        let op = match self.peek()? {
            TokenKind::Plus => Operator::Add,
            TokenKind::Minus => Operator::Sub,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn high_precedence_operator(&mut self) -> Option<Operator> {
        let op = match self.peek()? {
            TokenKind::Star => Operator::Mul,
            TokenKind::Slash => Operator::Div,
            _ => return None,
        };
        self.advance();
        Some(op)
    }
}
