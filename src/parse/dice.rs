use super::{
    expression::Parser, CompareOp, Condition, DiceTerm, Expression, Modifier, TokenKind,
};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeepKind {
    Highest,
    Lowest,
}

impl TokenKind {
    pub(crate) fn starts_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Keep
                | TokenKind::Drop
                | TokenKind::Highest
                | TokenKind::Lowest
                | TokenKind::KeepHighest
                | TokenKind::KeepLowest
                | TokenKind::DropHighest
                | TokenKind::DropLowest
                | TokenKind::Reroll
                | TokenKind::RerollOnce
                | TokenKind::Explode
                | TokenKind::Advantage
                | TokenKind::Disadvantage
        )
    }
}

impl Parser<'_> {
    /// Parses `d{sides}{modifiers}`, the count having been read already.
    pub(super) fn parse_dice(&mut self, count: u32) -> Result<Expression, ParseError> {
        self.add_node()?;
        self.expect(TokenKind::DieOp, "'d'")?;

        let sides = match self.peek() {
            Some(TokenKind::Number(number)) => {
                let sides = self.number_as(*number, "a side count no larger than 4294967295")?;
                self.advance();
                sides
            }
            Some(TokenKind::Percent) => {
                self.advance();
                100
            }
            _ => return Err(self.error("a number of sides or '%'")),
        };

        let mut modifiers = Vec::new();
        while let Some(modifier) = self.parse_modifier()? {
            modifiers.push(modifier);
        }

        Ok(Expression::Dice(DiceTerm::new(count, sides, modifiers)))
    }

    fn parse_modifier(&mut self) -> Result<Option<Modifier>, ParseError> {
        let Some(kind) = self.peek() else {
            return Ok(None);
        };
        if !kind.starts_modifier() {
            return Ok(None);
        }

        let kind = kind.clone();
        let position = self.position();
        self.advance();

        let modifier = match kind {
            TokenKind::Keep => match self.keep_kind() {
                Some(KeepKind::Lowest) => Modifier::KeepLowest(self.amount()?),
                _ => Modifier::KeepHighest(self.amount()?),
            },
            TokenKind::Drop => match self.keep_kind() {
                Some(KeepKind::Highest) => Modifier::DropHighest(self.amount()?),
                _ => Modifier::DropLowest(self.amount()?),
            },
            TokenKind::KeepHighest => Modifier::KeepHighest(self.amount()?),
            TokenKind::KeepLowest => Modifier::KeepLowest(self.amount()?),
            TokenKind::DropHighest => Modifier::DropHighest(self.amount()?),
            TokenKind::DropLowest => Modifier::DropLowest(self.amount()?),
            TokenKind::Reroll => Modifier::Reroll(self.condition()?),
            TokenKind::RerollOnce => Modifier::RerollOnce(self.condition()?),
            TokenKind::Explode => Modifier::Explode(self.condition()?),
            TokenKind::Advantage => Modifier::KeepHighest(1),
            TokenKind::Disadvantage => Modifier::KeepLowest(1),
            // `highest`/`lowest` only make sense right after `keep` or `drop`
            _ => return Err(ParseError::new(position, "'keep' or 'drop' before it", kind)),
        };
        Ok(Some(modifier))
    }

    fn keep_kind(&mut self) -> Option<KeepKind> {
        let kind = match self.peek()? {
            TokenKind::Highest => KeepKind::Highest,
            TokenKind::Lowest => KeepKind::Lowest,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    fn amount(&mut self) -> Result<u32, ParseError> {
        match self.peek() {
            Some(TokenKind::Number(number)) => {
                let amount = self.number_as(*number, "a number of dice no larger than 4294967295")?;
                self.advance();
                Ok(amount)
            }
            _ => Err(self.error("a number of dice")),
        }
    }

    fn condition(&mut self) -> Result<Option<Condition>, ParseError> {
        let compare = match self.peek() {
            Some(TokenKind::Compare(compare)) => {
                let compare = *compare;
                self.advance();
                compare
            }
            // a bare number is shorthand for `={number}`
            Some(TokenKind::Number(_)) => CompareOp::Equal,
            _ => return Ok(None),
        };

        match self.peek() {
            Some(TokenKind::Number(number)) => {
                let value =
                    self.number_as(*number, "a face value no larger than 9223372036854775807")?;
                self.advance();
                Ok(Some(Condition::new(compare, value)))
            }
            _ => Err(self.error("a face value")),
        }
    }
}

impl std::fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        for modifier in &self.modifiers {
            write!(f, "{modifier}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::KeepHighest(amount) => write!(f, "kh{amount}"),
            Modifier::KeepLowest(amount) => write!(f, "kl{amount}"),
            Modifier::DropHighest(amount) => write!(f, "dh{amount}"),
            Modifier::DropLowest(amount) => write!(f, "dl{amount}"),
            Modifier::Reroll(cmp) => write!(f, "r{}", cmp_str(cmp)),
            Modifier::RerollOnce(cmp) => write!(f, "ro{}", cmp_str(cmp)),
            Modifier::Explode(cmp) => write!(f, "!{}", cmp_str(cmp)),
        }
    }
}

fn cmp_str(cmp: &Option<Condition>) -> String {
    cmp.map(|c| c.to_string()).unwrap_or_default()
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.compare, self.value)
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::LessOrEqual => "<=",
            CompareOp::GreaterOrEqual => ">=",
        };
        write!(f, "{str}")
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        parse::{CompareOp, Condition, Modifier},
        Expression,
    };

    fn modifiers(input: &str) -> Vec<Modifier> {
        let Expression::Dice(term) = Expression::parse(input).unwrap() else {
            panic!("{input} is not a dice term")
        };
        term.modifiers
    }

    /**
     * Parsing dice without modifiers
     */

    #[test]
    fn test_one_standard_d6() {
        let Expression::Dice(term) = Expression::parse("1d6").unwrap() else {
            panic!()
        };
        assert_eq!(term.count, 1);
        assert_eq!(term.sides, 6);
        assert_eq!(term.modifiers, vec![]);
    }

    #[test]
    fn test_one_standard_d6_without_quantity() {
        let Expression::Dice(term) = Expression::parse("d6").unwrap() else {
            panic!()
        };
        assert_eq!(term.count, 1);
        assert_eq!(term.sides, 6);
    }

    #[test]
    fn test_one_percentile_dice() {
        let Expression::Dice(term) = Expression::parse("2d%").unwrap() else {
            panic!()
        };
        assert_eq!(term.count, 2);
        assert_eq!(term.sides, 100);
    }

    #[test]
    fn test_zero_sides_parses() {
        let Expression::Dice(term) = Expression::parse("1d0").unwrap() else {
            panic!()
        };
        assert_eq!(term.sides, 0);
    }

    #[test]
    fn test_missing_sides() {
        let err = Expression::parse("3d + 1").unwrap_err();
        assert_eq!(err.position(), Some(3));
    }

    /**
     * Parsing modifiers
     */

    #[test]
    fn test_modifier_keep_default() {
        assert_eq!(modifiers("4d6 keep 3"), vec![Modifier::KeepHighest(3)]);
        assert_eq!(modifiers("4d6k3"), vec![Modifier::KeepHighest(3)]);
    }

    #[test]
    fn test_modifier_keep_highest() {
        assert_eq!(modifiers("4d6kh3"), vec![Modifier::KeepHighest(3)]);
        assert_eq!(modifiers("4d6 keep highest 3"), vec![Modifier::KeepHighest(3)]);
    }

    #[test]
    fn test_modifier_keep_lowest() {
        assert_eq!(modifiers("4d6kl2"), vec![Modifier::KeepLowest(2)]);
        assert_eq!(modifiers("4d6 keep lowest 2"), vec![Modifier::KeepLowest(2)]);
    }

    #[test]
    fn test_modifier_drop_default() {
        assert_eq!(modifiers("4d6 drop 1"), vec![Modifier::DropLowest(1)]);
    }

    #[test]
    fn test_modifier_drop_highest() {
        assert_eq!(modifiers("4d6dh1"), vec![Modifier::DropHighest(1)]);
        assert_eq!(modifiers("4d6 drop highest 1"), vec![Modifier::DropHighest(1)]);
    }

    #[test]
    fn test_modifier_drop_lowest() {
        assert_eq!(modifiers("4d6dl1"), vec![Modifier::DropLowest(1)]);
        assert_eq!(modifiers("4d6 DROP LOWEST 1"), vec![Modifier::DropLowest(1)]);
    }

    #[test]
    fn test_modifier_keep_missing_amount() {
        let err = Expression::parse("4d6kh").unwrap_err();
        assert_eq!(err.position(), Some(5));
        assert!(Expression::parse("4d6 keep highest").is_err());
    }

    #[test]
    fn test_modifier_advantage() {
        assert_eq!(modifiers("2d20 adv"), vec![Modifier::KeepHighest(1)]);
        assert_eq!(modifiers("2d20 disadvantage"), vec![Modifier::KeepLowest(1)]);
    }

    #[test]
    fn test_modifier_reroll() {
        assert_eq!(modifiers("1d6r"), vec![Modifier::Reroll(None)]);
        assert_eq!(
            modifiers("1d6 reroll=1"),
            vec![Modifier::Reroll(Some(Condition::equal(1)))]
        );
    }

    #[test]
    fn test_modifier_reroll_bare_number() {
        assert_eq!(
            modifiers("1d6r2"),
            vec![Modifier::Reroll(Some(Condition::equal(2)))]
        );
    }

    #[test]
    fn test_modifier_reroll_once_less_than() {
        assert_eq!(
            modifiers("3d6ro<3"),
            vec![Modifier::RerollOnce(Some(Condition::new(CompareOp::Less, 3)))]
        );
    }

    #[test]
    fn test_modifier_exploding() {
        assert_eq!(modifiers("3d6!"), vec![Modifier::Explode(None)]);
        assert_eq!(
            modifiers("3d6 explode >=5"),
            vec![Modifier::Explode(Some(Condition::new(
                CompareOp::GreaterOrEqual,
                5
            )))]
        );
    }

    #[test]
    fn test_modifier_condition_missing_value() {
        let err = Expression::parse("1d6r<").unwrap_err();
        assert_eq!(err.position(), Some(5));
    }

    #[test]
    fn test_modifiers_keep_written_order() {
        assert_eq!(
            modifiers("4d6r1!kh3"),
            vec![
                Modifier::Reroll(Some(Condition::equal(1))),
                Modifier::Explode(None),
                Modifier::KeepHighest(3),
            ]
        );
    }

    #[test]
    fn test_rank_without_keep() {
        let err = Expression::parse("4d6 highest 3").unwrap_err();
        assert_eq!(err.position(), Some(4));
    }

    /**
     * Rendering
     */

    #[test]
    fn test_display_canonical() {
        #[rustfmt::skip]
        let inputs = [
            ("4d6 keep 3", "4d6kh3"),
            ("d20 adv", "1d20kh1"),
            ("4d6 drop lowest 1", "4d6dl1"),
            ("3d6 explode >=5", "3d6!>=5"),
            ("3d6 ro <> 2", "3d6ro<>2"),
            ("d%", "1d100"),
        ];

        for (input, expected) in inputs {
            assert_eq!(Expression::parse(input).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_display_chains_words() {
        let expression = Expression::parse("4d6 reroll keep 3").unwrap();
        assert_eq!(expression.to_string(), "4d6rkh3");
        assert_eq!(Expression::parse("4d6rkh3").unwrap(), expression);

        let expression = Expression::parse("4d6 ro r dl1").unwrap();
        assert_eq!(expression.to_string(), "4d6rordl1");
        assert_eq!(Expression::parse("4d6rordl1").unwrap(), expression);
    }

    #[test]
    fn test_compact_spelled_out_modifiers() {
        assert_eq!(modifiers("4d6keephighest3"), vec![Modifier::KeepHighest(3)]);
        assert_eq!(modifiers("4d6droplowest1"), vec![Modifier::DropLowest(1)]);
        assert_eq!(
            modifiers("4d6rkh3"),
            vec![Modifier::Reroll(None), Modifier::KeepHighest(3)]
        );
    }
}
