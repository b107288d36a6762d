use log::debug;

use super::{
    expression::Evaluator,
    roll::{trail_entry, trail_entry_mut, NodeId, RollOutcome},
    source::RandomnessSource,
};
use crate::{
    error::{EvalError, EvalErrorKind},
    parse::{Condition, DiceTerm, Modifier},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rank {
    Highest,
    Lowest,
}

impl<S: RandomnessSource + ?Sized> Evaluator<'_, S> {
    /// Rolls the term's dice, applies its modifiers in order and sums the kept ones.
    pub(super) fn roll_term(&mut self, id: NodeId, term: &DiceTerm) -> Result<i64, EvalError> {
        if term.count == 0 {
            return Err(EvalError::new(
                EvalErrorKind::InvalidDieCount,
                format!("{term} needs at least 1 die"),
            ));
        }
        if term.count as usize > self.limits.max_dice {
            return Err(EvalError::new(
                EvalErrorKind::BudgetExceeded,
                format!(
                    "{term} rolls {} dice, the limit is {}",
                    term.count, self.limits.max_dice
                ),
            ));
        }

        // trail indices of the dice that currently count, in roll order
        let mut live = Vec::with_capacity(term.count as usize);
        for _ in 0..term.count {
            live.push(self.roll_die(id, term.sides, None, None)?);
        }

        for modifier in &term.modifiers {
            match *modifier {
                Modifier::KeepHighest(amount) => {
                    self.apply_keep(term, &mut live, Rank::Highest, amount)?
                }
                Modifier::KeepLowest(amount) => {
                    self.apply_keep(term, &mut live, Rank::Lowest, amount)?
                }
                Modifier::DropHighest(amount) => {
                    self.apply_drop(term, &mut live, Rank::Highest, amount)?
                }
                Modifier::DropLowest(amount) => {
                    self.apply_drop(term, &mut live, Rank::Lowest, amount)?
                }
                Modifier::Reroll(condition) => {
                    let condition = condition.unwrap_or(Condition::equal(1));
                    self.apply_reroll(id, term, &mut live, condition, false)?
                }
                Modifier::RerollOnce(condition) => {
                    let condition = condition.unwrap_or(Condition::equal(1));
                    self.apply_reroll(id, term, &mut live, condition, true)?
                }
                Modifier::Explode(condition) => {
                    let condition = condition.unwrap_or(Condition::equal(i64::from(term.sides)));
                    self.apply_explode(id, term, &mut live, condition)?
                }
            }
        }

        let mut value: i64 = 0;
        for &index in &live {
            let face = trail_entry(&self.trail, index)?.value;
            value = value.checked_add(i64::from(face)).ok_or_else(|| {
                EvalError::new(EvalErrorKind::ArithmeticOverflow, format!("sum of {term}"))
            })?;
        }

        if log::log_enabled!(log::Level::Debug) {
            let outcomes: Vec<_> = self
                .trail
                .iter()
                .enumerate()
                .filter(|(_, outcome)| outcome.term == id)
                .collect();
            debug!("rolled {term}: {} = {value}", to_notations(&outcomes, &self.trail));
        }

        Ok(value)
    }

    fn roll_die(
        &mut self,
        term: NodeId,
        sides: u32,
        rerolled_from: Option<usize>,
        exploded_from: Option<usize>,
    ) -> Result<usize, EvalError> {
        if self.trail.len() >= self.limits.max_dice {
            return Err(EvalError::new(
                EvalErrorKind::BudgetExceeded,
                format!("more than {} dice rolled", self.limits.max_dice),
            ));
        }
        self.check_time()?;

        let value = self.source.next(sides)?;
        self.trail.push(RollOutcome {
            rerolled_from,
            exploded_from,
            ..RollOutcome::new(term, sides, value)
        });
        Ok(self.trail.len() - 1)
    }

    fn face(&self, index: usize) -> Result<u32, EvalError> {
        Ok(trail_entry(&self.trail, index)?.value)
    }

    /// Live dice ordered by face, ties broken by roll order.
    fn ranked(&self, live: &[usize], rank: Rank) -> Result<Vec<usize>, EvalError> {
        let mut indices = live.to_vec();
        indices.sort_unstable();

        let mut faces = Vec::with_capacity(indices.len());
        for &index in &indices {
            faces.push((index, self.face(index)?));
        }

        match rank {
            Rank::Highest => faces.sort_by(|(_, a), (_, b)| b.cmp(a)),
            Rank::Lowest => faces.sort_by(|(_, a), (_, b)| a.cmp(b)),
        }
        Ok(faces.into_iter().map(|(index, _)| index).collect())
    }

    fn apply_keep(
        &mut self,
        term: &DiceTerm,
        live: &mut Vec<usize>,
        rank: Rank,
        amount: u32,
    ) -> Result<(), EvalError> {
        check_amount(term, amount)?;

        let ranked = self.ranked(live, rank)?;
        let amount = (amount as usize).min(ranked.len());
        self.drop_dice(live, &ranked[amount..])
    }

    fn apply_drop(
        &mut self,
        term: &DiceTerm,
        live: &mut Vec<usize>,
        rank: Rank,
        amount: u32,
    ) -> Result<(), EvalError> {
        check_amount(term, amount)?;

        let ranked = self.ranked(live, rank)?;
        let amount = (amount as usize).min(ranked.len());
        self.drop_dice(live, &ranked[..amount])
    }

    fn drop_dice(&mut self, live: &mut Vec<usize>, dropped: &[usize]) -> Result<(), EvalError> {
        for &index in dropped {
            trail_entry_mut(&mut self.trail, index)?.kept = false;
        }
        live.retain(|index| !dropped.contains(index));
        Ok(())
    }

    fn apply_reroll(
        &mut self,
        id: NodeId,
        term: &DiceTerm,
        live: &mut [usize],
        condition: Condition,
        once: bool,
    ) -> Result<(), EvalError> {
        if !condition.can_match(term.sides) {
            debug!("skipping reroll {condition} on {term}, no face can match");
            return Ok(());
        }

        let max_depth = if once { 1 } else { self.limits.max_reroll_depth };
        for slot in live.iter_mut() {
            let mut current = *slot;
            let mut depth = 0;

            while condition.matches(self.face(current)?) {
                if depth == max_depth {
                    if once {
                        break;
                    }
                    return Err(EvalError::new(
                        EvalErrorKind::InfiniteReroll,
                        format!("{term} still matched {condition} after {max_depth} rerolls"),
                    ));
                }
                depth += 1;

                trail_entry_mut(&mut self.trail, current)?.kept = false;
                current = self.roll_die(id, term.sides, Some(current), None)?;
            }
            *slot = current;
        }
        Ok(())
    }

    fn apply_explode(
        &mut self,
        id: NodeId,
        term: &DiceTerm,
        live: &mut Vec<usize>,
        condition: Condition,
    ) -> Result<(), EvalError> {
        if !condition.can_match(term.sides) {
            debug!("skipping explode {condition} on {term}, no face can match");
            return Ok(());
        }

        let max_depth = self.limits.max_reroll_depth;
        let rolled = live.len();
        for slot in 0..rolled {
            let mut current = live[slot];
            let mut depth = 0;

            while condition.matches(self.face(current)?) {
                if depth == max_depth {
                    return Err(EvalError::new(
                        EvalErrorKind::InfiniteReroll,
                        format!("{term} kept exploding on {condition} past {max_depth} dice"),
                    ));
                }
                depth += 1;

                current = self.roll_die(id, term.sides, None, Some(current))?;
                live.push(current);
            }
        }
        Ok(())
    }
}

fn check_amount(term: &DiceTerm, amount: u32) -> Result<(), EvalError> {
    if amount > term.count {
        return Err(EvalError::new(
            EvalErrorKind::KeepDropCountExceedsDieCount,
            format!("{term} cannot keep or drop {amount} of {} dice", term.count),
        ));
    }
    Ok(())
}

/// Renders a term's outcomes as `[1r, 6!, 3, 2d]`.
///
/// `r` marks a die that was rerolled, `!` one that exploded and `d` one that
/// was dropped.
pub fn to_notations(outcomes: &[(usize, &RollOutcome)], trail: &[RollOutcome]) -> String {
    format!(
        "[{}]",
        outcomes
            .iter()
            .map(|&(index, outcome)| {
                let rerolled = trail.iter().any(|o| o.rerolled_from == Some(index));
                let exploded = trail.iter().any(|o| o.exploded_from == Some(index));

                let mut str = outcome.value.to_string();
                if exploded {
                    str.push('!');
                }
                if rerolled {
                    str.push('r');
                } else if !outcome.kept {
                    str.push('d');
                }
                str
            })
            .collect::<Vec<_>>()
            .join(", ")
    )
}
