use std::{collections::BTreeMap, time::Instant};

use super::{
    dice_roll::to_notations,
    roll::{EvaluationResult, NodeId, RollOutcome},
    source::RandomnessSource,
};
use crate::{
    config::Limits,
    error::{EvalError, EvalErrorKind},
    parse::{Expression, Operator},
};

/// Rolls every dice term in the tree with the default [`Limits`].
pub fn evaluate<S>(expression: &Expression, source: &mut S) -> Result<EvaluationResult, EvalError>
where
    S: RandomnessSource + ?Sized,
{
    evaluate_with(expression, source, &Limits::default())
}

/// Rolls every dice term in the tree, stopping with
/// [`EvalErrorKind::BudgetExceeded`] once any of the limits is crossed.
pub fn evaluate_with<S>(
    expression: &Expression,
    source: &mut S,
    limits: &Limits,
) -> Result<EvaluationResult, EvalError>
where
    S: RandomnessSource + ?Sized,
{
    let nodes = expression.node_count();
    if nodes > limits.max_nodes {
        return Err(EvalError::new(
            EvalErrorKind::BudgetExceeded,
            format!(
                "expression has {nodes} nodes, the limit is {}",
                limits.max_nodes
            ),
        ));
    }

    let mut evaluator = Evaluator::new(source, limits);
    let total = evaluator.eval(expression)?;

    Ok(EvaluationResult {
        total,
        trail: evaluator.trail,
        sub_totals: evaluator.sub_totals,
    })
}

pub(super) struct Evaluator<'a, S: ?Sized> {
    pub(super) source: &'a mut S,
    pub(super) limits: &'a Limits,
    pub(super) trail: Vec<RollOutcome>,
    sub_totals: BTreeMap<NodeId, i64>,
    next_id: usize,
    started: Instant,
}

impl<'a, S: RandomnessSource + ?Sized> Evaluator<'a, S> {
    fn new(source: &'a mut S, limits: &'a Limits) -> Self {
        Self {
            source,
            limits,
            trail: Vec::new(),
            sub_totals: BTreeMap::new(),
            next_id: 0,
            started: Instant::now(),
        }
    }

    fn eval(&mut self, expression: &Expression) -> Result<i64, EvalError> {
        self.check_time()?;

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let value = match expression {
            Expression::Literal(value) => *value,
            Expression::Dice(term) => self.roll_term(id, term)?,
            Expression::BinaryOp(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                apply_operator(*op, lhs, rhs)?
            }
            Expression::Grouping(inner) => self.eval(inner)?,
            Expression::Negate(inner) => {
                let inner = self.eval(inner)?;
                inner
                    .checked_neg()
                    .ok_or_else(|| overflow(format!("-({inner})")))?
            }
        };

        self.sub_totals.insert(id, value);
        Ok(value)
    }

    pub(super) fn check_time(&self) -> Result<(), EvalError> {
        match self.limits.time_budget {
            Some(budget) if self.started.elapsed() >= budget => Err(EvalError::new(
                EvalErrorKind::BudgetExceeded,
                format!("evaluation took longer than {budget:?}"),
            )),
            _ => Ok(()),
        }
    }
}

fn apply_operator(op: Operator, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    let value = match op {
        Operator::Add => lhs.checked_add(rhs),
        Operator::Sub => lhs.checked_sub(rhs),
        Operator::Mul => lhs.checked_mul(rhs),
        Operator::Div => {
            if rhs == 0 {
                return Err(EvalError::new(
                    EvalErrorKind::DivisionByZero,
                    format!("{lhs} / 0"),
                ));
            }
            lhs.checked_div(rhs)
        }
    };
    value.ok_or_else(|| overflow(format!("{lhs} {op} {rhs}")))
}

fn overflow(detail: String) -> EvalError {
    EvalError::new(EvalErrorKind::ArithmeticOverflow, detail)
}

/// An expression together with the outcome of rolling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolledExpression {
    expression: Expression,
    result: EvaluationResult,
}

impl RolledExpression {
    pub fn new(expression: Expression, result: EvaluationResult) -> Self {
        Self { expression, result }
    }

    pub fn value(&self) -> i64 {
        self.result.total()
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn result(&self) -> &EvaluationResult {
        &self.result
    }

    pub fn into_result(self) -> EvaluationResult {
        self.result
    }

    fn render(&self, expression: &Expression, next_id: &mut usize) -> String {
        let id = NodeId(*next_id);
        *next_id += 1;

        match expression {
            Expression::Literal(value) => value.to_string(),
            Expression::Dice(term) => {
                let outcomes: Vec<_> = self.result.outcomes_for(id).collect();
                format!("{term} {}", to_notations(&outcomes, self.result.trail()))
            }
            Expression::BinaryOp(op, lhs, rhs) => {
                let lhs = self.render(lhs, next_id);
                let rhs = self.render(rhs, next_id);
                format!("{lhs} {op} {rhs}")
            }
            Expression::Grouping(inner) => format!("({})", self.render(inner, next_id)),
            Expression::Negate(inner) => format!("-{}", self.render(inner, next_id)),
        }
    }
}

/// `2d6 [4, 5] + 3 = 12`
impl std::fmt::Display for RolledExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rolled = self.render(&self.expression, &mut 0);
        write!(f, "{rolled} = {}", self.value())
    }
}
