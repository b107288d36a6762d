use kismet::{
    evaluate, Condition, DiceTerm, EvalErrorKind, Expression, Modifier, ScriptedSource,
    SeededSource,
};
use proptest::prelude::*;

fn dice(count: u32, sides: u32, modifiers: Vec<Modifier>) -> Expression {
    Expression::Dice(DiceTerm::new(count, sides, modifiers))
}

/// Notation the parser accepts, built from a handful of templates.
fn notation() -> impl Strategy<Value = String> {
    let term = prop_oneof![
        (1u32..20, 1u32..100).prop_map(|(n, s)| format!("{n}d{s}")),
        (1u32..20).prop_map(|s| format!("d{s}")),
        (2u32..8, 2u32..20, 1u32..2).prop_map(|(n, s, k)| format!("{n}d{s} keep {k}")),
        (2u32..8, 2u32..20).prop_map(|(n, s)| format!("{n}d{s}dl1")),
        (1u32..8, 2u32..20).prop_map(|(n, s)| format!("{n}d{s} reroll")),
        (1u32..8, 3u32..20).prop_map(|(n, s)| format!("{n}D{s}!>=3ro<2")),
        Just("d20 adv".to_string()),
        Just("d%".to_string()),
        (0i64..1000).prop_map(|n| n.to_string()),
    ];
    prop::collection::vec((term, "[+\\-*/]"), 1..5).prop_map(|parts| {
        let mut notation = String::new();
        for (i, (term, op)) in parts.iter().enumerate() {
            if i > 0 {
                notation.push_str(&format!(" {op} "));
            }
            if i % 3 == 2 {
                notation.push_str(&format!("-({term})"));
            } else {
                notation.push_str(term);
            }
        }
        notation
    })
}

proptest! {
    #[test]
    fn test_plain_dice_in_range(count in 1u32..50, sides in 1u32..1000, seed: u64) {
        let expression = dice(count, sides, vec![]);
        let result = evaluate(&expression, &mut SeededSource::seeded(seed)).unwrap();

        let (count, sides) = (i64::from(count), i64::from(sides));
        prop_assert!(count <= result.total() && result.total() <= count * sides);
        prop_assert_eq!(result.trail().len() as i64, count);
        prop_assert!(result.trail().iter().all(|o| 1 <= o.value && i64::from(o.value) <= sides));
    }

    #[test]
    fn test_same_faces_same_result(
        input in notation(),
        faces in prop::collection::vec(1u32..100, 1..30),
    ) {
        let expression = Expression::parse(&input).unwrap();

        let first = evaluate(&expression, &mut ScriptedSource::new(faces.clone()));
        let second = evaluate(&expression, &mut ScriptedSource::new(faces));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_keep_highest_bounded(count in 1u32..12, keep in 1u32..12, seed: u64) {
        prop_assume!(keep <= count);
        let expression = dice(count, 20, vec![Modifier::KeepHighest(keep)]);
        let result = evaluate(&expression, &mut SeededSource::seeded(seed)).unwrap();

        let mut faces: Vec<i64> = result.trail().iter().map(|o| i64::from(o.value)).collect();
        faces.sort_unstable_by(|a, b| b.cmp(a));
        let best: i64 = faces.iter().take(keep as usize).sum();

        prop_assert!(result.total() <= best);
        prop_assert_eq!(result.kept().count(), keep as usize);
    }

    #[test]
    fn test_rendering_parses_back(input in notation()) {
        let expression = Expression::parse(&input).unwrap();
        let rendered = expression.to_string();

        prop_assert_eq!(Expression::parse(&rendered).unwrap(), expression);
    }

    #[test]
    fn test_reroll_never_keeps_a_match(count in 1u32..10, seed: u64) {
        let expression = dice(count, 6, vec![Modifier::Reroll(Some(Condition::equal(1)))]);
        match evaluate(&expression, &mut SeededSource::seeded(seed)) {
            Ok(result) => prop_assert!(result.kept().all(|o| o.value != 1)),
            Err(err) => prop_assert_eq!(err.kind(), EvalErrorKind::InfiniteReroll),
        }
    }
}
