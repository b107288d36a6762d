use rand::{
    rngs::{StdRng, ThreadRng},
    Rng, SeedableRng,
};

use crate::error::{EvalError, EvalErrorKind};

/// Where die faces come from.
///
/// The evaluator never reaches for a global generator, so swapping the source
/// is all it takes to make a roll reproducible.
pub trait RandomnessSource {
    /// A face in `[1, sides]`. A die without sides rolls `1`; the evaluator
    /// goes through [`next`](Self::next), which rejects it first.
    fn draw(&mut self, sides: u32) -> u32;

    /// Like [`draw`](Self::draw) but rejects dice without faces.
    fn next(&mut self, sides: u32) -> Result<u32, EvalError> {
        if sides < 1 {
            return Err(EvalError::new(
                EvalErrorKind::InvalidDieSides,
                format!("a die needs at least 1 side, got {sides}"),
            ));
        }
        Ok(self.draw(sides))
    }
}

/// Uniform faces from any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

pub type SeededSource = RngSource<StdRng>;
pub type EntropySource = RngSource<ThreadRng>;

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    pub fn entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl Default for RngSource<ThreadRng> {
    fn default() -> Self {
        Self::entropy()
    }
}

impl<R: Rng> RandomnessSource for RngSource<R> {
    fn draw(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed list of faces, starting over once it runs out.
///
/// A face too large for the die wraps around (`7` on a d6 is `1`) and `0`
/// counts as `1`. An empty script always rolls `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedSource {
    faces: Vec<u32>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: 0,
        }
    }

    /// How many faces have been handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomnessSource for ScriptedSource {
    fn draw(&mut self, sides: u32) -> u32 {
        if self.faces.is_empty() {
            return 1;
        }

        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        (face.max(1) - 1) % sides.max(1) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededSource::seeded(1);
        let mut b = SeededSource::seeded(1);

        let a: Vec<u32> = (0..20).map(|_| a.draw(6)).collect();
        let b: Vec<u32> = (0..20).map(|_| b.draw(6)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|face| (1..=6).contains(face)));
    }

    #[test]
    fn test_rng_source_borrows_caller_rng() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut source = RngSource::new(&mut rng);
        let face = source.draw(20);
        assert!((1..=20).contains(&face));
    }

    #[test]
    fn test_zero_sides_rejected() {
        let mut source = SeededSource::seeded(1);
        let err = source.next(0).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::InvalidDieSides);

        let mut source = ScriptedSource::new([3]);
        assert!(source.next(0).is_err());
        assert_eq!(source.drawn(), 0);
    }

    #[test]
    fn test_draw_without_sides_rolls_one() {
        let mut source = SeededSource::seeded(5);
        assert_eq!(source.draw(0), 1);

        let mut source = ScriptedSource::new([4, 9]);
        assert_eq!(source.draw(0), 1);
        assert_eq!(source.draw(0), 1);
        assert_eq!(source.drawn(), 2);
    }

    #[test]
    fn test_one_sided_die() {
        let mut source = SeededSource::seeded(3);
        assert_eq!(source.next(1), Ok(1));
    }

    #[test]
    fn test_scripted_cycles() {
        let mut source = ScriptedSource::new(vec![4, 5]);
        let faces: Vec<u32> = (0..5).map(|_| source.draw(6)).collect();
        assert_eq!(faces, vec![4, 5, 4, 5, 4]);
        assert_eq!(source.drawn(), 5);
    }

    #[test]
    fn test_scripted_wraps_into_range() {
        let mut source = ScriptedSource::new([7, 0, 12, 6]);
        let faces: Vec<u32> = (0..4).map(|_| source.draw(6)).collect();
        assert_eq!(faces, vec![1, 1, 6, 6]);
    }

    #[test]
    fn test_scripted_empty() {
        let mut source = ScriptedSource::new(Vec::new());
        assert_eq!(source.draw(20), 1);
    }
}
