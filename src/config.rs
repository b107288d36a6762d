use std::{collections::HashMap, sync::OnceLock, time::Duration};

use crate::parse::Keyword;

/// Bounds on how much work a single evaluation may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// How many times one die may be rerolled, or keep exploding, before giving up.
    pub max_reroll_depth: u32,
    /// Physical dice rolled over the whole expression, rerolls and explosions included.
    pub max_dice: usize,
    /// Nodes in the expression tree.
    pub max_nodes: usize,
    pub time_budget: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_reroll_depth: 100,
            max_dice: 10_000,
            max_nodes: 1_000,
            time_budget: None,
        }
    }
}

impl Limits {
    pub fn with_max_reroll_depth(mut self, depth: u32) -> Self {
        self.max_reroll_depth = depth;
        self
    }

    pub fn with_max_dice(mut self, dice: usize) -> Self {
        self.max_dice = dice;
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

const STANDARD_KEYWORDS: [(&str, Keyword); 21] = [
    ("d", Keyword::Die),
    ("keep", Keyword::Keep),
    ("k", Keyword::Keep),
    ("drop", Keyword::Drop),
    ("highest", Keyword::Highest),
    ("high", Keyword::Highest),
    ("lowest", Keyword::Lowest),
    ("low", Keyword::Lowest),
    ("kh", Keyword::KeepHighest),
    ("kl", Keyword::KeepLowest),
    ("dh", Keyword::DropHighest),
    ("dl", Keyword::DropLowest),
    ("reroll", Keyword::Reroll),
    ("r", Keyword::Reroll),
    ("rerollonce", Keyword::RerollOnce),
    ("ro", Keyword::RerollOnce),
    ("explode", Keyword::Explode),
    ("adv", Keyword::Advantage),
    ("advantage", Keyword::Advantage),
    ("dis", Keyword::Disadvantage),
    ("disadvantage", Keyword::Disadvantage),
];

/// Spellings the lexer recognises for each keyword.
///
/// Words are matched without regard to case, so every spelling is stored
/// lowercase. A run of letters is split greedily into the longest spellings
/// it starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    keywords: HashMap<String, Keyword>,
}

impl Syntax {
    /// An empty table. Only symbols (`+`, `!`, `<=`, ...) will lex.
    pub fn empty() -> Self {
        Self {
            keywords: HashMap::new(),
        }
    }

    /// The shared default table.
    pub fn standard() -> &'static Syntax {
        static STANDARD: OnceLock<Syntax> = OnceLock::new();
        STANDARD.get_or_init(Syntax::default)
    }

    pub fn with_keyword(mut self, spelling: &str, keyword: Keyword) -> Self {
        self.keywords.insert(spelling.to_ascii_lowercase(), keyword);
        self
    }

    pub fn without_spelling(mut self, spelling: &str) -> Self {
        self.keywords.remove(&spelling.to_ascii_lowercase());
        self
    }

    pub fn keyword(&self, word: &str) -> Option<Keyword> {
        self.keywords.get(&word.to_ascii_lowercase()).copied()
    }

    /// The longest spelling `word` starts with, and its length in bytes.
    pub fn longest_prefix(&self, word: &str) -> Option<(Keyword, usize)> {
        (1..=word.len())
            .rev()
            .filter(|&len| word.is_char_boundary(len))
            .find_map(|len| self.keyword(&word[..len]).map(|keyword| (keyword, len)))
    }
}

impl Default for Syntax {
    fn default() -> Self {
        STANDARD_KEYWORDS
            .iter()
            .fold(Syntax::empty(), |syntax, (spelling, keyword)| {
                syntax.with_keyword(spelling, *keyword)
            })
    }
}
