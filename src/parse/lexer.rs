use winnow::{
    ascii::{digit1, multispace0},
    combinator::alt,
    token::take_while,
    PResult, Parser,
};

use super::CompareOp;
use crate::{config::Syntax, error::LexError};

/// Words the lexer turns into tokens. Their spellings live in [`Syntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Die,
    Keep,
    Drop,
    Highest,
    Lowest,
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
    Reroll,
    RerollOnce,
    Explode,
    Advantage,
    Disadvantage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Number(u64),
    DieOp,
    Keep,
    Drop,
    Highest,
    Lowest,
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
    Reroll,
    RerollOnce,
    Explode,
    Advantage,
    Disadvantage,
    Percent,
    Compare(CompareOp),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Identifier(String),
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl From<Keyword> for TokenKind {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::Die => TokenKind::DieOp,
            Keyword::Keep => TokenKind::Keep,
            Keyword::Drop => TokenKind::Drop,
            Keyword::Highest => TokenKind::Highest,
            Keyword::Lowest => TokenKind::Lowest,
            Keyword::KeepHighest => TokenKind::KeepHighest,
            Keyword::KeepLowest => TokenKind::KeepLowest,
            Keyword::DropHighest => TokenKind::DropHighest,
            Keyword::DropLowest => TokenKind::DropLowest,
            Keyword::Reroll => TokenKind::Reroll,
            Keyword::RerollOnce => TokenKind::RerollOnce,
            Keyword::Explode => TokenKind::Explode,
            Keyword::Advantage => TokenKind::Advantage,
            Keyword::Disadvantage => TokenKind::Disadvantage,
        }
    }
}

/// Lexes the whole line with the standard keyword spellings.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with(input, Syntax::standard())
}

pub fn tokenize_with(input: &str, syntax: &Syntax) -> Result<Vec<Token>, LexError> {
    Lexer::with_syntax(input, syntax).collect()
}

/// Lazily produces the tokens of one line, ending with [`TokenKind::EndOfInput`].
///
/// The iterator stops after the first error.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    rest: &'a str,
    syntax: &'a Syntax,
    finished: bool,
}

enum Lexeme<'i> {
    Digits(&'i str),
    Word(&'i str),
    Symbol(TokenKind),
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_syntax(input, Syntax::standard())
    }

    pub fn with_syntax(input: &'a str, syntax: &'a Syntax) -> Self {
        Self {
            input,
            rest: input,
            syntax,
            finished: false,
        }
    }

    fn offset(&self) -> usize {
        self.input.len() - self.rest.len()
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        // Whitespace never fails to lex, it can only be absent.
        let _ = whitespace.parse_next(&mut self.rest);
        let offset = self.offset();

        if self.rest.is_empty() {
            return Ok(Token::new(TokenKind::EndOfInput, offset));
        }

        let checkpoint = self.rest;
        let kind = match lexeme.parse_next(&mut self.rest) {
            Ok(Lexeme::Digits(digits)) => {
                let number = digits.parse::<u64>().map_err(|_| LexError::NumberTooLarge {
                    position: offset,
                    digits: digits.to_string(),
                })?;
                TokenKind::Number(number)
            }
            Ok(Lexeme::Word(word)) => match self.syntax.longest_prefix(word) {
                Some((keyword, len)) => {
                    // the rest of the word is lexed again as the next token
                    self.rest = &checkpoint[len..];
                    TokenKind::from(keyword)
                }
                None => TokenKind::Identifier(word.to_string()),
            },
            Ok(Lexeme::Symbol(kind)) => kind,
            Err(_) => {
                self.rest = checkpoint;
                let character = checkpoint.chars().next().unwrap_or_default();
                return Err(LexError::UnexpectedCharacter {
                    position: offset,
                    character,
                });
            }
        };

        log::trace!("lexed {kind:?} at {offset}");
        Ok(Token::new(kind, offset))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        match &token {
            Ok(Token {
                kind: TokenKind::EndOfInput,
                ..
            })
            | Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(token)
    }
}

fn whitespace(input: &mut &str) -> PResult<()> {
    multispace0.void().parse_next(input)
}

fn lexeme<'i>(input: &mut &'i str) -> PResult<Lexeme<'i>> {
    alt((
        digit1.map(Lexeme::Digits),
        take_while(1.., |c: char| c.is_ascii_alphabetic()).map(Lexeme::Word),
        alt((comparison, operator)).map(Lexeme::Symbol),
    ))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> PResult<TokenKind> {
    alt((
        "<=".value(CompareOp::LessOrEqual),
        ">=".value(CompareOp::GreaterOrEqual),
        "<>".value(CompareOp::NotEqual),
        '<'.value(CompareOp::Less),
        '>'.value(CompareOp::Greater),
        '='.value(CompareOp::Equal),
    ))
    .map(TokenKind::Compare)
    .parse_next(input)
}

fn operator(input: &mut &str) -> PResult<TokenKind> {
    alt((
        '+'.value(TokenKind::Plus),
        '-'.value(TokenKind::Minus),
        '*'.value(TokenKind::Star),
        '/'.value(TokenKind::Slash),
        '('.value(TokenKind::LParen),
        ')'.value(TokenKind::RParen),
        '!'.value(TokenKind::Explode),
        '%'.value(TokenKind::Percent),
    ))
    .parse_next(input)
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {n}"),
            TokenKind::DieOp => write!(f, "'d'"),
            TokenKind::Keep => write!(f, "'keep'"),
            TokenKind::Drop => write!(f, "'drop'"),
            TokenKind::Highest => write!(f, "'highest'"),
            TokenKind::Lowest => write!(f, "'lowest'"),
            TokenKind::KeepHighest => write!(f, "'kh'"),
            TokenKind::KeepLowest => write!(f, "'kl'"),
            TokenKind::DropHighest => write!(f, "'dh'"),
            TokenKind::DropLowest => write!(f, "'dl'"),
            TokenKind::Reroll => write!(f, "'reroll'"),
            TokenKind::RerollOnce => write!(f, "'rerollonce'"),
            TokenKind::Explode => write!(f, "'explode'"),
            TokenKind::Advantage => write!(f, "'adv'"),
            TokenKind::Disadvantage => write!(f, "'dis'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Compare(op) => write!(f, "'{op}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Identifier(word) => write!(f, "unknown word '{word}'"),
            TokenKind::EndOfInput => write!(f, "end of input"),
        }
    }
}
