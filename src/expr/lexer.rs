//! Tokenizer for cut expressions

use super::ParseError;
use crate::numeric::Float;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{digit1, multispace1, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};
use std::fmt;

/// Token with the byte offset at which it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals and names
    Number(Float),
    Identifier(String),
    True,
    False,

    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,

    // Comparisons
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    NotEqual,

    // Logic (symbols and Python keywords both work)
    And,
    Or,
    Xor,
    Not,
    Tilde,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(x) => write!(f, "number {x}"),
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::Eof => write!(f, "end of expression"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Split an expression into tokens, terminated by [`TokenKind::Eof`]
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        if let Ok((rest, _)) = blanks(remaining) {
            remaining = rest;
        }
        let offset = input.len() - remaining.len();
        let Some(character) = remaining.chars().next() else {
            break;
        };

        // Numbers are validated here, to report the whole malformed literal
        if let Ok((rest, text)) = number(remaining) {
            let kind = text
                .parse::<Float>()
                .map(TokenKind::Number)
                .map_err(|_| ParseError::InvalidNumber {
                    text: text.to_owned(),
                    offset,
                })?;
            tokens.push(Token { kind, offset });
            remaining = rest;
            continue;
        }

        match alt((word, operator))(remaining) {
            Ok((rest, kind)) => {
                tokens.push(Token { kind, offset });
                remaining = rest;
            }
            Err(_) => return Err(ParseError::UnexpectedCharacter { character, offset }),
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

/// Whitespace, and the line continuations of expressions copied from scripts
fn blanks(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, tag("\\")))))(input)
}

/// Decimal literal such as `150`, `.5`, `0.00832` or `10e3`
///
/// A sign is never part of the literal, except in the exponent.
///
fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    ))(input)
}

/// Identifier or keyword
fn word(input: &str) -> IResult<&str, TokenKind> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        |word: &str| match word {
            "True" | "true" => TokenKind::True,
            "False" | "false" => TokenKind::False,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            name => TokenKind::Identifier(name.to_owned()),
        },
    )(input)
}

/// Operators and delimiters, longest first
fn operator(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::StarStar, tag("**")),
        value(TokenKind::LessEqual, tag("<=")),
        value(TokenKind::GreaterEqual, tag(">=")),
        value(TokenKind::EqualEqual, tag("==")),
        value(TokenKind::NotEqual, tag("!=")),
        value(TokenKind::Star, tag("*")),
        value(TokenKind::Less, tag("<")),
        value(TokenKind::Greater, tag(">")),
        value(TokenKind::Plus, tag("+")),
        value(TokenKind::Minus, tag("-")),
        value(TokenKind::Slash, tag("/")),
        value(TokenKind::And, tag("&")),
        value(TokenKind::Or, tag("|")),
        value(TokenKind::Xor, tag("^")),
        value(TokenKind::Tilde, tag("~")),
        value(TokenKind::LeftParen, tag("(")),
        value(TokenKind::RightParen, tag(")")),
        value(TokenKind::Comma, tag(",")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a ** 2 <= b != c == d >= e & ~f | g ^ h"),
            [
                Identifier("a".into()),
                StarStar,
                Number(2.),
                LessEqual,
                Identifier("b".into()),
                NotEqual,
                Identifier("c".into()),
                EqualEqual,
                Identifier("d".into()),
                GreaterEqual,
                Identifier("e".into()),
                And,
                Tilde,
                Identifier("f".into()),
                Or,
                Identifier("g".into()),
                Xor,
                Identifier("h".into()),
                Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds("10e3 .5 0.00832 2.590402853814859e-07 60e9"),
            [
                Number(10e3),
                Number(0.5),
                Number(0.00832),
                Number(2.590402853814859e-07),
                Number(60e9),
                Eof
            ]
        );
        // A minus sign is never part of the literal outside of an exponent
        assert_eq!(kinds("1-2"), [Number(1.), Minus, Number(2.), Eof]);
        assert!(matches!(
            tokenize("1.2.3"),
            Err(ParseError::InvalidNumber { offset: 0, .. })
        ));
    }

    #[test]
    fn keywords_and_continuations() {
        use TokenKind::*;
        assert_eq!(
            kinds("True and not x_1 \\\n or False"),
            [True, And, Not, Identifier("x_1".into()), Or, False, Eof]
        );
        assert!(matches!(
            tokenize("a = b"),
            Err(ParseError::UnexpectedCharacter { character: '=', offset: 2 })
        ));
    }
}
