//! Recursive descent parser for cut expressions
//!
//! Operator precedence follows the table-query dialect the catalog was written
//! in, where `&` and `|` bind more loosely than comparisons, so that
//! `0 < x & x < 1` means what it looks like. From loosest to tightest:
//!
//! | operators            | associativity       |
//! |----------------------|---------------------|
//! | `\|`, `or`           | left                |
//! | `^`                  | left                |
//! | `&`, `and`           | left                |
//! | `not`                | prefix              |
//! | `< <= > >= == !=`    | chained             |
//! | `+ -`                | left                |
//! | `* /`                | left                |
//! | unary `-`, `+`, `~`  | prefix              |
//! | `**`                 | right               |
//!
//! Hence `~x < 5` is `(~x) < 5`, while `not x < 5` is `not (x < 5)`.

use super::{
    ast::{BinaryOp, CmpOp, Expr, Function, LogicOp},
    lexer::{tokenize, Token, TokenKind},
    ParseError,
};

type ParseResult<T> = Result<T, ParseError>;

/// Parse a complete expression
pub fn parse(input: &str) -> ParseResult<Expr> {
    let mut parser = Parser::new(tokenize(input)?);
    let expr = parser.parse_or()?;
    match parser.peek() {
        Token {
            kind: TokenKind::Eof,
            ..
        } => Ok(expr),
        token => Err(parser.unexpected(token, "end of expression")),
    }
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<()> {
        if self.match_token(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(self.peek(), expected))
        }
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> ParseError {
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEnd { expected }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: token.kind.to_string(),
                offset: token.offset,
            }
        }
    }

    fn logic(lhs: Expr, op: LogicOp, rhs: Expr) -> Expr {
        Expr::Logic {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_xor()?;
        while self.match_token(&TokenKind::Or) {
            let rhs = self.parse_xor()?;
            expr = Self::logic(expr, LogicOp::Or, rhs);
        }
        Ok(expr)
    }

    fn parse_xor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_and()?;
        while self.match_token(&TokenKind::Xor) {
            let rhs = self.parse_and()?;
            expr = Self::logic(expr, LogicOp::Xor, rhs);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_not()?;
        while self.match_token(&TokenKind::And) {
            let rhs = self.parse_not()?;
            expr = Self::logic(expr, LogicOp::And, rhs);
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.match_token(&TokenKind::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    /// `a < b < c` is read as `(a < b) & (b < c)`, evaluating `b` only once
    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        while let Some(op) = self.parse_comparison_op() {
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek().kind {
            TokenKind::Less => CmpOp::Less,
            TokenKind::LessEqual => CmpOp::LessEqual,
            TokenKind::Greater => CmpOp::Greater,
            TokenKind::GreaterEqual => CmpOp::GreaterEqual,
            TokenKind::EqualEqual => CmpOp::Equal,
            TokenKind::NotEqual => CmpOp::NotEqual,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(expr),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            expr = Expr::binary(expr, op, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => return Ok(expr),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            expr = Expr::binary(expr, op, rhs);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.match_token(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        if self.match_token(&TokenKind::Plus) {
            return self.parse_unary();
        }
        if self.match_token(&TokenKind::Tilde) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_power()
    }

    /// Power binds tighter than a unary minus on its left, so `-x ** 2` is
    /// `-(x ** 2)`, but its exponent may carry a sign of its own
    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_primary()?;
        if self.match_token(&TokenKind::StarStar) {
            let exponent = self.parse_unary()?;
            return Ok(Expr::binary(base, BinaryOp::Power, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(x) => Ok(Expr::Number(x)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Identifier(name) => {
                if self.match_token(&TokenKind::LeftParen) {
                    self.parse_call(name, token.offset)
                } else {
                    Ok(Expr::Column(name))
                }
            }
            TokenKind::LeftParen => {
                let expr = self.parse_or()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            _ => Err(self.unexpected(&token, "a value")),
        }
    }

    fn parse_call(&mut self, name: String, offset: usize) -> ParseResult<Expr> {
        let function = Function::from_name(&name)
            .ok_or(ParseError::UnknownFunction { name, offset })?;

        let mut args = Vec::new();
        if !self.match_token(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_or()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "')'")?;
        }

        // All supported functions are unary
        if args.len() != 1 {
            return Err(ParseError::Arity {
                function: function.name(),
                found: args.len(),
            });
        }
        let arg = Box::new(args.swap_remove(0));
        Ok(Expr::Call { function, arg })
    }
}
