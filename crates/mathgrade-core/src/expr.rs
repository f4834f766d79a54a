//! Arithmetic expression evaluator.
//!
//! A dedicated recursive-descent evaluator over a closed grammar:
//! `+ - * /`, parentheses, decimal/integer literals, and unary minus.
//! Multiplication and division bind tighter than addition and subtraction;
//! operators of equal precedence associate left to right; whitespace is
//! ignored. There are no variables, no functions, and no implicit
//! multiplication — the accepted language is exactly what the grammar
//! shows, so student-supplied text can never reach anything beyond this
//! module.

use crate::error::EvalError;

/// Longest expression the evaluator accepts, in bytes.
pub const MAX_EXPR_LEN: usize = 4096;

/// Deepest parenthesis nesting the evaluator accepts.
pub const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression to a finite f64.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    if expression.len() > MAX_EXPR_LEN {
        return Err(EvalError::TooLong { max: MAX_EXPR_LEN });
    }

    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.parse_expr(0)?;

    if let Some(spanned) = parser.peek() {
        return Err(EvalError::TrailingInput {
            offset: spanned.offset,
        });
    }

    let value = ast.eval()?;
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

/// Parse a numeric literal using the same rules as the evaluator's grammar.
///
/// Used by the scoring stage to interpret submitted answers: plain decimal
/// or integer literals with an optional leading sign, nothing else.
pub fn parse_literal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Binary operators of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Expression AST. The parser folds parentheses into the tree structure;
/// no explicit grouping node is needed after parsing.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(f64),
    Negate(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn eval(&self) -> Result<f64, EvalError> {
        match self {
            Expr::Literal(v) => Ok(*v),
            Expr::Negate(inner) => Ok(-inner.eval()?),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval()?;
                let r = rhs.eval()?;
                match op {
                    BinOp::Add => Ok(l + r),
                    BinOp::Sub => Ok(l - r),
                    BinOp::Mul => Ok(l * r),
                    BinOp::Div => {
                        if r == 0.0 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            Ok(l / r)
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy)]
struct SpannedToken {
    token: Token,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<SpannedToken>, EvalError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let token = match c {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                let literal = &input[start..i];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::MalformedNumber {
                        literal: literal.to_string(),
                    })?;
                tokens.push(SpannedToken {
                    token: Token::Number(value),
                    offset: start,
                });
                continue;
            }
            other => {
                // Report the character offset, not the byte offset, so the
                // message points at the right spot in multibyte input.
                let offset = input[..i].chars().count();
                return Err(EvalError::UnexpectedChar {
                    found: other_char(input, i).unwrap_or(other),
                    offset,
                });
            }
        };
        tokens.push(SpannedToken { token, offset: i });
        i += 1;
    }

    Ok(tokens)
}

/// Decode the full character at byte position `i` (ASCII indexing above
/// truncates multibyte characters).
fn other_char(input: &str, i: usize) -> Option<char> {
    input.get(i..).and_then(|s| s.chars().next())
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<SpannedToken> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// expr := term (('+' | '-') term)*
    fn parse_expr(&mut self, depth: usize) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term(depth)?;
        while let Some(spanned) = self.peek() {
            let op = match spanned.token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_term(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// term := factor (('*' | '/') factor)*
    fn parse_term(&mut self, depth: usize) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_factor(depth)?;
        while let Some(spanned) = self.peek() {
            let op = match spanned.token {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_factor(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    /// factor := number | '-' factor | '+' factor | '(' expr ')'
    fn parse_factor(&mut self, depth: usize) -> Result<Expr, EvalError> {
        let spanned = self.advance().ok_or(EvalError::UnexpectedEnd)?;
        match spanned.token {
            Token::Number(v) => Ok(Expr::Literal(v)),
            Token::Minus => Ok(Expr::Negate(Box::new(self.parse_factor(depth)?))),
            Token::Plus => self.parse_factor(depth),
            Token::LParen => {
                if depth + 1 > MAX_DEPTH {
                    return Err(EvalError::TooDeep { max: MAX_DEPTH });
                }
                let inner = self.parse_expr(depth + 1)?;
                match self.advance() {
                    Some(SpannedToken {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(EvalError::TrailingInput {
                        offset: other.offset,
                    }),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Token::RParen | Token::Star | Token::Slash => Err(EvalError::TrailingInput {
                offset: spanned.offset,
            }),
        }
    }
}
