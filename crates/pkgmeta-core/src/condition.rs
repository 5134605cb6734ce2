//! Sandboxed evaluator for dependency condition expressions.
//!
//! A condition is a small boolean expression over version-like tokens,
//! evaluated with the candidate version bound to `$VERSION`:
//!
//! ```text
//! $VERSION >= 1.0 and $VERSION < 2.0
//! not ($VERSION == 1.4.2 or $VERSION == 1.4.3)
//! ```
//!
//! The grammar allows comparisons (`==`, `!=`, `<`, `<=`, `>`, `>=`),
//! boolean connectives (`and`/`&&`, `or`/`||`, `not`/`!`) and parentheses.
//! Nothing else: no arithmetic, no function calls, no I/O. Relational
//! operators compare both sides as version triplets when both parse as
//! such, and fall back to plain string comparison otherwise. Nesting depth
//! is capped, so evaluation always terminates.

use std::cmp::Ordering;

use crate::{error::MatchError, version::Triplet};

/// Maximum parenthesis/negation nesting accepted in a condition.
const MAX_DEPTH: usize = 32;

/// The one variable a condition may reference.
const VERSION_VAR: &str = "VERSION";

/// Evaluates `condition` with `candidate` bound to `$VERSION`.
pub fn evaluate(condition: &str, candidate: &str) -> Result<bool, MatchError> {
    let tokens = lex(condition)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression(0)?;
    if let Some(token) = parser.peek() {
        return Err(MatchError::Parse {
            reason: format!("unexpected trailing {}", token.describe()),
        });
    }
    eval(&expr, candidate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering.is_eq(),
            CmpOp::Ne => ordering.is_ne(),
            CmpOp::Lt => ordering.is_lt(),
            CmpOp::Le => ordering.is_le(),
            CmpOp::Gt => ordering.is_gt(),
            CmpOp::Ge => ordering.is_ge(),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Or,
    And,
    Not,
    Op(CmpOp),
    Var(String),
    Literal(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Or => "'or'".into(),
            Token::And => "'and'".into(),
            Token::Not => "'not'".into(),
            Token::Op(op) => format!("'{}'", op.symbol()),
            Token::Var(name) => format!("'${name}'"),
            Token::Literal(value) => format!("'{value}'"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')
}

fn lex(input: &str) -> Result<Vec<Token>, MatchError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '=' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => tokens.push(Token::Op(CmpOp::Eq)),
                None => {
                    return Err(MatchError::Parse {
                        reason: format!("single '=' at offset {offset}, expected '=='"),
                    })
                }
            },
            '!' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => tokens.push(Token::Op(CmpOp::Ne)),
                None => tokens.push(Token::Not),
            },
            '<' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => tokens.push(Token::Op(CmpOp::Le)),
                None => tokens.push(Token::Op(CmpOp::Lt)),
            },
            '>' => match chars.next_if(|&(_, c)| c == '=') {
                Some(_) => tokens.push(Token::Op(CmpOp::Ge)),
                None => tokens.push(Token::Op(CmpOp::Gt)),
            },
            '&' => match chars.next_if(|&(_, c)| c == '&') {
                Some(_) => tokens.push(Token::And),
                None => {
                    return Err(MatchError::Parse {
                        reason: format!("single '&' at offset {offset}, expected '&&'"),
                    })
                }
            },
            '|' => match chars.next_if(|&(_, c)| c == '|') {
                Some(_) => tokens.push(Token::Or),
                None => {
                    return Err(MatchError::Parse {
                        reason: format!("single '|' at offset {offset}, expected '||'"),
                    })
                }
            },
            '$' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(MatchError::Parse {
                        reason: format!("dangling '$' at offset {offset}"),
                    });
                }
                tokens.push(Token::Var(name));
            }
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => value.push(c),
                        None => {
                            return Err(MatchError::Parse {
                                reason: format!("unterminated string at offset {offset}"),
                            })
                        }
                    }
                }
                tokens.push(Token::Literal(value));
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if is_word_char(c) {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Literal(word),
                });
            }
            other => {
                return Err(MatchError::Parse {
                    reason: format!("unexpected character '{other}' at offset {offset}"),
                })
            }
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone)]
enum Operand {
    Var(String),
    Literal(String),
}

impl Operand {
    fn describe(&self) -> String {
        match self {
            Operand::Var(name) => format!("${name}"),
            Operand::Literal(value) => value.clone(),
        }
    }
}

/// Connective chains are kept n-ary so evaluation recurses only as deep as
/// the (capped) syntactic nesting, never with the length of the chain.
#[derive(Debug)]
enum Expr {
    Any(Vec<Expr>),
    All(Vec<Expr>),
    Not(Box<Expr>),
    Cmp(Operand, CmpOp, Operand),
    Term(Operand),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self, depth: usize) -> Result<Expr, MatchError> {
        if depth > MAX_DEPTH {
            return Err(MatchError::TooDeep);
        }

        let first = self.and_chain(depth)?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.peek() == Some(&Token::Or) {
            self.next();
            parts.push(self.and_chain(depth)?);
        }
        Ok(Expr::Any(parts))
    }

    fn and_chain(&mut self, depth: usize) -> Result<Expr, MatchError> {
        let first = self.unary(depth)?;
        if self.peek() != Some(&Token::And) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.peek() == Some(&Token::And) {
            self.next();
            parts.push(self.unary(depth)?);
        }
        Ok(Expr::All(parts))
    }

    fn unary(&mut self, depth: usize) -> Result<Expr, MatchError> {
        if depth > MAX_DEPTH {
            return Err(MatchError::TooDeep);
        }

        match self.peek() {
            Some(Token::Not) => {
                self.next();
                Ok(Expr::Not(Box::new(self.unary(depth + 1)?)))
            }
            Some(Token::LParen) => {
                self.next();
                let inner = self.expression(depth + 1)?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MatchError::Parse {
                        reason: "missing closing parenthesis".into(),
                    }),
                }
            }
            _ => self.comparison(),
        }
    }

    fn comparison(&mut self) -> Result<Expr, MatchError> {
        let lhs = self.operand()?;
        match self.peek() {
            Some(&Token::Op(op)) => {
                self.next();
                let rhs = self.operand()?;
                Ok(Expr::Cmp(lhs, op, rhs))
            }
            _ => Ok(Expr::Term(lhs)),
        }
    }

    fn operand(&mut self) -> Result<Operand, MatchError> {
        match self.next() {
            Some(Token::Var(name)) => Ok(Operand::Var(name)),
            Some(Token::Literal(value)) => Ok(Operand::Literal(value)),
            Some(token) => Err(MatchError::Parse {
                reason: format!("expected a value, found {}", token.describe()),
            }),
            None => Err(MatchError::Parse {
                reason: "expression ended where a value was expected".into(),
            }),
        }
    }
}

fn resolve<'a>(operand: &'a Operand, candidate: &'a str) -> Result<&'a str, MatchError> {
    match operand {
        Operand::Var(name) if name == VERSION_VAR => Ok(candidate),
        Operand::Var(name) => Err(MatchError::UnknownVariable { name: name.clone() }),
        Operand::Literal(value) => Ok(value),
    }
}

/// Compares as triplets when both sides are triplet-shaped, else as
/// literal strings.
fn compare(lhs: &str, rhs: &str) -> Ordering {
    match (Triplet::parse(lhs), Triplet::parse(rhs)) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        _ => lhs.cmp(rhs),
    }
}

fn eval(expr: &Expr, candidate: &str) -> Result<bool, MatchError> {
    match expr {
        Expr::Any(parts) => {
            for part in parts {
                if eval(part, candidate)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::All(parts) => {
            for part in parts {
                if !eval(part, candidate)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Not(inner) => Ok(!eval(inner, candidate)?),
        Expr::Cmp(lhs, op, rhs) => {
            let lhs = resolve(lhs, candidate)?;
            let rhs = resolve(rhs, candidate)?;
            Ok(op.accepts(compare(lhs, rhs)))
        }
        Expr::Term(operand) => Err(MatchError::NotBoolean {
            term: operand.describe(),
        }),
    }
}
