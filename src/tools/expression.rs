//! Arithmetic expression evaluator used by the math tool.
//!
//! Input is lexed against a strict allow-list before anything is parsed:
//! numbers, the operators `+ - * / // ** ( ) ,`, and the identifiers
//! `sqrt sin cos tan log exp abs pi e`. Anything else rejects the whole
//! expression. Accepted input is parsed by recursive descent into an [`Expr`]
//! tree and evaluated with integer/float semantics matching what users of a
//! desk calculator expect (`2 + 2` is `4`, `7 / 2` is `3.5`, `sqrt(16)` is
//! `4.0`).

use std::fmt;

/// Functions callable from an expression.
pub const ALLOWED_FUNCTIONS: [&str; 7] = ["sqrt", "sin", "cos", "tan", "log", "exp", "abs"];

/// Named constants usable in an expression.
pub const ALLOWED_CONSTANTS: [&str; 2] = ["pi", "e"];

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// A character or identifier outside the allow-list. Nothing was evaluated.
    #[error("disallowed token '{0}'")]
    Unsafe(String),
    /// Syntax or arithmetic failure.
    #[error("{0}")]
    Eval(String),
}

type EvalResult<T> = std::result::Result<T, ExpressionError>;

fn eval_err<T>(msg: impl Into<String>) -> EvalResult<T> {
    Err(ExpressionError::Eval(msg.into()))
}

// ============= Numbers =============

/// A computed value. Integers stay integers until an operation needs a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Exact integer.
    Int(i64),
    /// IEEE double.
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip float text, always showing a decimal point or exponent.
///
/// Magnitudes of at least `1e16` or below `1e-4` use exponent form with a
/// signed two-digit exponent (`1e+16`, `1.5e-05`).
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = v.abs();
    if !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{:e}", v);
        let (mantissa, exponent) = match rendered.split_once('e') {
            Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
            None => (rendered.clone(), 0),
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let rendered = format!("{}", v);
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

// ============= Lexer =============

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Ident(&'static str),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Comma,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::DoubleStar => f.write_str("**"),
            Token::Slash => f.write_str("/"),
            Token::DoubleSlash => f.write_str("//"),
            Token::Comma => f.write_str(","),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn allowed_identifier(word: &str) -> Option<&'static str> {
    ALLOWED_FUNCTIONS
        .iter()
        .chain(ALLOWED_CONSTANTS.iter())
        .find(|name| **name == word)
        .copied()
}

/// Convert the expression into tokens, rejecting anything off the allow-list.
fn lex(input: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut malformed = None;
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // Keep scanning: a disallowed token later on outranks a bad literal
                match parse_literal(&literal) {
                    Ok(n) => tokens.push(Token::Number(n)),
                    Err(e) => {
                        malformed.get_or_insert(e);
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match allowed_identifier(&word) {
                    Some(name) => tokens.push(Token::Ident(name)),
                    None => return Err(ExpressionError::Unsafe(word)),
                }
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::DoubleStar);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    tokens.push(Token::DoubleSlash);
                } else {
                    tokens.push(Token::Slash);
                }
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(ExpressionError::Unsafe(other.to_string())),
        }
    }

    match malformed {
        Some(e) => Err(e),
        None => Ok(tokens),
    }
}

fn parse_literal(literal: &str) -> EvalResult<Number> {
    if literal == "." || literal.matches('.').count() > 1 {
        return eval_err(format!("invalid number literal '{}'", literal));
    }
    if literal.contains('.') {
        literal
            .parse::<f64>()
            .map(Number::Float)
            .or_else(|_| eval_err(format!("invalid number literal '{}'", literal)))
    } else {
        match literal.parse::<i64>() {
            Ok(i) => Ok(Number::Int(i)),
            // Too wide for i64: keep going as a float
            Err(_) => literal
                .parse::<f64>()
                .map(Number::Float)
                .or_else(|_| eval_err(format!("invalid number literal '{}'", literal))),
        }
    }
}

// ============= Syntax Tree =============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Log,
    Exp,
    Abs,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Function::Sqrt),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "log" => Some(Function::Log),
            "exp" => Some(Function::Exp),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Exp => "exp",
            Function::Abs => "abs",
        }
    }
}

/// Parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Num(Number),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

// ============= Parser =============

/// Deepest nesting of parentheses, unary signs and powers the parser accepts.
const MAX_DEPTH: usize = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> EvalResult<()> {
        match self.advance() {
            Some(ref token) if *token == expected => Ok(()),
            Some(token) => eval_err(format!("expected '{}' but found '{}'", expected, token)),
            None => eval_err(format!("expected '{}' but reached end of expression", expected)),
        }
    }

    /// expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// term := unary (('*' | '/' | '//') unary)*
    fn parse_term(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// unary := ('+' | '-') unary | power
    ///
    /// Every recursive path passes through here, so this is where depth is bounded.
    fn parse_unary(&mut self) -> EvalResult<Expr> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return eval_err("expression is nested too deeply");
        }
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> EvalResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Plus, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_power(),
        }
    }

    /// power := primary ('**' unary)?
    ///
    /// Right-associative, and binds tighter than a unary minus on its left:
    /// `-2 ** 2` is `-(2 ** 2)`.
    fn parse_power(&mut self) -> EvalResult<Expr> {
        let base = self.parse_primary()?;
        if self.peek() == Some(&Token::DoubleStar) {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    /// primary := NUMBER | CONSTANT | FUNCTION '(' expr (',' expr)* ')' | '(' expr ')'
    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                if self.depth >= MAX_DEPTH {
                    return eval_err("expression is nested too deeply");
                }
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.parse_identifier(name),
            Some(token) => eval_err(format!("unexpected '{}'", token)),
            None => eval_err("unexpected end of expression"),
        }
    }

    fn parse_identifier(&mut self, name: &'static str) -> EvalResult<Expr> {
        match name {
            "pi" | "e" => {
                if self.peek() == Some(&Token::LParen) {
                    return eval_err(format!("'{}' is a constant, not a function", name));
                }
                let value = if name == "pi" {
                    std::f64::consts::PI
                } else {
                    std::f64::consts::E
                };
                Ok(Expr::Num(Number::Float(value)))
            }
            _ => {
                let function = Function::from_name(name)
                    .ok_or_else(|| ExpressionError::Unsafe(name.to_string()))?;
                if self.peek() != Some(&Token::LParen) {
                    return eval_err(format!("function '{}' must be called with arguments", name));
                }
                self.pos += 1;

                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    args.push(self.parse_expr()?);
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        args.push(self.parse_expr()?);
                    }
                }
                self.expect(Token::RParen)?;
                Ok(Expr::Call(function, args))
            }
        }
    }
}

/// Lex and parse an expression without evaluating it.
pub(crate) fn parse(input: &str) -> EvalResult<Expr> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return eval_err("empty expression");
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => eval_err(format!("unexpected '{}'", token)),
    }
}

// ============= Evaluation =============

/// Parse and evaluate an expression.
pub fn evaluate(input: &str) -> EvalResult<Number> {
    eval(&parse(input)?)
}

/// Evaluate a parsed expression tree.
pub(crate) fn eval(expr: &Expr) -> EvalResult<Number> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Unary(op, inner) => {
            let value = eval(inner)?;
            Ok(match (op, value) {
                (UnaryOp::Plus, v) => v,
                (UnaryOp::Neg, Number::Int(i)) => i
                    .checked_neg()
                    .map(Number::Int)
                    .unwrap_or(Number::Float(-(i as f64))),
                (UnaryOp::Neg, Number::Float(f)) => Number::Float(-f),
            })
        }
        Expr::Binary(op, lhs, rhs) => binary(*op, eval(lhs)?, eval(rhs)?),
        Expr::Call(function, args) => {
            let values = args.iter().map(eval).collect::<EvalResult<Vec<_>>>()?;
            call(*function, &values)
        }
    }
}

fn binary(op: BinaryOp, a: Number, b: Number) -> EvalResult<Number> {
    use Number::{Float, Int};

    match op {
        BinaryOp::Add => Ok(match (a, b) {
            (Int(x), Int(y)) => x.checked_add(y).map(Int).unwrap_or(Float(x as f64 + y as f64)),
            _ => Float(a.as_f64() + b.as_f64()),
        }),
        BinaryOp::Sub => Ok(match (a, b) {
            (Int(x), Int(y)) => x.checked_sub(y).map(Int).unwrap_or(Float(x as f64 - y as f64)),
            _ => Float(a.as_f64() - b.as_f64()),
        }),
        BinaryOp::Mul => Ok(match (a, b) {
            (Int(x), Int(y)) => x.checked_mul(y).map(Int).unwrap_or(Float(x as f64 * y as f64)),
            _ => Float(a.as_f64() * b.as_f64()),
        }),
        BinaryOp::Div => {
            if b.is_zero() {
                return match (a, b) {
                    (Int(_), Int(_)) => eval_err("division by zero"),
                    _ => eval_err("float division by zero"),
                };
            }
            Ok(Float(a.as_f64() / b.as_f64()))
        }
        BinaryOp::FloorDiv => match (a, b) {
            (Int(_), Int(0)) => eval_err("integer division or modulo by zero"),
            (Int(x), Int(y)) => match (x.checked_div(y), x.checked_rem(y)) {
                (Some(quotient), Some(rem)) if rem != 0 && ((x < 0) != (y < 0)) => {
                    Ok(Int(quotient - 1))
                }
                (Some(quotient), Some(_)) => Ok(Int(quotient)),
                // i64::MIN // -1
                _ => Ok(Float((x as f64 / y as f64).floor())),
            },
            _ if b.is_zero() => eval_err("float floor division by zero"),
            _ => Ok(Float((a.as_f64() / b.as_f64()).floor())),
        },
        BinaryOp::Pow => power(a, b),
    }
}

fn power(base: Number, exponent: Number) -> EvalResult<Number> {
    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if e >= 0 {
            if let Some(result) = u32::try_from(e).ok().and_then(|e| b.checked_pow(e)) {
                return Ok(Number::Int(result));
            }
        }
    }

    let (b, e) = (base.as_f64(), exponent.as_f64());
    if b == 0.0 && e < 0.0 {
        return eval_err("0.0 cannot be raised to a negative power");
    }
    if b < 0.0 && e.fract() != 0.0 {
        return eval_err("negative number cannot be raised to a fractional power");
    }

    let result = b.powf(e);
    if result.is_infinite() && b.is_finite() && e.is_finite() {
        return eval_err("numerical result out of range");
    }
    Ok(Number::Float(result))
}

fn expect_args(function: Function, args: &[Number], count: usize) -> EvalResult<()> {
    if args.len() != count {
        return eval_err(format!(
            "{}() takes exactly one argument ({} given)",
            function.name(),
            args.len()
        ));
    }
    Ok(())
}

fn call(function: Function, args: &[Number]) -> EvalResult<Number> {
    match function {
        Function::Abs => {
            expect_args(function, args, 1)?;
            Ok(match args[0] {
                Number::Int(i) => i
                    .checked_abs()
                    .map(Number::Int)
                    .unwrap_or(Number::Float((i as f64).abs())),
                Number::Float(f) => Number::Float(f.abs()),
            })
        }
        Function::Sqrt => {
            expect_args(function, args, 1)?;
            let x = args[0].as_f64();
            if x < 0.0 {
                return eval_err("math domain error");
            }
            Ok(Number::Float(x.sqrt()))
        }
        Function::Sin => {
            expect_args(function, args, 1)?;
            Ok(Number::Float(args[0].as_f64().sin()))
        }
        Function::Cos => {
            expect_args(function, args, 1)?;
            Ok(Number::Float(args[0].as_f64().cos()))
        }
        Function::Tan => {
            expect_args(function, args, 1)?;
            Ok(Number::Float(args[0].as_f64().tan()))
        }
        Function::Exp => {
            expect_args(function, args, 1)?;
            let result = args[0].as_f64().exp();
            if result.is_infinite() {
                return eval_err("math range error");
            }
            Ok(Number::Float(result))
        }
        Function::Log => {
            let (x, base) = match args {
                [x] => (x.as_f64(), None),
                [x, base] => (x.as_f64(), Some(base.as_f64())),
                _ => {
                    return eval_err(format!(
                        "log expected 1 or 2 arguments, got {}",
                        args.len()
                    ))
                }
            };
            if x <= 0.0 {
                return eval_err("math domain error");
            }
            match base {
                None => Ok(Number::Float(x.ln())),
                Some(b) if b <= 0.0 => eval_err("math domain error"),
                Some(b) if b == 1.0 => eval_err("float division by zero"),
                Some(b) => Ok(Number::Float(x.ln() / b.ln())),
            }
        }
    }
}
