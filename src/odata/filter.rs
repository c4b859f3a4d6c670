//! `$filter` expressions: lexer, recursive-descent parser and evaluator.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and ("or" and)*
//! and     := unary ("and" unary)*
//! unary   := "not" unary | compare
//! compare := primary (("eq"|"ne"|"gt"|"ge"|"lt"|"le") primary)?
//! primary := "(" or ")" | literal | function "(" args ")" | path
//! ```

use serde_json::Value;
use std::cmp::Ordering;

use super::{resolve, ODataError};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Str(String),
    Num(f64),
    Word(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Str(s) => format!("'{}'", s),
            Token::Num(n) => n.to_string(),
            Token::Word(w) => w.clone(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ODataError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '\'' => {
                let mut literal = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        // '' is an escaped quote
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            literal.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            literal.push(ch);
                            i += 1;
                        }
                        None => return Err(ODataError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while chars
                    .get(i)
                    .is_some_and(|n| n.is_ascii_digit() || *n == '.')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ODataError::UnexpectedToken(text.clone()))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while chars
                    .get(i)
                    .is_some_and(|n| n.is_alphanumeric() || *n == '_' || *n == '/')
                {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => return Err(ODataError::UnexpectedChar(other, i)),
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "eq" => Some(CompareOp::Eq),
            "ne" => Some(CompareOp::Ne),
            "gt" => Some(CompareOp::Gt),
            "ge" => Some(CompareOp::Ge),
            "lt" => Some(CompareOp::Lt),
            "le" => Some(CompareOp::Le),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Contains,
    StartsWith,
    EndsWith,
    ToLower,
    ToUpper,
    Trim,
    Length,
}

impl Function {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "contains" => Some(Function::Contains),
            "startswith" => Some(Function::StartsWith),
            "endswith" => Some(Function::EndsWith),
            "tolower" => Some(Function::ToLower),
            "toupper" => Some(Function::ToUpper),
            "trim" => Some(Function::Trim),
            "length" => Some(Function::Length),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Function::Contains | Function::StartsWith | Function::EndsWith => 2,
            Function::ToLower | Function::ToUpper | Function::Trim | Function::Length => 1,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Function::Contains => "contains",
            Function::StartsWith => "startswith",
            Function::EndsWith => "endswith",
            Function::ToLower => "tolower",
            Function::ToUpper => "toupper",
            Function::Trim => "trim",
            Function::Length => "length",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Property(Vec<String>),
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Call(Function, Vec<Expr>),
}

/// Deepest nesting of parentheses, `not` and function calls accepted.
pub const MAX_DEPTH: usize = 64;
/// Most expression nodes one filter may build. Bounds the tree that
/// `and`/`or` chains grow without nesting.
pub const MAX_NODES: usize = 512;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expect(&mut self, expected: Token) -> Result<(), ODataError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ODataError::UnexpectedToken(token.describe())),
            None => Err(ODataError::UnexpectedEnd),
        }
    }

    fn descend(&mut self) -> Result<(), ODataError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ODataError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn node(&mut self, expr: Expr) -> Result<Expr, ODataError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(ODataError::TooLarge(MAX_NODES));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ODataError> {
        let mut left = self.parse_and()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = self.node(Expr::Or(Box::new(left), Box::new(right)))?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ODataError> {
        let mut left = self.parse_unary()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = self.node(Expr::And(Box::new(left), Box::new(right)))?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ODataError> {
        if self.peek_keyword("not") {
            self.pos += 1;
            self.descend()?;
            let inner = self.parse_unary()?;
            self.ascend();
            return self.node(Expr::Not(Box::new(inner)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, ODataError> {
        let left = self.parse_primary()?;
        let op = match self.peek() {
            Some(Token::Word(w)) => CompareOp::from_word(w),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let right = self.parse_primary()?;
                self.node(Expr::Compare(Box::new(left), op, Box::new(right)))
            }
            None => Ok(left),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ODataError> {
        match self.next() {
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                self.ascend();
                Ok(inner)
            }
            Some(Token::Str(s)) => self.node(Expr::Literal(Value::String(s))),
            Some(Token::Num(n)) => self.node(Expr::Literal(
                serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
            )),
            Some(Token::Word(word)) => {
                if self.peek() == Some(&Token::LParen) {
                    return self.parse_call(&word);
                }
                let expr = match word.to_ascii_lowercase().as_str() {
                    "true" => Expr::Literal(Value::Bool(true)),
                    "false" => Expr::Literal(Value::Bool(false)),
                    "null" => Expr::Literal(Value::Null),
                    _ => Expr::Property(word.split('/').map(str::to_string).collect()),
                };
                self.node(expr)
            }
            Some(token) => Err(ODataError::UnexpectedToken(token.describe())),
            None => Err(ODataError::UnexpectedEnd),
        }
    }

    fn parse_call(&mut self, word: &str) -> Result<Expr, ODataError> {
        let function =
            Function::from_word(word).ok_or_else(|| ODataError::UnknownFunction(word.to_string()))?;
        self.expect(Token::LParen)?;
        self.descend()?;

        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            args.push(self.parse_or()?);
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                args.push(self.parse_or()?);
            }
        }
        self.expect(Token::RParen)?;
        self.ascend();

        if args.len() != function.arity() {
            return Err(ODataError::Arity {
                name: function.name(),
                expected: function.arity(),
            });
        }
        self.node(Expr::Call(function, args))
    }
}

pub fn parse(input: &str) -> Result<Expr, ODataError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ODataError::UnexpectedEnd);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        nodes: 0,
    };
    let expr = parser.parse_or()?;
    match parser.next() {
        None => Ok(expr),
        Some(token) => Err(ODataError::UnexpectedToken(token.describe())),
    }
}

/// Ordering between two values of the same JSON type. Mixed types do not compare.
pub(crate) fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

impl Expr {
    pub fn evaluate(&self, row: &Value) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Property(path) => resolve(row, path).cloned().unwrap_or(Value::Null),
            Expr::Compare(left, op, right) => {
                let ordering = compare_values(&left.evaluate(row), &right.evaluate(row));
                let result = match op {
                    CompareOp::Eq => ordering == Some(Ordering::Equal),
                    CompareOp::Ne => ordering != Some(Ordering::Equal),
                    CompareOp::Gt => ordering == Some(Ordering::Greater),
                    CompareOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                    CompareOp::Lt => ordering == Some(Ordering::Less),
                    CompareOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                };
                Value::Bool(result)
            }
            Expr::And(left, right) => {
                Value::Bool(is_true(&left.evaluate(row)) && is_true(&right.evaluate(row)))
            }
            Expr::Or(left, right) => {
                Value::Bool(is_true(&left.evaluate(row)) || is_true(&right.evaluate(row)))
            }
            Expr::Not(inner) => Value::Bool(!is_true(&inner.evaluate(row))),
            Expr::Call(function, args) => {
                let values: Vec<Value> = args.iter().map(|arg| arg.evaluate(row)).collect();
                call(*function, &values)
            }
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        is_true(&self.evaluate(row))
    }
}

fn call(function: Function, args: &[Value]) -> Value {
    match (function, args) {
        (Function::Contains, [Value::String(a), Value::String(b)]) => Value::Bool(a.contains(b.as_str())),
        (Function::StartsWith, [Value::String(a), Value::String(b)]) => {
            Value::Bool(a.starts_with(b.as_str()))
        }
        (Function::EndsWith, [Value::String(a), Value::String(b)]) => {
            Value::Bool(a.ends_with(b.as_str()))
        }
        (Function::Contains | Function::StartsWith | Function::EndsWith, _) => Value::Bool(false),
        (Function::ToLower, [Value::String(a)]) => Value::String(a.to_lowercase()),
        (Function::ToUpper, [Value::String(a)]) => Value::String(a.to_uppercase()),
        (Function::Trim, [Value::String(a)]) => Value::String(a.trim().to_string()),
        (Function::Length, [Value::String(a)]) => Value::from(a.chars().count()),
        _ => Value::Null,
    }
}
