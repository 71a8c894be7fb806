//! Recursive-descent parser producing the expression AST.
//!
//! Precedence, lowest to highest:
//!
//! ```text
//! sequence      a, b
//! conditional   a ? b : c
//! short-circuit a || b, a && b, a ?? b
//! equality      == != === !==
//! relational    < > <= >=
//! additive      + -
//! multiplicative * / %
//! exponent      ** (right associative)
//! unary         ! - + typeof void
//! postfix       a.b a[b] a(b) a?.b
//! ```

use super::EvalError;
use super::lexer::{Token, tokenize};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<(PropertyKey, Expr)>),
    Member {
        object: Box<Expr>,
        property: PropertyKey,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },
    /// Boundary of an optional chain; a short-circuit inside yields `undefined`.
    OptionalChain(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PropertyKey {
    Named(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Negate,
    Plus,
    TypeOf,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
    Coalesce,
}

/// Deepest nesting of groups, unary operators and conditionals, and the
/// tallest expression tree. Evaluation recursion is bounded by the latter.
pub(crate) const MAX_DEPTH: usize = 100;

/// Words that can never be used as an identifier reference.
pub(crate) const RESERVED_WORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
];

pub(crate) fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Parse a complete expression.
pub(crate) fn parse(source: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        token => Err(unexpected(token)),
    }
}

fn unexpected(token: &Token) -> EvalError {
    match token {
        Token::Eof => EvalError::Syntax("unexpected end of input".to_string()),
        Token::Number(n) => EvalError::Syntax(format!("unexpected number {}", n)),
        Token::Str(s) => EvalError::Syntax(format!("unexpected string \"{}\"", s)),
        Token::Ident(name) => EvalError::Syntax(format!("unexpected token '{}'", name)),
        Token::Punct(p) => EvalError::Syntax(format!("unexpected token '{}'", p)),
    }
}

fn too_deep() -> EvalError {
    EvalError::Range("expression nested too deeply".to_string())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Token::Punct(p) if *p == punct)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), EvalError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(unexpected(self.peek()))
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(too_deep());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_expression(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_conditional()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(",") {
            items.push(self.parse_conditional()?);
        }
        bounded(Expr::Sequence(items))
    }

    fn parse_conditional(&mut self) -> Result<Expr, EvalError> {
        self.nested(|parser| {
            let test = parser.parse_short_circuit()?;
            if !parser.eat("?") {
                return Ok(test);
            }
            let consequent = parser.parse_conditional()?;
            parser.expect(":")?;
            let alternate = parser.parse_conditional()?;
            bounded(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            })
        })
    }

    /// `??` chains may not be mixed with `&&`/`||` without parentheses.
    fn parse_short_circuit(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_binary(1)?;

        if self.is_punct("??") {
            let mut left = first;
            while self.eat("??") {
                let right = self.parse_binary(1)?;
                left = logical(LogicalOp::Coalesce, left, right)?;
            }
            if self.is_punct("&&") || self.is_punct("||") {
                return Err(mixed_coalesce());
            }
            return Ok(left);
        }

        let mut left = self.parse_and_tail(first)?;
        while self.eat("||") {
            let operand = self.parse_binary(1)?;
            let right = self.parse_and_tail(operand)?;
            left = logical(LogicalOp::Or, left, right)?;
        }
        if self.is_punct("??") {
            return Err(mixed_coalesce());
        }
        Ok(left)
    }

    fn parse_and_tail(&mut self, mut left: Expr) -> Result<Expr, EvalError> {
        while self.eat("&&") {
            let right = self.parse_binary(1)?;
            left = logical(LogicalOp::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, EvalError> {
        let mut left = self.parse_exponent()?;
        loop {
            let Token::Punct(punct) = self.peek() else {
                break;
            };
            let Some((precedence, op)) = binary_operator(punct) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let right = self.parse_binary(precedence + 1)?;
            left = bounded(Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })?;
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expr, EvalError> {
        if self.unary_operator().is_some() {
            let expr = self.parse_unary()?;
            if self.is_punct("**") {
                return Err(EvalError::Syntax(
                    "unary operator used immediately before exponentiation expression".to_string(),
                ));
            }
            return Ok(expr);
        }

        let base = self.parse_postfix()?;
        if self.eat("**") {
            let exponent = self.nested(Self::parse_exponent)?;
            return bounded(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn unary_operator(&self) -> Option<UnaryOp> {
        match self.peek() {
            Token::Punct("!") => Some(UnaryOp::Not),
            Token::Punct("-") => Some(UnaryOp::Negate),
            Token::Punct("+") => Some(UnaryOp::Plus),
            Token::Ident(name) if name == "typeof" => Some(UnaryOp::TypeOf),
            Token::Ident(name) if name == "void" => Some(UnaryOp::Void),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        match self.unary_operator() {
            Some(op) => {
                self.pos += 1;
                let operand = self.nested(Self::parse_unary)?;
                bounded(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_primary()?;
        let mut optional_chain = false;

        loop {
            if self.eat(".") {
                let name = self.parse_property_name()?;
                expr = member(expr, PropertyKey::Named(name), false)?;
            } else if self.eat("?.") {
                optional_chain = true;
                if self.eat("(") {
                    let args = self.parse_arguments()?;
                    expr = call(expr, args, true)?;
                } else if self.eat("[") {
                    let key = self.parse_expression()?;
                    self.expect("]")?;
                    expr = member(expr, PropertyKey::Computed(Box::new(key)), true)?;
                } else {
                    let name = self.parse_property_name()?;
                    expr = member(expr, PropertyKey::Named(name), true)?;
                }
            } else if self.eat("[") {
                let key = self.parse_expression()?;
                self.expect("]")?;
                expr = member(expr, PropertyKey::Computed(Box::new(key)), false)?;
            } else if self.eat("(") {
                let args = self.parse_arguments()?;
                expr = call(expr, args, false)?;
            } else {
                break;
            }
        }

        if optional_chain {
            expr = bounded(Expr::OptionalChain(Box::new(expr)))?;
        }
        Ok(expr)
    }

    /// Any identifier name, reserved words included (`a.class` is fine).
    fn parse_property_name(&mut self) -> Result<String, EvalError> {
        match self.advance() {
            Token::Ident(name) => Ok(name),
            token => Err(unexpected(&token)),
        }
    }

    /// Arguments after the opening parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        while !self.eat(")") {
            args.push(self.parse_conditional()?);
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                word if is_reserved_word(word) => {
                    Err(EvalError::Syntax(format!("unsupported keyword '{}'", word)))
                }
                _ => Ok(Expr::Ident(name)),
            },
            Token::Punct("(") => {
                let expr = self.parse_expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            Token::Punct("[") => self.parse_array(),
            Token::Punct("{") => self.parse_object(),
            token => Err(unexpected(&token)),
        }
    }

    /// Array literal after the opening bracket.
    fn parse_array(&mut self) -> Result<Expr, EvalError> {
        let mut items = Vec::new();
        loop {
            if self.eat("]") {
                return bounded(Expr::Array(items));
            }
            if self.eat(",") {
                // Hole.
                items.push(Expr::Undefined);
                continue;
            }
            items.push(self.parse_conditional()?);
            if !self.eat(",") {
                self.expect("]")?;
                return bounded(Expr::Array(items));
            }
        }
    }

    /// Object literal after the opening brace.
    fn parse_object(&mut self) -> Result<Expr, EvalError> {
        let mut entries = Vec::new();
        loop {
            if self.eat("}") {
                return bounded(Expr::Object(entries));
            }

            let entry = match self.advance() {
                Token::Ident(name) => {
                    if self.eat(":") {
                        (PropertyKey::Named(name), self.parse_conditional()?)
                    } else if is_reserved_word(&name) {
                        return Err(EvalError::Syntax(format!("unsupported keyword '{}'", name)));
                    } else {
                        (PropertyKey::Named(name.clone()), Expr::Ident(name))
                    }
                }
                Token::Str(key) => {
                    self.expect(":")?;
                    (PropertyKey::Named(key), self.parse_conditional()?)
                }
                Token::Number(n) => {
                    self.expect(":")?;
                    let key = super::value::format_number(n);
                    (PropertyKey::Named(key), self.parse_conditional()?)
                }
                Token::Punct("[") => {
                    let key = self.parse_conditional()?;
                    self.expect("]")?;
                    self.expect(":")?;
                    (
                        PropertyKey::Computed(Box::new(key)),
                        self.parse_conditional()?,
                    )
                }
                token => return Err(unexpected(&token)),
            };
            entries.push(entry);

            if !self.eat(",") {
                self.expect("}")?;
                return bounded(Expr::Object(entries));
            }
        }
    }
}

fn binary_operator(punct: &str) -> Option<(u8, BinaryOp)> {
    let entry = match punct {
        "==" => (1, BinaryOp::Eq),
        "!=" => (1, BinaryOp::Ne),
        "===" => (1, BinaryOp::StrictEq),
        "!==" => (1, BinaryOp::StrictNe),
        "<" => (2, BinaryOp::Lt),
        ">" => (2, BinaryOp::Gt),
        "<=" => (2, BinaryOp::Le),
        ">=" => (2, BinaryOp::Ge),
        "+" => (3, BinaryOp::Add),
        "-" => (3, BinaryOp::Sub),
        "*" => (4, BinaryOp::Mul),
        "/" => (4, BinaryOp::Div),
        "%" => (4, BinaryOp::Rem),
        _ => return None,
    };
    Some(entry)
}

fn mixed_coalesce() -> EvalError {
    EvalError::Syntax("cannot mix '??' with '&&' or '||' without parentheses".to_string())
}

/// Reject a node taller than [`MAX_DEPTH`].
///
/// Children were checked when they were built, so this never recurses
/// deeper than the limit.
fn bounded(expr: Expr) -> Result<Expr, EvalError> {
    if height(&expr) > MAX_DEPTH {
        Err(too_deep())
    } else {
        Ok(expr)
    }
}

/// Tree height, counting a leaf as 1.
fn height(expr: &Expr) -> usize {
    let children = match expr {
        Expr::Undefined
        | Expr::Null
        | Expr::Bool(_)
        | Expr::Number(_)
        | Expr::Str(_)
        | Expr::Ident(_) => 0,
        Expr::Array(items) | Expr::Sequence(items) => max_height(items),
        Expr::Object(entries) => entries
            .iter()
            .map(|(key, value)| key_height(key).max(height(value)))
            .max()
            .unwrap_or(0),
        Expr::Member {
            object, property, ..
        } => height(object).max(key_height(property)),
        Expr::Call { callee, args, .. } => height(callee).max(max_height(args)),
        Expr::OptionalChain(inner) => height(inner),
        Expr::Unary { operand, .. } => height(operand),
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            height(left).max(height(right))
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => height(test).max(height(consequent)).max(height(alternate)),
    };
    children + 1
}

fn max_height(items: &[Expr]) -> usize {
    items.iter().map(height).max().unwrap_or(0)
}

fn key_height(key: &PropertyKey) -> usize {
    match key {
        PropertyKey::Named(_) => 0,
        PropertyKey::Computed(expr) => height(expr),
    }
}

fn logical(op: LogicalOp, left: Expr, right: Expr) -> Result<Expr, EvalError> {
    bounded(Expr::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn member(object: Expr, property: PropertyKey, optional: bool) -> Result<Expr, EvalError> {
    bounded(Expr::Member {
        object: Box::new(object),
        property,
        optional,
    })
}

fn call(callee: Expr, args: Vec<Expr>, optional: bool) -> Result<Expr, EvalError> {
    bounded(Expr::Call {
        callee: Box::new(callee),
        args,
        optional,
    })
}
