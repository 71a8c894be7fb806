//! Tokenizer for placeholder expressions.

use super::EvalError;
use super::value::parse_radix_integer;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
    Eof,
}

/// Punctuators, longest first so that `===` wins over `==`.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "**", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "(", ")", "[", "]", "{",
    "}", ",", ".", "?", ":", "+", "-", "*", "/", "%", "!", "<", ">",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_trivia()?;

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            return self.number();
        }
        if c == '"' || c == '\'' {
            return self.string(c);
        }
        if is_ident_start(c) {
            let start = self.pos;
            while self.peek().is_some_and(is_ident_part) {
                self.pos += 1;
            }
            return Ok(Token::Ident(self.chars[start..self.pos].iter().collect()));
        }

        for &punct in PUNCTUATORS {
            if self.starts_with(punct) {
                // `a?.5:b` is a conditional, not optional chaining.
                if punct == "?." && self.peek_at(2).is_some_and(|d| d.is_ascii_digit()) {
                    continue;
                }
                self.pos += punct.chars().count();
                return Ok(Token::Punct(punct));
            }
        }

        Err(EvalError::Syntax(format!("unexpected character '{}'", c)))
    }

    fn skip_trivia(&mut self) -> Result<(), EvalError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| !is_line_terminator(c)) {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    loop {
                        if self.peek().is_none() {
                            return Err(EvalError::Syntax("unterminated comment".to_string()));
                        }
                        if self.starts_with("*/") {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn number(&mut self) -> Result<Token, EvalError> {
        let start = self.pos;

        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits_start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[digits_start..self.pos].iter().collect();
                let value = parse_radix_integer(&digits, radix)
                    .ok_or_else(|| EvalError::Syntax("invalid numeric literal".to_string()))?;
                return Ok(Token::Number(value));
            }
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some('+' | '-')) {
                lookahead += 1;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += lookahead;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        // `3in` and `1.toString()` are syntax errors.
        if self.peek().is_some_and(is_ident_start) {
            return Err(EvalError::Syntax("identifier directly after number".to_string()));
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| EvalError::Syntax(format!("invalid numeric literal '{}'", text)))
    }

    fn string(&mut self, quote: char) -> Result<Token, EvalError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(EvalError::Syntax("unterminated string literal".to_string()));
            };
            self.pos += 1;
            match c {
                c if c == quote => return Ok(Token::Str(out)),
                '\n' | '\r' => {
                    return Err(EvalError::Syntax("unterminated string literal".to_string()));
                }
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), EvalError> {
        let Some(c) = self.peek() else {
            return Err(EvalError::Syntax("unterminated string literal".to_string()));
        };
        self.pos += 1;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'u' => {
                let code = if self.peek() == Some('{') {
                    self.pos += 1;
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != '}') {
                        self.pos += 1;
                    }
                    let digits: String = self.chars[start..self.pos].iter().collect();
                    self.pos += 1;
                    u32::from_str_radix(&digits, 16)
                        .ok()
                        .filter(|code| *code <= 0x10FFFF)
                        .ok_or_else(|| EvalError::Syntax("invalid unicode escape".to_string()))?
                } else {
                    self.hex_digits(4)?
                };
                self.push_code_unit(out, code)?;
            }
            // Line continuation.
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            c if c.is_ascii_digit() => {
                return Err(EvalError::Syntax("octal escape sequences are not allowed".to_string()));
            }
            c => out.push(c),
        }
        Ok(())
    }

    /// Push a `\u` escape, pairing surrogate halves when they are adjacent.
    fn push_code_unit(&mut self, out: &mut String, code: u32) -> Result<(), EvalError> {
        if (0xD800..0xDC00).contains(&code) && self.starts_with("\\u") {
            let save = self.pos;
            self.pos += 2;
            match self.hex_digits(4) {
                Ok(low) if (0xDC00..0xE000).contains(&low) => {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or('\u{fffd}'));
                    return Ok(());
                }
                _ => self.pos = save,
            }
        }
        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32, EvalError> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| EvalError::Syntax("invalid hexadecimal escape".to_string()))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Ok(value)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\u{200c}' || c == '\u{200d}'
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whether `name` can be used as a bound identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_part),
        _ => false,
    }
}
