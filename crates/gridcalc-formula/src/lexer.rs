//! Formula lexer
//!
//! A single-pass scanner that hands out one token at a time.

use gridcalc_core::ErrorCode;
use std::fmt;

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    /// `#REF!`
    RefError,

    // Identifiers and references
    /// Cell reference like A1, $A$1; also a bare letter run, which the
    /// parser rejects as an incomplete reference
    CellRef(String),
    /// Letter run immediately followed by `(`
    Function(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    /// End of input; carries the character that stopped the scan when it
    /// was not a clean end
    End(Option<char>),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(true) => f.write_str("TRUE"),
            Token::Boolean(false) => f.write_str("FALSE"),
            Token::RefError => f.write_str("#REF!"),
            Token::CellRef(s) | Token::Function(s) => f.write_str(s),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("<>"),
            Token::LessThan => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::GreaterThan => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::Colon => f.write_str(":"),
            Token::Comma => f.write_str(","),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::End(Some(c)) => write!(f, "'{}'", c),
            Token::End(None) => f.write_str("end of formula"),
        }
    }
}

/// Formula lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over formula text; a leading `=` is skipped
    pub fn new(formula: &'a str) -> Self {
        let formula = formula.trim();
        let input = formula.strip_prefix('=').unwrap_or(formula);
        Self { input, pos: 0 }
    }

    /// Scan the next token
    ///
    /// Once the input is exhausted (or an unknown character is met) every
    /// further call returns [`Token::End`].
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Token::End(None);
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            '=' => Some(Token::Equal),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return token;
        }

        // Two-character operators
        if c == '<' {
            self.advance();
            return match self.peek_char() {
                Some('=') => {
                    self.advance();
                    Token::LessEqual
                }
                Some('>') => {
                    self.advance();
                    Token::NotEqual
                }
                _ => Token::LessThan,
            };
        }

        if c == '>' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Token::GreaterEqual;
            }
            return Token::GreaterThan;
        }

        if c == '"' {
            return self.scan_string();
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '$' {
            return self.scan_reference_or_name();
        }

        if c == '#'
            && self.rest().get(..5).and_then(ErrorCode::from_token) == Some(ErrorCode::Ref)
        {
            self.pos += 5;
            return Token::RefError;
        }

        // Unknown character: stop here and let the parser report it
        self.pos = self.input.len();
        Token::End(Some(c))
    }

    fn scan_string(&mut self) -> Token {
        self.advance(); // Skip opening quote

        let rest = self.rest();
        match rest.find('"') {
            Some(end) => {
                let s = rest[..end].to_string();
                self.pos += end + 1;
                Token::String(s)
            }
            None => {
                // Unterminated string literal
                self.pos = self.input.len();
                Token::End(Some('"'))
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        self.skip_while(|c| c.is_ascii_digit());

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_while(|c| c.is_ascii_digit());
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::End(num_str.chars().next()),
        }
    }

    fn scan_reference_or_name(&mut self) -> Token {
        let start = self.pos;

        let col_fixed = self.eat('$');
        let letters_start = self.pos;
        self.skip_while(|c| c.is_ascii_alphabetic());
        let letters_end = self.pos;
        let row_fixed = self.eat('$');
        let digits_start = self.pos;
        self.skip_while(|c| c.is_ascii_digit());
        let has_digits = self.pos > digits_start;

        let text = &self.input[start..self.pos];

        if !col_fixed && !row_fixed && !has_digits {
            let letters = &self.input[letters_start..letters_end];

            if self.peek_char() == Some('(') {
                return Token::Function(letters.to_ascii_uppercase());
            }
            if letters.eq_ignore_ascii_case("TRUE") {
                return Token::Boolean(true);
            }
            if letters.eq_ignore_ascii_case("FALSE") {
                return Token::Boolean(false);
            }
        }

        Token::CellRef(text.to_string())
    }

    // === Helper methods ===

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().map_or(false, &predicate) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }
}

/// Scan a whole formula into tokens, up to and including the end marker
pub fn tokenize(formula: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(formula);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = matches!(token, Token::End(_));
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
