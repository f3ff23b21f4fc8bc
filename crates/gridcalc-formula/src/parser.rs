//! Formula parser
//!
//! A recursive descent parser with precedence climbing for binary operators.

use crate::ast::{BinaryOperator, FormulaExpr, RangeReference, UnaryOperator};
use crate::error::{FormulaResult, ParseError};
use crate::lexer::{Lexer, Token};
use gridcalc_core::CellReference;

/// Parse a formula string into an AST
///
/// The leading `=` is optional.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = Parser::new(formula);
    let expr = parser.parse_expression(0)?;

    // Make sure we consumed all input
    match parser.current {
        Token::End(None) => Ok(expr),
        Token::End(Some(c)) => Err(unexpected_character(c).into()),
        ref token => {
            Err(ParseError::new("Unexpected token after expression", token.to_string()).into())
        }
    }
}

fn unexpected_character(c: char) -> ParseError {
    ParseError::new(format!("Unexpected character '{}'", c), c.to_string())
}

/// Formula parser
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(formula: &'a str) -> Self {
        let mut lexer = Lexer::new(formula);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    /// Move to the next token, returning the one just consumed
    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("Expected '{}'", expected)))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        match self.current {
            Token::End(Some(c)) => unexpected_character(c),
            ref token => ParseError::new(message, token.to_string()),
        }
    }

    fn current_operator(&self) -> Option<BinaryOperator> {
        let op = match self.current {
            Token::Plus => BinaryOperator::Add,
            Token::Minus => BinaryOperator::Subtract,
            Token::Star => BinaryOperator::Multiply,
            Token::Slash => BinaryOperator::Divide,
            Token::Caret => BinaryOperator::Power,
            Token::Equal => BinaryOperator::Equal,
            Token::NotEqual => BinaryOperator::NotEqual,
            Token::LessThan => BinaryOperator::LessThan,
            Token::LessEqual => BinaryOperator::LessEqual,
            Token::GreaterThan => BinaryOperator::GreaterThan,
            Token::GreaterEqual => BinaryOperator::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }

    // === Expression parsing ===

    /// Parse operators binding at least as tightly as `min_precedence`
    ///
    /// The right operand is parsed one level tighter, so equal-precedence
    /// chains associate to the left.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<FormulaExpr, ParseError> {
        let mut left = self.parse_primary()?;

        while let Some(op) = self.current_operator() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_expression(precedence + 1)?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<FormulaExpr, ParseError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance();
                Ok(FormulaExpr::Number(n))
            }
            Token::String(s) => {
                self.advance();
                Ok(FormulaExpr::String(s))
            }
            Token::Boolean(b) => {
                self.advance();
                Ok(FormulaExpr::Boolean(b))
            }
            Token::RefError => {
                self.advance();
                Ok(FormulaExpr::RefError)
            }
            Token::CellRef(text) => {
                self.advance();
                self.parse_reference(&text)
            }
            Token::Function(name) => {
                self.advance();
                self.parse_function(name)
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            Token::Minus => {
                self.advance();
                let operand = self.parse_primary()?;
                Ok(FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                })
            }
            Token::End(None) => Err(ParseError::new(
                "Unexpected end of formula",
                Token::End(None).to_string(),
            )),
            _ => Err(self.error("Expected a value, reference, or function call")),
        }
    }

    /// Parse a cell reference, or a range when a `:` follows
    fn parse_reference(&mut self, text: &str) -> Result<FormulaExpr, ParseError> {
        let start = resolve_reference(text)?;

        if self.current != Token::Colon {
            return Ok(start.map_or(FormulaExpr::RefError, FormulaExpr::CellRef));
        }
        self.advance();

        let end = match self.advance() {
            Token::CellRef(end_text) => resolve_reference(&end_text)?,
            Token::End(Some(c)) => return Err(unexpected_character(c)),
            token => {
                return Err(ParseError::new(
                    "Expected a cell reference after ':'",
                    token.to_string(),
                ))
            }
        };

        Ok(match (start, end) {
            (Some(start), Some(end)) => FormulaExpr::RangeRef(RangeReference::new(start, end)),
            _ => FormulaExpr::RefError,
        })
    }

    fn parse_function(&mut self, name: String) -> Result<FormulaExpr, ParseError> {
        self.expect(Token::LeftParen)?;

        let mut args = Vec::new();
        if self.current != Token::RightParen {
            loop {
                args.push(self.parse_expression(0)?);
                if self.current == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(Token::RightParen)?;

        Ok(FormulaExpr::Function {
            name: name.to_ascii_uppercase(),
            args,
        })
    }
}

/// Decode a reference token
///
/// A well-formed reference that lies off the sheet resolves to `None`, which
/// the caller turns into a `#REF!` node; a malformed one is a parse error.
fn resolve_reference(text: &str) -> Result<Option<CellReference>, ParseError> {
    match CellReference::parse(text) {
        Ok(reference) => Ok(Some(reference)),
        Err(_) if text.ends_with(|c: char| c.is_ascii_digit()) => Ok(None),
        Err(e) => Err(ParseError::new(e.to_string(), text)),
    }
}
