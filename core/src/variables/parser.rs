//! Parser for the persisted textual form of formulas.
//!
//! Supports:
//! - Numbers (integers and floats, scientific notation)
//! - Term references (`@0` is the owner, `@1`.. the inference terms)
//! - Arithmetic operators (+, -, *, /, ^)
//! - Parentheses for grouping
//! - Function calls with one or more comma separated arguments
//! - Built-in constants (PI)

/// Parse error with location info
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Formula AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Reference to the inference term at this index
    Term(usize),
    /// Built-in constant (PI)
    Constant(String),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (negation)
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Function call
    FnCall {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    TermRef(usize),
    Op(char),
    LParen,
    RParen,
    Comma,
}

/// Split the input into tokens paired with their character offset.
fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' | '-' | '*' | '/' | '^' => {
                i += 1;
                Token::Op(c)
            }
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '@' => {
                i += 1;
                let digits = take_while(&chars, &mut i, |d| d.is_ascii_digit());
                let index = digits.parse::<usize>().map_err(|_| ParseError {
                    message: "Expected term index after @".to_string(),
                    position: start,
                })?;
                Token::TermRef(index)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = take_while(&chars, &mut i, |d| d.is_ascii_digit() || d == '.');
                // Exponent, e.g. 1.5e-3
                if matches!(chars.get(i), Some('e' | 'E')) {
                    text.push('e');
                    i += 1;
                    if let Some(&sign @ ('+' | '-')) = chars.get(i) {
                        text.push(sign);
                        i += 1;
                    }
                    text.push_str(&take_while(&chars, &mut i, |d| d.is_ascii_digit()));
                }
                let value = text.parse::<f64>().map_err(|_| ParseError {
                    message: format!("Invalid number: '{}'", text),
                    position: start,
                })?;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                Token::Identifier(take_while(&chars, &mut i, |d| d.is_ascii_alphanumeric() || d == '_'))
            }
            _ => {
                return Err(ParseError {
                    message: format!("Unexpected character: '{}'", c),
                    position: start,
                })
            }
        };
        tokens.push((token, start));
    }
    Ok(tokens)
}

fn take_while(chars: &[char], i: &mut usize, pred: impl Fn(char) -> bool) -> String {
    let start = *i;
    while *i < chars.len() && pred(chars[*i]) {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

/// Left and right binding power of a binary operator; `^` binds right.
fn binding_power(op: char) -> Option<(u8, u8, BinaryOperator)> {
    match op {
        '+' => Some((1, 2, BinaryOperator::Add)),
        '-' => Some((1, 2, BinaryOperator::Sub)),
        '*' => Some((3, 4, BinaryOperator::Mul)),
        '/' => Some((3, 4, BinaryOperator::Div)),
        '^' => Some((6, 5, BinaryOperator::Pow)),
        _ => None,
    }
}

/// Unary minus binds tighter than any binary operator: `-@1^2` is `(-@1)^2`.
const NEG_POWER: u8 = 7;

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.tokens.get(self.pos).map_or(self.end, |(_, p)| *p),
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("Expected {}", what)))
        }
    }

    fn expression(&mut self, min_power: u8) -> Result<Expr, ParseError> {
        let mut left = self.prefix()?;
        while let Some(Token::Op(op)) = self.peek() {
            let Some((lbp, rbp, op)) = binding_power(*op) else { break };
            if lbp < min_power {
                break;
            }
            self.pos += 1;
            let right = self.expression(rbp)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.next() else {
            self.pos -= 1;
            return Err(self.error("Unexpected end of formula"));
        };
        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::TermRef(index) => Ok(Expr::Term(index)),
            Token::Op('-') => Ok(Expr::UnaryOp {
                op: UnaryOperator::Neg,
                operand: Box::new(self.expression(NEG_POWER)?),
            }),
            Token::LParen => {
                let inner = self.expression(0)?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Identifier(name) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                let mut args = vec![self.expression(0)?];
                while self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    args.push(self.expression(0)?);
                }
                self.expect(Token::RParen, "')' after function arguments")?;
                Ok(Expr::FnCall { name, args })
            }
            Token::Identifier(name) if name.eq_ignore_ascii_case("pi") => Ok(Expr::Constant("PI".to_string())),
            Token::Identifier(name) => {
                self.pos -= 1;
                Err(self.error(format!("Unknown identifier: '{}'", name)))
            }
            other => {
                self.pos -= 1;
                Err(self.error(format!("Unexpected token: {:?}", other)))
            }
        }
    }
}

/// Parse a formula template (e.g. `sqrt(@1^2 + @2^2)`) into an AST
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            message: "Empty expression".to_string(),
            position: 0,
        });
    }
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
        end: input.chars().count(),
    };
    let expr = parser.expression(0)?;
    if parser.peek().is_some() {
        return Err(parser.error("Unexpected token after formula"));
    }
    Ok(expr)
}
