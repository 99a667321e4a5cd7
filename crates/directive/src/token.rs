//! Directive records and the block lexer that produces them.
//!
//! The host server owns tokenization; everything past this module only sees
//! [`Block`] and [`Directive`] records. [`parse`] is a small lexer for the
//! block syntax so records can be built from configuration text:
//!
//! ```text
//! login /login {          # keyword, path argument, block opener
//!     cookie-name "auth"  # sub-directive with one argument
//! }
//! ```

use crate::error::Diagnostic;
use std::{fmt, iter::Peekable};

/// Source location of a directive, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    /// 1-based line number.
    pub line: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A directive name and the arguments written after it on the same line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub args: Vec<String>,
    pub position: Position,
}

impl Directive {
    pub fn new<I, S>(name: impl Into<String>, args: I, position: Position) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            position,
        }
    }
}

/// A top-level directive and the sub-directives of its block.
///
/// `body` is empty when the directive was written without a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub keyword: Directive,
    pub body: Vec<Directive>,
}

impl Block {
    /// Whether this block was opened by the given keyword.
    pub fn is(&self, keyword: &str) -> bool {
        self.keyword.name == keyword
    }
}

#[derive(Debug)]
struct Token {
    text: String,
    line: usize,
    quoted: bool,
}

impl Token {
    fn is(&self, brace: &str) -> bool {
        !self.quoted && self.text == brace
    }

    fn is_brace(&self) -> bool {
        self.is("{") || self.is("}")
    }
}

/// Lex configuration text into blocks.
///
/// Nested blocks, stray braces, unterminated quotes and unclosed blocks are
/// reported as diagnostics against `file`.
pub fn parse(file: &str, input: &str) -> Result<Vec<Block>, Diagnostic> {
    let mut tokens = tokenize(file, input)?.into_iter().peekable();
    let mut blocks = Vec::new();

    while let Some(first) = tokens.next() {
        let position = Position::new(file, first.line);
        if first.is_brace() {
            return Err(unexpected(&first, file));
        }

        let mut rest = rest_of_line(&mut tokens, first.line);
        let opens = rest.last().is_some_and(|t| t.is("{"));
        if opens {
            rest.pop();
        }
        if let Some(brace) = rest.iter().find(|t| t.is_brace()) {
            return Err(unexpected(brace, file));
        }

        let keyword = Directive::new(first.text, rest.into_iter().map(|t| t.text), position);
        let body = if opens {
            parse_body(&mut tokens, file, &keyword.position)?
        } else {
            Vec::new()
        };
        blocks.push(Block { keyword, body });
    }

    Ok(blocks)
}

fn parse_body<I>(
    tokens: &mut Peekable<I>,
    file: &str,
    opened_at: &Position,
) -> Result<Vec<Directive>, Diagnostic>
where
    I: Iterator<Item = Token>,
{
    let mut body = Vec::new();
    loop {
        let Some(name) = tokens.next() else {
            return Err(Diagnostic::new("Unclosed block", opened_at.clone()));
        };
        if name.is("}") {
            return Ok(body);
        }
        if name.is("{") {
            return Err(unexpected(&name, file));
        }

        let mut rest = rest_of_line(tokens, name.line);
        let closes = rest.last().is_some_and(|t| t.is("}"));
        if closes {
            rest.pop();
        }
        if let Some(brace) = rest.iter().find(|t| t.is_brace()) {
            if brace.is("{") {
                return Err(Diagnostic::new(
                    format!("Nested blocks are not supported in {}", name.text),
                    Position::new(file, brace.line),
                ));
            }
            return Err(unexpected(brace, file));
        }

        let position = Position::new(file, name.line);
        body.push(Directive::new(
            name.text,
            rest.into_iter().map(|t| t.text),
            position,
        ));
        if closes {
            return Ok(body);
        }
    }
}

fn rest_of_line<I>(tokens: &mut Peekable<I>, line: usize) -> Vec<Token>
where
    I: Iterator<Item = Token>,
{
    let mut rest = Vec::new();
    while let Some(token) = tokens.next_if(|t| t.line == line) {
        rest.push(token);
    }
    rest
}

fn unexpected(token: &Token, file: &str) -> Diagnostic {
    Diagnostic::new(
        format!("Unexpected '{}'", token.text),
        Position::new(file, token.line),
    )
}

fn tokenize(file: &str, input: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();

    for (index, text) in input.lines().enumerate() {
        let line = index + 1;
        let mut chars = text.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let Some(&c) = chars.peek() else { break };

            match c {
                '#' => break,
                '"' => {
                    chars.next();
                    let mut value = String::new();
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        match c {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => match chars.next_if(|n| matches!(n, '"' | '\\')) {
                                Some(escaped) => value.push(escaped),
                                None => value.push('\\'),
                            },
                            _ => value.push(c),
                        }
                    }
                    if !closed {
                        return Err(Diagnostic::new(
                            "Unterminated quoted string",
                            Position::new(file, line),
                        ));
                    }
                    tokens.push(Token {
                        text: value,
                        line,
                        quoted: true,
                    });
                }
                _ => {
                    let mut value = String::new();
                    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                        value.push(c);
                    }
                    tokens.push(Token {
                        text: value,
                        line,
                        quoted: false,
                    });
                }
            }
        }
    }

    Ok(tokens)
}
