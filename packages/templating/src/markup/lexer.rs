//! Markup Lexer
//!
//! Converts template source text into a flat token list. Character
//! references are left untouched.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Comment(String),
    TagOpen {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    TagClose {
        name: String,
    },
}

/// Token together with the source offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokenizer = Tokenizer::new(source);
    tokenizer.tokenize()?;
    Ok(tokenizer.tokens)
}

struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<SpannedToken>,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Tokenizer {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn tokenize(&mut self) -> Result<(), ParseError> {
        while self.pos < self.source.len() {
            let start = self.pos;
            let token = if self.starts_with("<!--") {
                self.consume_comment()?
            } else if self.starts_with("</") {
                self.consume_tag_close()?
            } else if self.starts_with("<") {
                self.consume_tag_open()?
            } else {
                self.consume_text()
            };
            self.tokens.push(SpannedToken {
                token,
                offset: start,
            });
        }
        Ok(())
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if pred(ch)) {
            self.advance();
        }
        &self.source[start..self.pos]
    }

    fn error(&self, msg: &str, offset: usize) -> ParseError {
        let (line, col) = line_col(self.source, offset);
        ParseError::new(msg, offset, line, col)
    }

    fn consume_text(&mut self) -> Token {
        let value = self.take_while(|ch| ch != '<');
        Token::Text(value.to_string())
    }

    fn consume_comment(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += "<!--".len();
        match self.rest().find("-->") {
            Some(end) => {
                let value = self.rest()[..end].to_string();
                self.pos += end + "-->".len();
                Ok(Token::Comment(value))
            }
            None => Err(self.error("Unterminated comment", start)),
        }
    }

    fn consume_tag_close(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += "</".len();
        let name = self.take_while(is_name_char).to_string();
        self.skip_whitespace();
        if name.is_empty() || self.advance() != Some('>') {
            return Err(self.error("Unterminated end tag", start));
        }
        Ok(Token::TagClose { name })
    }

    fn consume_tag_open(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.advance();
        if !matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic()) {
            return Err(self.error("Unexpected character after \"<\"", start));
        }
        let name = self.take_while(is_name_char).to_string();
        let mut attrs: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(Token::TagOpen {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            match self.peek() {
                None => return Err(self.error("Unterminated start tag", start)),
                Some('>') => {
                    self.advance();
                    return Ok(Token::TagOpen {
                        name,
                        attrs,
                        self_closing: false,
                    });
                }
                Some(_) => {
                    let attr = self.consume_attr()?;
                    // The first occurrence of an attribute wins, as in browsers.
                    if !attrs.iter().any(|(existing, _)| *existing == attr.0) {
                        attrs.push(attr);
                    }
                }
            }
        }
    }

    fn consume_attr(&mut self) -> Result<(String, String), ParseError> {
        let start = self.pos;
        let name = self.take_while(is_attr_name_char).to_string();
        if name.is_empty() {
            return Err(self.error("Unexpected character in start tag", start));
        }
        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Ok((name, String::new()));
        }
        self.advance();
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let value_start = self.pos;
                self.advance();
                let value = self.take_while(|ch| ch != quote).to_string();
                if self.advance() != Some(quote) {
                    return Err(self.error("Unterminated attribute value", value_start));
                }
                value
            }
            _ => self
                .take_while(|ch| !ch.is_whitespace() && ch != '>')
                .to_string(),
        };
        Ok((name, value))
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.')
}

fn is_attr_name_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '=' | '>' | '/' | '"' | '\'' | '<')
}

/// 1-based line and 0-based column of `offset`.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let col = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count(),
        None => before.chars().count(),
    };
    (line, col)
}
