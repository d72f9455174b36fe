//! Recursive descent parser for sam command strings.
//!
//! Transforms a textual command such as `,x/foo/{g/bar/d}` into a [`Command`] tree.
//!
//! ```text
//! command        := [address] simple-command
//! simple-command := ('x'|'y'|'g'|'v') delimited [command]
//!                 | 'p' | 'd'
//!                 | ('c'|'a'|'i') delimited
//!                 | '|' rest-of-line
//!                 | '{' command* '}'
//! address        := simple-address [',' address] | ',' [address]
//! simple-address := '.' | '$' | '#' number | number | '/' re '/' | '?' re '?'
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use itertools::Itertools;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::address::{Address, Direction};
use crate::command::Command;
use crate::error::SamError;

/// Deepest permitted nesting of sub-commands and groups.
pub(crate) const MAX_NESTING_DEPTH: usize = 100;

/// Parse a sam command string into a [`Command`] tree.
pub fn parse(input: &str) -> Result<Command, SamError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
    };
    let command = parser.parse_command(0)?;
    parser.skip_whitespace();
    if let Some(&(offset, ch)) = parser.chars.peek() {
        return Err(SamError::syntax(
            offset,
            format!("unexpected '{ch}' after command"),
        ));
    }
    debug!(%command, "parsed sam command");
    Ok(command)
}

/// Compile a pattern the way every sam construct uses it: `^` and `$` match at line boundaries.
pub(crate) fn compile_pattern(source: &str, offset: usize) -> Result<Regex, SamError> {
    RegexBuilder::new(source)
        .multi_line(true)
        .build()
        .map_err(|err| SamError::syntax(offset, format!("invalid regular expression: {err}")))
}

/// Escape `text` so that reading it back between `delim`s yields `text` again.
pub(crate) fn escape_delimited(text: &str, delim: char) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.input.len(), |&(offset, _)| offset)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    /// `[address] simple-command`. An address with nothing after it prints.
    fn parse_command(&mut self, depth: usize) -> Result<Command, SamError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(SamError::syntax(self.offset(), "commands nested too deeply"));
        }
        self.skip_whitespace();
        if !self.at_address_start() {
            return self.parse_simple(depth);
        }

        let addr = self.parse_address(0)?;
        self.skip_whitespace();
        let sub = match self.peek_char() {
            None | Some('}') => Command::Print,
            _ => self.parse_simple(depth)?,
        };
        Ok(Command::Addressed {
            addr,
            sub: Box::new(sub),
        })
    }

    fn parse_simple(&mut self, depth: usize) -> Result<Command, SamError> {
        self.skip_whitespace();
        let Some((offset, ch)) = self.chars.next() else {
            return Err(SamError::syntax(self.input.len(), "expected command"));
        };
        match ch {
            'x' | 'y' => {
                let pattern = self.parse_pattern(ch)?;
                let sub = self.parse_sub_command(depth)?;
                Ok(Command::Extract {
                    pattern,
                    sub: Box::new(sub),
                    inverse: ch == 'y',
                })
            }
            'g' | 'v' => {
                let pattern = self.parse_pattern(ch)?;
                let sub = self.parse_sub_command(depth)?;
                Ok(Command::Guard {
                    pattern,
                    sub: Box::new(sub),
                    inverse: ch == 'v',
                })
            }
            'p' => Ok(Command::Print),
            'd' => Ok(Command::Delete),
            'c' => Ok(Command::Change(self.parse_text(ch)?)),
            'a' => Ok(Command::Append(self.parse_text(ch)?)),
            'i' => Ok(Command::Insert(self.parse_text(ch)?)),
            '|' => self.parse_pipe(offset),
            '{' => self.parse_group(offset, depth),
            other => Err(SamError::syntax(
                offset,
                format!("unknown command '{other}'"),
            )),
        }
    }

    /// The command following `x`/`y`/`g`/`v`; `p` when the input or the group ends first.
    fn parse_sub_command(&mut self, depth: usize) -> Result<Command, SamError> {
        self.skip_whitespace();
        match self.peek_char() {
            None | Some('}') => Ok(Command::Print),
            _ => self.parse_command(depth + 1),
        }
    }

    /// `{ command* }` (the opening brace has already been consumed).
    fn parse_group(&mut self, open: usize, depth: usize) -> Result<Command, SamError> {
        let mut commands = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(SamError::syntax(open, "unclosed '{'")),
                Some('}') => {
                    self.chars.next();
                    return Ok(Command::Group(commands));
                }
                _ => commands.push(self.parse_command(depth + 1)?),
            }
        }
    }

    /// `|cmd`: the rest of the line, taken verbatim.
    fn parse_pipe(&mut self, offset: usize) -> Result<Command, SamError> {
        let rest: String = self
            .chars
            .peeking_take_while(|&(_, ch)| ch != '\n')
            .map(|(_, ch)| ch)
            .collect();
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(SamError::syntax(offset, "empty pipe command"));
        }
        Ok(Command::Pipe(rest.to_string()))
    }

    fn parse_pattern(&mut self, cmd: char) -> Result<Regex, SamError> {
        let (offset, delim) = self.parse_delimiter(cmd)?;
        let source = self.read_delimited(delim, offset)?;
        compile_pattern(&source, offset)
    }

    fn parse_text(&mut self, cmd: char) -> Result<String, SamError> {
        let (offset, delim) = self.parse_delimiter(cmd)?;
        self.read_delimited(delim, offset)
    }

    fn parse_delimiter(&mut self, cmd: char) -> Result<(usize, char), SamError> {
        match self.chars.next() {
            Some((offset, ch)) if ch.is_whitespace() || ch == '\\' => Err(SamError::syntax(
                offset,
                format!("invalid delimiter {ch:?} after '{cmd}'"),
            )),
            Some(found) => Ok(found),
            None => Err(SamError::syntax(
                self.input.len(),
                format!("expected delimiter after '{cmd}'"),
            )),
        }
    }

    /// Read up to the closing `delim`, resolving `\n`, `\t`, `\\` and `\<delim>`.
    ///
    /// Any other escape is kept as written, backslash included.
    fn read_delimited(&mut self, delim: char, open: usize) -> Result<String, SamError> {
        let unterminated = || SamError::syntax(open, format!("unterminated {delim}...{delim}"));
        let mut content = String::new();
        loop {
            match self.chars.next() {
                Some((_, ch)) if ch == delim => return Ok(content),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => content.push('\n'),
                    Some((_, 't')) => content.push('\t'),
                    Some((_, '\\')) => content.push('\\'),
                    Some((_, ch)) if ch == delim => content.push(ch),
                    Some((_, ch)) => {
                        content.push('\\');
                        content.push(ch);
                    }
                    None => return Err(unterminated()),
                },
                Some((_, ch)) => content.push(ch),
                None => return Err(unterminated()),
            }
        }
    }

    fn at_address_start(&mut self) -> bool {
        matches!(
            self.peek_char(),
            Some('.' | ',' | '$' | '#' | '/' | '?' | '0'..='9')
        )
    }

    /// `depth` counts the `a,` links already read in this chain.
    fn parse_address(&mut self, depth: usize) -> Result<Address, SamError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(SamError::syntax(self.offset(), "address nested too deeply"));
        }
        if self.peek_char() == Some(',') {
            // Leading comma: the left side defaults to line 0, the right side to `$`.
            self.chars.next();
            self.skip_whitespace();
            if self.at_address_start() {
                let end = self.parse_address(depth + 1)?;
                return Ok(Address::Range(Box::new(Address::Line(0)), Box::new(end)));
            }
            return Ok(Address::whole_buffer());
        }

        let start = self.parse_simple_address()?;
        self.skip_whitespace();
        if self.peek_char() != Some(',') {
            return Ok(start);
        }
        self.chars.next();
        self.skip_whitespace();
        if !self.at_address_start() {
            return Err(SamError::syntax(self.offset(), "expected address after ','"));
        }
        let end = self.parse_address(depth + 1)?;
        Ok(Address::Range(Box::new(start), Box::new(end)))
    }

    fn parse_simple_address(&mut self) -> Result<Address, SamError> {
        let offset = self.offset();
        match self.peek_char() {
            Some('.') => {
                self.chars.next();
                Ok(Address::Dot)
            }
            Some('$') => {
                self.chars.next();
                Ok(Address::End)
            }
            Some('#') => {
                self.chars.next();
                Ok(Address::Char(self.parse_number()?))
            }
            Some('0'..='9') => Ok(Address::Line(self.parse_number()?)),
            Some(delim @ ('/' | '?')) => {
                self.chars.next();
                let source = self.read_delimited(delim, offset)?;
                let direction = if delim == '/' {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                Ok(Address::Regex {
                    pattern: compile_pattern(&source, offset)?,
                    direction,
                })
            }
            Some(ch) => Err(SamError::syntax(
                offset,
                format!("invalid address start '{ch}'"),
            )),
            None => Err(SamError::syntax(offset, "expected address")),
        }
    }

    fn parse_number(&mut self) -> Result<usize, SamError> {
        let offset = self.offset();
        let digits: String = self
            .chars
            .peeking_take_while(|&(_, ch)| ch.is_ascii_digit())
            .map(|(_, ch)| ch)
            .collect();
        if digits.is_empty() {
            return Err(SamError::syntax(offset, "expected number"));
        }
        digits
            .parse()
            .map_err(|_| SamError::syntax(offset, format!("number too large: {digits}")))
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, ch)| ch.is_whitespace()).is_some() {}
    }
}
