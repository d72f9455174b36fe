//! Tree representation of a parsed sam command.

use std::fmt;

use regex::Regex;

use crate::address::Address;
use crate::parser::escape_delimited;

/// A parsed command. Built once per invocation by [`parse`](crate::parse)
/// and walked by the evaluator.
#[derive(Debug, Clone)]
pub enum Command {
    /// `p`: print the region.
    Print,
    /// `d`: delete the region.
    Delete,
    /// `c/text/`: replace the region.
    Change(String),
    /// `a/text/`: insert after the region.
    Append(String),
    /// `i/text/`: insert before the region.
    Insert(String),
    /// `|cmd`: replace the region with the output of a shell filter.
    Pipe(String),
    /// `x/re/cmd` runs `sub` on every match; `y/re/cmd` (`inverse`) on every gap between matches.
    Extract {
        pattern: Regex,
        sub: Box<Command>,
        inverse: bool,
    },
    /// `g/re/cmd` runs `sub` on the region if it contains a match; `v/re/cmd` (`inverse`) if not.
    Guard {
        pattern: Regex,
        sub: Box<Command>,
        inverse: bool,
    },
    /// `{cmd cmd ...}`: every member runs on the same region.
    Group(Vec<Command>),
    /// An address followed by a command.
    Addressed { addr: Address, sub: Box<Command> },
}

impl Command {
    /// The command letter, as written.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Print => "p",
            Command::Delete => "d",
            Command::Change(_) => "c",
            Command::Append(_) => "a",
            Command::Insert(_) => "i",
            Command::Pipe(_) => "|",
            Command::Extract { inverse: false, .. } => "x",
            Command::Extract { inverse: true, .. } => "y",
            Command::Guard { inverse: false, .. } => "g",
            Command::Guard { inverse: true, .. } => "v",
            Command::Group(_) => "{",
            Command::Addressed { .. } => "address",
        }
    }
}

/// Renders the command back into sam syntax, always using `/` as the delimiter.
///
/// The rendering parses back to a command that behaves the same, but is not
/// guaranteed to match the original text.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Print | Command::Delete => write!(f, "{}", self.name()),
            Command::Change(text) | Command::Append(text) | Command::Insert(text) => {
                write!(f, "{}/{}/", self.name(), escape_delimited(text, '/'))
            }
            // Terminated by a newline so the rendering can sit inside a group.
            Command::Pipe(cmd) => writeln!(f, "|{cmd}"),
            Command::Extract { pattern, sub, .. } | Command::Guard { pattern, sub, .. } => {
                write!(
                    f,
                    "{}/{}/{sub}",
                    self.name(),
                    escape_delimited(pattern.as_str(), '/')
                )
            }
            Command::Group(cmds) => {
                write!(f, "{{")?;
                for (i, cmd) in cmds.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{cmd}")?;
                }
                write!(f, "}}")
            }
            Command::Addressed { addr, sub } => write!(f, "{addr}{sub}"),
        }
    }
}
