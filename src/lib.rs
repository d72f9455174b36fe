//! A structural regular expression command language in the style of sam.
//!
//! Commands select regions of a buffer by pattern (`x`, `y`), filter them
//! (`g`, `v`) and edit them (`d`, `c`, `a`, `i`, `|`). Evaluation records
//! changes against an immutable snapshot; they are applied all at once, or
//! not at all if anything fails.
//!
//! # Example
//!
//! ```rust
//! use samedit::{Snapshot, SystemShell, evaluate, parse};
//!
//! let snapshot = Snapshot::new("foo foo foo");
//! let command = parse(",x/foo/c/bar/").unwrap();
//!
//! let evaluation = evaluate(&command, &snapshot, snapshot.whole(), &SystemShell::default()).unwrap();
//! assert_eq!(evaluation.changes.len(), 3);
//!
//! assert_eq!(evaluation.apply(&snapshot).unwrap(), "bar bar bar");
//! ```

mod address;
mod change;
mod command;
pub mod commands;
mod config;
mod error;
mod exec_context;
mod executor;
mod host;
mod interpreter;
pub mod logging;
mod parser;
mod region;
mod shell;
mod snapshot;
mod terminal;

pub use address::{Address, Direction};
pub use change::apply_changes;
pub use command::Command;
pub use config::Config;
pub use error::SamError;
pub use exec_context::Evaluation;
pub use executor::{Executor, Outcome};
pub use host::{Host, ShellFilter};
pub use interpreter::evaluate;
pub use parser::parse;
pub use region::{Change, Region};
pub use shell::SystemShell;
pub use snapshot::Snapshot;
pub use terminal::{StdioHost, TerminalHost};
