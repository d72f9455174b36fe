//! The named commands a user invokes from the editor, each a thin wrapper
//! that prompts for input and hands a command string to the [`Executor`].

use phf::{Map, phf_map};
use tracing::debug;

use crate::error::SamError;
use crate::executor::Executor;
use crate::host::Host;
use crate::parser::escape_delimited;

pub const HELP: &str = "\
Sam Structural Regular Expressions

Commands:
  x/pattern/cmd   Run cmd on each match of pattern
  y/pattern/cmd   Run cmd on each stretch of text between matches
  g/pattern/cmd   Run cmd on the region if pattern matches in it
  v/pattern/cmd   Run cmd on the region if pattern does not match

Simple Commands:
  p               Print the region
  d               Delete the region
  c/text/         Replace the region with text
  a/text/         Insert text after the region
  i/text/         Insert text before the region
  |cmd            Replace the region with its output through a shell command

Addresses:
  .               The current region
  ,               The whole buffer (0,$)
  $               End of the buffer
  n               Line n
  #n              Character offset n
  /pattern/       Next match of pattern
  ?pattern?       Previous match of pattern
  a,b             From the start of a to the end of b

Examples:
  x/TODO/p                   Print every TODO
  ,x/old/c/new/              Replace every 'old' with 'new'
  x/^#.*\\n/d                 Delete comment lines
  x/^import.*/a/ (checked)/  Append a note to each import
  ,|sort                     Sort the buffer
  x/err/{g/nil/d}            Delete each 'err' region that also matches nil

Braces group commands; they all see the same region:
  x/fn .*/{i/[/ a/]/}        Bracket every line starting with 'fn '
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmdOp {
    /// Prompt for a pattern and print what `<letter>/pattern/p` selects.
    Structural(char),
    Edit,
    Pipe,
    Help,
}

pub struct CmdInfo {
    op: CmdOp,
    pub summary: &'static str,
}

/// Named commands, sorted alphabetically.
const NAME_TO_CMD_MAP: Map<&'static str, CmdInfo> = phf_map! {
    "edit" => CmdInfo {
        op: CmdOp::Edit,
        summary: "run any sam command",
    },
    "g" => CmdInfo {
        op: CmdOp::Structural('g'),
        summary: "print the buffer if a pattern matches",
    },
    "help" => CmdInfo {
        op: CmdOp::Help,
        summary: "show the command reference",
    },
    "pipe" => CmdInfo {
        op: CmdOp::Pipe,
        summary: "filter the whole buffer through a shell command",
    },
    "v" => CmdInfo {
        op: CmdOp::Structural('v'),
        summary: "print the buffer if a pattern does not match",
    },
    "x" => CmdInfo {
        op: CmdOp::Structural('x'),
        summary: "print every match of a pattern",
    },
    "y" => CmdInfo {
        op: CmdOp::Structural('y'),
        summary: "print the text between matches of a pattern",
    },
};

pub fn lookup(name: &str) -> Option<&'static CmdInfo> {
    NAME_TO_CMD_MAP.get(name)
}

/// All command names, in sorted order.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = NAME_TO_CMD_MAP.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Run the named command. Failures and cancellations are reported through
/// `host`; the return value says whether the command went through.
pub fn run(name: &str, executor: &Executor, host: &mut dyn Host) -> bool {
    let Some(info) = lookup(name) else {
        host.message(&format!("Error: unknown command '{name}'"));
        return false;
    };
    debug!(name, "running named command");
    match info.op {
        CmdOp::Help => {
            let buffer = &executor.config().help_buffer;
            host.show_named_buffer(buffer, HELP);
            host.message(&format!("Sam help displayed in {buffer} buffer"));
            true
        }
        CmdOp::Structural(letter) => {
            let label = format!("{letter}/pattern/: ");
            prompt_and_execute(executor, host, &label, |pattern| {
                format!("{letter}/{}/p", escape_delimited(pattern, '/'))
            })
        }
        CmdOp::Edit => prompt_and_execute(executor, host, "Sam command: ", str::to_string),
        CmdOp::Pipe => {
            prompt_and_execute(executor, host, "Pipe through: ", |filter| format!(",|{filter}"))
        }
    }
}

fn prompt_and_execute(
    executor: &Executor,
    host: &mut dyn Host,
    label: &str,
    build: impl FnOnce(&str) -> String,
) -> bool {
    let Some(reply) = host.prompt(label) else {
        host.message("Cancelled");
        return false;
    };
    let result = executor.execute(host, &build(&reply));
    report(host, result)
}

fn report<T>(host: &mut dyn Host, result: Result<T, SamError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            host.message(&format!("Error: {err}"));
            false
        }
    }
}
