use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use samedit::{Config, Executor, Host, StdioHost, commands, logging};

const COMMAND_PROMPT: &str = "sam> ";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Run a command against the buffer (repeatable); without FILE the
    /// buffer is read from stdin
    #[arg(short = 'e', long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Never write the buffer back to FILE
    #[arg(short = 'r', long)]
    read_only: bool,

    /// Shell used to run |cmd filters
    #[arg(long, value_name = "SH", default_value = "sh")]
    shell: String,

    /// Seconds a filter may run before it is killed
    #[arg(long, value_name = "SECS", default_value = "10", value_parser = parse_timeout)]
    pipe_timeout: Duration,

    /// Output of at most this many lines is shown as a status message
    #[arg(long, value_name = "N", default_value_t = 3)]
    output_lines: usize,

    /// Log more (repeat for more detail); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            shell: self.shell.clone(),
            pipe_timeout: self.pipe_timeout,
            short_output_lines: self.output_lines,
            ..Config::default()
        }
    }
}

fn parse_timeout(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg.parse().map_err(|err| format!("{err}"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| err.to_string())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.verbose);

    let text = match &args.file {
        Some(path) => read_file(path)?,
        None if !args.commands.is_empty() => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
        None => String::new(),
    };

    let executor = Executor::new(args.config());
    let mut host = StdioHost::stdio(text);
    let succeeded = if args.commands.is_empty() {
        interactive(&executor, &mut host)?;
        true
    } else {
        batch(&executor, &mut host, &args.commands)
    };

    let modified = host.is_modified();
    let contents = host.into_contents();
    match &args.file {
        Some(path) if succeeded && modified && !args.read_only => {
            fs::write(path, &contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = contents.len(), "buffer written");
        }
        Some(_) => {}
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// A missing file starts out as an empty buffer.
fn read_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "new file");
            Ok(String::new())
        }
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Run each command in turn, stopping at the first failure.
fn batch(executor: &Executor, host: &mut StdioHost, commands: &[String]) -> bool {
    for command in commands {
        if let Err(err) = executor.execute(host, command) {
            report(host, &err);
            return false;
        }
    }
    true
}

/// One command per line until `:q` or end of input. A line starting with `:`
/// names a command from [`commands`]; `:?` lists them.
fn interactive(executor: &Executor, host: &mut StdioHost) -> Result<()> {
    while let Some(line) = host.read_line(COMMAND_PROMPT)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(name) = line.strip_prefix(':') else {
            if let Err(err) = executor.execute(host, line) {
                report(host, &err);
            }
            continue;
        };
        match name.trim() {
            "q" | "quit" => break,
            "?" => {
                for name in commands::names() {
                    if let Some(info) = commands::lookup(name) {
                        host.message(&format!(":{name:<6} {}", info.summary));
                    }
                }
            }
            name => {
                commands::run(name, executor, host);
            }
        }
    }
    Ok(())
}

fn report(host: &mut StdioHost, err: &samedit::SamError) {
    if err.is_internal() {
        error!(%err, "command aborted");
    }
    host.message(&format!("Error: {err}"));
}
