//! CLI utilities for driving an instrument interactively.
//!
//! Input lines are parsed into a [`Command`] and run against a
//! [`Connection`] with [`execute`]. Supported input:
//!
//! - `get <attribute> [index]`: read an attribute and print the value.
//! - `set <attribute> <value>...`: write an attribute.
//! - `.clear`: discard buffered input and output on the stream.
//! - `.attributes`: list the attribute table.
//! - `.exit`: leave the session.
//!
//! # Example
//! ```rust
//! use windfreak::cli::Command;
//!
//! let cmd: Command = "set frequency 2441.2976".try_into().unwrap();
//! assert_eq!(
//!     cmd,
//!     Command::Set {
//!         attribute: "frequency".into(),
//!         args: vec!["2441.2976".into()]
//!     }
//! );
//! ```
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::{
    Kind, Value,
    device::{Connection, Connector, DeviceError},
    protocol::Descriptor,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("invalid '{command}' command, {reason}")]
    InvalidCommandArguments { command: String, reason: String },

    #[error("no command provided")]
    Empty,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("terminal IO Error: {0}")]
    Io(#[from] io::Error),
}

/// Possible commands from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`
    Exit,
    /// Discard stray bytes, `.clear`
    Clear,
    /// List known attributes, `.attributes`
    Attributes,
    Get {
        attribute: String,
        args: Vec<String>,
    },
    Set {
        attribute: String,
        args: Vec<String>,
    },
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parts = value.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };

        match head {
            ".exit" => Ok(Command::Exit),
            ".clear" => Ok(Command::Clear),
            ".attributes" => Ok(Command::Attributes),
            "get" | "set" => {
                let attribute = parts
                    .next()
                    .ok_or_else(|| CommandError::InvalidCommandArguments {
                        command: head.to_string(),
                        reason: format!("requires an attribute name. Example: {head} frequency"),
                    })?
                    .to_string();
                let args = parts.map(str::to_string).collect();

                if head == "get" {
                    Ok(Command::Get { attribute, args })
                } else {
                    Ok(Command::Set { attribute, args })
                }
            }
            s => Err(CommandError::UnrecognizedCommand(s.to_string())),
        }
    }
}

/// Prompt user for a command. End of input reads as [`Command::Exit`].
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CliError>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "> ")?;
    writer.flush()?;

    if reader.read_line(&mut s)? == 0 {
        return Ok(Command::Exit);
    }

    Ok(Command::try_from(s.as_str())?)
}

/// Writer that flushes after every write, so a prompt shows up before the
/// caller blocks on input.
pub struct FlushingWriter<W: Write> {
    inner: W,
}

impl<W: Write> FlushingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for FlushingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.inner.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Pairs textual arguments with slot kinds. Unit slots take no text.
pub fn arguments(kinds: &[Kind], tokens: &[String]) -> Vec<Value> {
    let mut tokens = tokens.iter();
    let mut values: Vec<Value> = kinds
        .iter()
        .filter_map(|kind| match kind {
            Kind::Unit => Some(Value::Unit),
            _ => tokens.next().map(|t| Value::from(t.as_str())),
        })
        .collect();
    values.extend(tokens.map(|t| Value::from(t.as_str())));
    values
}

/// One line summary of an attribute.
pub fn describe(name: &str, desc: &Descriptor) -> String {
    let kinds = desc
        .kinds()
        .iter()
        .map(Kind::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{name:<20} {kinds:<14} write: {:<12} read: {}",
        desc.write_template().unwrap_or("-"),
        desc.read_template().unwrap_or("-"),
    )
}

/// Runs `command` against `conn`, returning any output to show.
pub fn execute<C: Connector>(
    conn: &mut Connection<C>,
    command: Command,
) -> Result<Option<String>, DeviceError> {
    match command {
        Command::Exit => {
            conn.close();
            Ok(None)
        }
        Command::Clear => {
            conn.clear()?;
            Ok(None)
        }
        Command::Attributes => {
            let lines = conn
                .table()
                .iter()
                .map(|(name, desc)| describe(name, desc))
                .collect::<Vec<_>>();
            Ok(Some(lines.join("\n")))
        }
        Command::Get { attribute, args } => {
            let kinds = conn
                .table()
                .get(&attribute)
                .map(|d| &d.kinds()[..d.read_arity()])
                .unwrap_or_default();
            let value = conn.read(&attribute, &arguments(kinds, &args))?;
            Ok(Some(value.to_string()))
        }
        Command::Set { attribute, args } => {
            let kinds = conn
                .table()
                .get(&attribute)
                .map(Descriptor::kinds)
                .unwrap_or_default();
            conn.write(&attribute, &arguments(kinds, &args))?;
            Ok(None)
        }
    }
}
