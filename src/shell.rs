//! Line-oriented command shell over a mounted session.
//!
//! Commands:
//! - UNMOUNT
//! - CATALOG
//! - INFO [name]
//! - CREATE name
//! - DELETE name
//! - TRUNCATE name
//! - READ name start end
//! - WRITE name start data...   (data is the rest of the line)
//! - SET name READONLY=true|false

use std::io::{BufRead, Write};

use crate::config::PROMPT_SUFFIX;
use crate::report::{Catalog, FileInfo, VolumeInfo};
use crate::{Error, Result, Session};

const INVALID_ARGS: &str = "Invalid command arguments.";

#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Appended to the volume name to form the prompt.
    pub prompt_suffix: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self { prompt_suffix: PROMPT_SUFFIX.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading commands; the string is printed as-is (may be empty).
    Continue(String),
    /// The volume was unmounted.
    Exit,
}

pub struct Shell {
    session: Session,
    config: ShellConfig,
}

fn parse_offset(arg: &str) -> Option<i64> {
    arg.parse().ok()
}

fn report(result: Result<String>) -> Outcome {
    match result {
        Ok(msg) => Outcome::Continue(msg),
        Err(e) => {
            log::debug!("command failed: {}", e);
            Outcome::Continue(e.to_string())
        }
    }
}

impl Shell {
    pub fn new(session: Session, config: ShellConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prompt(&self) -> String {
        let name = self
            .session
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}{}", name, self.config.prompt_suffix)
    }

    /// Runs one command line against the mounted volume.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let line = line.trim_end_matches(['\r', '\n']);
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = args.first() else {
            return Outcome::Continue(String::new());
        };

        match (command, args.len()) {
            ("UNMOUNT", _) => match self.session.unmount() {
                Ok(()) => Outcome::Exit,
                Err(e) => Outcome::Continue(e.to_string()),
            },
            ("CATALOG", _) => report(
                self.session
                    .volume()
                    .and_then(Catalog::gather)
                    .map(|c| c.to_string()),
            ),
            ("INFO", 1) => report(
                self.session
                    .volume()
                    .and_then(VolumeInfo::gather)
                    .map(|i| i.to_string()),
            ),
            ("INFO", 2) => report(
                self.session
                    .volume()
                    .and_then(|v| v.lookup(args[1]))
                    .map(|e| FileInfo(&e).to_string()),
            ),
            ("CREATE", 2) => report(
                self.session
                    .volume_mut()
                    .and_then(|v| v.create(args[1]))
                    .map(|_| "File Created.".to_string()),
            ),
            ("DELETE", 2) => report(
                self.session
                    .volume_mut()
                    .and_then(|v| v.delete(args[1]))
                    .map(|_| "File Deleted.".to_string()),
            ),
            ("TRUNCATE", 2) => report(
                self.session
                    .volume_mut()
                    .and_then(|v| v.truncate(args[1]))
                    .map(|_| "File Truncated.".to_string()),
            ),
            ("READ", 4) => {
                let (Some(start), Some(end)) = (parse_offset(args[2]), parse_offset(args[3])) else {
                    return Outcome::Continue(INVALID_ARGS.to_string());
                };
                report(
                    self.session
                        .volume()
                        .and_then(|v| v.read(args[1], start, end))
                        .map(|data| String::from_utf8_lossy(&data).into_owned()),
                )
            }
            ("WRITE", n) if n >= 4 => {
                let Some(start) = parse_offset(args[2]) else {
                    return Outcome::Continue(INVALID_ARGS.to_string());
                };
                let data = match rest_after(line, 3) {
                    Some(data) if data.is_ascii() => data,
                    _ => return Outcome::Continue(INVALID_ARGS.to_string()),
                };
                report(
                    self.session
                        .volume_mut()
                        .and_then(|v| v.write(args[1], start, data.as_bytes()))
                        .map(|_| "Wrote to file.".to_string()),
                )
            }
            ("SET", 3) => {
                let value = match args[2].split_once('=') {
                    Some(("READONLY", value)) => match value.to_ascii_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        _ => return Outcome::Continue(INVALID_ARGS.to_string()),
                    },
                    _ => return Outcome::Continue(INVALID_ARGS.to_string()),
                };
                report(
                    self.session
                        .volume_mut()
                        .and_then(|v| v.set_read_only(args[1], value))
                        .map(|_| "Set readonly.".to_string()),
                )
            }
            ("INFO" | "CREATE" | "DELETE" | "TRUNCATE" | "READ" | "WRITE" | "SET", _) => {
                Outcome::Continue(INVALID_ARGS.to_string())
            }
            _ => Outcome::Continue("Invalid command.".to_string()),
        }
    }

    /// Reads commands until UNMOUNT or end of input, unmounting on the way out.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            match self.execute(&line?) {
                Outcome::Continue(msg) if msg.is_empty() => {}
                Outcome::Continue(msg) => writeln!(out, "{}", msg)?,
                Outcome::Exit => return Ok(()),
            }
        }

        writeln!(out)?;
        match self.session.unmount() {
            Ok(()) | Err(Error::NotMounted) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Returns the text following the first `skip` space-separated words, spaces preserved.
fn rest_after(line: &str, skip: usize) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        let idx = rest.find(char::is_whitespace)?;
        rest = rest[idx..].trim_start();
    }
    if rest.is_empty() { None } else { Some(rest) }
}
