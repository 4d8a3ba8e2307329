use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{BuddyError, Result};
use crate::models::ChunkId;
use crate::viewer::PanelMode;

pub const HELP: &str = "\
Commands:
  chunks                 list every chunk of the paper
  page <n>               render page n and show its regions
  hide <n>               stop rendering page n
  click <page> <x> <y>   click a point on a rendered page
  select <id>            select a chunk from the list
  mode list|chat         switch the side panel
  ask <question>         ask about the selected chunk
  history                show the chat transcript
  width <px>             change the display width
  open <paper-id>        switch to another paper
  download [path]        save the paper's PDF
  help                   show this help
  back | quit            leave the reader";

/// One line of input to the interactive reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderCommand {
    Chunks,
    Page(u32),
    Hide(u32),
    Click { page: u32, x: f64, y: f64 },
    Select(ChunkId),
    Mode(PanelMode),
    Ask(String),
    History,
    Width(f64),
    Open(String),
    Download(Option<PathBuf>),
    Help,
    Quit,
}

impl ReaderCommand {
    /// Parses a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_lowercase().as_str() {
            "chunks" | "list" => Self::Chunks,
            "page" => Self::Page(single(name, &args)?),
            "hide" => Self::Hide(single(name, &args)?),
            "click" => match args.as_slice() {
                [page, x, y] => Self::Click {
                    page: number(name, page)?,
                    x: number(name, x)?,
                    y: number(name, y)?,
                },
                _ => return Err(usage("click <page> <x> <y>")),
            },
            "select" => Self::Select(ChunkId(single(name, &args)?)),
            "mode" => match args.as_slice() {
                [mode] => Self::Mode(mode.parse().map_err(BuddyError::Validation)?),
                _ => return Err(usage("mode list|chat")),
            },
            "ask" => {
                if rest.is_empty() {
                    return Err(usage("ask <question>"));
                }
                Self::Ask(rest.to_string())
            }
            "history" => Self::History,
            "width" => Self::Width(single(name, &args)?),
            "open" => match args.as_slice() {
                [id] => Self::Open(id.to_string()),
                _ => return Err(usage("open <paper-id>")),
            },
            "download" => Self::Download(args.first().map(PathBuf::from)),
            "help" | "?" => Self::Help,
            "back" | "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(BuddyError::Validation(format!(
                    "Unknown command '{other}'. Type 'help' for a list of commands"
                )))
            }
        };

        Ok(Some(command))
    }
}

fn single<T: FromStr>(name: &str, args: &[&str]) -> Result<T> {
    match args {
        [value] => number(name, value),
        _ => Err(BuddyError::Validation(format!(
            "'{name}' takes exactly one argument"
        ))),
    }
}

fn number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        BuddyError::Validation(format!("Invalid value '{value}' for '{name}'"))
    })
}

fn usage(text: &str) -> BuddyError {
    BuddyError::Validation(format!("Usage: {text}"))
}
