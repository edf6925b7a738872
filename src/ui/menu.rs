//! Interactive numbered menu.
//!
//! Reads one selection per line. Anything that is not a listed number
//! re-prompts; `0` or end of input leaves the loop.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::actions;

const BANNER: &str = "podshelf - a command line podcast manager";
const CLEAR: &str = "\x1b[2J";
const HOME: &str = "\x1b[H";

/// Result of handling one menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Show the menu again.
    Continue,
    /// Leave the menu loop.
    Quit,
}

/// A menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Quit,
    SelectPodcast,
    PlayEpisode,
    Subscribe,
    Search,
    ImportOpml,
    ExportOpml,
    Settings,
}

impl MenuChoice {
    /// Menu entries in display order, `Quit` last.
    pub const ALL: [MenuChoice; 8] = [
        MenuChoice::SelectPodcast,
        MenuChoice::PlayEpisode,
        MenuChoice::Subscribe,
        MenuChoice::Search,
        MenuChoice::ImportOpml,
        MenuChoice::ExportOpml,
        MenuChoice::Settings,
        MenuChoice::Quit,
    ];

    /// Parse a selection typed by the user. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<u8>().ok()? {
            0 => Some(MenuChoice::Quit),
            1 => Some(MenuChoice::SelectPodcast),
            2 => Some(MenuChoice::PlayEpisode),
            3 => Some(MenuChoice::Subscribe),
            4 => Some(MenuChoice::Search),
            5 => Some(MenuChoice::ImportOpml),
            6 => Some(MenuChoice::ExportOpml),
            7 => Some(MenuChoice::Settings),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            MenuChoice::Quit => 0,
            MenuChoice::SelectPodcast => 1,
            MenuChoice::PlayEpisode => 2,
            MenuChoice::Subscribe => 3,
            MenuChoice::Search => 4,
            MenuChoice::ImportOpml => 5,
            MenuChoice::ExportOpml => 6,
            MenuChoice::Settings => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Quit => "Quit",
            MenuChoice::SelectPodcast => "Select podcast",
            MenuChoice::PlayEpisode => "Play episode",
            MenuChoice::Subscribe => "Subscribe to podcast",
            MenuChoice::Search => "Search for podcasts",
            MenuChoice::ImportOpml => "Import OPML",
            MenuChoice::ExportOpml => "Export OPML",
            MenuChoice::Settings => "Settings",
        }
    }
}

/// Print the program banner, optionally clearing the screen first.
pub fn print_banner(out: &mut impl Write, clear_screen: bool) -> Result<()> {
    if clear_screen {
        write!(out, "{}{}", CLEAR, HOME)?;
    }
    writeln!(out, "{}", BANNER)?;
    writeln!(out)?;
    Ok(())
}

/// The interactive menu, generic over its input and output so it can be
/// driven from tests.
pub struct Menu<R, W> {
    input: R,
    output: W,
    db_path: PathBuf,
    name_width: usize,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, db_path: PathBuf, name_width: usize) -> Self {
        Self {
            input,
            output,
            db_path,
            name_width,
        }
    }

    /// Run the menu until the user quits or input ends.
    ///
    /// Errors from an action are printed and the menu is shown again. Only a
    /// failure to read input or write output ends the loop with an error.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;

            let Some(line) = self.prompt("Enter selection: ")? else {
                tracing::debug!("End of input, leaving menu");
                break;
            };

            let Some(choice) = MenuChoice::parse(&line) else {
                continue;
            };

            match self.handle(choice).await {
                Ok(Action::Quit) => break,
                Ok(Action::Continue) => {}
                Err(e) => {
                    tracing::warn!(choice = choice.label(), error = %e, "Menu action failed");
                    writeln!(self.output, "Error: {:#}", e)?;
                    writeln!(self.output)?;
                }
            }
        }

        Ok(())
    }

    async fn handle(&mut self, choice: MenuChoice) -> Result<Action> {
        match choice {
            MenuChoice::Quit => return Ok(Action::Quit),
            MenuChoice::SelectPodcast => {
                let count =
                    actions::list_podcasts(&self.db_path, &mut self.output, self.name_width)
                        .await?;
                if count == 0 {
                    writeln!(self.output, "No podcasts stored yet.")?;
                    writeln!(self.output)?;
                }
            }
            MenuChoice::ImportOpml => match self.prompt("OPML file: ")? {
                Some(path) if !path.is_empty() => {
                    actions::import_opml(&self.db_path, Path::new(&path), &mut self.output)
                        .await?;
                }
                _ => {
                    writeln!(self.output, "No file given.")?;
                    writeln!(self.output)?;
                }
            },
            MenuChoice::PlayEpisode
            | MenuChoice::Subscribe
            | MenuChoice::Search
            | MenuChoice::ExportOpml
            | MenuChoice::Settings => {
                writeln!(self.output, "{}: not implemented", choice.label())?;
                writeln!(self.output)?;
            }
        }
        Ok(Action::Continue)
    }

    fn print_menu(&mut self) -> Result<()> {
        for choice in MenuChoice::ALL {
            writeln!(self.output, " {}) {}", choice.number(), choice.label())?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
