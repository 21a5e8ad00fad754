//! Print posts to standard output.

use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::style::Stylize;
use tracing::debug;

use super::ActionSink;
use crate::error::SinkError;
use crate::source::{render, Item};

/// Writes each post followed by a blank line.  Best effort: write errors
/// are logged and swallowed.
pub struct ConsoleSink<W: Write = Stdout> {
    out: W,
    styled: bool,
}

impl ConsoleSink<Stdout> {
    /// Print to stdout, with colour when stdout is a terminal.
    pub fn new() -> Self {
        let out = io::stdout();
        let styled = out.is_terminal();
        Self { out, styled }
    }
}

impl Default for ConsoleSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleSink<W> {
    /// Print plain text to any writer.
    pub fn with_writer(out: W) -> Self {
        Self { out, styled: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_item(&mut self, item: &Item) -> io::Result<()> {
        if self.styled {
            writeln!(self.out, "{}", item.content().bold())?;
            writeln!(self.out, "Author: {}", item.author().cyan())?;
            writeln!(self.out, "Date: {}", item.published_label().dark_grey())?;
            writeln!(self.out, "Link: {}", item.permalink().underlined())?;
        } else {
            let text = render(
                item.content(),
                item.author(),
                item.published_label(),
                item.permalink(),
            );
            writeln!(self.out, "{text}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> ActionSink for ConsoleSink<W> {
    fn send(&mut self, item: &Item) -> Result<(), SinkError> {
        if let Err(e) = self.write_item(item) {
            debug!(error = %e, permalink = item.permalink(), "console write failed");
        }
        Ok(())
    }
}
