//! Terminal output: colored labels and incremental rendering

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Writes `label` in bold color followed by plain `value`
pub fn print_labeled(label: &str, value: &str) -> io::Result<()> {
    let mut stdout = stdout();
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(stdout, "{}", label)?;
    stdout.reset()?;
    writeln!(stdout, " {}", value)
}

/// Writes a section heading
pub fn print_heading(heading: &str) -> io::Result<()> {
    let mut stdout = stdout();
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    writeln!(stdout, "{}", heading)?;
    stdout.reset()
}

/// Renders a stream of cumulative strings without repeating text.
///
/// An item that extends the previous one prints only the new suffix; any
/// other item starts a fresh block.
#[derive(Default)]
pub struct IncrementalPrinter {
    previous: String,
}

impl IncrementalPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for `item`, given what was written before
    pub fn delta(&self, item: &str) -> String {
        if self.previous.is_empty() {
            item.to_string()
        } else if let Some(suffix) = item.strip_prefix(self.previous.as_str()) {
            suffix.to_string()
        } else {
            format!("\n\n{}", item)
        }
    }

    pub fn push(&mut self, item: &str, out: &mut impl Write) -> io::Result<()> {
        let text = self.delta(item);
        out.write_all(text.as_bytes())?;
        out.flush()?;
        self.previous = item.to_string();
        Ok(())
    }

    pub fn finish(&self, out: &mut impl Write) -> io::Result<()> {
        if !self.previous.is_empty() {
            writeln!(out)?;
        }
        Ok(())
    }
}
