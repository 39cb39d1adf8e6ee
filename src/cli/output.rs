//! Colored terminal output for the packager CLI.
//!
//! Status lines go to stdout, warnings, errors and the progress line go to
//! stderr. Quiet mode keeps only warnings and errors. Color is used only when
//! the stream is a terminal.

use crate::packager::{LogEvent, LogLevel, LogSink};
use cyrup_termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, IsTerminal, Write};

/// Width of the text progress bar
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    stdout_color: ColorChoice,
    stderr_color: ColorChoice,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            stdout_color: color_choice(io::stdout().is_terminal()),
            stderr_color: color_choice(io::stderr().is_terminal()),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.stdout_color)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.stderr_color)
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            let mut stdout = self.stdout();
            stdout.set_color(ColorSpec::new().set_dimmed(true))?;
            writeln!(stdout, "  {message}")?;
            stdout.reset()?;
        }
        Ok(())
    }

    pub fn info(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(self.stdout(), "{message}")?;
        }
        Ok(())
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        write_tagged(&mut self.stdout(), Color::Green, "✓", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        write_tagged(&mut self.stderr(), Color::Yellow, "⚠", message)
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        write_tagged(&mut self.stderr(), Color::Red, "✗", message)
    }

    /// Redraw the in-place progress line
    pub fn progress(&self, percent: u8) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stderr = self.stderr();
        write!(stderr, "\rPackaging ")?;
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(stderr, "{}", render_bar(percent))?;
        stderr.reset()?;
        write!(stderr, " {:>3}%", percent.min(100))?;
        stderr.flush()
    }

    /// Terminate the progress line so the next message starts on a fresh line
    pub fn finish_progress(&self) -> io::Result<()> {
        if !self.quiet {
            writeln!(self.stderr())?;
        }
        Ok(())
    }

    /// Print a block of captured tool output, indented
    pub fn section(&self, title: &str, body: &str) -> io::Result<()> {
        let body = body.trim();
        if !self.verbose || self.quiet || body.is_empty() {
            return Ok(());
        }
        let mut stdout = self.stdout();
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stdout, "── {title} ──")?;
        stdout.reset()?;
        for line in body.lines() {
            writeln!(stdout, "  {line}")?;
        }
        Ok(())
    }
}

impl LogSink for OutputManager {
    fn emit(&self, event: LogEvent) {
        // Terminal write failures are not worth failing the job over
        let _ = match event.level {
            LogLevel::Info => self.info(&event.message),
            LogLevel::Success => self.success(&event.message),
            LogLevel::Warning => self.warn(&event.message),
            LogLevel::Error => self.error(&event.message),
        };
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Write `tag` in bold `color`, then the message uncolored
fn write_tagged(
    stream: &mut StandardStream,
    color: Color,
    tag: &str,
    message: &str,
) -> io::Result<()> {
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "{tag}")?;
    stream.reset()?;
    writeln!(stream, " {message}")
}

fn render_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(render_bar(0), format!("[{}]", "-".repeat(30)));
        assert_eq!(render_bar(50), format!("[{}{}]", "#".repeat(15), "-".repeat(15)));
        assert_eq!(render_bar(255), format!("[{}]", "#".repeat(30)));
    }

    #[test]
    fn color_only_on_terminals() {
        assert_eq!(color_choice(true), ColorChoice::Auto);
        assert_eq!(color_choice(false), ColorChoice::Never);
    }
}
