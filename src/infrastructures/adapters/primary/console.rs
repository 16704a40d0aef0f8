use std::io::{self, BufRead, IsTerminal, Write};

/// Line-oriented user interaction.
pub trait Console {
    fn print(&mut self, line: &str);

    /// Whether a user is present to answer prompts.
    fn is_interactive(&self) -> bool;

    /// Asks `question` and returns the answer line, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from reading or writing the terminal.
    fn prompt(&mut self, question: &str) -> io::Result<Option<String>>;
}

/// Console over the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn print(&mut self, line: &str) {
        println!("{line}");
    }

    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_string()))
    }
}
