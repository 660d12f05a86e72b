//! Operator prompts: `dialoguer` on a terminal, plain line reads otherwise.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, Result};

use crate::application::ports::Prompter;

/// Production `Prompter`.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
        }
    }
}

impl TerminalPrompter {
    /// Print `prompt` and read one line; `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read.
    pub fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}").context("writing prompt")?;
        stdout.flush().context("writing prompt")?;
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading operator input")?;
        if read == 0 {
            // Keep the next output off the prompt line.
            println!();
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String> {
        if self.interactive {
            let answer: String = dialoguer::Input::new()
                .with_prompt(prompt)
                .default(default.to_string())
                .allow_empty(true)
                .interact_text()
                .context("reading operator input")?;
            return Ok(if answer.trim().is_empty() {
                default.to_string()
            } else {
                answer
            });
        }
        let answer = self.read_line(&format!("{prompt} [{default}]: "))?;
        Ok(match answer {
            Some(a) if !a.trim().is_empty() => a,
            _ => default.to_string(),
        })
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{prompt} (y/n): "))?;
        Ok(matches!(answer.as_deref().map(str::trim), Some("y" | "Y")))
    }

    fn pause(&self, prompt: &str) -> Result<()> {
        self.read_line(prompt)?;
        Ok(())
    }
}
