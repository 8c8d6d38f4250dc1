// Interactive prompts used by the prompting request levels

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Separate input histories, one per kind of free-text question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum History {
    RawOptions,
    Background,
    HighlightLines,
}

/// Blocking request/response UI the dispatcher asks questions through
pub trait Prompter {
    /// Pick one of `choices`; free text when `choices` is empty
    fn select(&mut self, prompt: &str, choices: &[String], default: Option<&str>) -> Result<String>;

    /// Read a line of text; an empty answer yields `default`
    fn read_text(&mut self, prompt: &str, default: &str, history: History) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Read a file path starting from `start_dir`, pre-filled with `suggested`
    fn read_path(&mut self, prompt: &str, start_dir: &Path, suggested: &Path) -> Result<PathBuf>;
}

/// Line-oriented prompter over any reader/writer pair (stdin/stderr in the binary)
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    histories: HashMap<History, Vec<String>>,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            histories: HashMap::new(),
        }
    }

    /// Previous answers for `history`, oldest first
    pub fn history(&self, history: History) -> &[String] {
        self.histories.get(&history).map(Vec::as_slice).unwrap_or(&[])
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("input closed while waiting for an answer");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select(
        &mut self,
        prompt: &str,
        choices: &[String],
        default: Option<&str>,
    ) -> Result<String> {
        for (index, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>3}) {}", index + 1, choice)
                .context("Failed to write choices")?;
        }

        loop {
            let question = match default {
                Some(d) => format!("{} [{}] ", prompt.trim_end(), d),
                None => format!("{} ", prompt.trim_end()),
            };
            let answer = self.ask(&question)?;
            let answer = answer.trim();

            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d.to_string());
                }
                if choices.is_empty() {
                    return Ok(String::new());
                }
                continue;
            }
            if choices.is_empty() {
                return Ok(answer.to_string());
            }
            // Accept a list number or an exact name
            if let Ok(n) = answer.parse::<usize>() {
                if let Some(choice) = n.checked_sub(1).and_then(|i| choices.get(i)) {
                    return Ok(choice.clone());
                }
            }
            if let Some(choice) = choices.iter().find(|c| c.as_str() == answer) {
                return Ok(choice.clone());
            }
            writeln!(self.output, "No match for '{}'", answer).context("Failed to write")?;
        }
    }

    fn read_text(&mut self, prompt: &str, default: &str, history: History) -> Result<String> {
        let question = if default.is_empty() {
            format!("{} ", prompt.trim_end())
        } else {
            format!("{} [{}] ", prompt.trim_end(), default)
        };
        let answer = self.ask(&question)?;
        let value = if answer.trim().is_empty() {
            default.to_string()
        } else {
            answer
        };
        if !value.is_empty() {
            self.histories.entry(history).or_default().push(value.clone());
        }
        Ok(value)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {} ", prompt.trim_end(), hint))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n").context("Failed to write")?,
            }
        }
    }

    fn read_path(&mut self, prompt: &str, start_dir: &Path, suggested: &Path) -> Result<PathBuf> {
        writeln!(self.output, "(relative paths start at {})", start_dir.display())
            .context("Failed to write prompt")?;
        let answer = self.ask(&format!("{} [{}] ", prompt.trim_end(), suggested.display()))?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(suggested.to_path_buf())
        } else {
            Ok(PathBuf::from(answer))
        }
    }
}
