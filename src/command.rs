// Command builder: output path policy and invocation assembly

use crate::error::ShotError;
use crate::options::Flag;
use crate::prompt::Prompter;
use crate::quote;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Base name used when the source has no file name
pub const PLACEHOLDER_NAME: &str = "snippet";

/// Extension of every saved image
pub const IMAGE_EXTENSION: &str = "png";

pub const OUTPUT: &str = "--output";
pub const TO_CLIPBOARD: &str = "--to-clipboard";

/// Where the renderer reads source text from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// An existing file, passed as the trailing argument
    FromFile(PathBuf),
    /// In-memory text, fed on stdin
    FromText(String),
}

/// Where the renderer puts the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    ToFile(PathBuf),
    ToClipboard,
}

/// Renderer flags, either built from resolved options or edited by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flags {
    Structured(Vec<Flag>),
    Raw(String),
}

impl Flags {
    /// Shell form of the flags, without leading or trailing space
    pub fn command_line(&self) -> String {
        match self {
            Flags::Structured(flags) => flags
                .iter()
                .map(Flag::token)
                .collect::<Vec<_>>()
                .join(" "),
            Flags::Raw(raw) => raw.trim().to_string(),
        }
    }

    /// Discrete argv entries
    pub fn args(&self) -> Result<Vec<String>, ShotError> {
        match self {
            Flags::Structured(flags) => Ok(flags.iter().flat_map(Flag::args).collect()),
            Flags::Raw(raw) => shell_words::split(raw).map_err(|e| ShotError::MalformedOptions {
                reason: e.to_string(),
            }),
        }
    }
}

/// Everything needed for one renderer call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationSpec {
    pub executable: PathBuf,
    pub flags: Flags,
    pub input: InputMode,
    pub output: OutputMode,
}

impl InvocationSpec {
    /// The invocation as a shell command line.
    ///
    /// In-memory text is shown as an `echo` piped into the renderer; the text
    /// is single-quoted as one unit so that evaluating the `echo` segment
    /// reproduces it exactly.
    pub fn command_line(&self) -> String {
        let mut head = quote::minimal_path(&self.executable);
        let flags = self.flags.command_line();
        if !flags.is_empty() {
            head.push(' ');
            head.push_str(&flags);
        }

        match (&self.input, &self.output) {
            (InputMode::FromFile(source), OutputMode::ToFile(path)) => format!(
                "{} {} {} {}",
                head,
                OUTPUT,
                quote::single_path(path),
                quote::minimal_path(source)
            ),
            (InputMode::FromFile(source), OutputMode::ToClipboard) => {
                format!("{} {} {}", head, TO_CLIPBOARD, quote::minimal_path(source))
            }
            (InputMode::FromText(text), OutputMode::ToFile(path)) => format!(
                "echo {} | {} {} {}",
                quote::single(text),
                head,
                OUTPUT,
                quote::single_path(path)
            ),
            (InputMode::FromText(text), OutputMode::ToClipboard) => {
                format!("echo {} | {} {}", quote::single(text), head, TO_CLIPBOARD)
            }
        }
    }

    /// Arguments after the program name, in the same order as `command_line`
    pub fn args(&self) -> Result<Vec<String>, ShotError> {
        let mut args = self.flags.args()?;

        match &self.output {
            OutputMode::ToFile(path) => {
                args.push(OUTPUT.to_string());
                args.push(path.to_string_lossy().into_owned());
            }
            OutputMode::ToClipboard => args.push(TO_CLIPBOARD.to_string()),
        }

        if let InputMode::FromFile(source) = &self.input {
            args.push(source.to_string_lossy().into_owned());
        }

        Ok(args)
    }

    /// Bytes to write on the child's stdin, matching what `echo` would emit
    pub fn stdin_payload(&self) -> Option<String> {
        match &self.input {
            InputMode::FromText(text) => Some(format!("{}\n", text)),
            InputMode::FromFile(_) => None,
        }
    }
}

/// Compute the default image path for a source.
///
/// Directory precedence: `save_dir`, then the source's directory, then `cwd`.
pub fn output_path(source: Option<&Path>, save_dir: Option<&Path>, cwd: &Path) -> PathBuf {
    let base = source
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let dir = save_dir
        .map(Path::to_path_buf)
        .or_else(|| {
            source
                .and_then(Path::parent)
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| cwd.to_path_buf());

    dir.join(format!("{}.{}", base, IMAGE_EXTENSION))
}

/// Offer `suggested` to the user and return their choice.
///
/// An empty answer keeps the suggestion; a relative answer is taken relative
/// to `start_dir`.
pub fn choose_output_path(
    prompter: &mut dyn Prompter,
    suggested: &Path,
    start_dir: &Path,
) -> Result<PathBuf> {
    let chosen = prompter
        .read_path("Save image to: ", start_dir, suggested)
        .context("Failed to read output path")?;

    if chosen.as_os_str().is_empty() {
        Ok(suggested.to_path_buf())
    } else if chosen.is_relative() {
        Ok(start_dir.join(chosen))
    } else {
        Ok(chosen)
    }
}
