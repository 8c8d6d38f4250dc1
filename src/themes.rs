// Process-wide cache of the renderer's theme names, filled once at startup

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

static THEMES: OnceLock<Vec<String>> = OnceLock::new();

pub const LIST_THEMES: &str = "--list-themes";

/// Populate the cache by running `{executable} --list-themes`.
///
/// Only the first call queries the renderer. Failures leave the cache empty;
/// theme prompts then fall back to free text.
pub fn init(executable: &Path) -> &'static [String] {
    THEMES.get_or_init(|| match query(executable) {
        Ok(themes) => {
            tracing::debug!(count = themes.len(), "loaded renderer themes");
            themes
        }
        Err(err) => {
            tracing::debug!(error = %err, "could not list renderer themes");
            Vec::new()
        }
    })
}

/// Cached theme names, empty before [`init`] or after a failed query
pub fn available() -> &'static [String] {
    THEMES.get().map(Vec::as_slice).unwrap_or(&[])
}

fn query(executable: &Path) -> anyhow::Result<Vec<String>> {
    let output = Command::new(executable)
        .arg(LIST_THEMES)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    if !output.status.success() {
        anyhow::bail!("`{} {}` exited with {}", executable.display(), LIST_THEMES, output.status);
    }
    Ok(parse_theme_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Split renderer output into theme names: one per line, trimmed, blanks dropped
pub fn parse_theme_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
