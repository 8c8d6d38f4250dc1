// Mode dispatcher: the four entry points and the resolve → build → invoke flow

use crate::command::{self, Flags, InputMode, InvocationSpec, OutputMode};
use crate::config::Config;
use crate::error::ShotError;
use crate::invoke::{self, ProcessHost};
use crate::locate::ExecutableLocator;
use crate::options::{self, OptionOverrides, Toggle};
use crate::parser::line_ranges;
use crate::prompt::{History, Prompter};
use anyhow::Result;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Attempts allowed for an interactive highlight spec before giving up
const HIGHLIGHT_ATTEMPTS: usize = 3;

/// How much the user is asked before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestLevel {
    /// Stored configuration and call-site overrides only
    #[default]
    Default,
    /// Ask for each prompt-eligible option, then for the output path
    PromptStructured,
    /// Let the user edit the serialized flag string, then ask for the output path
    PromptRaw,
}

impl RequestLevel {
    /// Map a numeric prefix argument: 16 and up is raw, 4 and up is structured
    pub fn from_prefix(prefix: u32) -> Self {
        match prefix {
            n if n >= 16 => RequestLevel::PromptRaw,
            n if n >= 4 => RequestLevel::PromptStructured,
            _ => RequestLevel::Default,
        }
    }

    pub fn prompts_for_output_path(self) -> bool {
        self != RequestLevel::Default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The whole file the buffer is visiting
    Buffer,
    /// A span of the buffer's text
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestKind {
    File,
    Clipboard,
}

/// Editor buffer as seen by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    pub path: Option<PathBuf>,
    pub contents: String,
}

impl Buffer {
    pub fn visiting(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            contents: contents.into(),
        }
    }

    pub fn unnamed(contents: impl Into<String>) -> Self {
        Self {
            path: None,
            contents: contents.into(),
        }
    }

    /// Language tag derived from the file extension, e.g. `rs` for `main.rs`
    pub fn language(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::extension)
            .map(|ext| ext.to_string_lossy().into_owned())
            .filter(|ext| !ext.is_empty())
    }

    /// Text between two offsets, in either order.
    ///
    /// Offsets past the end are clamped. An empty span, or one that splits a
    /// UTF-8 character, is `EmptyRegion`.
    pub fn region_text(&self, region: &Range<usize>) -> Result<&str, ShotError> {
        let len = self.contents.len();
        let start = region.start.min(region.end).min(len);
        let end = region.start.max(region.end).min(len);
        if start == end {
            return Err(ShotError::EmptyRegion);
        }
        self.contents.get(start..end).ok_or(ShotError::EmptyRegion)
    }
}

/// One user-triggered render
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub level: RequestLevel,
    pub source: SourceKind,
    pub dest: DestKind,
    pub buffer: &'a Buffer,
    pub region: Option<Range<usize>>,
    pub overrides: OptionOverrides,
}

/// Wires the option resolver, command builder and invoker to their collaborators
pub struct Dispatcher<'a> {
    config: &'a Config,
    locator: &'a dyn ExecutableLocator,
    prompter: &'a mut dyn Prompter,
    host: &'a mut dyn ProcessHost,
    themes: &'a [String],
    cwd: PathBuf,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        config: &'a Config,
        locator: &'a dyn ExecutableLocator,
        prompter: &'a mut dyn Prompter,
        host: &'a mut dyn ProcessHost,
    ) -> Self {
        Self {
            config,
            locator,
            prompter,
            host,
            themes: &[],
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Theme names offered by the structured theme prompt
    pub fn with_themes(mut self, themes: &'a [String]) -> Self {
        self.themes = themes;
        self
    }

    /// Directory used for unnamed buffers when no save directory is configured
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn buffer_to_file(
        &mut self,
        level: RequestLevel,
        buffer: &Buffer,
        overrides: OptionOverrides,
    ) -> Result<()> {
        self.run(&Request {
            level,
            source: SourceKind::Buffer,
            dest: DestKind::File,
            buffer,
            region: None,
            overrides,
        })
    }

    pub fn buffer_to_clipboard(
        &mut self,
        level: RequestLevel,
        buffer: &Buffer,
        overrides: OptionOverrides,
    ) -> Result<()> {
        self.run(&Request {
            level,
            source: SourceKind::Buffer,
            dest: DestKind::Clipboard,
            buffer,
            region: None,
            overrides,
        })
    }

    pub fn region_to_file(
        &mut self,
        level: RequestLevel,
        buffer: &Buffer,
        region: Option<Range<usize>>,
        overrides: OptionOverrides,
    ) -> Result<()> {
        self.run(&Request {
            level,
            source: SourceKind::Region,
            dest: DestKind::File,
            buffer,
            region,
            overrides,
        })
    }

    pub fn region_to_clipboard(
        &mut self,
        level: RequestLevel,
        buffer: &Buffer,
        region: Option<Range<usize>>,
        overrides: OptionOverrides,
    ) -> Result<()> {
        self.run(&Request {
            level,
            source: SourceKind::Region,
            dest: DestKind::Clipboard,
            buffer,
            region,
            overrides,
        })
    }

    /// Plan the request and hand it to the process host
    pub fn run(&mut self, request: &Request<'_>) -> Result<()> {
        let spec = self.plan(request)?;
        invoke::invoke(&mut *self.host, &spec)
    }

    /// Everything `run` does short of starting the process.
    ///
    /// Failures happen before any prompt is shown when they can: the
    /// executable is checked first, then the source.
    pub fn plan(&mut self, request: &Request<'_>) -> Result<InvocationSpec> {
        let executable = self
            .locator
            .locate(&self.config.executable)
            .ok_or_else(|| ShotError::MissingExecutable {
                name: self.config.executable.clone(),
            })?;

        let mut overrides = request.overrides.clone();
        let input = match request.source {
            SourceKind::Buffer => {
                let path = request.buffer.path.clone().ok_or(ShotError::NoAssociatedFile)?;
                InputMode::FromFile(path)
            }
            SourceKind::Region => {
                let region = request.region.as_ref().ok_or(ShotError::EmptyRegion)?;
                let text = request.buffer.region_text(region)?;
                if overrides.language.is_none() {
                    overrides.language = request.buffer.language();
                }
                InputMode::FromText(text.to_string())
            }
        };

        let flags = self.resolve_flags(request.level, &overrides)?;

        let output = match request.dest {
            DestKind::Clipboard => OutputMode::ToClipboard,
            DestKind::File => {
                let suggested = command::output_path(
                    request.buffer.path.as_deref(),
                    self.config.save_dir.as_deref(),
                    &self.cwd,
                );
                let path = if request.level.prompts_for_output_path() {
                    let start_dir = suggested.parent().unwrap_or(self.cwd.as_path()).to_path_buf();
                    command::choose_output_path(&mut *self.prompter, &suggested, &start_dir)?
                } else {
                    suggested
                };
                OutputMode::ToFile(path)
            }
        };

        let spec = InvocationSpec {
            executable,
            flags,
            input,
            output,
        };
        // Reject an unsplittable raw flag string before anything is spawned
        spec.args()?;
        Ok(spec)
    }

    fn resolve_flags(&mut self, level: RequestLevel, overrides: &OptionOverrides) -> Result<Flags> {
        let config = self.config;
        let defaults = &config.defaults;
        let nothing = OptionOverrides::default();

        match level {
            RequestLevel::Default => {
                let resolved = options::resolve(defaults, overrides, &nothing)?;
                Ok(Flags::Structured(options::flags(&resolved)))
            }
            RequestLevel::PromptStructured => {
                let prompted = self.prompt_fields(overrides)?;
                let resolved = options::resolve(defaults, overrides, &prompted)?;
                Ok(Flags::Structured(options::flags(&resolved)))
            }
            RequestLevel::PromptRaw => {
                let resolved = options::resolve(defaults, overrides, &nothing)?;
                let current = options::serialize(&resolved).join(" ");
                let edited = self
                    .prompter
                    .read_text("Renderer options:", &current, History::RawOptions)?;
                Ok(Flags::Raw(edited))
            }
        }
    }

    /// Ask for every prompt-eligible field the caller did not already override
    fn prompt_fields(&mut self, overrides: &OptionOverrides) -> Result<OptionOverrides> {
        let config = self.config;
        let defaults = &config.defaults;
        let mut prompted = OptionOverrides::default();

        if overrides.theme.is_none() {
            let theme = self
                .prompter
                .select("Theme:", self.themes, defaults.theme.as_deref())?;
            prompted.theme = non_empty(theme);
        }
        if overrides.background_color.is_none() {
            let background = self.prompter.read_text(
                "Background color:",
                &defaults.background,
                History::Background,
            )?;
            prompted.background_color = non_empty(background);
        }
        if overrides.highlight_lines.is_none() {
            prompted.highlight_lines = self.prompt_highlight_lines()?;
        }
        if !overrides.show_line_numbers.is_set() {
            let answer = self
                .prompter
                .confirm("Show line numbers?", defaults.line_numbers)?;
            prompted.show_line_numbers = Toggle::from(answer);
        }
        if !overrides.show_window_controls.is_set() {
            let answer = self
                .prompter
                .confirm("Show window controls?", defaults.window_controls)?;
            prompted.show_window_controls = Toggle::from(answer);
        }
        if !overrides.rounded_corners.is_set() {
            let answer = self
                .prompter
                .confirm("Round corners?", defaults.round_corners)?;
            prompted.rounded_corners = Toggle::from(answer);
        }

        Ok(prompted)
    }

    fn prompt_highlight_lines(&mut self) -> Result<Option<String>> {
        let mut last = String::new();
        for _ in 0..HIGHLIGHT_ATTEMPTS {
            let answer = self.prompter.read_text(
                "Highlight lines (e.g. 3-5;7, empty for none):",
                "",
                History::HighlightLines,
            )?;
            let spec = answer.trim();
            if spec.is_empty() {
                return Ok(None);
            }
            match line_ranges(spec) {
                Ok(_) => return Ok(Some(spec.to_string())),
                Err(err) => tracing::warn!(%err, "highlight spec rejected"),
            }
            last = spec.to_string();
        }
        Err(ShotError::InvalidHighlightLines { spec: last }.into())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
