use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codeshot::dispatch::{Buffer, DestKind, Dispatcher, Request, RequestLevel, SourceKind};
use codeshot::invoke::OutputBuffer;
use codeshot::locate::{ExecutableLocator, WhichLocator};
use codeshot::options::{OptionOverrides, Shadow, Toggle};
use codeshot::prompt::TerminalPrompter;
use codeshot::{themes, Config, ShotError};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "codeshot")]
#[command(about = "Render source code to an image through an external renderer", long_about = None)]
struct Args {
    /// Config file (default: <config dir>/codeshot/config.toml)
    #[arg(long, global = true, env = "CODESHOT_CONFIG")]
    config: Option<PathBuf>,

    /// Renderer executable, overriding the config
    #[arg(long, global = true)]
    executable: Option<String>,

    /// Directory images are saved into, overriding the config
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    /// Print the renderer command instead of running it
    #[arg(long, global = true)]
    dry_run: bool,

    /// With --dry-run, print the invocation as JSON
    #[arg(long, global = true, requires = "dry_run")]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render a whole file to an image file
    BufferFile(SourceArgs),
    /// Render a whole file to the clipboard
    BufferClipboard(SourceArgs),
    /// Render part of a file (or stdin) to an image file
    RegionFile(RegionArgs),
    /// Render part of a file (or stdin) to the clipboard
    RegionClipboard(RegionArgs),
    /// List the themes the renderer reports
    Themes,
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Source file; without one the buffer is unnamed
    file: Option<PathBuf>,

    /// Request level: 1 = defaults, 4 = prompt for each option, 16 = edit the raw flags
    #[arg(long, default_value_t = 1)]
    level: u32,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(clap::Args, Debug)]
struct RegionArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Region start, as a byte offset
    #[arg(long)]
    start: Option<usize>,

    /// Region end, as a byte offset (exclusive)
    #[arg(long)]
    end: Option<usize>,
}

#[derive(clap::Args, Debug, Default)]
struct OverrideArgs {
    #[arg(long, value_name = "BOOL")]
    line_numbers: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    window_controls: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    round_corners: Option<bool>,
    #[arg(long, value_name = "COLOR")]
    background: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    /// Lines to highlight, e.g. "3-5;7"
    #[arg(long, value_name = "RANGES")]
    highlight_lines: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    shadow_blur_radius: Option<i64>,
    #[arg(long, value_name = "COLOR")]
    shadow_color: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    shadow_offset_x: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    shadow_offset_y: Option<i64>,
}

impl From<OverrideArgs> for OptionOverrides {
    fn from(args: OverrideArgs) -> Self {
        OptionOverrides {
            show_line_numbers: Toggle::from(args.line_numbers),
            show_window_controls: Toggle::from(args.window_controls),
            rounded_corners: Toggle::from(args.round_corners),
            background_color: args.background,
            theme: args.theme,
            highlight_lines: args.highlight_lines,
            language: args.language,
            shadow: Shadow {
                blur_radius: args.shadow_blur_radius,
                color: args.shadow_color,
                offset_x: args.shadow_offset_x,
                offset_y: args.shadow_offset_y,
            },
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Build the editor buffer a request operates on
fn load_buffer(file: Option<PathBuf>, source: SourceKind) -> Result<Buffer> {
    match (file, source) {
        (Some(path), SourceKind::Buffer) => {
            if !path.is_file() {
                anyhow::bail!("'{}' is not a readable file", path.display());
            }
            Ok(Buffer::visiting(path, String::new()))
        }
        (Some(path), SourceKind::Region) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            Ok(Buffer::visiting(path, contents))
        }
        // Whole-buffer renders need a file, so there is nothing to read
        (None, SourceKind::Buffer) => Ok(Buffer::unnamed(String::new())),
        (None, SourceKind::Region) => {
            let mut contents = String::new();
            io::stdin()
                .read_to_string(&mut contents)
                .context("Failed to read source text from stdin")?;
            Ok(Buffer::unnamed(contents))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::discover(args.config.as_deref())?;
    if let Some(executable) = args.executable {
        config.executable = executable;
    }
    if let Some(save_dir) = args.save_dir {
        config.save_dir = Some(codeshot::config::expand_home(&save_dir));
    }

    let locator = WhichLocator;
    let executable = locator.locate(&config.executable);
    let theme_list = match &executable {
        Some(executable) => themes::init(executable),
        None => themes::available(),
    };

    let (source, dest, source_args, region) = match args.command {
        Cmd::Themes => {
            for theme in theme_list {
                println!("{}", theme);
            }
            return Ok(());
        }
        Cmd::BufferFile(a) => (SourceKind::Buffer, DestKind::File, a, None),
        Cmd::BufferClipboard(a) => (SourceKind::Buffer, DestKind::Clipboard, a, None),
        Cmd::RegionFile(a) => {
            let region = bounds(a.start, a.end);
            (SourceKind::Region, DestKind::File, a.source, region)
        }
        Cmd::RegionClipboard(a) => {
            let region = bounds(a.start, a.end);
            (SourceKind::Region, DestKind::Clipboard, a.source, region)
        }
    };

    // Nothing is read or prompted for until the renderer is known to exist
    if executable.is_none() {
        return Err(ShotError::MissingExecutable {
            name: config.executable.clone(),
        }
        .into());
    }

    let level = RequestLevel::from_prefix(source_args.level);
    if level != RequestLevel::Default
        && source == SourceKind::Region
        && source_args.file.is_none()
    {
        anyhow::bail!(
            "--level {} prompts on stdin, which already carries the source text; pass a FILE or use --level 1",
            source_args.level
        );
    }

    let buffer = load_buffer(source_args.file, source)?;
    let request = Request {
        level,
        source,
        dest,
        buffer: &buffer,
        region,
        overrides: source_args.overrides.into(),
    };

    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stderr());
    let mut host = OutputBuffer::new();
    let mut dispatcher =
        Dispatcher::new(&config, &locator, &mut prompter, &mut host).with_themes(theme_list);

    if args.dry_run {
        let spec = dispatcher.plan(&request)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&spec)?);
        } else {
            println!("{}", spec.command_line());
        }
        return Ok(());
    }

    dispatcher.run(&request)?;
    drop(dispatcher);

    let mut failed = false;
    for completion in host.drain() {
        eprint!("{}", completion.report());
        failed |= !completion.success();
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// A region exists only when both ends are given
fn bounds(start: Option<usize>, end: Option<usize>) -> Option<std::ops::Range<usize>> {
    match (start, end) {
        (Some(start), Some(end)) => Some(start..end),
        _ => None,
    }
}
