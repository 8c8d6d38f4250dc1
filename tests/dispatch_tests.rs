use anyhow::{bail, Result};
use codeshot::command::{Flags, InputMode, InvocationSpec, OutputMode};
use codeshot::config::{Config, StoredDefaults};
use codeshot::dispatch::{Buffer, Dispatcher, RequestLevel};
use codeshot::invoke::ProcessHost;
use codeshot::locate::ExecutableLocator;
use codeshot::options::{OptionOverrides, Toggle};
use codeshot::prompt::{History, Prompter};
use codeshot::ShotError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

struct FakeLocator(Option<PathBuf>);

impl ExecutableLocator for FakeLocator {
    fn locate(&self, _name: &str) -> Option<PathBuf> {
        self.0.clone()
    }
}

fn found() -> FakeLocator {
    FakeLocator(Some(PathBuf::from("/usr/bin/silicon")))
}

enum Answer {
    Text(&'static str),
    Yes(bool),
    Path(&'static str),
}

/// Replays canned answers and records every question asked
#[derive(Default)]
struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    fn with(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, prompt: &str) -> Result<Answer> {
        self.asked.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("unexpected prompt: {}", prompt),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        prompt: &str,
        _choices: &[String],
        _default: Option<&str>,
    ) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text.to_string()),
            _ => bail!("expected text answer for {}", prompt),
        }
    }

    fn read_text(&mut self, prompt: &str, default: &str, _history: History) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text("") => Ok(default.to_string()),
            Answer::Text(text) => Ok(text.to_string()),
            _ => bail!("expected text answer for {}", prompt),
        }
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Yes(yes) => Ok(yes),
            _ => bail!("expected yes/no answer for {}", prompt),
        }
    }

    fn read_path(&mut self, prompt: &str, _start_dir: &Path, suggested: &Path) -> Result<PathBuf> {
        match self.next(prompt)? {
            Answer::Path("") => Ok(suggested.to_path_buf()),
            Answer::Path(path) => Ok(PathBuf::from(path)),
            _ => bail!("expected path answer for {}", prompt),
        }
    }
}

#[derive(Default)]
struct RecordingHost {
    spawned: Vec<InvocationSpec>,
}

impl ProcessHost for RecordingHost {
    fn spawn_and_show_output(&mut self, spec: &InvocationSpec) -> Result<()> {
        self.spawned.push(spec.clone());
        Ok(())
    }
}

fn shot_error(err: &anyhow::Error) -> Option<&ShotError> {
    err.downcast_ref::<ShotError>()
}

#[test]
fn test_default_buffer_to_file() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/work/src/main.rs", "fn main() {}\n");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .buffer_to_file(RequestLevel::Default, &buffer, OptionOverrides::default())
        .unwrap();

    assert!(prompter.asked.is_empty());
    assert_eq!(host.spawned.len(), 1);
    assert_eq!(
        host.spawned[0].command_line(),
        "/usr/bin/silicon --background '#aaaaff' --output '/work/src/main.png' /work/src/main.rs"
    );
}

#[test]
fn test_override_beats_stored_default() {
    let config = Config {
        defaults: StoredDefaults {
            line_numbers: false,
            background: "#000".to_string(),
            round_corners: true,
            ..StoredDefaults::default()
        },
        ..Config::default()
    };
    let overrides = OptionOverrides {
        show_line_numbers: Toggle::On,
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/b.py", "");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .buffer_to_clipboard(RequestLevel::Default, &buffer, overrides)
        .unwrap();

    assert_eq!(
        host.spawned[0].command_line(),
        "/usr/bin/silicon --background '#000' --to-clipboard /a/b.py"
    );
}

#[test]
fn test_unnamed_buffer_fails_without_spawning() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::unnamed("print(1)");

    let err = Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .buffer_to_file(RequestLevel::Default, &buffer, OptionOverrides::default())
        .unwrap_err();

    assert_eq!(shot_error(&err), Some(&ShotError::NoAssociatedFile));
    assert!(host.spawned.is_empty());
}

#[test]
fn test_missing_executable_fails_before_prompting() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::with(vec![Answer::Text("Nord")]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "");

    for level in [
        RequestLevel::Default,
        RequestLevel::PromptStructured,
        RequestLevel::PromptRaw,
    ] {
        let err = Dispatcher::new(&config, &FakeLocator(None), &mut prompter, &mut host)
            .buffer_to_file(level, &buffer, OptionOverrides::default())
            .unwrap_err();
        assert_eq!(
            shot_error(&err),
            Some(&ShotError::MissingExecutable {
                name: "silicon".to_string()
            })
        );
    }
    assert!(prompter.asked.is_empty());
    assert!(host.spawned.is_empty());
}

#[test]
fn test_missing_executable_checked_before_source() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::unnamed("");

    let err = Dispatcher::new(&config, &FakeLocator(None), &mut prompter, &mut host)
        .region_to_clipboard(RequestLevel::Default, &buffer, None, OptionOverrides::default())
        .unwrap_err();
    assert!(matches!(shot_error(&err), Some(ShotError::MissingExecutable { .. })));
}

#[test]
fn test_structured_prompts_in_order() {
    let config = Config::default();
    let themes = vec!["Dracula".to_string(), "Nord".to_string()];
    let mut prompter = ScriptedPrompter::with(vec![
        Answer::Text("Nord"),
        Answer::Text(""),
        Answer::Text("oops"),
        Answer::Text("2-3"),
        Answer::Yes(false),
        Answer::Yes(true),
        Answer::Yes(true),
        Answer::Path("/tmp/shot.png"),
    ]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .with_themes(&themes)
        .buffer_to_file(RequestLevel::PromptStructured, &buffer, OptionOverrides::default())
        .unwrap();

    assert_eq!(
        prompter.asked,
        vec![
            "Theme:",
            "Background color:",
            "Highlight lines (e.g. 3-5;7, empty for none):",
            "Highlight lines (e.g. 3-5;7, empty for none):",
            "Show line numbers?",
            "Show window controls?",
            "Round corners?",
            "Save image to: ",
        ]
    );
    assert_eq!(
        host.spawned[0].command_line(),
        "/usr/bin/silicon --no-line-number --background '#aaaaff' --theme 'Nord' \
         --highlight-lines '2-3' --output '/tmp/shot.png' /a/main.rs"
    );
}

#[test]
fn test_overridden_fields_are_not_prompted() {
    let config = Config::default();
    let overrides = OptionOverrides {
        theme: Some("Dracula".to_string()),
        show_line_numbers: Toggle::Off,
        highlight_lines: Some("1".to_string()),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::with(vec![
        Answer::Text("#111"),
        Answer::Yes(false),
        Answer::Yes(true),
    ]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "fn x() {}");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .region_to_clipboard(RequestLevel::PromptStructured, &buffer, Some(0..6), overrides)
        .unwrap();

    assert_eq!(
        prompter.asked,
        vec!["Background color:", "Show window controls?", "Round corners?"]
    );
    assert_eq!(
        host.spawned[0].command_line(),
        "echo 'fn x()' | /usr/bin/silicon --no-line-number --no-window-controls \
         --background '#111' --theme 'Dracula' --highlight-lines '1' --language 'rs' --to-clipboard"
    );
}

#[test]
fn test_highlight_prompt_gives_up() {
    let config = Config::default();
    let overrides = OptionOverrides {
        theme: Some("Nord".to_string()),
        background_color: Some("#fff".to_string()),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::with(vec![
        Answer::Text("a"),
        Answer::Text("b"),
        Answer::Text("c"),
    ]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "");

    let err = Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .buffer_to_clipboard(RequestLevel::PromptStructured, &buffer, overrides)
        .unwrap_err();
    assert_eq!(
        shot_error(&err),
        Some(&ShotError::InvalidHighlightLines {
            spec: "c".to_string()
        })
    );
    assert!(host.spawned.is_empty());
}

#[test]
fn test_raw_level_uses_edited_string() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::with(vec![
        Answer::Text("--theme 'One Dark' --no-round-corner"),
        Answer::Path(""),
    ]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::unnamed("x = 1\ny = 2\n");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .with_cwd("/home/me")
        .region_to_file(RequestLevel::PromptRaw, &buffer, Some(0..5), OptionOverrides::default())
        .unwrap();

    assert_eq!(prompter.asked, vec!["Renderer options:", "Save image to: "]);
    let spec = &host.spawned[0];
    assert_eq!(
        spec.flags,
        Flags::Raw("--theme 'One Dark' --no-round-corner".to_string())
    );
    assert_eq!(spec.input, InputMode::FromText("x = 1".to_string()));
    assert_eq!(
        spec.output,
        OutputMode::ToFile(PathBuf::from("/home/me/snippet.png"))
    );
    assert_eq!(
        spec.args().unwrap(),
        vec![
            "--theme",
            "One Dark",
            "--no-round-corner",
            "--output",
            "/home/me/snippet.png"
        ]
    );
}

#[test]
fn test_raw_level_default_is_serialized_options() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::with(vec![Answer::Text("")]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/lib.go", "package a");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .region_to_clipboard(
            RequestLevel::PromptRaw,
            &buffer,
            Some(0..9),
            OptionOverrides::default(),
        )
        .unwrap();

    assert_eq!(
        host.spawned[0].flags,
        Flags::Raw("--background '#aaaaff' --language 'go'".to_string())
    );
}

#[test]
fn test_malformed_raw_string_spawns_nothing() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::with(vec![Answer::Text("--theme 'Nord")]);
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "");

    let err = Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .buffer_to_clipboard(RequestLevel::PromptRaw, &buffer, OptionOverrides::default())
        .unwrap_err();
    assert!(matches!(shot_error(&err), Some(ShotError::MalformedOptions { .. })));
    assert!(host.spawned.is_empty());
}

#[test]
fn test_region_requires_bounds() {
    let config = Config::default();
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/a/main.rs", "fn main() {}");

    let found_tools = found();
    let mut dispatcher = Dispatcher::new(&config, &found_tools, &mut prompter, &mut host);
    for region in [None, Some(3..3), Some(40..50)] {
        let err = dispatcher
            .region_to_file(RequestLevel::Default, &buffer, region, OptionOverrides::default())
            .unwrap_err();
        assert_eq!(shot_error(&err), Some(&ShotError::EmptyRegion));
    }
    drop(dispatcher);
    assert!(host.spawned.is_empty());
}

#[test]
fn test_save_dir_and_explicit_language() {
    let config = Config {
        save_dir: Some(PathBuf::from("/shots")),
        ..Config::default()
    };
    let overrides = OptionOverrides {
        language: Some("toml".to_string()),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::default();
    let mut host = RecordingHost::default();
    let buffer = Buffer::visiting("/etc/app/Cargo.lock", "[[package]]\n");

    Dispatcher::new(&config, &found(), &mut prompter, &mut host)
        .region_to_file(RequestLevel::Default, &buffer, Some(0..11), overrides)
        .unwrap();

    let spec = &host.spawned[0];
    assert_eq!(spec.output, OutputMode::ToFile(PathBuf::from("/shots/Cargo.png")));
    assert!(spec.command_line().contains("--language 'toml'"));
    assert!(spec.command_line().starts_with("echo '[[package]]' | "));
}
