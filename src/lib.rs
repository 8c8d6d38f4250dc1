// Library exports for codeshot

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod invoke;
pub mod locate;
pub mod options;
pub mod parser;
pub mod prompt;
pub mod quote;
pub mod themes;

pub use command::{Flags, InputMode, InvocationSpec, OutputMode};
pub use config::Config;
pub use dispatch::{Buffer, DestKind, Dispatcher, Request, RequestLevel, SourceKind};
pub use error::ShotError;
pub use invoke::{OutputBuffer, ProcessHost};
pub use locate::{ExecutableLocator, WhichLocator};
pub use options::{OptionOverrides, RenderOptions, Shadow, Toggle};
pub use prompt::{History, Prompter, TerminalPrompter};
