// Error kinds that abort a render request

use thiserror::Error;

/// Terminal failures for a single render request.
///
/// These travel inside `anyhow::Error`; callers that need to branch on the
/// kind use `err.downcast_ref::<ShotError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShotError {
    #[error("cannot find the renderer executable `{name}`; install it or set `executable` in the config")]
    MissingExecutable { name: String },

    #[error("buffer is not visiting a file")]
    NoAssociatedFile,

    #[error("no region selected")]
    EmptyRegion,

    #[error("invalid highlight line spec `{spec}` (expected e.g. `3-5;7`)")]
    InvalidHighlightLines { spec: String },

    #[error("malformed option string: {reason}")]
    MalformedOptions { reason: String },
}
