// Renderer executable discovery

use std::path::PathBuf;

/// Resolves a configured executable name or path
pub trait ExecutableLocator {
    /// Absolute path of an executable matching `name`, or `None`
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Looks bare names up on `PATH`; explicit paths must exist and be executable
#[derive(Debug, Default, Clone, Copy)]
pub struct WhichLocator;

impl ExecutableLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        if name.trim().is_empty() {
            return None;
        }
        match which::which(name) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::debug!(executable = name, error = %err, "executable lookup failed");
                None
            }
        }
    }
}
