// POSIX shell quoting for values interpolated into the displayed command line

use std::borrow::Cow;
use std::path::Path;

/// Wrap `value` in single quotes, always.
///
/// Everything inside single quotes is literal except the quote itself, which
/// is emitted as `'\''` (close, escaped quote, reopen): `it's` becomes
/// `'it'\''s'`. Newlines survive untouched.
pub fn single(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Single-quote a path, lossily converting non-UTF-8 components.
pub fn single_path(path: &Path) -> String {
    single(&path.to_string_lossy())
}

/// Quote a path only when the shell would otherwise split or expand it.
pub fn minimal_path(path: &Path) -> String {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => shell_words::quote(s).into_owned(),
        Cow::Owned(s) => shell_words::quote(&s).into_owned(),
    }
}
