//! Root-relative path resolution for glob filters.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// The directory that rule and file-level globs are written against.
///
/// Both the root and every script path are made absolute and normalised
/// before comparison, so `./vendor/lib.py` under a root given as `$PWD`
/// still resolves to `vendor/lib.py`.
#[derive(Debug, Clone)]
pub(crate) struct ProjectRoot {
    resolved: Option<Utf8PathBuf>,
}

impl ProjectRoot {
    pub(crate) fn new(root: &Utf8Path) -> Self {
        Self {
            resolved: resolve(root),
        }
    }

    /// Returns `path` relative to the root, or `path` as given when it
    /// lies elsewhere.
    pub(crate) fn relative(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.resolved
            .as_deref()
            .zip(resolve(path))
            .and_then(|(root, full)| full.strip_prefix(root).ok().map(Utf8Path::to_path_buf))
            .unwrap_or_else(|| path.to_path_buf())
    }
}

/// Resolves symlinks when the path exists, otherwise joins it onto the
/// working directory and folds `.` and `..` lexically.
fn resolve(path: &Utf8Path) -> Option<Utf8PathBuf> {
    if let Ok(real) = path.canonicalize_utf8() {
        return Some(real);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().ok()?;
        Utf8PathBuf::from_path_buf(cwd).ok()?.join(path)
    };
    Some(normalise(&absolute))
}

fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let last = parts.last().copied();
                match last {
                    Some(Utf8Component::Normal(_)) => {
                        parts.pop();
                    }
                    // `/..` is `/`.
                    Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                    _ => parts.push(component),
                }
            }
            _ => parts.push(component),
        }
    }
    parts.iter().collect()
}
