//! Discovery and loading of scripts from the file system.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use quarry_syntax::SupportedLanguage;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::ScriptError;
use crate::paths::ProjectRoot;
use crate::rule::PathFilter;
use crate::script::Script;

const ENUMERATOR_TARGET: &str = "quarry::enumerator";

/// Turns input paths into an ordered stream of loaded scripts.
///
/// Files named directly are always loaded. Directories are walked in file
/// name order, keeping files whose extension maps to a supported language
/// and skipping hidden entries. Paths matching the exclusion filter,
/// relative to the root, are dropped in both cases, as are files of a
/// language left out by [`ScriptEnumerator::with_languages`].
#[derive(Debug, Clone)]
pub struct ScriptEnumerator {
    root: Utf8PathBuf,
    project: ProjectRoot,
    exclude: PathFilter,
    languages: Vec<SupportedLanguage>,
}

enum Found {
    File(Utf8PathBuf),
    Failed(Utf8PathBuf, ScriptError),
}

impl ScriptEnumerator {
    /// Creates an enumerator whose exclusion globs are relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        let given: Utf8PathBuf = root.into();
        Self {
            project: ProjectRoot::new(&given),
            root: given,
            exclude: PathFilter::default(),
            languages: Vec::new(),
        }
    }

    /// Sets the filter that decides which paths are analysed at all.
    #[must_use]
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.exclude = filter;
        self
    }

    /// Restricts discovery to `languages`. An empty list admits every
    /// supported language.
    #[must_use]
    pub fn with_languages(mut self, languages: Vec<SupportedLanguage>) -> Self {
        self.languages = languages;
        self
    }

    /// Returns the root used for relative path matching.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Lists the files that would be loaded for `inputs`, in load order.
    #[must_use]
    pub fn files(&self, inputs: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
        self.discover(inputs)
            .into_iter()
            .filter_map(|found| match found {
                Found::File(path) => Some(path),
                Found::Failed(..) => None,
            })
            .collect()
    }

    /// Discovers files under `inputs` and loads each one lazily.
    ///
    /// Every item pairs a path with its script or the reason it could not
    /// be loaded. Discovery failures such as missing inputs appear as
    /// failed items in their position.
    pub fn scripts(
        &self,
        inputs: &[Utf8PathBuf],
    ) -> impl Iterator<Item = (Utf8PathBuf, Result<Script, ScriptError>)> {
        self.discover(inputs).into_iter().map(|found| match found {
            Found::File(path) => {
                let outcome = Script::load(&path);
                (path, outcome)
            }
            Found::Failed(path, error) => (path, Err(error)),
        })
    }

    fn discover(&self, inputs: &[Utf8PathBuf]) -> Vec<Found> {
        let mut found = Vec::new();
        for input in inputs {
            if input.is_file() {
                let wanted = SupportedLanguage::from_path(input.as_std_path())
                    .is_none_or(|language| self.wants(language));
                if wanted && self.admits(input) {
                    found.push(Found::File(input.clone()));
                }
            } else if input.is_dir() {
                self.walk(input, &mut found);
            } else {
                let error = io::Error::new(io::ErrorKind::NotFound, "no such file or directory");
                found.push(Found::Failed(input.clone(), ScriptError::io(error)));
            }
        }
        debug!(
            target: ENUMERATOR_TARGET,
            inputs = inputs.len(),
            files = found.len(),
            "discovered scripts"
        );
        found
    }

    fn walk(&self, dir: &Utf8Path, found: &mut Vec<Found>) {
        let entries = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for item in entries {
            match item {
                Ok(entry) if entry.file_type().is_file() => {
                    let Some(path) = Utf8Path::from_path(entry.path()) else {
                        warn!(
                            target: ENUMERATOR_TARGET,
                            path = %entry.path().display(),
                            "skipping non UTF-8 path"
                        );
                        continue;
                    };
                    let wanted = SupportedLanguage::from_path(entry.path())
                        .is_some_and(|language| self.wants(language));
                    if wanted && self.admits(path) {
                        found.push(Found::File(path.to_path_buf()));
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .and_then(Utf8Path::from_path)
                        .map_or_else(|| dir.to_path_buf(), Utf8Path::to_path_buf);
                    found.push(Found::Failed(path, ScriptError::io(err.into())));
                }
            }
        }
    }

    fn wants(&self, language: SupportedLanguage) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    fn admits(&self, path: &Utf8Path) -> bool {
        self.exclude.admits(&self.project.relative(path))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Tree {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn tree() -> Tree {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8Path::from_path(dir.path()).expect("utf8").to_path_buf();
        for (path, text) in [
            ("src/b.rs", "fn b() {}\n"),
            ("src/a.py", "a = 1\n"),
            ("src/notes.md", "# notes\n"),
            ("vendor/lib.rs", "fn v() {}\n"),
            (".hidden/skip.rs", "fn h() {}\n"),
            ("broken.py", "def (:\n"),
        ] {
            let file = root.join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(&file, text).expect("write");
        }
        Tree { _dir: dir, root }
    }

    fn relative(tree: &Tree, paths: &[Utf8PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|path| ProjectRoot::new(&tree.root).relative(path).to_string())
            .collect()
    }

    #[rstest]
    fn walks_directories_in_name_order(tree: Tree) {
        let enumerator = ScriptEnumerator::new(&tree.root);
        let files = enumerator.files(&[tree.root.clone()]);

        assert_eq!(
            relative(&tree, &files),
            vec!["broken.py", "src/a.py", "src/b.rs", "vendor/lib.rs"]
        );
    }

    #[rstest]
    fn exclusion_globs_are_relative_to_the_root(tree: Tree) {
        let filter = PathFilter::new("exclude", &[], &["vendor/**".to_owned()]).expect("filter");
        let enumerator = ScriptEnumerator::new(&tree.root).with_filter(filter);
        let files = enumerator.files(&[tree.root.clone()]);

        assert_eq!(relative(&tree, &files), vec!["broken.py", "src/a.py", "src/b.rs"]);
    }

    #[rstest]
    fn language_selection_narrows_discovery(tree: Tree) {
        let enumerator =
            ScriptEnumerator::new(&tree.root).with_languages(vec![SupportedLanguage::Python]);
        let files = enumerator.files(&[tree.root.clone(), tree.root.join("src/b.rs")]);

        assert_eq!(relative(&tree, &files), vec!["broken.py", "src/a.py"]);
    }

    #[rstest]
    fn explicit_files_skip_the_extension_check(tree: Tree) {
        let notes = tree.root.join("src/notes.md");
        let enumerator = ScriptEnumerator::new(&tree.root);
        let loaded: Vec<_> = enumerator.scripts(&[notes.clone()]).collect();

        let [(path, Err(ScriptError::UnsupportedLanguage { .. }))] = loaded.as_slice() else {
            panic!("expected one unsupported script, got {loaded:?}");
        };
        assert_eq!(path, &notes);
    }

    #[rstest]
    fn failures_keep_their_position(tree: Tree) {
        let inputs = [
            tree.root.join("broken.py"),
            tree.root.join("missing"),
            tree.root.join("src"),
        ];
        let enumerator = ScriptEnumerator::new(&tree.root);
        let outcomes: Vec<_> = enumerator
            .scripts(&inputs)
            .map(|(path, outcome)| {
                let shown = ProjectRoot::new(&tree.root).relative(&path);
                (shown.to_string(), outcome.is_ok())
            })
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ("broken.py".to_owned(), false),
                ("missing".to_owned(), false),
                ("src/a.py".to_owned(), true),
                ("src/b.rs".to_owned(), true),
            ]
        );
    }
}
