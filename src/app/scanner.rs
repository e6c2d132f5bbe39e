use crate::app::error::OptimizeError;
use crate::app::models::ProjectConfig;
use crate::app::normalize::{contains_any, parent_dir, relative_to, starts_with_any, to_slash};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Finds the directories VS Code should hide.
pub struct Scanner<'a> {
    root: PathBuf,
    config: &'a ProjectConfig,
    deny: DenyRules,
}

/// Prefixes and substrings that rule a walked directory out.
#[derive(Debug, Clone)]
struct DenyRules {
    prefixes: Vec<String>,
    keywords: Vec<String>,
}

impl DenyRules {
    fn matches(&self, path: &str) -> bool {
        starts_with_any(path, &self.prefixes) || contains_any(path, &self.keywords)
    }
}

impl<'a> Scanner<'a> {
    pub fn new(root: PathBuf, config: &'a ProjectConfig) -> Self {
        let mut prefixes = config.path_filter_out.clone();
        prefixes.extend(generated_dirs(&root, config));
        let deny = DenyRules {
            prefixes,
            keywords: config.keyword_filter_out.clone(),
        };
        Self { root, config, deny }
    }

    /// The configured exclude globs followed by every top-level directory
    /// that holds nothing the build uses.
    ///
    /// A walked directory is kept out of the result when a covered path
    /// (a source file's directory or an include) starts with it, since
    /// hiding it would hide something the build needs. The test is on plain
    /// strings: `src` is also kept out by a covered `src2`.
    pub fn exclude_paths(
        &self,
        files: &[String],
        includes: &[String],
    ) -> Result<Vec<String>, OptimizeError> {
        let covered = covered_paths(files, includes);

        let mut candidates = Vec::new();
        for path in self.walk_dirs()? {
            if self.deny.matches(&path) {
                continue;
            }
            if covered.iter().any(|c| c.starts_with(path.as_str())) {
                continue;
            }
            println!("{}", path);
            candidates.push(path);
        }

        let collapsed = collapse_prefixes(candidates);
        log::info!("Found {} directories to exclude", collapsed.len());

        let mut paths = self.config.exclude_globs.clone();
        paths.extend(collapsed);
        Ok(paths)
    }

    /// Every directory under the root, the root itself first as `""`, in
    /// lexicographic pre-order. Denied subtrees are not descended into.
    fn walk_dirs(&self) -> Result<Vec<String>, OptimizeError> {
        let root = self.root.clone();
        let deny = self.deny.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                is_dir(entry) && !deny.matches(&relative_dir(&root, entry.path()))
            })
            .build();

        let mut dirs = Vec::new();
        for result in walker {
            let entry = result?;
            if is_dir(&entry) {
                dirs.push(relative_dir(&self.root, entry.path()));
            }
        }
        log::debug!("Walked {} directories under {}", dirs.len(), self.root.display());
        Ok(dirs)
    }
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_dir())
}

fn relative_dir(root: &Path, path: &Path) -> String {
    diff_paths(path, root)
        .map(|p| to_slash(&p))
        .unwrap_or_default()
}

/// Output and dump directories inside the root. They only exist after a
/// first run, so they are never reported or the next run would differ.
fn generated_dirs(root: &Path, config: &ProjectConfig) -> Vec<String> {
    std::iter::once(&config.output_dir)
        .chain(config.dump_dir.as_ref())
        .map(|dir| relative_to(root, dir))
        .filter(|dir| dir != "." && dir != ".." && !dir.starts_with("../"))
        .collect()
}

/// Directories of the source files plus the include directories.
pub fn covered_paths(files: &[String], includes: &[String]) -> BTreeSet<String> {
    files
        .iter()
        .map(|f| parent_dir(f).to_string())
        .chain(includes.iter().cloned())
        .collect()
}

/// Drops every entry that an earlier kept entry is a string prefix of.
pub fn collapse_prefixes(paths: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for path in paths {
        if starts_with_any(&path, &kept) {
            continue;
        }
        kept.push(path);
    }
    kept
}
