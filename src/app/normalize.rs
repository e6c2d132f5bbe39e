use crate::app::models::{BuildInfo, ProjectConfig, RawBuild, RawInclude};
use pathdiff::diff_paths;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// `path` joined onto `root`, normalised.
pub fn absolutize(root: &Path, path: &Path) -> PathBuf {
    normalize_lexically(&root.join(path))
}

/// `path` relative to `root`, forward slashes, `.` for the root itself.
pub fn relative_to(root: &Path, path: &Path) -> String {
    let absolute = absolutize(root, path);
    let base = normalize_lexically(root);
    let relative = diff_paths(&absolute, &base).unwrap_or(absolute);
    let rendered = to_slash(&relative);
    if rendered.is_empty() {
        ".".to_string()
    } else {
        rendered
    }
}

pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Directory part of a slash-separated relative path; empty for top-level names.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

pub fn starts_with_any<S: AsRef<str>>(s: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| s.starts_with(p.as_ref()))
}

pub fn contains_any<S: AsRef<str>>(s: &str, needles: &[S]) -> bool {
    needles.iter().any(|n| s.contains(n.as_ref()))
}

/// Strips the quoting artifacts build systems leave in `-D` values.
pub fn unescape_define(raw: &str) -> String {
    raw.replace(r#"\""#, "\"").replace(r#""""#, "\"")
}

pub fn normalize_defines(raw: Vec<String>, filter_out: &[String]) -> Vec<String> {
    raw.iter()
        .map(|d| unescape_define(d))
        .filter(|d| !d.is_empty() && !starts_with_any(d, filter_out))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Resolves includes against their entry's directory and keeps the ones
/// present on disk.
pub fn normalize_includes(root: &Path, raw: Vec<RawInclude>, filter_out: &[String]) -> Vec<String> {
    raw.iter()
        .map(|inc| relative_to(root, &inc.directory.join(&inc.path)))
        .filter(|inc| {
            !inc.is_empty() && root.join(inc).exists() && !starts_with_any(inc, filter_out)
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, not deduplicated.
pub fn normalize_files(root: &Path, raw: Vec<String>) -> Vec<String> {
    let mut files: Vec<String> = raw
        .iter()
        .map(|f| relative_to(root, Path::new(f)))
        .collect();
    files.sort();
    files
}

pub fn normalize(root: &Path, config: &ProjectConfig, raw: RawBuild) -> BuildInfo {
    let defines = normalize_defines(raw.defines, &config.defines_filter_out);
    let includes = normalize_includes(root, raw.includes, &config.includes_filter_out);
    let files = normalize_files(root, raw.files);

    log::info!(
        "Kept {} defines, {} includes, {} files",
        defines.len(),
        includes.len(),
        files.len()
    );

    BuildInfo {
        compiler: raw.compiler,
        files,
        defines,
        includes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lexical_normalization_handles_dots() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn relative_paths_follow_the_root() {
        let root = Path::new("/work/proj");
        assert_eq!(relative_to(root, Path::new("src/main.c")), "src/main.c");
        assert_eq!(relative_to(root, Path::new("/work/proj/inc/")), "inc");
        assert_eq!(relative_to(root, Path::new("/work/proj")), ".");
        assert_eq!(relative_to(root, Path::new("/usr/include")), "../../usr/include");
        assert_eq!(relative_to(root, Path::new("a/../b")), "b");
    }

    #[test]
    fn parent_dir_of_top_level_file_is_empty() {
        assert_eq!(parent_dir("main.c"), "");
        assert_eq!(parent_dir("proj/sub/main.c"), "proj/sub");
    }

    #[test]
    fn defines_are_unescaped() {
        assert_eq!(unescape_define(r#"\"VAL\""#), "\"VAL\"");
        assert_eq!(unescape_define(r#"NAME=""x"""#), "NAME=\"x\"");
    }

    #[test]
    fn defines_are_filtered_deduplicated_and_sorted() {
        let raw = strings(&["ZED", "", "CONFIG_A=1", "ALPHA", "ZED", r#"Q=\"s\""#]);
        let kept = normalize_defines(raw, &strings(&["CONFIG_"]));
        assert_eq!(kept, strings(&["ALPHA", "Q=\"s\"", "ZED"]));
    }

    #[test]
    fn includes_must_exist_and_avoid_deny_prefixes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("proj/inc")).unwrap();
        fs::create_dir_all(root.join("vendor/inc")).unwrap();

        let raw = vec![
            RawInclude {
                directory: root.join("proj"),
                path: "inc".into(),
            },
            RawInclude {
                directory: root.join("proj"),
                path: "missing".into(),
            },
            RawInclude {
                directory: root.to_path_buf(),
                path: "proj/inc".into(),
            },
            RawInclude {
                directory: root.to_path_buf(),
                path: "vendor/inc".into(),
            },
        ];
        let kept = normalize_includes(root, raw, &strings(&["vendor"]));
        assert_eq!(kept, strings(&["proj/inc"]));
    }

    #[test]
    fn files_are_sorted_but_keep_duplicates() {
        let root = Path::new("/p");
        let files = normalize_files(root, strings(&["b.c", "a.c", "b.c"]));
        assert_eq!(files, strings(&["a.c", "b.c", "b.c"]));
    }
}
