use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything the pipeline consults read-only during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    pub compile_commands: PathBuf,
    pub output_dir: PathBuf,
    /// Where the plain-text list dump goes, if requested.
    pub dump_dir: Option<PathBuf>,
    pub project_name: String,
    pub intellisense_mode: String,
    /// When set, compiler detection is skipped entirely.
    pub compiler_path: Option<String>,
    pub c_standard: String,
    pub cpp_standard: String,
    pub force_include: Vec<String>,
    pub default_defines: Vec<String>,
    pub default_includes: Vec<String>,
    pub defines_filter_out: Vec<String>,
    pub includes_filter_out: Vec<String>,
    pub path_filter_out: Vec<String>,
    pub keyword_filter_out: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub ignored_repositories: Vec<String>,
    pub file_associations: BTreeMap<String, String>,
}

/// One element of the compilation database array.
#[derive(Deserialize, Debug, Clone)]
pub struct CompileEntry {
    pub directory: PathBuf,
    pub file: PathBuf,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    #[serde(default)]
    pub command: Option<String>,
}

impl CompileEntry {
    /// `arguments` if present, otherwise `command` split on single spaces.
    /// Quoted arguments containing spaces are split too.
    pub fn args(&self) -> Option<Vec<String>> {
        match (&self.arguments, &self.command) {
            (Some(args), _) => Some(args.clone()),
            (None, Some(cmd)) => Some(cmd.split(' ').map(str::to_string).collect()),
            (None, None) => None,
        }
    }
}

/// An `-I` value paired with the directory it is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInclude {
    pub directory: PathBuf,
    pub path: String,
}

/// Parser output, before filtering.
#[derive(Debug, Default)]
pub struct RawBuild {
    pub compiler: Option<String>,
    pub files: Vec<String>,
    pub defines: Vec<String>,
    pub includes: Vec<RawInclude>,
}

/// Final, sorted build facts fed to the scanner and the emitters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildInfo {
    pub compiler: Option<String>,
    pub files: Vec<String>,
    pub defines: Vec<String>,
    pub includes: Vec<String>,
}
