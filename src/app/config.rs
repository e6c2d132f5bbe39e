use crate::app::cli::Cli;
use crate::app::models::ProjectConfig;
use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSetBuilder};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPILE_COMMANDS: &str = "build/compile_commands.json";
pub const DEFAULT_OUTPUT_DIR: &str = ".vscode";
pub const DEFAULT_PROJECT_NAME: &str = "esp32c3";
pub const DEFAULT_INTELLISENSE_MODE: &str = "linux-gcc-arm";
pub const DEFAULT_C_STANDARD: &str = "c99";
pub const DEFAULT_CPP_STANDARD: &str = "c++11";

pub const DEFAULT_FORCE_INCLUDE: &[&str] = &["build/config/sdkconfig.h"];

/// Directories the scanner never reports.
pub const DEFAULT_PATH_FILTER_OUT: &[&str] = &[".vscode", "hrs_server"];

/// Substrings that disqualify a directory anywhere in its path.
pub const DEFAULT_KEYWORD_FILTER_OUT: &[&str] = &[".git"];

/// Always hidden, regardless of what the scan finds.
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[
    "**/.git",
    "**/.svn",
    "**/.hg",
    "**/CVS",
    "**/.DS_Store",
    "**/Thumbs.db",
    "**/*.cmd",
    "**/*.d",
    "**/*.o",
    "**/*.tmp",
];

pub const DEFAULT_IGNORED_REPOSITORIES: &[&str] = &["esp-idf"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            compile_commands: PathBuf::from(DEFAULT_COMPILE_COMMANDS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dump_dir: None,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            intellisense_mode: DEFAULT_INTELLISENSE_MODE.to_string(),
            compiler_path: None,
            c_standard: DEFAULT_C_STANDARD.to_string(),
            cpp_standard: DEFAULT_CPP_STANDARD.to_string(),
            force_include: owned(DEFAULT_FORCE_INCLUDE),
            default_defines: Vec::new(),
            default_includes: Vec::new(),
            defines_filter_out: Vec::new(),
            includes_filter_out: Vec::new(),
            path_filter_out: owned(DEFAULT_PATH_FILTER_OUT),
            keyword_filter_out: owned(DEFAULT_KEYWORD_FILTER_OUT),
            exclude_globs: owned(DEFAULT_EXCLUDE_GLOBS),
            ignored_repositories: owned(DEFAULT_IGNORED_REPOSITORIES),
            file_associations: BTreeMap::from([("*.h".to_string(), "c".to_string())]),
        }
    }
}

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

/// A named table in presets.toml. Present keys replace the defaults.
#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    compile_commands: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    dump_dir: Option<PathBuf>,
    project_name: Option<String>,
    intellisense_mode: Option<String>,
    compiler_path: Option<String>,
    c_standard: Option<String>,
    cpp_standard: Option<String>,
    force_include: Option<Vec<String>>,
    default_defines: Option<Vec<String>>,
    default_includes: Option<Vec<String>>,
    defines_filter_out: Option<Vec<String>>,
    includes_filter_out: Option<Vec<String>>,
    path_filter_out: Option<Vec<String>>,
    keyword_filter_out: Option<Vec<String>>,
    exclude_globs: Option<Vec<String>>,
    ignored_repositories: Option<Vec<String>>,
    file_associations: Option<BTreeMap<String, String>>,
}

fn default_presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("vscode_optimize")
        .join("presets.toml"))
}

/// Reads presets from `explicit`, or from the per-user default location.
/// Only the default location is allowed to be absent.
fn load_presets_file(explicit: Option<&Path>) -> Result<HashMap<String, PresetConfig>> {
    let config_path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} does not exist", path);
            }
            path.to_path_buf()
        }
        None => {
            let path = default_presets_path()?;
            if !path.exists() {
                return Ok(HashMap::new());
            }
            path
        }
    };

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    let parsed: PresetsFile = toml::from_str(&content)
        .context(format!("Failed to parse {:?}", config_path))?;

    Ok(parsed.presets)
}

fn apply_preset(preset: PresetConfig) -> ProjectConfig {
    let defaults = ProjectConfig::default();
    ProjectConfig {
        compile_commands: preset.compile_commands.unwrap_or(defaults.compile_commands),
        output_dir: preset.output_dir.unwrap_or(defaults.output_dir),
        dump_dir: preset.dump_dir.or(defaults.dump_dir),
        project_name: preset.project_name.unwrap_or(defaults.project_name),
        intellisense_mode: preset.intellisense_mode.unwrap_or(defaults.intellisense_mode),
        compiler_path: preset.compiler_path.or(defaults.compiler_path),
        c_standard: preset.c_standard.unwrap_or(defaults.c_standard),
        cpp_standard: preset.cpp_standard.unwrap_or(defaults.cpp_standard),
        force_include: preset.force_include.unwrap_or(defaults.force_include),
        default_defines: preset.default_defines.unwrap_or(defaults.default_defines),
        default_includes: preset.default_includes.unwrap_or(defaults.default_includes),
        defines_filter_out: preset.defines_filter_out.unwrap_or(defaults.defines_filter_out),
        includes_filter_out: preset
            .includes_filter_out
            .unwrap_or(defaults.includes_filter_out),
        path_filter_out: preset.path_filter_out.unwrap_or(defaults.path_filter_out),
        keyword_filter_out: preset.keyword_filter_out.unwrap_or(defaults.keyword_filter_out),
        exclude_globs: preset.exclude_globs.unwrap_or(defaults.exclude_globs),
        ignored_repositories: preset
            .ignored_repositories
            .unwrap_or(defaults.ignored_repositories),
        file_associations: preset.file_associations.unwrap_or(defaults.file_associations),
    }
}

/// Defaults, then the selected preset, then CLI overrides.
pub fn resolve_config(cli: &Cli, project_name: Option<&str>) -> Result<ProjectConfig> {
    let presets = load_presets_file(cli.config.as_deref())?;

    // Determine preset to use: CLI flag > directory name > None
    let preset_key = cli.preset.as_deref().or(project_name);
    let preset = match preset_key.and_then(|k| presets.get(k)) {
        Some(preset) => {
            log::debug!("Using preset {:?}", preset_key);
            preset.clone()
        }
        None => {
            if let Some(key) = cli.preset.as_deref() {
                bail!("Preset {:?} not found", key);
            }
            PresetConfig::default()
        }
    };

    let mut config = apply_preset(preset);

    if let Some(path) = &cli.compile_commands {
        config.compile_commands = path.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(compiler) = &cli.compiler {
        config.compiler_path = Some(compiler.clone());
    }
    if let Some(dir) = &cli.dump {
        config.dump_dir = Some(dir.clone());
    }

    validate_globs(&config.exclude_globs)?;
    validate_globs(config.file_associations.keys())?;

    Ok(config)
}

/// Compiles the patterns into a set, failing on the first invalid one.
/// The globs are emitted verbatim, so the set itself is not kept.
fn validate_globs<I, S>(patterns: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.as_ref();
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    builder.build()?;
    Ok(())
}
