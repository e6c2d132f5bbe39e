//! Reads the compilation database and pulls out the raw build facts.

use crate::app::error::OptimizeError;
use crate::app::models::{CompileEntry, ProjectConfig, RawBuild, RawInclude};
use crate::app::normalize::{absolutize, parent_dir, relative_to};
use std::fs;
use std::io;
use std::path::Path;

/// Source files with this suffix are used to detect the compiler.
const C_SOURCE_SUFFIX: &str = ".c";

pub fn load_entries(path: &Path) -> Result<Vec<CompileEntry>, OptimizeError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            OptimizeError::MissingInput(path.to_path_buf())
        } else {
            OptimizeError::Filesystem {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|source| OptimizeError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses `config.compile_commands` (relative to `root`). Every source file
/// is printed to stdout as it is read.
pub fn parse_compile_commands(
    root: &Path,
    config: &ProjectConfig,
) -> Result<RawBuild, OptimizeError> {
    let db_path = root.join(&config.compile_commands);
    let entries = load_entries(&db_path)?;
    log::info!("Read {} entries from {}", entries.len(), db_path.display());
    if entries.is_empty() {
        log::warn!("⚠️ {} contains no compile entries", db_path.display());
    }

    let mut build = seed(root, config);

    for (index, entry) in entries.iter().enumerate() {
        let directory = root.join(&entry.directory);
        let file = relative_to(root, &directory.join(&entry.file));
        println!("{}", file);

        let args = entry.args().ok_or_else(|| OptimizeError::MalformedEntry {
            path: db_path.clone(),
            index,
        })?;

        if build.compiler.is_none() && file.ends_with(C_SOURCE_SUFFIX) {
            if let Some(program) = args.first() {
                let compiler = absolutize(&directory, Path::new(program));
                log::debug!("Detected compiler {} from {}", compiler.display(), file);
                build.compiler = Some(compiler.to_string_lossy().into_owned());
            }
        }

        for arg in &args {
            if let Some(define) = arg.strip_prefix("-D").filter(|d| !d.is_empty()) {
                build.defines.push(define.to_string());
            }
            if let Some(include) = arg.strip_prefix("-I").filter(|i| !i.is_empty()) {
                build.includes.push(RawInclude {
                    directory: directory.clone(),
                    path: include.to_string(),
                });
            }
        }

        build.files.push(file);
    }

    if build.compiler.is_none() {
        log::warn!("No compiler detected: no entry compiles a C source file");
    }

    Ok(build)
}

/// Values every run starts from, before any database entry is read.
fn seed(root: &Path, config: &ProjectConfig) -> RawBuild {
    let at_root = |path: &str| RawInclude {
        directory: root.to_path_buf(),
        path: path.to_string(),
    };

    let mut includes: Vec<RawInclude> = config
        .default_includes
        .iter()
        .map(|inc| at_root(inc.as_str()))
        .collect();
    includes.extend(config.force_include.iter().map(|f| at_root(parent_dir(f))));

    RawBuild {
        compiler: config.compiler_path.clone(),
        files: config.force_include.clone(),
        defines: config.default_defines.clone(),
        includes,
    }
}
