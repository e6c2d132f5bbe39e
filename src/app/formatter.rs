use crate::app::error::OptimizeError;
use crate::app::models::{BuildInfo, ProjectConfig};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROPERTIES_FILE: &str = "c_cpp_properties.json";
pub const SETTINGS_FILE: &str = "settings.json";
const PROPERTIES_VERSION: u32 = 4;

#[derive(Serialize)]
pub struct Properties<'a> {
    configurations: [Configuration<'a>; 1],
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration<'a> {
    name: &'a str,
    include_path: &'a [String],
    defines: &'a [String],
    compiler_path: Option<&'a str>,
    intelli_sense_mode: &'a str,
    browse: Browse,
    c_standard: &'a str,
    cpp_standard: &'a str,
    forced_include: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Browse {
    limit_symbols_to_included_headers: bool,
}

#[derive(Serialize)]
pub struct Settings<'a> {
    #[serde(rename = "git.ignoredRepositories")]
    ignored_repositories: &'a [String],
    #[serde(rename = "files.associations")]
    associations: &'a BTreeMap<String, String>,
    #[serde(rename = "files.exclude")]
    exclude: BTreeMap<&'a str, bool>,
}

pub struct OutputGenerator;

impl OutputGenerator {
    pub fn generate_properties<'a>(
        config: &'a ProjectConfig,
        build: &'a BuildInfo,
    ) -> Properties<'a> {
        Properties {
            configurations: [Configuration {
                name: &config.project_name,
                include_path: &build.includes,
                defines: &build.defines,
                compiler_path: build.compiler.as_deref(),
                intelli_sense_mode: &config.intellisense_mode,
                browse: Browse {
                    limit_symbols_to_included_headers: true,
                },
                c_standard: &config.c_standard,
                cpp_standard: &config.cpp_standard,
                forced_include: &config.force_include,
            }],
            version: PROPERTIES_VERSION,
        }
    }

    pub fn generate_settings<'a>(
        config: &'a ProjectConfig,
        exclude_paths: &'a [String],
    ) -> Settings<'a> {
        Settings {
            ignored_repositories: &config.ignored_repositories,
            associations: &config.file_associations,
            exclude: exclude_paths.iter().map(|p| (p.as_str(), true)).collect(),
        }
    }

    /// Pretty JSON with object keys sorted, 4-space indent, no trailing newline.
    /// Non-ASCII text is written as UTF-8, not as `\uXXXX` escapes.
    pub fn to_pretty_json<T: Serialize>(document: &T) -> Result<String, serde_json::Error> {
        // Value's map is ordered by key, which sorts nested struct fields too.
        let value: Value = serde_json::to_value(document)?;

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes both documents into `dir`, creating it first. The second write
    /// is attempted only after the first succeeded.
    pub fn write_documents(
        dir: &Path,
        config: &ProjectConfig,
        build: &BuildInfo,
        exclude_paths: &[String],
    ) -> Result<(PathBuf, PathBuf), OptimizeError> {
        create_dir(dir)?;

        let properties_path = dir.join(PROPERTIES_FILE);
        write_json(&properties_path, &Self::generate_properties(config, build))?;

        let settings_path = dir.join(SETTINGS_FILE);
        write_json(&settings_path, &Self::generate_settings(config, exclude_paths))?;

        Ok((properties_path, settings_path))
    }

    /// Plain-text dumps of the intermediate lists, one entry per line.
    pub fn write_lists(
        dir: &Path,
        build: &BuildInfo,
        exclude_paths: &[String],
    ) -> Result<(), OptimizeError> {
        create_dir(dir)?;
        let lists: [(&str, &[String]); 4] = [
            ("files.txt", build.files.as_slice()),
            ("defs.txt", build.defines.as_slice()),
            ("incs.txt", build.includes.as_slice()),
            ("epaths.txt", exclude_paths),
        ];
        for (name, items) in lists {
            let content: String = items.iter().map(|item| format!("{}\n", item)).collect();
            write_file(&dir.join(name), &content)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<(), OptimizeError> {
    fs::create_dir_all(dir).map_err(|source| OptimizeError::OutputWrite {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<(), OptimizeError> {
    let json = OutputGenerator::to_pretty_json(document).map_err(|source| {
        OptimizeError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    write_file(path, &json)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), OptimizeError> {
    fs::write(path, content).map_err(|source| OptimizeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
